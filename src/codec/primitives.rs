// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixed codecs for the primitive integer, float, and boolean types.
//! Grounded in `xrbk`'s `implement!` macros in `readable.rs`/`writable.rs`,
//! retargeted from `bytes::Buf`/`BufMut` cursor reads to this format's
//! `(buf, off)` contract and little-endian byte order.

use super::{Readable, Writable};
use crate::error::{WireError, WireResult};
use crate::io::primitive;

macro_rules! implement_primitive {
	($($ty:ty => $read:ident / $write:ident),* $(,)?) => {
		$(
			impl Readable for $ty {
				fn deserialize(buf: &[u8], off: usize) -> WireResult<Self> {
					WireError::check_bounds(buf.len(), off, Self::WIRE_SIZE as usize)?;
					Ok(primitive::$read(buf, off))
				}
			}

			impl Writable for $ty {
				fn serialize(&self, buf: &mut [u8], off: usize) -> WireResult<()> {
					WireError::check_bounds(buf.len(), off, Self::WIRE_SIZE as usize)?;
					primitive::$write(buf, off, *self);
					Ok(())
				}
			}
		)*
	};
}

use crate::size::ConstantWireSize;

implement_primitive! {
	u8 => read_u8 / write_u8,
	u16 => read_u16 / write_u16,
	u32 => read_u32 / write_u32,
	u64 => read_u64 / write_u64,
	i8 => read_i8 / write_i8,
	i16 => read_i16 / write_i16,
	i32 => read_i32 / write_i32,
	i64 => read_i64 / write_i64,
	f32 => read_f32 / write_f32,
	f64 => read_f64 / write_f64,
}

impl Readable for bool {
	fn deserialize(buf: &[u8], off: usize) -> WireResult<Self> {
		Ok(u8::deserialize(buf, off)? != 0)
	}
}

impl Writable for bool {
	fn serialize(&self, buf: &mut [u8], off: usize) -> WireResult<()> {
		(*self as u8).serialize(buf, off)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn two_fields_by_position() {
		// S1 — two ints by fields, without a struct header.
		let mut buf = [0u8; 8];
		1500i32.serialize(&mut buf, 0).unwrap();
		37_500i32.serialize(&mut buf, 4).unwrap();
		assert_eq!(&buf[0..4], [0xDC, 0x05, 0x00, 0x00]);
		assert_eq!(&buf[4..8], [0x9C, 0x92, 0x00, 0x00]);
		assert_eq!(i32::deserialize(&buf, 0).unwrap(), 1500);
		assert_eq!(i32::deserialize(&buf, 4).unwrap(), 37_500);
	}
}
