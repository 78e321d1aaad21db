// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! [`WireSize`] and [`ConstantWireSize`], generalized from `xrbk`'s
//! `X11Size`/`ConstantX11Size` split in `x11_size.rs`. The teacher uses
//! nightly `#![feature(specialization)]` to give blanket impls (`&T`,
//! `Box<T>`, ...) a cheap path when `T: ConstantX11Size`; `bitwire` targets
//! stable Rust, so that blanket-over-reference machinery is dropped (see
//! DESIGN.md) and `ConstantWireSize` is implemented directly on the handful
//! of concrete types that need it instead.

/// Gives a value's size in bytes when serialized on the wire. The size may
/// vary with the value's contents (a `String`'s length, a sparse array's
/// element count).
pub trait WireSize {
	/// Returns the size of `self` when serialized, measured in bytes.
	fn wire_size(&self) -> u16;
}

/// Marks a type whose wire size never depends on its value. Every
/// `ConstantWireSize` impl must return `Self::WIRE_SIZE` from
/// `wire_size`; this is a cheap, registry-checkable fast path for the
/// collection and struct codecs, which otherwise must probe every element
/// or field to learn a container's total size.
pub trait ConstantWireSize: WireSize {
	/// The size of this type when serialized, measured in bytes.
	const WIRE_SIZE: u16;
}

macro_rules! constant_wire_size {
	($($ty:ty => $size:expr),* $(,)?) => {
		$(
			impl ConstantWireSize for $ty {
				const WIRE_SIZE: u16 = $size;
			}

			impl WireSize for $ty {
				fn wire_size(&self) -> u16 {
					Self::WIRE_SIZE
				}
			}
		)*
	};
}

constant_wire_size! {
	u8 => 1, u16 => 2, u32 => 4, u64 => 8,
	i8 => 1, i16 => 2, i32 => 4, i64 => 8,
	f32 => 4, f64 => 8,
	bool => 1,
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn constant_size_matches_wire_size() {
		assert_eq!(i32::WIRE_SIZE, 4);
		assert_eq!(1500i32.wire_size(), 4);
	}
}
