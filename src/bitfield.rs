// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A fixed-length bit vector used as the null-mask representation (§4.2) and
//! as a serializable value in its own right. No teacher file implements a
//! bit-addressed mask directly — `xrb`'s `common::mask` module wraps whole
//! flag sets via `bitflags!`, one constant per named bit, which doesn't fit
//! a mask whose length is only known at registration time. `BitField` is
//! built from the spec's own description instead, in the small
//! macro-free newtype-over-`Vec<u8>` style the teacher uses elsewhere for
//! wire values (see `Atom`, `io::header`).

use crate::error::{WireError, WireResult};
use crate::io::primitive::{copy_bytes, read_u16, write_u16};
use crate::size::WireSize;

/// A fixed-length bit vector addressed most-significant-bit-first within
/// each byte: bit `i` lives in byte `i / 8`, at position `7 - (i % 8)`.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct BitField {
	bytes: Vec<u8>,
}

impl BitField {
	/// Creates a new, all-zero `BitField` of `byte_len` bytes.
	#[must_use]
	pub fn new(byte_len: usize) -> Self {
		Self {
			bytes: vec![0u8; byte_len],
		}
	}

	/// The number of bytes `n` nullable bits requires: `ceil(n / 8)`.
	#[must_use]
	pub fn bytes_len_from_bits(n: usize) -> usize {
		(n + 7) / 8
	}

	/// The length of this `BitField`, in bytes.
	#[must_use]
	pub fn bytes_len(&self) -> usize {
		self.bytes.len()
	}

	fn addr(i: usize) -> (usize, u8) {
		(i / 8, 1 << (7 - (i % 8)))
	}

	/// Reads bit `i`.
	///
	/// # Panics
	///
	/// Panics if `i` is outside the bit range this `BitField` covers.
	#[must_use]
	pub fn get_bit(&self, i: usize) -> bool {
		let (byte, mask) = Self::addr(i);
		self.bytes[byte] & mask != 0
	}

	/// Sets bit `i` to exactly `v`. Idempotent for repeated
	/// `set_bit(i, true)` calls (unlike the source this format was ported
	/// from, whose `set_bit(i, false)` was a no-op — see DESIGN.md).
	///
	/// # Panics
	///
	/// Panics if `i` is outside the bit range this `BitField` covers.
	pub fn set_bit(&mut self, i: usize, v: bool) {
		let (byte, mask) = Self::addr(i);
		if v {
			self.bytes[byte] |= mask;
		} else {
			self.bytes[byte] &= !mask;
		}
	}

	/// Copies this `BitField`'s bytes into `buf` at `off`.
	pub fn copy_to(&self, buf: &mut [u8], off: usize) {
		copy_bytes(buf, off, &self.bytes);
	}

	/// Reads a `BitField` of `byte_len` bytes from `buf` at `off`.
	#[must_use]
	pub fn copy_from(buf: &[u8], off: usize, byte_len: usize) -> Self {
		let mut bytes = vec![0u8; byte_len];
		copy_bytes(&mut bytes, 0, &buf[off..off + byte_len]);
		Self { bytes }
	}

	/// Serializes this `BitField` as a top-level wire value: a two-byte
	/// `ContentLength` (`byte_len + 2`) followed by the mask bytes.
	pub fn serialize(&self, buf: &mut [u8], off: usize) -> WireResult<()> {
		WireError::check_bounds(buf.len(), off, self.wire_size() as usize)?;
		write_u16(buf, off, WireError::check_u16(self.bytes.len() + 2)?);
		self.copy_to(buf, off + 2);
		Ok(())
	}

	/// Deserializes a top-level `BitField` wire value from `buf` at `off`.
	#[must_use]
	pub fn deserialize(buf: &[u8], off: usize) -> Self {
		let content_len = read_u16(buf, off) as usize;
		Self::copy_from(buf, off + 2, content_len - 2)
	}

	/// The size, in bytes, of this `BitField` as a top-level wire value
	/// (`ContentLength` header plus mask bytes).
	#[must_use]
	pub fn size_from_buffer(buf: &[u8], off: usize) -> u16 {
		read_u16(buf, off)
	}
}

impl WireSize for BitField {
	fn wire_size(&self) -> u16 {
		self.bytes.len() as u16 + 2
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn bit_addressing_is_msb_first() {
		let mut bf = BitField::new(1);
		bf.set_bit(0, true);
		bf.set_bit(1, true);
		assert_eq!(bf.bytes, vec![0b1100_0000]);
	}

	#[test]
	fn set_bit_false_clears() {
		let mut bf = BitField::new(1);
		bf.set_bit(3, true);
		assert!(bf.get_bit(3));
		bf.set_bit(3, false);
		assert!(!bf.get_bit(3));
	}

	#[test]
	fn set_bit_true_is_idempotent() {
		let mut bf = BitField::new(1);
		bf.set_bit(2, true);
		bf.set_bit(2, true);
		assert!(bf.get_bit(2));
	}

	#[test]
	fn byte_len_from_bits_rounds_up() {
		assert_eq!(BitField::bytes_len_from_bits(0), 0);
		assert_eq!(BitField::bytes_len_from_bits(1), 1);
		assert_eq!(BitField::bytes_len_from_bits(8), 1);
		assert_eq!(BitField::bytes_len_from_bits(9), 2);
	}

	#[test]
	fn top_level_wire_form() {
		let mut bf = BitField::new(1);
		bf.set_bit(0, true);
		bf.set_bit(2, true);
		let mut buf = [0u8; 3];
		bf.serialize(&mut buf, 0).unwrap();
		assert_eq!(buf, [3, 0, 0b1010_0000]);
		assert_eq!(BitField::deserialize(&buf, 0), bf);
	}
}
