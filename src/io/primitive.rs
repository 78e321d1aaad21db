// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fixed-width little-endian readers/writers, plus UTF-16 code unit and
//! vectorized-copy helpers. Grounded in `xrbk`'s `implement!` macros in
//! `readable.rs`/`writable.rs`, generalized from `bytes::Buf`/`BufMut` get/put
//! calls (which default to big-endian and track their own cursor) to
//! explicit little-endian reads/writes at a caller-supplied offset, per this
//! format's `(buf, off)` contract.

macro_rules! primitive_io {
	($($ty:ty => $read:ident / $write:ident, $width:expr),* $(,)?) => {
		$(
			/// Reads a little-endian
			#[doc = concat!("`", stringify!($ty), "`")]
			/// from `buf` at `off`.
			#[inline]
			#[must_use]
			pub fn $read(buf: &[u8], off: usize) -> $ty {
				let mut bytes = [0u8; $width];
				bytes.copy_from_slice(&buf[off..off + $width]);
				<$ty>::from_le_bytes(bytes)
			}

			/// Writes `value` as little-endian bytes into `buf` at `off`.
			#[inline]
			pub fn $write(buf: &mut [u8], off: usize, value: $ty) {
				buf[off..off + $width].copy_from_slice(&value.to_le_bytes());
			}
		)*
	};
}

primitive_io! {
	u8 => read_u8 / write_u8, 1,
	u16 => read_u16 / write_u16, 2,
	u32 => read_u32 / write_u32, 4,
	u64 => read_u64 / write_u64, 8,
	i8 => read_i8 / write_i8, 1,
	i16 => read_i16 / write_i16, 2,
	i32 => read_i32 / write_i32, 4,
	i64 => read_i64 / write_i64, 8,
	f32 => read_f32 / write_f32, 4,
	f64 => read_f64 / write_f64, 8,
}

/// The width in bytes of one UTF-16 code unit on the wire.
pub const UTF16_UNIT_SIZE: usize = 2;

/// Reads `unit_count` little-endian UTF-16 code units from `buf` at `off`
/// and decodes them into a `String`, replacing unpaired surrogates with the
/// replacement character (the format trusts peer intent within MTU bounds;
/// it does not reject malformed input, per the crate's non-goals).
#[must_use]
pub fn read_utf16(buf: &[u8], off: usize, unit_count: usize) -> String {
	let units = (0..unit_count)
		.map(|i| read_u16(buf, off + i * UTF16_UNIT_SIZE))
		.collect::<Vec<_>>();
	String::from_utf16_lossy(&units)
}

/// Encodes `s` as UTF-16LE code units and writes them into `buf` at `off`.
/// Returns the number of bytes written.
pub fn write_utf16(buf: &mut [u8], off: usize, s: &str) -> usize {
	let mut written = 0;
	for unit in s.encode_utf16() {
		write_u16(buf, off + written, unit);
		written += UTF16_UNIT_SIZE;
	}
	written
}

/// The wire size, in bytes, of `s` encoded as UTF-16LE.
#[must_use]
pub fn utf16_byte_len(s: &str) -> usize {
	s.encode_utf16().count() * UTF16_UNIT_SIZE
}

/// A vectorized byte copy for bulk moves (opaque byte blobs, raw buffers).
/// A thin, named wrapper over `copy_from_slice` so call sites read as the
/// "vectorized copy" the design calls out explicitly rather than an
/// incidental slice op.
#[inline]
pub fn copy_bytes(dst: &mut [u8], dst_off: usize, src: &[u8]) {
	dst[dst_off..dst_off + src.len()].copy_from_slice(src);
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn little_endian_u16() {
		let mut buf = [0u8; 2];
		write_u16(&mut buf, 0, 0x0102);
		assert_eq!(buf, [0x02, 0x01]);
		assert_eq!(read_u16(&buf, 0), 0x0102);
	}

	#[test]
	fn little_endian_i32() {
		let mut buf = [0u8; 4];
		write_i32(&mut buf, 0, 1500);
		assert_eq!(buf, [0xDC, 0x05, 0x00, 0x00]);
	}

	#[test]
	fn utf16_round_trip() {
		let mut buf = [0u8; 12];
		let written = write_utf16(&mut buf, 0, "Hello!");
		assert_eq!(written, 12);
		assert_eq!(utf16_byte_len("Hello!"), 12);
		assert_eq!(read_utf16(&buf, 0, 6), "Hello!");
	}
}
