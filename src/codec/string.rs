// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `String` codec: `u16 ContentLength` (byte length of the UTF-16LE
//! payload) followed by the UTF-16LE code units themselves (§6, §8
//! property 8). No teacher file encodes strings this way (`xrb`'s X11
//! strings are Latin-1/UTF-8 byte blobs), so this is built directly from
//! the spec's wire description, in the same fixed-codec shape as
//! `primitives.rs`.

use super::{Readable, Writable};
use crate::error::{WireError, WireResult};
use crate::io::header::ContentLengthHeader;
use crate::io::primitive::{read_utf16, utf16_byte_len, write_utf16};
use crate::size::WireSize;

impl WireSize for String {
	fn wire_size(&self) -> u16 {
		utf16_byte_len(self) as u16 + ContentLengthHeader::SIZE as u16
	}
}

impl Readable for String {
	fn deserialize(buf: &[u8], off: usize) -> WireResult<Self> {
		WireError::check_bounds(buf.len(), off, ContentLengthHeader::SIZE)?;
		let content_len = ContentLengthHeader::read(buf, off).0 as usize;
		let payload_off = off + ContentLengthHeader::SIZE;
		WireError::check_bounds(buf.len(), off, content_len)?;
		Ok(read_utf16(buf, payload_off, content_len / 2))
	}
}

impl Writable for String {
	fn serialize(&self, buf: &mut [u8], off: usize) -> WireResult<()> {
		WireError::check_bounds(buf.len(), off, self.wire_size() as usize)?;
		let payload_len = utf16_byte_len(self);
		ContentLengthHeader(WireError::check_u16(payload_len + ContentLengthHeader::SIZE)?)
			.write(buf, off);
		write_utf16(buf, off + ContentLengthHeader::SIZE, self);
		Ok(())
	}
}

impl WireSize for &str {
	fn wire_size(&self) -> u16 {
		utf16_byte_len(self) as u16 + ContentLengthHeader::SIZE as u16
	}
}

impl Writable for &str {
	fn serialize(&self, buf: &mut [u8], off: usize) -> WireResult<()> {
		WireError::check_bounds(buf.len(), off, WireSize::wire_size(self) as usize)?;
		let payload_len = utf16_byte_len(self);
		ContentLengthHeader(WireError::check_u16(payload_len + ContentLengthHeader::SIZE)?)
			.write(buf, off);
		write_utf16(buf, off + ContentLengthHeader::SIZE, self);
		Ok(())
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn string_content_length_is_utf16_byte_count() {
		let mut buf = [0u8; 14];
		"Hello!".to_string().serialize(&mut buf, 0).unwrap();
		assert_eq!(&buf[0..2], [0x0E, 0x00]);
		assert_eq!(String::deserialize(&buf, 0).unwrap(), "Hello!");
	}

	#[test]
	fn null_reference_is_not_modeled_by_string_itself() {
		// `String` has no null representation on the wire; absence is
		// tracked by the enclosing null mask (§4.6), not by this codec.
		let s = String::new();
		assert_eq!(s.wire_size(), 2);
	}
}
