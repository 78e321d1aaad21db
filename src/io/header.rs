// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The four wire header fields, each a typed newtype over the byte-IO
//! primitives in [`super::primitive`]. Grounded in `xrb`'s newtype pattern
//! for wire values (e.g. `Atom(pub(crate) u32)` deriving `From`/`Into`), but
//! these additionally know how to read and write themselves at an offset,
//! since (unlike `Atom`) they are never user-facing values — they are
//! struct/collection-header plumbing only.

use derive_more::{From, Into};

use super::primitive::{read_u16, read_u8, write_u16, write_u8};

macro_rules! header {
	($(#[$doc:meta])* $name:ident : $repr:ty, $read:ident, $write:ident) => {
		$(#[$doc])*
		#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, From, Into)]
		pub struct $name(pub $repr);

		impl $name {
			/// Reads this header field from `buf` at `off`.
			#[must_use]
			pub fn read(buf: &[u8], off: usize) -> Self {
				Self($read(buf, off))
			}

			/// Writes this header field into `buf` at `off`.
			pub fn write(self, buf: &mut [u8], off: usize) {
				$write(buf, off, self.0);
			}

			/// The size, in bytes, of this header field on the wire.
			pub const SIZE: usize = std::mem::size_of::<$repr>();
		}
	};
}

header!(
	/// `ContentLength`: the total size, in bytes, of the value this header
	/// precedes, including the header itself.
	ContentLengthHeader: u16, read_u16, write_u16
);

header!(
	/// `SerializationTypeId`: the dense, process-local id a user type was
	/// assigned at registration.
	SerializationTypeIdHeader: u16, read_u16, write_u16
);

header!(
	/// `CollectionLength`: the element count (not byte count) of an array,
	/// list, or map value.
	CollectionLengthHeader: u16, read_u16, write_u16
);

header!(
	/// `TypeData`: a one-byte flags field. Its meaning is codec-specific —
	/// bit 0 is the sparse flag on collections, or the enum's underlying
	/// integer width, or the key-value-pair null flag.
	TypeDataHeader: u8, read_u8, write_u8
);

impl TypeDataHeader {
	const SPARSE_BIT: u8 = 0b0000_0001;
	const NULL_VALUE_BIT: u8 = 0b0000_0001;

	/// Builds a `TypeData` byte for a collection, with the sparse bit set
	/// iff `sparse` is true.
	#[must_use]
	pub fn for_collection(sparse: bool) -> Self {
		Self(if sparse { Self::SPARSE_BIT } else { 0 })
	}

	/// Whether the sparse bit (bit 0) is set.
	#[must_use]
	pub fn is_sparse(self) -> bool {
		self.0 & Self::SPARSE_BIT != 0
	}

	/// Builds a `TypeData` byte for a key-value pair, with the null bit set
	/// iff the value is absent.
	#[must_use]
	pub fn for_kv_value(is_null: bool) -> Self {
		Self(if is_null { Self::NULL_VALUE_BIT } else { 0 })
	}

	/// Whether the key-value pair's value is null.
	#[must_use]
	pub fn is_null_value(self) -> bool {
		self.0 & Self::NULL_VALUE_BIT != 0
	}

	/// Builds a `TypeData` byte carrying an enum's underlying integer width,
	/// in bytes.
	#[must_use]
	pub fn for_enum_width(width_bytes: u8) -> Self {
		Self(width_bytes)
	}

	/// The underlying integer width, in bytes, carried by an enum codec's
	/// `TypeData` byte.
	#[must_use]
	pub fn enum_width(self) -> u8 {
		self.0
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn content_length_round_trip() {
		let mut buf = [0u8; 2];
		ContentLengthHeader(300).write(&mut buf, 0);
		assert_eq!(ContentLengthHeader::read(&buf, 0), ContentLengthHeader(300));
	}

	#[test]
	fn sparse_flag() {
		assert!(TypeDataHeader::for_collection(true).is_sparse());
		assert!(!TypeDataHeader::for_collection(false).is_sparse());
	}
}
