// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Collection codecs (§4.5): dense arrays/lists (`Vec<T>`), sparse
//! arrays/lists ([`Sparse<T>`]), maps (`HashMap<K, V>`, defined as an array
//! of [`KeyValuePair`]), and key-value pairs themselves.
//!
//! Grounded in `xrbk`'s `Vec<T>`/`[T; N]` `Writable`/`X11Size` impls in
//! `writable.rs`/`x11_size.rs` (sum-of-elements size, element-by-element
//! write), generalized with the `CollectionLength`/`TypeData` wire header
//! the spec requires and, for [`Sparse<T>`], the null-mask machinery of
//! [`crate::bitfield`]. Every container here resolves its element codec
//! through an ordinary `T: Readable + Writable` bound — the compile-time
//! realization of the registry's recursive `extend` step (§9).

use std::collections::HashMap;
use std::hash::Hash;

use super::{Readable, Writable};
use crate::bitfield::BitField;
use crate::error::{WireError, WireResult};
use crate::io::header::{CollectionLengthHeader, ContentLengthHeader, TypeDataHeader};
use crate::size::WireSize;

const COLLECTION_HEADER_SIZE: usize =
	ContentLengthHeader::SIZE + CollectionLengthHeader::SIZE + TypeDataHeader::SIZE;

impl<T: WireSize> WireSize for Vec<T> {
	fn wire_size(&self) -> u16 {
		let elements: u16 = self.iter().map(WireSize::wire_size).sum();
		elements + COLLECTION_HEADER_SIZE as u16
	}
}

impl<T: Readable + Writable> Readable for Vec<T> {
	fn deserialize(buf: &[u8], off: usize) -> WireResult<Self> {
		WireError::check_bounds(buf.len(), off, COLLECTION_HEADER_SIZE)?;
		let count = CollectionLengthHeader::read(buf, off + ContentLengthHeader::SIZE).0 as usize;
		let mut cursor = off + COLLECTION_HEADER_SIZE;
		let mut elements = Self::with_capacity(count);
		for _ in 0..count {
			let element = T::deserialize(buf, cursor)?;
			cursor += element.wire_size() as usize;
			elements.push(element);
		}
		Ok(elements)
	}
}

impl<T: Readable + Writable> Writable for Vec<T> {
	fn serialize(&self, buf: &mut [u8], off: usize) -> WireResult<()> {
		WireError::check_bounds(buf.len(), off, self.wire_size() as usize)?;
		ContentLengthHeader(WireError::check_u16(self.wire_size() as usize)?).write(buf, off);
		CollectionLengthHeader(WireError::check_u16(self.len())?)
			.write(buf, off + ContentLengthHeader::SIZE);
		TypeDataHeader::for_collection(false)
			.write(buf, off + ContentLengthHeader::SIZE + CollectionLengthHeader::SIZE);

		let mut cursor = off + COLLECTION_HEADER_SIZE;
		for element in self {
			element.serialize(buf, cursor)?;
			cursor += element.wire_size() as usize;
		}
		Ok(())
	}
}

/// A collection that may contain null elements. Wraps a `Vec<Option<T>>`
/// and adds the `TypeData` sparse bit plus a [`BitField`] null mask ahead
/// of the present elements, per §4.5's shared collection skeleton.
///
/// `Vec<T>` (above) and `Sparse<T>` are deliberately distinct Rust types
/// rather than a single blanket `impl<T> Trait for Vec<T>` specialized
/// over `T = Option<U>` — stable Rust has no specialization (the teacher's
/// `xrbk` reaches for nightly `#[feature(specialization)]` for exactly
/// this shape; see DESIGN.md for why `bitwire` avoids it), so the sparse
/// and dense wire forms get separate, non-overlapping impls instead.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Sparse<T>(pub Vec<Option<T>>);

impl<T: WireSize> WireSize for Sparse<T> {
	fn wire_size(&self) -> u16 {
		let elements: u16 = self.0.iter().flatten().map(WireSize::wire_size).sum();
		let sparse = self.0.iter().any(Option::is_none);
		// The null-mask BitField (its own 2-byte ContentLength plus mask
		// bytes) is only present when `serialize` actually writes it, i.e.
		// when the collection contains at least one null — mirroring the
		// sparse check in `Writable::serialize` below exactly.
		let mask_size = if sparse {
			BitField::bytes_len_from_bits(self.0.len()) as u16 + 2
		} else {
			0
		};
		elements + COLLECTION_HEADER_SIZE as u16 + mask_size
	}
}

impl<T: Readable + Writable> Readable for Sparse<T> {
	fn deserialize(buf: &[u8], off: usize) -> WireResult<Self> {
		WireError::check_bounds(buf.len(), off, COLLECTION_HEADER_SIZE)?;
		let count = CollectionLengthHeader::read(buf, off + ContentLengthHeader::SIZE).0 as usize;
		let type_data =
			TypeDataHeader::read(buf, off + ContentLengthHeader::SIZE + CollectionLengthHeader::SIZE);

		let mut cursor = off + COLLECTION_HEADER_SIZE;
		let mask = if type_data.is_sparse() {
			let mask = BitField::deserialize(buf, cursor);
			cursor += mask.wire_size() as usize;
			mask
		} else {
			BitField::new(BitField::bytes_len_from_bits(count))
		};

		let mut elements = Vec::with_capacity(count);
		for i in 0..count {
			if mask.get_bit(i) {
				elements.push(None);
			} else {
				let element = T::deserialize(buf, cursor)?;
				cursor += element.wire_size() as usize;
				elements.push(Some(element));
			}
		}
		Ok(Self(elements))
	}
}

impl<T: Readable + Writable> Writable for Sparse<T> {
	fn serialize(&self, buf: &mut [u8], off: usize) -> WireResult<()> {
		WireError::check_bounds(buf.len(), off, self.wire_size() as usize)?;
		let sparse = self.0.iter().any(Option::is_none);

		ContentLengthHeader(WireError::check_u16(self.wire_size() as usize)?).write(buf, off);
		CollectionLengthHeader(WireError::check_u16(self.0.len())?)
			.write(buf, off + ContentLengthHeader::SIZE);
		TypeDataHeader::for_collection(sparse)
			.write(buf, off + ContentLengthHeader::SIZE + CollectionLengthHeader::SIZE);

		let mut cursor = off + COLLECTION_HEADER_SIZE;
		if sparse {
			let mut mask = BitField::new(BitField::bytes_len_from_bits(self.0.len()));
			for (i, element) in self.0.iter().enumerate() {
				mask.set_bit(i, element.is_none());
			}
			mask.serialize(buf, cursor)?;
			cursor += mask.wire_size() as usize;
		}

		for element in self.0.iter().flatten() {
			element.serialize(buf, cursor)?;
			cursor += element.wire_size() as usize;
		}
		Ok(())
	}
}

/// A single key-value pair (§4.5). Keys are never null; the value may be
/// absent, tracked by `TypeData` rather than the pair's own null mask (a
/// pair has no other nullable member to share a mask with).
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct KeyValuePair<K, V> {
	pub key: K,
	pub value: Option<V>,
}

const KV_HEADER_SIZE: usize = ContentLengthHeader::SIZE;

impl<K: WireSize, V: WireSize> WireSize for KeyValuePair<K, V> {
	fn wire_size(&self) -> u16 {
		let value_len = self.value.as_ref().map_or(0, WireSize::wire_size);
		KV_HEADER_SIZE as u16 + self.key.wire_size() + TypeDataHeader::SIZE as u16 + value_len
	}
}

impl<K: Readable + Writable, V: Readable + Writable> Readable for KeyValuePair<K, V> {
	fn deserialize(buf: &[u8], off: usize) -> WireResult<Self> {
		WireError::check_bounds(buf.len(), off, KV_HEADER_SIZE)?;
		let mut cursor = off + KV_HEADER_SIZE;
		let key = K::deserialize(buf, cursor)?;
		cursor += key.wire_size() as usize;

		let type_data = TypeDataHeader::read(buf, cursor);
		cursor += TypeDataHeader::SIZE;

		let value = if type_data.is_null_value() {
			None
		} else {
			Some(V::deserialize(buf, cursor)?)
		};

		Ok(Self { key, value })
	}
}

impl<K: Readable + Writable, V: Readable + Writable> Writable for KeyValuePair<K, V> {
	fn serialize(&self, buf: &mut [u8], off: usize) -> WireResult<()> {
		WireError::check_bounds(buf.len(), off, self.wire_size() as usize)?;
		ContentLengthHeader(WireError::check_u16(self.wire_size() as usize)?).write(buf, off);

		let mut cursor = off + KV_HEADER_SIZE;
		self.key.serialize(buf, cursor)?;
		cursor += self.key.wire_size() as usize;

		TypeDataHeader::for_kv_value(self.value.is_none()).write(buf, cursor);
		cursor += TypeDataHeader::SIZE;

		if let Some(value) = &self.value {
			value.serialize(buf, cursor)?;
		}
		Ok(())
	}
}

/// Maps are defined as an array of key-value pairs (§4.5), over whichever
/// iteration order `HashMap` happens to produce — this format makes no
/// promise of a stable on-wire key order (no such promise is made in §4,
/// and the non-goals explicitly exclude canonical encodings).
impl<K: WireSize + Eq + Hash, V: WireSize> WireSize for HashMap<K, V> {
	fn wire_size(&self) -> u16 {
		let pairs: u16 = self
			.iter()
			.map(|(k, v)| KV_HEADER_SIZE as u16 + k.wire_size() + TypeDataHeader::SIZE as u16 + v.wire_size())
			.sum();
		pairs + COLLECTION_HEADER_SIZE as u16
	}
}

impl<K: Readable + Writable + Eq + Hash, V: Readable + Writable> Readable for HashMap<K, V> {
	fn deserialize(buf: &[u8], off: usize) -> WireResult<Self> {
		let pairs = Vec::<KeyValuePair<K, V>>::deserialize(buf, off)?;
		Ok(pairs
			.into_iter()
			.filter_map(|pair| pair.value.map(|v| (pair.key, v)))
			.collect())
	}
}

impl<K: Readable + Writable + Eq + Hash + Clone, V: Readable + Writable + Clone> Writable
	for HashMap<K, V>
{
	fn serialize(&self, buf: &mut [u8], off: usize) -> WireResult<()> {
		let pairs: Vec<KeyValuePair<K, V>> = self
			.iter()
			.map(|(k, v)| KeyValuePair {
				key: k.clone(),
				value: Some(v.clone()),
			})
			.collect();
		pairs.serialize(buf, off)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn empty_nullable_collection() {
		// S6 — empty array of i32?, modeled as Sparse<i32> with zero
		// elements: ContentLength=5, CollectionLength=0, TypeData=0x00.
		let empty: Sparse<i32> = Sparse(Vec::new());
		let mut buf = [0u8; 5];
		empty.serialize(&mut buf, 0).unwrap();
		assert_eq!(buf, [5, 0, 0, 0, 0]);
	}

	#[test]
	fn sparse_array_null_mask() {
		// S4 — sparse array with three present i32 elements among four
		// nulls, simplified to primitives to isolate the mask/skip logic.
		let values = Sparse(vec![None, Some(1), None, None, Some(2), None, Some(3)]);
		let mut buf = vec![0u8; values.wire_size() as usize];
		values.serialize(&mut buf, 0).unwrap();
		assert_eq!(CollectionLengthHeader::read(&buf, 2).0, 7);
		assert!(TypeDataHeader::read(&buf, 4).is_sparse());
		// buf[5..7] is the nested BitField's own ContentLength (1 mask
		// byte + 2 header bytes = 3); the mask byte itself is at buf[7].
		assert_eq!(buf[7], 0b1011_0100);
		assert_eq!(Sparse::<i32>::deserialize(&buf, 0).unwrap(), values);
	}

	#[test]
	fn dense_array_has_no_mask() {
		let values = vec![1i32, 2, 3];
		let mut buf = vec![0u8; values.wire_size() as usize];
		values.serialize(&mut buf, 0).unwrap();
		assert!(!TypeDataHeader::read(&buf, 4).is_sparse());
		assert_eq!(Vec::<i32>::deserialize(&buf, 0).unwrap(), values);
	}

	#[test]
	fn key_value_pair_with_null_value() {
		let pair = KeyValuePair {
			key: 7i32,
			value: None::<i32>,
		};
		let mut buf = vec![0u8; pair.wire_size() as usize];
		pair.serialize(&mut buf, 0).unwrap();
		assert_eq!(KeyValuePair::<i32, i32>::deserialize(&buf, 0).unwrap(), pair);
	}

	#[test]
	fn map_round_trip() {
		let mut map = HashMap::new();
		map.insert(1i32, "one".to_string());
		map.insert(2i32, "two".to_string());
		let mut buf = vec![0u8; map.wire_size() as usize];
		map.serialize(&mut buf, 0).unwrap();
		assert_eq!(HashMap::<i32, String>::deserialize(&buf, 0).unwrap(), map);
	}
}
