// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The "enum-as-underlying" generic codec (§4.5): a fixed-type codec bound
//! to one concrete enum's underlying integer primitive, preceded by a
//! `TypeData` byte carrying that primitive's width.
//!
//! [`WireEnum`] supplies the `serialize_enum`/`deserialize_enum` mechanics;
//! it does not blanket-implement [`Readable`]/[`Writable`] for every `T:
//! WireEnum`; a blanket impl bounded only by a marker trait is exactly what
//! forces `xrbk` onto nightly `#[feature(specialization)]` to coexist with
//! concrete impls like `Readable for i32` (see DESIGN.md) — stable Rust's
//! coherence rules cannot prove the two never overlap. Each enum instead
//! gets a one-line concrete `Readable`/`Writable` impl that delegates here,
//! the same shape `xrbk_macro` would generate, written by hand.

use super::{Readable, Writable};
use crate::error::WireError;
use crate::error::WireResult;
use crate::io::header::TypeDataHeader;
use crate::size::{ConstantWireSize, WireSize};

/// An enum whose wire representation is its underlying integer primitive,
/// preceded by a one-byte width marker.
pub trait WireEnum: Sized {
	/// The underlying integer primitive this enum is serialized as.
	type Repr: Readable + Writable + ConstantWireSize + Copy;

	/// Converts `self` to its underlying representation.
	fn to_repr(&self) -> Self::Repr;

	/// Converts an underlying representation back into `Self`.
	///
	/// # Errors
	///
	/// Returns [`WireError::UnrecognizedDiscriminant`] if `repr` does not
	/// correspond to any variant.
	fn from_repr(repr: Self::Repr) -> WireResult<Self>;

	/// The wire size of this enum: one `TypeData` byte plus the width of
	/// [`Self::Repr`].
	fn enum_wire_size() -> u16 {
		TypeDataHeader::SIZE as u16 + Self::Repr::WIRE_SIZE
	}

	/// Writes this enum's `TypeData` width byte followed by its underlying
	/// value, per §4.5.
	fn serialize_enum(&self, buf: &mut [u8], off: usize) -> WireResult<()> {
		WireError::check_bounds(buf.len(), off, Self::enum_wire_size() as usize)?;
		TypeDataHeader::for_enum_width(Self::Repr::WIRE_SIZE as u8).write(buf, off);
		self.to_repr().serialize(buf, off + TypeDataHeader::SIZE)
	}

	/// Reads an enum's `TypeData` width byte and underlying value, then
	/// resolves the variant via [`WireEnum::from_repr`].
	///
	/// # Errors
	///
	/// Returns [`WireError::UnrecognizedDiscriminant`] for a value that
	/// matches no variant.
	fn deserialize_enum(buf: &[u8], off: usize) -> WireResult<Self> {
		WireError::check_bounds(buf.len(), off, Self::enum_wire_size() as usize)?;
		// The width byte is informational (it lets a peer sanity-check the
		// encoding); decoding always reads `Self::Repr`'s own fixed width.
		let repr = Self::Repr::deserialize(buf, off + TypeDataHeader::SIZE)?;
		Self::from_repr(repr)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[derive(Copy, Clone, Eq, PartialEq, Debug)]
	enum Direction {
		North,
		East,
		South,
		West,
	}

	impl WireEnum for Direction {
		type Repr = u8;

		fn to_repr(&self) -> u8 {
			match self {
				Self::North => 0,
				Self::East => 1,
				Self::South => 2,
				Self::West => 3,
			}
		}

		fn from_repr(repr: u8) -> WireResult<Self> {
			match repr {
				0 => Ok(Self::North),
				1 => Ok(Self::East),
				2 => Ok(Self::South),
				3 => Ok(Self::West),
				other => Err(WireError::UnrecognizedDiscriminant(u64::from(other))),
			}
		}
	}

	impl WireSize for Direction {
		fn wire_size(&self) -> u16 {
			Self::enum_wire_size()
		}
	}

	impl Readable for Direction {
		fn deserialize(buf: &[u8], off: usize) -> WireResult<Self> {
			Self::deserialize_enum(buf, off)
		}
	}

	impl Writable for Direction {
		fn serialize(&self, buf: &mut [u8], off: usize) -> WireResult<()> {
			self.serialize_enum(buf, off)
		}
	}

	#[test]
	fn enum_round_trip_carries_width() {
		let mut buf = [0u8; 2];
		Direction::East.serialize(&mut buf, 0).unwrap();
		assert_eq!(buf, [1, 1]);
		assert_eq!(Direction::deserialize(&buf, 0).unwrap(), Direction::East);
	}

	#[test]
	fn unrecognized_discriminant_errors() {
		let buf = [1u8, 9];
		assert!(matches!(
			Direction::deserialize(&buf, 0),
			Err(WireError::UnrecognizedDiscriminant(9))
		));
	}
}
