// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The value-codec layer (§4.3): [`Readable`]/[`Writable`] are implemented
//! directly on concrete value types, generalizing `xrbk`'s traits of the
//! same shape from a streaming `Buf`/`BufMut` cursor to this format's
//! offset-addressed `&[u8]` contract. Container shapes (arrays, optional
//! fields, key-value pairs, enums) are resolved by the Rust compiler
//! through ordinary generic instantiation — the "recursive instantiation
//! of codecs for generic container shapes" the design calls for, realized
//! at compile time per §9's design notes rather than through a runtime
//! `supports`/`extend` table.
//!
//! The struct-dispatch layer (registry.rs) is the one place this format
//! needs genuine runtime polymorphism (a field typed as a base/`object`
//! shape, routed by a 16-bit id read from the wire) — that's bridged
//! through [`FieldCodecDyn`], a type-erased adapter over any
//! `Readable + Writable`.

mod collections;
mod enum_codec;
mod primitives;
mod string;

pub use collections::{KeyValuePair, Sparse};
pub use enum_codec::WireEnum;

use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{SchemaError, WireResult};
use crate::size::WireSize;

/// Reads a type from a byte slice at a caller-supplied offset.
pub trait Readable: WireSize {
	/// Reads `Self` from `buf` at `off`.
	///
	/// # Errors
	///
	/// Returns [`crate::WireError`] if the bytes at `off` do not decode to a
	/// valid `Self` (an unrecognized enum discriminant, a length that
	/// overflows the buffer).
	fn deserialize(buf: &[u8], off: usize) -> WireResult<Self>
	where
		Self: Sized;
}

/// Writes a type to a byte slice at a caller-supplied offset.
pub trait Writable: WireSize {
	/// Writes `self` into `buf` at `off`.
	///
	/// # Errors
	///
	/// Returns [`crate::WireError`] if `self`'s size exceeds the `u16` wire
	/// limit.
	fn serialize(&self, buf: &mut [u8], off: usize) -> WireResult<()>;
}

/// A type-erased codec over a single concrete field type, used by the
/// [`mapping`](crate::mapping) and [`program`](crate::program) layers to
/// walk a struct's descriptors without being generic over every field type
/// at once. Each struct field's declared type resolves to one of these
/// at mapping-build time, via [`field_codec`] — which is only callable for
/// `F: Readable + Writable`, so "no codec for type" is a compile error
/// here rather than the registration-time [`SchemaError`] the source
/// reflection-based design would raise for it (see DESIGN.md).
pub trait FieldCodecDyn: Send + Sync {
	/// Serializes the concrete value behind `value` (which must be the
	/// `F` this codec was built for) into `buf` at `off`.
	fn serialize_any(&self, value: &dyn Any, buf: &mut [u8], off: usize) -> WireResult<()>;

	/// Deserializes a value of this codec's `F` from `buf` at `off`.
	fn deserialize_any(&self, buf: &[u8], off: usize) -> WireResult<Box<dyn Any>>;

	/// The wire size of the concrete value behind `value`.
	fn size_from_value_any(&self, value: &dyn Any) -> WireResult<u16>;

	/// The name of the concrete type this codec was built for, for
	/// diagnostics.
	fn type_name(&self) -> &'static str;
}

struct FieldCodecAdapter<F>(PhantomData<fn() -> F>);

impl<F: Readable + Writable + 'static> FieldCodecDyn for FieldCodecAdapter<F> {
	fn serialize_any(&self, value: &dyn Any, buf: &mut [u8], off: usize) -> WireResult<()> {
		let value = value.downcast_ref::<F>().unwrap_or_else(|| {
			unreachable!("FieldCodecAdapter<{}> handed a value of a different type", self.type_name())
		});
		value.serialize(buf, off)
	}

	fn deserialize_any(&self, buf: &[u8], off: usize) -> WireResult<Box<dyn Any>> {
		Ok(Box::new(F::deserialize(buf, off)?))
	}

	fn size_from_value_any(&self, value: &dyn Any) -> WireResult<u16> {
		let value = value.downcast_ref::<F>().unwrap_or_else(|| {
			unreachable!("FieldCodecAdapter<{}> handed a value of a different type", self.type_name())
		});
		Ok(value.wire_size())
	}

	fn type_name(&self) -> &'static str {
		std::any::type_name::<F>()
	}
}

/// Resolves the codec for a field's declared value type `F`. `F` must
/// implement [`Readable`] and [`Writable`] — that bound *is* the
/// resolution algorithm of §4.3 applied at compile time: fixed codecs are
/// direct impls, generic container shapes (`Vec<T>`, [`Sparse<T>`],
/// [`KeyValuePair`]) are impls parameterized by their own `Readable +
/// Writable` inner type, recursing exactly as the registry's
/// `can_extend`/`extend` pair would, but resolved by the compiler instead
/// of a runtime table.
#[must_use]
pub fn field_codec<F: Readable + Writable + 'static>() -> Arc<dyn FieldCodecDyn> {
	Arc::new(FieldCodecAdapter::<F>(PhantomData))
}

impl From<String> for SchemaError {
	fn from(message: String) -> Self {
		Self::Other(message.into())
	}
}
