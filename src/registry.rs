// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The value-codec registry and struct-dispatch layer (§4.3, §4.4, §4.7):
//! a process-wide, append-only catalog of registered types, keyed both by
//! their static Rust [`TypeId`] and by the dense 16-bit
//! [`SerializationTypeId`] assigned at registration.
//!
//! [`Registry`] is the "handle" §9's design notes describe: construct one
//! at application startup, call [`Registry::register`] for every mapped
//! type, then clone the handle freely into concurrent readers. The split
//! between a write-locked `register` and a read-locked serialize/
//! deserialize/size path realizes §5's two-phase lifecycle directly — no
//! separate "frozen" type is needed since `Arc<RwLock<_>>` already gives
//! unsynchronized concurrent reads once registration calls stop.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::codec::FieldCodecDyn;
use crate::error::{SchemaError, SchemaResult, WireError, WireResult};
use crate::interpreter::CompiledStructCodec;
use crate::mapping::ObjectMapping;
use crate::size::WireSize;
use crate::program;

/// The dense, process-local id a user type is assigned at registration
/// (§3 "Runtime type registry"). Stable for the lifetime of the process;
/// never portable across processes or persisted (Non-goals, §1).
#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash, derive_more::From, derive_more::Into)]
pub struct SerializationTypeId(pub u16);

/// A type-erased struct codec: the four per-type operations (§4.4),
/// addressed through `&dyn Any` rather than a concrete `T`. Implemented by
/// [`CompiledStructCodec<T>`](crate::interpreter::CompiledStructCodec) for
/// every registered type and stored behind one `Arc<dyn ErasedStructCodec>`
/// per type so the dispatch layer can hold a single heterogeneous map.
pub trait ErasedStructCodec: Send + Sync {
	/// Serializes the concrete value behind `value` (which must be this
	/// codec's registered type) into `buf` at `off`.
	fn serialize_any(&self, value: &dyn Any, buf: &mut [u8], off: usize) -> WireResult<()>;

	/// Deserializes this codec's registered type from `buf` at `off`.
	fn deserialize_any(&self, buf: &[u8], off: usize) -> WireResult<Box<dyn Any>>;

	/// The wire size of the concrete value behind `value`.
	fn size_from_value_any(&self, value: &dyn Any) -> WireResult<u16>;

	/// The wire size of the struct value at `buf[off..]`, read from its
	/// `ContentLength` header.
	fn size_from_buffer(&self, buf: &[u8], off: usize) -> u16;

	/// This codec's assigned [`SerializationTypeId`].
	fn serialization_type_id(&self) -> SerializationTypeId;

	/// The registered type's name, for diagnostics.
	fn type_name(&self) -> &'static str;
}

#[derive(Default)]
struct RegistryState {
	next_id: u16,
	by_rust_type: HashMap<TypeId, SerializationTypeId>,
	by_wire_id: HashMap<u16, Arc<dyn ErasedStructCodec>>,
}

/// The process-wide, append-only type registry (§3, §5). Cheaply `Clone`
/// — clones share the same underlying catalog via `Arc`.
#[derive(Clone)]
pub struct Registry(Arc<RwLock<RegistryState>>);

impl Default for Registry {
	fn default() -> Self {
		Self::new()
	}
}

impl Registry {
	/// Creates an empty registry.
	#[must_use]
	pub fn new() -> Self {
		Self(Arc::new(RwLock::new(RegistryState::default())))
	}

	/// Registers `mapping` for type `T`, compiling its program, resolving
	/// every descriptor's field codec, and assigning the next dense
	/// [`SerializationTypeId`] (§4.4).
	///
	/// # Errors
	///
	/// Returns [`SchemaError::AlreadyRegistered`] if `T` was registered
	/// before this call; [`SchemaError::NoCodecForType`] if a
	/// `struct_value`/`nullable_struct_value` descriptor names a type that
	/// has not itself been registered yet (§4.3 cycle handling);
	/// [`SchemaError::ProgramOpCountMismatch`] if program compilation
	/// detects disagreeing op counts (§4.4).
	pub fn register<T: 'static + Send + Sync>(&self, mapping: ObjectMapping<T>) -> SchemaResult<()> {
		let rust_type = TypeId::of::<T>();
		{
			let state = self.0.read().expect("registry lock poisoned");
			if state.by_rust_type.contains_key(&rust_type) {
				return Err(SchemaError::AlreadyRegistered {
					type_name: mapping.type_name,
				});
			}
		}

		let compiled = program::compile(mapping.type_name, &mapping.activator, &mapping.assignable)?;

		let mut codecs: Vec<Arc<dyn FieldCodecDyn>> =
			Vec::with_capacity(mapping.activator.params().len() + mapping.assignable.len());
		for param in mapping.activator.params() {
			codecs.push((param.resolver())(self)?);
		}
		for value in &mapping.assignable {
			codecs.push((value.descriptor.resolver())(self)?);
		}

		let mut state = self.0.write().expect("registry lock poisoned");
		let type_id = SerializationTypeId(state.next_id);
		state.next_id = state
			.next_id
			.checked_add(1)
			.expect("serialization type id space exhausted");

		let codec = Arc::new(CompiledStructCodec::new(
			type_id,
			mapping.type_name,
			compiled,
			codecs,
			mapping.activator,
			mapping.assignable,
		));

		state.by_rust_type.insert(rust_type, type_id);
		state.by_wire_id.insert(type_id.0, codec);
		Ok(())
	}

	fn codec_for_rust_type(&self, rust_type: TypeId) -> Option<Arc<dyn ErasedStructCodec>> {
		let state = self.0.read().expect("registry lock poisoned");
		let type_id = *state.by_rust_type.get(&rust_type)?;
		state.by_wire_id.get(&type_id.0).cloned()
	}

	fn codec_for_wire_id(&self, wire_id: u16) -> Option<Arc<dyn ErasedStructCodec>> {
		let state = self.0.read().expect("registry lock poisoned");
		state.by_wire_id.get(&wire_id).cloned()
	}

	/// Serializes `value` of a registered type `T` into `buf` at `off`
	/// (§6 public codec surface).
	///
	/// # Errors
	///
	/// Returns [`WireError::RunTypeNotMapped`] if `T` was never registered.
	pub fn serialize<T: 'static>(&self, value: &T, buf: &mut [u8], off: usize) -> WireResult<()> {
		let codec = self.codec_for_rust_type(TypeId::of::<T>()).ok_or(WireError::RunTypeNotMapped {
			type_name: std::any::type_name::<T>(),
		})?;
		codec.serialize_any(value, buf, off)
	}

	/// Deserializes a value of registered type `T` from `buf` at `off`.
	///
	/// # Errors
	///
	/// Returns [`WireError::RunTypeNotMapped`] if `T` was never registered,
	/// or [`WireError::UnmappedTypeId`] if the wire bytes name a different
	/// registered type.
	pub fn deserialize<T: 'static>(&self, buf: &[u8], off: usize) -> WireResult<T> {
		let codec = self.codec_for_rust_type(TypeId::of::<T>()).ok_or(WireError::RunTypeNotMapped {
			type_name: std::any::type_name::<T>(),
		})?;
		let boxed = codec.deserialize_any(buf, off)?;
		Ok(*boxed.downcast::<T>().map_err(|_| WireError::TypeMismatch {
			expected: std::any::type_name::<T>(),
		})?)
	}

	/// The wire size of `value`, recomputed from the value itself.
	///
	/// # Errors
	///
	/// Returns [`WireError::RunTypeNotMapped`] if `T` was never registered.
	pub fn size_from_value<T: 'static>(&self, value: &T) -> WireResult<u16> {
		let codec = self.codec_for_rust_type(TypeId::of::<T>()).ok_or(WireError::RunTypeNotMapped {
			type_name: std::any::type_name::<T>(),
		})?;
		codec.size_from_value_any(value)
	}

	/// The wire size of the struct value at `buf[off..]`, for a registered
	/// type `T`. The underlying read only inspects the `ContentLength`
	/// header, so this never fails on a type lookup the way the other
	/// three operations do.
	#[must_use]
	pub fn size_from_buffer<T: 'static>(&self, buf: &[u8], off: usize) -> u16 {
		let _ = TypeId::of::<T>();
		crate::io::header::ContentLengthHeader::read(buf, off).0
	}

	/// Serializes a polymorphic value whose runtime type is only known at
	/// this call (§4.4 polymorphic dispatch): picks the codec registered
	/// for `value`'s actual runtime type and embeds its id.
	///
	/// # Errors
	///
	/// Returns [`WireError::RunTypeNotMapped`] if `value`'s runtime type was
	/// never registered.
	pub fn serialize_dyn(&self, value: &dyn Any, buf: &mut [u8], off: usize) -> WireResult<()> {
		let codec = self.codec_for_rust_type((*value).type_id()).ok_or(WireError::RunTypeNotMapped {
			type_name: "<unregistered runtime type>",
		})?;
		codec.serialize_any(value, buf, off)
	}

	/// Deserializes a polymorphic value by reading its
	/// [`SerializationTypeId`] from the wire first and routing to the
	/// matching codec (§4.4).
	///
	/// # Errors
	///
	/// Returns [`WireError::UnmappedTypeId`] if the id names no registered
	/// type.
	pub fn deserialize_dyn(&self, buf: &[u8], off: usize) -> WireResult<Box<dyn Any>> {
		use crate::io::header::{ContentLengthHeader, SerializationTypeIdHeader};
		WireError::check_bounds(
			buf.len(),
			off,
			ContentLengthHeader::SIZE + SerializationTypeIdHeader::SIZE,
		)?;
		let wire_id = SerializationTypeIdHeader::read(buf, off + ContentLengthHeader::SIZE).0;
		let codec = self.codec_for_wire_id(wire_id).ok_or(WireError::UnmappedTypeId(wire_id))?;
		codec.deserialize_any(buf, off)
	}

	/// Looks up the already-registered struct codec for `F`, wrapped as a
	/// [`FieldCodecDyn`] so a `struct_value`/`nullable_struct_value`
	/// descriptor can treat it like any other field codec.
	///
	/// # Errors
	///
	/// Returns [`SchemaError::NoCodecForType`] if `F` has not been
	/// registered yet (§4.3 cycle handling: declare struct fields after the
	/// types they reference).
	pub(crate) fn struct_field_codec<F: 'static + Send + Sync>(&self) -> SchemaResult<Arc<dyn FieldCodecDyn>> {
		let codec = self.codec_for_rust_type(TypeId::of::<F>()).ok_or(SchemaError::NoCodecForType {
			type_name: std::any::type_name::<F>(),
		})?;
		Ok(Arc::new(StructFieldCodec::<F> {
			codec,
			_marker: std::marker::PhantomData,
		}))
	}

	/// A codec for polymorphic ("object"-typed) descriptors: resolution is
	/// deferred to the value's runtime type at every call, via
	/// [`Registry::serialize_dyn`]/[`Registry::deserialize_dyn`].
	pub(crate) fn polymorphic_field_codec(&self) -> Arc<dyn FieldCodecDyn> {
		Arc::new(PolymorphicFieldCodec(self.clone()))
	}

	/// Builds a field codec for a dense array/list of registered structs
	/// (§4.5: "array-of-T" recursively materialized for a struct-shaped
	/// `T`, the one container shape the generic `Vec<T>`/`Sparse<T>` impls
	/// in [`crate::codec::collections`] cannot cover on their own, since a
	/// struct's codec is resolved per-[`Registry`] rather than through a
	/// global `Readable`/`Writable` impl.
	///
	/// # Errors
	///
	/// Returns [`SchemaError::NoCodecForType`] if `F` has not been
	/// registered yet.
	pub(crate) fn struct_array_field_codec<F: 'static + Send + Sync>(&self) -> SchemaResult<Arc<dyn FieldCodecDyn>> {
		let codec = self.codec_for_rust_type(TypeId::of::<F>()).ok_or(SchemaError::NoCodecForType {
			type_name: std::any::type_name::<F>(),
		})?;
		Ok(Arc::new(StructArrayFieldCodec::<F> {
			element: codec,
			_marker: std::marker::PhantomData,
		}))
	}

	/// Builds a field codec for a sparse array/list of registered structs
	/// (elements may be absent, tracked by the collection's own null
	/// mask — §4.5's shared collection skeleton).
	///
	/// # Errors
	///
	/// Returns [`SchemaError::NoCodecForType`] if `F` has not been
	/// registered yet.
	pub(crate) fn sparse_struct_array_field_codec<F: 'static + Send + Sync>(
		&self,
	) -> SchemaResult<Arc<dyn FieldCodecDyn>> {
		let codec = self.codec_for_rust_type(TypeId::of::<F>()).ok_or(SchemaError::NoCodecForType {
			type_name: std::any::type_name::<F>(),
		})?;
		Ok(Arc::new(SparseStructArrayFieldCodec::<F> {
			element: codec,
			_marker: std::marker::PhantomData,
		}))
	}
}

/// Adapts an already-registered struct's [`ErasedStructCodec`] to
/// [`FieldCodecDyn`], for a field whose declared type is a concrete,
/// previously-registered struct `F`.
struct StructFieldCodec<F> {
	codec: Arc<dyn ErasedStructCodec>,
	_marker: std::marker::PhantomData<fn() -> F>,
}

impl<F: 'static + Send + Sync> FieldCodecDyn for StructFieldCodec<F> {
	fn serialize_any(&self, value: &dyn Any, buf: &mut [u8], off: usize) -> WireResult<()> {
		self.codec.serialize_any(value, buf, off)
	}

	fn deserialize_any(&self, buf: &[u8], off: usize) -> WireResult<Box<dyn Any>> {
		self.codec.deserialize_any(buf, off)
	}

	fn size_from_value_any(&self, value: &dyn Any) -> WireResult<u16> {
		self.codec.size_from_value_any(value)
	}

	fn type_name(&self) -> &'static str {
		self.codec.type_name()
	}
}

/// A [`FieldCodecDyn`] for fields declared at a base/`object` shape (§4.4):
/// every call re-resolves the codec from the value's actual runtime type.
struct PolymorphicFieldCodec(Registry);

impl FieldCodecDyn for PolymorphicFieldCodec {
	fn serialize_any(&self, value: &dyn Any, buf: &mut [u8], off: usize) -> WireResult<()> {
		self.0.serialize_dyn(value, buf, off)
	}

	fn deserialize_any(&self, buf: &[u8], off: usize) -> WireResult<Box<dyn Any>> {
		self.0.deserialize_dyn(buf, off)
	}

	fn size_from_value_any(&self, value: &dyn Any) -> WireResult<u16> {
		let codec = self.0.codec_for_rust_type((*value).type_id()).ok_or(WireError::RunTypeNotMapped {
			type_name: "<unregistered runtime type>",
		})?;
		codec.size_from_value_any(value)
	}

	fn type_name(&self) -> &'static str {
		"<polymorphic>"
	}
}

const COLLECTION_HEADER_SIZE: usize = crate::io::header::ContentLengthHeader::SIZE
	+ crate::io::header::CollectionLengthHeader::SIZE
	+ crate::io::header::TypeDataHeader::SIZE;

/// A [`FieldCodecDyn`] for a dense `Vec<F>` whose element `F` is itself a
/// registered struct. Implements the shared collection wire skeleton
/// (§4.5) directly in terms of the element's [`ErasedStructCodec`], since
/// `F` cannot carry a global `Readable`/`Writable` impl the way
/// [`crate::codec::collections`]'s `Vec<T>` blanket impl requires.
struct StructArrayFieldCodec<F> {
	element: Arc<dyn ErasedStructCodec>,
	_marker: std::marker::PhantomData<fn() -> F>,
}

impl<F: 'static + Send + Sync> StructArrayFieldCodec<F> {
	fn downcast<'a>(&self, value: &'a dyn Any) -> WireResult<&'a Vec<F>> {
		value.downcast_ref::<Vec<F>>().ok_or(WireError::TypeMismatch {
			expected: self.type_name(),
		})
	}
}

impl<F: 'static + Send + Sync> FieldCodecDyn for StructArrayFieldCodec<F> {
	fn serialize_any(&self, value: &dyn Any, buf: &mut [u8], off: usize) -> WireResult<()> {
		use crate::io::header::{CollectionLengthHeader, ContentLengthHeader, TypeDataHeader};

		let elements = self.downcast(value)?;
		let total_size = self.size_from_value_any(value)?;
		WireError::check_bounds(buf.len(), off, total_size as usize)?;

		ContentLengthHeader(total_size).write(buf, off);
		CollectionLengthHeader(WireError::check_u16(elements.len())?)
			.write(buf, off + ContentLengthHeader::SIZE);
		TypeDataHeader::for_collection(false)
			.write(buf, off + ContentLengthHeader::SIZE + CollectionLengthHeader::SIZE);

		let mut cursor = off + COLLECTION_HEADER_SIZE;
		for element in elements {
			self.element.serialize_any(element, buf, cursor)?;
			cursor += self.element.size_from_value_any(element)? as usize;
		}
		Ok(())
	}

	fn deserialize_any(&self, buf: &[u8], off: usize) -> WireResult<Box<dyn Any>> {
		use crate::io::header::{CollectionLengthHeader, ContentLengthHeader};

		WireError::check_bounds(buf.len(), off, COLLECTION_HEADER_SIZE)?;
		let count = CollectionLengthHeader::read(buf, off + ContentLengthHeader::SIZE).0 as usize;

		let mut cursor = off + COLLECTION_HEADER_SIZE;
		let mut elements: Vec<F> = Vec::with_capacity(count);
		for _ in 0..count {
			let boxed = self.element.deserialize_any(buf, cursor)?;
			cursor += self.element.size_from_value_any(boxed.as_ref())? as usize;
			elements.push(*boxed.downcast::<F>().map_err(|_| WireError::TypeMismatch {
				expected: self.type_name(),
			})?);
		}
		Ok(Box::new(elements))
	}

	fn size_from_value_any(&self, value: &dyn Any) -> WireResult<u16> {
		let elements = self.downcast(value)?;
		let mut size = COLLECTION_HEADER_SIZE;
		for element in elements {
			size += self.element.size_from_value_any(element)? as usize;
		}
		WireError::check_u16(size)
	}

	fn type_name(&self) -> &'static str {
		std::any::type_name::<Vec<F>>()
	}
}

/// A [`FieldCodecDyn`] for a `Vec<Option<F>>` whose element `F` is itself
/// a registered struct; the sparse counterpart of
/// [`StructArrayFieldCodec`], carrying its own [`BitField`](crate::bitfield::BitField)
/// null mask ahead of the present elements (§4.5), distinct from any null
/// mask the enclosing struct may have.
struct SparseStructArrayFieldCodec<F> {
	element: Arc<dyn ErasedStructCodec>,
	_marker: std::marker::PhantomData<fn() -> F>,
}

impl<F: 'static + Send + Sync> SparseStructArrayFieldCodec<F> {
	fn downcast<'a>(&self, value: &'a dyn Any) -> WireResult<&'a Vec<Option<F>>> {
		value.downcast_ref::<Vec<Option<F>>>().ok_or(WireError::TypeMismatch {
			expected: self.type_name(),
		})
	}
}

impl<F: 'static + Send + Sync> FieldCodecDyn for SparseStructArrayFieldCodec<F> {
	fn serialize_any(&self, value: &dyn Any, buf: &mut [u8], off: usize) -> WireResult<()> {
		use crate::bitfield::BitField;
		use crate::io::header::{CollectionLengthHeader, ContentLengthHeader, TypeDataHeader};

		let elements = self.downcast(value)?;
		let sparse = elements.iter().any(Option::is_none);
		let total_size = self.size_from_value_any(value)?;
		WireError::check_bounds(buf.len(), off, total_size as usize)?;

		ContentLengthHeader(total_size).write(buf, off);
		CollectionLengthHeader(WireError::check_u16(elements.len())?)
			.write(buf, off + ContentLengthHeader::SIZE);
		TypeDataHeader::for_collection(sparse)
			.write(buf, off + ContentLengthHeader::SIZE + CollectionLengthHeader::SIZE);

		let mut cursor = off + COLLECTION_HEADER_SIZE;
		if sparse {
			let mut mask = BitField::new(BitField::bytes_len_from_bits(elements.len()));
			for (i, element) in elements.iter().enumerate() {
				mask.set_bit(i, element.is_none());
			}
			mask.serialize(buf, cursor)?;
			cursor += mask.wire_size() as usize;
		}

		for element in elements.iter().flatten() {
			self.element.serialize_any(element, buf, cursor)?;
			cursor += self.element.size_from_value_any(element)? as usize;
		}
		Ok(())
	}

	fn deserialize_any(&self, buf: &[u8], off: usize) -> WireResult<Box<dyn Any>> {
		use crate::bitfield::BitField;
		use crate::io::header::{CollectionLengthHeader, ContentLengthHeader, TypeDataHeader};

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

		let mut elements: Vec<Option<F>> = Vec::with_capacity(count);
		for i in 0..count {
			if mask.get_bit(i) {
				elements.push(None);
			} else {
				let boxed = self.element.deserialize_any(buf, cursor)?;
				cursor += self.element.size_from_value_any(boxed.as_ref())? as usize;
				elements.push(Some(*boxed.downcast::<F>().map_err(|_| WireError::TypeMismatch {
					expected: self.type_name(),
				})?));
			}
		}
		Ok(Box::new(elements))
	}

	fn size_from_value_any(&self, value: &dyn Any) -> WireResult<u16> {
		use crate::bitfield::BitField;

		let elements = self.downcast(value)?;
		let sparse = elements.iter().any(Option::is_none);
		let mut size = COLLECTION_HEADER_SIZE;
		if sparse {
			size += BitField::bytes_len_from_bits(elements.len()) + 2;
		}
		for element in elements.iter().flatten() {
			size += self.element.size_from_value_any(element)? as usize;
		}
		WireError::check_u16(size)
	}

	fn type_name(&self) -> &'static str {
		std::any::type_name::<Vec<Option<F>>>()
	}
}
