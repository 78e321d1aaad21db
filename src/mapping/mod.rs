// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The object-mapping builder (§4.5): a fluent description of which
//! members of a user type participate in (de)serialization, how the type
//! is constructed, and the on-wire ordering (activator values first, then
//! assignable values in declared order — §3's "Object serialization
//! mapping" invariant).
//!
//! No file in the teacher describes a type this way (`xrb`'s structures
//! are described once, structurally, via `#[derive(Readable, Writable,
//! ...)]`); this module is new code built directly from §4.5's text, in
//! the idiomatic Rust consuming-builder shape (`fn method(mut self, ...)
//! -> Self`) used throughout the wider example pack wherever a type is
//! assembled through chained calls rather than named fields.

mod activator;
mod descriptor;

pub use activator::{Activator, ParameterizedActivatorBuilder};
pub use descriptor::{FieldGetter, FieldSetter, ValueDescriptor};

use std::any::Any;
use std::sync::Arc;

use crate::codec::{field_codec, FieldCodecDyn, Readable, Writable};
use crate::error::SchemaResult;
use crate::registry::Registry;

use descriptor::{AlwaysGetter, OptionGetter, OptionalSetter, PolymorphicSetter, RequiredSetter};

/// Resolves a descriptor's codec once the enclosing type is registered.
/// For a primitive or collection field the codec is already known at
/// mapping-build time and the resolver just hands back a clone; for a
/// struct-typed or polymorphic field, resolution needs the
/// [`Registry`] itself (to look up an already-registered struct codec, or
/// to bind a back-reference for runtime dispatch) and so is deferred to
/// [`Registry::register`].
pub(crate) type CodecResolver = Box<dyn Fn(&Registry) -> SchemaResult<Arc<dyn FieldCodecDyn>> + Send + Sync>;

/// A descriptor bound to a setter: one post-construction assignable
/// member of a mapping, written back onto `T` after the activator runs.
pub struct AssignableValue<T> {
	pub(crate) descriptor: ValueDescriptor<T>,
	pub(crate) setter: Box<dyn FieldSetter<T>>,
}

/// A fluent description of type `T`'s wire schema: how it is constructed
/// ([`Activator`]) and which members are assigned afterward (§3's "Object
/// serialization mapping").
pub struct ObjectMapping<T> {
	pub(crate) type_name: &'static str,
	pub(crate) activator: Activator<T>,
	pub(crate) assignable: Vec<AssignableValue<T>>,
}

impl<T: 'static> ObjectMapping<T> {
	/// Starts a mapping for `T`, named `type_name` for diagnostics, using
	/// `activator` to construct values on deserialize.
	#[must_use]
	pub fn new(type_name: &'static str, activator: Activator<T>) -> Self {
		Self {
			type_name,
			activator,
			assignable: Vec::new(),
		}
	}

	/// Adds a required (non-nullable) assignable value of a fixed or
	/// collection type `F`, read via `get` and written back via `set`.
	#[must_use]
	pub fn value<F: Readable + Writable + 'static>(
		mut self,
		name: &'static str,
		get: impl for<'a> Fn(&'a T) -> &'a F + Send + Sync + 'static,
		set: impl Fn(&mut T, F) + Send + Sync + 'static,
	) -> Self {
		let codec = field_codec::<F>();
		self.assignable.push(AssignableValue {
			descriptor: ValueDescriptor {
				name,
				nullable: false,
				resolver: Box::new(move |_registry| Ok(codec.clone())),
				getter: Box::new(AlwaysGetter { func: Box::new(get) }),
			},
			setter: Box::new(RequiredSetter { func: Box::new(set) }),
		});
		self
	}

	/// Adds a nullable assignable value of type `F`. `get` returns `None`
	/// when the value is currently absent; `set` receives `None` when the
	/// wire carried no value for it.
	#[must_use]
	pub fn nullable_value<F: Readable + Writable + 'static>(
		mut self,
		name: &'static str,
		get: impl for<'a> Fn(&'a T) -> Option<&'a F> + Send + Sync + 'static,
		set: impl Fn(&mut T, Option<F>) + Send + Sync + 'static,
	) -> Self {
		let codec = field_codec::<F>();
		self.assignable.push(AssignableValue {
			descriptor: ValueDescriptor {
				name,
				nullable: true,
				resolver: Box::new(move |_registry| Ok(codec.clone())),
				getter: Box::new(OptionGetter { func: Box::new(get) }),
			},
			setter: Box::new(OptionalSetter { func: Box::new(set) }),
		});
		self
	}

	/// Adds a required assignable value whose declared type `F` is itself
	/// another user struct registered with the same [`Registry`]. §4.3's
	/// cycle rule applies here: if `F` has not been registered by the time
	/// `T` is, registration fails with
	/// [`SchemaError::NoCodecForType`](crate::SchemaError::NoCodecForType).
	#[must_use]
	pub fn struct_value<F: 'static + Send + Sync>(
		mut self,
		name: &'static str,
		get: impl for<'a> Fn(&'a T) -> &'a F + Send + Sync + 'static,
		set: impl Fn(&mut T, F) + Send + Sync + 'static,
	) -> Self {
		let resolver: CodecResolver = Box::new(|registry: &Registry| {
			registry
				.struct_field_codec::<F>()
				.map(|codec| codec as Arc<dyn FieldCodecDyn>)
		});
		self.assignable.push(AssignableValue {
			descriptor: ValueDescriptor {
				name,
				nullable: false,
				resolver,
				getter: Box::new(AlwaysGetter { func: Box::new(get) }),
			},
			setter: Box::new(RequiredSetter { func: Box::new(set) }),
		});
		self
	}

	/// Adds a nullable assignable value whose declared type `F` is itself
	/// another registered struct.
	#[must_use]
	pub fn nullable_struct_value<F: 'static + Send + Sync>(
		mut self,
		name: &'static str,
		get: impl for<'a> Fn(&'a T) -> Option<&'a F> + Send + Sync + 'static,
		set: impl Fn(&mut T, Option<F>) + Send + Sync + 'static,
	) -> Self {
		let resolver: CodecResolver = Box::new(|registry: &Registry| {
			registry
				.struct_field_codec::<F>()
				.map(|codec| codec as Arc<dyn FieldCodecDyn>)
		});
		self.assignable.push(AssignableValue {
			descriptor: ValueDescriptor {
				name,
				nullable: true,
				resolver,
				getter: Box::new(OptionGetter { func: Box::new(get) }),
			},
			setter: Box::new(OptionalSetter { func: Box::new(set) }),
		});
		self
	}

	/// Adds a required assignable value holding a dense array/list of
	/// another registered struct `F` (§2 item 4(b): "array-of-T"
	/// recursively materialized for a struct-shaped `T`). No element may
	/// be absent; for a collection that may contain nulls, use
	/// [`Self::sparse_struct_array_value`].
	#[must_use]
	pub fn struct_array_value<F: 'static + Send + Sync>(
		mut self,
		name: &'static str,
		get: impl for<'a> Fn(&'a T) -> &'a Vec<F> + Send + Sync + 'static,
		set: impl Fn(&mut T, Vec<F>) + Send + Sync + 'static,
	) -> Self {
		let resolver: CodecResolver = Box::new(|registry: &Registry| {
			registry
				.struct_array_field_codec::<F>()
				.map(|codec| codec as Arc<dyn FieldCodecDyn>)
		});
		self.assignable.push(AssignableValue {
			descriptor: ValueDescriptor {
				name,
				nullable: false,
				resolver,
				getter: Box::new(AlwaysGetter { func: Box::new(get) }),
			},
			setter: Box::new(RequiredSetter { func: Box::new(set) }),
		});
		self
	}

	/// Adds a required assignable value holding a sparse array/list of
	/// another registered struct `F`: the collection itself is always
	/// present, but individual elements may be absent, tracked by the
	/// collection's own null mask rather than `T`'s (§4.5's shared
	/// collection skeleton; see S4 of the design's testable scenarios).
	#[must_use]
	pub fn sparse_struct_array_value<F: 'static + Send + Sync>(
		mut self,
		name: &'static str,
		get: impl for<'a> Fn(&'a T) -> &'a Vec<Option<F>> + Send + Sync + 'static,
		set: impl Fn(&mut T, Vec<Option<F>>) + Send + Sync + 'static,
	) -> Self {
		let resolver: CodecResolver = Box::new(|registry: &Registry| {
			registry
				.sparse_struct_array_field_codec::<F>()
				.map(|codec| codec as Arc<dyn FieldCodecDyn>)
		});
		self.assignable.push(AssignableValue {
			descriptor: ValueDescriptor {
				name,
				nullable: false,
				resolver,
				getter: Box::new(AlwaysGetter { func: Box::new(get) }),
			},
			setter: Box::new(RequiredSetter { func: Box::new(set) }),
		});
		self
	}

	/// Adds a polymorphic assignable value (§4.4): a member declared at a
	/// base/"object" shape whose concrete runtime type is only known at
	/// serialize time. The embedded [`SerializationTypeId`](crate::SerializationTypeId)
	/// routes both directions; see [`Registry::serialize_dyn`] /
	/// [`Registry::deserialize_dyn`].
	#[must_use]
	pub fn polymorphic_value(
		mut self,
		name: &'static str,
		get: impl for<'a> Fn(&'a T) -> &'a Box<dyn Any> + Send + Sync + 'static,
		set: impl Fn(&mut T, Box<dyn Any>) + Send + Sync + 'static,
	) -> Self {
		let resolver: CodecResolver =
			Box::new(|registry: &Registry| Ok(registry.polymorphic_field_codec()));
		self.assignable.push(AssignableValue {
			descriptor: ValueDescriptor {
				name,
				nullable: false,
				resolver,
				getter: Box::new(AlwaysGetter { func: Box::new(get) }),
			},
			setter: Box::new(PolymorphicSetter { func: Box::new(set) }),
		});
		self
	}
}
