// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! [`Activator`] — the source's "object activator" (§3), describing how a
//! type is constructed: either the default (parameterless) activator, or a
//! parameterized one naming an ordered list of value descriptors that feed
//! a constructor. Rust has no reflection over constructors either, so a
//! parameterized activator is described as an ordered list of descriptors
//! plus an explicit assembly closure, rather than discovered by matching
//! argument counts against `ConstructorInfo`s the way the source does —
//! see §4.7's `ActivatorArityMismatch`, which becomes structurally
//! unreachable under this design (DESIGN.md).

use std::any::Any;

use crate::error::WireResult;

use super::descriptor::{AlwaysGetter, OptionGetter, ValueDescriptor};
use super::CodecResolver;

/// How a type is constructed. The *default* activator takes no arguments;
/// the *parameterized* activator feeds an ordered list of values — read
/// from the wire first, in declared order (§4.6 step 1) — into an
/// assembly closure that builds `T`.
///
/// `assemble` returns a [`WireResult`] rather than a
/// [`SchemaResult`](crate::SchemaResult): it runs once per deserialized
/// value (wire time), downcasting each boxed parameter back to its
/// concrete type, and a mismatch there is a wire-time failure under §7's
/// taxonomy, not a registration-time one.
pub enum Activator<T> {
	Default(Box<dyn Fn() -> T + Send + Sync>),
	Parameterized {
		params: Vec<ValueDescriptor<T>>,
		assemble: Box<dyn Fn(Vec<Option<Box<dyn Any>>>) -> WireResult<T> + Send + Sync>,
	},
}

impl<T> Activator<T> {
	/// A parameterless activator: `T::default()`-shaped, but any
	/// zero-argument constructor works.
	pub fn default_ctor(ctor: impl Fn() -> T + Send + Sync + 'static) -> Self {
		Self::Default(Box::new(ctor))
	}

	/// Starts building a parameterized activator.
	#[must_use]
	pub fn parameterized() -> ParameterizedActivatorBuilder<T> {
		ParameterizedActivatorBuilder { params: Vec::new() }
	}

	pub(crate) fn params(&self) -> &[ValueDescriptor<T>] {
		match self {
			Self::Default(_) => &[],
			Self::Parameterized { params, .. } => params,
		}
	}
}

/// Accumulates the ordered parameter list of a parameterized activator
/// before it is bound to an assembly closure with [`Self::build`].
pub struct ParameterizedActivatorBuilder<T> {
	params: Vec<ValueDescriptor<T>>,
}

impl<T: 'static> ParameterizedActivatorBuilder<T> {
	/// Adds a required (non-nullable) constructor parameter read from
	/// field `name` of `T` via `get`.
	#[must_use]
	pub fn param<F: crate::codec::Readable + crate::codec::Writable + 'static>(
		mut self,
		name: &'static str,
		get: impl for<'a> Fn(&'a T) -> &'a F + Send + Sync + 'static,
	) -> Self {
		let codec = crate::codec::field_codec::<F>();
		self.params.push(ValueDescriptor {
			name,
			nullable: false,
			resolver: Box::new(move |_registry| Ok(codec.clone())),
			getter: Box::new(AlwaysGetter { func: Box::new(get) }),
		});
		self
	}

	/// Adds a nullable constructor parameter read from field `name` of
	/// `T` via `get`, which returns `None` when the parameter's value is
	/// absent.
	#[must_use]
	pub fn nullable_param<F: crate::codec::Readable + crate::codec::Writable + 'static>(
		mut self,
		name: &'static str,
		get: impl for<'a> Fn(&'a T) -> Option<&'a F> + Send + Sync + 'static,
	) -> Self {
		let codec = crate::codec::field_codec::<F>();
		self.params.push(ValueDescriptor {
			name,
			nullable: true,
			resolver: Box::new(move |_registry| Ok(codec.clone())) as CodecResolver,
			getter: Box::new(OptionGetter { func: Box::new(get) }),
		});
		self
	}

	/// Adds a required constructor parameter whose declared type `F` is
	/// itself another registered struct, resolved through the same
	/// [`Registry`](crate::Registry) lookup [`super::struct_value`] uses
	/// for post-construction fields.
	#[must_use]
	pub fn struct_param<F: 'static + Send + Sync>(
		mut self,
		name: &'static str,
		get: impl for<'a> Fn(&'a T) -> &'a F + Send + Sync + 'static,
	) -> Self {
		let resolver: CodecResolver = Box::new(|registry: &crate::registry::Registry| {
			registry
				.struct_field_codec::<F>()
				.map(|codec| codec as std::sync::Arc<dyn crate::codec::FieldCodecDyn>)
		});
		self.params.push(ValueDescriptor {
			name,
			nullable: false,
			resolver,
			getter: Box::new(AlwaysGetter { func: Box::new(get) }),
		});
		self
	}

	/// Finishes the activator, binding the accumulated parameter list to
	/// `assemble`, which receives each parameter's deserialized value (in
	/// the same order they were added, `None` for an absent nullable
	/// parameter) and constructs `T`.
	pub fn build(
		self,
		assemble: impl Fn(Vec<Option<Box<dyn Any>>>) -> WireResult<T> + Send + Sync + 'static,
	) -> Activator<T> {
		Activator::Parameterized {
			params: self.params,
			assemble: Box::new(assemble),
		}
	}
}
