// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! [`ValueDescriptor`] — the Rust stand-in for the source's reflection
//! over a field/property (§3 "Serialization value descriptor"). Since Rust
//! has no runtime reflection, a descriptor is built from explicit
//! getter/setter closures the caller supplies when describing a type,
//! rather than discovered by inspecting `T`; this is the one piece of
//! `bitwire` with no direct teacher analogue (`xrbk_macro` discovers
//! fields via `syn` at compile time instead) — see DESIGN.md.

use std::any::Any;

use crate::error::WireResult;

/// Reads the value behind one descriptor out of `&T`. Returns `None` when
/// the member is a nullable/reference value that is currently absent —
/// this is the single mechanism that unifies "null reference" and "empty
/// optional" at the wire level (§9 design notes), since both simply mean
/// "this getter returned `None`".
pub trait FieldGetter<T>: Send + Sync {
	fn get<'a>(&self, value: &'a T) -> Option<&'a dyn Any>;
}

/// Writes the value behind one descriptor into `&mut T`. `data` is `None`
/// when the member was absent on the wire (no null-mask bit set, or no
/// bytes were read for it).
pub trait FieldSetter<T>: Send + Sync {
	fn set(&self, value: &mut T, data: Option<Box<dyn Any>>) -> WireResult<()>;
}

pub(crate) struct AlwaysGetter<T, F> {
	pub(crate) func: Box<dyn for<'a> Fn(&'a T) -> &'a F + Send + Sync>,
}

impl<T, F: 'static> FieldGetter<T> for AlwaysGetter<T, F> {
	fn get<'a>(&self, value: &'a T) -> Option<&'a dyn Any> {
		Some((self.func)(value))
	}
}

pub(crate) struct OptionGetter<T, F> {
	pub(crate) func: Box<dyn for<'a> Fn(&'a T) -> Option<&'a F> + Send + Sync>,
}

impl<T, F: 'static> FieldGetter<T> for OptionGetter<T, F> {
	fn get<'a>(&self, value: &'a T) -> Option<&'a dyn Any> {
		(self.func)(value).map(|f| f as &dyn Any)
	}
}

pub(crate) struct RequiredSetter<T, F> {
	pub(crate) func: Box<dyn Fn(&mut T, F) + Send + Sync>,
}

impl<T, F: 'static> FieldSetter<T> for RequiredSetter<T, F> {
	fn set(&self, value: &mut T, data: Option<Box<dyn Any>>) -> WireResult<()> {
		let boxed = data.ok_or_else(|| {
			format!(
				"non-nullable value of type {} was absent while deserializing",
				std::any::type_name::<F>()
			)
		})?;
		let typed = *boxed.downcast::<F>().map_err(|_| {
			format!(
				"type mismatch assigning a value: expected {}",
				std::any::type_name::<F>()
			)
		})?;
		(self.func)(value, typed);
		Ok(())
	}
}

/// A setter for a polymorphic descriptor (§4.4): unlike [`RequiredSetter`],
/// the decoded value *is already* the `Box<dyn Any>` the caller's closure
/// wants — it names the declared field type itself, not a concrete type
/// boxed inside it — so it is handed through unchanged rather than
/// downcast a second time.
pub(crate) struct PolymorphicSetter<T> {
	pub(crate) func: Box<dyn Fn(&mut T, Box<dyn Any>) + Send + Sync>,
}

impl<T> FieldSetter<T> for PolymorphicSetter<T> {
	fn set(&self, value: &mut T, data: Option<Box<dyn Any>>) -> WireResult<()> {
		let boxed = data.ok_or_else(|| "polymorphic value was absent while deserializing".to_string())?;
		(self.func)(value, boxed);
		Ok(())
	}
}

pub(crate) struct OptionalSetter<T, F> {
	pub(crate) func: Box<dyn Fn(&mut T, Option<F>) + Send + Sync>,
}

impl<T, F: 'static> FieldSetter<T> for OptionalSetter<T, F> {
	fn set(&self, value: &mut T, data: Option<Box<dyn Any>>) -> WireResult<()> {
		let typed = match data {
			None => None,
			Some(boxed) => Some(*boxed.downcast::<F>().map_err(|_| {
				format!(
					"type mismatch assigning a nullable value: expected {}",
					std::any::type_name::<F>()
				)
			})?),
		};
		(self.func)(value, typed);
		Ok(())
	}
}

/// One member of a user type participating in (de)serialization (§3). A
/// descriptor always carries a getter; a descriptor used as a
/// post-construction assignable value additionally carries a setter (see
/// [`super::AssignableValue`]) — activator-bound descriptors are read-only
/// from this type's perspective, since their value reaches `T` through
/// the activator's assembly closure instead.
pub struct ValueDescriptor<T> {
	pub(crate) name: &'static str,
	pub(crate) nullable: bool,
	pub(crate) resolver: super::CodecResolver,
	pub(crate) getter: Box<dyn FieldGetter<T>>,
}

impl<T> ValueDescriptor<T> {
	pub(crate) fn name(&self) -> &'static str {
		self.name
	}

	pub(crate) fn is_nullable(&self) -> bool {
		self.nullable
	}

	pub(crate) fn getter(&self) -> &dyn FieldGetter<T> {
		self.getter.as_ref()
	}

	pub(crate) fn resolver(&self) -> &super::CodecResolver {
		&self.resolver
	}
}
