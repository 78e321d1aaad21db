// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The error taxonomy: [`SchemaError`] for registration-time failures and
//! [`WireError`] for failures while reading or writing bytes. The two never
//! mix: a mapping that registers successfully can never later fail with a
//! `SchemaError`.

use std::error::Error;

use thiserror::Error;

/// Result of a registration-time operation (building a mapping, registering
/// a type with a [`Registry`](crate::Registry)).
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result of a wire-level operation (serialize, deserialize, size query).
pub type WireResult<T> = Result<T, WireError>;

/// Failures raised while describing or registering a user type. Always
/// raised at startup, never while serving wire traffic.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum SchemaError {
	#[error("{type_name} cannot be mapped: abstract or interface types have no concrete activator")]
	AbstractType { type_name: &'static str },

	#[error(
		"{type_name} has no parameterless constructor and no parameterized activator was supplied"
	)]
	NoParameterlessConstructor { type_name: &'static str },

	#[error(
		"parameterized activator for {type_name} names {given} argument(s), which matches no constructor accepting {given} argument(s)"
	)]
	ActivatorArityMismatch { type_name: &'static str, given: usize },

	#[error("field `{field}` on {type_name} is readonly and was not bound through the activator")]
	ReadonlyFieldNotActivated {
		type_name: &'static str,
		field: &'static str,
	},

	#[error("member `{member}` on {type_name} is write-only or read-only and cannot be used for {usage}")]
	MemberNotUsableFor {
		type_name: &'static str,
		member: &'static str,
		usage: &'static str,
	},

	#[error("no member named `{hint}` on {type_name} (or it is static)")]
	NoSuchMember {
		type_name: &'static str,
		hint: &'static str,
	},

	#[error("no codec is registered for type {type_name}")]
	NoCodecForType { type_name: &'static str },

	#[error(
		"serialize program has {serialize_ops} op(s) but deserialize program has {deserialize_ops}; a mapping must describe the same members on both sides"
	)]
	ProgramOpCountMismatch {
		serialize_ops: usize,
		deserialize_ops: usize,
	},

	#[error("{type_name} is already registered")]
	AlreadyRegistered { type_name: &'static str },

	#[error("{0}")]
	Other(Box<dyn Error + Send + Sync>),
}

/// Failures raised while serializing, deserializing, or sizing a value.
/// Always raised during wire I/O, never at registration.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum WireError {
	#[error("value of runtime type {type_name} was never registered with this registry")]
	RunTypeNotMapped { type_name: &'static str },

	#[error("serialization type id {0} has no mapped type")]
	UnmappedTypeId(u16),

	#[error("unrecognized variant discriminant: {0}")]
	UnrecognizedDiscriminant(u64),

	#[error("value of {value_len} bytes exceeds the u16 length limit of this wire format")]
	LengthOverflow { value_len: usize },

	#[error("offset {offset} + size {size} exceeds buffer length {buf_len}")]
	OutOfBounds {
		offset: usize,
		size: usize,
		buf_len: usize,
	},

	#[error("expected value of type {expected}, found a different runtime type in the dynamic slot")]
	TypeMismatch { expected: &'static str },

	#[error("{0}")]
	Other(Box<dyn Error + Send + Sync>),
}

impl From<String> for WireError {
	fn from(message: String) -> Self {
		Self::Other(message.into())
	}
}

impl WireError {
	/// Checks that `off + size` fits within `buf_len`, returning
	/// [`WireError::OutOfBounds`] otherwise.
	pub fn check_bounds(buf_len: usize, off: usize, size: usize) -> WireResult<()> {
		match off.checked_add(size) {
			Some(end) if end <= buf_len => Ok(()),
			_ => Err(Self::OutOfBounds {
				offset: off,
				size,
				buf_len,
			}),
		}
	}

	/// Checks that `len` fits in a `u16`, as required by the wire format's
	/// `ContentLength`/`CollectionLength` fields.
	pub fn check_u16(len: usize) -> WireResult<u16> {
		u16::try_from(len).map_err(|_| Self::LengthOverflow { value_len: len })
	}
}
