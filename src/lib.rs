// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

// Deny the following clippy lints to enforce them:
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
// Warn for these lints, rather than denying them.
#![warn(clippy::style)]
#![warn(clippy::perf)]
// Continue to allow these though.
#![allow(clippy::module_name_repetitions)]

//! # bitwire
//!
//! A compact binary serializer core for low-latency game networking.
//!
//! `bitwire` turns user-defined aggregate types into byte streams and back
//! using per-type generated access plans rather than runtime introspection
//! on every call. A type is described once, at startup, through a fluent
//! [`ObjectMapping`](mapping::ObjectMapping); that description is compiled
//! into an ordered program of typed opcodes (see [`program`]), which is
//! bound by the [`interpreter`] to concrete field codecs to produce four
//! compiled callables: serialize, deserialize, size-from-value, and
//! size-from-buffer.
//!
//! The crate does not move bytes in or out of sockets, own buffers, or log
//! anything: callers supply byte slices and offsets, and the wire format
//! (little-endian integers, a position-stable field layout, a null mask for
//! nullable members) is the entire contract.
//!
//! See [`Registry`] for the entry point.

pub mod bitfield;
pub mod codec;
pub mod error;
pub mod interpreter;
pub mod io;
pub mod mapping;
pub mod program;
pub mod registry;
pub mod size;

pub use bitfield::BitField;
pub use error::{SchemaError, SchemaResult, WireError, WireResult};
pub use registry::{Registry, SerializationTypeId};
pub use size::{ConstantWireSize, WireSize};

// This function is unused, but writing it here asserts that the dyn-erased
// boundary traits stay object safe; a slip here would otherwise only show up
// as an obscure compile error deep inside `registry`.
fn _assert_object_safety(
	_struct_codec: &dyn registry::ErasedStructCodec,
	_field_codec: &dyn codec::FieldCodecDyn,
) {
}
