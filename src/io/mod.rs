// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Byte-IO primitives and the four protocol headers (§4.1 of the design).
//!
//! Everything here is little-endian, total on buffers of sufficient size,
//! and leaves bounds-checking to the caller except where noted — this
//! mirrors `xrbk`'s `Readable`/`Writable` primitive impls, generalized from
//! a streaming `Buf`/`BufMut` cursor to the offset-addressed `&[u8]` slices
//! this format's wire contract is defined over.

pub mod header;
pub mod primitive;

pub use header::{
	CollectionLengthHeader, ContentLengthHeader, SerializationTypeIdHeader, TypeDataHeader,
};
