// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The program interpreter / delegate builder (§4.6): binds a compiled
//! [`program::Program`](crate::program) and each descriptor's resolved
//! [`FieldCodecDyn`](crate::codec::FieldCodecDyn) into one
//! [`CompiledStructCodec<T>`] per registered type, exposing the four public
//! operations (serialize, deserialize, size-from-value, size-from-buffer).
//!
//! This format interprets the op list on every call rather than generating
//! machine code for it — one of the two strategies §4.6 explicitly
//! sanctions ("may interpret the op list on each call"). `xrbk_macro`
//! chooses the other strategy (codegen at compile time via `syn`); that
//! path isn't available here since mappings are built at runtime (§4.5).

use std::any::Any;
use std::sync::Arc;

use crate::bitfield::BitField;
use crate::codec::FieldCodecDyn;
use crate::error::{WireError, WireResult};
use crate::io::header::{ContentLengthHeader, SerializationTypeIdHeader};
use crate::mapping::{Activator, AssignableValue};
use crate::program::{Op, Program, ValueRangeTable};
use crate::registry::{ErasedStructCodec, SerializationTypeId};

const STRUCT_HEADER_SIZE: usize = ContentLengthHeader::SIZE + SerializationTypeIdHeader::SIZE;

/// The four compiled callables for one registered type `T`, bound to its
/// program and resolved field codecs.
pub(crate) struct CompiledStructCodec<T> {
	pub(crate) type_id: SerializationTypeId,
	pub(crate) type_name: &'static str,
	program: Program,
	/// Codecs in the same order as `program.ops`: one per activator
	/// parameter (in order), then one per assignable value (in order).
	codecs: Vec<Arc<dyn FieldCodecDyn>>,
	activator: Activator<T>,
	assignable: Vec<AssignableValue<T>>,
}

impl<T: 'static> CompiledStructCodec<T> {
	pub(crate) fn new(
		type_id: SerializationTypeId,
		type_name: &'static str,
		program: Program,
		codecs: Vec<Arc<dyn FieldCodecDyn>>,
		activator: Activator<T>,
		assignable: Vec<AssignableValue<T>>,
	) -> Self {
		Self {
			type_id,
			type_name,
			program,
			codecs,
			activator,
			assignable,
		}
	}

	fn ranges(&self) -> &ValueRangeTable {
		&self.program.ranges
	}

	fn getter_for(&self, op: Op) -> &dyn crate::mapping::FieldGetter<T> {
		match op {
			Op::ActivatorParam { index, .. } => self.activator.params()[index].getter(),
			Op::AssignableValue { index, .. } => self.assignable[index].descriptor.getter(),
		}
	}

	fn codec_for(&self, position: usize) -> &Arc<dyn FieldCodecDyn> {
		&self.codecs[position]
	}

	/// Writes `value`'s full struct block (`ContentLength`, type id, null
	/// mask, then activator/assignable values in order) into `buf` at `off`.
	pub(crate) fn serialize(&self, value: &T, buf: &mut [u8], off: usize) -> WireResult<()> {
		let total_size = self.size_from_value(value)?;
		WireError::check_bounds(buf.len(), off, total_size as usize)?;

		ContentLengthHeader(total_size).write(buf, off);
		SerializationTypeIdHeader(self.type_id.0).write(buf, off + ContentLengthHeader::SIZE);

		let mask_len = self.ranges().null_mask_len();
		let mut mask = BitField::new(mask_len);
		let present: Vec<bool> = self
			.program
			.ops
			.iter()
			.map(|op| self.getter_for(*op).get(value).is_some())
			.collect();
		for (op, is_present) in self.program.ops.iter().zip(present.iter().copied()) {
			if let Some(bit) = op.null_mask_bit() {
				mask.set_bit(bit, !is_present);
			}
		}
		mask.copy_to(buf, off + STRUCT_HEADER_SIZE);

		let mut cursor = off + STRUCT_HEADER_SIZE + mask_len;
		for (position, (op, is_present)) in
			self.program.ops.iter().zip(present.iter().copied()).enumerate()
		{
			if op.null_mask_bit().is_some() && !is_present {
				continue;
			}
			let field_value = self
				.getter_for(*op)
				.get(value)
				.expect("checked present above");
			let codec = self.codec_for(position);
			codec.serialize_any(field_value, buf, cursor)?;
			cursor += codec.size_from_value_any(field_value)? as usize;
		}
		Ok(())
	}

	/// Reconstructs a `T` from its struct block at `buf[off..]`.
	pub(crate) fn deserialize(&self, buf: &[u8], off: usize) -> WireResult<T> {
		WireError::check_bounds(buf.len(), off, STRUCT_HEADER_SIZE)?;
		let wire_type_id = SerializationTypeIdHeader::read(buf, off + ContentLengthHeader::SIZE).0;
		if wire_type_id != self.type_id.0 {
			return Err(WireError::UnmappedTypeId(wire_type_id));
		}

		let mask_len = self.ranges().null_mask_len();
		WireError::check_bounds(buf.len(), off, STRUCT_HEADER_SIZE + mask_len)?;
		let mask = BitField::copy_from(buf, off + STRUCT_HEADER_SIZE, mask_len);

		let mut cursor = off + STRUCT_HEADER_SIZE + mask_len;
		let activator_count = self.activator.params().len();
		let mut activator_values: Vec<Option<Box<dyn Any>>> = Vec::with_capacity(activator_count);
		let mut assigned: Vec<(usize, Option<Box<dyn Any>>)> = Vec::with_capacity(self.assignable.len());

		for (position, op) in self.program.ops.iter().enumerate() {
			let absent = op.null_mask_bit().is_some_and(|bit| mask.get_bit(bit));
			let value = if absent {
				None
			} else {
				let codec = self.codec_for(position);
				let decoded = codec.deserialize_any(buf, cursor)?;
				cursor += codec.size_from_value_any(decoded.as_ref())? as usize;
				Some(decoded)
			};

			match op {
				Op::ActivatorParam { .. } => activator_values.push(value),
				Op::AssignableValue { index, .. } => assigned.push((*index, value)),
			}
		}

		let mut built = match &self.activator {
			Activator::Default(ctor) => ctor(),
			Activator::Parameterized { assemble, .. } => assemble(activator_values)?,
		};

		for (index, value) in assigned {
			self.assignable[index].setter.set(&mut built, value)?;
		}
		Ok(built)
	}

	/// The wire size of `value`'s full struct block, recomputed from `value`
	/// itself.
	pub(crate) fn size_from_value(&self, value: &T) -> WireResult<u16> {
		let mut size = STRUCT_HEADER_SIZE + self.ranges().null_mask_len();
		for (position, op) in self.program.ops.iter().enumerate() {
			let Some(field_value) = self.getter_for(*op).get(value) else {
				continue;
			};
			size += self.codec_for(position).size_from_value_any(field_value)? as usize;
		}
		WireError::check_u16(size)
	}

	/// The wire size of the struct block starting at `buf[off..]`, read
	/// directly from its `ContentLength` header.
	pub(crate) fn size_from_buffer(buf: &[u8], off: usize) -> u16 {
		ContentLengthHeader::read(buf, off).0
	}
}

impl<T: 'static + Send + Sync> ErasedStructCodec for CompiledStructCodec<T> {
	fn serialize_any(&self, value: &dyn Any, buf: &mut [u8], off: usize) -> WireResult<()> {
		let value = value.downcast_ref::<T>().ok_or(WireError::TypeMismatch {
			expected: self.type_name,
		})?;
		self.serialize(value, buf, off)
	}

	fn deserialize_any(&self, buf: &[u8], off: usize) -> WireResult<Box<dyn Any>> {
		Ok(Box::new(self.deserialize(buf, off)?))
	}

	fn size_from_value_any(&self, value: &dyn Any) -> WireResult<u16> {
		let value = value.downcast_ref::<T>().ok_or(WireError::TypeMismatch {
			expected: self.type_name,
		})?;
		self.size_from_value(value)
	}

	fn size_from_buffer(&self, buf: &[u8], off: usize) -> u16 {
		Self::size_from_buffer(buf, off)
	}

	fn serialization_type_id(&self) -> SerializationTypeId {
		self.type_id
	}

	fn type_name(&self) -> &'static str {
		self.type_name
	}
}
