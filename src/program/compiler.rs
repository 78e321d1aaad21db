// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The serialization-program compiler (§4.6): walks a mapping's activator
//! parameters, then its assignable values, both in declared order, assigning
//! each nullable member the next free null-mask bit index as it goes.

use crate::error::{SchemaError, SchemaResult};
use crate::mapping::{Activator, AssignableValue, ValueDescriptor};

use super::op::Op;
use super::range::ValueRangeTable;

/// A compiled program for one registered type: the ordered op list plus the
/// derived range table.
pub(crate) struct Program {
	pub(crate) ops: Vec<Op>,
	pub(crate) ranges: ValueRangeTable,
}

/// Compiles `activator`'s parameter list and `assignable`'s value list into
/// a [`Program`].
///
/// # Errors
///
/// Returns [`SchemaError::ProgramOpCountMismatch`] if the independently
/// walked serialize-side and deserialize-side op counts disagree. Under
/// this design both sides are derived from the same descriptor lists, so
/// this can only fire if a future change to this function breaks that
/// invariant; the check is kept because §4.4 requires registration to
/// validate it explicitly rather than assume it.
pub(crate) fn compile<T>(
	type_name: &'static str,
	activator: &Activator<T>,
	assignable: &[AssignableValue<T>],
) -> SchemaResult<Program> {
	let activator_params = activator.params();

	let serialize_ops = walk(activator_params, assignable);
	let deserialize_ops = walk(activator_params, assignable);

	if serialize_ops.len() != deserialize_ops.len() {
		return Err(SchemaError::ProgramOpCountMismatch {
			serialize_ops: serialize_ops.len(),
			deserialize_ops: deserialize_ops.len(),
		});
	}
	let _ = type_name;

	let ranges = ValueRangeTable {
		activator_count: activator_params.len(),
		non_nullable_assignable_count: assignable.iter().filter(|a| !a.descriptor.is_nullable()).count(),
		nullable_count: activator_params.iter().filter(|d| d.is_nullable()).count()
			+ assignable.iter().filter(|a| a.descriptor.is_nullable()).count(),
	};

	Ok(Program {
		ops: serialize_ops,
		ranges,
	})
}

fn walk<T>(activator_params: &[ValueDescriptor<T>], assignable: &[AssignableValue<T>]) -> Vec<Op> {
	let mut ops = Vec::with_capacity(activator_params.len() + assignable.len());
	let mut next_bit = 0usize;

	for (index, param) in activator_params.iter().enumerate() {
		let null_mask_bit = param.is_nullable().then(|| {
			let bit = next_bit;
			next_bit += 1;
			bit
		});
		ops.push(Op::ActivatorParam { index, null_mask_bit });
	}

	for (index, value) in assignable.iter().enumerate() {
		let null_mask_bit = value.descriptor.is_nullable().then(|| {
			let bit = next_bit;
			next_bit += 1;
			bit
		});
		ops.push(Op::AssignableValue { index, null_mask_bit });
	}

	ops
}
