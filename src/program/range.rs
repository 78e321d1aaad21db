// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The value-range table (§3). Described there as "a partitioning of the
//! ordered op list into three contiguous ranges", but the wire byte
//! sequences in S2 and S3 place a skipped nullable field before trailing
//! non-nullable fields at exactly the positions they were declared at —
//! which only holds if emission follows declared order (as §4.6 steps 1-2
//! say explicitly) rather than a literal activator/non-nullable/nullable
//! re-sort. This table is kept as the three *counts* the compiler derives
//! while walking declared order once, rather than as index ranges into a
//! reordered op list; see DESIGN.md.

use crate::bitfield::BitField;

/// Counts derived while compiling a mapping into a [`super::Program`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ValueRangeTable {
	pub(crate) activator_count: usize,
	pub(crate) non_nullable_assignable_count: usize,
	pub(crate) nullable_count: usize,
}

impl ValueRangeTable {
	/// The number of bytes the null mask occupies: `ceil(nullable_count /
	/// 8)`, `0` when the type has no nullable members (§4.2).
	#[must_use]
	pub fn null_mask_len(&self) -> usize {
		BitField::bytes_len_from_bits(self.nullable_count)
	}

	/// Total number of members participating in (de)serialization.
	#[must_use]
	pub fn total(&self) -> usize {
		self.activator_count + self.non_nullable_assignable_count + self.nullable_count
	}
}
