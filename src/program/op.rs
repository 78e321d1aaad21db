// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The ordered serialization op list (§3 "Serialization op"). Rust's
//! `Option<T>` already unifies "null reference" and "empty optional" (§9
//! design notes), so `EmitNullableValue` and `EmitNonValueReference` collapse
//! into a single [`Op`] shape here, distinguished only by the presence of a
//! null-mask bit.

/// One instruction in a compiled program: "read/write the value behind this
/// descriptor, at this position in the activator-param or assignable-value
/// list, optionally gated by a null-mask bit."
#[derive(Clone, Copy)]
pub(crate) enum Op {
	/// An activator (constructor) parameter, at `index` within the
	/// activator's parameter list.
	ActivatorParam { index: usize, null_mask_bit: Option<usize> },
	/// A post-construction assignable value, at `index` within the
	/// mapping's assignable-value list.
	AssignableValue { index: usize, null_mask_bit: Option<usize> },
}

impl Op {
	pub(crate) fn null_mask_bit(self) -> Option<usize> {
		match self {
			Self::ActivatorParam { null_mask_bit, .. } | Self::AssignableValue { null_mask_bit, .. } => {
				null_mask_bit
			}
		}
	}
}
