// SPDX-License-Identifier: Apache-2.0, MIT

use crate::peer::PeerId;

/// Outcome of a single [`crate::AllocationEngine::allocate`] call.
///
/// A typed failure is represented by the `Err` side of that call's `Result`
/// rather than folded into this enum, so every variant here describes a
/// concrete allocation outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocationDecision {
    /// The current allocation already satisfies the replication policy; keep it as-is.
    NoChange,
    /// The pin was over-replicated; this is the new, shorter allocation list.
    Shrink(Vec<PeerId>),
    /// The pin was under-replicated and candidates were found; this is the new,
    /// longer allocation list, with all retained current-valid peers first.
    Expand(Vec<PeerId>),
}

impl AllocationDecision {
    /// The new allocation list, if this decision rewrites the allocation.
    pub fn new_allocations(&self) -> Option<&[PeerId]> {
        match self {
            AllocationDecision::NoChange => None,
            AllocationDecision::Shrink(list) | AllocationDecision::Expand(list) => Some(list),
        }
    }
}
