// SPDX-License-Identifier: Apache-2.0, MIT

use cid::Cid;
use thiserror::Error;

use crate::peer::PeerId;

/// Everything that can keep [`crate::AllocationEngine::allocate`] from producing
/// an allocation decision.
#[derive(Debug, Error)]
pub enum AllocationError {
    /// The metric monitor's authoritative (leader) instance could not be
    /// located. Retryable with backoff.
    #[error("no authoritative monitor leader available")]
    MonitorUnavailable,

    /// Fewer valid candidates exist than the policy needs. Not retryable
    /// without adding healthy peers or lowering `rpl_min`.
    #[error(
        "insufficient candidates for {cid}: need {needed}, want {wanted}, have {} valid",
        valid.len()
    )]
    InsufficientCandidates {
        cid: Cid,
        needed: u64,
        wanted: u64,
        valid: Vec<PeerId>,
    },

    /// The allocator policy itself failed; surfaced unmodified.
    #[error("allocator policy failed: {0}")]
    AllocatorFailure(#[source] anyhow::Error),
}
