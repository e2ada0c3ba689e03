// SPDX-License-Identifier: Apache-2.0, MIT

use async_trait::async_trait;
use cid::Cid;

use crate::error::AllocationError;
use crate::metric::Metric;
use crate::peer::PeerId;

/// Read-only view over the consensus-backed pin set.
///
/// Implementations never error: a missing or momentarily unreachable state
/// snapshot is reported as an empty allocation list, not a failure. See
/// §4.2 of the allocation spec for the rationale.
#[async_trait]
pub trait StateReader: Send + Sync {
    /// The peers currently recorded as holding `cid`, or an empty list if the
    /// CID is unknown or the state snapshot is unavailable.
    async fn current_allocations(&self, cid: &Cid) -> Vec<PeerId>;
}

/// Fetches the last known metric of a given kind for every peer known to the
/// authoritative monitor.
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Errors iff the authoritative (leader) monitor instance could not be
    /// located; the engine does not retry internally.
    async fn last_metrics(&self, kind: &str) -> Result<Vec<Metric>, AllocationError>;
}

/// Ranks candidate peers for a pin. A pure function over its inputs: it may
/// veto (omit) candidates but must never introduce a peer absent from
/// `current` or `candidates`.
#[async_trait]
pub trait AllocatorPolicy: Send + Sync {
    /// Returns candidate peers in preference order (most preferred first).
    async fn allocate(
        &self,
        cid: &Cid,
        current: &[Metric],
        candidates: &[Metric],
    ) -> Result<Vec<PeerId>, AllocationError>;
}
