// SPDX-License-Identifier: Apache-2.0, MIT

//! In-memory collaborator implementations for exercising [`crate::AllocationEngine`]
//! without a real consensus store, metric gossip transport, or allocator.
//!
//! These are kept as a regular (non-`#[cfg(test)]`) module, mirroring the
//! teacher crate's own unconditionally-compiled test-fixture modules, so that
//! both unit tests in this crate and the integration suite under `tests/`
//! can use them.

use std::collections::HashMap;

use async_trait::async_trait;
use cid::Cid;
use libp2p_identity::Keypair;
use parking_lot::RwLock;

use crate::error::AllocationError;
use crate::metric::Metric;
use crate::peer::PeerId;
use crate::traits::{MetricSource, StateReader};

/// A fresh, random peer identity. Cheap; only used to get distinct, valid
/// [`PeerId`]s in tests without caring about the underlying keypair.
pub fn rand_peer() -> PeerId {
    PeerId::from(Keypair::generate_ed25519().public())
}

/// A [`StateReader`] backed by an in-memory map, mutable so tests can
/// simulate a consensus commit between two allocation calls.
#[derive(Default)]
pub struct MapStateReader {
    allocations: RwLock<HashMap<Cid, Vec<PeerId>>>,
}

impl MapStateReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allocations(cid: Cid, peers: Vec<PeerId>) -> Self {
        let reader = Self::new();
        reader.set_allocations(cid, peers);
        reader
    }

    /// Simulates a consensus commit: overwrites the allocation list for `cid`.
    pub fn set_allocations(&self, cid: Cid, peers: Vec<PeerId>) {
        self.allocations.write().insert(cid, peers);
    }
}

#[async_trait]
impl StateReader for MapStateReader {
    async fn current_allocations(&self, cid: &Cid) -> Vec<PeerId> {
        self.allocations.read().get(cid).cloned().unwrap_or_default()
    }
}

/// A [`MetricSource`] that either serves a fixed metric list or reports the
/// monitor as unavailable, standing in for a leaderless cluster.
pub enum MapMetricSource {
    Available(Vec<Metric>),
    Unavailable,
}

impl MapMetricSource {
    pub fn new(metrics: Vec<Metric>) -> Self {
        MapMetricSource::Available(metrics)
    }

    pub fn unavailable() -> Self {
        MapMetricSource::Unavailable
    }
}

#[async_trait]
impl MetricSource for MapMetricSource {
    async fn last_metrics(&self, kind: &str) -> Result<Vec<Metric>, AllocationError> {
        match self {
            MapMetricSource::Unavailable => Err(AllocationError::MonitorUnavailable),
            MapMetricSource::Available(metrics) => {
                Ok(metrics.iter().filter(|m| m.kind() == kind).cloned().collect())
            }
        }
    }
}
