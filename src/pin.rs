// SPDX-License-Identifier: Apache-2.0, MIT

use std::collections::HashSet;

use cid::Cid;
use thiserror::Error;

use crate::peer::PeerId;

/// Target replication factor for a pin.
///
/// `Every` is the semantic form of the wire encoding's `-1`: replicate to
/// every peer in the cluster. `Bounded` otherwise caps the allocation list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplicationFactor {
    Every,
    Bounded(u64),
}

impl ReplicationFactor {
    /// Interprets the raw on-disk/wire integer: negative means [`ReplicationFactor::Every`].
    pub fn from_raw(raw: i64) -> Self {
        if raw < 0 {
            ReplicationFactor::Every
        } else {
            ReplicationFactor::Bounded(raw as u64)
        }
    }

    /// Translates the legacy `everywhere` boolean form. The accompanying
    /// `replication_factor` field is only consulted when `everywhere` is false,
    /// matching the legacy reader: `everywhere=true` always wins regardless of
    /// whatever replication_factor happened to be serialized alongside it.
    pub fn from_legacy(everywhere: bool, replication_factor: i64) -> Self {
        if everywhere {
            ReplicationFactor::Every
        } else {
            ReplicationFactor::from_raw(replication_factor)
        }
    }

    pub fn to_raw(self) -> i64 {
        match self {
            ReplicationFactor::Every => -1,
            ReplicationFactor::Bounded(n) => n as i64,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PinError {
    #[error("pin allocations contain a duplicate peer")]
    DuplicateAllocation,
}

/// A durable intent that a content object be held by the cluster.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pin {
    cid: Cid,
    name: String,
    allocations: Vec<PeerId>,
    replication_factor: ReplicationFactor,
}

impl Pin {
    /// Builds a pin, rejecting an allocation list with duplicate peers.
    pub fn new(
        cid: Cid,
        name: impl Into<String>,
        allocations: Vec<PeerId>,
        replication_factor: ReplicationFactor,
    ) -> Result<Self, PinError> {
        let mut seen = HashSet::with_capacity(allocations.len());
        if !allocations.iter().all(|p| seen.insert(*p)) {
            return Err(PinError::DuplicateAllocation);
        }
        Ok(Self {
            cid,
            name: name.into(),
            allocations,
            replication_factor,
        })
    }

    /// An empty pin for a CID absent from the state store: zero replication
    /// factor, no allocations. See `StateReader::current_allocations`.
    pub fn absent(cid: Cid) -> Self {
        Self {
            cid,
            name: String::new(),
            allocations: Vec::new(),
            replication_factor: ReplicationFactor::Bounded(0),
        }
    }

    pub fn cid(&self) -> &Cid {
        &self.cid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn allocations(&self) -> &[PeerId] {
        &self.allocations
    }

    pub fn replication_factor(&self) -> ReplicationFactor {
        self.replication_factor
    }
}
