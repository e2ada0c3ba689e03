// SPDX-License-Identifier: Apache-2.0, MIT

//! Pin allocation core for a distributed content-pinning cluster.
//!
//! This crate decides, for a given content identifier and replication
//! policy, which cluster peers must hold a replica. It does not implement
//! consensus, metric collection, or data transfer: those are external
//! collaborators reached through the [`StateReader`], [`MetricSource`] and
//! [`AllocatorPolicy`] traits. See [`AllocationEngine`] for the decision
//! algorithm.

mod config;
mod decision;
mod engine;
mod error;
mod metric;
mod peer;
mod pin;
mod policy;
mod request;
mod traits;

pub mod policies;
pub mod testing;

#[cfg(feature = "logging-init")]
pub mod logging;

pub use config::EngineConfig;
pub use decision::AllocationDecision;
pub use engine::AllocationEngine;
pub use error::AllocationError;
pub use metric::Metric;
pub use peer::PeerId;
pub use pin::{Pin, PinError, ReplicationFactor};
pub use policy::ReplicationPolicy;
pub use request::AllocationRequest;
pub use traits::{AllocatorPolicy, MetricSource, StateReader};

/// Re-exported so downstream crates can construct [`Metric`]s and [`Pin`]s
/// against the same `cid` version this crate was built with.
pub use cid::Cid;
