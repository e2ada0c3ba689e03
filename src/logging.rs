// SPDX-License-Identifier: Apache-2.0, MIT

//! Optional `tracing-subscriber` bootstrap, gated behind the `logging-init`
//! feature.
//!
//! Nothing in [`crate::AllocationEngine`] calls this; it exists for binaries
//! and integration tests embedding this crate that want a sane default
//! instead of writing their own subscriber setup from scratch.

use tracing_subscriber::EnvFilter;

/// Installs a compact, `RUST_LOG`-driven global subscriber.
///
/// Defaults to `info` when `RUST_LOG` is unset. Returns an error if a global
/// subscriber is already installed.
pub fn init() -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .compact()
        .try_init()
}
