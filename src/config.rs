// SPDX-License-Identifier: Apache-2.0, MIT

use serde::{Deserialize, Serialize};

/// Static configuration for an [`crate::AllocationEngine`].
///
/// Deserializable by an embedding application's own config loader (TOML,
/// YAML, ...); this crate does not read files or environment variables
/// itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// The metric kind name passed to `MetricSource::last_metrics` on every
    /// allocation call, e.g. `"freespace"` or `"ping"`.
    pub informer_kind: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            informer_kind: "freespace".to_string(),
        }
    }
}
