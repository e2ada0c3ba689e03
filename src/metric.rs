// SPDX-License-Identifier: Apache-2.0, MIT

use chrono::{DateTime, Duration, Utc};

use crate::peer::PeerId;

/// A time-bounded, opaque value reported by a peer for a named metric kind.
///
/// `value` is never interpreted by the engine: only the [`crate::AllocatorPolicy`]
/// in use knows whether it holds a decimal byte count, a microsecond latency,
/// or something else entirely.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Metric {
    kind: String,
    peer: PeerId,
    value: String,
    valid: bool,
    expiry: Option<DateTime<Utc>>,
}

impl Metric {
    /// Builds a metric with an explicit, already-absolute expiry.
    ///
    /// `expiry: None` means the metric has no expiry set, which [`Metric::expired`]
    /// treats as already expired.
    pub fn new(
        kind: impl Into<String>,
        peer: PeerId,
        value: impl Into<String>,
        valid: bool,
        expiry: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            kind: kind.into(),
            peer,
            value: value.into(),
            valid,
            expiry,
        }
    }

    /// Builds a metric that expires `ttl_secs` seconds from now.
    pub fn with_ttl_secs(
        kind: impl Into<String>,
        peer: PeerId,
        value: impl Into<String>,
        valid: bool,
        ttl_secs: u64,
    ) -> Self {
        let ttl = Duration::seconds(ttl_secs.min(i64::MAX as u64) as i64);
        Self::new(kind, peer, value, valid, Some(Utc::now() + ttl))
    }

    /// Builds a metric that expires after `ttl` from now.
    pub fn with_duration(
        kind: impl Into<String>,
        peer: PeerId,
        value: impl Into<String>,
        valid: bool,
        ttl: Duration,
    ) -> Self {
        Self::new(kind, peer, value, valid, Some(Utc::now() + ttl))
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn peer(&self) -> PeerId {
        self.peer
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_valid_flag(&self) -> bool {
        self.valid
    }

    pub fn expiry(&self) -> Option<DateTime<Utc>> {
        self.expiry
    }

    /// True iff there is no expiry set, or the current time is at or past it.
    pub fn expired(&self) -> bool {
        match self.expiry {
            None => true,
            Some(expiry) => Utc::now() >= expiry,
        }
    }

    /// True iff this metric is usable: valid and not expired.
    pub fn discard(&self) -> bool {
        !self.valid || self.expired()
    }
}
