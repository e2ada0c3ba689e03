// SPDX-License-Identifier: Apache-2.0, MIT

//! Example [`crate::AllocatorPolicy`] implementations.
//!
//! The allocation core ships no scoring opinion of its own (that is a
//! deliberate non-goal, see the allocation spec §1); these two policies exist
//! so the engine can be exercised and composed without every caller having to
//! write a numeric-ranking policy from scratch.

use async_trait::async_trait;
use cid::Cid;
use itertools::Itertools;

use crate::error::AllocationError;
use crate::metric::Metric;
use crate::peer::PeerId;
use crate::traits::AllocatorPolicy;

/// Ranks candidates by parsing `Metric::value` as a decimal number, smallest
/// first. A malformed value vetoes that candidate rather than failing the
/// whole call, since the policy is free to omit candidates (§4.4.3).
pub struct NumericAscending;

/// As [`NumericAscending`], but largest value first.
pub struct NumericDescending;

fn ranked_by_value(candidates: &[Metric], descending: bool) -> Vec<PeerId> {
    candidates
        .iter()
        .filter_map(|m| m.value().parse::<f64>().ok().map(|v| (v, m.peer())))
        .sorted_by(|a, b| {
            if descending {
                b.0.total_cmp(&a.0)
            } else {
                a.0.total_cmp(&b.0)
            }
        })
        .map(|(_, peer)| peer)
        .collect()
}

#[async_trait]
impl AllocatorPolicy for NumericAscending {
    async fn allocate(
        &self,
        _cid: &Cid,
        _current: &[Metric],
        candidates: &[Metric],
    ) -> Result<Vec<PeerId>, AllocationError> {
        Ok(ranked_by_value(candidates, false))
    }
}

#[async_trait]
impl AllocatorPolicy for NumericDescending {
    async fn allocate(
        &self,
        _cid: &Cid,
        _current: &[Metric],
        candidates: &[Metric],
    ) -> Result<Vec<PeerId>, AllocationError> {
        Ok(ranked_by_value(candidates, true))
    }
}
