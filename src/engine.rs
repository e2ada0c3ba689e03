// SPDX-License-Identifier: Apache-2.0, MIT

use std::collections::{HashMap, HashSet};

use cid::Cid;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::decision::AllocationDecision;
use crate::error::AllocationError;
use crate::metric::Metric;
use crate::peer::PeerId;
use crate::policy::ReplicationPolicy;
use crate::request::AllocationRequest;
use crate::traits::{AllocatorPolicy, MetricSource, StateReader};

/// The allocation decision engine.
///
/// Holds borrowed references to its three collaborators for the lifetime of
/// a single call; it owns no long-lived state itself and is safe to call
/// concurrently (see the allocation spec's concurrency model, §5).
pub struct AllocationEngine<'a> {
    state: &'a dyn StateReader,
    metrics: &'a dyn MetricSource,
    allocator: &'a dyn AllocatorPolicy,
    config: EngineConfig,
}

impl<'a> AllocationEngine<'a> {
    pub fn new(
        state: &'a dyn StateReader,
        metrics: &'a dyn MetricSource,
        allocator: &'a dyn AllocatorPolicy,
        config: EngineConfig,
    ) -> Self {
        Self {
            state,
            metrics,
            allocator,
            config,
        }
    }

    /// Decides the allocation for `cid` under `policy`, excluding any peer in
    /// `blacklist`. Preconditions `0 < policy.rpl_min <= policy.rpl_max` are
    /// assumed, not re-checked (caller contract, §4.4.1).
    #[tracing::instrument(skip(self, blacklist), fields(cid = %cid, rpl_min = policy.rpl_min, rpl_max = policy.rpl_max))]
    pub async fn allocate(
        &self,
        cid: &Cid,
        policy: ReplicationPolicy,
        blacklist: &HashSet<PeerId>,
    ) -> Result<AllocationDecision, AllocationError> {
        let current = self.state.current_allocations(cid).await;
        let metrics = self.metrics.last_metrics(&self.config.informer_kind).await?;

        let (current_valid, candidate_valid) = partition(&current, metrics, blacklist);
        let n_cur = current_valid.len() as i64;
        let n_cand = candidate_valid.len() as i64;
        let need = policy.rpl_min as i64 - n_cur;
        let want = policy.rpl_max as i64 - n_cur;

        debug!(
            current_valid = n_cur,
            candidate_valid = n_cand,
            need,
            want,
            "partitioned peers for allocation"
        );

        if want < 0 {
            let keep = policy.rpl_max as usize;
            warn!(dropped = current_valid.len() - keep, "shrinking over-replicated pin");
            let shrunk = current_valid[..keep].iter().map(Metric::peer).collect();
            return Ok(AllocationDecision::Shrink(shrunk));
        }

        if need <= 0 {
            debug!("pin already within replication bounds, no change");
            return Ok(AllocationDecision::NoChange);
        }

        let needed = need as u64;
        let wanted = want as u64;

        if n_cand < need {
            warn!(needed, wanted, have = n_cand, "insufficient candidates");
            return Err(AllocationError::InsufficientCandidates {
                cid: *cid,
                needed,
                wanted,
                valid: candidate_valid.iter().map(Metric::peer).collect(),
            });
        }

        let ranked = self
            .allocator
            .allocate(cid, &current_valid, &candidate_valid)
            .await?;

        if (ranked.len() as i64) < need {
            warn!(
                needed,
                wanted,
                ranked = ranked.len(),
                "allocator policy ranked fewer peers than needed"
            );
            return Err(AllocationError::InsufficientCandidates {
                cid: *cid,
                needed,
                wanted,
                valid: candidate_valid.iter().map(Metric::peer).collect(),
            });
        }

        let take = (wanted as usize).min(ranked.len());
        let mut expanded: Vec<PeerId> = current_valid.iter().map(Metric::peer).collect();
        expanded.extend_from_slice(&ranked[..take]);
        debug!(added = take, "expanding allocation");
        Ok(AllocationDecision::Expand(expanded))
    }

    /// Convenience wrapper over [`AllocationEngine::allocate`] for callers that
    /// already have their parameters bundled into an [`AllocationRequest`].
    pub async fn allocate_request(
        &self,
        request: &AllocationRequest,
    ) -> Result<AllocationDecision, AllocationError> {
        self.allocate(&request.cid, request.policy, &request.blacklist)
            .await
    }
}

/// Splits `metrics` into the current-valid and candidate-valid buckets,
/// dropping discarded and blacklisted peers. `current_valid` preserves the
/// order of `current`; `candidate_valid` preserves the order metrics were
/// returned in.
fn partition(
    current: &[PeerId],
    metrics: Vec<Metric>,
    blacklist: &HashSet<PeerId>,
) -> (Vec<Metric>, Vec<Metric>) {
    let current_set: HashSet<PeerId> = current.iter().copied().collect();

    let mut current_valid_by_peer: HashMap<PeerId, Metric> = HashMap::new();
    let mut candidate_valid = Vec::new();

    for m in metrics {
        if m.discard() || blacklist.contains(&m.peer()) {
            continue;
        }
        if current_set.contains(&m.peer()) {
            current_valid_by_peer.insert(m.peer(), m);
        } else {
            candidate_valid.push(m);
        }
    }

    let current_valid = current
        .iter()
        .filter_map(|p| current_valid_by_peer.get(p).cloned())
        .collect();

    (current_valid, candidate_valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::NumericDescending;
    use crate::testing::{rand_peer, MapMetricSource, MapStateReader};
    use crate::{AllocatorPolicy, MetricSource, StateReader};
    use pretty_assertions::assert_eq;

    fn usable(kind: &str, peer: PeerId, value: &str) -> Metric {
        Metric::with_ttl_secs(kind, peer, value, true, 3600)
    }

    fn expired(kind: &str, peer: PeerId, value: &str) -> Metric {
        Metric::new(kind, peer, value, true, Some(chrono::Utc::now() - chrono::Duration::seconds(1)))
    }

    struct FixedRanking(Vec<PeerId>);

    #[async_trait::async_trait]
    impl AllocatorPolicy for FixedRanking {
        async fn allocate(
            &self,
            _cid: &Cid,
            _current: &[Metric],
            _candidates: &[Metric],
        ) -> Result<Vec<PeerId>, AllocationError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn s1_fresh_pin_enough_candidates() {
        let [p1, p2, p3, p4, p5] = [(); 5].map(|_| rand_peer());
        let cid = Cid::default();
        let state = MapStateReader::new();
        let metrics = MapMetricSource::new(vec![
            usable("freespace", p1, "1"),
            usable("freespace", p2, "2"),
            usable("freespace", p3, "3"),
            usable("freespace", p4, "4"),
            usable("freespace", p5, "5"),
        ]);
        let allocator = FixedRanking(vec![p3, p1, p5, p2, p4]);
        let engine = AllocationEngine::new(&state, &metrics, &allocator, EngineConfig::default());

        let decision = engine
            .allocate(&cid, ReplicationPolicy::new(2, 3), &HashSet::new())
            .await
            .unwrap();

        assert_eq!(decision, AllocationDecision::Expand(vec![p3, p1, p5]));
    }

    #[tokio::test]
    async fn s2_under_replicated_one_stale_peer() {
        let [p1, p2, p3, p4, p5] = [(); 5].map(|_| rand_peer());
        let cid = Cid::default();
        let state = MapStateReader::with_allocations(cid, vec![p1, p2]);
        let metrics = MapMetricSource::new(vec![
            usable("freespace", p1, "1"),
            expired("freespace", p2, "2"),
            usable("freespace", p3, "3"),
            usable("freespace", p4, "4"),
            usable("freespace", p5, "5"),
        ]);
        let allocator = FixedRanking(vec![p4, p3, p5]);
        let engine = AllocationEngine::new(&state, &metrics, &allocator, EngineConfig::default());

        let decision = engine
            .allocate(&cid, ReplicationPolicy::new(3, 3), &HashSet::new())
            .await
            .unwrap();

        assert_eq!(decision, AllocationDecision::Expand(vec![p1, p4, p3]));
    }

    #[tokio::test]
    async fn s3_within_bounds_no_change() {
        let [p1, p2, p3] = [(); 3].map(|_| rand_peer());
        let cid = Cid::default();
        let state = MapStateReader::with_allocations(cid, vec![p1, p2, p3]);
        let metrics = MapMetricSource::new(vec![
            usable("freespace", p1, "1"),
            usable("freespace", p2, "2"),
            usable("freespace", p3, "3"),
        ]);
        let allocator = FixedRanking(vec![]);
        let engine = AllocationEngine::new(&state, &metrics, &allocator, EngineConfig::default());

        let decision = engine
            .allocate(&cid, ReplicationPolicy::new(2, 4), &HashSet::new())
            .await
            .unwrap();

        assert_eq!(decision, AllocationDecision::NoChange);
    }

    #[tokio::test]
    async fn s4_over_replicated_truncates_to_prefix() {
        let [p1, p2, p3, p4] = [(); 4].map(|_| rand_peer());
        let cid = Cid::default();
        let state = MapStateReader::with_allocations(cid, vec![p1, p2, p3, p4]);
        let metrics = MapMetricSource::new(vec![
            usable("freespace", p1, "1"),
            usable("freespace", p2, "2"),
            usable("freespace", p3, "3"),
            usable("freespace", p4, "4"),
        ]);
        let allocator = FixedRanking(vec![]);
        let engine = AllocationEngine::new(&state, &metrics, &allocator, EngineConfig::default());

        let decision = engine
            .allocate(&cid, ReplicationPolicy::new(1, 2), &HashSet::new())
            .await
            .unwrap();

        match decision {
            AllocationDecision::Shrink(list) => {
                assert_eq!(list.len(), 2);
                assert_eq!(&list[..], &[p1, p2]);
            }
            other => panic!("expected Shrink, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn s5_insufficient_candidates() {
        let p1 = rand_peer();
        let cid = Cid::default();
        let state = MapStateReader::new();
        let metrics = MapMetricSource::new(vec![usable("freespace", p1, "1")]);
        let allocator = FixedRanking(vec![]);
        let engine = AllocationEngine::new(&state, &metrics, &allocator, EngineConfig::default());

        let err = engine
            .allocate(&cid, ReplicationPolicy::new(2, 3), &HashSet::new())
            .await
            .unwrap_err();

        match err {
            AllocationError::InsufficientCandidates {
                needed,
                wanted,
                valid,
                ..
            } => {
                assert_eq!(needed, 2);
                assert_eq!(wanted, 3);
                assert_eq!(valid, vec![p1]);
            }
            other => panic!("expected InsufficientCandidates, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn s6_blacklist_honored() {
        let [p1, p2, p3] = [(); 3].map(|_| rand_peer());
        let cid = Cid::default();
        let state = MapStateReader::new();
        let metrics = MapMetricSource::new(vec![
            usable("freespace", p1, "1"),
            usable("freespace", p2, "2"),
            usable("freespace", p3, "3"),
        ]);
        let allocator = FixedRanking(vec![p1, p3]);
        let engine = AllocationEngine::new(&state, &metrics, &allocator, EngineConfig::default());

        let blacklist = HashSet::from([p2]);
        let decision = engine
            .allocate(&cid, ReplicationPolicy::new(2, 2), &blacklist)
            .await
            .unwrap();

        assert_eq!(decision, AllocationDecision::Expand(vec![p1, p3]));
    }

    #[tokio::test]
    async fn idempotent_after_commit() {
        let [p1, p2, p3] = [(); 3].map(|_| rand_peer());
        let cid = Cid::default();
        let state = MapStateReader::new();
        let metrics = MapMetricSource::new(vec![
            usable("freespace", p1, "10"),
            usable("freespace", p2, "20"),
            usable("freespace", p3, "30"),
        ]);
        let allocator = NumericDescending;
        let engine = AllocationEngine::new(&state, &metrics, &allocator, EngineConfig::default());

        let first = engine
            .allocate(&cid, ReplicationPolicy::new(2, 2), &HashSet::new())
            .await
            .unwrap();
        let allocated = first.new_allocations().expect("first call should expand").to_vec();
        assert_eq!(allocated.len(), 2);

        // Simulate the downstream consensus commit applying `first`'s result,
        // then re-invoke with the same (still-fresh) metrics.
        state.set_allocations(cid, allocated);
        let second = engine
            .allocate(&cid, ReplicationPolicy::new(2, 2), &HashSet::new())
            .await
            .unwrap();
        assert_eq!(second, AllocationDecision::NoChange);
    }

    #[tokio::test]
    async fn monitor_unavailable_aborts_the_call() {
        let cid = Cid::default();
        let state = MapStateReader::new();
        let metrics = MapMetricSource::unavailable();
        let allocator = FixedRanking(vec![]);
        let engine = AllocationEngine::new(&state, &metrics, &allocator, EngineConfig::default());

        let err = engine
            .allocate(&cid, ReplicationPolicy::new(1, 1), &HashSet::new())
            .await
            .unwrap_err();

        assert!(matches!(err, AllocationError::MonitorUnavailable));
    }

    #[tokio::test]
    async fn boundary_single_replica_single_candidate() {
        let p1 = rand_peer();
        let cid = Cid::default();
        let state = MapStateReader::new();
        let metrics = MapMetricSource::new(vec![usable("freespace", p1, "1")]);
        let allocator = FixedRanking(vec![p1]);
        let engine = AllocationEngine::new(&state, &metrics, &allocator, EngineConfig::default());

        let decision = engine
            .allocate(&cid, ReplicationPolicy::new(1, 1), &HashSet::new())
            .await
            .unwrap();

        assert_eq!(decision, AllocationDecision::Expand(vec![p1]));
    }

    // Sanity checks that the plumbing in `testing` actually behaves like the
    // trait contracts it stands in for.
    #[tokio::test]
    async fn map_state_reader_returns_empty_for_unknown_cid() {
        let state = MapStateReader::new();
        assert_eq!(state.current_allocations(&Cid::default()).await, Vec::<PeerId>::new());
    }

    #[tokio::test]
    async fn allocate_request_delegates_to_allocate() {
        let [p1, p2, p3] = [(); 3].map(|_| rand_peer());
        let cid = Cid::default();
        let state = MapStateReader::new();
        let metrics = MapMetricSource::new(vec![
            usable("freespace", p1, "1"),
            usable("freespace", p2, "2"),
            usable("freespace", p3, "3"),
        ]);
        let allocator = FixedRanking(vec![p1, p2]);
        let engine = AllocationEngine::new(&state, &metrics, &allocator, EngineConfig::default());

        let request = crate::AllocationRequest::new(cid, ReplicationPolicy::new(2, 2), HashSet::new());
        let decision = engine.allocate_request(&request).await.unwrap();

        assert_eq!(decision, AllocationDecision::Expand(vec![p1, p2]));
    }

    #[tokio::test]
    async fn map_metric_source_returns_configured_metrics() {
        let p1 = rand_peer();
        let metrics = MapMetricSource::new(vec![usable("ping", p1, "5")]);
        let got = metrics.last_metrics("ping").await.unwrap();
        assert_eq!(got.len(), 1);
    }
}
