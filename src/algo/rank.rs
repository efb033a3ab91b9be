//! Candidate selection, ranking, and caching.

use crate::{
    algo::score::score,
    cache::TtlCache,
    config::RankerConfig,
    data::{ProfileSummary, SuggestionCandidate, UserId, UserSet},
    graph::{GraphAccessor, GraphError},
};
use itertools::Itertools;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::{cmp::Reverse, sync::Arc};
use thiserror::Error;
use tokio::{sync::Semaphore, task::JoinSet, time::timeout};
use tracing::{debug, warn};

/// Error produced by [`SuggestionRanker`] operations.
///
/// The consuming UI should show a generic "try again" state for these,
/// never the raw message.
#[derive(Debug, Error)]
pub enum SuggestError {
    /// No signed-in viewer. Ranking and presence both require an
    /// identified caller; rejected before any I/O.
    #[error("no authenticated viewer")]
    Unauthenticated,

    /// The viewer's own graph data could not be read, or every candidate
    /// lookup in a non-empty pool failed.
    #[error(transparent)]
    DataUnavailable(#[from] GraphError),
}

/// Produces the ranked "people you may know" list for a viewer.
///
/// Results are memoized per viewer for the configured TTL, and
/// concurrent calls for one viewer coalesce into a single computation.
pub struct SuggestionRanker<G> {
    graph: Arc<G>,
    config: RankerConfig,
    cache: TtlCache<UserId, Arc<Vec<SuggestionCandidate>>>,
    inflight: Mutex<FxHashMap<UserId, Arc<tokio::sync::Mutex<()>>>>,
}

impl<G: GraphAccessor + 'static> SuggestionRanker<G> {
    /// Create a ranker over `graph`.
    pub fn new(graph: Arc<G>, config: RankerConfig) -> Self {
        Self {
            cache: TtlCache::new(config.cache_ttl),
            inflight: Mutex::default(),
            graph,
            config,
        }
    }

    /// The top `limit` suggestions for `viewer`, best first.
    ///
    /// Ordering is score descending, then user id ascending, so repeated
    /// calls over unchanged data return identical lists. Graph mutations
    /// inside the cache TTL are deliberately not reflected. `limit == 0`
    /// is answered with an empty list before any I/O.
    pub async fn rank(
        &self,
        viewer: Option<UserId>,
        limit: usize,
    ) -> Result<Vec<SuggestionCandidate>, SuggestError> {
        let viewer = viewer.ok_or(SuggestError::Unauthenticated)?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        if let Some(ranked) = self.cache.get(&viewer) {
            debug!(%viewer, "suggestion cache hit");
            return Ok(truncated(&ranked, limit));
        }

        // Coalesce concurrent calls for one viewer: losers of the race
        // wait here, then find the winner's result in the cache.
        let gate = Arc::clone(self.inflight.lock().entry(viewer).or_default());
        let _guard = gate.lock().await;
        if let Some(ranked) = self.cache.get(&viewer) {
            return Ok(truncated(&ranked, limit));
        }

        let outcome = self.compute(viewer).await;
        self.inflight.lock().remove(&viewer);
        let ranked = Arc::new(outcome?);
        self.cache.insert(viewer, Arc::clone(&ranked));
        Ok(truncated(&ranked, limit))
    }

    /// Everyone in both `viewer`'s and `other`'s accepted-friend sets,
    /// as summaries ordered by id.
    ///
    /// Computed on demand, independent of the ranking cache. A mutual
    /// whose profile row cannot be read is skipped, not fatal.
    pub async fn mutual_friends(
        &self,
        viewer: Option<UserId>,
        other: UserId,
    ) -> Result<Vec<ProfileSummary>, SuggestError> {
        let viewer = viewer.ok_or(SuggestError::Unauthenticated)?;
        let mine = self.graph.accepted_friend_ids(viewer).await?;
        let theirs = self.graph.accepted_friend_ids(other).await?;

        let mut summaries = Vec::new();
        for id in mine.intersection(&theirs).copied().sorted() {
            match self.graph.profile(id).await {
                Ok(profile) => summaries.push(ProfileSummary::from(profile)),
                Err(e) => {
                    warn!(user = %id, error = %e, "skipping mutual friend: profile unavailable");
                }
            }
        }
        Ok(summaries)
    }

    /// The uncached ranking pipeline: exclusion set, bounded fan-out,
    /// scoring, deterministic sort.
    async fn compute(&self, viewer: UserId) -> Result<Vec<SuggestionCandidate>, SuggestError> {
        // viewer-side failures fail the whole call
        let viewer_profile = self.graph.profile(viewer).await?;
        let viewer_rel = self.graph.relations(viewer).await?;
        let outstanding = self.graph.outstanding_edge_ids(viewer).await?;

        let mut excluded = UserSet::default();
        excluded.insert(viewer);
        excluded.extend(viewer_rel.friends.iter().copied());
        excluded.extend(outstanding);

        let pool = self.graph.candidate_pool(&excluded).await?;
        if pool.is_empty() {
            return Ok(Vec::new());
        }
        let pool_len = pool.len();

        let limiter = Arc::new(Semaphore::new(self.config.fan_out));
        let mut lookups = JoinSet::new();
        for profile in pool {
            let graph = Arc::clone(&self.graph);
            let limiter = Arc::clone(&limiter);
            let lookup_timeout = self.config.candidate_timeout;
            lookups.spawn(async move {
                // the limiter is never closed, so acquisition only ends
                // one way; holding the slot spans the lookup
                let _slot = limiter.acquire_owned().await;
                let relations = timeout(lookup_timeout, graph.relations(profile.id)).await;
                (profile, relations)
            });
        }

        let mut candidates = Vec::with_capacity(pool_len);
        let mut failed = 0usize;
        while let Some(joined) = lookups.join_next().await {
            let Ok((profile, relations)) = joined else {
                failed += 1;
                continue;
            };
            let relations = match relations {
                Ok(Ok(relations)) => relations,
                Ok(Err(e)) => {
                    warn!(candidate = %profile.id, error = %e, "dropping candidate: lookup failed");
                    failed += 1;
                    continue;
                }
                Err(_) => {
                    warn!(candidate = %profile.id, "dropping candidate: lookup timed out");
                    failed += 1;
                    continue;
                }
            };

            let breakdown = score(&viewer_profile, &viewer_rel, &profile, &relations);
            let total = breakdown.score();
            if total > 0 {
                candidates.push(SuggestionCandidate {
                    profile,
                    breakdown,
                    score: total,
                });
            }
        }

        if failed == pool_len {
            return Err(SuggestError::DataUnavailable(GraphError::Unavailable(
                "every candidate lookup failed".to_string(),
            )));
        }

        // completion order of the fan-out must not leak into the result
        Ok(candidates
            .into_iter()
            .sorted_by_key(|candidate| (Reverse(candidate.score), candidate.profile.id))
            .collect())
    }
}

fn truncated(ranked: &[SuggestionCandidate], limit: usize) -> Vec<SuggestionCandidate> {
    ranked.iter().take(limit).cloned().collect()
}

#[cfg(test)]
mod rank_tests {
    use super::*;
    use crate::data::{Profile, SkillSet, UserId};
    use crate::graph::{GraphError, MemoryGraph, UserRelations};
    use crate::{edges, profile, skills};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time;

    /// Viewer 1 with accepted friends 2 and 3; candidate 4 shares friend
    /// 2 and skill "Go"; candidate 5 shares only the employer; candidate
    /// 6 shares nothing.
    fn campus() -> MemoryGraph {
        MemoryGraph::seeded(
            [
                profile!(1: "Ana", company: "Acme"),
                profile!(2: "Ben"),
                profile!(3: "Cam"),
                profile!(4: "Dot"),
                profile!(5: "Eve", company: "acme"),
                profile!(6: "Fay"),
            ],
            edges![1 accepted 2, 1 accepted 3, 4 accepted 2],
            skills![1: "Go" "SQL", 4: "Go"],
        )
    }

    fn ranker(graph: MemoryGraph) -> SuggestionRanker<MemoryGraph> {
        SuggestionRanker::new(Arc::new(graph), RankerConfig::default())
    }

    fn ids(ranked: &[SuggestionCandidate]) -> Vec<u64> {
        ranked.iter().map(|c| c.profile.id.0).collect()
    }

    #[tokio::test]
    async fn ranks_by_score_then_id_and_drops_zero_scores() {
        let ranked = ranker(campus()).rank(Some(UserId(1)), 10).await.unwrap();

        // 4 and 5 tie at 5 points; id breaks the tie; 6 scores 0 and is
        // excluded outright
        assert_eq!(ids(&ranked), [4, 5]);
        assert_eq!(ranked[0].breakdown.mutual_friends, 1);
        assert_eq!(ranked[0].breakdown.shared_skills, 1);
        assert!(ranked[1].breakdown.same_company);
        assert_eq!(ranked[0].score, 5);
        assert_eq!(ranked[1].score, 5);
    }

    #[tokio::test]
    async fn connected_and_pending_candidates_never_surface() {
        let graph = campus();
        // pending out to 5, pending in from 6
        graph.push_edge(edges![1 pending 5].remove(0));
        graph.push_edge(edges![6 pending 1].remove(0));

        let ranked = ranker(graph).rank(Some(UserId(1)), 10).await.unwrap();

        assert_eq!(ids(&ranked), [4]);
    }

    #[tokio::test]
    async fn rejected_edge_resurfaces() {
        let graph = campus();
        graph.push_edge(edges![1 rejected 4].remove(0));

        let ranked = ranker(graph).rank(Some(UserId(1)), 10).await.unwrap();

        assert!(ids(&ranked).contains(&4));
    }

    #[tokio::test]
    async fn viewer_never_appears_in_own_suggestions() {
        // give the viewer every reason to match themselves
        let graph = MemoryGraph::seeded(
            [profile!(1: "Ana", company: "Acme", location: "Allendale")],
            edges![],
            skills![1: "Go"],
        );

        let ranked = ranker(graph).rank(Some(UserId(1)), 10).await.unwrap();

        assert!(ranked.is_empty());
    }

    #[tokio::test]
    async fn limit_caps_and_zero_limit_short_circuits() {
        let ranker = ranker(campus());

        assert_eq!(ids(&ranker.rank(Some(UserId(1)), 1).await.unwrap()), [4]);
        assert!(ranker.rank(Some(UserId(1)), 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unauthenticated_callers_are_rejected() {
        assert!(matches!(
            ranker(campus()).rank(None, 10).await,
            Err(SuggestError::Unauthenticated)
        ));
        assert!(matches!(
            ranker(campus()).mutual_friends(None, UserId(4)).await,
            Err(SuggestError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn empty_pool_is_a_valid_answer() {
        let graph = MemoryGraph::seeded([profile!(1: "Ana")], edges![], skills![]);

        assert!(ranker(graph).rank(Some(UserId(1)), 10).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cached_lists_outlive_graph_mutations_until_ttl() {
        let graph = Arc::new(campus());
        let ranker = SuggestionRanker::new(Arc::clone(&graph), RankerConfig::default());

        let before = ranker.rank(Some(UserId(1)), 10).await.unwrap();
        assert_eq!(ids(&before), [4, 5]);

        // accepting 4 mid-window must not invalidate the cached list
        graph.push_edge(edges![1 accepted 4].remove(0));
        let cached = ranker.rank(Some(UserId(1)), 10).await.unwrap();
        assert_eq!(ids(&cached), [4, 5]);

        time::advance(Duration::from_secs(301)).await;
        let refreshed = ranker.rank(Some(UserId(1)), 10).await.unwrap();
        assert_eq!(ids(&refreshed), [5]);
    }

    #[tokio::test]
    async fn mutual_friends_resolves_the_intersection() {
        let mutuals = ranker(campus())
            .mutual_friends(Some(UserId(1)), UserId(4))
            .await
            .unwrap();

        assert_eq!(mutuals.len(), 1);
        assert_eq!(mutuals[0].id, UserId(2));
        assert_eq!(mutuals[0].name, "Ben");
    }

    /// Delegates to a [`MemoryGraph`] but fails viewer-side and
    /// candidate-side lookups for a chosen set of users.
    struct FlakyGraph {
        inner: MemoryGraph,
        failing: UserSet,
    }

    impl FlakyGraph {
        fn check(&self, user: UserId) -> Result<(), GraphError> {
            if self.failing.contains(&user) {
                Err(GraphError::Unavailable(format!("injected failure for {user}")))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl GraphAccessor for FlakyGraph {
        async fn accepted_friend_ids(&self, user: UserId) -> Result<UserSet, GraphError> {
            self.check(user)?;
            self.inner.accepted_friend_ids(user).await
        }

        async fn outstanding_edge_ids(&self, user: UserId) -> Result<UserSet, GraphError> {
            self.check(user)?;
            self.inner.outstanding_edge_ids(user).await
        }

        async fn skill_names(&self, user: UserId) -> Result<SkillSet, GraphError> {
            self.check(user)?;
            self.inner.skill_names(user).await
        }

        async fn profile(&self, user: UserId) -> Result<Profile, GraphError> {
            self.check(user)?;
            self.inner.profile(user).await
        }

        async fn candidate_pool(&self, excluding: &UserSet) -> Result<Vec<Profile>, GraphError> {
            self.inner.candidate_pool(excluding).await
        }
    }

    fn flaky(failing: impl IntoIterator<Item = u64>) -> SuggestionRanker<FlakyGraph> {
        SuggestionRanker::new(
            Arc::new(FlakyGraph {
                inner: campus(),
                failing: failing.into_iter().map(UserId).collect(),
            }),
            RankerConfig::default(),
        )
    }

    #[tokio::test]
    async fn one_bad_candidate_does_not_abort_the_batch() {
        let ranked = flaky([4]).rank(Some(UserId(1)), 10).await.unwrap();

        assert_eq!(ids(&ranked), [5]);
    }

    #[tokio::test]
    async fn all_candidates_failing_surfaces_unavailable() {
        assert!(matches!(
            flaky([4, 5, 6]).rank(Some(UserId(1)), 10).await,
            Err(SuggestError::DataUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn viewer_data_failing_fails_the_call() {
        assert!(matches!(
            flaky([1]).rank(Some(UserId(1)), 10).await,
            Err(SuggestError::DataUnavailable(_))
        ));
    }

    /// Delegates to a [`MemoryGraph`], stalling relation lookups for a
    /// chosen user well past the per-candidate timeout.
    struct StallingGraph {
        inner: MemoryGraph,
        stalling: UserId,
    }

    #[async_trait]
    impl GraphAccessor for StallingGraph {
        async fn accepted_friend_ids(&self, user: UserId) -> Result<UserSet, GraphError> {
            if user == self.stalling {
                time::sleep(Duration::from_secs(30)).await;
            }
            self.inner.accepted_friend_ids(user).await
        }

        async fn outstanding_edge_ids(&self, user: UserId) -> Result<UserSet, GraphError> {
            self.inner.outstanding_edge_ids(user).await
        }

        async fn skill_names(&self, user: UserId) -> Result<SkillSet, GraphError> {
            self.inner.skill_names(user).await
        }

        async fn profile(&self, user: UserId) -> Result<Profile, GraphError> {
            self.inner.profile(user).await
        }

        async fn candidate_pool(&self, excluding: &UserSet) -> Result<Vec<Profile>, GraphError> {
            self.inner.candidate_pool(excluding).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_candidates_time_out_individually() {
        let ranker = SuggestionRanker::new(
            Arc::new(StallingGraph {
                inner: campus(),
                stalling: UserId(4),
            }),
            RankerConfig::default(),
        );

        let ranked = ranker.rank(Some(UserId(1)), 10).await.unwrap();

        assert_eq!(ids(&ranked), [5]);
    }

    /// Counts candidate-pool fetches so tests can observe coalescing.
    struct CountingGraph {
        inner: MemoryGraph,
        pools: AtomicUsize,
    }

    #[async_trait]
    impl GraphAccessor for CountingGraph {
        async fn accepted_friend_ids(&self, user: UserId) -> Result<UserSet, GraphError> {
            self.inner.accepted_friend_ids(user).await
        }

        async fn outstanding_edge_ids(&self, user: UserId) -> Result<UserSet, GraphError> {
            self.inner.outstanding_edge_ids(user).await
        }

        async fn skill_names(&self, user: UserId) -> Result<SkillSet, GraphError> {
            self.inner.skill_names(user).await
        }

        async fn profile(&self, user: UserId) -> Result<Profile, GraphError> {
            self.inner.profile(user).await
        }

        async fn candidate_pool(&self, excluding: &UserSet) -> Result<Vec<Profile>, GraphError> {
            self.pools.fetch_add(1, Ordering::SeqCst);
            self.inner.candidate_pool(excluding).await
        }
    }

    #[tokio::test]
    async fn concurrent_calls_for_one_viewer_coalesce() {
        let graph = Arc::new(CountingGraph {
            inner: campus(),
            pools: AtomicUsize::new(0),
        });
        let ranker = SuggestionRanker::new(Arc::clone(&graph), RankerConfig::default());

        let (a, b) = tokio::join!(
            ranker.rank(Some(UserId(1)), 10),
            ranker.rank(Some(UserId(1)), 10)
        );

        assert_eq!(ids(&a.unwrap()), ids(&b.unwrap()));
        assert_eq!(graph.pools.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn repeated_calls_within_ttl_are_identical() {
        let ranker = ranker(campus());

        let first = ranker.rank(Some(UserId(1)), 10).await.unwrap();
        let second = ranker.rank(Some(UserId(1)), 10).await.unwrap();

        assert_eq!(first, second);
    }

    /// Relation snapshots compose with the default batched fetch.
    #[tokio::test]
    async fn default_relations_joins_friends_and_skills() {
        let graph = campus();
        let UserRelations { friends, skills } = graph.relations(UserId(1)).await.unwrap();

        assert_eq!(friends.len(), 2);
        assert!(skills.contains("Go"));
    }
}
