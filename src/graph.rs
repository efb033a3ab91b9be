//! Read-only access to the relationship graph.
//!
//! Friendship edges, skill tags, and profile rows live in the hosted
//! store; [`GraphAccessor`] is the contract the suggestion core consumes.
//! [`MemoryGraph`] is the in-process implementation backing the test
//! suite and single-process deployments.

use crate::data::{
    EdgeStatus, FriendshipEdge, Profile, ProfileMap, SkillSet, SkillTag, UserId, UserSet,
    skill_set,
};
use async_trait::async_trait;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use thiserror::Error;

/// The backing store could not answer a query.
///
/// The ranker decides whether this aborts the whole call (viewer data) or
/// drops a single candidate (candidate data).
#[derive(Debug, Error)]
pub enum GraphError {
    /// The store could not be reached or the query failed.
    #[error("relationship data unavailable: {_0}")]
    Unavailable(String),
}

/// One user's relation snapshot: who they are connected to and what they
/// claim to know.
#[derive(Debug, Clone, Default)]
pub struct UserRelations {
    /// Accepted connections, both directions collapsed into one set.
    pub friends: UserSet,

    /// Skill names, deduplicated by exact name.
    pub skills: SkillSet,
}

/// Read-only queries over friendship edges and profile attributes.
#[async_trait]
pub trait GraphAccessor: Send + Sync {
    /// Users connected to `user` by an accepted edge, in either
    /// direction.
    async fn accepted_friend_ids(&self, user: UserId) -> Result<UserSet, GraphError>;

    /// Users with a pending edge to or from `user`.
    ///
    /// Rejected edges are not outstanding: a declined request leaves the
    /// pair free to resurface.
    async fn outstanding_edge_ids(&self, user: UserId) -> Result<UserSet, GraphError>;

    /// `user`'s skill names, deduplicated by exact name.
    async fn skill_names(&self, user: UserId) -> Result<SkillSet, GraphError>;

    /// `user`'s profile snapshot.
    async fn profile(&self, user: UserId) -> Result<Profile, GraphError>;

    /// Every profile except those in `excluding`. No ordering guarantee.
    async fn candidate_pool(&self, excluding: &UserSet) -> Result<Vec<Profile>, GraphError>;

    /// Friend set and skill set for one user in a single round trip.
    ///
    /// Stores that can batch the two queries should override this; the
    /// default joins the single-field calls.
    async fn relations(&self, user: UserId) -> Result<UserRelations, GraphError> {
        Ok(UserRelations {
            friends: self.accepted_friend_ids(user).await?,
            skills: self.skill_names(user).await?,
        })
    }
}

/// In-memory [`GraphAccessor`] over plain row tables.
///
/// Backs the test suite and is enough for a single process; production
/// points [`GraphAccessor`] at the hosted store instead.
#[derive(Debug, Default)]
pub struct MemoryGraph {
    inner: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    profiles: ProfileMap,
    edges: Vec<FriendshipEdge>,
    skills: Vec<SkillTag>,
}

impl Tables {
    /// The newest row per unordered pair.
    ///
    /// The store promises at most one non-rejected row per pair; readers
    /// do not rely on it and resolve duplicates here.
    fn effective_edges(&self) -> impl Iterator<Item = &FriendshipEdge> {
        let mut latest: FxHashMap<(UserId, UserId), &FriendshipEdge> = FxHashMap::default();
        for edge in &self.edges {
            latest
                .entry(edge.pair())
                .and_modify(|kept| {
                    if edge.created_at >= kept.created_at {
                        *kept = edge;
                    }
                })
                .or_insert(edge);
        }
        latest.into_values()
    }

    fn peers_with_status(&self, user: UserId, status: EdgeStatus) -> UserSet {
        self.effective_edges()
            .filter(|edge| edge.status == status)
            .filter_map(|edge| edge.peer_of(user))
            .collect()
    }
}

impl MemoryGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from row literals.
    pub fn seeded<P, E, S>(profiles: P, edges: E, skills: S) -> Self
    where
        P: IntoIterator<Item = Profile>,
        E: IntoIterator<Item = FriendshipEdge>,
        S: IntoIterator<Item = SkillTag>,
    {
        let graph = Self::new();
        {
            let mut inner = graph.inner.write();
            inner
                .profiles
                .extend(profiles.into_iter().map(|p| (p.id, p)));
            inner.edges.extend(edges);
            inner.skills.extend(skills);
        }
        graph
    }

    /// Insert or replace a profile row.
    pub fn upsert_profile(&self, profile: Profile) {
        self.inner.write().profiles.insert(profile.id, profile);
    }

    /// Append an edge row.
    ///
    /// Duplicate rows for one pair are tolerated; readers keep the newest
    /// row per unordered pair.
    pub fn push_edge(&self, edge: FriendshipEdge) {
        self.inner.write().edges.push(edge);
    }

    /// Append a skill tag row.
    pub fn push_skill(&self, tag: SkillTag) {
        self.inner.write().skills.push(tag);
    }
}

#[async_trait]
impl GraphAccessor for MemoryGraph {
    async fn accepted_friend_ids(&self, user: UserId) -> Result<UserSet, GraphError> {
        Ok(self.inner.read().peers_with_status(user, EdgeStatus::Accepted))
    }

    async fn outstanding_edge_ids(&self, user: UserId) -> Result<UserSet, GraphError> {
        Ok(self.inner.read().peers_with_status(user, EdgeStatus::Pending))
    }

    async fn skill_names(&self, user: UserId) -> Result<SkillSet, GraphError> {
        let inner = self.inner.read();
        Ok(skill_set(inner.skills.iter().filter(|tag| tag.user == user)))
    }

    async fn profile(&self, user: UserId) -> Result<Profile, GraphError> {
        self.inner
            .read()
            .profiles
            .get(&user)
            .cloned()
            .ok_or_else(|| GraphError::Unavailable(format!("no profile row for {user}")))
    }

    async fn candidate_pool(&self, excluding: &UserSet) -> Result<Vec<Profile>, GraphError> {
        let inner = self.inner.read();
        Ok(inner
            .profiles
            .values()
            .filter(|profile| !excluding.contains(&profile.id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod graph_tests {
    use super::*;
    use crate::{edges, profile, skills};
    use chrono::TimeDelta;

    fn set(ids: impl IntoIterator<Item = u64>) -> UserSet {
        ids.into_iter().map(UserId).collect()
    }

    #[tokio::test]
    async fn accepted_edges_read_symmetrically() {
        let graph = MemoryGraph::seeded(
            [profile!(1: "Ana"), profile!(2: "Ben")],
            edges![1 accepted 2],
            skills![],
        );

        assert_eq!(graph.accepted_friend_ids(UserId(1)).await.unwrap(), set([2]));
        assert_eq!(graph.accepted_friend_ids(UserId(2)).await.unwrap(), set([1]));
    }

    #[tokio::test]
    async fn outstanding_covers_both_directions_but_not_rejections() {
        let graph = MemoryGraph::seeded(
            [profile!(1: "Ana")],
            edges![1 pending 2, 3 pending 1, 1 rejected 4],
            skills![],
        );

        assert_eq!(
            graph.outstanding_edge_ids(UserId(1)).await.unwrap(),
            set([2, 3])
        );
    }

    #[tokio::test]
    async fn newest_row_wins_per_pair() {
        let graph = MemoryGraph::new();
        let mut older = edges![1 rejected 2].remove(0);
        older.created_at -= TimeDelta::hours(1);
        graph.push_edge(older);
        graph.push_edge(edges![2 pending 1].remove(0));

        // the re-sent request supersedes the old rejection
        assert_eq!(graph.outstanding_edge_ids(UserId(1)).await.unwrap(), set([2]));
        assert!(graph.accepted_friend_ids(UserId(1)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn pool_honors_exclusions() {
        let graph = MemoryGraph::seeded(
            [profile!(1: "Ana"), profile!(2: "Ben"), profile!(3: "Cam")],
            edges![],
            skills![],
        );

        let pool = graph.candidate_pool(&set([1, 3])).await.unwrap();
        assert_eq!(pool.len(), 1);
        assert_eq!(pool[0].id, UserId(2));
    }

    #[tokio::test]
    async fn missing_profile_is_unavailable() {
        let graph = MemoryGraph::new();
        assert!(matches!(
            graph.profile(UserId(9)).await,
            Err(GraphError::Unavailable(_))
        ));
    }
}
