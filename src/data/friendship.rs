//! Friend-request edges between users

use super::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a friend request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStatus {
    /// Sent, not yet answered. Blocks the pair from resurfacing in
    /// suggestions, in either direction.
    Pending,
    /// Both sides are connected.
    Accepted,
    /// Declined by the recipient. Does NOT block the pair from
    /// resurfacing in suggestions.
    Rejected,
}

/// A friend-request edge.
///
/// Directed at creation, but an accepted edge is symmetric everywhere
/// suggestions are concerned: "is A connected to B" checks both
/// directions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendshipEdge {
    /// Who sent the request.
    pub requester: UserId,

    /// Who received it.
    pub recipient: UserId,

    /// Where the request is in its lifecycle.
    pub status: EdgeStatus,

    /// When the request was sent.
    pub created_at: DateTime<Utc>,
}

impl FriendshipEdge {
    /// The other end of the edge, if `user` is on it at all.
    pub fn peer_of(&self, user: UserId) -> Option<UserId> {
        if self.requester == user {
            Some(self.recipient)
        } else if self.recipient == user {
            Some(self.requester)
        } else {
            None
        }
    }

    /// The endpoints as an unordered pair, normalized for deduplication.
    pub fn pair(&self) -> (UserId, UserId) {
        if self.requester <= self.recipient {
            (self.requester, self.recipient)
        } else {
            (self.recipient, self.requester)
        }
    }
}
