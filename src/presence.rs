//! Who is online right now.
//!
//! Presence is approximate and best-effort: one in-memory map of the
//! latest heartbeat per user, with "online" derived at query time from a
//! decay window rather than ever stored as a boolean. Missed leave
//! events therefore cost nothing; a user who vanishes simply decays to
//! offline.

pub mod store;
pub mod tracker;
pub mod transport;

pub use store::*;
pub use tracker::*;
pub use transport::*;

use crate::data::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The wire shape fanned out to peer processes on every heartbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatMessage {
    /// Who the heartbeat is about.
    pub user_id: UserId,

    /// Wall-clock send time. Carried for last-seen display only;
    /// liveness decay runs on the receiver's own clock.
    pub timestamp: DateTime<Utc>,

    /// Whether the user is mid-composition.
    pub typing: bool,
}

/// Pushed to [`Presence::subscribe`] listeners whenever a heartbeat is
/// applied, so UI bindings can re-query reactively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresenceUpdate {
    /// Whose record changed.
    pub user_id: UserId,

    /// The typing flag as of this heartbeat.
    pub typing: bool,
}
