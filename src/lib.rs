//! # mutuals
//!
//! Friend suggestions and presence for the campus social app: given a
//! viewer, rank "people you may know" from relationship-graph data with
//! a deterministic weighted score, and answer "who is online right now"
//! from decaying heartbeats.
//!
//! Auth, the relational store, object storage, and every screen live
//! elsewhere; this crate owns the two subsystems with algorithmic
//! content and reaches the rest through the contracts in [`graph`],
//! [`presence::store`], and [`presence::transport`].

#![deny(
    clippy::undocumented_unsafe_blocks,
    clippy::missing_safety_doc,
    reason = "multi-person projects should document dangers"
)]
#![warn(missing_docs)]
#![cfg_attr(
    not(any(test, debug_assertions)),
    deny(
        clippy::missing_panics_doc,
        clippy::panic,
        clippy::unimplemented,
        clippy::unwrap_used,
        reason = "prefer errors over panicking"
    )
)]
#![cfg_attr(
    not(any(test, debug_assertions)),
    forbid(clippy::todo, reason = "production code should not use `todo`")
)]

pub mod algo;
pub mod cache;
pub mod config;
pub mod data;
pub mod graph;
pub mod presence;

pub use algo::{SuggestError, SuggestionRanker};
pub use config::{DEFAULT_SUGGESTION_LIMIT, PresenceConfig, RankerConfig};
pub use data::{Profile, ProfileSummary, ScoreBreakdown, SuggestionCandidate, UserId};
pub use graph::{GraphAccessor, GraphError, MemoryGraph};
pub use presence::{HeartbeatMessage, Presence, PresenceTransport, PresenceUpdate};
