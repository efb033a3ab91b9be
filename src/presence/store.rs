//! Durable "last seen" persistence.

use crate::data::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Error writing a last-seen timestamp.
///
/// The tracker logs these and moves on; they never reach callers and
/// never delay the in-memory liveness computation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The durable store rejected or never received the write.
    #[error("last-seen write failed: {_0}")]
    Unavailable(String),
}

/// Best-effort durable record of when a user was last active.
///
/// Writes are fired from the heartbeat path; implementations should
/// return quickly or queue internally.
#[async_trait]
pub trait LastSeenStore: Send + Sync {
    /// Record that `user` was active at `at`.
    async fn record_last_seen(&self, user: UserId, at: DateTime<Utc>) -> Result<(), StoreError>;
}

/// Discards every write. For deployments without a durable store.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLastSeenStore;

#[async_trait]
impl LastSeenStore for NullLastSeenStore {
    async fn record_last_seen(&self, _user: UserId, _at: DateTime<Utc>) -> Result<(), StoreError> {
        Ok(())
    }
}
