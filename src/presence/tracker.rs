//! The in-memory heartbeat map and its decay predicate.

use super::{HeartbeatMessage, LastSeenStore, PresenceTransport, PresenceUpdate};
use crate::{config::PresenceConfig, data::UserId};
use chrono::Utc;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tokio::{
    sync::broadcast,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::warn;

/// The latest knowledge about one user.
///
/// Overwritten wholesale on every heartbeat and never evicted; a stale
/// record just reads as offline.
#[derive(Debug, Clone, Copy)]
struct PresenceRecord {
    /// Arrival time on the monotonic clock; the decay predicate's only
    /// input.
    beat_at: Instant,

    /// Whether the user was composing as of this heartbeat.
    typing: bool,
}

/// Tracks who is online, fed by local heartbeats and a peer
/// subscription.
///
/// Cheap to clone; clones share one record map. Queries are synchronous
/// and never error: an unknown user is simply offline.
#[derive(Clone)]
pub struct Presence {
    inner: Arc<PresenceInner>,
}

struct PresenceInner {
    config: PresenceConfig,
    records: RwLock<FxHashMap<UserId, PresenceRecord>>,
    events: broadcast::Sender<PresenceUpdate>,
    transport: Arc<dyn PresenceTransport>,
    store: Arc<dyn LastSeenStore>,
}

impl Presence {
    /// Create a tracker wired to its collaborators.
    pub fn new(
        config: PresenceConfig,
        transport: Arc<dyn PresenceTransport>,
        store: Arc<dyn LastSeenStore>,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity);
        Self {
            inner: Arc::new(PresenceInner {
                config,
                records: RwLock::default(),
                events,
                transport,
                store,
            }),
        }
    }

    /// Record a heartbeat for `user`, fan it out to peers, and persist
    /// last-seen in the background.
    ///
    /// Always succeeds from the caller's point of view: the durable
    /// write is fire-and-forget and its failures are logged, never
    /// surfaced. Requires a current tokio runtime.
    pub fn record_heartbeat(&self, user: UserId, typing: bool) {
        let seen_at = Utc::now();
        self.apply(user, typing);
        self.inner.transport.publish(HeartbeatMessage {
            user_id: user,
            timestamp: seen_at,
            typing,
        });

        let store = Arc::clone(&self.inner.store);
        tokio::spawn(async move {
            if let Err(e) = store.record_last_seen(user, seen_at).await {
                warn!(user = %user, error = %e, "last-seen write failed");
            }
        });
    }

    /// Whether `user`'s latest heartbeat is inside the decay window.
    ///
    /// Derived fresh on every call - the boolean is never cached, so a
    /// user silently decays to offline once heartbeats stop.
    pub fn is_online(&self, user: UserId) -> bool {
        self.inner
            .records
            .read()
            .get(&user)
            .is_some_and(|record| self.fresh(record))
    }

    /// Whether `user` is composing right now.
    ///
    /// Gated on [`is_online`](Self::is_online): a typing flag recorded
    /// before the decay window is never reported, even though nothing
    /// ever explicitly clears it.
    pub fn is_typing(&self, user: UserId) -> bool {
        self.inner
            .records
            .read()
            .get(&user)
            .is_some_and(|record| record.typing && self.fresh(record))
    }

    /// Listen for applied heartbeats, local and peer alike.
    pub fn subscribe(&self) -> broadcast::Receiver<PresenceUpdate> {
        self.inner.events.subscribe()
    }

    /// Spawn the self-heartbeat and peer-ingest loops for `local_user`.
    ///
    /// The first self-heartbeat fires immediately, then every configured
    /// interval, re-emitting the current typing flag so a mid-composition
    /// refresh does not clear it. Dropping the returned handles stops
    /// both loops.
    pub fn start(&self, local_user: UserId) -> PresenceLoops {
        let beat = {
            let presence = self.clone();
            tokio::spawn(async move {
                let mut ticks = time::interval(presence.inner.config.heartbeat_interval);
                ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticks.tick().await;
                    let typing = presence
                        .inner
                        .records
                        .read()
                        .get(&local_user)
                        .is_some_and(|record| record.typing);
                    presence.record_heartbeat(local_user, typing);
                }
            })
        };

        let ingest = {
            let presence = self.clone();
            let mut feed = self.inner.transport.subscribe();
            tokio::spawn(async move {
                loop {
                    match feed.recv().await {
                        // our own fan-out loops back on some transports
                        Ok(message) if message.user_id == local_user => {}
                        Ok(message) => presence.apply(message.user_id, message.typing),
                        Err(broadcast::error::RecvError::Lagged(missed)) => {
                            warn!(missed, "presence feed lagged; skipping ahead");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            })
        };

        PresenceLoops { beat, ingest }
    }

    fn fresh(&self, record: &PresenceRecord) -> bool {
        Instant::now().saturating_duration_since(record.beat_at) < self.inner.config.decay_window
    }

    fn apply(&self, user: UserId, typing: bool) {
        self.inner.records.write().insert(
            user,
            PresenceRecord {
                beat_at: Instant::now(),
                typing,
            },
        );
        // a send with nobody subscribed just means nobody is binding yet
        let _ = self.inner.events.send(PresenceUpdate {
            user_id: user,
            typing,
        });
    }
}

/// Handles to the background loops spawned by [`Presence::start`].
///
/// Aborts both loops on drop.
#[derive(Debug)]
pub struct PresenceLoops {
    /// Emits the local user's heartbeat on the configured interval.
    pub beat: JoinHandle<()>,

    /// Applies peer heartbeats from the transport subscription.
    pub ingest: JoinHandle<()>,
}

impl PresenceLoops {
    /// Stop both loops.
    pub fn abort(&self) {
        self.beat.abort();
        self.ingest.abort();
    }
}

impl Drop for PresenceLoops {
    fn drop(&mut self) {
        self.abort();
    }
}
