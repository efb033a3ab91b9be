//! Heartbeat fan-out between processes.

use super::HeartbeatMessage;
use tokio::sync::broadcast;

/// An opaque pub/sub channel carrying [`HeartbeatMessage`]s.
///
/// Implementations own delivery end to end, including reconnect with
/// backoff; the tracker only publishes local state and consumes one
/// subscription.
pub trait PresenceTransport: Send + Sync {
    /// Fan a local heartbeat out to peers.
    ///
    /// Fire-and-forget: transports queue or drop internally rather than
    /// surface errors here.
    fn publish(&self, message: HeartbeatMessage);

    /// A fresh subscription to peer heartbeats.
    fn subscribe(&self) -> broadcast::Receiver<HeartbeatMessage>;
}

/// Single-process transport: published messages loop straight back to
/// subscribers. Backs the test suite and single-node deployments.
#[derive(Debug)]
pub struct LoopbackTransport {
    channel: broadcast::Sender<HeartbeatMessage>,
}

impl LoopbackTransport {
    /// Create a loopback channel buffering up to `capacity` messages per
    /// subscriber.
    pub fn new(capacity: usize) -> Self {
        let (channel, _) = broadcast::channel(capacity);
        Self { channel }
    }
}

impl Default for LoopbackTransport {
    fn default() -> Self {
        Self::new(64)
    }
}

impl PresenceTransport for LoopbackTransport {
    fn publish(&self, message: HeartbeatMessage) {
        // a send with no live subscriber is not a failure
        let _ = self.channel.send(message);
    }

    fn subscribe(&self) -> broadcast::Receiver<HeartbeatMessage> {
        self.channel.subscribe()
    }
}
