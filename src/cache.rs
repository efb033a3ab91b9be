//! Time-bounded memoization for ranking results.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: Instant,
}

/// A map whose entries silently lapse after a fixed TTL.
///
/// Nothing actively evicts: a lapsed entry reads as a miss and is swept
/// on the next insert. Staleness inside the TTL is accepted behavior,
/// which is the point - writers to the underlying data never invalidate
/// here.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<FxHashMap<K, Entry<V>>>,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    /// Create an empty cache whose entries last `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(FxHashMap::default()),
        }
    }

    /// The value stored for `key`, unless missing or lapsed.
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| entry.value.clone())
    }

    /// Store `value` for `key`, restarting its TTL and sweeping anything
    /// already lapsed.
    pub fn insert(&self, key: K, value: V) {
        let now = Instant::now();
        let mut entries = self.entries.write();
        entries.retain(|_, entry| now < entry.expires_at);
        entries.insert(
            key,
            Entry {
                value,
                expires_at: now + self.ttl,
            },
        );
    }
}
