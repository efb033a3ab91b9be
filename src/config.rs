//! Runtime tunables.
//!
//! Scoring weights are deliberately NOT configuration: ranking must stay
//! deterministic and testable across deployments (see
//! [`algo::score`](crate::algo::score)). The windows and limits below are
//! the knobs operators may reasonably tune per environment.

use std::{env, fmt::Display, str::FromStr, time::Duration};
use tracing::warn;

/// Default cap on ranked output length.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

/// Tunables for the suggestion ranker.
#[derive(Debug, Clone)]
pub struct RankerConfig {
    /// How long a ranked list stays valid per viewer. Graph mutations
    /// inside this window are deliberately not visible.
    pub cache_ttl: Duration,

    /// Budget for one candidate's relation lookup; an overrun drops that
    /// candidate only, never the whole call.
    pub candidate_timeout: Duration,

    /// Upper bound on in-flight candidate lookups per ranking call.
    pub fan_out: usize,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(300),
            candidate_timeout: Duration::from_secs(2),
            fan_out: 8,
        }
    }
}

impl RankerConfig {
    /// Defaults overridden by `SUGGEST_CACHE_TTL_SECS`,
    /// `SUGGEST_CANDIDATE_TIMEOUT_MS`, and `SUGGEST_FAN_OUT` where set.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            cache_ttl: Duration::from_secs(try_load(
                "SUGGEST_CACHE_TTL_SECS",
                defaults.cache_ttl.as_secs(),
            )),
            candidate_timeout: Duration::from_millis(try_load(
                "SUGGEST_CANDIDATE_TIMEOUT_MS",
                defaults.candidate_timeout.as_millis() as u64,
            )),
            fan_out: try_load("SUGGEST_FAN_OUT", defaults.fan_out),
        }
    }
}

/// Tunables for presence tracking.
#[derive(Debug, Clone)]
pub struct PresenceConfig {
    /// How long after the last heartbeat a user still reads as online.
    pub decay_window: Duration,

    /// How often the local process re-emits its own heartbeat.
    pub heartbeat_interval: Duration,

    /// Buffered presence updates per subscriber before it lags.
    pub event_capacity: usize,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            decay_window: Duration::from_secs(300),
            heartbeat_interval: Duration::from_secs(30),
            event_capacity: 64,
        }
    }
}

impl PresenceConfig {
    /// Defaults overridden by `PRESENCE_DECAY_SECS`,
    /// `PRESENCE_HEARTBEAT_SECS`, and `PRESENCE_EVENT_CAPACITY` where
    /// set.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            decay_window: Duration::from_secs(try_load(
                "PRESENCE_DECAY_SECS",
                defaults.decay_window.as_secs(),
            )),
            heartbeat_interval: Duration::from_secs(try_load(
                "PRESENCE_HEARTBEAT_SECS",
                defaults.heartbeat_interval.as_secs(),
            )),
            event_capacity: try_load("PRESENCE_EVENT_CAPACITY", defaults.event_capacity),
        }
    }
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(value) => value,
            Err(e) => {
                warn!("invalid {key} value {raw:?}: {e}; using default {default}");
                default
            }
        },
        Err(_) => default,
    }
}
