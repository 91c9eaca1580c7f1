//! Configuration for the session store.

use std::time::Duration;

/// Default maximum number of live visitor sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

/// Default idle lifetime (24 minutes).
pub const DEFAULT_TTL: Option<Duration> = Some(Duration::from_secs(1440));

/// Default interval between expiry sweeps.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Configuration for the session store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum number of sessions held before LRU eviction.
    pub max_sessions: usize,

    /// Idle lifetime. A session not accessed within this window is gone.
    /// `None` keeps sessions until evicted by capacity.
    pub ttl: Option<Duration>,

    /// Interval for [`SessionStore::spawn_cleanup_task`](crate::SessionStore::spawn_cleanup_task).
    pub cleanup_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
            ttl: DEFAULT_TTL,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of sessions.
    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }

    /// Set the idle lifetime.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Keep sessions until capacity eviction.
    pub fn without_ttl(mut self) -> Self {
        self.ttl = None;
        self
    }

    /// Set the sweep interval.
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }
}
