//! Session store with LRU eviction and sliding idle expiry.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Instant;

use lru::LruCache;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::config::StoreConfig;
use crate::id::SessionId;

/// Entry stored per session.
#[derive(Debug)]
struct Entry<V> {
    value: V,
    last_access: Instant,
}

impl<V> Entry<V> {
    fn new(value: V) -> Self {
        Self {
            value,
            last_access: Instant::now(),
        }
    }

    fn touch(&mut self) {
        self.last_access = Instant::now();
    }
}

/// Keyed store of per-visitor session values.
///
/// Every operation takes the lock for a single short critical section and
/// releases it before returning. Two requests for the same session may
/// therefore interleave between operations; the last write wins.
///
/// The value type is chosen by the caller. It must be `Default` so that
/// [`update`](Self::update) can lazily create a session on first write.
pub struct SessionStore<V> {
    inner: Arc<Mutex<LruCache<SessionId, Entry<V>>>>,
    config: StoreConfig,
}

impl<V: Clone + Default> SessionStore<V> {
    /// Create an empty store.
    pub fn new(config: StoreConfig) -> Self {
        let cap = NonZeroUsize::new(config.max_sessions).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Arc::new(Mutex::new(LruCache::new(cap))),
            config,
        }
    }

    /// Get the store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Current number of stored sessions (including not-yet-swept expired ones).
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Get a copy of a session's value, resetting its idle timer.
    ///
    /// Returns `None` for unknown sessions and for sessions whose idle
    /// lifetime has elapsed (those are dropped on the spot).
    pub fn get(&self, id: &SessionId) -> Option<V> {
        let mut lru = self.inner.lock();
        if self.drop_if_expired(&mut lru, id) {
            return None;
        }
        lru.get_mut(id).map(|entry| {
            entry.touch();
            trace!(session_id = %id, "Session hit");
            entry.value.clone()
        })
    }

    /// Get a copy of a session's value without touching LRU order or idle timer.
    pub fn peek(&self, id: &SessionId) -> Option<V> {
        let lru = self.inner.lock();
        lru.peek(id)
            .filter(|entry| !self.is_expired(entry))
            .map(|entry| entry.value.clone())
    }

    /// Check whether a live session exists.
    pub fn contains(&self, id: &SessionId) -> bool {
        let lru = self.inner.lock();
        lru.peek(id).is_some_and(|entry| !self.is_expired(entry))
    }

    /// Replace a session's value.
    pub fn insert(&self, id: &SessionId, value: V) {
        let mut lru = self.inner.lock();
        Self::push(&mut lru, id, Entry::new(value));
    }

    /// Mutate a session's value in place, creating a default value first if
    /// the session is unknown or expired.
    pub fn update<F, R>(&self, id: &SessionId, f: F) -> R
    where
        F: FnOnce(&mut V) -> R,
    {
        let mut lru = self.inner.lock();
        self.drop_if_expired(&mut lru, id);

        let entry = lru.get_or_insert_mut(*id, || {
            debug!(session_id = %id, "Creating session");
            Entry::new(V::default())
        });
        entry.touch();
        f(&mut entry.value)
    }

    /// Remove a session, returning its last value.
    pub fn remove(&self, id: &SessionId) -> Option<V> {
        self.inner.lock().pop(id).map(|entry| entry.value)
    }

    /// Drop every session whose idle lifetime has elapsed.
    pub fn cleanup_expired(&self) -> usize {
        let mut lru = self.inner.lock();
        let expired: Vec<SessionId> = lru
            .iter()
            .filter(|(_, entry)| self.is_expired(entry))
            .map(|(id, _)| *id)
            .collect();

        for id in &expired {
            lru.pop(id);
        }

        if !expired.is_empty() {
            debug!(count = expired.len(), "Cleaned up expired sessions");
        }
        expired.len()
    }

    /// Store statistics.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            size: self.len(),
            capacity: self.config.max_sessions,
        }
    }

    fn is_expired(&self, entry: &Entry<V>) -> bool {
        self.config
            .ttl
            .is_some_and(|ttl| entry.last_access.elapsed() > ttl)
    }

    fn drop_if_expired(&self, lru: &mut LruCache<SessionId, Entry<V>>, id: &SessionId) -> bool {
        let expired = lru.peek(id).is_some_and(|entry| self.is_expired(entry));
        if expired {
            debug!(session_id = %id, "Session expired, removing");
            lru.pop(id);
        }
        expired
    }

    fn push(lru: &mut LruCache<SessionId, Entry<V>>, id: &SessionId, entry: Entry<V>) {
        if let Some((evicted, _)) = lru.push(*id, entry) {
            if evicted != *id {
                debug!(session_id = %evicted, "Evicting least recently used session");
            }
        }
    }
}

impl<V: Clone + Default + Send + 'static> SessionStore<V> {
    /// Spawn a background task that sweeps expired sessions every
    /// `cleanup_interval`. The task runs until aborted.
    pub fn spawn_cleanup_task(&self) -> JoinHandle<()> {
        let store = self.clone();
        let period = self.config.cleanup_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                store.cleanup_expired();
            }
        })
    }
}

impl<V> Clone for SessionStore<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            config: self.config.clone(),
        }
    }
}

/// Store statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Current number of stored sessions.
    pub size: usize,

    /// Maximum capacity.
    pub capacity: usize,
}
