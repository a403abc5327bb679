//! Time-to-live memoization of computed snapshots, keyed by source.
//!
//! Expiry is checked when an entry is read; nothing runs in the background.
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use tracing::debug;

pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_secs(600);

/// Source of the current instant. Swapped out in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

struct CacheEntry<T> {
    value: Arc<T>,
    stored_at: Instant,
}

/// Immutable snapshots shared as `Arc<T>` until their freshness window lapses.
pub struct SnapshotCache<T> {
    freshness_window: Duration,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
}

impl<T> SnapshotCache<T> {
    pub fn new(freshness_window: Duration) -> Self {
        Self::with_clock(freshness_window, Arc::new(SystemClock))
    }

    pub fn with_clock(freshness_window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            freshness_window,
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn freshness_window(&self) -> Duration {
        self.freshness_window
    }

    /// Cached value for `key` if it was stored less than one window ago.
    pub fn get_fresh(&self, key: &str) -> Option<Arc<T>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let entry = entries.get(key)?;

        let age = self.clock.now().saturating_duration_since(entry.stored_at);
        if age < self.freshness_window {
            debug!("Cache hit for {} (age {}s)", key, age.as_secs());
            Some(Arc::clone(&entry.value))
        } else {
            debug!("Cache entry for {} expired (age {}s)", key, age.as_secs());
            None
        }
    }

    /// Store `value` under `key`, replacing any previous entry.
    pub fn insert(&self, key: &str, value: T) -> Arc<T> {
        let value = Arc::new(value);
        let entry = CacheEntry {
            value: Arc::clone(&value),
            stored_at: self.clock.now(),
        };

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), entry);
        value
    }

    /// Fresh cached value, or the result of `compute` which then replaces the entry.
    ///
    /// Errors from `compute` are returned and nothing is cached.
    pub fn get_or_try_insert_with<E, F>(&self, key: &str, compute: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.get_fresh(key) {
            return Ok(value);
        }

        let value = compute()?;
        Ok(self.insert(key, value))
    }

    pub fn invalidate(&self, key: &str) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
    }
}
