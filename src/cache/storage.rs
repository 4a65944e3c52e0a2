//! TTL-bounded in-memory storage for decoded responses

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::debug;
use serde_json::Value;
use tokio::time::Instant;

use super::{CacheKey, DEFAULT_TTL};

/// A stored response and the instant it was inserted.
///
/// Entries are never modified in place; a newer response replaces the entry.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    inserted_at: Instant,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<CacheKey, CacheEntry>,
    /// Bumped by every invalidation and clear.
    epoch: u64,
}

/// Response cache keyed by [`CacheKey`].
///
/// An entry is servable iff `now - inserted_at < ttl`. Expired entries are
/// reported absent and dropped lazily on the next lookup. All operations are
/// short synchronous map updates behind a mutex, never held across an await.
pub struct ResponseCache {
    inner: Mutex<Inner>,
    ttl: Duration,
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseCache {
    /// Create an empty cache with the default TTL.
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    /// Create an empty cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get cached data if present and younger than the TTL.
    ///
    /// Never fetches; a miss is reported as `None`.
    pub fn get(&self, key: &CacheKey) -> Option<Value> {
        let mut inner = self.lock();
        match inner.entries.get(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.ttl => Some(entry.value.clone()),
            Some(_) => {
                inner.entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a response stamped with the current instant, replacing any prior entry.
    pub fn put(&self, key: CacheKey, value: Value) {
        let entry = CacheEntry {
            value,
            inserted_at: Instant::now(),
        };
        self.lock().entries.insert(key, entry);
    }

    /// Current invalidation epoch; capture it before starting a request.
    pub fn epoch(&self) -> u64 {
        self.lock().epoch
    }

    /// Store a response only if nothing was invalidated since `epoch`.
    ///
    /// A read that started before a mutation must not repopulate the keys
    /// that mutation purged. Returns whether the value was stored.
    pub fn put_since(&self, epoch: u64, key: CacheKey, value: Value) -> bool {
        let mut inner = self.lock();
        if inner.epoch != epoch {
            debug!("Discarding response for {} fetched before invalidation", key);
            return false;
        }
        inner.entries.insert(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
        true
    }

    /// Remove every entry whose key contains any of `patterns`.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate<S: AsRef<str>>(&self, patterns: &[S]) -> usize {
        let mut inner = self.lock();
        inner.epoch += 1;
        let before = inner.entries.len();
        inner
            .entries
            .retain(|key, _| !patterns.iter().any(|p| key.matches(p.as_ref())));
        let removed = before - inner.entries.len();

        if removed > 0 {
            debug!(
                "Invalidated {} cache entries matching {:?}",
                removed,
                patterns.iter().map(AsRef::as_ref).collect::<Vec<_>>()
            );
        }
        removed
    }

    /// Drop every entry.
    ///
    /// Called when the session ends; cached data belongs to one identity.
    pub fn clear(&self) -> usize {
        let mut inner = self.lock();
        inner.epoch += 1;
        let count = inner.entries.len();
        inner.entries.clear();
        count
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        let total_entries = inner.entries.len();
        let valid_entries = inner
            .entries
            .values()
            .filter(|e| e.inserted_at.elapsed() < self.ttl)
            .count();

        CacheStats {
            total_entries,
            valid_entries,
            expired_entries: total_entries - valid_entries,
        }
    }
}

/// Statistics about cache state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
}
