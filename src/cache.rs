use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;
use tracing::debug;

use crate::clock::SharedClock;
use crate::models::ValidationResult;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    result: ValidationResult,
    stored_at: Instant,
}

/// In-memory memoization of validation outcomes keyed by the raw email string.
///
/// Entries are kept in write order: lookups `peek` without promoting, so
/// when the cache is full the entry written longest ago (and therefore the
/// stalest) is evicted first. Stale entries are ignored on lookup rather
/// than removed; they are overwritten by the next `put` for the same address
/// or dropped by [`ResultCache::purge_expired`].
pub struct ResultCache {
    config: CacheConfig,
    clock: SharedClock,
    entries: Mutex<LruCache<String, CacheEntry>>,
}

impl ResultCache {
    pub fn new(config: CacheConfig, clock: SharedClock) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            config,
            clock,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn get(&self, email: &str) -> Option<ValidationResult> {
        let now = self.clock.now();
        let entries = self.lock();
        entries
            .peek(email)
            .filter(|entry| now.duration_since(entry.stored_at) < self.config.ttl)
            .map(|entry| entry.result.clone())
    }

    /// Stores `result`, moving `email` to the newest position. A full cache
    /// evicts its oldest entry.
    pub fn put(&self, email: &str, result: ValidationResult) {
        let entry = CacheEntry {
            result,
            stored_at: self.clock.now(),
        };
        let mut entries = self.lock();
        if let Some((evicted, _)) = entries.push(email.to_string(), entry) {
            if evicted != email {
                debug!(evicted = %evicted, "result cache full, evicted oldest entry");
            }
        }
    }

    /// Drops entries older than the TTL. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let ttl = self.config.ttl;
        let mut entries = self.lock();
        let stale: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.stored_at) >= ttl)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            entries.pop(key);
        }
        if !stale.is_empty() {
            debug!(removed = stale.len(), remaining = entries.len(), "purged stale cached results");
        }
        stale.len()
    }

    /// Number of stored entries, fresh or stale.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<String, CacheEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
