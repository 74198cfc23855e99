use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::clock::SharedClock;

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_REQUESTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            max_requests: DEFAULT_MAX_REQUESTS,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RateLimitEntry {
    count: u32,
    window_start: Instant,
}

/// Fixed-window admission control keyed by caller identifier.
///
/// Each identifier gets `max_requests` admissions per `window`. The window
/// opens on the first request and is reset by the first request arriving
/// after it has elapsed. The check and the increment happen under one lock,
/// so concurrent callers sharing an identifier cannot overshoot the budget.
pub struct RateLimiter {
    config: RateLimitConfig,
    clock: SharedClock,
    entries: Mutex<HashMap<String, RateLimitEntry>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, clock: SharedClock) -> Self {
        Self {
            config,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Returns `true` when the request is admitted. A rejection does not
    /// consume budget.
    pub fn admit(&self, identifier: &str) -> bool {
        let now = self.clock.now();
        let mut entries = self.lock();

        match entries.get_mut(identifier) {
            Some(entry) if now.duration_since(entry.window_start) <= self.config.window => {
                if entry.count < self.config.max_requests {
                    entry.count += 1;
                    true
                } else {
                    warn!(
                        identifier,
                        count = entry.count,
                        max = self.config.max_requests,
                        "rate limit exceeded"
                    );
                    false
                }
            }
            _ => {
                entries.insert(
                    identifier.to_string(),
                    RateLimitEntry {
                        count: 1,
                        window_start: now,
                    },
                );
                true
            }
        }
    }

    /// Drops entries whose window has elapsed. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let window = self.config.window;
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| now.duration_since(entry.window_start) <= window);
        let removed = before - entries.len();
        if removed > 0 {
            debug!(removed, remaining = entries.len(), "purged expired rate-limit windows");
        }
        removed
    }

    /// Number of identifiers currently tracked.
    pub fn tracked(&self) -> usize {
        self.lock().len()
    }

    // A poisoned lock only means another thread panicked mid-update; the map
    // itself is still a valid set of counters.
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, RateLimitEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
