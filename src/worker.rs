use std::sync::Arc;
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::orchestrator::ValidationOrchestrator;

/// Periodically drops stale cache entries and elapsed rate-limit windows so
/// the in-memory maps do not grow with every address and client ever seen.
pub struct SweepWorker {
    orchestrator: Arc<ValidationOrchestrator>,
    every: Duration,
}

impl SweepWorker {
    pub fn new(orchestrator: Arc<ValidationOrchestrator>, every: Duration) -> Self {
        Self {
            orchestrator,
            every,
        }
    }

    /// Runs until the surrounding task is dropped or aborted.
    pub async fn start(&self) {
        let interval_ms = u64::try_from(self.every.as_millis()).unwrap_or(u64::MAX);
        info!(interval_ms, "sweep worker started");
        let mut ticker = interval(self.every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; nothing is stale yet.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            self.sweep();
        }
    }

    /// One pass over both maps. Returns `(cache entries, rate-limit entries)`
    /// removed.
    pub fn sweep(&self) -> (usize, usize) {
        let (results, clients) = self.orchestrator.purge_expired();
        debug!(
            expired_results = results,
            expired_clients = clients,
            "sweep finished"
        );
        (results, clients)
    }
}
