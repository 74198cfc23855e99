use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// # Health Status Response
///
/// Liveness payload, extended with the size of the in-memory validator state
/// so operators can watch the cache and rate-limit tables grow.
///
/// ## Example JSON
/// ```json
/// {
///   "status": "UP",
///   "timestamp": "2024-03-10T15:30:45.123456789Z",
///   "cachedResults": 12,
///   "trackedClients": 3
/// }
/// ```
#[derive(Serialize, Debug, PartialEq, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub cached_results: usize,
    pub tracked_clients: usize,
}

impl HealthResponse {
    pub fn up(cached_results: usize, tracked_clients: usize) -> Self {
        Self {
            status: "UP".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            cached_results,
            tracked_clients,
        }
    }
}
