//! Response DTOs for the service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::StatsSnapshot;

/// Per-namespace cache statistics.
#[derive(Debug, Clone, Serialize)]
pub struct NamespaceStats {
    pub namespace: String,
    #[serde(flatten)]
    pub counters: StatsSnapshot,
    /// Share of cached reads served without a synchronous load
    pub hit_rate: f64,
    /// Refresh-ahead window in seconds
    pub refresh_ahead_window_secs: f64,
}

impl NamespaceStats {
    pub fn new(namespace: impl Into<String>, counters: StatsSnapshot, window_secs: f64) -> Self {
        Self {
            namespace: namespace.into(),
            hit_rate: counters.hit_rate(),
            counters,
            refresh_ahead_window_secs: window_secs,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub caches: Vec<NamespaceStats>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
