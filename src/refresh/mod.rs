//! Refresh-ahead Module
//!
//! Serves cached resources and keeps them warm: synchronous fill on miss,
//! background single-flight refresh once an entry enters its refresh window.

mod coordinator;
mod loader;
mod orchestrator;

#[cfg(test)]
mod test_support;

use std::time::Duration;

pub use coordinator::{RefreshCoordinator, RefreshOutcome};
pub use loader::{load_with_deadline, Loader};
pub use orchestrator::{CacheOrchestrator, Lookup, Served};

use crate::cache::FreshnessConfig;
use crate::config::Config;

/// Timing knobs shared by an orchestrator and its coordinator.
#[derive(Debug, Clone, Copy)]
pub struct RefreshSettings {
    pub freshness: FreshnessConfig,
    /// Upper bound on how long a crashed refresh blocks the next one
    pub lock_ttl: Duration,
    /// Deadline for each loader call, inline or background
    pub loader_timeout: Duration,
}

impl RefreshSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            freshness: config.freshness(),
            lock_ttl: config.lock_ttl(),
            loader_timeout: config.loader_timeout(),
        }
    }
}
