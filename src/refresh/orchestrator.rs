//! Cache Orchestrator
//!
//! Request-facing side of the refresh-ahead strategy.

use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;
use tracing::debug;
use uuid::Uuid;

use crate::cache::{CacheStore, Decision, FreshnessConfig, KeyScheme, RefreshStats, StatsSnapshot};
use crate::error::Result;
use crate::refresh::{load_with_deadline, Loader, RefreshCoordinator, RefreshSettings};

/// Result of reading the cache for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Nothing cached; the caller must produce the body and [`CacheOrchestrator::fill`] it
    Miss { cache_key: String },
    /// Cached body; a refresh has already been scheduled for a stale hit
    Hit { body: Vec<u8>, decision: Decision },
}

/// Body handed back to the caller and how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    pub body: Vec<u8>,
    /// None when the request bypassed the cache
    pub decision: Option<Decision>,
}

// == Cache Orchestrator ==
/// Serves resources from the cache, loading on miss and refreshing ahead of expiry.
pub struct CacheOrchestrator {
    scheme: KeyScheme,
    freshness: FreshnessConfig,
    loader_timeout: Duration,
    store: Arc<dyn CacheStore>,
    loader: Arc<dyn Loader>,
    coordinator: Arc<RefreshCoordinator>,
    stats: Arc<RefreshStats>,
}

impl CacheOrchestrator {
    pub fn new(
        scheme: KeyScheme,
        store: Arc<dyn CacheStore>,
        loader: Arc<dyn Loader>,
        settings: RefreshSettings,
    ) -> Self {
        let stats = Arc::new(RefreshStats::new());
        let coordinator = Arc::new(RefreshCoordinator::new(
            store.clone(),
            loader.clone(),
            &settings,
            stats.clone(),
        ));
        Self {
            scheme,
            freshness: settings.freshness,
            loader_timeout: settings.loader_timeout,
            store,
            loader,
            coordinator,
            stats,
        }
    }

    pub fn freshness(&self) -> &FreshnessConfig {
        &self.freshness
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn cache_key(&self, id: Uuid, path: &str) -> String {
        self.scheme.cache_key(id, path)
    }

    // == Serve ==
    /// Serves `id`, loading inline on a miss.
    ///
    /// Only GET goes through the cache; other methods go straight to the
    /// loader and never touch the store.
    pub async fn serve(&self, method: &Method, id: Uuid, path: &str) -> Result<Served> {
        if self.bypass_and_count(method) {
            let body = load_with_deadline(self.loader.as_ref(), id, self.loader_timeout).await?;
            return Ok(Served {
                body,
                decision: None,
            });
        }

        match self.lookup(id, path).await? {
            Lookup::Hit { body, decision } => Ok(Served {
                body,
                decision: Some(decision),
            }),
            Lookup::Miss { cache_key } => {
                let body =
                    load_with_deadline(self.loader.as_ref(), id, self.loader_timeout).await?;
                self.fill(&cache_key, &body).await?;
                Ok(Served {
                    body,
                    decision: Some(Decision::Miss),
                })
            }
        }
    }

    /// Whether `method` skips the cache, counting the bypass when it does.
    pub fn bypass_and_count(&self, method: &Method) -> bool {
        let bypass = method != Method::GET;
        if bypass {
            self.stats.record_bypass();
        }
        bypass
    }

    // == Lookup ==
    /// Reads the cache for `id` and applies the freshness policy.
    ///
    /// A stale hit schedules a background refresh before returning.
    pub async fn lookup(&self, id: Uuid, path: &str) -> Result<Lookup> {
        let cache_key = self.cache_key(id, path);
        let cached = self.store.get_with_ttl(&cache_key).await?;
        let decision = self.freshness.classify(cached.as_ref());
        self.stats.record_decision(decision);
        debug!(key = %cache_key, %decision, "cache lookup");

        match (decision, cached) {
            (Decision::StaleHit, Some(entry)) => {
                // Fire and forget; the response does not wait for the refresh.
                drop(self.coordinator.try_refresh(id, cache_key));
                Ok(Lookup::Hit {
                    body: entry.value,
                    decision,
                })
            }
            (Decision::FreshHit, Some(entry)) => Ok(Lookup::Hit {
                body: entry.value,
                decision,
            }),
            _ => Ok(Lookup::Miss { cache_key }),
        }
    }

    // == Fill ==
    /// Writes a freshly produced body with the full configured lifetime.
    pub async fn fill(&self, cache_key: &str, body: &[u8]) -> Result<()> {
        self.store
            .set_with_expiry(cache_key, body, self.freshness.cache_expiration())
            .await
    }
}
