//! Refresh Coordinator
//!
//! Rebuilds a cache entry in the background, with at most one rebuild per key
//! in flight across every replica sharing the store.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::{lock_key_for, CacheStore, RefreshStats};
use crate::refresh::{load_with_deadline, Loader, RefreshSettings};

/// How a single refresh attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Lock held, loader succeeded, entry rewritten
    Refreshed,
    /// Another task or replica holds the refresh lock
    Contended,
    /// Lock held, loader failed; entry left as it was
    LoaderFailed,
    /// The store rejected the lock or the write
    StoreFailed,
}

// == Refresh Coordinator ==
/// Single-flight background refresh guarded by a store-level lock.
pub struct RefreshCoordinator {
    store: Arc<dyn CacheStore>,
    loader: Arc<dyn Loader>,
    cache_expiration: Duration,
    lock_ttl: Duration,
    loader_timeout: Duration,
    stats: Arc<RefreshStats>,
}

impl RefreshCoordinator {
    pub fn new(
        store: Arc<dyn CacheStore>,
        loader: Arc<dyn Loader>,
        settings: &RefreshSettings,
        stats: Arc<RefreshStats>,
    ) -> Self {
        Self {
            store,
            loader,
            cache_expiration: settings.freshness.cache_expiration(),
            lock_ttl: settings.lock_ttl,
            loader_timeout: settings.loader_timeout,
            stats,
        }
    }

    // == Try Refresh ==
    /// Starts a refresh on its own task and returns without waiting.
    ///
    /// The task is detached from the caller: dropping the handle, or the
    /// request that triggered it going away, does not stop it.
    pub fn try_refresh(self: &Arc<Self>, id: Uuid, cache_key: String) -> JoinHandle<RefreshOutcome> {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move { coordinator.refresh(id, &cache_key).await })
    }

    // == Refresh ==
    /// Runs one refresh attempt to completion.
    ///
    /// Nothing is retried here; a failed attempt is retried by the next
    /// request that observes the entry as stale.
    pub async fn refresh(&self, id: Uuid, cache_key: &str) -> RefreshOutcome {
        let lock_key = lock_key_for(cache_key);

        match self.store.try_acquire(&lock_key, self.lock_ttl).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(key = %cache_key, "refresh already in progress elsewhere");
                self.stats.record_skipped();
                return RefreshOutcome::Contended;
            }
            Err(e) => {
                warn!(key = %cache_key, error = %e, "failed to acquire refresh lock");
                self.stats.record_refresh_failure();
                return RefreshOutcome::StoreFailed;
            }
        }

        let outcome = self.reload(id, cache_key).await;

        // The lock TTL covers a failed release.
        if let Err(e) = self.store.release(&lock_key).await {
            warn!(key = %cache_key, error = %e, "failed to release refresh lock");
        }

        match outcome {
            RefreshOutcome::Refreshed => self.stats.record_refresh(),
            _ => self.stats.record_refresh_failure(),
        }
        outcome
    }

    async fn reload(&self, id: Uuid, cache_key: &str) -> RefreshOutcome {
        let data = match load_with_deadline(self.loader.as_ref(), id, self.loader_timeout).await {
            Ok(data) => data,
            Err(e) => {
                warn!(key = %cache_key, %id, error = %e, "failed to load data for refresh");
                return RefreshOutcome::LoaderFailed;
            }
        };

        if let Err(e) = self
            .store
            .set_with_expiry(cache_key, &data, self.cache_expiration)
            .await
        {
            warn!(key = %cache_key, error = %e, "failed to write refreshed entry");
            return RefreshOutcome::StoreFailed;
        }

        info!(key = %cache_key, %id, "refreshed cache entry");
        RefreshOutcome::Refreshed
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::cache::{FreshnessConfig, MemoryStore, Ttl};
    use crate::refresh::test_support::{CountingLoader, FlakyStore};

    const SECOND: Duration = Duration::from_secs(1);
    const KEY: &str = "cache_by_uuid:test";

    fn settings() -> RefreshSettings {
        RefreshSettings {
            freshness: FreshnessConfig::new(100 * SECOND, 0.5),
            lock_ttl: 30 * SECOND,
            loader_timeout: 5 * SECOND,
        }
    }

    fn coordinator(
        store: Arc<dyn CacheStore>,
        loader: Arc<CountingLoader>,
    ) -> (Arc<RefreshCoordinator>, Arc<RefreshStats>) {
        let stats = Arc::new(RefreshStats::new());
        let coordinator = RefreshCoordinator::new(store, loader, &settings(), stats.clone());
        (Arc::new(coordinator), stats)
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_rewrites_entry_with_full_lifetime() {
        let store = Arc::new(MemoryStore::new());
        let loader = Arc::new(CountingLoader::default());
        let (coordinator, stats) = coordinator(store.clone(), loader.clone());

        store.set_with_expiry(KEY, b"old", 100 * SECOND).await.unwrap();
        tokio::time::advance(60 * SECOND).await;

        let outcome = coordinator.refresh(Uuid::new_v4(), KEY).await;
        assert_eq!(outcome, RefreshOutcome::Refreshed);

        let cached = store.get_with_ttl(KEY).await.unwrap().unwrap();
        assert_eq!(cached.value, b"v1");
        assert_eq!(cached.ttl, Ttl::Remaining(100 * SECOND));
        assert_eq!(stats.snapshot().refreshes, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_releases_lock() {
        let store = Arc::new(MemoryStore::new());
        let loader = Arc::new(CountingLoader::default());
        let (coordinator, _) = coordinator(store.clone(), loader.clone());

        coordinator.refresh(Uuid::new_v4(), KEY).await;
        assert!(store.get_with_ttl(&lock_key_for(KEY)).await.unwrap().is_none());

        assert_eq!(coordinator.refresh(Uuid::new_v4(), KEY).await, RefreshOutcome::Refreshed);
        assert_eq!(loader.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_contended_refresh_skips_loader() {
        let store = Arc::new(MemoryStore::new());
        let loader = Arc::new(CountingLoader::default());
        let (coordinator, stats) = coordinator(store.clone(), loader.clone());

        assert!(store.try_acquire(&lock_key_for(KEY), 30 * SECOND).await.unwrap());

        let outcome = coordinator.refresh(Uuid::new_v4(), KEY).await;
        assert_eq!(outcome, RefreshOutcome::Contended);
        assert_eq!(loader.calls(), 0);
        assert!(store.get_with_ttl(KEY).await.unwrap().is_none());
        assert_eq!(stats.snapshot().refreshes_skipped, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_flight_under_concurrency() {
        let store = Arc::new(MemoryStore::new());
        let loader = Arc::new(CountingLoader::with_delay(SECOND));
        let (coordinator, stats) = coordinator(store.clone(), loader.clone());

        store.set_with_expiry(KEY, b"old", 100 * SECOND).await.unwrap();
        tokio::time::advance(60 * SECOND).await;

        let id = Uuid::new_v4();
        let handles: Vec<_> = (0..50)
            .map(|_| coordinator.try_refresh(id, KEY.to_string()))
            .collect();

        let mut refreshed = 0;
        let mut contended = 0;
        for handle in handles {
            match handle.await.unwrap() {
                RefreshOutcome::Refreshed => refreshed += 1,
                RefreshOutcome::Contended => contended += 1,
                other => panic!("unexpected outcome {other:?}"),
            }
        }

        assert_eq!(refreshed, 1);
        assert_eq!(contended, 49);
        assert_eq!(loader.calls(), 1);
        assert_eq!(stats.snapshot().refreshes_skipped, 49);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loader_failure_leaves_entry_stale() {
        let store = Arc::new(MemoryStore::new());
        let loader = Arc::new(CountingLoader::default());
        loader.set_failing(true);
        let (coordinator, stats) = coordinator(store.clone(), loader.clone());

        store.set_with_expiry(KEY, b"old", 100 * SECOND).await.unwrap();
        tokio::time::advance(60 * SECOND).await;

        let outcome = coordinator.refresh(Uuid::new_v4(), KEY).await;
        assert_eq!(outcome, RefreshOutcome::LoaderFailed);

        let cached = store.get_with_ttl(KEY).await.unwrap().unwrap();
        assert_eq!(cached.value, b"old");
        assert_eq!(cached.ttl, Ttl::Remaining(40 * SECOND));
        assert_eq!(stats.snapshot().refresh_failures, 1);

        // Lock is released so the next stale hit can try again.
        loader.set_failing(false);
        assert_eq!(coordinator.refresh(Uuid::new_v4(), KEY).await, RefreshOutcome::Refreshed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loader_deadline_bounds_refresh() {
        let store = Arc::new(MemoryStore::new());
        let loader = Arc::new(CountingLoader::with_delay(60 * SECOND));
        let (coordinator, _) = coordinator(store.clone(), loader.clone());

        let outcome = coordinator.refresh(Uuid::new_v4(), KEY).await;
        assert_eq!(outcome, RefreshOutcome::LoaderFailed);
        assert!(store.get_with_ttl(KEY).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_failure_is_swallowed() {
        let store = Arc::new(FlakyStore::default());
        store.fail_acquire.store(true, Ordering::SeqCst);
        let loader = Arc::new(CountingLoader::default());
        let (coordinator, _) = coordinator(store.clone(), loader.clone());

        let outcome = coordinator.refresh(Uuid::new_v4(), KEY).await;
        assert_eq!(outcome, RefreshOutcome::StoreFailed);
        assert_eq!(loader.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_failure_falls_back_to_lock_ttl() {
        let store = Arc::new(FlakyStore::default());
        store.fail_release.store(true, Ordering::SeqCst);
        let loader = Arc::new(CountingLoader::default());
        let (coordinator, _) = coordinator(store.clone(), loader.clone());

        assert_eq!(coordinator.refresh(Uuid::new_v4(), KEY).await, RefreshOutcome::Refreshed);

        tokio::time::advance(29 * SECOND).await;
        assert_eq!(coordinator.refresh(Uuid::new_v4(), KEY).await, RefreshOutcome::Contended);

        tokio::time::advance(SECOND).await;
        assert_eq!(coordinator.refresh(Uuid::new_v4(), KEY).await, RefreshOutcome::Refreshed);
        assert_eq!(loader.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_failure_reports_store_failed() {
        let store = Arc::new(FlakyStore::default());
        store.fail_writes.store(true, Ordering::SeqCst);
        let loader = Arc::new(CountingLoader::default());
        let (coordinator, _) = coordinator(store.clone(), loader.clone());

        assert_eq!(coordinator.refresh(Uuid::new_v4(), KEY).await, RefreshOutcome::StoreFailed);
        assert!(store.inner.try_acquire(&lock_key_for(KEY), SECOND).await.unwrap());
    }
}
