//! Fakes shared by the refresh unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::cache::{CacheStore, CachedValue, MemoryStore};
use crate::error::{CacheError, LoaderError, Result};
use crate::refresh::Loader;

/// Loader returning `v1`, `v2`, ... and counting calls.
#[derive(Default)]
pub struct CountingLoader {
    calls: AtomicUsize,
    delay: Duration,
    failing: AtomicBool,
}

impl CountingLoader {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl Loader for CountingLoader {
    async fn load(&self, _id: Uuid) -> std::result::Result<Vec<u8>, LoaderError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(LoaderError::Origin("origin unreachable".to_string()));
        }
        Ok(format!("v{n}").into_bytes())
    }
}

/// Memory store with switchable failures per operation.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub fail_acquire: AtomicBool,
    pub fail_release: AtomicBool,
}

fn unavailable() -> CacheError {
    CacheError::StoreUnavailable("connection reset".to_string())
}

#[async_trait]
impl CacheStore for FlakyStore {
    async fn get_with_ttl(&self, key: &str) -> Result<Option<CachedValue>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.get_with_ttl(key).await
    }

    async fn set_with_expiry(&self, key: &str, value: &[u8], expiration: Duration) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.set_with_expiry(key, value, expiration).await
    }

    async fn try_acquire(&self, lock_key: &str, ttl: Duration) -> Result<bool> {
        if self.fail_acquire.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.try_acquire(lock_key, ttl).await
    }

    async fn release(&self, lock_key: &str) -> Result<()> {
        if self.fail_release.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.inner.release(lock_key).await
    }
}
