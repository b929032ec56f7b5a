//! In-process cache store
//!
//! A `CacheStore` backed by a HashMap, for single-node deployments and tests.
//! Deadlines use `tokio::time::Instant`, so paused test clocks drive expiry.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::cache::{CacheStore, CachedValue, Ttl};
use crate::error::Result;

// == Stored Entry ==
#[derive(Debug, Clone)]
struct StoredEntry {
    value: Vec<u8>,
    /// None = no expiration
    expires_at: Option<Instant>,
}

impl StoredEntry {
    /// An entry is expired once the current time reaches its deadline.
    fn is_expired(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) => now >= deadline,
            None => false,
        }
    }

    fn ttl(&self, now: Instant) -> Ttl {
        match self.expires_at {
            Some(deadline) => Ttl::Remaining(deadline.saturating_duration_since(now)),
            None => Ttl::NoExpiry,
        }
    }
}

// == Memory Store ==
/// HashMap-backed cache store with per-entry deadlines.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, StoredEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value that never expires.
    ///
    /// The service itself never writes without an expiry; this exists to
    /// model entries written by other tools.
    pub async fn set_persistent(&self, key: &str, value: &[u8]) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            StoredEntry {
                value: value.to_vec(),
                expires_at: None,
            },
        );
    }

    // == Cleanup Expired ==
    /// Removes all expired entries.
    ///
    /// Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Number of stored entries, expired ones included until cleanup.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Drops live entries that are found expired during a lookup.
    fn live<'a>(
        entries: &'a mut HashMap<String, StoredEntry>,
        key: &str,
        now: Instant,
    ) -> Option<&'a StoredEntry> {
        if entries.get(key).is_some_and(|e| e.is_expired(now)) {
            entries.remove(key);
        }
        entries.get(key)
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get_with_ttl(&self, key: &str) -> Result<Option<CachedValue>> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        Ok(Self::live(&mut entries, key, now)
            .map(|entry| CachedValue::new(entry.value.clone(), entry.ttl(now))))
    }

    async fn set_with_expiry(&self, key: &str, value: &[u8], expiration: Duration) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.to_string(),
            StoredEntry {
                value: value.to_vec(),
                expires_at: Some(Instant::now() + expiration),
            },
        );
        Ok(())
    }

    async fn try_acquire(&self, lock_key: &str, ttl: Duration) -> Result<bool> {
        let now = Instant::now();
        let mut entries = self.entries.lock().await;
        if Self::live(&mut entries, lock_key, now).is_some() {
            return Ok(false);
        }
        entries.insert(
            lock_key.to_string(),
            StoredEntry {
                value: Vec::new(),
                expires_at: Some(now + ttl),
            },
        );
        Ok(true)
    }

    async fn release(&self, lock_key: &str) -> Result<()> {
        self.entries.lock().await.remove(lock_key);
        Ok(())
    }
}
