//! Cache Store Module
//!
//! The atomic primitives the refresh-ahead logic needs from a key-value cache.

use std::time::Duration;

use async_trait::async_trait;

use crate::cache::CachedValue;
use crate::error::Result;

// == Cache Store ==
/// Atomic operations against a shared key-value cache.
///
/// Every method is a single exchange with the store. Any transport or
/// protocol failure is reported as `CacheError::StoreUnavailable`; an absent
/// key is never an error.
#[async_trait]
pub trait CacheStore: Send + Sync + 'static {
    /// Reads a value and its remaining lifetime in one atomic exchange.
    async fn get_with_ttl(&self, key: &str) -> Result<Option<CachedValue>>;

    /// Overwrites `key`, resetting its lifetime to the full `expiration`.
    async fn set_with_expiry(&self, key: &str, value: &[u8], expiration: Duration) -> Result<()>;

    /// Creates `lock_key` with `ttl` only if it does not exist.
    ///
    /// Returns whether the key was created. Never blocks or retries.
    async fn try_acquire(&self, lock_key: &str, ttl: Duration) -> Result<bool>;

    /// Deletes `lock_key` unconditionally.
    async fn release(&self, lock_key: &str) -> Result<()>;
}
