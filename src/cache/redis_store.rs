//! Redis-backed cache store
//!
//! Talks to Redis (or any protocol-compatible server such as Dragonfly)
//! through a deadpool connection pool shared by every request task.

use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{Pool, Runtime};
use redis::AsyncCommands;

use crate::cache::{CacheStore, CachedValue, Ttl};
use crate::config::Config;
use crate::error::{CacheError, Result};

/// Cache store over a Redis connection pool.
#[derive(Clone)]
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Builds the pool from configuration and checks the server answers.
    pub async fn connect(config: &Config) -> Result<Self> {
        tracing::info!(url = %config.redis_url, "Connecting to Redis");

        let timeout = Duration::from_millis(config.redis_timeout_ms);
        let mut redis_config = deadpool_redis::Config::from_url(&config.redis_url);
        if let Some(ref mut pool_config) = redis_config.pool {
            pool_config.max_size = config.redis_pool_size;
            pool_config.timeouts.wait = Some(timeout);
            pool_config.timeouts.create = Some(timeout);
            pool_config.timeouts.recycle = Some(timeout);
        }

        let pool = redis_config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| CacheError::StoreUnavailable(e.to_string()))?;

        let store = Self::new(pool);
        store.ping().await?;
        tracing::info!("Connected to Redis");
        Ok(store)
    }

    /// Round-trips a PING, used at startup and by health checks.
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.pool.get().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// Maps a `GET`/`PTTL` reply pair to a cached entry.
///
/// A nil value or a `PTTL` of -2 means the key is absent.
fn cached_from_reply(value: Option<Vec<u8>>, pttl: i64) -> Option<CachedValue> {
    match (value, Ttl::from_pttl(pttl)) {
        (Some(value), Some(ttl)) => Some(CachedValue::new(value, ttl)),
        _ => None,
    }
}

/// Milliseconds for a PX argument; Redis rejects zero.
fn px_millis(duration: Duration) -> u64 {
    (duration.as_millis() as u64).max(1)
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get_with_ttl(&self, key: &str) -> Result<Option<CachedValue>> {
        let mut conn = self.pool.get().await?;

        // MULTI/EXEC keeps the value and its lifetime consistent with each
        // other; the key cannot expire between the two reads.
        let (value, pttl): (Option<Vec<u8>>, i64) = redis::pipe()
            .atomic()
            .get(key)
            .pttl(key)
            .query_async(&mut conn)
            .await?;

        Ok(cached_from_reply(value, pttl))
    }

    async fn set_with_expiry(&self, key: &str, value: &[u8], expiration: Duration) -> Result<()> {
        let mut conn = self.pool.get().await?;
        conn.pset_ex::<_, _, ()>(key, value, px_millis(expiration))
            .await?;
        Ok(())
    }

    async fn try_acquire(&self, lock_key: &str, ttl: Duration) -> Result<bool> {
        let mut conn = self.pool.get().await?;

        // The lock's value carries no meaning; only its existence does.
        let reply: Option<String> = redis::cmd("SET")
            .arg(lock_key)
            .arg("")
            .arg("NX")
            .arg("PX")
            .arg(px_millis(ttl))
            .query_async(&mut conn)
            .await?;

        Ok(reply.is_some())
    }

    async fn release(&self, lock_key: &str) -> Result<()> {
        let mut conn = self.pool.get().await?;
        conn.del::<_, ()>(lock_key).await?;
        Ok(())
    }
}
