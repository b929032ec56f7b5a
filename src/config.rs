//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::FreshnessConfig;

/// Which cache store implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Shared Redis or Dragonfly instance
    Redis,
    /// In-process store, single node only
    Memory,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "redis" | "dragonfly" => Ok(Backend::Redis),
            "memory" => Ok(Backend::Memory),
            other => Err(format!("unknown cache backend: {other}")),
        }
    }
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Cache store implementation
    pub backend: Backend,
    /// Redis connection URL
    pub redis_url: String,
    /// Redis connection pool size
    pub redis_pool_size: usize,
    /// Redis pool wait/create/recycle timeout in milliseconds
    pub redis_timeout_ms: u64,
    /// Lifetime given to every cache write, in seconds
    pub cache_expiration_secs: u64,
    /// Fraction of the lifetime before expiry at which refresh kicks in
    pub refresh_ahead_factor: f64,
    /// Lifetime of the per-key refresh lock, in seconds
    pub refresh_lock_ttl_secs: u64,
    /// Deadline for a single loader call, in milliseconds
    pub loader_timeout_ms: u64,
    /// Memory backend cleanup interval in seconds
    pub cleanup_interval_secs: u64,
    /// Simulated origin latency in milliseconds
    pub repo_latency_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `CACHE_BACKEND` - `redis` or `memory` (default: redis)
    /// - `REDIS_URL` - Redis URL (default: redis://localhost:6379)
    /// - `REDIS_POOL_SIZE` - Pool size (default: 16)
    /// - `REDIS_TIMEOUT_MS` - Pool timeouts (default: 1000)
    /// - `CACHE_EXPIRATION_SECS` - Entry lifetime (default: 100)
    /// - `REFRESH_AHEAD_FACTOR` - Refresh-ahead fraction (default: 0.5)
    /// - `REFRESH_LOCK_TTL_SECS` - Refresh lock lifetime (default: 30)
    /// - `LOADER_TIMEOUT_MS` - Loader deadline (default: 5000)
    /// - `CLEANUP_INTERVAL_SECS` - Memory backend cleanup (default: 1)
    /// - `REPO_LATENCY_MS` - Simulated origin latency (default: 200)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            backend: env_or("CACHE_BACKEND", defaults.backend),
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            redis_pool_size: env_or("REDIS_POOL_SIZE", defaults.redis_pool_size),
            redis_timeout_ms: env_or("REDIS_TIMEOUT_MS", defaults.redis_timeout_ms),
            cache_expiration_secs: env_or("CACHE_EXPIRATION_SECS", defaults.cache_expiration_secs),
            refresh_ahead_factor: env_or("REFRESH_AHEAD_FACTOR", defaults.refresh_ahead_factor),
            refresh_lock_ttl_secs: env_or("REFRESH_LOCK_TTL_SECS", defaults.refresh_lock_ttl_secs),
            loader_timeout_ms: env_or("LOADER_TIMEOUT_MS", defaults.loader_timeout_ms),
            cleanup_interval_secs: env_or("CLEANUP_INTERVAL_SECS", defaults.cleanup_interval_secs),
            repo_latency_ms: env_or("REPO_LATENCY_MS", defaults.repo_latency_ms),
        }
    }

    /// Freshness settings derived from this configuration.
    pub fn freshness(&self) -> FreshnessConfig {
        FreshnessConfig::new(
            Duration::from_secs(self.cache_expiration_secs.max(1)),
            self.refresh_ahead_factor,
        )
    }

    pub fn lock_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_lock_ttl_secs.max(1))
    }

    pub fn loader_timeout(&self) -> Duration {
        Duration::from_millis(self.loader_timeout_ms.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            backend: Backend::Redis,
            redis_url: "redis://localhost:6379".to_string(),
            redis_pool_size: 16,
            redis_timeout_ms: 1000,
            cache_expiration_secs: 100,
            refresh_ahead_factor: 0.5,
            refresh_lock_ttl_secs: 30,
            loader_timeout_ms: 5000,
            cleanup_interval_secs: 1,
            repo_latency_ms: 200,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
