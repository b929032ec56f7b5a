//! Cache Module
//!
//! Store adapters, freshness policy and key layout for the refresh-ahead cache.

mod entry;
mod keys;
mod memory;
mod policy;
mod redis_store;
mod stats;
mod store;


// Re-export public types
pub use entry::{CachedValue, Ttl};
pub use keys::{lock_key_for, KeyScheme, PATH_NAMESPACE, REFRESH_LOCK_SUFFIX};
pub use memory::MemoryStore;
pub use policy::{
    decide, resolve_factor, Decision, FreshnessConfig, DEFAULT_REFRESH_AHEAD_FACTOR,
    MAX_REFRESH_AHEAD_FACTOR, MIN_CACHE_EXPIRATION, MIN_REFRESH_AHEAD_FACTOR,
};
pub use redis_store::RedisStore;
pub use stats::{RefreshStats, StatsSnapshot};
pub use store::CacheStore;
