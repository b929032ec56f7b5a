//! Freshness Policy
//!
//! Decides whether a cached entry is served as-is, served while a refresh is
//! scheduled, or missing altogether.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::cache::{CachedValue, Ttl};

/// Factor used whenever the configured one falls outside the accepted range.
pub const DEFAULT_REFRESH_AHEAD_FACTOR: f64 = 0.25;

/// Shortest entry lifetime; shorter ones are raised to it so the window
/// stays non-zero.
pub const MIN_CACHE_EXPIRATION: Duration = Duration::from_millis(1);

/// Accepted range for the refresh-ahead factor, inclusive.
pub const MIN_REFRESH_AHEAD_FACTOR: f64 = 0.1;
pub const MAX_REFRESH_AHEAD_FACTOR: f64 = 0.9;

// == Decision ==
/// Outcome of looking at a cache read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// No entry; load synchronously
    Miss,
    /// Entry is fresh; serve it
    FreshHit,
    /// Entry is inside the refresh-ahead window; serve it and refresh in background
    StaleHit,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Miss => "miss",
            Decision::FreshHit => "fresh",
            Decision::StaleHit => "stale",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Freshness Config ==
/// Entry lifetime and the refresh-ahead window derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreshnessConfig {
    cache_expiration: Duration,
    refresh_ahead_factor: f64,
    refresh_ahead_window: Duration,
}

impl FreshnessConfig {
    /// Builds the config, resolving an out-of-range factor to the default.
    ///
    /// A factor of 0.25 means a cached entry is refreshed once less than a
    /// quarter of its lifetime remains, if it is accessed at all.
    pub fn new(cache_expiration: Duration, refresh_ahead_factor: f64) -> Self {
        let cache_expiration = cache_expiration.max(MIN_CACHE_EXPIRATION);
        let factor = resolve_factor(refresh_ahead_factor);
        Self {
            cache_expiration,
            refresh_ahead_factor: factor,
            refresh_ahead_window: cache_expiration.mul_f64(factor),
        }
    }

    pub fn cache_expiration(&self) -> Duration {
        self.cache_expiration
    }

    pub fn refresh_ahead_factor(&self) -> f64 {
        self.refresh_ahead_factor
    }

    pub fn refresh_ahead_window(&self) -> Duration {
        self.refresh_ahead_window
    }

    /// Applies the policy to the result of a store read.
    pub fn classify(&self, cached: Option<&CachedValue>) -> Decision {
        match cached {
            Some(entry) => decide(true, entry.ttl, self.refresh_ahead_window),
            None => Decision::Miss,
        }
    }
}

/// Resolves a configured factor; anything outside [0.1, 0.9] (NaN included)
/// becomes 0.25.
pub fn resolve_factor(factor: f64) -> f64 {
    if (MIN_REFRESH_AHEAD_FACTOR..=MAX_REFRESH_AHEAD_FACTOR).contains(&factor) {
        factor
    } else {
        DEFAULT_REFRESH_AHEAD_FACTOR
    }
}

// == Decide ==
/// Pure freshness decision.
///
/// An entry without expiry is never stale.
pub fn decide(found: bool, remaining: Ttl, window: Duration) -> Decision {
    if !found {
        return Decision::Miss;
    }
    match remaining {
        Ttl::Remaining(left) if left < window => Decision::StaleHit,
        Ttl::Remaining(_) | Ttl::NoExpiry => Decision::FreshHit,
    }
}
