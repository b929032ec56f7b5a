//! Refresh Statistics Module
//!
//! Tracks how requests were served and how background refreshes went.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::cache::Decision;

// == Refresh Stats ==
/// Counters shared by an orchestrator and its coordinator.
#[derive(Debug, Default)]
pub struct RefreshStats {
    fresh_hits: AtomicU64,
    stale_hits: AtomicU64,
    misses: AtomicU64,
    bypasses: AtomicU64,
    refreshes: AtomicU64,
    refreshes_skipped: AtomicU64,
    refresh_failures: AtomicU64,
}

/// Point-in-time copy of [`RefreshStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Requests served from a fresh entry
    pub fresh_hits: u64,
    /// Requests served from an entry inside the refresh-ahead window
    pub stale_hits: u64,
    /// Requests that had to load synchronously
    pub misses: u64,
    /// Non-read requests that skipped the cache
    pub bypasses: u64,
    /// Background refreshes that rewrote the entry
    pub refreshes: u64,
    /// Refresh attempts that lost the lock
    pub refreshes_skipped: u64,
    /// Refresh attempts that held the lock but failed
    pub refresh_failures: u64,
}

impl RefreshStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_decision(&self, decision: Decision) {
        let counter = match decision {
            Decision::Miss => &self.misses,
            Decision::FreshHit => &self.fresh_hits,
            Decision::StaleHit => &self.stale_hits,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_bypass(&self) {
        self.bypasses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.refreshes_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_refresh_failure(&self) {
        self.refresh_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            fresh_hits: self.fresh_hits.load(Ordering::Relaxed),
            stale_hits: self.stale_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            bypasses: self.bypasses.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            refreshes_skipped: self.refreshes_skipped.load(Ordering::Relaxed),
            refresh_failures: self.refresh_failures.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    // == Hit Rate ==
    /// Calculates the share of cached reads served without a synchronous load.
    ///
    /// Returns 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.fresh_hits + self.stale_hits;
        let total = hits + self.misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = RefreshStats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_record_decisions() {
        let stats = RefreshStats::new();
        stats.record_decision(Decision::Miss);
        stats.record_decision(Decision::FreshHit);
        stats.record_decision(Decision::FreshHit);
        stats.record_decision(Decision::StaleHit);
        stats.record_bypass();

        let snap = stats.snapshot();
        assert_eq!(snap.misses, 1);
        assert_eq!(snap.fresh_hits, 2);
        assert_eq!(snap.stale_hits, 1);
        assert_eq!(snap.bypasses, 1);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        assert_eq!(StatsSnapshot::default().hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let snap = StatsSnapshot {
            fresh_hits: 2,
            stale_hits: 1,
            misses: 1,
            ..StatsSnapshot::default()
        };
        assert_eq!(snap.hit_rate(), 0.75);
    }

    #[test]
    fn test_refresh_counters() {
        let stats = RefreshStats::new();
        stats.record_refresh();
        stats.record_skipped();
        stats.record_skipped();
        stats.record_refresh_failure();

        let snap = stats.snapshot();
        assert_eq!(snap.refreshes, 1);
        assert_eq!(snap.refreshes_skipped, 2);
        assert_eq!(snap.refresh_failures, 1);
    }
}
