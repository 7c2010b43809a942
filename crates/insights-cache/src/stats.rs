use std::sync::atomic::{AtomicU64, Ordering};

use insights_models::percent_of;
use serde_json::json;

/// Point-in-time counters for a [`crate::QueryCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Computations that failed and were not stored.
    pub failures: u64,
}

impl CacheStats {
    /// Hits as a percentage of all lookups, zero before the first lookup.
    pub fn hit_rate_pct(&self) -> f64 {
        percent_of(self.hits as f64, (self.hits + self.misses) as f64)
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "hits": self.hits,
            "misses": self.misses,
            "failures": self.failures,
            "hit_rate_pct": self.hit_rate_pct(),
        })
    }
}

#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
}

impl StatsCounters {
    pub(crate) fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_rate_guards_zero_lookups() {
        assert_eq!(CacheStats::default().hit_rate_pct(), 0.0);
    }

    #[test]
    fn counters_snapshot() {
        let counters = StatsCounters::default();
        counters.hit();
        counters.hit();
        counters.hit();
        counters.miss();
        counters.failure();

        let stats = counters.snapshot();
        assert_eq!(stats.hits, 3);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.hit_rate_pct(), 75.0);
        assert_eq!(stats.to_json()["hit_rate_pct"], json!(75.0));
    }
}
