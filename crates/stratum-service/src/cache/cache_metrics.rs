//! Cache hit/miss accounting.
//!
//! Counts are kept twice: in process-local atomics so the service can report
//! them directly, and as `metrics` counters for the Prometheus exporter.

use metrics::{counter, describe_counter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metric names for the cache layer.
pub mod names {
    /// Reads served from the cache.
    pub const CACHE_HITS_TOTAL: &str = "stratum_cache_hits_total";
    /// Reads that fell through to the backing store.
    pub const CACHE_MISSES_TOTAL: &str = "stratum_cache_misses_total";
    /// Deferred write-behind persists that failed and were dropped.
    pub const WRITE_BEHIND_FAILURES_TOTAL: &str = "stratum_cache_write_behind_failures_total";
}

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(names::CACHE_HITS_TOTAL, "Cache reads served from the store");
    describe_counter!(
        names::CACHE_MISSES_TOTAL,
        "Cache reads that fell through to the backing store"
    );
    describe_counter!(
        names::WRITE_BEHIND_FAILURES_TOTAL,
        "Write-behind persists that failed after the cache was updated"
    );
}

/// Leading key segment, used as a low-cardinality label.
fn namespace(key: &str) -> String {
    key.split(':').next().unwrap_or(key).to_string()
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    write_behind_failures: AtomicU64,
}

/// Shared cache counters. Clones observe the same counts.
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    counters: Arc<Counters>,
}

impl CacheMetrics {
    /// Creates zeroed counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a read served from the cache.
    pub fn record_hit(&self, key: &str) {
        self.counters.hits.fetch_add(1, Ordering::Relaxed);
        counter!(names::CACHE_HITS_TOTAL, "namespace" => namespace(key)).increment(1);
    }

    /// Record a read that fell through to the fetcher.
    pub fn record_miss(&self, key: &str) {
        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        counter!(names::CACHE_MISSES_TOTAL, "namespace" => namespace(key)).increment(1);
    }

    /// Record a dropped write-behind persist.
    pub fn record_write_behind_failure(&self, key: &str) {
        self.counters
            .write_behind_failures
            .fetch_add(1, Ordering::Relaxed);
        counter!(names::WRITE_BEHIND_FAILURES_TOTAL, "namespace" => namespace(key)).increment(1);
    }

    #[must_use]
    pub fn hits(&self) -> u64 {
        self.counters.hits.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn misses(&self) -> u64 {
        self.counters.misses.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn write_behind_failures(&self) -> u64 {
        self.counters.write_behind_failures.load(Ordering::Relaxed)
    }

    /// Fraction of reads served from the cache, 0.0 before any read.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}
