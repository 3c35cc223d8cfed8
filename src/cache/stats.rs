//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, and errors.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// == Stats Recorder ==
/// Lock-free counters shared by every caller of one cache service.
#[derive(Debug, Default)]
pub struct StatsRecorder {
    hits: AtomicU64,
    misses: AtomicU64,
    errors: AtomicU64,
    operations: AtomicU64,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_operation(&self) {
        self.operations.fetch_add(1, Ordering::Relaxed);
    }

    /// Zeroes every counter.
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.errors.store(0, Ordering::Relaxed);
        self.operations.store(0, Ordering::Relaxed);
    }

    /// Copies the counters into a serializable snapshot.
    pub fn snapshot(&self, is_connected: bool, default_ttl: u64) -> CacheStats {
        CacheStats::new(
            self.hits.load(Ordering::Relaxed),
            self.misses.load(Ordering::Relaxed),
            self.errors.load(Ordering::Relaxed),
            self.operations.load(Ordering::Relaxed),
            is_connected,
            default_ttl,
        )
    }
}

// == Cache Stats ==
/// Point-in-time view of the counters, in the shape the health and stats
/// endpoints report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Reads that found a value
    pub hits: u64,
    /// Reads that found nothing, or ran while the cache was unavailable
    pub misses: u64,
    /// Transport and serialization failures
    pub errors: u64,
    /// Store operations attempted
    pub operations: u64,
    /// `hits / (hits + misses)` as a percentage with two decimals
    pub hit_rate: String,
    /// Whether the transport is currently connected
    pub is_connected: bool,
    /// General TTL in seconds
    #[serde(rename = "defaultTTL")]
    pub default_ttl: u64,
}

impl CacheStats {
    pub fn new(
        hits: u64,
        misses: u64,
        errors: u64,
        operations: u64,
        is_connected: bool,
        default_ttl: u64,
    ) -> Self {
        Self {
            hits,
            misses,
            errors,
            operations,
            hit_rate: format!("{:.2}%", hit_ratio(hits, misses) * 100.0),
            is_connected,
            default_ttl,
        }
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_ratio(&self) -> f64 {
        hit_ratio(self.hits, self.misses)
    }
}

fn hit_ratio(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}
