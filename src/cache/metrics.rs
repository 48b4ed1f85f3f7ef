//! Cache Metrics Collection
//!
//! Lock-free counters for monitoring cache health.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Cache metrics collector
#[derive(Debug, Default)]
pub struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    commits: AtomicU64,
    aborts: AtomicU64,
    stream_faults: AtomicU64,
    evictions: AtomicU64,
    rebuilds: AtomicU64,
}

impl CacheMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_commit(&self) {
        self.commits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_abort(&self) {
        self.aborts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_stream_fault(&self) {
        self.stream_faults.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rebuild(&self) {
        self.rebuilds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    pub fn rebuilds(&self) -> u64 {
        self.rebuilds.load(Ordering::Relaxed)
    }

    /// Hit ratio over all lookups (0.0 when there were none)
    pub fn hit_ratio(&self) -> f64 {
        let hits = self.hits() as f64;
        let total = hits + self.misses() as f64;
        if total == 0.0 {
            0.0
        } else {
            hits / total
        }
    }

    /// Fill the counter half of a stats snapshot
    pub(crate) fn fill(&self, stats: &mut CacheStats) {
        stats.hits = self.hits();
        stats.misses = self.misses();
        stats.hit_ratio = self.hit_ratio();
        stats.commits = self.commits.load(Ordering::Relaxed);
        stats.aborts = self.aborts.load(Ordering::Relaxed);
        stats.stream_faults = self.stream_faults.load(Ordering::Relaxed);
        stats.evictions = self.evictions();
        stats.rebuilds = self.rebuilds();
    }
}

/// Point-in-time cache statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Sum of all clean value lengths
    pub size: u64,
    /// Byte budget
    pub max_size: u64,
    /// Number of clean value files
    pub file_count: u64,
    /// File budget
    pub max_file_count: u64,
    /// Live entries, including ones mid-edit
    pub entries: usize,
    /// Journal records superseded since the last rebuild
    pub redundant_op_count: u64,
    pub hits: u64,
    pub misses: u64,
    /// Hit ratio (0.0 - 1.0)
    pub hit_ratio: f64,
    pub commits: u64,
    pub aborts: u64,
    /// Writes that failed and were hidden from the caller
    pub stream_faults: u64,
    pub evictions: u64,
    /// Journal rebuilds, including the one on a fresh open
    pub rebuilds: u64,
}

// =============================================================================
// Tests
// =============================================================================
