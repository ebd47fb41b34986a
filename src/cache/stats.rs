//! Cache Statistics Module
//!
//! Diagnostic snapshot of the cache: size, capacity, live keys and counters.

use serde::Serialize;

// == Cache Stats ==
/// Diagnostic view of a cache. Not part of any correctness contract.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Current number of in-memory entries, expired ones included until purged
    pub total_entries: usize,
    /// Configured capacity
    pub max_entries: usize,
    /// Keys of in-memory entries that are still live, sorted
    pub keys: Vec<String>,
    /// Number of reads that returned a value
    pub hits: u64,
    /// Number of reads that returned nothing (absent or expired)
    pub misses: u64,
    /// Number of entries evicted for capacity
    pub evictions: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            ..Self::default()
        }
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}
