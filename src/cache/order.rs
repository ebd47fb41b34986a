//! Creation Order Module
//!
//! Tracks keys by creation time for oldest-first eviction.

use std::collections::VecDeque;

// == Creation Order ==
/// Keys ordered by the `created_at` of their entry.
///
/// - Front = oldest
/// - Back = newest
///
/// Reads never reorder keys. Equal timestamps keep insertion order.
#[derive(Debug, Default)]
pub struct CreationOrder {
    order: VecDeque<(u64, String)>,
}

impl CreationOrder {
    // == Constructor ==
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Insert ==
    /// Records `key` as created at `created_at`, replacing any earlier record.
    pub fn insert(&mut self, key: &str, created_at: u64) {
        self.remove(key);
        let pos = self.order.partition_point(|(t, _)| *t <= created_at);
        self.order.insert(pos, (created_at, key.to_string()));
    }

    // == Remove ==
    /// Removes a key from the tracker.
    pub fn remove(&mut self, key: &str) {
        self.order.retain(|(_, k)| k != key);
    }

    // == Evict Oldest ==
    /// Removes and returns the oldest key other than `keep`.
    pub fn evict_oldest_except(&mut self, keep: &str) -> Option<String> {
        let pos = self.order.iter().position(|(_, k)| k != keep)?;
        self.order.remove(pos).map(|(_, k)| k)
    }

    // == Peek Oldest ==
    /// Returns the oldest key without removing it.
    pub fn peek_oldest(&self) -> Option<&str> {
        self.order.front().map(|(_, k)| k.as_str())
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.order.clear();
    }

    // == Length ==
    /// Returns the number of tracked keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    // == Contains ==
    /// Checks if a key is being tracked.
    pub fn contains(&self, key: &str) -> bool {
        self.order.iter().any(|(_, k)| k == key)
    }
}
