//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::duration_ms;

// == Cache Entry ==
/// A single cached value with its timing metadata.
///
/// The same shape is written to the durable mirror as JSON:
/// `{"value": ..., "expiresAt": ..., "createdAt": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
    /// Creation timestamp (Unix milliseconds), used for eviction order
    pub created_at: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry created at `now` that lives for `ttl`.
    pub fn new(value: V, now: u64, ttl: Duration) -> Self {
        Self {
            value,
            expires_at: now.saturating_add(duration_ms(ttl)),
            created_at: now,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now`.
    ///
    /// An entry is expired once `now >= expires_at`, so a zero TTL is
    /// expired immediately.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now >= self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self, now: u64) -> u64 {
        self.expires_at.saturating_sub(now)
    }
}
