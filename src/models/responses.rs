//! Response DTOs for the portal guard API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::CacheStats;
use crate::clock::duration_ms;
use crate::limiter::{RateDecision, RateLimiter};

/// Response body for GET /cache/:key
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: Value,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for PUT /cache
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for GET /cache/:key/exists
#[derive(Debug, Clone, Serialize)]
pub struct ExistsResponse {
    pub key: String,
    pub exists: bool,
}

/// Response body for DELETE /cache/:key
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    /// Creates a new DeleteResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for DELETE /cache
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    /// Entries held in memory before the clear
    pub cleared_entries: usize,
}

/// Response body for GET /cache/stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Current number of in-memory entries
    pub total_entries: usize,
    /// Configured capacity
    pub max_entries: usize,
    /// Live keys, sorted
    pub keys: Vec<String>,
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Number of evictions
    pub evictions: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        let hit_rate = stats.hit_rate();
        Self {
            total_entries: stats.total_entries,
            max_entries: stats.max_entries,
            keys: stats.keys,
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            hit_rate,
        }
    }
}

/// Response body for the rate limit endpoints
#[derive(Debug, Clone, Serialize)]
pub struct LimitStatusResponse {
    pub category: String,
    /// Whether a request may proceed right now
    pub allowed: bool,
    pub wait_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub remaining_requests: u32,
    pub time_until_reset_ms: u64,
    pub max_requests: u32,
    pub window_ms: u64,
}

impl LimitStatusResponse {
    /// Builds the response from a decision and the limiter's current state.
    pub fn new(limiter: &mut RateLimiter, decision: RateDecision) -> Self {
        Self {
            category: limiter.category().to_string(),
            allowed: decision.allowed,
            wait_time_ms: decision.wait_time_ms,
            message: decision.message,
            remaining_requests: limiter.remaining_requests(),
            time_until_reset_ms: limiter.time_until_reset(),
            max_requests: limiter.max_requests(),
            window_ms: duration_ms(limiter.window()),
        }
    }
}

/// Response body for GET /limits
#[derive(Debug, Clone, Serialize)]
pub struct LimitsResponse {
    /// Categories with a live limiter, sorted
    pub categories: Vec<String>,
}

/// Plain acknowledgement
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
