//! Cache Module
//!
//! Two-tier cache: an in-memory map with TTL expiry and oldest-first
//! eviction, mirrored into an optional durable key/value store.

mod config;
mod entry;
mod order;
mod stats;
mod store;


// Re-export public types
pub use config::{CacheConfig, DEFAULT_NAMESPACE};
pub use entry::CacheEntry;
pub use order::CreationOrder;
pub use stats::CacheStats;
pub use store::TieredCache;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed serialized value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
