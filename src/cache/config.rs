//! Cache configuration.

use std::time::Duration;

use crate::error::{Error, Result};

/// Default prefix for keys written to the durable mirror.
pub const DEFAULT_NAMESPACE: &str = "portal_cache_";

/// Settings for a [`TieredCache`](super::TieredCache).
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// TTL used by `set` when none is given
    pub default_ttl: Duration,
    /// Maximum number of in-memory entries
    pub max_entries: usize,
    /// Prefix for durable keys, so several caches can share one store
    pub namespace: String,
    /// Whether entries are mirrored to the durable store
    pub use_durable_mirror: bool,
}

impl CacheConfig {
    /// Rejects settings no cache can honor.
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(Error::InvalidConfig(
                "max_entries must be greater than zero".to_string(),
            ));
        }
        if self.default_ttl.is_zero() {
            return Err(Error::InvalidConfig(
                "default_ttl must be greater than zero".to_string(),
            ));
        }
        // An empty prefix would claim every key in a shared store
        if self.namespace.is_empty() {
            return Err(Error::InvalidConfig(
                "namespace must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_default_ttl(mut self, default_ttl: Duration) -> Self {
        self.default_ttl = default_ttl;
        self
    }

    pub fn with_durable_mirror(mut self, enabled: bool) -> Self {
        self.use_durable_mirror = enabled;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(300),
            max_entries: 100,
            namespace: DEFAULT_NAMESPACE.to_string(),
            use_durable_mirror: true,
        }
    }
}
