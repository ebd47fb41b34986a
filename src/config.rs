//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{CacheConfig, DEFAULT_NAMESPACE};
use crate::error::Result;
use crate::limiter::LimitRule;

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of in-memory cache entries
    pub max_entries: usize,
    /// Default TTL in seconds for entries without explicit TTL
    pub default_ttl: u64,
    /// Prefix for keys written to the durable store
    pub cache_namespace: String,
    /// Whether cache entries are mirrored to the durable store
    pub durable_mirror: bool,
    /// JSON file backing the durable store
    pub durable_store_path: PathBuf,
    /// HTTP server port
    pub server_port: u16,
    /// Expired-entry sweep interval in seconds, 0 disables the sweep
    pub cleanup_interval: u64,
    /// Quota for categories without a preset
    pub rate_limit_max_requests: u32,
    /// Window in milliseconds for categories without a preset
    pub rate_limit_window_ms: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 100)
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `CACHE_NAMESPACE` - Durable key prefix (default: `portal_cache_`)
    /// - `DURABLE_MIRROR` - `true` or `false` (default: true)
    /// - `DURABLE_STORE_PATH` - Durable store file (default: `portal_cache.json`)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    /// - `RATE_LIMIT_MAX_REQUESTS` - Default quota (default: 10)
    /// - `RATE_LIMIT_WINDOW_MS` - Default window (default: 60000)
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            default_ttl: env_or("DEFAULT_TTL", defaults.default_ttl),
            cache_namespace: env::var("CACHE_NAMESPACE").unwrap_or(defaults.cache_namespace),
            durable_mirror: env_or("DURABLE_MIRROR", defaults.durable_mirror),
            durable_store_path: env_or("DURABLE_STORE_PATH", defaults.durable_store_path),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            rate_limit_max_requests: env_or(
                "RATE_LIMIT_MAX_REQUESTS",
                defaults.rate_limit_max_requests,
            ),
            rate_limit_window_ms: env_or("RATE_LIMIT_WINDOW_MS", defaults.rate_limit_window_ms),
        }
    }

    /// Cache settings derived from this configuration.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            default_ttl: Duration::from_secs(self.default_ttl),
            max_entries: self.max_entries,
            namespace: self.cache_namespace.clone(),
            use_durable_mirror: self.durable_mirror,
        }
    }

    /// Rule for rate limit categories without a preset.
    pub fn default_limit_rule(&self) -> LimitRule {
        LimitRule::new(
            self.rate_limit_max_requests,
            Duration::from_millis(self.rate_limit_window_ms),
        )
    }

    /// Checks every derived setting.
    pub fn validate(&self) -> Result<()> {
        self.cache_config().validate()?;
        self.default_limit_rule().validate()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: 100,
            default_ttl: 300,
            cache_namespace: DEFAULT_NAMESPACE.to_string(),
            durable_mirror: true,
            durable_store_path: PathBuf::from("portal_cache.json"),
            server_port: 3000,
            cleanup_interval: 60,
            rate_limit_max_requests: 10,
            rate_limit_window_ms: 60_000,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
