//! Portal Guard - client-side caching and rate limiting for the student portal
//!
//! A tiered TTL cache with an optional durable mirror, and fixed-window
//! rate limiters keyed by request category. Both run on an injected clock.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod limiter;
pub mod models;
pub mod storage;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheConfig, TieredCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{Error, Result};
pub use limiter::{LimitRule, RateDecision, RateLimiter, RateLimiterRegistry};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use tasks::spawn_sweep_task;
