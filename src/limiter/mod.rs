//! Rate Limiter Module
//!
//! Fixed-window admission control for named request categories.
//!
//! # Components
//! - `RateLimiter`: one quota over one window, with a blocking period once exceeded
//! - `RateLimiterRegistry`: lazily creates and shares limiters by category name
//! - `LimitRule`: quota/window pair, with presets for the portal categories

mod registry;
mod rule;
mod window;


pub use registry::RateLimiterRegistry;
pub use rule::LimitRule;
pub use window::{RateDecision, RateLimiter};
