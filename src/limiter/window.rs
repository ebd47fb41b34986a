//! Fixed Window Limiter Module
//!
//! Counts attempts in a trailing window and blocks for a full window once
//! the quota is used up.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::clock::{duration_ms, Clock};
use crate::error::{Error, Result};
use crate::limiter::LimitRule;

// == Rate Decision ==
/// Outcome of an admission check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateDecision {
    pub allowed: bool,
    /// Milliseconds until a request may be admitted, 0 when allowed
    pub wait_time_ms: u64,
    /// Human-readable refusal, absent when allowed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RateDecision {
    /// A decision that lets the request through.
    pub fn admitted() -> Self {
        Self {
            allowed: true,
            wait_time_ms: 0,
            message: None,
        }
    }

    fn refused(wait_time_ms: u64) -> Self {
        Self {
            allowed: false,
            wait_time_ms,
            message: Some(format!(
                "Too many requests. Please try again in {} seconds.",
                wait_time_ms.div_ceil(1000)
            )),
        }
    }
}

// == Rate Limiter ==
/// Fixed-window limiter.
///
/// States: open while fewer than `max_requests` attempts fall in the
/// trailing window; blocked for one full window once a check finds the
/// quota used up; open again on the first check after the block ends.
///
/// Attempts are counted, not successes: callers record a request once they
/// are about to perform it, whatever its outcome.
pub struct RateLimiter {
    category: String,
    rule: LimitRule,
    /// Attempt times inside the trailing window, oldest first
    timestamps: VecDeque<u64>,
    blocked_until: Option<u64>,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("category", &self.category)
            .field("rule", &self.rule)
            .field("recorded", &self.timestamps.len())
            .field("blocked_until", &self.blocked_until)
            .finish_non_exhaustive()
    }
}

impl RateLimiter {
    // == Constructor ==
    /// Creates an unnamed limiter.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] for a zero quota or zero window.
    pub fn new(max_requests: u32, window: Duration, clock: Arc<dyn Clock>) -> Result<Self> {
        Self::from_rule("default", LimitRule::new(max_requests, window), clock)
    }

    /// Creates a limiter for `category` from a rule.
    pub fn from_rule(
        category: impl Into<String>,
        rule: LimitRule,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        rule.validate()?;

        Ok(Self {
            category: category.into(),
            rule,
            timestamps: VecDeque::new(),
            blocked_until: None,
            clock,
        })
    }

    // == Can Make Request ==
    /// Decides whether a request may proceed now. Does not record it.
    ///
    /// Finding the quota used up starts a block of one full window.
    pub fn can_make_request(&mut self) -> RateDecision {
        let now = self.clock.now_ms();

        if let Some(wait) = self.block_remaining(now) {
            return RateDecision::refused(wait);
        }
        self.blocked_until = None;
        self.prune(now);

        if self.timestamps.len() >= self.rule.max_requests as usize {
            let window_ms = self.window_ms();
            self.blocked_until = Some(now.saturating_add(window_ms));
            debug!(
                "Rate limit reached for '{}', blocking for {} ms",
                self.category, window_ms
            );
            return RateDecision::refused(window_ms);
        }

        RateDecision::admitted()
    }

    // == Record Request ==
    /// Records an attempt at the current time.
    pub fn record_request(&mut self) {
        let now = self.clock.now_ms();
        self.timestamps.push_back(now);
    }

    // == Check ==
    /// Like [`can_make_request`](Self::can_make_request), as a `Result`.
    pub fn check(&mut self) -> Result<()> {
        let decision = self.can_make_request();
        if decision.allowed {
            Ok(())
        } else {
            Err(Error::RateLimited {
                category: self.category.clone(),
                wait_ms: decision.wait_time_ms,
            })
        }
    }

    /// Checks and, when allowed, records the attempt.
    pub fn try_acquire(&mut self) -> Result<()> {
        self.check()?;
        self.record_request();
        Ok(())
    }

    // == Reset ==
    /// Forgets all attempts and any block.
    pub fn reset(&mut self) {
        self.timestamps.clear();
        self.blocked_until = None;
    }

    // == Remaining Requests ==
    /// Requests still admissible in the current window, 0 while blocked.
    pub fn remaining_requests(&mut self) -> u32 {
        let now = self.clock.now_ms();
        if self.block_remaining(now).is_some() {
            return 0;
        }
        self.prune(now);
        self.rule
            .max_requests
            .saturating_sub(self.timestamps.len() as u32)
    }

    // == Time Until Reset ==
    /// Milliseconds until the block ends or, when open, until the oldest
    /// recorded attempt leaves the window. 0 when nothing is recorded.
    pub fn time_until_reset(&mut self) -> u64 {
        let now = self.clock.now_ms();
        if let Some(wait) = self.block_remaining(now) {
            return wait;
        }
        self.prune(now);
        self.timestamps
            .front()
            .map(|oldest| oldest.saturating_add(self.window_ms()).saturating_sub(now))
            .unwrap_or(0)
    }

    // == Accessors ==
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn rule(&self) -> LimitRule {
        self.rule
    }

    pub fn max_requests(&self) -> u32 {
        self.rule.max_requests
    }

    pub fn window(&self) -> Duration {
        self.rule.window
    }

    /// Whether a block is in force right now.
    pub fn is_blocked(&self) -> bool {
        self.block_remaining(self.clock.now_ms()).is_some()
    }

    fn window_ms(&self) -> u64 {
        duration_ms(self.rule.window)
    }

    fn block_remaining(&self, now: u64) -> Option<u64> {
        self.blocked_until
            .filter(|until| now < *until)
            .map(|until| until - now)
    }

    fn prune(&mut self, now: u64) {
        let window_ms = self.window_ms();
        while let Some(&oldest) = self.timestamps.front() {
            if now.saturating_sub(oldest) >= window_ms {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }
    }
}
