//! Rate Limiter Registry Module
//!
//! One limiter per category name, shared by every caller using that name.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::clock::Clock;
use crate::error::Result;
use crate::limiter::{LimitRule, RateLimiter};

// == Rate Limiter Registry ==
/// Lazily creates limiters by category name.
///
/// The first lookup of a name fixes its rule; quota and window arguments
/// passed on later lookups are ignored. Rules are picked in this order:
/// explicit arguments, then a registered preset, then the registry default.
pub struct RateLimiterRegistry {
    limiters: HashMap<String, RateLimiter>,
    presets: HashMap<String, LimitRule>,
    defaults: LimitRule,
    clock: Arc<dyn Clock>,
}

impl fmt::Debug for RateLimiterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiterRegistry")
            .field("limiters", &self.limiters)
            .field("presets", &self.presets)
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl RateLimiterRegistry {
    // == Constructor ==
    /// Creates an empty registry.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`](crate::error::Error::InvalidConfig)
    /// if `defaults` has a zero quota or window.
    pub fn new(clock: Arc<dyn Clock>, defaults: LimitRule) -> Result<Self> {
        defaults.validate()?;

        Ok(Self {
            limiters: HashMap::new(),
            presets: HashMap::new(),
            defaults,
            clock,
        })
    }

    /// Registers the rule used for `name` when no explicit one is given.
    pub fn with_preset(mut self, name: impl Into<String>, rule: LimitRule) -> Result<Self> {
        rule.validate()?;
        self.presets.insert(name.into(), rule);
        Ok(self)
    }

    /// Registers the `auth`, `form` and `search` presets.
    pub fn with_portal_presets(self) -> Result<Self> {
        self.with_preset("auth", LimitRule::auth())?
            .with_preset("form", LimitRule::form())?
            .with_preset("search", LimitRule::search())
    }

    // == Get Limiter ==
    /// Returns the limiter for `name`, creating it on first use.
    ///
    /// # Errors
    /// Only on creation, when the resulting rule is invalid.
    pub fn get_limiter(
        &mut self,
        name: &str,
        max_requests: Option<u32>,
        window: Option<Duration>,
    ) -> Result<&mut RateLimiter> {
        match self.limiters.entry(name.to_string()) {
            Entry::Occupied(existing) => Ok(existing.into_mut()),
            Entry::Vacant(slot) => {
                let base = self.presets.get(name).copied().unwrap_or(self.defaults);
                let rule = LimitRule::new(
                    max_requests.unwrap_or(base.max_requests),
                    window.unwrap_or(base.window),
                );

                let limiter = RateLimiter::from_rule(name, rule, self.clock.clone())?;
                debug!(
                    "Created rate limiter '{}' ({} per {:?})",
                    name, rule.max_requests, rule.window
                );
                Ok(slot.insert(limiter))
            }
        }
    }

    /// Returns the limiter for `name` if it already exists.
    pub fn get(&mut self, name: &str) -> Option<&mut RateLimiter> {
        self.limiters.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.limiters.contains_key(name)
    }

    // == Teardown ==
    /// Drops the limiter for `name`. Returns false if there was none.
    pub fn remove_limiter(&mut self, name: &str) -> bool {
        self.limiters.remove(name).is_some()
    }

    /// Drops every limiter. Presets are kept.
    pub fn clear_all(&mut self) {
        self.limiters.clear();
    }

    // == Introspection ==
    /// Names of existing limiters, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.limiters.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.limiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limiters.is_empty()
    }

    pub fn defaults(&self) -> LimitRule {
        self.defaults
    }
}
