//! Quota/window pairs.

use std::time::Duration;

use serde::Serialize;

use crate::clock::duration_ms;
use crate::error::{Error, Result};

/// How many requests a category may make per window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitRule {
    pub max_requests: u32,
    #[serde(rename = "windowMs", serialize_with = "serialize_ms")]
    pub window: Duration,
}

fn serialize_ms<S>(window: &Duration, s: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_u64(duration_ms(*window))
}

impl LimitRule {
    pub const fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }

    /// Sign-in and sign-up attempts: 5 per 15 minutes.
    pub const fn auth() -> Self {
        Self::new(5, Duration::from_secs(15 * 60))
    }

    /// Contact and enrollment form submissions: 3 per minute.
    pub const fn form() -> Self {
        Self::new(3, Duration::from_secs(60))
    }

    /// Question bank and course searches: 30 per minute.
    pub const fn search() -> Self {
        Self::new(30, Duration::from_secs(60))
    }

    /// Rejects a zero quota or a zero window.
    pub fn validate(&self) -> Result<()> {
        if self.max_requests == 0 {
            return Err(Error::InvalidConfig(
                "max_requests must be greater than zero".to_string(),
            ));
        }
        if self.window.is_zero() {
            return Err(Error::InvalidConfig(
                "window must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LimitRule {
    fn default() -> Self {
        Self::new(10, Duration::from_secs(60))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        let rules = [
            LimitRule::auth(),
            LimitRule::form(),
            LimitRule::search(),
            LimitRule::default(),
        ];
        for rule in rules {
            assert!(rule.validate().is_ok());
        }
    }

    #[test]
    fn test_zero_values_rejected() {
        assert!(LimitRule::new(0, Duration::from_secs(1)).validate().is_err());
        assert!(LimitRule::new(1, Duration::ZERO).validate().is_err());
    }

    #[test]
    fn test_huge_window_serializes_saturated() {
        let rule = LimitRule::new(1, Duration::from_secs(18_446_744_073_709_552));
        let json = serde_json::to_value(rule).unwrap();
        assert_eq!(json["windowMs"], u64::MAX);
    }

    #[test]
    fn test_serializes_window_in_ms() {
        let json = serde_json::to_value(LimitRule::form()).unwrap();
        assert_eq!(json["maxRequests"], 3);
        assert_eq!(json["windowMs"], 60_000);
    }
}
