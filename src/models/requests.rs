//! Request DTOs for the portal guard API
//!
//! Defines the structure of incoming HTTP request bodies and the input
//! checks applied to keys and category names.

use serde::Deserialize;
use serde_json::Value;

use crate::cache::MAX_KEY_LENGTH;

/// Maximum length of a rate limit category name
pub const MAX_CATEGORY_LENGTH: usize = 64;

/// Request body for the SET operation (PUT /cache)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Any JSON value
/// - `ttl`: Optional TTL in seconds (uses default if not specified)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: Value,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
    }
}

/// Checks a cache key: non-empty, at most 256 bytes, no control characters.
pub fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    if key.chars().any(char::is_control) {
        return Some("Key cannot contain control characters".to_string());
    }
    None
}

/// Checks a category name: 1 to 64 ASCII letters, digits, `_` or `-`.
pub fn validate_category(name: &str) -> Option<String> {
    if name.is_empty() || name.len() > MAX_CATEGORY_LENGTH {
        return Some(format!(
            "Category must be between 1 and {} characters",
            MAX_CATEGORY_LENGTH
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Some("Category may only contain letters, digits, '_' and '-'".to_string());
    }
    None
}
