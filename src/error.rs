//! Error types for the portal guard
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::storage::StorageError;

// == Error Enum ==
/// Unified error type for the cache, the rate limiters and the HTTP layer.
///
/// Misses, expiry and durable-store failures are not errors in the core
/// API; they only show up here when a caller asks for them explicitly.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration rejected at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Key or limiter not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Quota for a category is used up
    #[error("Rate limit exceeded for '{category}', retry in {wait_ms} ms")]
    RateLimited { category: String, wait_ms: u64 },

    /// Durable store failure surfaced to a caller that asked for it
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::InvalidConfig(_) | Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Error::Storage(_) | Error::Serialization(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = match &self {
            Error::RateLimited { wait_ms, .. } => json!({
                "error": self.to_string(),
                "wait_time_ms": wait_ms,
            }),
            _ => json!({ "error": self.to_string() }),
        };

        let mut response = (status, Json(body)).into_response();

        if let Error::RateLimited { wait_ms, .. } = &self {
            let secs = wait_ms.div_ceil(1000);
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        response
    }
}

// == Result Type Alias ==
/// Convenience Result type for the portal guard.
pub type Result<T> = std::result::Result<T, Error>;
