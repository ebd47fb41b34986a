//! Request and Response models for the portal guard API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{validate_category, validate_key, SetRequest};
pub use responses::{
    ClearResponse, DeleteResponse, ExistsResponse, GetResponse, HealthResponse,
    LimitStatusResponse, LimitsResponse, MessageResponse, SetResponse, StatsResponse,
};
