//! API Module
//!
//! HTTP handlers and routing for the portal guard REST API.
//!
//! # Endpoints
//! - `PUT /cache` - Store a JSON value
//! - `DELETE /cache` - Clear the cache
//! - `GET /cache/stats` - Cache statistics
//! - `GET /cache/:key` - Retrieve a value by key
//! - `DELETE /cache/:key` - Delete a key
//! - `GET /cache/:key/exists` - Check a key
//! - `GET /limits` - List live rate limit categories
//! - `GET /limits/:name` - Admission check for a category
//! - `DELETE /limits/:name` - Drop a category's limiter
//! - `POST /limits/:name/attempt` - Admit and record one request
//! - `POST /limits/:name/reset` - Reset a category's limiter
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
