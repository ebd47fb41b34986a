//! API Routes
//!
//! Configures the Axum router with all portal guard endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    attempt_handler, clear_handler, delete_handler, exists_handler, get_handler, health_handler,
    limit_status_handler, list_limits_handler, remove_limit_handler, reset_limit_handler,
    set_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/cache", put(set_handler).delete(clear_handler))
        .route("/cache/stats", get(stats_handler))
        .route("/cache/:key", get(get_handler).delete(delete_handler))
        .route("/cache/:key/exists", get(exists_handler))
        .route("/limits", get(list_limits_handler))
        .route(
            "/limits/:name",
            get(limit_status_handler).delete(remove_limit_handler),
        )
        .route("/limits/:name/attempt", post(attempt_handler))
        .route("/limits/:name/reset", post(reset_limit_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
