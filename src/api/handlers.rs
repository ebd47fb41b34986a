//! API Handlers
//!
//! HTTP request handlers for the cache and rate limit endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::cache::{TieredCache, MAX_VALUE_SIZE};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::limiter::{RateDecision, RateLimiterRegistry};
use crate::models::{
    validate_category, validate_key, ClearResponse, DeleteResponse, ExistsResponse, GetResponse,
    HealthResponse, LimitStatusResponse, LimitsResponse, MessageResponse, SetRequest,
    SetResponse, StatsResponse,
};
use crate::storage::{FileStore, KeyValueStore};

/// Application state shared across all handlers.
///
/// This is the composition root: the cache and the limiter registry are
/// built once here and handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Cache of JSON values
    pub cache: Arc<RwLock<TieredCache<Value>>>,
    /// Rate limiters by category
    pub limiters: Arc<Mutex<RateLimiterRegistry>>,
}

impl AppState {
    /// Creates a new AppState from already-built components.
    pub fn new(cache: TieredCache<Value>, limiters: RateLimiterRegistry) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
            limiters: Arc::new(Mutex::new(limiters)),
        }
    }

    /// Creates a new AppState from configuration, on the system clock.
    ///
    /// A durable store that cannot be opened is logged and the cache runs
    /// memory-only.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let durable: Option<Arc<dyn KeyValueStore>> = if config.durable_mirror {
            match FileStore::open(&config.durable_store_path) {
                Ok(store) => {
                    info!("Durable store opened at {}", store.path().display());
                    Some(Arc::new(store))
                }
                Err(e) => {
                    warn!("Durable store unavailable, running memory-only: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let cache = TieredCache::new(config.cache_config(), clock.clone(), durable)?;
        let limiters =
            RateLimiterRegistry::new(clock, config.default_limit_rule())?.with_portal_presets()?;

        Ok(Self::new(cache, limiters))
    }
}

fn check_key(key: &str) -> Result<()> {
    match validate_key(key) {
        Some(msg) => Err(Error::InvalidRequest(msg)),
        None => Ok(()),
    }
}

fn check_category(name: &str) -> Result<()> {
    match validate_category(name) {
        Some(msg) => Err(Error::InvalidRequest(msg)),
        None => Ok(()),
    }
}

/// Handler for PUT /cache
///
/// Stores a JSON value with optional TTL in seconds.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(Error::InvalidRequest(error_msg));
    }

    let size = serde_json::to_vec(&req.value)?.len();
    if size > MAX_VALUE_SIZE {
        return Err(Error::InvalidRequest(format!(
            "Value exceeds maximum size of {} bytes",
            MAX_VALUE_SIZE
        )));
    }

    let mut cache = state.cache.write().await;
    match req.ttl {
        Some(ttl) => cache.set_with_ttl(req.key.clone(), req.value, Duration::from_secs(ttl)),
        None => cache.set(req.key.clone(), req.value),
    }

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /cache/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    check_key(&key)?;

    // Write lock: reads may purge or promote entries
    let mut cache = state.cache.write().await;
    match cache.get(&key) {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(Error::NotFound(key)),
    }
}

/// Handler for GET /cache/:key/exists
pub async fn exists_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ExistsResponse>> {
    check_key(&key)?;

    let mut cache = state.cache.write().await;
    let exists = cache.has(&key);

    Ok(Json(ExistsResponse { key, exists }))
}

/// Handler for DELETE /cache/:key
///
/// Idempotent: deleting a missing key succeeds.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    check_key(&key)?;

    let mut cache = state.cache.write().await;
    cache.delete(&key);

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    let mut cache = state.cache.write().await;
    let cleared_entries = cache.len();
    cache.clear();
    info!("Cache cleared ({} entries)", cleared_entries);

    Json(ClearResponse {
        message: "Cache cleared".to_string(),
        cleared_entries,
    })
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.read().await;
    Json(StatsResponse::from(cache.stats()))
}

/// Handler for GET /limits
pub async fn list_limits_handler(State(state): State<AppState>) -> Json<LimitsResponse> {
    let limiters = state.limiters.lock().await;
    Json(LimitsResponse {
        categories: limiters.names(),
    })
}

/// Handler for GET /limits/:name
///
/// Reports whether a request in this category may proceed now, without
/// recording one. Creates the limiter on first use.
pub async fn limit_status_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<LimitStatusResponse>> {
    check_category(&name)?;

    let mut limiters = state.limiters.lock().await;
    let limiter = limiters.get_limiter(&name, None, None)?;
    let decision = limiter.can_make_request();

    Ok(Json(LimitStatusResponse::new(limiter, decision)))
}

/// Handler for POST /limits/:name/attempt
///
/// Admits and records one request, or answers 429 with the wait time.
pub async fn attempt_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<LimitStatusResponse>> {
    check_category(&name)?;

    let mut limiters = state.limiters.lock().await;
    let limiter = limiters.get_limiter(&name, None, None)?;
    limiter.try_acquire()?;

    Ok(Json(LimitStatusResponse::new(limiter, RateDecision::admitted())))
}

/// Handler for POST /limits/:name/reset
pub async fn reset_limit_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>> {
    check_category(&name)?;

    let mut limiters = state.limiters.lock().await;
    let limiter = limiters
        .get(&name)
        .ok_or_else(|| Error::NotFound(format!("rate limiter '{}'", name)))?;
    limiter.reset();

    Ok(Json(MessageResponse::new(format!(
        "Rate limiter '{}' reset",
        name
    ))))
}

/// Handler for DELETE /limits/:name
pub async fn remove_limit_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>> {
    check_category(&name)?;

    let mut limiters = state.limiters.lock().await;
    if !limiters.remove_limiter(&name) {
        return Err(Error::NotFound(format!("rate limiter '{}'", name)));
    }

    Ok(Json(MessageResponse::new(format!(
        "Rate limiter '{}' removed",
        name
    ))))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
