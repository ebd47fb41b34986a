//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use portal_guard::{
    api::create_router, AppState, CacheConfig, Clock, LimitRule, ManualClock,
    RateLimiterRegistry, TieredCache,
};
use serde_json::Value;
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_state(clock: &ManualClock) -> AppState {
    let clock: Arc<dyn Clock> = Arc::new(clock.clone());
    let cache = TieredCache::new(
        CacheConfig::default()
            .with_max_entries(2)
            .with_durable_mirror(false),
        clock.clone(),
        None,
    )
    .unwrap();
    let limiters = RateLimiterRegistry::new(clock, LimitRule::default())
        .unwrap()
        .with_portal_presets()
        .unwrap();
    AppState::new(cache, limiters)
}

fn create_test_app() -> (Router, ManualClock) {
    let clock = ManualClock::new(1_700_000_000_000);
    (create_router(create_test_state(&clock)), clock)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

async fn body_to_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// == Cache Endpoint Tests ==

#[tokio::test]
async fn test_set_endpoint_success() {
    let (app, _) = create_test_app();

    let response = send(
        &app,
        "PUT",
        "/cache",
        Some(r#"{"key":"courses","value":[{"id":1,"name":"SAT Prep"}]}"#),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response).await;
    assert!(json["message"].as_str().unwrap().contains("courses"));
}

#[tokio::test]
async fn test_set_then_get_returns_json_value() {
    let (app, _) = create_test_app();

    send(
        &app,
        "PUT",
        "/cache",
        Some(r#"{"key":"profile","value":{"name":"Amal","plan":"premium"}}"#),
    )
    .await;

    let response = send(&app, "GET", "/cache/profile", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response).await;
    assert_eq!(json["key"], "profile");
    assert_eq!(json["value"]["plan"], "premium");
}

#[tokio::test]
async fn test_set_empty_key_rejected() {
    let (app, _) = create_test_app();

    let response = send(&app, "PUT", "/cache", Some(r#"{"key":"","value":1}"#)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn test_set_malformed_json_rejected() {
    let (app, _) = create_test_app();

    let response = send(&app, "PUT", "/cache", Some(r#"{"key":"#)).await;

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_ttl_expiry_over_http() {
    let (app, clock) = create_test_app();

    send(
        &app,
        "PUT",
        "/cache",
        Some(r#"{"key":"session","value":"abc","ttl":5}"#),
    )
    .await;

    clock.advance_ms(4_999);
    let response = send(&app, "GET", "/cache/session", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    clock.advance_ms(1);
    let response = send(&app, "GET", "/cache/session", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_huge_ttl_over_http_does_not_expire_early() {
    let (app, clock) = create_test_app();

    let response = send(
        &app,
        "PUT",
        "/cache",
        Some(r#"{"key":"forever","value":"x","ttl":18446744073709552}"#),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    clock.advance_ms(1_000);
    let response = send(&app, "GET", "/cache/forever", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_eviction_over_http() {
    let (app, clock) = create_test_app();

    for (key, value) in [("a", "1"), ("b", "2"), ("c", "3")] {
        let body = format!(r#"{{"key":"{}","value":{}}}"#, key, value);
        send(&app, "PUT", "/cache", Some(&body)).await;
        clock.advance_ms(1);
    }

    let exists = |key: &'static str| {
        let app = app.clone();
        async move {
            let response = send(&app, "GET", &format!("/cache/{}/exists", key), None).await;
            body_to_json(response).await["exists"].as_bool().unwrap()
        }
    };

    assert!(!exists("a").await);
    assert!(exists("b").await);
    assert!(exists("c").await);

    let stats = body_to_json(send(&app, "GET", "/cache/stats", None).await).await;
    assert_eq!(stats["total_entries"], 2);
    assert_eq!(stats["max_entries"], 2);
    assert_eq!(stats["evictions"], 1);
    assert_eq!(stats["keys"], serde_json::json!(["b", "c"]));
}

#[tokio::test]
async fn test_delete_endpoint() {
    let (app, _) = create_test_app();

    send(&app, "PUT", "/cache", Some(r#"{"key":"gone","value":true}"#)).await;

    let response = send(&app, "DELETE", "/cache/gone", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "GET", "/cache/gone", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Deleting again is fine
    let response = send(&app, "DELETE", "/cache/gone", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_clear_endpoint() {
    let (app, _) = create_test_app();

    send(&app, "PUT", "/cache", Some(r#"{"key":"x","value":1}"#)).await;
    send(&app, "PUT", "/cache", Some(r#"{"key":"y","value":2}"#)).await;

    let response = send(&app, "DELETE", "/cache", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response).await["cleared_entries"], 2);

    let stats = body_to_json(send(&app, "GET", "/cache/stats", None).await).await;
    assert_eq!(stats["total_entries"], 0);
}

#[tokio::test]
async fn test_stats_hit_rate() {
    let (app, _) = create_test_app();

    send(&app, "PUT", "/cache", Some(r#"{"key":"k","value":1}"#)).await;
    send(&app, "GET", "/cache/k", None).await;
    send(&app, "GET", "/cache/missing", None).await;

    let stats = body_to_json(send(&app, "GET", "/cache/stats", None).await).await;
    assert_eq!(stats["hits"], 1);
    assert_eq!(stats["misses"], 1);
    assert_eq!(stats["hit_rate"], 0.5);
}

// == Rate Limit Endpoint Tests ==

#[tokio::test]
async fn test_limit_status_does_not_consume_quota() {
    let (app, _) = create_test_app();

    for _ in 0..5 {
        let response = send(&app, "GET", "/limits/auth", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_to_json(response).await;
        assert_eq!(json["allowed"], true);
        assert_eq!(json["remaining_requests"], 5);
    }
}

#[tokio::test]
async fn test_attempts_until_too_many_requests() {
    let (app, clock) = create_test_app();

    for _ in 0..3 {
        let response = send(&app, "POST", "/limits/form/attempt", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = send(&app, "POST", "/limits/form/attempt", None).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()[header::RETRY_AFTER], "60");
    let json = body_to_json(response).await;
    assert_eq!(json["wait_time_ms"], 60_000);

    // Still blocked part-way through, with a shorter wait
    clock.advance_ms(20_000);
    let json = body_to_json(send(&app, "GET", "/limits/form", None).await).await;
    assert_eq!(json["allowed"], false);
    assert_eq!(json["wait_time_ms"], 40_000);
    assert!(json["message"].as_str().unwrap().contains("40 seconds"));

    clock.advance_ms(40_000);
    let response = send(&app, "POST", "/limits/form/attempt", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_reset_endpoint_reopens_category() {
    let (app, _) = create_test_app();

    for _ in 0..4 {
        send(&app, "POST", "/limits/form/attempt", None).await;
    }

    let response = send(&app, "POST", "/limits/form/reset", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "POST", "/limits/form/attempt", None).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_list_and_remove_limiters() {
    let (app, _) = create_test_app();

    send(&app, "GET", "/limits/search", None).await;
    send(&app, "GET", "/limits/auth", None).await;

    let json = body_to_json(send(&app, "GET", "/limits", None).await).await;
    assert_eq!(json["categories"], serde_json::json!(["auth", "search"]));

    let response = send(&app, "DELETE", "/limits/auth", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "DELETE", "/limits/auth", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_category_rejected() {
    let (app, _) = create_test_app();

    let response = send(&app, "GET", "/limits/no%20spaces", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = create_test_app();

    let response = send(&app, "GET", "/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}

#[tokio::test]
async fn test_unknown_route() {
    let (app, _) = create_test_app();

    let response = send(&app, "GET", "/nope", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
