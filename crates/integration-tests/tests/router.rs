//! In-process router tests.
//!
//! These drive the full middleware stack with `tower::ServiceExt::oneshot`
//! and need no database: every request here is answered or rejected before
//! the first query.

use axum::body::Body;
use axum::http::{Method, Request, header};
use chrono::Duration;
use reqwest::StatusCode;
use secrecy::SecretString;
use serde_json::json;

use ratestore_api::services::auth::JwtKeys;
use ratestore_core::UserId;
use ratestore_integration_tests::{TEST_JWT_SECRET, lazy_app, oneshot};

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("valid request")
}

fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

// ============================================================================
// Health & Fallback
// ============================================================================

#[tokio::test]
async fn test_api_health() {
    let (status, body) = oneshot(lazy_app(), get("/api/auth/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["environment"], "test");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    use tower::ServiceExt;

    let response = lazy_app()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "trace-abc")
                .body(Body::empty())
                .expect("valid request"),
        )
        .await
        .expect("router is infallible");

    assert_eq!(
        response.headers().get("x-request-id").map(|v| v.as_bytes()),
        Some(&b"trace-abc"[..])
    );
}

#[tokio::test]
async fn test_unknown_endpoint_lists_available() {
    let (status, body) = oneshot(lazy_app(), get("/api/reviews")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "API endpoint not found");
    assert_eq!(body["requestedPath"], "/api/reviews");
    let endpoints = body["availableEndpoints"]
        .as_array()
        .expect("endpoint list");
    assert!(endpoints.iter().any(|e| e == "POST /api/auth/login"));
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_every_protected_route_requires_token() {
    for uri in [
        "/api/users/profile",
        "/api/stores",
        "/api/stores/1",
        "/api/ratings/store/1",
        "/api/store-owner/dashboard",
        "/api/store-owner/ratings",
        "/api/admin/dashboard",
        "/api/admin/users",
        "/api/admin/stores",
    ] {
        let (status, body) = oneshot(lazy_app(), get(uri)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["error"], "Access token required", "{uri}");
    }
}

#[tokio::test]
async fn test_non_bearer_scheme_rejected() {
    let request = Request::builder()
        .uri("/api/users/profile")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .expect("valid request");

    let (status, _) = oneshot(lazy_app(), request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_signed_with_other_secret_rejected() {
    let keys = JwtKeys::new(
        &SecretString::from("Zz9@Yy8#Xx7$Ww6%Vv5^Uu4&Tt3*Ss2!"),
        Duration::hours(1),
    );
    let token = keys.issue(UserId::new(1)).expect("token");

    let (status, body) = oneshot(lazy_app(), get_with_token("/api/users/profile", &token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let keys = JwtKeys::new(&SecretString::from(TEST_JWT_SECRET), Duration::hours(-2));
    let token = keys.issue(UserId::new(1)).expect("token");

    let (status, body) = oneshot(lazy_app(), get_with_token("/api/stores", &token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Invalid or expired token");
}

// ============================================================================
// Request validation
// ============================================================================

#[tokio::test]
async fn test_register_reports_each_invalid_field() {
    let (status, body) = oneshot(
        lazy_app(),
        post_json(
            "/api/auth/register",
            &json!({
                "name": "Al",
                "email": "al@",
                "password": "password",
                "role": "admin"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .expect("errors array")
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert_eq!(fields, vec!["name", "email", "password", "role"]);
}

#[tokio::test]
async fn test_login_requires_email_and_password() {
    let (status, body) = oneshot(lazy_app(), post_json("/api/auth/login", &json!({}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/register")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\":"))
        .expect("valid request");

    let (status, body) = oneshot(lazy_app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid JSON body");
}
