//! Integration test helpers for RateStore.
//!
//! # Running Tests
//!
//! ```bash
//! # In-process router tests (no database needed)
//! cargo test -p ratestore-integration-tests
//!
//! # End-to-end tests against a running server and migrated database
//! ratestore-cli migrate
//! ratestore-cli admin create -n "Integration Admin" -e "$RATESTORE_ADMIN_EMAIL" -p "$RATESTORE_ADMIN_PASSWORD"
//! cargo run -p ratestore-api &
//! cargo test -p ratestore-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `RATESTORE_API_URL` - Base URL of the running server (default: `http://localhost:5000`)
//! - `RATESTORE_ADMIN_EMAIL` / `RATESTORE_ADMIN_PASSWORD` - Existing administrator login

use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::Request;
use reqwest::{Client, StatusCode};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use ratestore_api::config::ApiConfig;
use ratestore_api::state::AppState;

/// Signing secret used by in-process apps.
pub const TEST_JWT_SECRET: &str = "Qm7#vT2$kW9!pL4^zR8&nB3*xD6@hF1%";

/// Password that satisfies the registration rules.
pub const TEST_PASSWORD: &str = "Passw0rd!";

// =============================================================================
// In-process app
// =============================================================================

/// Configuration for in-process tests. Rate limiting is off because oneshot
/// requests carry no peer address.
#[must_use]
pub fn test_config() -> ApiConfig {
    ApiConfig {
        database_url: SecretString::from("postgres://ratestore@127.0.0.1:1/ratestore_test"),
        host: std::net::IpAddr::from([127, 0, 0, 1]),
        port: 0,
        jwt_secret: SecretString::from(TEST_JWT_SECRET),
        jwt_expiry_hours: 24,
        bcrypt_cost: 4,
        cors_allowed_origins: vec!["http://localhost:3000".to_string()],
        environment: "test".to_string(),
        rate_limit_enabled: false,
        trust_proxy_headers: false,
        log_json: false,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// The full router over a pool that never connects.
///
/// Anything that touches the database fails with 500 or 503, so only use
/// this for requests rejected before the first query.
///
/// # Panics
///
/// Panics if the lazy pool URL does not parse.
#[must_use]
pub fn lazy_app() -> Router {
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy("postgres://ratestore@127.0.0.1:1/ratestore_test")
        .expect("lazy pool URL is valid");
    ratestore_api::routes::app(AppState::new(test_config(), pool))
}

/// Send one request through `app` and decode the JSON body (`Null` if not JSON).
///
/// # Panics
///
/// Panics if the router fails or the body cannot be read.
pub async fn oneshot(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("router is infallible");
    let status = StatusCode::from_u16(response.status().as_u16()).expect("valid status");
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

// =============================================================================
// Running server
// =============================================================================

/// Base URL for the running API (configurable via environment).
#[must_use]
pub fn api_base_url() -> String {
    std::env::var("RATESTORE_API_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// An email no other test run has used.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", uuid::Uuid::new_v4().simple())
}

/// A registered account and its token.
#[derive(Debug, Clone)]
pub struct TestAccount {
    pub id: i64,
    pub email: String,
    pub token: String,
}

/// Register an account with `extra` fields merged over a valid base body.
///
/// # Panics
///
/// Panics if the request fails or registration is rejected.
pub async fn register(client: &Client, prefix: &str, extra: Value) -> TestAccount {
    let email = unique_email(prefix);
    let mut body = json!({
        "name": "Integration Tester",
        "email": email,
        "password": TEST_PASSWORD,
        "address": "1 Test Lane",
    });
    if let (Some(base), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
        base.extend(extra.clone());
    }

    let resp = client
        .post(format!("{}/api/auth/register", api_base_url()))
        .json(&body)
        .send()
        .await
        .expect("Failed to register");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("Failed to read response");
    TestAccount {
        id: body["user"]["id"].as_i64().expect("user id"),
        email,
        token: body["token"].as_str().expect("token").to_string(),
    }
}

/// Log in as the administrator named by the environment.
///
/// # Panics
///
/// Panics if the admin variables are unset or the login fails.
pub async fn admin_token(client: &Client) -> String {
    let email = std::env::var("RATESTORE_ADMIN_EMAIL").expect("RATESTORE_ADMIN_EMAIL is set");
    let password =
        std::env::var("RATESTORE_ADMIN_PASSWORD").expect("RATESTORE_ADMIN_PASSWORD is set");

    let resp = client
        .post(format!("{}/api/auth/login", api_base_url()))
        .json(&json!({"email": email, "password": password}))
        .send()
        .await
        .expect("Failed to log in");
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.expect("Failed to read response");
    body["token"].as_str().expect("token").to_string()
}
