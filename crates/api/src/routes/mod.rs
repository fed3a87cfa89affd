//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness check
//! GET  /health/ready                   - Readiness check (database)
//!
//! # Auth
//! GET  /api/auth/health                - API status
//! POST /api/auth/register              - Create account (rate limited)
//! POST /api/auth/login                 - Issue token (rate limited)
//! PUT  /api/auth/password              - Change password (auth)
//!
//! # Users (auth)
//! GET  /api/users/profile              - Caller's profile
//!
//! # Stores (auth)
//! GET  /api/stores                     - Browse stores with the caller's rating
//! POST /api/stores                     - Create store (store owner)
//! GET  /api/stores/{id}                - Store detail
//!
//! # Ratings (auth)
//! POST /api/ratings                    - Submit or replace a rating
//! GET  /api/ratings/store/{storeId}    - Caller's rating for a store
//!
//! # Store owner (store_owner)
//! GET  /api/store-owner/dashboard      - Store summary and distribution
//! GET  /api/store-owner/ratings        - Paginated ratings
//!
//! # Admin (admin)
//! GET  /api/admin/dashboard            - Platform totals and recent activity
//! GET  /api/admin/users                - Paginated users
//! POST /api/admin/users                - Create user
//! GET  /api/admin/users/{userId}       - User detail
//! PUT  /api/admin/users/{userId}/role  - Change role
//! GET  /api/admin/stores               - Paginated stores
//! POST /api/admin/stores               - Create store for an owner
//! ```

pub mod admin;
pub mod auth;
pub mod health;
pub mod ratings;
pub mod store_owner;
pub mod stores;
pub mod users;

use axum::{
    Json, Router,
    extract::OriginalUri,
    http::{HeaderValue, Method, StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::config::ApiConfig;
use crate::middleware::{auth_rate_limiter, request_id_middleware};
use crate::state::AppState;

/// Endpoints listed in the `/api` 404 body.
const AVAILABLE_ENDPOINTS: &[&str] = &[
    "GET /api/auth/health",
    "POST /api/auth/register",
    "POST /api/auth/login",
    "PUT /api/auth/password",
    "GET /api/users/profile",
    "GET /api/stores",
    "POST /api/stores",
    "GET /api/stores/:id",
    "POST /api/ratings",
    "GET /api/ratings/store/:storeId",
    "GET /api/store-owner/dashboard",
    "GET /api/store-owner/ratings",
    "GET /api/admin/dashboard",
    "GET /api/admin/users",
    "POST /api/admin/users",
    "GET /api/admin/users/:userId",
    "PUT /api/admin/users/:userId/role",
    "GET /api/admin/stores",
    "POST /api/admin/stores",
];

/// Create the auth routes router.
///
/// Registration and login sit behind the per-IP limiter when `rate_limited`.
pub fn auth_routes(rate_limited: bool, trust_proxy_headers: bool) -> Router<AppState> {
    let credentials = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));
    let credentials = if rate_limited {
        credentials.layer(auth_rate_limiter(trust_proxy_headers))
    } else {
        credentials
    };

    Router::new()
        .route("/health", get(health::api_health))
        .route("/password", put(auth::change_password))
        .merge(credentials)
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/profile", get(users::profile))
}

/// Create the store routes router.
pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(stores::index).post(stores::create))
        .route("/{id}", get(stores::show))
}

/// Create the rating routes router.
pub fn rating_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(ratings::submit))
        .route("/store/{store_id}", get(ratings::mine))
}

/// Create the store owner routes router.
pub fn store_owner_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(store_owner::dashboard))
        .route("/ratings", get(store_owner::ratings))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route("/users/{user_id}", get(admin::show_user))
        .route("/users/{user_id}/role", put(admin::update_role))
        .route("/stores", get(admin::list_stores).post(admin::create_store))
}

/// Create all `/api` routes.
pub fn api_routes(config: &ApiConfig) -> Router<AppState> {
    Router::new()
        .nest(
            "/auth",
            auth_routes(config.rate_limit_enabled, config.trust_proxy_headers),
        )
        .nest("/users", user_routes())
        .nest("/stores", store_routes())
        .nest("/ratings", rating_routes())
        .nest("/store-owner", store_owner_routes())
        .nest("/admin", admin_routes())
        .fallback(api_not_found)
}

/// Build the complete application with its middleware stack.
///
/// Sentry layers are added by the binary so tests can drive this router
/// without a Sentry client.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(state.config());

    Router::new()
        .route("/health", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api_routes(state.config()))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record("latency_ms", latency.as_millis() as u64);
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .layer(cors)
        .with_state(state)
}

/// CORS for the configured frontend origins.
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// 404 for unknown `/api` paths, listing what does exist.
async fn api_not_found(OriginalUri(uri): OriginalUri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "API endpoint not found",
            "requestedPath": uri.path(),
            "availableEndpoints": AVAILABLE_ENDPOINTS,
        })),
    )
}
