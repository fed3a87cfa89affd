//! Health check endpoints.

use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

/// Body of `GET /api/auth/health`.
#[derive(Debug, Serialize)]
pub struct ApiHealth {
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
    pub environment: String,
}

/// API status for frontends and uptime checks.
pub async fn api_health(State(state): State<AppState>) -> Json<ApiHealth> {
    Json(ApiHealth {
        status: "OK",
        message: "Backend is running",
        timestamp: Utc::now(),
        environment: state.config().environment.clone(),
    })
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn liveness() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
