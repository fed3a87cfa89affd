//! User profile route handlers.

use axum::extract::State;
use serde::Serialize;

use crate::db::UserRepository;
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::models::User;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user: User,
}

/// The caller's full profile.
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
) -> Result<ApiJson<ProfileResponse>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(caller.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(ApiJson(ProfileResponse { user }))
}
