//! Bearer token authentication extractors.
//!
//! The token only proves who the caller is. The user row (and therefore the
//! role) is reloaded on every request, so a role change or deletion takes
//! effect on the caller's next request.

use axum::{
    Json,
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use ratestore_core::Role;

use crate::db::{RepositoryError, UserRepository};
use crate::error::{AppError, set_sentry_user};
use crate::models::UserIdentity;
use crate::state::AppState;

/// Extractor that requires a valid bearer token for an existing user.
///
/// # Example
///
/// ```rust,ignore
/// async fn profile(RequireAuth(user): RequireAuth) -> String {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireAuth(pub UserIdentity);

/// Extractor that additionally requires the `admin` role.
pub struct RequireAdmin(pub UserIdentity);

/// Extractor that additionally requires the `store_owner` role.
pub struct RequireStoreOwner(pub UserIdentity);

/// Error returned when a request fails authentication or authorization.
#[derive(Debug)]
pub enum AuthRejection {
    /// No `Authorization: Bearer` header.
    MissingToken,
    /// Bad signature, malformed or expired token.
    InvalidToken,
    /// Valid token for a user that no longer exists.
    UnknownUser,
    /// Authenticated, but the role does not allow this endpoint.
    InsufficientPermissions,
    /// The user lookup failed.
    Database(RepositoryError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingToken => (StatusCode::UNAUTHORIZED, "Access token required"),
            Self::InvalidToken => (StatusCode::FORBIDDEN, "Invalid or expired token"),
            Self::UnknownUser => (StatusCode::FORBIDDEN, "Invalid token"),
            Self::InsufficientPermissions => (StatusCode::FORBIDDEN, "Insufficient permissions"),
            Self::Database(err) => return AppError::Database(err).into_response(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Pull the token out of `Authorization: Bearer <token>`.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(AuthRejection::MissingToken)?;
        let state = AppState::from_ref(state);

        let claims = state.jwt().verify(token).map_err(|e| {
            tracing::debug!(error = %e, "rejected access token");
            AuthRejection::InvalidToken
        })?;

        let user = UserRepository::new(state.pool())
            .get_identity(claims.user_id)
            .await
            .map_err(AuthRejection::Database)?
            .ok_or(AuthRejection::UnknownUser)?;

        set_sentry_user(&user.id, Some(user.email.as_str()));

        Ok(Self(user))
    }
}

/// Load the caller and check their role.
async fn require_role<S>(
    parts: &mut Parts,
    state: &S,
    role: Role,
) -> Result<UserIdentity, AuthRejection>
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
    if user.role != role {
        tracing::info!(user_id = %user.id, role = %user.role, required = %role, "permission denied");
        return Err(AuthRejection::InsufficientPermissions);
    }
    Ok(user)
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::Admin).await.map(Self)
    }
}

impl<S> FromRequestParts<S> for RequireStoreOwner
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::StoreOwner).await.map(Self)
    }
}
