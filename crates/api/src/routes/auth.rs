//! Authentication route handlers.
//!
//! Registration, password login and password changes. Successful
//! registration and login both return a bearer token.

use axum::{extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use ratestore_core::validation::{
    validate_address, validate_email, validate_password, validate_self_role,
    validate_store_address, validate_store_email, validate_store_name, validate_user_name,
};
use ratestore_core::{Role, ValidationErrors};

use crate::error::Result;
use crate::extract::ApiJson;
use crate::middleware::RequireAuth;
use crate::models::{NewStore, Store, User};
use crate::services::auth::{AuthService, Registration};
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Registration request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: Option<String>,
    pub role: Option<String>,
    pub store_name: Option<String>,
    pub store_email: Option<String>,
    pub store_address: Option<String>,
}

/// Login request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Password change request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// =============================================================================
// Response Types
// =============================================================================

/// Body returned by registration and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub user: User,
    pub token: String,
    /// Present when the store was created together with the account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<Store>,
}

/// Body carrying only a confirmation message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

// =============================================================================
// Validation
// =============================================================================

impl RegisterRequest {
    /// Validate every field and collect all failures.
    ///
    /// A store is only created for `store_owner` registrations that supply
    /// all three store fields.
    fn validate(self) -> std::result::Result<Registration, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = errors.check("name", validate_user_name(&self.name));
        let email = errors.check("email", validate_email(&self.email));
        errors.check("password", validate_password(&self.password));
        let address = errors.check("address", validate_address(self.address.as_deref()));
        let role = errors.check("role", validate_self_role(self.role.as_deref()));

        let store = match (role, &self.store_name, &self.store_email, &self.store_address) {
            (Some(Role::StoreOwner), Some(store_name), Some(store_email), Some(store_address)) => {
                let name = errors.check("storeName", validate_store_name(store_name));
                let email = errors.check("storeEmail", validate_store_email(store_email));
                let address = errors.check("storeAddress", validate_store_address(store_address));
                match (name, email, address) {
                    (Some(name), Some(email), Some(address)) => Some(NewStore {
                        name,
                        email,
                        address,
                    }),
                    _ => None,
                }
            }
            _ => None,
        };

        match (name, email, address, role) {
            (Some(name), Some(email), Some(address), Some(role)) if errors.is_empty() => {
                Ok(Registration {
                    name,
                    email,
                    password: self.password,
                    address,
                    role,
                    store,
                })
            }
            _ => Err(errors),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Create an account and return a token for it.
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, ApiJson<AuthResponse>)> {
    let registration = body.validate()?;

    let (user, store) = AuthService::new(state.pool(), state.config().bcrypt_cost)
        .register(registration)
        .await?;
    let token = state.jwt().issue(user.id)?;

    Ok((
        StatusCode::CREATED,
        ApiJson(AuthResponse {
            message: "User registered successfully",
            user,
            token,
            store,
        }),
    ))
}

/// Exchange email and password for a token.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<ApiJson<AuthResponse>> {
    let mut errors = ValidationErrors::default();
    errors.check("email", validate_email(&body.email));
    if body.password.is_empty() {
        errors.push("password", "Password is required");
    }
    errors.finish()?;

    let user = AuthService::new(state.pool(), state.config().bcrypt_cost)
        .login(&body.email, &body.password)
        .await?;
    let token = state.jwt().issue(user.id)?;

    tracing::info!(user_id = %user.id, "login succeeded");

    Ok(ApiJson(AuthResponse {
        message: "Login successful",
        user,
        token,
        store: None,
    }))
}

/// Change the caller's password.
pub async fn change_password(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    ApiJson(body): ApiJson<ChangePasswordRequest>,
) -> Result<ApiJson<MessageResponse>> {
    let mut errors = ValidationErrors::default();
    if body.current_password.is_empty() {
        errors.push("currentPassword", "Current password is required");
    }
    errors.check("newPassword", validate_password(&body.new_password));
    errors.finish()?;

    AuthService::new(state.pool(), state.config().bcrypt_cost)
        .change_password(caller.id, &body.current_password, body.new_password)
        .await?;

    Ok(ApiJson(MessageResponse {
        message: "Password updated successfully",
    }))
}
