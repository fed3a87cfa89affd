//! User account commands.
//!
//! # Usage
//!
//! ```bash
//! ratestore-cli user set-role -e owner@example.com -r store_owner
//! ```

use ratestore_api::db::{RepositoryError, UserRepository};
use ratestore_core::validation::validate_email;
use ratestore_core::Role;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

/// Errors that can occur during user operations.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid role: {0}. Valid roles: admin, user, store_owner")]
    InvalidRole(String),

    #[error("No user with email: {0}")]
    NotFound(String),

    #[error("{0}")]
    Repository(#[from] RepositoryError),
}

/// Change the role of the user with `email`.
///
/// # Errors
///
/// Returns `UserError` if the email or role is invalid, no such user exists,
/// or the database is unreachable.
pub async fn set_role(email: &str, role: &str) -> Result<(), UserError> {
    dotenvy::dotenv().ok();

    let role: Role = role
        .parse()
        .map_err(|_| UserError::InvalidRole(role.to_owned()))?;
    let email = validate_email(email).map_err(|_| UserError::InvalidEmail(email.to_owned()))?;

    let database_url =
        super::database_url().ok_or(UserError::MissingEnvVar("RATESTORE_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    let user = UserRepository::new(&pool)
        .update_role_by_email(&email, role)
        .await?
        .ok_or_else(|| UserError::NotFound(email.to_string()))?;

    tracing::info!("Role updated: {} ({}) is now {}", user.email, user.id, user.role);
    Ok(())
}
