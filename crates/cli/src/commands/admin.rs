//! Administrator account commands.
//!
//! # Usage
//!
//! ```bash
//! ratestore-cli admin create -n "Morgan Ellis Admin" -e admin@example.com -p 'Str0ng!pass'
//! ```
//!
//! # Environment Variables
//!
//! - `RATESTORE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `BCRYPT_COST` - bcrypt work factor (default: 12)

use ratestore_api::db::{RepositoryError, UserRepository};
use ratestore_api::models::NewUser;
use ratestore_api::services::auth::{AuthError, password};
use ratestore_core::validation::{
    validate_address, validate_email, validate_password, validate_user_name,
};
use ratestore_core::{Role, UserId};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

const DEFAULT_BCRYPT_COST: u32 = 12;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// A field failed validation.
    #[error("Invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: &'static str,
    },

    /// Repository error, including a taken email.
    #[error("{0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    Hash(#[from] AuthError),
}

fn invalid(field: &'static str) -> impl FnOnce(&'static str) -> AdminError {
    move |message| AdminError::Invalid { field, message }
}

/// Create an administrator account.
///
/// # Returns
///
/// The ID of the created user.
///
/// # Errors
///
/// Returns `AdminError` if a field is invalid, the email is taken, or the
/// database is unreachable.
pub async fn create_user(
    name: &str,
    email: &str,
    password_plain: &str,
    address: Option<&str>,
) -> Result<UserId, AdminError> {
    dotenvy::dotenv().ok();

    let name = validate_user_name(name).map_err(invalid("name"))?;
    let email = validate_email(email).map_err(invalid("email"))?;
    validate_password(password_plain).map_err(invalid("password"))?;
    let address = validate_address(address).map_err(invalid("address"))?;

    let cost = std::env::var("BCRYPT_COST")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_BCRYPT_COST);

    let database_url =
        super::database_url().ok_or(AdminError::MissingEnvVar("RATESTORE_DATABASE_URL"))?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Creating admin user: {}", email);

    let password_hash = password::hash_password(password_plain.to_owned(), cost).await?;
    let user = UserRepository::new(&pool)
        .create(&NewUser {
            name,
            email,
            password_hash,
            address,
            role: Role::Admin,
        })
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );

    Ok(user.id)
}
