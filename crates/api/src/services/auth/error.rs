//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The current password given for a password change is wrong.
    #[error("current password is incorrect")]
    IncorrectPassword,

    /// The user no longer exists.
    #[error("user not found")]
    UserNotFound,

    /// Token could not be issued or failed verification.
    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    /// Password hashing error.
    #[error("password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// The blocking hashing task panicked or was cancelled.
    #[error("hashing task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
