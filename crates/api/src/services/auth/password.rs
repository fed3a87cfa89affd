//! bcrypt password hashing on the blocking thread pool.

use super::AuthError;

/// Hash a password with bcrypt at `cost`.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if bcrypt fails, or
/// `AuthError::Blocking` if the worker task dies.
pub async fn hash_password(password: String, cost: u32) -> Result<String, AuthError> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hash)
}

/// Check a password against a stored bcrypt hash.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if the stored hash is malformed, or
/// `AuthError::Blocking` if the worker task dies.
pub async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(valid)
}
