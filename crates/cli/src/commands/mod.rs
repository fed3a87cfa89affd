//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod user;

use secrecy::SecretString;

/// Read the database URL, preferring `RATESTORE_DATABASE_URL` over `DATABASE_URL`.
pub(crate) fn database_url() -> Option<SecretString> {
    std::env::var("RATESTORE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .ok()
        .map(SecretString::from)
}
