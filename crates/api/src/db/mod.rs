//! Database operations for RateStore `PostgreSQL`.
//!
//! # Tables
//!
//! - `users` - Accounts for customers, store owners and administrators
//! - `stores` - Rated stores, each owned by a store owner
//! - `ratings` - One 1-5 star rating per (user, store)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p ratestore-cli -- migrate
//! ```
//!
//! List queries are composed with [`sqlx::QueryBuilder`]. User input only
//! ever reaches SQL through bind parameters; sort columns come from closed
//! enums in [`crate::models`].

pub mod ratings;
pub mod stores;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use serde::Serialize;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use ratings::RatingRepository;
pub use stores::StoreRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation. Carries the client-facing message.
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique violation to `Conflict(message)`, anything else to `Database`.
    pub(crate) fn unique_or_database(e: sqlx::Error, message: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = e
            && db_err.is_unique_violation()
        {
            return Self::Conflict(message.to_owned());
        }
        Self::Database(e)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Row counts shown on the admin dashboard.
#[derive(Debug, Clone, Copy, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_users: i64,
    pub total_stores: i64,
    pub total_ratings: i64,
}

/// Count users, stores and ratings in one round trip.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn platform_stats(pool: &PgPool) -> Result<PlatformStats, RepositoryError> {
    let stats = sqlx::query_as::<_, PlatformStats>(
        r"
        SELECT
            (SELECT COUNT(*) FROM users) AS total_users,
            (SELECT COUNT(*) FROM stores) AS total_stores,
            (SELECT COUNT(*) FROM ratings) AS total_ratings
        ",
    )
    .fetch_one(pool)
    .await?;

    Ok(stats)
}

/// Build an `ILIKE` pattern matching `term` as a literal substring.
///
/// Escapes `\`, `%` and `_` so a search for `50%` does not match everything.
#[must_use]
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_wraps_term() {
        assert_eq!(like_pattern("coffee"), "%coffee%");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_platform_stats_serializes_camel_case() {
        let stats = PlatformStats {
            total_users: 3,
            total_stores: 2,
            total_ratings: 1,
        };
        assert_eq!(
            serde_json::to_value(stats).unwrap_or_default(),
            serde_json::json!({"totalUsers": 3, "totalStores": 2, "totalRatings": 1})
        );
    }
}
