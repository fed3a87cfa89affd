//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::services::auth::JwtKeys;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    jwt: JwtKeys,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Derives the token keys from `config.jwt_secret`.
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        let jwt = JwtKeys::new(&config.jwt_secret, config.jwt_lifetime());

        Self {
            inner: Arc::new(AppStateInner { config, pool, jwt }),
        }
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the token signing keys.
    #[must_use]
    pub fn jwt(&self) -> &JwtKeys {
        &self.inner.jwt
    }
}
