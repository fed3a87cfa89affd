//! Authentication service.
//!
//! Provides registration, password login and password changes. Request
//! bodies are validated by the route handlers before they reach this layer;
//! the service hashes, persists and verifies.

mod error;
pub mod jwt;
pub mod password;

pub use error::AuthError;
pub use jwt::{Claims, JwtKeys};

use sqlx::PgPool;

use ratestore_core::{Email, Role, UserId};

use crate::db::UserRepository;
use crate::models::{NewStore, NewUser, Store, User};

/// Validated input for creating an account.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: Email,
    pub password: String,
    pub address: Option<String>,
    pub role: Role,
    /// Store created in the same transaction as the account.
    pub store: Option<NewStore>,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    bcrypt_cost: u32,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, bcrypt_cost: u32) -> Self {
        Self {
            users: UserRepository::new(pool),
            bcrypt_cost,
        }
    }

    /// Create an account, and its store when one is given.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository(RepositoryError::Conflict)` if the user
    /// or store email is taken. No rows are written in that case.
    pub async fn register(
        &self,
        registration: Registration,
    ) -> Result<(User, Option<Store>), AuthError> {
        let Registration {
            name,
            email,
            password,
            address,
            role,
            store,
        } = registration;

        let password_hash = password::hash_password(password, self.bcrypt_cost).await?;
        let new_user = NewUser {
            name,
            email,
            password_hash,
            address,
            role,
        };

        match store {
            Some(new_store) => {
                let (user, store) = self.users.create_with_store(&new_user, &new_store).await?;
                tracing::info!(user_id = %user.id, store_id = %store.id, "registered store owner with store");
                Ok((user, Some(store)))
            }
            None => {
                let user = self.users.create(&new_user).await?;
                tracing::info!(user_id = %user.id, role = %user.role, "registered user");
                Ok((user, None))
            }
        }
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is unknown or the
    /// password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_with_password(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !password::verify_password(password.to_owned(), password_hash).await? {
            tracing::info!(user_id = %user.id, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Replace a user's password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user no longer exists.
    /// Returns `AuthError::IncorrectPassword` if `current` does not match.
    pub async fn change_password(
        &self,
        user_id: UserId,
        current: &str,
        new: String,
    ) -> Result<(), AuthError> {
        let stored = self
            .users
            .get_password_hash(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !password::verify_password(current.to_owned(), stored).await? {
            return Err(AuthError::IncorrectPassword);
        }

        let new_hash = password::hash_password(new, self.bcrypt_cost).await?;
        self.users
            .update_password(user_id, &new_hash)
            .await
            .map_err(|e| match e {
                crate::db::RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user_id, "password changed");
        Ok(())
    }
}
