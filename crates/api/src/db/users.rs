//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use ratestore_core::{Email, PageRequest, Role, UserId};

use super::{RepositoryError, like_pattern, stores::STORE_EMAIL_TAKEN};
use crate::models::{NewStore, NewUser, Store, User, UserFilter, UserIdentity, UserSummary};

/// Conflict message when an email is already registered.
pub const USER_EMAIL_TAKEN: &str = "User already exists with this email";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    address: Option<String>,
    role: Role,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            name: row.name,
            email,
            address: row.address,
            role: row.role,
            created_at: row.created_at,
        })
    }
}

/// User row joined with its password hash, for login.
#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    #[sqlx(flatten)]
    user: UserRow,
    password: String,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, name, email, address, role, created_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get the identity used for authorization decisions.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_identity(&self, id: UserId) -> Result<Option<UserIdentity>, RepositoryError> {
        let identity = sqlx::query_as::<_, UserIdentity>(
            "SELECT id, name, email, role FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(identity)
    }

    /// Get a user and their password hash by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r"
            SELECT id, name, email, address, role, created_at, password
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((User::try_from(r.user)?, r.password))),
            None => Ok(None),
        }
    }

    /// Get a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(&self, id: UserId) -> Result<Option<String>, RepositoryError> {
        let hash = sqlx::query_scalar::<_, String>("SELECT password FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(hash)
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (name, email, password, address, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, address, role, created_at
            ",
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.address)
        .bind(new_user.role)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_or_database(e, USER_EMAIL_TAKEN))?;

        row.try_into()
    }

    /// Create a store owner and their store atomically.
    ///
    /// Either both rows are written or neither is.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if either email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create_with_store(
        &self,
        new_user: &NewUser,
        new_store: &NewStore,
    ) -> Result<(User, Store), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (name, email, password, address, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, email, address, role, created_at
            ",
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(&new_user.address)
        .bind(new_user.role)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::unique_or_database(e, USER_EMAIL_TAKEN))?;

        let user = User::try_from(row)?;

        let store = sqlx::query_as::<_, Store>(
            r"
            INSERT INTO stores (name, email, address, owner_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, address, owner_id, created_at
            ",
        )
        .bind(&new_store.name)
        .bind(&new_store.email)
        .bind(&new_store.address)
        .bind(user.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::unique_or_database(e, STORE_EMAIL_TAKEN))?;

        tx.commit().await?;

        Ok((user, store))
    }

    /// Replace a user's password hash and bump `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET password = $1, updated_at = now() WHERE id = $2",
        )
        .bind(password_hash)
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Change a user's role.
    ///
    /// Returns `None` if the user does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_role(
        &self,
        id: UserId,
        role: Role,
    ) -> Result<Option<UserIdentity>, RepositoryError> {
        let identity = sqlx::query_as::<_, UserIdentity>(
            r"
            UPDATE users SET role = $1, updated_at = now()
            WHERE id = $2
            RETURNING id, name, email, role
            ",
        )
        .bind(role)
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(identity)
    }

    /// Change the role of the user with the given email.
    ///
    /// Returns `None` if no such user exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_role_by_email(
        &self,
        email: &Email,
        role: Role,
    ) -> Result<Option<UserIdentity>, RepositoryError> {
        let identity = sqlx::query_as::<_, UserIdentity>(
            r"
            UPDATE users SET role = $1, updated_at = now()
            WHERE email = $2
            RETURNING id, name, email, role
            ",
        )
        .bind(role)
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(identity)
    }

    /// List users matching `filter`, one page at a time.
    ///
    /// Returns the page and the total number of matching users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored email is invalid.
    pub async fn list(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> Result<(Vec<User>, i64), RepositoryError> {
        let mut query =
            QueryBuilder::new("SELECT id, name, email, address, role, created_at FROM users");
        push_filters(&mut query, filter);
        query
            .push(" ORDER BY ")
            .push(filter.sort.as_sql())
            .push(" ")
            .push(filter.order.as_sql())
            .push(", id LIMIT ")
            .push_bind(i64::from(page.limit()))
            .push(" OFFSET ")
            .push_bind(page.offset());

        let rows = query.build_query_as::<UserRow>().fetch_all(self.pool).await?;

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM users");
        push_filters(&mut count, filter);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(self.pool)
            .await?;

        let users = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<User>, _>>()?;

        Ok((users, total))
    }

    /// The most recently created users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<UserSummary>, RepositoryError> {
        let users = sqlx::query_as::<_, UserSummary>(
            r"
            SELECT id, name, email, role, created_at
            FROM users
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }
}

/// Append the `WHERE` clause for `filter`.
fn push_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &UserFilter) {
    query.push(" WHERE TRUE");

    if let Some(term) = filter.search.as_deref() {
        let pattern = like_pattern(term);
        query
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR email ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR address ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    if let Some(role) = filter.role {
        query.push(" AND role = ").push_bind(role);
    }
}

#[cfg(test)]
mod tests {
    use ratestore_core::SortOrder;

    use super::*;
    use crate::models::UserSortColumn;

    #[test]
    fn test_filters_bind_search_and_role() {
        let filter = UserFilter {
            search: Some("ann".to_owned()),
            role: Some(Role::StoreOwner),
            sort: UserSortColumn::Email,
            order: SortOrder::Desc,
        };
        let mut query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        push_filters(&mut query, &filter);

        assert_eq!(
            query.sql(),
            "SELECT COUNT(*) FROM users WHERE TRUE AND (name ILIKE $1 OR email ILIKE $2 OR address ILIKE $3) AND role = $4"
        );
    }

    #[test]
    fn test_filters_role_without_search() {
        let filter = UserFilter {
            role: Some(Role::Admin),
            ..UserFilter::default()
        };
        let mut query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        push_filters(&mut query, &filter);

        assert_eq!(
            query.sql(),
            "SELECT COUNT(*) FROM users WHERE TRUE AND role = $1"
        );
    }

    #[test]
    fn test_filters_empty() {
        let mut query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        push_filters(&mut query, &UserFilter::default());
        assert_eq!(query.sql(), "SELECT COUNT(*) FROM users WHERE TRUE");
    }
}
