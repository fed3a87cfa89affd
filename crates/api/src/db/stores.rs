//! Store repository for database operations.
//!
//! Rating aggregates are computed with `LEFT JOIN ratings` so stores without
//! ratings still appear, with an average of `0` and a count of `0`.

use sqlx::{PgPool, Postgres, QueryBuilder};

use ratestore_core::{PageRequest, StoreId, UserId};

use super::{RepositoryError, like_pattern};
use crate::models::{
    AdminStoreFilter, AdminStoreListing, NewStore, RecentStore, Store, StoreDetail, StoreFilter,
    StoreListing, StoreSummary,
};

/// Conflict message when a store email is already registered.
pub const STORE_EMAIL_TAKEN: &str = "Store with this email already exists";

/// Repository for store database operations.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Whether a store with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: StoreId) -> Result<bool, RepositoryError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM stores WHERE id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;

        Ok(exists)
    }

    /// Get a store with its rating aggregate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_detail(&self, id: StoreId) -> Result<Option<StoreDetail>, RepositoryError> {
        let store = sqlx::query_as::<_, StoreDetail>(
            r"
            SELECT s.id, s.name, s.email, s.address, s.owner_id,
                   s.created_at, s.updated_at,
                   COALESCE(AVG(r.rating), 0) AS average_rating,
                   COUNT(r.rating) AS total_ratings
            FROM stores s
            LEFT JOIN ratings r ON r.store_id = s.id
            WHERE s.id = $1
            GROUP BY s.id
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(store)
    }

    /// List stores for a browsing user, including that user's own rating.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
        filter: &StoreFilter,
    ) -> Result<Vec<StoreListing>, RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new(
            r"
            SELECT s.id, s.name, s.email, s.address, s.created_at,
                   COALESCE(AVG(r.rating), 0) AS average_rating,
                   COUNT(r.rating) AS total_ratings,
                   ur.rating AS user_rating
            FROM stores s
            LEFT JOIN ratings r ON r.store_id = s.id
            LEFT JOIN ratings ur ON ur.store_id = s.id AND ur.user_id = ",
        );
        query.push_bind(user_id);

        if let Some(term) = filter.search.as_deref() {
            let pattern = like_pattern(term);
            query
                .push(" WHERE s.name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR s.address ILIKE ")
                .push_bind(pattern);
        }

        query
            .push(" GROUP BY s.id, ur.rating ORDER BY ")
            .push(filter.sort.as_sql())
            .push(" ")
            .push(filter.order.as_sql())
            .push(", s.id");

        let stores = query
            .build_query_as::<StoreListing>()
            .fetch_all(self.pool)
            .await?;

        Ok(stores)
    }

    /// Create a store owned by `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the store email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        owner_id: UserId,
        new_store: &NewStore,
    ) -> Result<Store, RepositoryError> {
        sqlx::query_as::<_, Store>(
            r"
            INSERT INTO stores (name, email, address, owner_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, address, owner_id, created_at
            ",
        )
        .bind(&new_store.name)
        .bind(&new_store.email)
        .bind(&new_store.address)
        .bind(owner_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::unique_or_database(e, STORE_EMAIL_TAKEN))
    }

    /// The store owned by `owner_id`, with its rating aggregate.
    ///
    /// An owner with several stores gets the oldest one.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn summary_for_owner(
        &self,
        owner_id: UserId,
    ) -> Result<Option<StoreSummary>, RepositoryError> {
        let store = sqlx::query_as::<_, StoreSummary>(
            r"
            SELECT s.id, s.name, s.email, s.address,
                   COALESCE(AVG(r.rating), 0) AS average_rating,
                   COUNT(r.rating) AS total_ratings
            FROM stores s
            LEFT JOIN ratings r ON r.store_id = s.id
            WHERE s.owner_id = $1
            GROUP BY s.id
            ORDER BY s.id
            LIMIT 1
            ",
        )
        .bind(owner_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(store)
    }

    /// ID of the store owned by `owner_id`, picked the same way as
    /// [`Self::summary_for_owner`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn id_for_owner(&self, owner_id: UserId) -> Result<Option<StoreId>, RepositoryError> {
        let id = sqlx::query_scalar::<_, StoreId>(
            "SELECT id FROM stores WHERE owner_id = $1 ORDER BY id LIMIT 1",
        )
        .bind(owner_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(id)
    }

    /// List stores for administrators, one page at a time.
    ///
    /// Returns the page and the total number of matching stores.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_admin(
        &self,
        filter: &AdminStoreFilter,
        page: PageRequest,
    ) -> Result<(Vec<AdminStoreListing>, i64), RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new(
            r"
            SELECT s.id, s.name, s.email, s.address, s.created_at,
                   u.name AS owner_name,
                   u.id AS owner_id,
                   COALESCE(AVG(r.rating), 0) AS average_rating,
                   COUNT(r.rating) AS total_ratings
            FROM stores s
            LEFT JOIN users u ON u.id = s.owner_id
            LEFT JOIN ratings r ON r.store_id = s.id",
        );
        push_admin_filters(&mut query, filter);
        query
            .push(" GROUP BY s.id, u.id ORDER BY ")
            .push(filter.sort.as_sql())
            .push(" ")
            .push(filter.order.as_sql())
            .push(", s.id LIMIT ")
            .push_bind(i64::from(page.limit()))
            .push(" OFFSET ")
            .push_bind(page.offset());

        let stores = query
            .build_query_as::<AdminStoreListing>()
            .fetch_all(self.pool)
            .await?;

        let mut count = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM stores s LEFT JOIN users u ON u.id = s.owner_id",
        );
        push_admin_filters(&mut count, filter);
        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(self.pool)
            .await?;

        Ok((stores, total))
    }

    /// The most recently created stores with their owner's name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(&self, limit: i64) -> Result<Vec<RecentStore>, RepositoryError> {
        let stores = sqlx::query_as::<_, RecentStore>(
            r"
            SELECT s.id, s.name, s.email, s.address, u.name AS owner_name, s.created_at
            FROM stores s
            LEFT JOIN users u ON u.id = s.owner_id
            ORDER BY s.created_at DESC, s.id DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(stores)
    }
}

/// Append the `WHERE` clause for the admin stores list.
fn push_admin_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &AdminStoreFilter) {
    let Some(term) = filter.search.as_deref() else {
        return;
    };

    let pattern = like_pattern(term);
    query
        .push(" WHERE (s.name ILIKE ")
        .push_bind(pattern.clone())
        .push(" OR s.email ILIKE ")
        .push_bind(pattern.clone())
        .push(" OR s.address ILIKE ")
        .push_bind(pattern.clone())
        .push(" OR u.name ILIKE ")
        .push_bind(pattern)
        .push(")");
}
