//! Rating repository for database operations.

use sqlx::{PgPool, Postgres, QueryBuilder};

use ratestore_core::{PageRequest, StarRating, StoreId, UserId};

use super::RepositoryError;
use crate::models::{OwnerRating, OwnerRatingSort, Rating, RatingDistribution, RecentRating};

/// Repository for rating database operations.
pub struct RatingRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RatingRepository<'a> {
    /// Create a new rating repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert or replace the caller's rating for a store.
    ///
    /// Re-rating keeps the row's `id` and `created_at` and bumps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store or user vanished
    /// between the existence check and the insert.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn upsert(
        &self,
        user_id: UserId,
        store_id: StoreId,
        rating: StarRating,
    ) -> Result<Rating, RepositoryError> {
        sqlx::query_as::<_, Rating>(
            r"
            INSERT INTO ratings (user_id, store_id, rating)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, store_id)
            DO UPDATE SET rating = EXCLUDED.rating, updated_at = now()
            RETURNING id, user_id, store_id, rating, created_at, updated_at
            ",
        )
        .bind(user_id)
        .bind(store_id)
        .bind(rating)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })
    }

    /// The caller's rating for a store, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        store_id: StoreId,
    ) -> Result<Option<Rating>, RepositoryError> {
        let rating = sqlx::query_as::<_, Rating>(
            r"
            SELECT id, user_id, store_id, rating, created_at, updated_at
            FROM ratings
            WHERE user_id = $1 AND store_id = $2
            ",
        )
        .bind(user_id)
        .bind(store_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(rating)
    }

    /// The newest ratings for a store with the rater's name and email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent_for_store(
        &self,
        store_id: StoreId,
        limit: i64,
    ) -> Result<Vec<RecentRating>, RepositoryError> {
        let ratings = sqlx::query_as::<_, RecentRating>(
            r"
            SELECT r.rating, r.created_at, u.name AS user_name, u.email AS user_email
            FROM ratings r
            JOIN users u ON u.id = r.user_id
            WHERE r.store_id = $1
            ORDER BY r.created_at DESC, r.id DESC
            LIMIT $2
            ",
        )
        .bind(store_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(ratings)
    }

    /// Count of ratings per star value for a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn distribution(
        &self,
        store_id: StoreId,
    ) -> Result<RatingDistribution, RepositoryError> {
        let rows = sqlx::query_as::<_, (i32, i64)>(
            r"
            SELECT rating, COUNT(*)
            FROM ratings
            WHERE store_id = $1
            GROUP BY rating
            ",
        )
        .bind(store_id)
        .fetch_all(self.pool)
        .await?;

        Ok(RatingDistribution::from_counts(rows))
    }

    /// A page of a store's ratings with rater details.
    ///
    /// Returns the page and the store's total rating count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_store(
        &self,
        store_id: StoreId,
        sort: OwnerRatingSort,
        page: PageRequest,
    ) -> Result<(Vec<OwnerRating>, i64), RepositoryError> {
        let mut query = QueryBuilder::<Postgres>::new(
            r"
            SELECT r.rating, r.created_at,
                   u.name AS user_name,
                   u.email AS user_email,
                   u.address AS user_address
            FROM ratings r
            JOIN users u ON u.id = r.user_id
            WHERE r.store_id = ",
        );
        query
            .push_bind(store_id)
            .push(" ORDER BY ")
            .push(sort.column.as_sql())
            .push(" ")
            .push(sort.order.as_sql())
            .push(", r.id LIMIT ")
            .push_bind(i64::from(page.limit()))
            .push(" OFFSET ")
            .push_bind(page.offset());

        let ratings = query
            .build_query_as::<OwnerRating>()
            .fetch_all(self.pool)
            .await?;

        let total =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ratings WHERE store_id = $1")
                .bind(store_id)
                .fetch_one(self.pool)
                .await?;

        Ok((ratings, total))
    }
}
