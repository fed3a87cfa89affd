//! Store domain types.
//!
//! Every read model carries its rating aggregate computed in SQL; averages
//! are never stored.

use chrono::{DateTime, Utc};
use serde::Serialize;

use ratestore_core::{Email, SortOrder, StarRating, StoreId, UserId};

use super::rating::AverageRating;

/// A store row as created.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub email: Email,
    pub address: String,
    pub owner_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Validated input for inserting a store.
#[derive(Debug, Clone)]
pub struct NewStore {
    pub name: String,
    pub email: Email,
    pub address: String,
}

/// Store as seen by a browsing user, with their own rating.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StoreListing {
    pub id: StoreId,
    pub name: String,
    pub email: Email,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub average_rating: AverageRating,
    pub total_ratings: i64,
    pub user_rating: Option<StarRating>,
}

/// Full store record with its aggregate.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StoreDetail {
    pub id: StoreId,
    pub name: String,
    pub email: Email,
    pub address: String,
    pub owner_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub average_rating: AverageRating,
    pub total_ratings: i64,
}

/// Compact store block for owner dashboards and admin user details.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct StoreSummary {
    pub id: StoreId,
    pub name: String,
    pub email: Email,
    pub address: String,
    pub average_rating: AverageRating,
    pub total_ratings: i64,
}

/// Row in the admin stores list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AdminStoreListing {
    pub id: StoreId,
    pub name: String,
    pub email: Email,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub owner_name: Option<String>,
    pub owner_id: Option<UserId>,
    pub average_rating: AverageRating,
    pub total_ratings: i64,
}

/// Row in the admin dashboard's recent stores list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RecentStore {
    pub id: StoreId,
    pub name: String,
    pub email: Email,
    pub address: String,
    pub owner_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Sortable columns of the store browsing list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreSortColumn {
    #[default]
    Name,
    Address,
    CreatedAt,
    AverageRating,
}

impl StoreSortColumn {
    /// Parse a `sortBy` value. Unknown or missing values sort by name.
    #[must_use]
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw {
            Some("address") => Self::Address,
            Some("created_at") => Self::CreatedAt,
            Some("average_rating") => Self::AverageRating,
            _ => Self::Name,
        }
    }

    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Name => "s.name",
            Self::Address => "s.address",
            Self::CreatedAt => "s.created_at",
            Self::AverageRating => "average_rating",
        }
    }
}

/// Sortable columns of the admin stores list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminStoreSortColumn {
    #[default]
    Name,
    Email,
    AverageRating,
    CreatedAt,
}

impl AdminStoreSortColumn {
    /// Parse a `sortBy` value, accepting both `name` and `s.name` spellings.
    #[must_use]
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw.map(|s| s.strip_prefix("s.").unwrap_or(s)) {
            Some("email") => Self::Email,
            Some("average_rating") => Self::AverageRating,
            Some("created_at") => Self::CreatedAt,
            _ => Self::Name,
        }
    }

    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Name => "s.name",
            Self::Email => "s.email",
            Self::AverageRating => "average_rating",
            Self::CreatedAt => "s.created_at",
        }
    }
}

/// Filters for the store browsing list.
#[derive(Debug, Clone, Default)]
pub struct StoreFilter {
    /// Case-insensitive substring of name or address.
    pub search: Option<String>,
    pub sort: StoreSortColumn,
    pub order: SortOrder,
}

/// Filters for the admin stores list.
#[derive(Debug, Clone, Default)]
pub struct AdminStoreFilter {
    /// Case-insensitive substring of store name, email, address or owner name.
    pub search: Option<String>,
    pub sort: AdminStoreSortColumn,
    pub order: SortOrder,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_sort_whitelist() {
        assert_eq!(
            StoreSortColumn::from_param(Some("average_rating")).as_sql(),
            "average_rating"
        );
        assert_eq!(
            StoreSortColumn::from_param(Some("created_at")),
            StoreSortColumn::CreatedAt
        );
        assert_eq!(
            StoreSortColumn::from_param(Some("owner_id")),
            StoreSortColumn::Name
        );
    }

    #[test]
    fn test_admin_sort_accepts_prefixed_names() {
        assert_eq!(
            AdminStoreSortColumn::from_param(Some("s.email")),
            AdminStoreSortColumn::Email
        );
        assert_eq!(
            AdminStoreSortColumn::from_param(Some("s.created_at")),
            AdminStoreSortColumn::CreatedAt
        );
        assert_eq!(
            AdminStoreSortColumn::from_param(Some("average_rating")),
            AdminStoreSortColumn::AverageRating
        );
        assert_eq!(
            AdminStoreSortColumn::from_param(Some("u.password")),
            AdminStoreSortColumn::Name
        );
    }
}
