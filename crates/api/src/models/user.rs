//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use ratestore_core::{Email, Role, SortOrder, UserId};

/// A user account as returned to clients.
///
/// The password hash is never part of this type; it only travels through
/// the repository methods that need it.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub address: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// The authenticated caller, reloaded from the database on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct UserIdentity {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
}

/// Row in the admin dashboard's recent users list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Validated input for inserting a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub password_hash: String,
    pub address: Option<String>,
    pub role: Role,
}

/// Sortable columns of the admin users list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UserSortColumn {
    #[default]
    Name,
    Email,
    Role,
    CreatedAt,
}

impl UserSortColumn {
    /// Parse a `sortBy` value. Unknown or missing values sort by name.
    #[must_use]
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw {
            Some("email") => Self::Email,
            Some("role") => Self::Role,
            Some("created_at") => Self::CreatedAt,
            _ => Self::Name,
        }
    }

    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Role => "role",
            Self::CreatedAt => "created_at",
        }
    }
}

/// Filters for the admin users list.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    /// Case-insensitive substring of name, email or address.
    pub search: Option<String>,
    /// Exact role match.
    pub role: Option<Role>,
    pub sort: UserSortColumn,
    pub order: SortOrder,
}
