//! Rating domain types and aggregates.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer, ser::SerializeMap};

use ratestore_core::{Email, RatingId, SortOrder, StarRating, StoreId, UserId};

/// A user's rating of a store.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Rating {
    pub id: RatingId,
    pub user_id: UserId,
    pub store_id: StoreId,
    pub rating: StarRating,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Entry in the owner dashboard's recent ratings.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RecentRating {
    pub rating: StarRating,
    pub created_at: DateTime<Utc>,
    pub user_name: String,
    pub user_email: Email,
}

/// Entry in the owner's paginated ratings list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OwnerRating {
    pub rating: StarRating,
    pub created_at: DateTime<Utc>,
    pub user_name: String,
    pub user_email: Email,
    pub user_address: Option<String>,
}

/// Mean star rating rounded to one decimal place.
///
/// Serializes as a string (`"4.5"`, `"0.0"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct AverageRating(Decimal);

impl AverageRating {
    /// Round a raw `AVG()` result to one decimal place, half away from zero.
    #[must_use]
    pub fn from_raw(raw: Decimal) -> Self {
        let mut value = raw.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
        value.rescale(1);
        Self(value)
    }
}

impl std::fmt::Display for AverageRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for AverageRating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl sqlx::Type<sqlx::Postgres> for AverageRating {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for AverageRating {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::from_raw(raw))
    }
}

/// Count of ratings per star value. Every star value is always present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RatingDistribution {
    counts: [i64; 5],
}

impl RatingDistribution {
    /// Build from `(rating, count)` rows. Out-of-range ratings are ignored.
    #[must_use]
    pub fn from_counts(rows: impl IntoIterator<Item = (i32, i64)>) -> Self {
        let mut counts = [0_i64; 5];
        for (rating, count) in rows {
            let slot = usize::try_from(rating - 1)
                .ok()
                .and_then(|idx| counts.get_mut(idx));
            if let Some(slot) = slot {
                *slot = count;
            }
        }
        Self { counts }
    }
}

impl Serialize for RatingDistribution {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len()))?;
        for (idx, count) in self.counts.iter().enumerate() {
            map.serialize_entry(&(idx + 1).to_string(), count)?;
        }
        map.end()
    }
}

/// Sortable columns of the owner's ratings list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnerRatingSortColumn {
    #[default]
    CreatedAt,
    Rating,
    UserName,
    UserEmail,
}

impl OwnerRatingSortColumn {
    /// Parse a `sortBy` value. Unknown or missing values sort by date.
    #[must_use]
    pub fn from_param(raw: Option<&str>) -> Self {
        match raw {
            Some("rating") => Self::Rating,
            Some("user_name") => Self::UserName,
            Some("user_email") => Self::UserEmail,
            _ => Self::CreatedAt,
        }
    }

    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::CreatedAt => "r.created_at",
            Self::Rating => "r.rating",
            Self::UserName => "u.name",
            Self::UserEmail => "u.email",
        }
    }
}

/// Sort for the owner's ratings list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerRatingSort {
    pub column: OwnerRatingSortColumn,
    pub order: SortOrder,
}

impl Default for OwnerRatingSort {
    fn default() -> Self {
        Self {
            column: OwnerRatingSortColumn::CreatedAt,
            order: SortOrder::Desc,
        }
    }
}
