//! Star rating value.

use serde::{Deserialize, Serialize};

/// Error returned when a value is outside the 1-5 star range.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("rating must be between {min} and {max}, got {value}", min = StarRating::MIN, max = StarRating::MAX)]
pub struct StarRatingError {
    /// The rejected value.
    pub value: i64,
}

/// A rating of one to five stars.
///
/// Mirrors the `CHECK (rating >= 1 AND rating <= 5)` constraint on `ratings.rating`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i32")]
pub struct StarRating(u8);

impl StarRating {
    /// Lowest allowed rating.
    pub const MIN: u8 = 1;
    /// Highest allowed rating.
    pub const MAX: u8 = 5;

    /// Create a rating, rejecting values outside 1-5.
    ///
    /// # Errors
    ///
    /// Returns [`StarRatingError`] if `value` is out of range.
    pub fn new(value: i64) -> Result<Self, StarRatingError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(StarRatingError { value })
    }

    /// The star count.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for StarRating {
    type Error = StarRatingError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StarRating> for i32 {
    fn from(rating: StarRating) -> Self {
        Self::from(rating.0)
    }
}

impl std::fmt::Display for StarRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for StarRating {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i32 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i32 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for StarRating {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <i32 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(i64::from(raw))?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for StarRating {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i32 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&i32::from(self.0), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_one_through_five() {
        for v in 1..=5 {
            assert_eq!(i64::from(StarRating::new(v).unwrap().get()), v);
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert_eq!(StarRating::new(0), Err(StarRatingError { value: 0 }));
        assert_eq!(StarRating::new(6), Err(StarRatingError { value: 6 }));
        assert!(StarRating::new(-1).is_err());
        assert!(StarRating::new(i64::from(u8::MAX) + 5).is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: StarRating = serde_json::from_str("4").unwrap();
        assert_eq!(ok.get(), 4);
        assert!(serde_json::from_str::<StarRating>("9").is_err());
    }

    #[test]
    fn test_serializes_as_number() {
        let rating = StarRating::new(3).unwrap();
        assert_eq!(serde_json::to_string(&rating).unwrap(), "3");
    }

    #[test]
    fn test_error_message() {
        let err = StarRating::new(7).unwrap_err();
        assert_eq!(err.to_string(), "rating must be between 1 and 5, got 7");
    }
}
