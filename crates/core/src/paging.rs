//! Page requests, pagination metadata and sort direction.
//!
//! List endpoints accept `page`, `limit` and `sortOrder` as loose query
//! strings. Anything unparseable falls back to a default instead of failing
//! the request.

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// A clamped page/limit pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// Page used when none is given.
    pub const DEFAULT_PAGE: u32 = 1;
    /// Rows per page used when none is given.
    pub const DEFAULT_LIMIT: u32 = 10;
    /// Largest page size a caller may ask for.
    pub const MAX_LIMIT: u32 = 100;

    /// Build a request, clamping `page` to at least 1 and `limit` to `1..=100`.
    #[must_use]
    pub fn new(page: i64, limit: i64) -> Self {
        let page = u32::try_from(page.max(1)).unwrap_or(u32::MAX);
        let limit = u32::try_from(limit.clamp(1, i64::from(Self::MAX_LIMIT)))
            .unwrap_or(Self::DEFAULT_LIMIT);
        Self { page, limit }
    }

    /// Build a request from raw query values.
    ///
    /// Missing or non-numeric values use [`Self::DEFAULT_PAGE`] and
    /// [`Self::DEFAULT_LIMIT`].
    #[must_use]
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        let parse = |raw: Option<&str>, default: u32| {
            raw.and_then(|s| s.trim().parse::<i64>().ok())
                .unwrap_or_else(|| i64::from(default))
        };
        Self::new(
            parse(page, Self::DEFAULT_PAGE),
            parse(limit, Self::DEFAULT_LIMIT),
        )
    }

    /// 1-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Rows per page.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Row offset for `LIMIT ... OFFSET ...`.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.limit as i64
    }

    /// Pagination metadata for a result set of `total` rows.
    ///
    /// `total_key` names the count field in the serialized output
    /// (`totalUsers`, `totalStores`, `totalRatings`).
    #[must_use]
    pub fn paginate(&self, total: i64, total_key: &'static str) -> Pagination {
        let total = total.max(0);
        let limit = i64::from(self.limit);
        let total_pages = u32::try_from((total + limit - 1) / limit).unwrap_or(u32::MAX);
        Pagination {
            current_page: self.page,
            total_pages,
            total,
            has_next: self.page < total_pages,
            has_prev: self.page > 1,
            total_key,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// Pagination block returned alongside a page of results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number that was served.
    pub current_page: u32,
    /// `ceil(total / limit)`.
    pub total_pages: u32,
    /// Total rows matching the filter.
    pub total: i64,
    /// Whether a later page exists.
    pub has_next: bool,
    /// Whether an earlier page exists.
    pub has_prev: bool,
    total_key: &'static str,
}

impl Serialize for Pagination {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Pagination", 5)?;
        s.serialize_field("currentPage", &self.current_page)?;
        s.serialize_field("totalPages", &self.total_pages)?;
        s.serialize_field(self.total_key, &self.total)?;
        s.serialize_field("hasNext", &self.has_next)?;
        s.serialize_field("hasPrev", &self.has_prev)?;
        s.end()
    }
}

/// Sort direction for list endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortOrder {
    /// Parse a `sortOrder` query value.
    ///
    /// `asc` and `desc` match case-insensitively. Anything else, including a
    /// missing value, yields `default`.
    #[must_use]
    pub fn from_param(raw: Option<&str>, default: Self) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("desc") => Self::Desc,
            Some(s) if s.eq_ignore_ascii_case("asc") => Self::Asc,
            _ => default,
        }
    }

    /// SQL keyword for `ORDER BY`.
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = PageRequest::from_query(None, None);
        assert_eq!(req, PageRequest::default());
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), 10);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_clamping() {
        assert_eq!(PageRequest::new(0, 10).page(), 1);
        assert_eq!(PageRequest::new(-4, 10).page(), 1);
        assert_eq!(PageRequest::new(1, 0).limit(), 1);
        assert_eq!(PageRequest::new(1, 5000).limit(), 100);
    }

    #[test]
    fn test_garbage_falls_back_to_defaults() {
        let req = PageRequest::from_query(Some("abc"), Some("ten"));
        assert_eq!(req.page(), 1);
        assert_eq!(req.limit(), 10);

        let req = PageRequest::from_query(Some(" 3 "), Some("25"));
        assert_eq!(req.page(), 3);
        assert_eq!(req.limit(), 25);
        assert_eq!(req.offset(), 50);
    }

    #[test]
    fn test_paginate_math() {
        let p = PageRequest::new(2, 10).paginate(25, "totalUsers");
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next);
        assert!(p.has_prev);

        let last = PageRequest::new(3, 10).paginate(25, "totalUsers");
        assert!(!last.has_next);

        let empty = PageRequest::default().paginate(0, "totalStores");
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
        assert!(!empty.has_prev);
    }

    #[test]
    fn test_pagination_serializes_named_total() {
        let p = PageRequest::new(1, 10).paginate(11, "totalRatings");
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "currentPage": 1,
                "totalPages": 2,
                "totalRatings": 11,
                "hasNext": true,
                "hasPrev": false,
            })
        );
    }

    #[test]
    fn test_sort_order_parsing() {
        assert_eq!(SortOrder::from_param(Some("DESC"), SortOrder::Asc), SortOrder::Desc);
        assert_eq!(SortOrder::from_param(Some("asc"), SortOrder::Desc), SortOrder::Asc);
        assert_eq!(SortOrder::from_param(Some("sideways"), SortOrder::Desc), SortOrder::Desc);
        assert_eq!(SortOrder::from_param(None, SortOrder::Asc), SortOrder::Asc);
        assert_eq!(SortOrder::Desc.as_sql(), "DESC");
    }
}
