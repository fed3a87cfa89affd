//! Store owner dashboard route handlers.
//!
//! An owner with more than one store is shown their oldest store.

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use ratestore_core::{PageRequest, Pagination, SortOrder};

use crate::db::{RatingRepository, StoreRepository};
use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::middleware::RequireStoreOwner;
use crate::models::{
    AverageRating, OwnerRating, OwnerRatingSort, OwnerRatingSortColumn, RatingDistribution,
    RecentRating, StoreSummary,
};
use crate::state::AppState;

/// Ratings shown on the dashboard.
const RECENT_RATINGS: i64 = 10;

/// Query parameters for the owner's ratings list.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerRatingsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl OwnerRatingsQuery {
    fn sort(&self) -> OwnerRatingSort {
        OwnerRatingSort {
            column: OwnerRatingSortColumn::from_param(self.sort_by.as_deref()),
            order: SortOrder::from_param(self.sort_order.as_deref(), SortOrder::Desc),
        }
    }

    fn page(&self) -> PageRequest {
        PageRequest::from_query(self.page.as_deref(), self.limit.as_deref())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_ratings: i64,
    pub average_rating: AverageRating,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub store: StoreSummary,
    pub recent_ratings: Vec<RecentRating>,
    pub rating_distribution: RatingDistribution,
    pub stats: DashboardStats,
}

#[derive(Debug, Serialize)]
pub struct OwnerRatingsResponse {
    pub ratings: Vec<OwnerRating>,
    pub pagination: Pagination,
}

fn no_store() -> AppError {
    AppError::NotFound("No store found for this owner".to_string())
}

/// Summary, recent ratings and star distribution for the owner's store.
pub async fn dashboard(
    State(state): State<AppState>,
    RequireStoreOwner(owner): RequireStoreOwner,
) -> Result<ApiJson<DashboardResponse>> {
    let store = StoreRepository::new(state.pool())
        .summary_for_owner(owner.id)
        .await?
        .ok_or_else(no_store)?;

    let ratings = RatingRepository::new(state.pool());
    let recent_ratings = ratings.recent_for_store(store.id, RECENT_RATINGS).await?;
    let rating_distribution = ratings.distribution(store.id).await?;

    let stats = DashboardStats {
        total_ratings: store.total_ratings,
        average_rating: store.average_rating,
    };

    Ok(ApiJson(DashboardResponse {
        store,
        recent_ratings,
        rating_distribution,
        stats,
    }))
}

/// One page of the owner's store ratings with rater details.
pub async fn ratings(
    State(state): State<AppState>,
    RequireStoreOwner(owner): RequireStoreOwner,
    Query(query): Query<OwnerRatingsQuery>,
) -> Result<ApiJson<OwnerRatingsResponse>> {
    let store_id = StoreRepository::new(state.pool())
        .id_for_owner(owner.id)
        .await?
        .ok_or_else(no_store)?;

    let page = query.page();
    let (ratings, total) = RatingRepository::new(state.pool())
        .list_for_store(store_id, query.sort(), page)
        .await?;

    Ok(ApiJson(OwnerRatingsResponse {
        ratings,
        pagination: page.paginate(total, "totalRatings"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sort_is_newest_first() {
        assert_eq!(OwnerRatingsQuery::default().sort(), OwnerRatingSort::default());
    }

    #[test]
    fn test_unknown_sort_column_falls_back() {
        let query = OwnerRatingsQuery {
            sort_by: Some("rating; DROP TABLE ratings".to_string()),
            sort_order: Some("asc".to_string()),
            ..OwnerRatingsQuery::default()
        };
        let sort = query.sort();
        assert_eq!(sort.column, OwnerRatingSortColumn::CreatedAt);
        assert_eq!(sort.order, SortOrder::Asc);
    }

    #[test]
    fn test_page_parsing() {
        let query = OwnerRatingsQuery {
            page: Some("3".to_string()),
            limit: Some("abc".to_string()),
            ..OwnerRatingsQuery::default()
        };
        let page = query.page();
        assert_eq!(page.page(), 3);
        assert_eq!(page.limit(), PageRequest::DEFAULT_LIMIT);
    }
}
