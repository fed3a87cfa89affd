//! Store browsing and creation route handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use ratestore_core::validation::{validate_store_address, validate_store_email, validate_store_name};
use ratestore_core::{Role, SortOrder, StoreId, ValidationErrors};

use crate::db::StoreRepository;
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAuth;
use crate::models::{NewStore, Store, StoreDetail, StoreFilter, StoreListing, StoreSortColumn};
use crate::state::AppState;

/// Query parameters for the store list.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreListQuery {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl StoreListQuery {
    fn into_filter(self) -> StoreFilter {
        StoreFilter {
            search: non_blank(self.search),
            sort: StoreSortColumn::from_param(self.sort_by.as_deref()),
            order: SortOrder::from_param(self.sort_order.as_deref(), SortOrder::Asc),
        }
    }
}

/// Store creation request body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateStoreRequest {
    pub name: String,
    pub email: String,
    pub address: String,
}

impl CreateStoreRequest {
    /// Validate all three fields.
    pub(crate) fn validate(&self) -> std::result::Result<NewStore, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let name = errors.check("name", validate_store_name(&self.name));
        let email = errors.check("email", validate_store_email(&self.email));
        let address = errors.check("address", validate_store_address(&self.address));

        match (name, email, address) {
            (Some(name), Some(email), Some(address)) => Ok(NewStore {
                name,
                email,
                address,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StoreListResponse {
    pub stores: Vec<StoreListing>,
}

#[derive(Debug, Serialize)]
pub struct StoreDetailResponse {
    pub store: StoreDetail,
}

#[derive(Debug, Serialize)]
pub struct StoreCreatedResponse {
    pub message: &'static str,
    pub store: Store,
}

/// Trimmed search term, `None` when blank.
pub(crate) fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_owned()).filter(|s| !s.is_empty())
}

/// All stores with their aggregate and the caller's own rating.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    Query(query): Query<StoreListQuery>,
) -> Result<ApiJson<StoreListResponse>> {
    let filter = query.into_filter();
    let stores = StoreRepository::new(state.pool())
        .list_for_user(caller.id, &filter)
        .await?;

    Ok(ApiJson(StoreListResponse { stores }))
}

/// One store with its aggregate.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(_caller): RequireAuth,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiJson<StoreDetailResponse>> {
    let store = StoreRepository::new(state.pool())
        .get_detail(StoreId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Store not found".to_string()))?;

    Ok(ApiJson(StoreDetailResponse { store }))
}

/// Create a store owned by the calling store owner.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    ApiJson(body): ApiJson<CreateStoreRequest>,
) -> Result<(StatusCode, ApiJson<StoreCreatedResponse>)> {
    if caller.role != Role::StoreOwner {
        return Err(AppError::Forbidden(
            "Only store owners can create stores".to_string(),
        ));
    }

    let new_store = body.validate()?;
    let store = StoreRepository::new(state.pool())
        .create(caller.id, &new_store)
        .await?;

    tracing::info!(store_id = %store.id, owner_id = %caller.id, "store created");

    Ok((
        StatusCode::CREATED,
        ApiJson(StoreCreatedResponse {
            message: "Store created successfully",
            store,
        }),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_query_defaults() {
        let filter = StoreListQuery::default().into_filter();
        assert!(filter.search.is_none());
        assert_eq!(filter.sort, StoreSortColumn::Name);
        assert_eq!(filter.order, SortOrder::Asc);
    }

    #[test]
    fn test_query_parses_sort() {
        let filter = StoreListQuery {
            search: Some("  books ".to_string()),
            sort_by: Some("average_rating".to_string()),
            sort_order: Some("DESC".to_string()),
        }
        .into_filter();
        assert_eq!(filter.search.as_deref(), Some("books"));
        assert_eq!(filter.sort, StoreSortColumn::AverageRating);
        assert_eq!(filter.order, SortOrder::Desc);
    }

    #[test]
    fn test_blank_search_is_ignored() {
        assert_eq!(non_blank(Some("   ".to_string())), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn test_create_store_validation() {
        let body = CreateStoreRequest {
            name: "Tiny".to_string(),
            email: "shop@example.org".to_string(),
            address: "1 Quay Street".to_string(),
        };
        let errors = body.validate().unwrap_err();
        assert_eq!(errors.0.len(), 1);
        assert_eq!(errors.0[0].field, "name");
    }
}
