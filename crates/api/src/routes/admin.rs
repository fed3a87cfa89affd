//! Administrator route handlers.
//!
//! Platform totals, user management and store management. Every handler
//! requires the `admin` role.

use axum::{
    extract::{Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use ratestore_core::validation::{
    validate_address, validate_email, validate_password, validate_role, validate_user_name,
};
use ratestore_core::{PageRequest, Pagination, Role, SortOrder, UserId, ValidationErrors};

use super::stores::{CreateStoreRequest, StoreCreatedResponse, non_blank};
use crate::db::{self, PlatformStats, StoreRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAdmin;
use crate::models::{
    AdminStoreFilter, NewStore, AdminStoreListing, AdminStoreSortColumn, RecentStore, StoreSummary, User,
    UserFilter, UserIdentity, UserSortColumn, UserSummary,
};
use crate::services::auth::{AuthService, Registration};
use crate::state::AppState;

/// Newest users and stores shown on the dashboard.
const RECENT_LIMIT: i64 = 5;

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for the users list.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListQuery {
    pub search: Option<String>,
    pub role: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl UserListQuery {
    /// Build the filter. `all` or an empty role means every role.
    fn filter(&self) -> Result<UserFilter> {
        let role = match self.role.as_deref().map(str::trim) {
            None | Some("" | "all") => None,
            Some(raw) => Some(
                raw.parse::<Role>()
                    .map_err(|_| AppError::BadRequest("Invalid role".to_string()))?,
            ),
        };

        Ok(UserFilter {
            search: non_blank(self.search.clone()),
            role,
            sort: UserSortColumn::from_param(self.sort_by.as_deref()),
            order: SortOrder::from_param(self.sort_order.as_deref(), SortOrder::Asc),
        })
    }

    fn page(&self) -> PageRequest {
        PageRequest::from_query(self.page.as_deref(), self.limit.as_deref())
    }
}

/// Query parameters for the stores list.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStoreListQuery {
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl AdminStoreListQuery {
    fn filter(&self) -> AdminStoreFilter {
        AdminStoreFilter {
            search: non_blank(self.search.clone()),
            sort: AdminStoreSortColumn::from_param(self.sort_by.as_deref()),
            order: SortOrder::from_param(self.sort_order.as_deref(), SortOrder::Asc),
        }
    }

    fn page(&self) -> PageRequest {
        PageRequest::from_query(self.page.as_deref(), self.limit.as_deref())
    }
}

// =============================================================================
// Request Types
// =============================================================================

/// Admin user creation body. Any role may be assigned.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub address: Option<String>,
    pub role: Option<String>,
}

impl CreateUserRequest {
    fn validate(self) -> std::result::Result<Registration, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        let name = errors.check("name", validate_user_name(&self.name));
        let email = errors.check("email", validate_email(&self.email));
        errors.check("password", validate_password(&self.password));
        let address = errors.check("address", validate_address(self.address.as_deref()));
        let role = errors.check("role", validate_role(self.role.as_deref()));

        match (name, email, address, role) {
            (Some(name), Some(email), Some(address), Some(role)) if errors.is_empty() => {
                Ok(Registration {
                    name,
                    email,
                    password: self.password,
                    address,
                    role,
                    store: None,
                })
            }
            _ => Err(errors),
        }
    }
}

/// Role change body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateRoleRequest {
    pub role: Option<String>,
}

/// Admin store creation body.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AdminCreateStoreRequest {
    pub name: String,
    pub email: String,
    pub address: String,
    pub owner_id: Option<OwnerIdInput>,
}

/// `ownerId` as sent by clients: a number, or the string value of a
/// `<select>` (`"3"`, or `""` when nothing is chosen).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OwnerIdInput {
    Id(i32),
    Text(String),
}

impl OwnerIdInput {
    /// `Ok(None)` when blank, `Err(())` when not an integer.
    fn parse(&self) -> std::result::Result<Option<i32>, ()> {
        match self {
            Self::Id(id) => Ok(Some(*id)),
            Self::Text(raw) if raw.trim().is_empty() => Ok(None),
            Self::Text(raw) => raw.trim().parse().map(Some).map_err(|_| ()),
        }
    }
}

impl AdminCreateStoreRequest {
    /// Validate the store fields and owner, collecting every failure.
    fn validate(self) -> std::result::Result<(NewStore, UserId), ValidationErrors> {
        let store_fields = CreateStoreRequest {
            name: self.name,
            email: self.email,
            address: self.address,
        };
        let (new_store, mut errors) = match store_fields.validate() {
            Ok(new_store) => (Some(new_store), ValidationErrors::default()),
            Err(errors) => (None, errors),
        };

        let owner_id = match self.owner_id.as_ref().map(OwnerIdInput::parse) {
            Some(Ok(Some(id))) => Some(id),
            None | Some(Ok(None)) => {
                errors.push("ownerId", "Owner is required");
                None
            }
            Some(Err(())) => {
                errors.push("ownerId", "Owner must be a valid user id");
                None
            }
        };

        match (new_store, owner_id) {
            (Some(new_store), Some(owner_id)) if errors.is_empty() => {
                Ok((new_store, UserId::new(owner_id)))
            }
            _ => Err(errors),
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub stats: PlatformStats,
    pub recent_users: Vec<UserSummary>,
    pub recent_stores: Vec<RecentStore>,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct UserCreatedResponse {
    pub message: &'static str,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct UserDetailResponse {
    pub user: User,
    /// The owner's store; `null` for other roles.
    pub store: Option<StoreSummary>,
}

#[derive(Debug, Serialize)]
pub struct RoleUpdatedResponse {
    pub message: &'static str,
    pub user: UserIdentity,
}

#[derive(Debug, Serialize)]
pub struct StoreListResponse {
    pub stores: Vec<AdminStoreListing>,
    pub pagination: Pagination,
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

// =============================================================================
// Handlers
// =============================================================================

/// Platform totals plus the newest users and stores.
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<ApiJson<DashboardResponse>> {
    let stats = db::platform_stats(state.pool()).await?;
    let recent_users = UserRepository::new(state.pool()).recent(RECENT_LIMIT).await?;
    let recent_stores = StoreRepository::new(state.pool())
        .recent(RECENT_LIMIT)
        .await?;

    Ok(ApiJson(DashboardResponse {
        stats,
        recent_users,
        recent_stores,
    }))
}

/// Search, filter and page through users.
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<UserListQuery>,
) -> Result<ApiJson<UserListResponse>> {
    let filter = query.filter()?;
    let page = query.page();

    let (users, total) = UserRepository::new(state.pool())
        .list(&filter, page)
        .await?;

    Ok(ApiJson(UserListResponse {
        users,
        pagination: page.paginate(total, "totalUsers"),
    }))
}

/// Create a user with any role.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(body): ApiJson<CreateUserRequest>,
) -> Result<(StatusCode, ApiJson<UserCreatedResponse>)> {
    let registration = body.validate()?;

    let (user, _) = AuthService::new(state.pool(), state.config().bcrypt_cost)
        .register(registration)
        .await?;

    tracing::info!(admin_id = %admin.id, user_id = %user.id, role = %user.role, "admin created user");

    Ok((
        StatusCode::CREATED,
        ApiJson(UserCreatedResponse {
            message: "User created successfully",
            user,
        }),
    ))
}

/// One user, with their store when they own one.
pub async fn show_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    ApiPath(user_id): ApiPath<i32>,
) -> Result<ApiJson<UserDetailResponse>> {
    let user = UserRepository::new(state.pool())
        .get_by_id(UserId::new(user_id))
        .await?
        .ok_or_else(user_not_found)?;

    let store = if user.role == Role::StoreOwner {
        StoreRepository::new(state.pool())
            .summary_for_owner(user.id)
            .await?
    } else {
        None
    };

    Ok(ApiJson(UserDetailResponse { user, store }))
}

/// Change a user's role. Takes effect on the user's next request.
pub async fn update_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiPath(user_id): ApiPath<i32>,
    ApiJson(body): ApiJson<UpdateRoleRequest>,
) -> Result<ApiJson<RoleUpdatedResponse>> {
    let role = body
        .role
        .as_deref()
        .and_then(|r| r.parse::<Role>().ok())
        .ok_or_else(|| AppError::BadRequest("Invalid role".to_string()))?;

    let user = UserRepository::new(state.pool())
        .update_role(UserId::new(user_id), role)
        .await?
        .ok_or_else(user_not_found)?;

    tracing::info!(admin_id = %admin.id, user_id = %user.id, role = %role, "role updated");

    Ok(ApiJson(RoleUpdatedResponse {
        message: "User role updated successfully",
        user,
    }))
}

/// Search and page through stores with owner names and aggregates.
pub async fn list_stores(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(query): Query<AdminStoreListQuery>,
) -> Result<ApiJson<StoreListResponse>> {
    let filter = query.filter();
    let page = query.page();

    let (stores, total) = StoreRepository::new(state.pool())
        .list_admin(&filter, page)
        .await?;

    Ok(ApiJson(StoreListResponse {
        stores,
        pagination: page.paginate(total, "totalStores"),
    }))
}

/// Create a store on behalf of an existing store owner.
pub async fn create_store(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    ApiJson(body): ApiJson<AdminCreateStoreRequest>,
) -> Result<(StatusCode, ApiJson<StoreCreatedResponse>)> {
    let (new_store, owner_id) = body.validate()?;

    let owner = UserRepository::new(state.pool())
        .get_identity(owner_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Owner not found".to_string()))?;

    if owner.role != Role::StoreOwner {
        return Err(AppError::BadRequest(
            "Selected user is not a store owner".to_string(),
        ));
    }

    let store = StoreRepository::new(state.pool())
        .create(owner.id, &new_store)
        .await?;

    tracing::info!(admin_id = %admin.id, store_id = %store.id, owner_id = %owner.id, "admin created store");

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
    fn test_role_filter_all_means_none() {
        for raw in [None, Some(""), Some("all")] {
            let query = UserListQuery {
                role: raw.map(String::from),
                ..UserListQuery::default()
            };
            assert!(query.filter().unwrap().role.is_none());
        }
    }

    #[test]
    fn test_role_filter_exact() {
        let query = UserListQuery {
            role: Some("store_owner".to_string()),
            search: Some("alex".to_string()),
            ..UserListQuery::default()
        };
        let filter = query.filter().unwrap();
        assert_eq!(filter.role, Some(Role::StoreOwner));
        assert_eq!(filter.search.as_deref(), Some("alex"));
    }

    #[test]
    fn test_unknown_role_filter_rejected() {
        let query = UserListQuery {
            role: Some("superuser".to_string()),
            ..UserListQuery::default()
        };
        assert!(matches!(query.filter(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_admin_store_sort_accepts_prefixed_column() {
        let query = AdminStoreListQuery {
            sort_by: Some("s.email".to_string()),
            sort_order: Some("desc".to_string()),
            ..AdminStoreListQuery::default()
        };
        let filter = query.filter();
        assert_eq!(filter.sort, AdminStoreSortColumn::Email);
        assert_eq!(filter.order, SortOrder::Desc);
    }

    #[test]
    fn test_admin_may_assign_any_role() {
        let body = CreateUserRequest {
            name: "Morgan Ellis".to_string(),
            email: "morgan@example.org".to_string(),
            password: "Adm1n!pass".to_string(),
            address: None,
            role: Some("admin".to_string()),
        };
        assert_eq!(body.validate().unwrap().role, Role::Admin);
    }

    #[test]
    fn test_create_user_rejects_unknown_role() {
        let body = CreateUserRequest {
            name: "Morgan Ellis".to_string(),
            email: "morgan@example.org".to_string(),
            password: "Adm1n!pass".to_string(),
            address: None,
            role: Some("owner".to_string()),
        };
        let errors = body.validate().unwrap_err();
        assert_eq!(errors.0.len(), 1);
        assert_eq!(errors.0[0].field, "role");
    }

    fn store_body(owner_id: serde_json::Value) -> AdminCreateStoreRequest {
        serde_json::from_value(serde_json::json!({
            "name": "Harbour Books",
            "email": "books@example.org",
            "address": "1 Quay Street",
            "ownerId": owner_id
        }))
        .unwrap()
    }

    fn owner_messages(errors: &ValidationErrors) -> Vec<&str> {
        errors
            .0
            .iter()
            .filter(|e| e.field == "ownerId")
            .map(|e| e.message.as_str())
            .collect()
    }

    #[test]
    fn test_owner_id_accepts_select_string() {
        let (store, owner_id) = store_body(serde_json::json!("3")).validate().unwrap();
        assert_eq!(owner_id, UserId::new(3));
        assert_eq!(store.name, "Harbour Books");
    }

    #[test]
    fn test_owner_id_accepts_number() {
        let (_, owner_id) = store_body(serde_json::json!(7)).validate().unwrap();
        assert_eq!(owner_id, UserId::new(7));
    }

    #[test]
    fn test_blank_or_missing_owner_is_required() {
        for owner_id in [serde_json::json!(""), serde_json::Value::Null] {
            let errors = store_body(owner_id).validate().unwrap_err();
            assert_eq!(owner_messages(&errors), vec!["Owner is required"]);
        }
    }

    #[test]
    fn test_non_numeric_owner_is_field_error() {
        let errors = store_body(serde_json::json!("abc")).validate().unwrap_err();
        assert_eq!(owner_messages(&errors), vec!["Owner must be a valid user id"]);
    }

    #[test]
    fn test_store_and_owner_errors_reported_together() {
        let body: AdminCreateStoreRequest = serde_json::from_value(serde_json::json!({
            "name": "Bk",
            "email": "nope",
            "address": "1 Quay Street"
        }))
        .unwrap();
        let errors = body.validate().unwrap_err();
        let fields: Vec<&str> = errors.0.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "email", "ownerId"]);
    }
}
