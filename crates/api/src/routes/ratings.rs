//! Rating submission route handlers.

use axum::extract::State;
use serde::{Deserialize, Serialize};

use ratestore_core::validation::validate_rating;
use ratestore_core::{FieldError, StoreId, ValidationErrors};

use crate::db::{RatingRepository, RepositoryError, StoreRepository};
use crate::error::{AppError, Result};
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::RequireAuth;
use crate::models::Rating;
use crate::state::AppState;

/// Rating submission body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingRequest {
    pub store_id: i32,
    pub rating: i64,
}

#[derive(Debug, Serialize)]
pub struct RatingSubmittedResponse {
    pub message: &'static str,
    pub rating: Rating,
}

#[derive(Debug, Serialize)]
pub struct MyRatingResponse {
    pub rating: Option<Rating>,
}

fn store_not_found() -> AppError {
    AppError::NotFound("Store not found".to_string())
}

/// Create or replace the caller's rating for a store.
pub async fn submit(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    ApiJson(body): ApiJson<SubmitRatingRequest>,
) -> Result<ApiJson<RatingSubmittedResponse>> {
    let stars = validate_rating(body.rating)
        .map_err(|message| ValidationErrors(vec![FieldError::new("rating", message)]))?;

    let store_id = StoreId::new(body.store_id);
    if !StoreRepository::new(state.pool()).exists(store_id).await? {
        return Err(store_not_found());
    }

    let rating = RatingRepository::new(state.pool())
        .upsert(caller.id, store_id, stars)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => store_not_found(),
            other => AppError::Database(other),
        })?;

    tracing::info!(user_id = %caller.id, store_id = %store_id, stars = stars.get(), "rating submitted");

    Ok(ApiJson(RatingSubmittedResponse {
        message: "Rating submitted successfully",
        rating,
    }))
}

/// The caller's rating for one store, or `null`.
pub async fn mine(
    State(state): State<AppState>,
    RequireAuth(caller): RequireAuth,
    ApiPath(store_id): ApiPath<i32>,
) -> Result<ApiJson<MyRatingResponse>> {
    let rating = RatingRepository::new(state.pool())
        .get_for_user(caller.id, StoreId::new(store_id))
        .await?;

    Ok(ApiJson(MyRatingResponse { rating }))
}
