//! Extractors that reject with `AppError` so malformed requests get the same
//! JSON error body as every other failure.

use axum::extract::{FromRequest, FromRequestParts};
use serde::Serialize;

use crate::error::AppError;

/// `axum::Json` with a JSON 400 rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

impl<T: Serialize> axum::response::IntoResponse for ApiJson<T> {
    fn into_response(self) -> axum::response::Response {
        axum::Json(self.0).into_response()
    }
}

/// `axum::extract::Path` with a JSON 400 rejection.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);
