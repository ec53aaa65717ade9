//! Request extractors shared by every handler.

use axum::extract::FromRequest;

use crate::error::ApiError;

/// `axum::Json`, but body rejections become [`ApiError::BadRequest`] so every
/// error leaves the API in the same `{"message": ...}` shape.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Parse a numeric path id; anything else is a 400.
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
  raw
    .parse()
    .map_err(|_| ApiError::BadRequest(format!("invalid id: {raw:?}")))
}
