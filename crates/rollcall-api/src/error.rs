//! API error types and their HTTP mapping.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error produced while handling an API request.
///
/// `BadRequest` carries the validation message verbatim; clients surface it
/// directly, so it has to read as an instruction, not a diagnostic.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match self {
      ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
      ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
      ApiError::Conflict(message) => (StatusCode::CONFLICT, message),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
