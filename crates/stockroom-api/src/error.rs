//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use stockroom_core::Entity;
use thiserror::Error;
use uuid::Uuid;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<stockroom_core::Error> for ApiError {
  fn from(err: stockroom_core::Error) -> Self {
    use stockroom_core::Error as E;
    match err {
      e @ E::NotFound { .. } => Self::NotFound(e.to_string()),
      E::Validation(message) => Self::BadRequest(message),
      E::Storage(source) => {
        tracing::warn!(error = %source, "storage failure");
        Self::Store(source)
      }
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

/// Convert a backend error through the core error kinds.
pub(crate) fn backend<E: Into<stockroom_core::Error>>(err: E) -> ApiError {
  ApiError::from(err.into())
}

/// Turn a missing row into a 404.
pub(crate) fn found<T>(
  value: Option<T>,
  entity: Entity,
  id: Uuid,
) -> Result<T, ApiError> {
  value.ok_or_else(|| stockroom_core::Error::not_found(entity, id).into())
}

/// Turn a failed name lookup into a 404.
pub(crate) fn found_named<T>(
  value: Option<T>,
  entity: Entity,
  name: &str,
) -> Result<T, ApiError> {
  value.ok_or_else(|| ApiError::NotFound(format!("{entity} named {name:?} not found")))
}

/// 204 when a row was removed, 404 otherwise.
pub(crate) fn deleted(
  removed: bool,
  entity: Entity,
  id: Uuid,
) -> Result<StatusCode, ApiError> {
  if removed {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(stockroom_core::Error::not_found(entity, id).into())
  }
}
