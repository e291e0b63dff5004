//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error leaves the API as `{"success": false, "message": "..."}` with
//! the status dictated by the taxonomy: validation → 400, missing/invalid
//! token → 401, non-owner → 403, absent resource → 404, constraint
//! violation → 409, anything else → 500.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  Unauthorized(String),

  #[error("{0}")]
  Forbidden(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("internal error: {0}")]
  Internal(String),
}

impl From<trellis_core::Error> for ApiError {
  fn from(err: trellis_core::Error) -> Self {
    use trellis_core::Error as E;
    match &err {
      E::UserNotFound(_)
      | E::DomainNotFound(_)
      | E::DomainSlugNotFound(_)
      | E::NodeTypeNotFound(_)
      | E::EdgeTypeNotFound(_)
      | E::NodeNotFound(_)
      | E::NodeSlugNotFound(_)
      | E::EdgeNotFound(_) => ApiError::NotFound(err.to_string()),

      E::NotOwner(_) => ApiError::Forbidden(err.to_string()),

      E::SelfLoop | E::MissingField(_) | E::TypeDomainMismatch { .. } => {
        ApiError::BadRequest(err.to_string())
      }

      E::Conflict(_) | E::Restricted(_) => ApiError::Conflict(err.to_string()),

      E::Storage(_) | E::Serialization(_) => ApiError::Internal(err.to_string()),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
      ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = json!({ "success": false, "message": self.to_string() });
    (status, Json(body)).into_response()
  }
}
