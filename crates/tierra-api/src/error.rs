//! Mapping gateway outcomes and request errors onto HTTP responses.

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tierra_core::{Failure, Outcome, outcome::FailureDetail};

/// Status code for a failed outcome.
pub fn failure_status(failure: &Failure) -> StatusCode {
  match failure {
    Failure::Invalid(_) => StatusCode::BAD_REQUEST,
    Failure::Missing(_) => StatusCode::NOT_FOUND,
    Failure::Store(_) => StatusCode::BAD_GATEWAY,
  }
}

/// An [`Outcome`] rendered with its wire shape; `status` applies on success.
pub struct OutcomeResponse<T> {
  pub status:  StatusCode,
  pub outcome: Outcome<T>,
}

impl<T> OutcomeResponse<T> {
  pub fn ok(outcome: Outcome<T>) -> Self { Self { status: StatusCode::OK, outcome } }

  pub fn created(outcome: Outcome<T>) -> Self {
    Self { status: StatusCode::CREATED, outcome }
  }
}

impl<T: Serialize> IntoResponse for OutcomeResponse<T> {
  fn into_response(self) -> Response {
    let status = match &self.outcome {
      Outcome::Success(_) => self.status,
      Outcome::NotFound => StatusCode::NOT_FOUND,
      Outcome::Failure(f) => failure_status(f),
    };
    (status, Json(self.outcome)).into_response()
  }
}

/// An error raised before or after the gateway call.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("bad request: {0}")]
  BadRequest(String),

  /// The profile write failed under the `required` sync policy.
  #[error("profile sync failed: {0}")]
  ProfileSync(Failure),
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self { Self::BadRequest(rejection.body_text()) }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, detail) = match &self {
      ApiError::BadRequest(m) => (
        StatusCode::BAD_REQUEST,
        FailureDetail { kind: "invalid", message: m.clone() },
      ),
      ApiError::ProfileSync(f) => (StatusCode::BAD_GATEWAY, FailureDetail::from(f)),
    };
    (status, Json(json!({ "success": false, "error": detail }))).into_response()
  }
}
