//! Handlers for `/users` endpoints.
//!
//! | Method   | Path          | Notes |
//! |----------|---------------|-------|
//! | `POST`   | `/users`      | Body: `{"email":..,"name":..,"photo":..}`; 201 |
//! | `GET`    | `/users/:id`  | 404 if not found |
//! | `PATCH`  | `/users/:id`  | Body: any subset of the fields; 404 if missing |
//! | `DELETE` | `/users/:id`  | Succeeds for absent ids |
//!
//! Create returns the new id as `data.id`; update and delete return
//! `data: null`.

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
};
use serde::Serialize;
use tierra_core::{
  document::Document,
  store::DocumentStore,
  user::{UserId, UserRecord},
};

use crate::{
  ApiState,
  error::{ApiError, OutcomeResponse},
};

#[derive(Debug, Serialize)]
pub struct Created {
  pub id: UserId,
}

/// `POST /users`
pub async fn create<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  body: Result<Json<Document>, JsonRejection>,
) -> Result<OutcomeResponse<Created>, ApiError> {
  let Json(doc) = body?;
  let outcome = state.gateway.create_document(doc).await;
  Ok(OutcomeResponse::created(outcome.map(|id| Created { id })))
}

/// `GET /users/:id`
pub async fn get_one<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> OutcomeResponse<UserRecord> {
  OutcomeResponse::ok(state.gateway.fetch_by_id(&id).await)
}

/// `PATCH /users/:id`
pub async fn update<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
  body: Result<Json<Document>, JsonRejection>,
) -> Result<OutcomeResponse<()>, ApiError> {
  let Json(doc) = body?;
  Ok(OutcomeResponse::ok(state.gateway.update_document(&id, doc).await))
}

/// `DELETE /users/:id`
pub async fn delete<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  Path(id): Path<String>,
) -> OutcomeResponse<()> {
  OutcomeResponse::ok(state.gateway.delete(&id).await)
}
