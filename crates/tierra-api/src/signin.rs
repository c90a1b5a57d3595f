//! `POST /sign-in` — record the provider profile and redirect home.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use serde::Serialize;
use tierra_core::{
  signin::{IdentityProfile, SignInError},
  store::DocumentStore,
  user::UserId,
};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct SignInResponse {
  pub redirect: &'static str,
  /// Absent when the profile write failed under best-effort sync.
  pub user_id:  Option<UserId>,
}

pub async fn complete<S: DocumentStore>(
  State(state): State<ApiState<S>>,
  body: Result<Json<IdentityProfile>, JsonRejection>,
) -> Result<Json<SignInResponse>, ApiError> {
  let Json(profile) = body?;
  match state.sign_in.complete(profile).await {
    Ok(landing) => Ok(Json(SignInResponse {
      redirect: landing.route.path(),
      user_id:  landing.user_id,
    })),
    Err(SignInError::ProfileSync(failure)) => Err(ApiError::ProfileSync(failure)),
  }
}
