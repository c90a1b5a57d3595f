//! JSON REST API for Tierra user records.
//!
//! Exposes an axum [`Router`] backed by any [`DocumentStore`]. Every response
//! body has the gateway's outcome shape, `{"success": .., "data"|"error": ..}`.
//! Payloads always sit under `data`, including writes: a create answers
//! `{"success": true, "data": {"id": ..}}` rather than a top-level `id`, and
//! update and delete answer `{"success": true, "data": null}`.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tierra_api::api_router(state))
//! ```

pub mod error;
pub mod signin;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use tierra_core::{
  gateway::UserGateway,
  signin::{ProfileSync, SignIn},
  store::DocumentStore,
};

pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub gateway: UserGateway<S>,
  pub sign_in: Arc<SignIn<S>>,
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self { gateway: self.gateway.clone(), sign_in: Arc::clone(&self.sign_in) }
  }
}

impl<S: DocumentStore> ApiState<S> {
  pub fn new(gateway: UserGateway<S>, policy: ProfileSync) -> Self {
    let sign_in = Arc::new(SignIn::new(gateway.clone(), policy));
    Self { gateway, sign_in }
  }
}

/// Build the API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: DocumentStore + 'static,
{
  Router::new()
    .route("/users", post(users::create::<S>))
    .route(
      "/users/{id}",
      get(users::get_one::<S>)
        .patch(users::update::<S>)
        .delete(users::delete::<S>),
    )
    .route("/sign-in", post(signin::complete::<S>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
