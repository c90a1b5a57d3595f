//! Error types for `tierra-core`.

use thiserror::Error;

use crate::user::UserId;

/// A document or identifier was rejected at the gateway boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("field {0:?} must be a string")]
  NotAString(String),

  #[error("unknown field: {0:?}")]
  UnknownField(String),

  #[error("update contains no fields")]
  EmptyPatch,

  #[error("invalid record identifier: {0:?}")]
  InvalidId(String),
}

/// The failure detail attached to an unsuccessful [`crate::Outcome`].
///
/// Absence on fetch is not a failure; it is [`crate::Outcome::NotFound`].
#[derive(Debug, Error)]
pub enum Failure {
  /// The target of an update does not exist.
  #[error("user {0} not found")]
  Missing(UserId),

  #[error("invalid user record: {0}")]
  Invalid(#[from] ValidationError),

  /// Any error raised by the underlying store during the round trip.
  #[error("store operation failed: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Failure {
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }

  /// Stable machine-readable tag for the failure class.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Missing(_) => "missing",
      Self::Invalid(_) => "invalid",
      Self::Store(_) => "store",
    }
  }
}

pub type Result<T, E = ValidationError> = std::result::Result<T, E>;
