//! Error type for `tierra-store-firestore`.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// Firestore answered with a non-success status.
  #[error("firestore returned {status}: {body}")]
  Status { status: StatusCode, body: String },

  #[error("invalid firestore base url: {0}")]
  BaseUrl(String),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// A Firestore value could not be mapped to JSON.
  #[error("cannot decode firestore value: {0}")]
  Decode(String),

  #[error("firestore response has no document name")]
  MissingName,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
