//! Error type for `tierra-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// A stored `fields_json` column did not hold a JSON object.
  #[error("document {0:?} is not a JSON object")]
  NotAnObject(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
