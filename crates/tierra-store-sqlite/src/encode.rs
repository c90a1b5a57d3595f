//! Encoding helpers between documents and SQLite column text.
//!
//! Timestamps are stored as RFC 3339 strings and documents as compact JSON.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tierra_core::document::Document;

use crate::{Error, Result};

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn encode_fields(doc: &Document) -> Result<String> {
  Ok(serde_json::to_string(doc)?)
}

/// `id` is only used for the error message.
pub fn decode_fields(id: &str, s: &str) -> Result<Document> {
  match serde_json::from_str(s)? {
    Value::Object(map) => Ok(map),
    _ => Err(Error::NotAnObject(id.to_owned())),
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn fields_roundtrip() {
    let Value::Object(doc) = json!({ "email": "a@x.com", "n": 1 }) else {
      unreachable!()
    };
    let text = encode_fields(&doc).unwrap();
    assert_eq!(decode_fields("x", &text).unwrap(), doc);
  }

  #[test]
  fn non_object_is_rejected() {
    let err = decode_fields("x", "[1, 2]").unwrap_err();
    assert!(matches!(err, Error::NotAnObject(id) if id == "x"));
  }
}
