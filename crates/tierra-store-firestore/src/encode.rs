//! Conversion between plain JSON documents and Firestore typed values.
//!
//! Firestore wraps every value in a single-key object naming its type, e.g.
//! `{"stringValue": "a"}` or `{"integerValue": "42"}` (64-bit integers travel
//! as strings). Timestamps and references decode to their string form.

use serde_json::{Map, Number, Value, json};
use tierra_core::document::Document;

use crate::{Error, Result};

// ─── Encoding ────────────────────────────────────────────────────────────────

pub fn encode_value(value: &Value) -> Value {
  match value {
    Value::Null => json!({ "nullValue": null }),
    Value::Bool(b) => json!({ "booleanValue": b }),
    Value::Number(n) => match n.as_i64() {
      Some(i) => json!({ "integerValue": i.to_string() }),
      None => json!({ "doubleValue": n.as_f64() }),
    },
    Value::String(s) => json!({ "stringValue": s }),
    Value::Array(items) => {
      let values: Vec<Value> = items.iter().map(encode_value).collect();
      json!({ "arrayValue": { "values": values } })
    }
    Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
  }
}

/// The `fields` object of a Firestore document.
pub fn encode_fields(doc: &Document) -> Value {
  Value::Object(
    doc
      .iter()
      .map(|(k, v)| (k.clone(), encode_value(v)))
      .collect(),
  )
}

// ─── Decoding ────────────────────────────────────────────────────────────────

pub fn decode_value(value: &Value) -> Result<Value> {
  let Some((kind, inner)) = value.as_object().and_then(|o| o.iter().next()) else {
    return Err(Error::Decode(value.to_string()));
  };

  match kind.as_str() {
    "nullValue" => Ok(Value::Null),
    "booleanValue" => inner
      .as_bool()
      .map(Value::Bool)
      .ok_or_else(|| Error::Decode(value.to_string())),
    "integerValue" => {
      // Usually a string, but tolerate a bare number.
      let parsed = match inner {
        Value::String(s) => s.parse::<i64>().ok(),
        other => other.as_i64(),
      };
      parsed
        .map(|i| Value::Number(i.into()))
        .ok_or_else(|| Error::Decode(value.to_string()))
    }
    "doubleValue" => inner
      .as_f64()
      .and_then(Number::from_f64)
      .map(Value::Number)
      .ok_or_else(|| Error::Decode(value.to_string())),
    "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => inner
      .as_str()
      .map(|s| Value::String(s.to_owned()))
      .ok_or_else(|| Error::Decode(value.to_string())),
    "arrayValue" => {
      let items = match inner.get("values") {
        Some(Value::Array(items)) => items.iter().map(decode_value).collect::<Result<_>>()?,
        // An empty array omits `values` entirely.
        _ => Vec::new(),
      };
      Ok(Value::Array(items))
    }
    "mapValue" => {
      let fields = inner.get("fields").cloned().unwrap_or_else(|| json!({}));
      Ok(Value::Object(decode_fields(&fields)?))
    }
    other => Err(Error::Decode(format!("unsupported value type {other:?}"))),
  }
}

/// Decode the `fields` object of a Firestore document.
pub fn decode_fields(fields: &Value) -> Result<Document> {
  let Some(map) = fields.as_object() else {
    return Err(Error::Decode(fields.to_string()));
  };
  let mut doc = Map::new();
  for (k, v) in map {
    doc.insert(k.clone(), decode_value(v)?);
  }
  Ok(doc)
}

/// The last path segment of a document resource name,
/// `projects/{p}/databases/{d}/documents/{collection}/{id}`.
pub fn id_from_name(name: &str) -> Option<&str> {
  name.rsplit('/').next().filter(|s| !s.is_empty())
}

/// Quote a field path segment unless it is a simple identifier.
pub fn field_path(key: &str) -> String {
  let mut chars = key.chars();
  let simple = chars
    .next()
    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
    && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
  if simple {
    key.to_owned()
  } else {
    format!("`{}`", key.replace('\\', "\\\\").replace('`', "\\`"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn strings_and_integers() {
    assert_eq!(encode_value(&json!("a")), json!({ "stringValue": "a" }));
    assert_eq!(encode_value(&json!(42)), json!({ "integerValue": "42" }));
    assert_eq!(decode_value(&json!({ "integerValue": "42" })).unwrap(), json!(42));
  }

  #[test]
  fn nested_document_roundtrip() {
    let Value::Object(doc) = json!({
      "email": "a@x.com",
      "score": 1.5,
      "tags":  ["x", true, null],
      "meta":  { "level": 3 },
    }) else {
      unreachable!()
    };
    let encoded = encode_fields(&doc);
    assert_eq!(encoded["tags"]["arrayValue"]["values"][1], json!({ "booleanValue": true }));
    assert_eq!(decode_fields(&encoded).unwrap(), doc);
  }

  #[test]
  fn timestamps_decode_as_strings() {
    let v = json!({ "timestampValue": "2024-01-01T00:00:00Z" });
    assert_eq!(decode_value(&v).unwrap(), json!("2024-01-01T00:00:00Z"));
  }

  #[test]
  fn empty_array_and_map() {
    assert_eq!(decode_value(&json!({ "arrayValue": {} })).unwrap(), json!([]));
    assert_eq!(decode_value(&json!({ "mapValue": {} })).unwrap(), json!({}));
  }

  #[test]
  fn unknown_value_type_is_an_error() {
    let err = decode_value(&json!({ "geoPointValue": { "latitude": 1 } })).unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
  }

  #[test]
  fn id_is_last_name_segment() {
    let name = "projects/p/databases/(default)/documents/users/abc123";
    assert_eq!(id_from_name(name), Some("abc123"));
    assert_eq!(id_from_name("projects/p/"), None);
  }

  #[test]
  fn field_paths_quote_when_needed() {
    assert_eq!(field_path("email"), "email");
    assert_eq!(field_path("first name"), "`first name`");
    assert_eq!(field_path("9lives"), "`9lives`");
  }
}
