//! The user record, its identifier, and partial updates.
//!
//! Stores speak untyped [`Document`]s. Everything crossing into the gateway
//! is converted here, so malformed input and malformed stored documents
//! surface as a [`ValidationError`] instead of leaking through.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Result, ValidationError, document::Document};

pub const EMAIL: &str = "email";
pub const NAME: &str = "name";
pub const PHOTO: &str = "photo";

// ─── UserId ──────────────────────────────────────────────────────────────────

/// An opaque, store-assigned record identifier.
///
/// Never generated by the application. It is used as a path segment by
/// remote stores, so it must be non-empty, contain no `/`, not be a dot
/// segment (`.` or `..`), and not match the reserved `__*__` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
  pub fn parse(raw: impl Into<String>) -> Result<Self> {
    let raw = raw.into();
    let reserved = raw.len() >= 4 && raw.starts_with("__") && raw.ends_with("__");
    if raw.is_empty() || raw.contains('/') || raw == "." || raw == ".." || reserved {
      return Err(ValidationError::InvalidId(raw));
    }
    Ok(Self(raw))
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl TryFrom<String> for UserId {
  type Error = ValidationError;

  fn try_from(raw: String) -> Result<Self> { Self::parse(raw) }
}

impl From<UserId> for String {
  fn from(id: UserId) -> Self { id.0 }
}

impl fmt::Display for UserId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl AsRef<str> for UserId {
  fn as_ref(&self) -> &str { &self.0 }
}

// ─── UserRecord ──────────────────────────────────────────────────────────────

/// The profile stored for a person who signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserRecord {
  pub email: String,
  /// Display name.
  pub name:  String,
  /// Avatar image URL.
  pub photo: String,
}

impl UserRecord {
  pub fn new(
    email: impl Into<String>,
    name: impl Into<String>,
    photo: impl Into<String>,
  ) -> Self {
    Self { email: email.into(), name: name.into(), photo: photo.into() }
  }

  /// Convert an untyped document, requiring every field and nothing else.
  pub fn from_document(doc: Document) -> Result<Self> {
    let fields = Fields::from_document(doc)?;
    Ok(Self {
      email: fields.email.ok_or(ValidationError::MissingField(EMAIL))?,
      name:  fields.name.ok_or(ValidationError::MissingField(NAME))?,
      photo: fields.photo.ok_or(ValidationError::MissingField(PHOTO))?,
    })
  }

  pub fn to_document(&self) -> Document {
    let mut doc = Document::new();
    doc.insert(EMAIL.to_owned(), Value::String(self.email.clone()));
    doc.insert(NAME.to_owned(), Value::String(self.name.clone()));
    doc.insert(PHOTO.to_owned(), Value::String(self.photo.clone()));
    doc
  }
}

// ─── UserPatch ───────────────────────────────────────────────────────────────

/// A partial record merged into an existing one by
/// [`crate::gateway::UserGateway::update`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub email: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub photo: Option<String>,
}

impl UserPatch {
  pub fn email(mut self, email: impl Into<String>) -> Self {
    self.email = Some(email.into());
    self
  }

  pub fn name(mut self, name: impl Into<String>) -> Self {
    self.name = Some(name.into());
    self
  }

  pub fn photo(mut self, photo: impl Into<String>) -> Self {
    self.photo = Some(photo.into());
    self
  }

  pub fn is_empty(&self) -> bool {
    self.email.is_none() && self.name.is_none() && self.photo.is_none()
  }

  /// Convert an untyped document. Unknown and non-string fields are
  /// rejected; an empty patch is rejected too.
  pub fn from_document(doc: Document) -> Result<Self> {
    let fields = Fields::from_document(doc)?;
    let patch = Self {
      email: fields.email,
      name:  fields.name,
      photo: fields.photo,
    };
    if patch.is_empty() {
      return Err(ValidationError::EmptyPatch);
    }
    Ok(patch)
  }

  /// Only the fields that are set.
  pub fn to_document(&self) -> Document {
    let mut doc = Document::new();
    let pairs = [(EMAIL, &self.email), (NAME, &self.name), (PHOTO, &self.photo)];
    for (key, value) in pairs {
      if let Some(v) = value {
        doc.insert(key.to_owned(), Value::String(v.clone()));
      }
    }
    doc
  }
}

// ─── Field extraction ────────────────────────────────────────────────────────

#[derive(Default)]
struct Fields {
  email: Option<String>,
  name:  Option<String>,
  photo: Option<String>,
}

impl Fields {
  fn from_document(doc: Document) -> Result<Self> {
    let mut fields = Self::default();
    for (key, value) in doc {
      let slot = match key.as_str() {
        EMAIL => &mut fields.email,
        NAME => &mut fields.name,
        PHOTO => &mut fields.photo,
        _ => return Err(ValidationError::UnknownField(key)),
      };
      match value {
        Value::String(s) => *slot = Some(s),
        _ => return Err(ValidationError::NotAString(key)),
      }
    }
    Ok(fields)
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  fn doc(value: Value) -> Document {
    match value {
      Value::Object(map) => map,
      _ => panic!("not an object"),
    }
  }

  #[test]
  fn user_id_rejects_empty_and_slashes() {
    assert!(UserId::parse("abc123").is_ok());
    assert_eq!(
      UserId::parse("").unwrap_err(),
      ValidationError::InvalidId(String::new())
    );
    assert!(matches!(
      UserId::parse("users/abc"),
      Err(ValidationError::InvalidId(_))
    ));
  }

  #[test]
  fn user_id_rejects_dot_segments_and_reserved_names() {
    for raw in [".", "..", "__x__", "____"] {
      assert_eq!(
        UserId::parse(raw).unwrap_err(),
        ValidationError::InvalidId(raw.to_owned()),
        "{raw:?}"
      );
    }
    for raw in ["...", "a.b", "__x", "x__", "___", "fake1?x=1", "a#b"] {
      assert!(UserId::parse(raw).is_ok(), "{raw:?}");
    }
  }

  #[test]
  fn user_id_deserialises_through_validation() {
    let id: UserId = serde_json::from_value(json!("abc123")).unwrap();
    assert_eq!(id.as_str(), "abc123");
    assert!(serde_json::from_value::<UserId>(json!("")).is_err());
  }

  #[test]
  fn record_from_complete_document() {
    let record = UserRecord::from_document(doc(json!({
      "email": "a@x.com",
      "name":  "A",
      "photo": "http://x/a.png",
    })))
    .unwrap();
    assert_eq!(record, UserRecord::new("a@x.com", "A", "http://x/a.png"));
  }

  #[test]
  fn record_missing_field_is_rejected() {
    let err = UserRecord::from_document(doc(json!({
      "email": "a@x.com",
      "name":  "A",
    })))
    .unwrap_err();
    assert_eq!(err, ValidationError::MissingField(PHOTO));
  }

  #[test]
  fn record_unknown_field_is_rejected() {
    let err = UserRecord::from_document(doc(json!({
      "email": "a@x.com",
      "name":  "A",
      "photo": "p",
      "role":  "admin",
    })))
    .unwrap_err();
    assert_eq!(err, ValidationError::UnknownField("role".into()));
  }

  #[test]
  fn record_non_string_field_is_rejected() {
    let err = UserRecord::from_document(doc(json!({
      "email": "a@x.com",
      "name":  42,
      "photo": "p",
    })))
    .unwrap_err();
    assert_eq!(err, ValidationError::NotAString("name".into()));
  }

  #[test]
  fn record_document_has_exactly_three_fields() {
    let d = UserRecord::new("a@x.com", "A", "p").to_document();
    assert_eq!(d.len(), 3);
    assert_eq!(d[EMAIL], "a@x.com");
  }

  #[test]
  fn empty_patch_is_rejected() {
    let err = UserPatch::from_document(Document::new()).unwrap_err();
    assert_eq!(err, ValidationError::EmptyPatch);
  }

  #[test]
  fn patch_document_carries_only_set_fields() {
    let patch = UserPatch::from_document(doc(json!({ "name": "B" }))).unwrap();
    assert_eq!(patch, UserPatch::default().name("B"));
    assert_eq!(patch.to_document(), doc(json!({ "name": "B" })));
  }
}
