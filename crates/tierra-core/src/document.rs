//! Untyped documents, as exchanged with a [`crate::store::DocumentStore`].

use serde_json::{Map, Value};

/// A flat field mapping. Stores never interpret it.
pub type Document = Map<String, Value>;

/// Overwrite the top-level keys of `target` with those of `fields`.
///
/// Keys absent from `fields` are left untouched.
pub fn merge_into(target: &mut Document, fields: Document) {
  for (key, value) in fields {
    target.insert(key, value);
  }
}
