//! The `DocumentStore` trait and store-side helpers.
//!
//! The trait is implemented by storage backends (`tierra-store-sqlite`,
//! `tierra-store-firestore`, and [`crate::memory::MemoryStore`]). The gateway
//! depends on this abstraction, not on any concrete backend.

use std::future::Future;

use rand_core::{OsRng, RngCore as _};

use crate::document::Document;

/// Length of a store-generated document id.
pub const AUTO_ID_LEN: usize = 20;

const AUTO_ID_ALPHABET: &[u8] =
  b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Generate a random 20-character alphanumeric document id.
///
/// Bytes above the largest multiple of the alphabet size are discarded so
/// every character is equally likely.
pub fn auto_id() -> String {
  let alphabet_len = AUTO_ID_ALPHABET.len();
  let max_multiple = (256 / alphabet_len) * alphabet_len;

  let mut id = String::with_capacity(AUTO_ID_LEN);
  let mut buf = [0u8; 40];
  while id.len() < AUTO_ID_LEN {
    OsRng.fill_bytes(&mut buf);
    for &b in buf.iter().filter(|&&b| (b as usize) < max_multiple) {
      if id.len() == AUTO_ID_LEN {
        break;
      }
      id.push(AUTO_ID_ALPHABET[b as usize % alphabet_len] as char);
    }
  }
  id
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a remote or local document database.
///
/// Documents live in named, flat collections and are addressed by opaque
/// string ids that the store assigns on insert. Each method is one
/// independent round trip; no ordering is guaranteed between calls in flight.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Point lookup. Returns `None` if no document has `id`.
  fn get<'a>(
    &'a self,
    collection: &'a str,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + 'a;

  /// Insert a new document and return its store-generated id.
  fn insert<'a>(
    &'a self,
    collection: &'a str,
    document: Document,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;

  /// Merge `fields` into the top level of an existing document.
  ///
  /// Returns `false` if no document has `id`; never creates one.
  fn merge<'a>(
    &'a self,
    collection: &'a str,
    id: &'a str,
    fields: Document,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Delete a document. Deleting an absent id succeeds.
  fn delete<'a>(
    &'a self,
    collection: &'a str,
    id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn auto_id_shape() {
    let id = auto_id();
    assert_eq!(id.len(), AUTO_ID_LEN);
    assert!(id.bytes().all(|b| b.is_ascii_alphanumeric()));
  }

  #[test]
  fn auto_ids_differ() {
    assert_ne!(auto_id(), auto_id());
  }
}
