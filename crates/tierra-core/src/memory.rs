//! [`MemoryStore`] — an in-process [`DocumentStore`] with failure injection.

use std::{
  collections::HashMap,
  sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
};

use thiserror::Error;
use tokio::sync::RwLock;

use crate::{
  document::{Document, merge_into},
  store::{DocumentStore, auto_id},
};

#[derive(Debug, Error)]
pub enum MemoryError {
  #[error("injected store failure")]
  Injected,
}

type Collections = HashMap<String, HashMap<String, Document>>;

#[derive(Default)]
struct Inner {
  collections: RwLock<Collections>,
  fail_next:   AtomicUsize,
  failing:     AtomicBool,
}

/// Documents held in a map behind an async lock.
///
/// Cloning is cheap; clones share the same documents and failure switches.
#[derive(Clone, Default)]
pub struct MemoryStore {
  inner: Arc<Inner>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// Make the next `n` calls fail with [`MemoryError::Injected`].
  pub fn fail_next(&self, n: usize) {
    self.inner.fail_next.store(n, Ordering::SeqCst);
  }

  /// Make every call fail until switched off.
  pub fn set_failing(&self, failing: bool) {
    self.inner.failing.store(failing, Ordering::SeqCst);
  }

  /// Number of documents in `collection`.
  pub async fn len(&self, collection: &str) -> usize {
    self
      .inner
      .collections
      .read()
      .await
      .get(collection)
      .map_or(0, HashMap::len)
  }

  fn check(&self) -> Result<(), MemoryError> {
    if self.inner.failing.load(Ordering::SeqCst) {
      return Err(MemoryError::Injected);
    }
    let consumed = self
      .inner
      .fail_next
      .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    match consumed {
      Ok(_) => Err(MemoryError::Injected),
      Err(_) => Ok(()),
    }
  }
}

impl DocumentStore for MemoryStore {
  type Error = MemoryError;

  async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, MemoryError> {
    self.check()?;
    let collections = self.inner.collections.read().await;
    Ok(collections.get(collection).and_then(|c| c.get(id)).cloned())
  }

  async fn insert(&self, collection: &str, document: Document) -> Result<String, MemoryError> {
    self.check()?;
    let mut collections = self.inner.collections.write().await;
    let docs = collections.entry(collection.to_owned()).or_default();
    let mut id = auto_id();
    while docs.contains_key(&id) {
      id = auto_id();
    }
    docs.insert(id.clone(), document);
    Ok(id)
  }

  async fn merge(
    &self,
    collection: &str,
    id: &str,
    fields: Document,
  ) -> Result<bool, MemoryError> {
    self.check()?;
    let mut collections = self.inner.collections.write().await;
    match collections.get_mut(collection).and_then(|c| c.get_mut(id)) {
      Some(existing) => {
        merge_into(existing, fields);
        Ok(true)
      }
      None => Ok(false),
    }
  }

  async fn delete(&self, collection: &str, id: &str) -> Result<(), MemoryError> {
    self.check()?;
    let mut collections = self.inner.collections.write().await;
    if let Some(docs) = collections.get_mut(collection) {
      docs.remove(id);
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use serde_json::{Value, json};

  use super::*;

  fn doc(value: Value) -> Document {
    match value {
      Value::Object(map) => map,
      _ => panic!("not an object"),
    }
  }

  #[tokio::test]
  async fn insert_then_get() {
    let store = MemoryStore::new();
    let id = store.insert("users", doc(json!({ "a": 1 }))).await.unwrap();
    let fetched = store.get("users", &id).await.unwrap();
    assert_eq!(fetched, Some(doc(json!({ "a": 1 }))));
    assert_eq!(store.len("users").await, 1);
  }

  #[tokio::test]
  async fn collections_are_isolated() {
    let store = MemoryStore::new();
    let id = store.insert("users", doc(json!({}))).await.unwrap();
    assert!(store.get("other", &id).await.unwrap().is_none());
  }

  #[tokio::test]
  async fn merge_missing_returns_false() {
    let store = MemoryStore::new();
    let merged = store.merge("users", "nope", doc(json!({ "a": 1 }))).await.unwrap();
    assert!(!merged);
    assert_eq!(store.len("users").await, 0);
  }

  #[tokio::test]
  async fn fail_next_counts_down() {
    let store = MemoryStore::new();
    store.fail_next(2);
    assert!(store.get("users", "x").await.is_err());
    assert!(store.delete("users", "x").await.is_err());
    assert!(store.get("users", "x").await.is_ok());
  }

  #[tokio::test]
  async fn set_failing_is_sticky() {
    let store = MemoryStore::new();
    store.set_failing(true);
    assert!(store.insert("users", Document::new()).await.is_err());
    assert!(store.insert("users", Document::new()).await.is_err());
    store.set_failing(false);
    assert!(store.insert("users", Document::new()).await.is_ok());
  }
}
