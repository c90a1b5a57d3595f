//! Integration tests for `SqliteStore` against an in-memory database.

use std::sync::Arc;

use serde_json::{Value, json};
use tierra_core::{
  document::Document,
  gateway::UserGateway,
  store::{AUTO_ID_LEN, DocumentStore},
  user::{UserPatch, UserRecord},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn doc(value: Value) -> Document {
  match value {
    Value::Object(map) => map,
    _ => panic!("not an object"),
  }
}

// ─── Raw documents ───────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get() {
  let s = store().await;

  let id = s
    .insert("users", doc(json!({ "email": "a@x.com", "name": "A" })))
    .await
    .unwrap();
  assert_eq!(id.len(), AUTO_ID_LEN);

  let fetched = s.get("users", &id).await.unwrap();
  assert_eq!(fetched, Some(doc(json!({ "email": "a@x.com", "name": "A" }))));
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get("users", "nope").await.unwrap().is_none());
}

#[tokio::test]
async fn collections_do_not_overlap() {
  let s = store().await;
  let id = s.insert("users", doc(json!({ "a": 1 }))).await.unwrap();

  assert!(s.get("admins", &id).await.unwrap().is_none());
  assert_eq!(s.count("users").await.unwrap(), 1);
  assert_eq!(s.count("admins").await.unwrap(), 0);
}

#[tokio::test]
async fn merge_overwrites_given_keys_only() {
  let s = store().await;
  let id = s
    .insert("users", doc(json!({ "email": "a@x.com", "name": "A" })))
    .await
    .unwrap();

  let merged = s.merge("users", &id, doc(json!({ "name": "B" }))).await.unwrap();
  assert!(merged);

  let fetched = s.get("users", &id).await.unwrap().unwrap();
  assert_eq!(fetched, doc(json!({ "email": "a@x.com", "name": "B" })));
}

#[tokio::test]
async fn merge_missing_does_not_create() {
  let s = store().await;
  let merged = s.merge("users", "ghost", doc(json!({ "name": "B" }))).await.unwrap();
  assert!(!merged);
  assert_eq!(s.count("users").await.unwrap(), 0);
}

#[tokio::test]
async fn delete_removes_and_is_idempotent() {
  let s = store().await;
  let id = s.insert("users", doc(json!({}))).await.unwrap();

  s.delete("users", &id).await.unwrap();
  assert!(s.get("users", &id).await.unwrap().is_none());

  s.delete("users", &id).await.unwrap();
}

#[tokio::test]
async fn reopen_file_keeps_documents() {
  let dir = std::env::temp_dir().join(format!("tierra-sqlite-{}", std::process::id()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("store.db");

  let id = {
    let s = SqliteStore::open(&path).await.unwrap();
    s.insert("users", doc(json!({ "email": "a@x.com" }))).await.unwrap()
  };

  let s = SqliteStore::open(&path).await.unwrap();
  assert!(s.get("users", &id).await.unwrap().is_some());

  std::fs::remove_dir_all(&dir).ok();
}

// ─── Through the gateway ─────────────────────────────────────────────────────

#[tokio::test]
async fn gateway_roundtrip_on_sqlite() {
  let g = UserGateway::new(Arc::new(store().await));
  let record = UserRecord::new("a@x.com", "A", "http://x/a.png");

  let id = g.create(record.clone()).await.into_payload().unwrap();
  assert_eq!(g.fetch_by_id(id.as_str()).await.into_payload(), Some(record));

  assert!(g.update(id.as_str(), UserPatch::default().photo("q")).await.is_success());
  let updated = g.fetch_by_id(id.as_str()).await.into_payload().unwrap();
  assert_eq!(updated, UserRecord::new("a@x.com", "A", "q"));

  assert!(g.delete(id.as_str()).await.is_success());
  assert!(g.fetch_by_id(id.as_str()).await.is_not_found());
}

#[tokio::test]
async fn gateway_update_unknown_is_missing() {
  let g = UserGateway::new(Arc::new(store().await));
  let outcome = g.update("ghost", UserPatch::default().name("B")).await;
  assert!(matches!(
    outcome.failure(),
    Some(tierra_core::Failure::Missing(_))
  ));
}
