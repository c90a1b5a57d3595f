//! [`SqliteStore`] — the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tierra_core::{
  document::{Document, merge_into},
  store::{DocumentStore, auto_id},
};

use crate::{
  Error, Result,
  encode::{decode_fields, encode_dt, encode_fields},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A document store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Number of documents in `collection`.
  pub async fn count(&self, collection: &str) -> Result<usize> {
    let collection = collection.to_owned();
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM documents WHERE collection = ?1",
          rusqlite::params![collection],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(n as usize)
  }
}

fn boxed(e: Error) -> tokio_rusqlite::Error { tokio_rusqlite::Error::Other(Box::new(e)) }

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = Error;

  async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
    let collection_str = collection.to_owned();
    let id_str         = id.to_owned();

    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT fields_json FROM documents WHERE collection = ?1 AND doc_id = ?2",
            rusqlite::params![collection_str, id_str],
            |r| r.get(0),
          )
          .optional()?)
      })
      .await?;

    raw.map(|s| decode_fields(id, &s)).transpose()
  }

  async fn insert(&self, collection: &str, document: Document) -> Result<String> {
    let collection_str = collection.to_owned();
    let fields_str     = encode_fields(&document)?;
    let at_str         = encode_dt(Utc::now());

    let id = self
      .conn
      .call(move |conn| {
        // Retry on the (unlikely) id collision instead of overwriting.
        loop {
          let id = auto_id();
          let inserted = conn.execute(
            "INSERT OR IGNORE INTO documents
               (collection, doc_id, fields_json, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            rusqlite::params![collection_str, id, fields_str, at_str],
          )?;
          if inserted == 1 {
            return Ok(id);
          }
        }
      })
      .await?;

    tracing::debug!(collection, id = %id, "sqlite document inserted");
    Ok(id)
  }

  async fn merge(&self, collection: &str, id: &str, fields: Document) -> Result<bool> {
    let collection_str = collection.to_owned();
    let id_str         = id.to_owned();
    let at_str         = encode_dt(Utc::now());

    let merged = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let existing: Option<String> = tx
          .query_row(
            "SELECT fields_json FROM documents WHERE collection = ?1 AND doc_id = ?2",
            rusqlite::params![collection_str, id_str],
            |r| r.get(0),
          )
          .optional()?;

        let Some(existing) = existing else {
          return Ok(false);
        };

        let mut doc = decode_fields(&id_str, &existing).map_err(boxed)?;
        merge_into(&mut doc, fields);
        let fields_str = encode_fields(&doc).map_err(boxed)?;

        tx.execute(
          "UPDATE documents SET fields_json = ?3, updated_at = ?4
           WHERE collection = ?1 AND doc_id = ?2",
          rusqlite::params![collection_str, id_str, fields_str, at_str],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(merged)
  }

  async fn delete(&self, collection: &str, id: &str) -> Result<()> {
    let collection_str = collection.to_owned();
    let id_str         = id.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2",
          rusqlite::params![collection_str, id_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
