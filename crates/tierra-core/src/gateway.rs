//! [`UserGateway`] — the narrow facade over the `users` collection.
//!
//! Every operation resolves to an [`Outcome`]. Store errors, invalid ids and
//! malformed documents are caught here and attached as a [`Failure`]; nothing
//! escapes as an `Err` or a panic.

use std::sync::Arc;

use crate::{
  Failure, Outcome, ValidationError,
  document::Document,
  store::DocumentStore,
  user::{UserId, UserPatch, UserRecord},
};

/// Default collection holding user records.
pub const USERS_COLLECTION: &str = "users";

pub struct UserGateway<S> {
  store:      Arc<S>,
  collection: String,
}

impl<S> Clone for UserGateway<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), collection: self.collection.clone() }
  }
}

impl<S: DocumentStore> UserGateway<S> {
  pub fn new(store: Arc<S>) -> Self { Self::with_collection(store, USERS_COLLECTION) }

  pub fn with_collection(store: Arc<S>, collection: impl Into<String>) -> Self {
    Self { store, collection: collection.into() }
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Look up a record. Absence is [`Outcome::NotFound`], not a failure.
  pub async fn fetch_by_id(&self, id: &str) -> Outcome<UserRecord> {
    let id = match UserId::parse(id) {
      Ok(id) => id,
      Err(e) => return self.rejected("fetch", e),
    };

    match self.store.get(&self.collection, id.as_str()).await {
      Ok(Some(doc)) => match UserRecord::from_document(doc) {
        Ok(record) => {
          tracing::debug!(collection = %self.collection, %id, "user document read");
          Outcome::Success(record)
        }
        Err(e) => {
          tracing::warn!(
            collection = %self.collection, %id, error = %e,
            "stored user document is malformed"
          );
          Outcome::Failure(Failure::Invalid(e))
        }
      },
      Ok(None) => {
        tracing::debug!(collection = %self.collection, %id, "no such user document");
        Outcome::NotFound
      }
      Err(e) => self.store_failed("getting", e),
    }
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Insert a new record and return the identifier the store assigned.
  ///
  /// If the store writes the document but hands back an id that is not a
  /// valid [`UserId`], the write is undone with a best-effort delete of that
  /// id and the create fails as [`Failure::Invalid`].
  pub async fn create(&self, record: UserRecord) -> Outcome<UserId> {
    let raw = match self.store.insert(&self.collection, record.to_document()).await {
      Ok(raw) => raw,
      Err(e) => return self.store_failed("adding", e),
    };

    match UserId::parse(raw.as_str()) {
      Ok(id) => {
        tracing::info!(collection = %self.collection, %id, "user document written");
        Outcome::Success(id)
      }
      Err(e) => {
        tracing::error!(
          collection = %self.collection, id = %raw, error = %e,
          "store returned an unusable document id"
        );
        if !raw.is_empty()
          && let Err(err) = self.store.delete(&self.collection, &raw).await
        {
          tracing::error!(
            collection = %self.collection, id = %raw, error = %err,
            "could not remove document written under an unusable id"
          );
        }
        Outcome::Failure(Failure::Invalid(e))
      }
    }
  }

  /// [`Self::create`] from an untyped document.
  pub async fn create_document(&self, doc: Document) -> Outcome<UserId> {
    match UserRecord::from_document(doc) {
      Ok(record) => self.create(record).await,
      Err(e) => self.rejected("create", e),
    }
  }

  /// Merge `patch` into an existing record.
  ///
  /// An identifier that does not resolve fails with [`Failure::Missing`].
  pub async fn update(&self, id: &str, patch: UserPatch) -> Outcome<()> {
    let id = match UserId::parse(id) {
      Ok(id) => id,
      Err(e) => return self.rejected("update", e),
    };
    if patch.is_empty() {
      return self.rejected("update", ValidationError::EmptyPatch);
    }

    match self.store.merge(&self.collection, id.as_str(), patch.to_document()).await {
      Ok(true) => {
        tracing::info!(collection = %self.collection, %id, "user document updated");
        Outcome::Success(())
      }
      Ok(false) => {
        tracing::warn!(collection = %self.collection, %id, "update target does not exist");
        Outcome::Failure(Failure::Missing(id))
      }
      Err(e) => self.store_failed("updating", e),
    }
  }

  /// [`Self::update`] from an untyped document.
  pub async fn update_document(&self, id: &str, doc: Document) -> Outcome<()> {
    match UserPatch::from_document(doc) {
      Ok(patch) => self.update(id, patch).await,
      Err(e) => self.rejected("update", e),
    }
  }

  /// Delete a record. Deleting an absent record succeeds.
  pub async fn delete(&self, id: &str) -> Outcome<()> {
    let id = match UserId::parse(id) {
      Ok(id) => id,
      Err(e) => return self.rejected("delete", e),
    };

    match self.store.delete(&self.collection, id.as_str()).await {
      Ok(()) => {
        tracing::info!(collection = %self.collection, %id, "user document deleted");
        Outcome::Success(())
      }
      Err(e) => self.store_failed("removing", e),
    }
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  fn rejected<T>(&self, op: &'static str, err: ValidationError) -> Outcome<T> {
    tracing::warn!(collection = %self.collection, op, error = %err, "rejected user input");
    Outcome::Failure(Failure::Invalid(err))
  }

  fn store_failed<T>(&self, verb: &'static str, err: S::Error) -> Outcome<T> {
    tracing::error!(collection = %self.collection, error = %err, "error {verb} document");
    Outcome::Failure(Failure::store(err))
  }
}
