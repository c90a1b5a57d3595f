//! Cloud Firestore backend for the Tierra document store.
//!
//! Speaks the Firestore REST v1 API over [`reqwest`]. Documents are converted
//! to and from Firestore's typed value representation in [`encode`].

pub mod encode;
pub mod error;
mod store;

pub use error::{Error, Result};
pub use store::{FirestoreConfig, FirestoreStore};
