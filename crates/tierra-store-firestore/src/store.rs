//! [`FirestoreStore`] — the Firestore REST implementation of [`DocumentStore`].

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tierra_core::{document::Document, store::DocumentStore};

use crate::{
  Error, Result,
  encode::{decode_fields, encode_fields, field_path, id_from_name},
};

pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";
pub const DEFAULT_DATABASE: &str = "(default)";

/// Connection settings for a Firestore database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirestoreConfig {
  pub project_id:   String,
  #[serde(default = "default_database")]
  pub database:     String,
  /// Overridable for the emulator and for tests.
  #[serde(default = "default_base_url")]
  pub base_url:     String,
  /// OAuth2 access token; omitted when talking to the emulator.
  #[serde(default)]
  pub bearer_token: Option<String>,
}

fn default_database() -> String { DEFAULT_DATABASE.to_owned() }

fn default_base_url() -> String { DEFAULT_BASE_URL.to_owned() }

impl FirestoreConfig {
  pub fn new(project_id: impl Into<String>) -> Self {
    Self {
      project_id:   project_id.into(),
      database:     default_database(),
      base_url:     default_base_url(),
      bearer_token: None,
    }
  }
}

/// Firestore document resource as returned by the REST API.
#[derive(Debug, Deserialize)]
struct RawDocument {
  name:   Option<String>,
  #[serde(default)]
  fields: Option<Value>,
}

/// Async client for one Firestore database.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct FirestoreStore {
  client: Client,
  config: FirestoreConfig,
  base:   Url,
}

impl FirestoreStore {
  pub fn new(config: FirestoreConfig) -> Result<Self> {
    let base = Url::parse(&config.base_url)
      .map_err(|e| Error::BaseUrl(format!("{}: {e}", config.base_url)))?;
    if base.cannot_be_a_base() {
      return Err(Error::BaseUrl(config.base_url));
    }
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client, config, base })
  }

  /// `{base}/projects/{p}/databases/{d}/documents/{collection}`
  pub fn collection_url(&self, collection: &str) -> Url { self.url(&[collection]) }

  /// `{base}/projects/{p}/databases/{d}/documents/{collection}/{id}`
  pub fn document_url(&self, collection: &str, id: &str) -> Url {
    self.url(&[collection, id])
  }

  /// Append `segments` under the database's document root. Each segment is
  /// percent-encoded, so `?`, `#` and `/` stay inside their segment.
  fn url(&self, segments: &[&str]) -> Url {
    let mut url = self.base.clone();
    // `new` rejected cannot-be-a-base URLs.
    if let Ok(mut path) = url.path_segments_mut() {
      path
        .pop_if_empty()
        .extend([
          "projects",
          self.config.project_id.as_str(),
          "databases",
          self.config.database.as_str(),
          "documents",
        ])
        .extend(segments);
    }
    url
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    match &self.config.bearer_token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }
}

/// Turn a non-success response into [`Error::Status`].
async fn check(resp: Response) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let body = resp.text().await.unwrap_or_default();
  Err(Error::Status { status, body })
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for FirestoreStore {
  type Error = Error;

  async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
    let resp = self
      .auth(self.client.get(self.document_url(collection, id)))
      .send()
      .await?;

    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    let raw: RawDocument = check(resp).await?.json().await?;
    let fields = raw.fields.unwrap_or_else(|| json!({}));
    Ok(Some(decode_fields(&fields)?))
  }

  async fn insert(&self, collection: &str, document: Document) -> Result<String> {
    let resp = self
      .auth(self.client.post(self.collection_url(collection)))
      .json(&json!({ "fields": encode_fields(&document) }))
      .send()
      .await?;

    let raw: RawDocument = check(resp).await?.json().await?;
    let name = raw.name.ok_or(Error::MissingName)?;
    let id = id_from_name(&name).ok_or(Error::MissingName)?.to_owned();
    tracing::debug!(collection, id = %id, "firestore document created");
    Ok(id)
  }

  async fn merge(&self, collection: &str, id: &str, fields: Document) -> Result<bool> {
    // Only masked fields are written; `exists=true` stops PATCH from
    // creating the document.
    let mut query: Vec<(&str, String)> = fields
      .keys()
      .map(|k| ("updateMask.fieldPaths", field_path(k)))
      .collect();
    query.push(("currentDocument.exists", "true".to_owned()));

    let resp = self
      .auth(self.client.patch(self.document_url(collection, id)))
      .query(&query)
      .json(&json!({ "fields": encode_fields(&fields) }))
      .send()
      .await?;

    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(false);
    }
    check(resp).await?;
    Ok(true)
  }

  async fn delete(&self, collection: &str, id: &str) -> Result<()> {
    let resp = self
      .auth(self.client.delete(self.document_url(collection, id)))
      .send()
      .await?;
    check(resp).await?;
    Ok(())
  }
}
