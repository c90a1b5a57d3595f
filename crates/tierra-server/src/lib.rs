//! Server assembly for Tierra: configuration, backend selection, and the
//! HTTP application.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::Router;
use serde::Deserialize;
use tierra_api::ApiState;
use tierra_core::{
  gateway::{USERS_COLLECTION, UserGateway},
  memory::MemoryStore,
  signin::ProfileSync,
  store::DocumentStore,
};
use tierra_store_firestore::{FirestoreConfig, FirestoreStore};
use tierra_store_sqlite::SqliteStore;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Which [`DocumentStore`] backs the gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
  /// Process-local; records are lost on exit.
  Memory,
  #[default]
  Sqlite,
  Firestore,
}

/// Runtime server configuration, deserialised from `config.toml` and
/// `TIERRA_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:         String,
  #[serde(default = "default_port")]
  pub port:         u16,
  #[serde(default)]
  pub backend:      Backend,
  #[serde(default = "default_collection")]
  pub collection:   String,
  #[serde(default)]
  pub profile_sync: ProfileSync,
  #[serde(default = "default_sqlite_path")]
  pub sqlite_path:  PathBuf,
  /// Required when `backend = "firestore"`.
  #[serde(default)]
  pub firestore:    Option<FirestoreConfig>,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_collection() -> String { USERS_COLLECTION.to_owned() }

fn default_sqlite_path() -> PathBuf { PathBuf::from("tierra.db") }

/// Layer the optional TOML file under `TIERRA_*` environment variables.
///
/// Nested keys use a double underscore, e.g. `TIERRA_FIRESTORE__PROJECT_ID`.
pub fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("TIERRA").separator("__"))
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Application ──────────────────────────────────────────────────────────────

/// Open the configured backend and build the full application router.
///
/// The API is mounted under `/api`.
pub async fn build_app(config: &ServerConfig) -> anyhow::Result<Router> {
  let api = match config.backend {
    Backend::Memory => {
      tracing::warn!("using the in-memory store; records are lost on exit");
      api_for(MemoryStore::new(), config)
    }
    Backend::Sqlite => {
      let path = expand_tilde(&config.sqlite_path);
      if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
          .with_context(|| format!("failed to create {parent:?}"))?;
      }
      let store = SqliteStore::open(&path)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?;
      tracing::info!(path = %path.display(), "opened sqlite store");
      api_for(store, config)
    }
    Backend::Firestore => {
      let fs_config = config
        .firestore
        .clone()
        .context("backend \"firestore\" requires a [firestore] section")?;
      tracing::info!(project = %fs_config.project_id, "using firestore store");
      let store = FirestoreStore::new(fs_config).context("failed to build firestore client")?;
      api_for(store, config)
    }
  };

  Ok(
    Router::new()
      .nest("/api", api)
      .layer(TraceLayer::new_for_http()),
  )
}

fn api_for<S: DocumentStore + 'static>(store: S, config: &ServerConfig) -> Router {
  let gateway = UserGateway::with_collection(Arc::new(store), config.collection.clone());
  tierra_api::api_router(ApiState::new(gateway, config.profile_sync))
}
