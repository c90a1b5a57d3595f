//! tierra server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! configured document store, and serves the user API over HTTP.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Tierra user record server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = tierra_server::load_config(&cli.config)?;

  let app = tierra_server::build_app(&server_cfg).await?;
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!(
    backend = ?server_cfg.backend,
    profile_sync = ?server_cfg.profile_sync,
    "Listening on http://{address}"
  );
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
