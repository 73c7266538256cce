//! rollcall server binary.
//!
//! Reads `rollcall.toml` (or the file given with `--config`), opens the
//! SQLite store, installs the offline shell cache, and serves HTTP with the
//! class-end watcher and the notification relay running alongside.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use clap::Parser;
use rollcall_core::store::AttendanceStore as _;
use rollcall_server::{
  AppState, ServerConfig,
  notify::{self, NotificationBridge},
  shell::ShellService,
  watch::ClassEndWatcher,
};
use rollcall_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "personal attendance tracking server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "rollcall.toml")]
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

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("ROLLCALL"))
    .build()
    .context("failed to read config file")?;

  let server_config: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_config.store_path);
  let cache_dir = expand_tilde(&server_config.cache_dir);

  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;
  let store = Arc::new(store);

  // Shell lifecycle before traffic: install the manifest, then sweep stale
  // generations. A failed install is logged, not fatal — the previous
  // generation (if any) keeps serving.
  let shell = Arc::new(
    ShellService::new(
      &cache_dir,
      server_config.origin_url.clone(),
      Duration::from_secs(server_config.fetch_timeout_secs),
    )
    .context("failed to build shell gateway")?,
  );
  match shell.install().await {
    Ok(()) => {
      if let Err(e) = shell.activate().await {
        tracing::error!(error = %e, "shell cache activation failed");
      }
    }
    Err(e) => tracing::error!(error = %e, "shell cache install failed"),
  }

  // Notification bridge and its background tasks.
  let permission = store.alert_permission().await?;
  let (bridge, relay_rx) = NotificationBridge::new(permission);
  tokio::spawn(notify::run_relay(store.clone(), relay_rx));
  tokio::spawn(
    ClassEndWatcher::new(
      store.clone(),
      bridge.clone(),
      Duration::from_secs(server_config.poll_interval_secs),
    )
    .run(),
  );

  let app = rollcall_server::router(AppState {
    store,
    shell,
    bridge,
  });

  let address = format!("{}:{}", server_config.host, server_config.port);
  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~/` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) = text.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
