//! Server assembly for the stream hub.
//!
//! Loads nothing by itself; `main.rs` reads [`ServerConfig`] and hands the
//! chosen store to [`run`]. Everything here is reusable from tests.

pub mod theme_file;

use std::{net::SocketAddr, path::PathBuf};

use anyhow::Context as _;
use axum::{Router, routing::get};
use serde::Deserialize;
use streamhub_api::{
  AppState, AuthConfig, api_router,
  auth::hash_password,
  theme_sync::{spawn_theme_sync, sync_theme},
};
use streamhub_core::{
  setting::{AppSettings, NewSetting, SettingKey},
  store::{HubStore, ThemeStore},
};
use tokio::{net::TcpListener, task::JoinHandle};
use tower_http::trace::TraceLayer;

pub use theme_file::ThemeFile;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Store path that selects the in-memory backend.
pub const MEMORY_STORE: &str = ":memory:";

/// Runtime server configuration, deserialised from `streamhub.toml` and
/// `STREAMHUB_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                   String,
  pub port:                   u16,
  /// SQLite file, or `:memory:` for a throwaway in-process store.
  pub store_path:             PathBuf,
  pub theme_path:             PathBuf,
  /// Seeded as the admin password on first start only.
  pub initial_admin_password: Option<String>,
  pub hash_admin_password:    bool,
  /// Default for `current_stream` when the store is fresh.
  pub primary_channel:        String,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                   "127.0.0.1".to_owned(),
      port:                   5000,
      store_path:             PathBuf::from("streamhub.db"),
      theme_path:             PathBuf::from("theme.json"),
      initial_admin_password: None,
      hash_admin_password:    false,
      primary_channel:        String::new(),
    }
  }
}

impl ServerConfig {
  pub fn uses_memory_store(&self) -> bool { self.store_path.as_os_str() == MEMORY_STORE }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Seeding ──────────────────────────────────────────────────────────────────

/// Write default settings for every key the store does not have yet.
///
/// Existing values are never touched, so this is safe to run on every start.
pub async fn seed_defaults<S>(store: &S, config: &ServerConfig) -> anyhow::Result<usize>
where
  S: HubStore,
{
  let mut defaults = AppSettings::default();
  defaults.current_stream = config.primary_channel.clone();
  let mut wanted: Vec<(String, String)> = defaults.encode().into_iter().collect();

  if let Some(pw) = &config.initial_admin_password {
    let value = if config.hash_admin_password { hash_password(pw)? } else { pw.clone() };
    wanted.push((SettingKey::AdminPassword.as_str().to_owned(), value));
  }

  let mut written = 0;
  for (key, value) in wanted {
    let present = store
      .get_setting(&key)
      .await
      .with_context(|| format!("failed to read setting {key}"))?
      .is_some();
    if present {
      continue;
    }
    store
      .save_setting(NewSetting::new(key.clone(), value))
      .await
      .with_context(|| format!("failed to seed setting {key}"))?;
    written += 1;
  }

  if written > 0 {
    tracing::info!(written, "seeded default settings");
  }
  Ok(written)
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// The full HTTP surface: `/api/*`, `/healthz`, wrapped in request tracing.
pub fn build_app<S, T>(state: AppState<S, T>) -> Router
where
  S: HubStore + Clone + 'static,
  T: ThemeStore + Clone + 'static,
{
  Router::new()
    .nest("/api", api_router(state))
    .route("/healthz", get(|| async { "ok" }))
    .layer(TraceLayer::new_for_http())
}

/// Seed, start the theme observer, and serve until ctrl-c.
pub async fn run<S>(config: ServerConfig, store: S) -> anyhow::Result<()>
where
  S: HubStore + Clone + 'static,
{
  seed_defaults(&store, &config).await?;

  let themes = ThemeFile::new(&config.theme_path);
  tracing::info!(path = %themes.path().display(), "theme document location");
  let state = AppState::new(store, themes, AuthConfig {
    hash_admin_password: config.hash_admin_password,
  });

  // Make sure a theme document exists before the first request.
  let have_theme = state.themes.load_theme().await.map(|d| d.is_some()).unwrap_or(false);
  if !have_theme {
    if let Err(e) = sync_theme(state.store.as_ref(), state.themes.as_ref(), &[]).await {
      tracing::warn!(error = %e, "initial theme generation failed");
    }
  }

  let sync = spawn_theme_sync(state.store.clone(), state.themes.clone(), &state.events);

  let app = build_app(state);
  let address = config.address();
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;
  let local: SocketAddr = listener.local_addr()?;
  tracing::info!("Listening on http://{local}");

  let served = axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error");

  stop_task("theme sync", sync).await;
  served?;
  tracing::info!("server stopped");
  Ok(())
}

/// Abort a background task and report how it ended. Returns `false` if it
/// had panicked.
pub async fn stop_task(name: &str, handle: JoinHandle<()>) -> bool {
  handle.abort();
  match handle.await {
    Ok(()) => {
      tracing::debug!(task = name, "background task had already finished");
      true
    }
    Err(e) if e.is_cancelled() => true,
    Err(e) => {
      tracing::error!(task = name, error = %e, "background task panicked");
      false
    }
  }
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::warn!(error = %e, "failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
}
