//! JSON REST API for the stream hub.
//!
//! Exposes an axum [`Router`] backed by any [`HubStore`] + [`ThemeStore`]
//! pair. Public reads are open; every mutating route requires the admin
//! bearer credential (see [`auth`]). TLS and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", streamhub_api::api_router(state.clone()))
//! ```

pub mod announcements;
pub mod auth;
pub mod error;
pub mod extract;
pub mod schedule;
pub mod settings;
pub mod theme;
pub mod theme_sync;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post},
};
use streamhub_core::{
  event::SettingsEvents,
  store::{HubStore, ThemeStore},
};

pub use auth::AuthConfig;
pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S, T> {
  pub store:  Arc<S>,
  pub themes: Arc<T>,
  /// Publisher for settings change notifications.
  pub events: SettingsEvents,
  pub auth:   Arc<AuthConfig>,
}

impl<S, T> AppState<S, T> {
  pub fn new(store: S, themes: T, auth: AuthConfig) -> Self {
    Self {
      store:  Arc::new(store),
      themes: Arc::new(themes),
      events: SettingsEvents::default(),
      auth:   Arc::new(auth),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, T>(state: AppState<S, T>) -> Router<()>
where
  S: HubStore + Clone + 'static,
  T: ThemeStore + Clone + 'static,
{
  Router::new()
    // Announcements
    .route(
      "/announcements",
      get(announcements::list::<S, T>).post(announcements::create::<S, T>),
    )
    .route("/announcements/{id}", delete(announcements::delete_one::<S, T>))
    // Settings
    .route("/settings", get(settings::list::<S, T>).post(settings::save::<S, T>))
    .route("/settings/{key}", get(settings::get_one::<S, T>))
    // Schedule
    .route("/schedule", get(schedule::get_active::<S, T>).post(schedule::create::<S, T>))
    .route("/schedules", get(schedule::list_all::<S, T>))
    .route("/schedules/{id}", delete(schedule::delete_one::<S, T>))
    // Auth
    .route("/auth/verify", post(auth::verify::<S, T>))
    .route("/auth/change-password", post(auth::change_password::<S, T>))
    // Theme
    .route("/theme", get(theme::get_current::<S, T>).post(theme::update::<S, T>))
    .with_state(state)
}

#[cfg(test)]
mod tests;
