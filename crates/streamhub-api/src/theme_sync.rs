//! Keeps the theme document in step with the appearance settings.
//!
//! [`spawn_theme_sync`] subscribes to [`SettingsEvents`] and regenerates the
//! document whenever a change touches `primary_color`, `dark_mode` or
//! `seasonal_theme`. Failures are logged and never reach the settings writer.

use std::sync::Arc;

use streamhub_core::{
  event::{SettingsChanged, SettingsEvents},
  setting::{AppSettings, SeasonalTheme, Setting, SettingKey, to_map},
  store::{HubStore, ThemeStore},
  theme::{ThemeArtifact, ThemeDocument},
};
use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};

use crate::ApiError;

/// Regenerate the theme from the stored settings with `changes` laid on top.
///
/// `changes` wins over whatever the store returns, so a read racing the
/// write that triggered us still produces the new values.
pub async fn sync_theme<S, T>(
  store: &S,
  themes: &T,
  changes: &[Setting],
) -> Result<ThemeDocument, ApiError>
where
  S: HubStore,
  T: ThemeStore,
{
  let rows = store.list_settings().await.map_err(ApiError::store)?;
  let mut map = to_map(&rows);
  for change in changes {
    map.insert(change.key.clone(), change.value.clone());
  }

  let settings = AppSettings::decode(&map);
  let seasonal_known = map
    .get(SettingKey::SeasonalTheme.as_str())
    .is_some_and(|v| v.parse::<SeasonalTheme>().is_ok());
  let artifact = ThemeArtifact::from_settings(&settings, seasonal_known);

  themes.merge_theme(artifact).await.map_err(ApiError::store)
}

/// Spawn the observer task. The subscription is taken before returning, so
/// any change published after this call is seen.
pub fn spawn_theme_sync<S, T>(
  store: Arc<S>,
  themes: Arc<T>,
  events: &SettingsEvents,
) -> JoinHandle<()>
where
  S: HubStore + 'static,
  T: ThemeStore + 'static,
{
  let mut rx = events.subscribe();
  tokio::spawn(async move {
    loop {
      let changes = match rx.recv().await {
        Ok(event) if event.affects_theme() => event.changes,
        Ok(SettingsChanged { .. }) => continue,
        Err(RecvError::Lagged(skipped)) => {
          tracing::warn!(skipped, "theme sync lagged; regenerating from store");
          Vec::new()
        }
        Err(RecvError::Closed) => break,
      };
      match sync_theme(store.as_ref(), themes.as_ref(), &changes).await {
        Ok(doc) => tracing::info!(primary = ?doc.get("primary"), "theme regenerated"),
        Err(e) => tracing::warn!(error = %e, "theme regeneration failed"),
      }
    }
    tracing::debug!("settings channel closed; theme sync stopping");
  })
}
