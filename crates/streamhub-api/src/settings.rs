//! Handlers for `/settings` endpoints.
//!
//! | Method | Path              | Notes |
//! |--------|-------------------|-------|
//! | `GET`  | `/settings`       | `{key: value}` for every readable key |
//! | `GET`  | `/settings/{key}` | `{"value": ...}`; 404 if absent |
//! | `POST` | `/settings`       | Admin; body `{key: "value", ...}` |
//!
//! The reserved `admin_password` key is invisible here in both directions.

use std::collections::BTreeMap;

use axum::{
  Json,
  extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use streamhub_core::{
  event::SettingsChanged,
  setting::{NewSetting, Setting, SettingKey, validate_entry},
  store::{HubStore, ThemeStore},
};

use crate::{AppState, auth::AdminAuth, error::ApiError, extract::ApiJson};

fn is_readable(key: &str) -> bool { !SettingKey::parse(key).is_some_and(SettingKey::is_reserved) }

// ─── Read ─────────────────────────────────────────────────────────────────────

/// `GET /settings`
pub async fn list<S, T>(
  State(state): State<AppState<S, T>>,
) -> Result<Json<BTreeMap<String, String>>, ApiError>
where
  S: HubStore + 'static,
  T: ThemeStore + 'static,
{
  let rows = state.store.list_settings().await.map_err(ApiError::store)?;
  let map = rows
    .into_iter()
    .filter(|r| is_readable(&r.key))
    .map(|r| (r.key, r.value))
    .collect();
  Ok(Json(map))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SettingValue {
  pub value: String,
}

/// `GET /settings/{key}`
pub async fn get_one<S, T>(
  State(state): State<AppState<S, T>>,
  Path(key): Path<String>,
) -> Result<Json<SettingValue>, ApiError>
where
  S: HubStore + 'static,
  T: ThemeStore + 'static,
{
  let not_found = || ApiError::not_found(format!("setting {key:?} not found"));
  if !is_readable(&key) {
    return Err(not_found());
  }
  let row = state
    .store
    .get_setting(&key)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(not_found)?;
  Ok(Json(SettingValue { value: row.value }))
}

// ─── Write ────────────────────────────────────────────────────────────────────

/// `POST /settings`
///
/// Every entry is validated before anything is written, so a bad value
/// rejects the whole batch. Non-string values are ignored. Whatever rows
/// were written, even if a later write fails, are published for the theme
/// observer.
pub async fn save<S, T>(
  State(state): State<AppState<S, T>>,
  _auth: AdminAuth,
  ApiJson(body): ApiJson<Map<String, Value>>,
) -> Result<Json<Vec<Setting>>, ApiError>
where
  S: HubStore + 'static,
  T: ThemeStore + 'static,
{
  let mut entries = Vec::with_capacity(body.len());
  for (key, value) in body {
    let Value::String(value) = value else {
      tracing::debug!(key = %key, "skipping non-string setting value");
      continue;
    };
    validate_entry(&key, &value)?;
    entries.push(NewSetting::new(key, value));
  }

  let mut saved = Vec::with_capacity(entries.len());
  let mut failure = None;
  for entry in entries {
    match state.store.save_setting(entry).await {
      Ok(row) => saved.push(row),
      Err(e) => {
        failure = Some(ApiError::store(e));
        break;
      }
    }
  }

  // Rows written before a failure stay committed and must still be observed.
  if !saved.is_empty() {
    let receivers = state.events.publish(SettingsChanged { changes: saved.clone() });
    tracing::debug!(count = saved.len(), receivers, "settings saved");
  }
  match failure {
    Some(e) => Err(e),
    None => Ok(Json(saved)),
  }
}
