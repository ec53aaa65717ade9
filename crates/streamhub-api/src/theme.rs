//! Handlers for the theme document.
//!
//! | Method | Path     | Notes |
//! |--------|----------|-------|
//! | `GET`  | `/theme` | Current document; 404 before the first write |
//! | `POST` | `/theme` | Admin; `{primary, appearance, radius, variant}` |

use axum::{Json, extract::State};
use streamhub_core::{
  store::{HubStore, ThemeStore},
  theme::{ThemeDocument, ThemeDraft},
};

use crate::{AppState, auth::AdminAuth, error::ApiError, extract::ApiJson};

/// `GET /theme`
pub async fn get_current<S, T>(
  State(state): State<AppState<S, T>>,
) -> Result<Json<ThemeDocument>, ApiError>
where
  S: HubStore + 'static,
  T: ThemeStore + 'static,
{
  let doc = state
    .themes
    .load_theme()
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("no theme has been written yet"))?;
  Ok(Json(doc))
}

/// `POST /theme`
pub async fn update<S, T>(
  State(state): State<AppState<S, T>>,
  _auth: AdminAuth,
  ApiJson(draft): ApiJson<ThemeDraft>,
) -> Result<Json<ThemeDocument>, ApiError>
where
  S: HubStore + 'static,
  T: ThemeStore + 'static,
{
  let artifact = draft.validate()?;
  let doc = state.themes.merge_theme(artifact).await.map_err(ApiError::store)?;
  tracing::info!("theme document updated");
  Ok(Json(doc))
}
