//! Handlers for `/announcements` endpoints.
//!
//! | Method   | Path                  | Notes |
//! |----------|-----------------------|-------|
//! | `GET`    | `/announcements`      | Newest first; public |
//! | `POST`   | `/announcements`      | Admin; body `{"title","content","type"?}` |
//! | `DELETE` | `/announcements/{id}` | Admin; 404 if absent |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use streamhub_core::{
  announcement::{Announcement, AnnouncementDraft},
  store::{HubStore, ThemeStore},
};

use crate::{
  AppState,
  auth::AdminAuth,
  error::ApiError,
  extract::{ApiJson, parse_id},
};

/// `GET /announcements`
pub async fn list<S, T>(
  State(state): State<AppState<S, T>>,
) -> Result<Json<Vec<Announcement>>, ApiError>
where
  S: HubStore + 'static,
  T: ThemeStore + 'static,
{
  let items = state.store.list_announcements().await.map_err(ApiError::store)?;
  Ok(Json(items))
}

/// `POST /announcements`
pub async fn create<S, T>(
  State(state): State<AppState<S, T>>,
  _auth: AdminAuth,
  ApiJson(draft): ApiJson<AnnouncementDraft>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HubStore + 'static,
  T: ThemeStore + 'static,
{
  let input = draft.validate()?;
  let created = state
    .store
    .create_announcement(input)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(id = created.id, kind = %created.kind, "announcement created");
  Ok((StatusCode::CREATED, Json(created)))
}

/// `DELETE /announcements/{id}`
pub async fn delete_one<S, T>(
  State(state): State<AppState<S, T>>,
  _auth: AdminAuth,
  Path(raw): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: HubStore + 'static,
  T: ThemeStore + 'static,
{
  let id = parse_id(&raw)?;
  if !state.store.delete_announcement(id).await.map_err(ApiError::store)? {
    return Err(ApiError::not_found(format!("announcement {id} not found")));
  }
  Ok(StatusCode::NO_CONTENT)
}
