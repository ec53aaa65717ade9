//! Handlers for the stream schedule.
//!
//! | Method   | Path              | Notes |
//! |----------|-------------------|-------|
//! | `GET`    | `/schedule`       | The active schedule; 404 if none |
//! | `POST`   | `/schedule`       | Admin; replaces the active schedule |
//! | `GET`    | `/schedules`      | Admin; full history, newest first |
//! | `DELETE` | `/schedules/{id}` | Admin; 404 if absent |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use streamhub_core::{
  schedule::{ScheduleDraft, StreamSchedule},
  store::{HubStore, ThemeStore},
};

use crate::{
  AppState,
  auth::AdminAuth,
  error::ApiError,
  extract::{ApiJson, parse_id},
};

/// `GET /schedule`
pub async fn get_active<S, T>(
  State(state): State<AppState<S, T>>,
) -> Result<Json<StreamSchedule>, ApiError>
where
  S: HubStore + 'static,
  T: ThemeStore + 'static,
{
  let active = state
    .store
    .active_schedule()
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::not_found("no active schedule"))?;
  Ok(Json(active))
}

/// `POST /schedule`
pub async fn create<S, T>(
  State(state): State<AppState<S, T>>,
  _auth: AdminAuth,
  ApiJson(draft): ApiJson<ScheduleDraft>,
) -> Result<impl IntoResponse, ApiError>
where
  S: HubStore + 'static,
  T: ThemeStore + 'static,
{
  let input = draft.validate()?;
  let created = state.store.activate_schedule(input).await.map_err(ApiError::store)?;
  tracing::info!(id = created.id, date = %created.date, "schedule activated");
  Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /schedules`
pub async fn list_all<S, T>(
  State(state): State<AppState<S, T>>,
  _auth: AdminAuth,
) -> Result<Json<Vec<StreamSchedule>>, ApiError>
where
  S: HubStore + 'static,
  T: ThemeStore + 'static,
{
  Ok(Json(state.store.list_schedules().await.map_err(ApiError::store)?))
}

/// `DELETE /schedules/{id}`
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
  if !state.store.delete_schedule(id).await.map_err(ApiError::store)? {
    return Err(ApiError::not_found(format!("schedule {id} not found")));
  }
  Ok(StatusCode::NO_CONTENT)
}
