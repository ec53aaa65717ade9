//! Admin bearer authentication and the `/auth/*` handlers.
//!
//! There is a single shared admin credential, stored under the reserved
//! `admin_password` setting. Clients send it as `Authorization: Bearer <pw>`.
//! The stored value is either the plaintext password or, when
//! [`AuthConfig::hash_admin_password`] was enabled at write time, an argon2
//! PHC string. Both forms are accepted on read.

use argon2::{
  Argon2, PasswordHash, PasswordHasher as _, PasswordVerifier as _, password_hash::SaltString,
};
use axum::{
  Json,
  extract::{FromRequestParts, State},
  http::{HeaderMap, header, request::Parts},
};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};
use streamhub_core::{
  setting::{NewSetting, SettingKey},
  store::{HubStore, ThemeStore},
};
use subtle::ConstantTimeEq as _;

use crate::{AppState, error::ApiError, extract::ApiJson};

/// Shortest password `change-password` accepts.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Server-side authentication options.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
  /// Store new passwords as argon2 hashes instead of plaintext.
  pub hash_admin_password: bool,
}

// ─── Credential checks ────────────────────────────────────────────────────────

/// The raw bearer credential, or `None` if the header is absent or uses a
/// different scheme.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
}

/// Compare `candidate` against the stored credential.
///
/// A stored value that parses as an argon2 PHC string with a hash field is
/// treated as a hash. Anything else, including plaintext that merely starts
/// with `$argon2`, is compared as plaintext.
pub fn verify_password(stored: &str, candidate: &str) -> bool {
  if stored.starts_with("$argon2")
    && let Ok(parsed) = PasswordHash::new(stored)
    && parsed.hash.is_some()
  {
    return Argon2::default()
      .verify_password(candidate.as_bytes(), &parsed)
      .is_ok();
  }
  stored.as_bytes().ct_eq(candidate.as_bytes()).into()
}

/// Produce an argon2id PHC string for `password`.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| ApiError::Store(e.to_string().into()))
}

pub fn validate_new_password(password: &str) -> Result<(), ApiError> {
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(ApiError::BadRequest(format!(
      "password must be at least {MIN_PASSWORD_LEN} characters"
    )));
  }
  Ok(())
}

async fn stored_password<S>(store: &S) -> Result<Option<String>, ApiError>
where
  S: HubStore,
{
  let row = store
    .get_setting(SettingKey::AdminPassword.as_str())
    .await
    .map_err(ApiError::store)?;
  Ok(row.map(|r| r.value))
}

// ─── Extractors ───────────────────────────────────────────────────────────────

/// Present in a handler's arguments means the request carried the admin
/// credential.
#[derive(Debug)]
pub struct AdminAuth;

impl<S, T> FromRequestParts<AppState<S, T>> for AdminAuth
where
  S: HubStore + 'static,
  T: ThemeStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, T>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers).ok_or(ApiError::Unauthorized)?;
    let stored = stored_password(state.store.as_ref())
      .await?
      .ok_or(ApiError::Unauthorized)?;
    if !verify_password(&stored, token) {
      return Err(ApiError::Unauthorized);
    }
    Ok(AdminAuth)
  }
}

/// Like [`AdminAuth`], but lets the request through when no admin password
/// exists yet so the first one can be set.
#[derive(Debug, PartialEq, Eq)]
pub enum AdminOrBootstrap {
  Admin,
  Bootstrap,
}

impl<S, T> FromRequestParts<AppState<S, T>> for AdminOrBootstrap
where
  S: HubStore + 'static,
  T: ThemeStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, T>,
  ) -> Result<Self, Self::Rejection> {
    let Some(stored) = stored_password(state.store.as_ref()).await? else {
      return Ok(AdminOrBootstrap::Bootstrap);
    };
    let token = bearer_token(&parts.headers).ok_or(ApiError::Unauthorized)?;
    if !verify_password(&stored, token) {
      return Err(ApiError::Unauthorized);
    }
    Ok(AdminOrBootstrap::Admin)
  }
}

// ─── Verify ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct VerifyBody {
  pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
  pub valid: bool,
}

/// `POST /auth/verify`, body: `{"password":"..."}`
pub async fn verify<S, T>(
  State(state): State<AppState<S, T>>,
  ApiJson(body): ApiJson<VerifyBody>,
) -> Result<Json<VerifyResponse>, ApiError>
where
  S: HubStore + 'static,
  T: ThemeStore + 'static,
{
  let valid = match stored_password(state.store.as_ref()).await? {
    Some(stored) => verify_password(&stored, &body.password),
    None => {
      tracing::warn!("verify called but no admin password is configured");
      false
    }
  };
  Ok(Json(VerifyResponse { valid }))
}

// ─── Change password ──────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordBody {
  #[serde(default)]
  pub current_password: String,
  pub new_password:     String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChangePasswordResponse {
  pub success: bool,
  pub message: String,
}

/// `POST /auth/change-password`, body:
/// `{"currentPassword":"...","newPassword":"..."}`
///
/// Requires the bearer credential and a matching `currentPassword`, except
/// when no password has been set yet.
pub async fn change_password<S, T>(
  State(state): State<AppState<S, T>>,
  gate: AdminOrBootstrap,
  ApiJson(body): ApiJson<ChangePasswordBody>,
) -> Result<Json<ChangePasswordResponse>, ApiError>
where
  S: HubStore + 'static,
  T: ThemeStore + 'static,
{
  if gate == AdminOrBootstrap::Admin {
    let stored = stored_password(state.store.as_ref())
      .await?
      .ok_or(ApiError::Unauthorized)?;
    if !verify_password(&stored, &body.current_password) {
      return Err(ApiError::Unauthorized);
    }
  }

  validate_new_password(&body.new_password)?;

  let value = if state.auth.hash_admin_password {
    hash_password(&body.new_password)?
  } else {
    body.new_password
  };
  state
    .store
    .save_setting(NewSetting::new(SettingKey::AdminPassword.as_str(), value))
    .await
    .map_err(ApiError::store)?;

  tracing::info!(bootstrap = (gate == AdminOrBootstrap::Bootstrap), "admin password changed");
  Ok(Json(ChangePasswordResponse {
    success: true,
    message: "Password updated successfully".to_owned(),
  }))
}
