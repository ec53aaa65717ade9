//! Async HTTP client wrapping the stream hub JSON API.

use std::{collections::BTreeMap, time::Duration};

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::json;
use streamhub_core::{
  announcement::{Announcement, AnnouncementDraft},
  schedule::{ScheduleDraft, StreamSchedule},
  setting::Setting,
  theme::ThemeDocument,
};

/// Connection settings for the stream hub API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  /// Admin bearer credential; `None` for anonymous reads.
  pub token:    Option<String>,
}

/// Async HTTP client for the stream hub JSON REST API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

#[derive(Deserialize)]
struct ErrorBody {
  message: String,
}

#[derive(Deserialize)]
struct Valid {
  valid: bool,
}

#[derive(Deserialize)]
struct ChangeResult {
  message: String,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  pub fn set_token(&mut self, token: Option<String>) { self.config.token = token; }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    match &self.config.token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  async fn send(&self, what: &str, req: RequestBuilder) -> Result<Response> {
    let resp = req.send().await.with_context(|| format!("{what} failed"))?;
    if resp.status().is_success() {
      return Ok(resp);
    }
    let status = resp.status();
    let message = resp
      .json::<ErrorBody>()
      .await
      .map(|b| b.message)
      .unwrap_or_default();
    Err(anyhow!("{what} → {status} {message}"))
  }

  async fn json<T: DeserializeOwned>(&self, what: &str, req: RequestBuilder) -> Result<T> {
    self
      .send(what, req)
      .await?
      .json()
      .await
      .with_context(|| format!("deserialising {what}"))
  }

  // ── Settings ──────────────────────────────────────────────────────────────

  /// `GET /api/settings`
  pub async fn get_settings(&self) -> Result<BTreeMap<String, String>> {
    self.json("GET /settings", self.client.get(self.url("/settings"))).await
  }

  /// `POST /api/settings`
  pub async fn save_settings(&self, entries: &BTreeMap<String, String>) -> Result<Vec<Setting>> {
    let req = self.auth(self.client.post(self.url("/settings"))).json(entries);
    self.json("POST /settings", req).await
  }

  // ── Announcements ─────────────────────────────────────────────────────────

  /// `GET /api/announcements`
  pub async fn list_announcements(&self) -> Result<Vec<Announcement>> {
    self
      .json("GET /announcements", self.client.get(self.url("/announcements")))
      .await
  }

  /// `POST /api/announcements`
  pub async fn create_announcement(&self, draft: &AnnouncementDraft) -> Result<Announcement> {
    let req = self.auth(self.client.post(self.url("/announcements"))).json(draft);
    self.json("POST /announcements", req).await
  }

  /// `DELETE /api/announcements/{id}`
  pub async fn delete_announcement(&self, id: i64) -> Result<()> {
    let req = self.auth(self.client.delete(self.url(&format!("/announcements/{id}"))));
    self.send("DELETE /announcements/{id}", req).await?;
    Ok(())
  }

  // ── Schedule ──────────────────────────────────────────────────────────────

  /// `GET /api/schedule`; `None` when nothing is active.
  pub async fn get_schedule(&self) -> Result<Option<StreamSchedule>> {
    let resp = self
      .client
      .get(self.url("/schedule"))
      .send()
      .await
      .context("GET /schedule failed")?;
    if resp.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    if !resp.status().is_success() {
      return Err(anyhow!("GET /schedule → {}", resp.status()));
    }
    Ok(Some(resp.json().await.context("deserialising schedule")?))
  }

  /// `POST /api/schedule`
  pub async fn save_schedule(&self, draft: &ScheduleDraft) -> Result<StreamSchedule> {
    let req = self.auth(self.client.post(self.url("/schedule"))).json(draft);
    self.json("POST /schedule", req).await
  }

  /// `GET /api/schedules`
  pub async fn list_schedules(&self) -> Result<Vec<StreamSchedule>> {
    let req = self.auth(self.client.get(self.url("/schedules")));
    self.json("GET /schedules", req).await
  }

  /// `DELETE /api/schedules/{id}`
  pub async fn delete_schedule(&self, id: i64) -> Result<()> {
    let req = self.auth(self.client.delete(self.url(&format!("/schedules/{id}"))));
    self.send("DELETE /schedules/{id}", req).await?;
    Ok(())
  }

  // ── Auth ──────────────────────────────────────────────────────────────────

  /// `POST /api/auth/verify`
  pub async fn verify(&self, password: &str) -> Result<bool> {
    let req = self
      .client
      .post(self.url("/auth/verify"))
      .json(&json!({ "password": password }));
    let body: Valid = self.json("POST /auth/verify", req).await?;
    Ok(body.valid)
  }

  /// `POST /api/auth/change-password`; returns the server's message.
  pub async fn change_password(&self, current: &str, new: &str) -> Result<String> {
    let req = self
      .auth(self.client.post(self.url("/auth/change-password")))
      .json(&json!({ "currentPassword": current, "newPassword": new }));
    let body: ChangeResult = self.json("POST /auth/change-password", req).await?;
    Ok(body.message)
  }

  // ── Theme ─────────────────────────────────────────────────────────────────

  /// `GET /api/theme`
  pub async fn get_theme(&self) -> Result<ThemeDocument> {
    self.json("GET /theme", self.client.get(self.url("/theme"))).await
  }
}
