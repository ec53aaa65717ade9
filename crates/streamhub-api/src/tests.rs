//! Router-level tests driven through `tower::ServiceExt::oneshot`.

use std::{
  convert::Infallible,
  sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
  },
  time::Duration,
};

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use streamhub_core::{
  announcement::{Announcement, NewAnnouncement},
  memory::{MemoryStore, MemoryThemeStore},
  schedule::{NewSchedule, StreamSchedule},
  setting::{NewSetting, Setting, SettingKey},
  store::{HubStore, ThemeStore},
  theme::{ThemeArtifact, ThemeDocument},
};
use streamhub_store_sqlite::SqliteStore;
use tower::ServiceExt as _;

use crate::{AppState, AuthConfig, api_router, auth::verify_password, theme_sync::spawn_theme_sync};

const PASSWORD: &str = "letmein";

type MemState = AppState<MemoryStore, MemoryThemeStore>;

async fn make_state(password: Option<&str>) -> MemState {
  let store = MemoryStore::new();
  if let Some(pw) = password {
    store
      .save_setting(NewSetting::new(SettingKey::AdminPassword.as_str(), pw))
      .await
      .unwrap();
  }
  AppState::new(store, MemoryThemeStore::new(), AuthConfig::default())
}

fn app<S, T>(state: &AppState<S, T>) -> Router
where
  S: HubStore + Clone + 'static,
  T: ThemeStore + Clone + 'static,
{
  api_router(state.clone())
}

async fn call(
  router: Router,
  method: &str,
  uri: &str,
  auth: Option<&str>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut req = Request::builder().method(method).uri(uri);
  if let Some(pw) = auth {
    req = req.header(header::AUTHORIZATION, format!("Bearer {pw}"));
  }
  let req = match body {
    Some(b) => req
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(b.to_string()))
      .unwrap(),
    None => req.body(Body::empty()).unwrap(),
  };

  let resp = router.oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, value)
}

async fn wait_for_theme<T: ThemeStore>(themes: &T, primary: &str) -> ThemeDocument {
  for _ in 0..100 {
    if let Some(doc) = themes.load_theme().await.unwrap() {
      if doc.get("primary").and_then(Value::as_str) == Some(primary) {
        return doc;
      }
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
  }
  panic!("theme never reached primary {primary}");
}

// ─── Settings ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn save_then_list_includes_value() {
  let state = make_state(Some(PASSWORD)).await;

  let (status, saved) = call(
    app(&state),
    "POST",
    "/settings",
    Some(PASSWORD),
    Some(json!({ "primary_color": "#112233", "show_banner": "true" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(saved.as_array().unwrap().len(), 2);

  let (status, all) = call(app(&state), "GET", "/settings", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(all["primary_color"], "#112233");
  assert_eq!(all["show_banner"], "true");

  let (status, one) = call(app(&state), "GET", "/settings/primary_color", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(one, json!({ "value": "#112233" }));
}

#[tokio::test]
async fn missing_setting_is_404() {
  let state = make_state(Some(PASSWORD)).await;
  let (status, body) = call(app(&state), "GET", "/settings/nothing_here", None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["message"].is_string());
}

#[tokio::test]
async fn admin_password_is_never_readable() {
  let state = make_state(Some(PASSWORD)).await;

  let (_, all) = call(app(&state), "GET", "/settings", None, None).await;
  assert!(all.get("admin_password").is_none());

  let (status, _) = call(app(&state), "GET", "/settings/admin_password", None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_password_cannot_be_written_through_settings() {
  let state = make_state(Some(PASSWORD)).await;
  let (status, _) = call(
    app(&state),
    "POST",
    "/settings",
    Some(PASSWORD),
    Some(json!({ "admin_password": "pwned!" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let stored = state.store.get_setting("admin_password").await.unwrap().unwrap();
  assert_eq!(stored.value, PASSWORD);
}

#[tokio::test]
async fn invalid_value_rejects_whole_batch() {
  let state = make_state(Some(PASSWORD)).await;
  let (status, _) = call(
    app(&state),
    "POST",
    "/settings",
    Some(PASSWORD),
    Some(json!({ "banner_text": "hello", "dark_mode": "sometimes" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(state.store.get_setting("banner_text").await.unwrap().is_none());
}

#[tokio::test]
async fn non_string_values_are_skipped() {
  let state = make_state(Some(PASSWORD)).await;
  let (status, saved) = call(
    app(&state),
    "POST",
    "/settings",
    Some(PASSWORD),
    Some(json!({ "banner_text": "hi", "show_banner": true })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  let saved: Vec<Setting> = serde_json::from_value(saved).unwrap();
  assert_eq!(saved.len(), 1);
  assert_eq!(saved[0].key, "banner_text");
}

#[tokio::test]
async fn settings_write_requires_bearer() {
  let state = make_state(Some(PASSWORD)).await;
  let body = json!({ "banner_text": "nope" });

  let (status, msg) = call(app(&state), "POST", "/settings", None, Some(body.clone())).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(msg["message"], "Authentication required");

  let (status, _) = call(app(&state), "POST", "/settings", Some("wrong"), Some(body)).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  assert_eq!(state.store.list_settings().await.unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_json_is_400() {
  let state = make_state(Some(PASSWORD)).await;
  let req = Request::builder()
    .method("POST")
    .uri("/settings")
    .header(header::AUTHORIZATION, format!("Bearer {PASSWORD}"))
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{not json"))
    .unwrap();
  let resp = app(&state).oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// ─── Theme ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn saving_primary_color_regenerates_theme() {
  let state = make_state(Some(PASSWORD)).await;
  let _sync = spawn_theme_sync(state.store.clone(), state.themes.clone(), &state.events);

  let (status, _) = call(
    app(&state),
    "POST",
    "/settings",
    Some(PASSWORD),
    Some(json!({ "primary_color": "#112233" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let doc = wait_for_theme(state.themes.as_ref(), "#112233").await;
  assert_eq!(doc["appearance"], "dark");
  // No seasonal key stored yet.
  assert_eq!(doc["radius"], 0.5);
}

#[tokio::test]
async fn seasonal_theme_drives_radius_and_variant() {
  let state = make_state(Some(PASSWORD)).await;
  let _sync = spawn_theme_sync(state.store.clone(), state.themes.clone(), &state.events);

  call(
    app(&state),
    "POST",
    "/settings",
    Some(PASSWORD),
    Some(json!({ "primary_color": "#aa0000", "seasonal_theme": "christmas" })),
  )
  .await;
  let doc = wait_for_theme(state.themes.as_ref(), "#aa0000").await;
  assert_eq!(doc["radius"], 1.0);
  assert_eq!(doc["variant"], "tint");

  call(
    app(&state),
    "POST",
    "/settings",
    Some(PASSWORD),
    Some(json!({ "primary_color": "#bb0000", "seasonal_theme": "halloween" })),
  )
  .await;
  let doc = wait_for_theme(state.themes.as_ref(), "#bb0000").await;
  assert_eq!(doc["radius"], 0.25);
  assert_eq!(doc["variant"], "vibrant");
}

#[tokio::test]
async fn theme_get_and_direct_write() {
  let state = make_state(Some(PASSWORD)).await;

  let (status, _) = call(app(&state), "GET", "/theme", None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = call(
    app(&state),
    "POST",
    "/theme",
    Some(PASSWORD),
    Some(json!({ "primary": "#000000", "appearance": "light", "variant": "tint" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (status, doc) = call(
    app(&state),
    "POST",
    "/theme",
    Some(PASSWORD),
    Some(json!({ "primary": "#000000", "appearance": "light", "radius": 0.3, "variant": "tint" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(doc["appearance"], "light");

  let (status, fetched) = call(app(&state), "GET", "/theme", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(fetched, doc);
}

#[derive(Clone)]
struct BrokenThemes;

impl ThemeStore for BrokenThemes {
  type Error = std::io::Error;

  async fn load_theme(&self) -> Result<Option<ThemeDocument>, Self::Error> {
    Err(std::io::Error::other("disk on fire"))
  }

  async fn merge_theme(&self, _: ThemeArtifact) -> Result<ThemeDocument, Self::Error> {
    Err(std::io::Error::other("disk on fire"))
  }
}

#[tokio::test]
async fn theme_failure_does_not_fail_settings_save() {
  let store = MemoryStore::new();
  store
    .save_setting(NewSetting::new(SettingKey::AdminPassword.as_str(), PASSWORD))
    .await
    .unwrap();
  let state = AppState::new(store, BrokenThemes, AuthConfig::default());
  let _sync = spawn_theme_sync(state.store.clone(), state.themes.clone(), &state.events);

  let (status, _) = call(
    app(&state),
    "POST",
    "/settings",
    Some(PASSWORD),
    Some(json!({ "dark_mode": "false" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(state.store.get_setting("dark_mode").await.unwrap().unwrap().value, "false");
}

/// A [`MemoryStore`] whose `fail_on`-th `save_setting` call errors.
#[derive(Clone)]
struct FlakyStore {
  inner:   MemoryStore,
  saves:   Arc<AtomicUsize>,
  fail_on: usize,
}

fn never(e: Infallible) -> std::io::Error { match e {} }

impl HubStore for FlakyStore {
  type Error = std::io::Error;

  async fn get_setting(&self, key: &str) -> Result<Option<Setting>, Self::Error> {
    self.inner.get_setting(key).await.map_err(never)
  }
  async fn list_settings(&self) -> Result<Vec<Setting>, Self::Error> {
    self.inner.list_settings().await.map_err(never)
  }
  async fn save_setting(&self, input: NewSetting) -> Result<Setting, Self::Error> {
    if self.saves.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_on {
      return Err(std::io::Error::other("write failed"));
    }
    self.inner.save_setting(input).await.map_err(never)
  }
  async fn list_announcements(&self) -> Result<Vec<Announcement>, Self::Error> {
    self.inner.list_announcements().await.map_err(never)
  }
  async fn get_announcement(&self, id: i64) -> Result<Option<Announcement>, Self::Error> {
    self.inner.get_announcement(id).await.map_err(never)
  }
  async fn create_announcement(&self, input: NewAnnouncement) -> Result<Announcement, Self::Error> {
    self.inner.create_announcement(input).await.map_err(never)
  }
  async fn delete_announcement(&self, id: i64) -> Result<bool, Self::Error> {
    self.inner.delete_announcement(id).await.map_err(never)
  }
  async fn active_schedule(&self) -> Result<Option<StreamSchedule>, Self::Error> {
    self.inner.active_schedule().await.map_err(never)
  }
  async fn list_schedules(&self) -> Result<Vec<StreamSchedule>, Self::Error> {
    self.inner.list_schedules().await.map_err(never)
  }
  async fn activate_schedule(&self, input: NewSchedule) -> Result<StreamSchedule, Self::Error> {
    self.inner.activate_schedule(input).await.map_err(never)
  }
  async fn delete_schedule(&self, id: i64) -> Result<bool, Self::Error> {
    self.inner.delete_schedule(id).await.map_err(never)
  }
}

#[tokio::test]
async fn partial_batch_failure_still_regenerates_theme() {
  let inner = MemoryStore::new();
  inner
    .save_setting(NewSetting::new(SettingKey::AdminPassword.as_str(), PASSWORD))
    .await
    .unwrap();
  let store = FlakyStore { inner, saves: Arc::new(AtomicUsize::new(0)), fail_on: 2 };
  let state = AppState::new(store, MemoryThemeStore::new(), AuthConfig::default());
  let _sync = spawn_theme_sync(state.store.clone(), state.themes.clone(), &state.events);

  // The colour is written first; the second write fails.
  let (status, body) = call(
    app(&state),
    "POST",
    "/settings",
    Some(PASSWORD),
    Some(json!({ "primary_color": "#abcdef", "zz_key": "1" })),
  )
  .await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body["message"], "Internal server error");

  assert_eq!(state.store.get_setting("primary_color").await.unwrap().unwrap().value, "#abcdef");
  assert!(state.store.get_setting("zz_key").await.unwrap().is_none());
  let doc = wait_for_theme(state.themes.as_ref(), "#abcdef").await;
  assert_eq!(doc["primary"], "#abcdef");
}

// ─── Announcements ────────────────────────────────────────────────────────────

#[tokio::test]
async fn announcement_lifecycle() {
  let state = make_state(Some(PASSWORD)).await;

  let (status, created) = call(
    app(&state),
    "POST",
    "/announcements",
    Some(PASSWORD),
    Some(json!({ "title": "Going live", "content": "Tonight at eight, see you there", "type": "special" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let created: Announcement = serde_json::from_value(created).unwrap();

  let (_, listed) = call(app(&state), "GET", "/announcements", None, None).await;
  assert_eq!(listed.as_array().unwrap().len(), 1);
  assert_eq!(listed[0]["type"], "special");

  let uri = format!("/announcements/{}", created.id);
  let (status, _) = call(app(&state), "DELETE", &uri, Some(PASSWORD), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (_, listed) = call(app(&state), "GET", "/announcements", None, None).await;
  assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn short_announcement_is_rejected_and_not_listed() {
  let state = make_state(Some(PASSWORD)).await;
  for body in [
    json!({ "title": "Hi", "content": "Long enough content" }),
    json!({ "title": "Hello", "content": "too short" }),
  ] {
    let (status, msg) =
      call(app(&state), "POST", "/announcements", Some(PASSWORD), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(msg["message"].as_str().unwrap().contains("between"));
  }
  let (_, listed) = call(app(&state), "GET", "/announcements", None, None).await;
  assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn deleting_unknown_announcement_is_404_and_harmless() {
  let state = make_state(Some(PASSWORD)).await;
  call(
    app(&state),
    "POST",
    "/announcements",
    Some(PASSWORD),
    Some(json!({ "title": "Keep me", "content": "This one should survive" })),
  )
  .await;

  let (status, _) = call(app(&state), "DELETE", "/announcements/999", Some(PASSWORD), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = call(app(&state), "DELETE", "/announcements/abc", Some(PASSWORD), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (_, listed) = call(app(&state), "GET", "/announcements", None, None).await;
  assert_eq!(listed.as_array().unwrap().len(), 1);
}

// ─── Schedule ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn schedule_replaces_active() {
  let state = make_state(Some(PASSWORD)).await;

  let (status, _) = call(app(&state), "GET", "/schedule", None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  for (title, date) in [("First", "2024-10-15"), ("Second", "2024-10-16")] {
    let (status, _) = call(
      app(&state),
      "POST",
      "/schedule",
      Some(PASSWORD),
      Some(json!({ "title": title, "streamType": "IRL", "date": date, "time": "19:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
  }

  let (status, active) = call(app(&state), "GET", "/schedule", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(active["title"], "Second");
  assert_eq!(active["isActive"], true);

  let (status, all) = call(app(&state), "GET", "/schedules", Some(PASSWORD), None).await;
  assert_eq!(status, StatusCode::OK);
  let all: Vec<StreamSchedule> = serde_json::from_value(all).unwrap();
  assert_eq!(all.len(), 2);
  assert_eq!(all.iter().filter(|s| s.is_active).count(), 1);

  let uri = format!("/schedules/{}", all[0].id);
  let (status, _) = call(app(&state), "DELETE", &uri, Some(PASSWORD), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = call(app(&state), "GET", "/schedule", None, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_schedule_is_400() {
  let state = make_state(Some(PASSWORD)).await;
  let (status, _) = call(
    app(&state),
    "POST",
    "/schedule",
    Some(PASSWORD),
    Some(json!({ "title": "x", "streamType": "IRL", "date": "tomorrow", "time": "19:00" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn schedule_listing_requires_bearer() {
  let state = make_state(Some(PASSWORD)).await;
  let (status, _) = call(app(&state), "GET", "/schedules", None, None).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ─── Auth ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn verify_is_exact_match() {
  let state = make_state(Some(PASSWORD)).await;
  for (candidate, expected) in
    [(PASSWORD, true), ("LETMEIN", false), ("letmein ", false), ("", false)]
  {
    let (status, body) = call(
      app(&state),
      "POST",
      "/auth/verify",
      None,
      Some(json!({ "password": candidate })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], expected, "candidate {candidate:?}");
  }

  let (status, _) = call(app(&state), "POST", "/auth/verify", None, Some(json!({}))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn short_new_password_leaves_old_one() {
  let state = make_state(Some(PASSWORD)).await;
  let (status, _) = call(
    app(&state),
    "POST",
    "/auth/change-password",
    Some(PASSWORD),
    Some(json!({ "currentPassword": PASSWORD, "newPassword": "12345" })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (_, body) = call(
    app(&state),
    "POST",
    "/auth/verify",
    None,
    Some(json!({ "password": PASSWORD })),
  )
  .await;
  assert_eq!(body["valid"], true);
}

#[tokio::test]
async fn wrong_current_password_is_401() {
  let state = make_state(Some(PASSWORD)).await;
  let (status, _) = call(
    app(&state),
    "POST",
    "/auth/change-password",
    Some(PASSWORD),
    Some(json!({ "currentPassword": "guess", "newPassword": "brand-new" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn change_password_rotates_bearer() {
  let state = make_state(Some(PASSWORD)).await;
  let (status, body) = call(
    app(&state),
    "POST",
    "/auth/change-password",
    Some(PASSWORD),
    Some(json!({ "currentPassword": PASSWORD, "newPassword": "brand-new" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["success"], true);

  let payload = json!({ "banner_text": "x" });
  let (status, _) =
    call(app(&state), "POST", "/settings", Some(PASSWORD), Some(payload.clone())).await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
  let (status, _) = call(app(&state), "POST", "/settings", Some("brand-new"), Some(payload)).await;
  assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn bootstrap_sets_first_password() {
  let state = make_state(None).await;

  let (_, body) =
    call(app(&state), "POST", "/auth/verify", None, Some(json!({ "password": "" }))).await;
  assert_eq!(body["valid"], false);

  let (status, _) = call(
    app(&state),
    "POST",
    "/auth/change-password",
    None,
    Some(json!({ "newPassword": "first-one" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  // Bootstrap is one-shot.
  let (status, _) = call(
    app(&state),
    "POST",
    "/auth/change-password",
    None,
    Some(json!({ "newPassword": "second-one" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn hashed_passwords_when_enabled() {
  let state = AppState::new(
    MemoryStore::new(),
    MemoryThemeStore::new(),
    AuthConfig { hash_admin_password: true },
  );
  call(
    app(&state),
    "POST",
    "/auth/change-password",
    None,
    Some(json!({ "newPassword": "hashed-pw" })),
  )
  .await;

  let stored = state.store.get_setting("admin_password").await.unwrap().unwrap();
  assert!(stored.value.starts_with("$argon2"));
  assert!(verify_password(&stored.value, "hashed-pw"));

  let (status, _) = call(
    app(&state),
    "POST",
    "/settings",
    Some("hashed-pw"),
    Some(json!({ "banner_text": "ok" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
}

// ─── Store failures ───────────────────────────────────────────────────────────

#[derive(Clone)]
struct BrokenStore;

fn broken() -> std::io::Error { std::io::Error::other("database unavailable") }

impl HubStore for BrokenStore {
  type Error = std::io::Error;

  async fn get_setting(&self, _: &str) -> Result<Option<Setting>, Self::Error> { Err(broken()) }
  async fn list_settings(&self) -> Result<Vec<Setting>, Self::Error> { Err(broken()) }
  async fn save_setting(&self, _: NewSetting) -> Result<Setting, Self::Error> { Err(broken()) }
  async fn list_announcements(&self) -> Result<Vec<Announcement>, Self::Error> { Err(broken()) }
  async fn get_announcement(&self, _: i64) -> Result<Option<Announcement>, Self::Error> {
    Err(broken())
  }
  async fn create_announcement(&self, _: NewAnnouncement) -> Result<Announcement, Self::Error> {
    Err(broken())
  }
  async fn delete_announcement(&self, _: i64) -> Result<bool, Self::Error> { Err(broken()) }
  async fn active_schedule(&self) -> Result<Option<StreamSchedule>, Self::Error> { Err(broken()) }
  async fn list_schedules(&self) -> Result<Vec<StreamSchedule>, Self::Error> { Err(broken()) }
  async fn activate_schedule(&self, _: NewSchedule) -> Result<StreamSchedule, Self::Error> {
    Err(broken())
  }
  async fn delete_schedule(&self, _: i64) -> Result<bool, Self::Error> { Err(broken()) }
}

#[tokio::test]
async fn store_failure_is_opaque_500() {
  let state = AppState::new(BrokenStore, MemoryThemeStore::new(), AuthConfig::default());
  let (status, body) = call(app(&state), "GET", "/announcements", None, None).await;
  assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  assert_eq!(body["message"], "Internal server error");
}

// ─── SQLite backend ───────────────────────────────────────────────────────────

#[tokio::test]
async fn router_works_over_sqlite() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  store
    .save_setting(NewSetting::new(SettingKey::AdminPassword.as_str(), PASSWORD))
    .await
    .unwrap();
  let state = AppState::new(store, MemoryThemeStore::new(), AuthConfig::default());

  let (status, _) = call(
    app(&state),
    "POST",
    "/schedule",
    Some(PASSWORD),
    Some(json!({ "title": "Tokyo", "streamType": "IRL", "date": "2024-11-01", "time": "08:30" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let (status, active) = call(app(&state), "GET", "/schedule", None, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(active["title"], "Tokyo");
}
