//! Cache and session behaviour against a real API router on a local port.

use std::{collections::BTreeMap, path::Path};

use streamhub_api::{AppState, AuthConfig, api_router};
use streamhub_core::{
  announcement::{AnnouncementDraft, AnnouncementKind},
  memory::{MemoryStore, MemoryThemeStore},
  schedule::ScheduleDraft,
  setting::{NewSetting, SettingKey},
  store::HubStore,
};
use tokio::net::TcpListener;

use crate::{
  cache::{CachedClient, LocalCache, Source},
  client::{ApiClient, ApiConfig},
};

const PASSWORD: &str = "letmein";

/// Serve a fresh in-memory hub and return its base URL.
async fn serve() -> (String, MemoryStore) {
  let store = MemoryStore::new();
  store
    .save_setting(NewSetting::new(SettingKey::AdminPassword.as_str(), PASSWORD))
    .await
    .unwrap();
  store.save_setting(NewSetting::new("banner_text", "From the server")).await.unwrap();

  let state = AppState::new(store.clone(), MemoryThemeStore::new(), AuthConfig::default());
  let app = axum::Router::new().nest("/api", api_router(state));
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
  (format!("http://{addr}"), store)
}

/// A base URL nothing is listening on.
async fn dead_url() -> String {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  drop(listener);
  format!("http://{addr}")
}

async fn hub(url: &str, cache: &Path) -> CachedClient {
  let api = ApiClient::new(ApiConfig { base_url: url.to_owned(), token: None }).unwrap();
  CachedClient::new(api, LocalCache::load(cache).await.unwrap())
}

#[tokio::test]
async fn server_read_then_cache_fallback() {
  let dir = tempfile::tempdir().unwrap();
  let cache = dir.path().join("cache.json");
  let (url, _) = serve().await;

  let mut online = hub(&url, &cache).await;
  let fetched = online.fetch_settings().await;
  assert_eq!(fetched.source, Source::Server);
  assert_eq!(fetched.value.banner_text, "From the server");
  assert!(fetched.last_sync.is_some());
  assert_eq!(online.fetch_schedule().await.source, Source::Server);

  let mut offline = hub(&dead_url().await, &cache).await;
  let fetched = offline.fetch_settings().await;
  assert_eq!(fetched.source, Source::Cache);
  assert_eq!(fetched.value.banner_text, "From the server");

  // The server said "no schedule"; the cache remembers that answer.
  let schedule = offline.fetch_schedule().await;
  assert_eq!(schedule.source, Source::Cache);
  assert!(schedule.value.is_none());

  // Never fetched while online.
  let announcements = offline.fetch_announcements().await;
  assert_eq!(announcements.source, Source::Baseline);
  assert!(announcements.value.is_empty());
}

#[tokio::test]
async fn no_server_no_cache_gives_baseline() {
  let dir = tempfile::tempdir().unwrap();
  let mut offline = hub(&dead_url().await, &dir.path().join("cache.json")).await;

  let fetched = offline.fetch_settings().await;
  assert_eq!(fetched.source, Source::Baseline);
  assert_eq!(fetched.value.banner_text, "Welcome to the Stream Hub!");
  assert!(fetched.last_sync.is_none());

  let schedule = offline.fetch_schedule().await;
  assert_eq!(schedule.source, Source::Baseline);
  assert!(schedule.value.is_none());
}

#[tokio::test]
async fn failed_settings_write_is_echoed_locally_and_marked_dirty() {
  let dir = tempfile::tempdir().unwrap();
  let cache = dir.path().join("cache.json");
  let mut offline = hub(&dead_url().await, &cache).await;

  let entries = BTreeMap::from([("dark_mode".to_owned(), "false".to_owned())]);
  assert!(offline.save_settings(entries).await.is_err());
  assert!(offline.cache().data().settings.dirty);

  let fetched = offline.fetch_settings().await;
  assert_eq!(fetched.source, Source::Cache);
  assert!(!fetched.value.dark_mode);

  // A later successful read overwrites the optimistic copy.
  let (url, _) = serve().await;
  let mut online = hub(&url, &cache).await;
  let fetched = online.fetch_settings().await;
  assert_eq!(fetched.source, Source::Server);
  assert!(fetched.value.dark_mode);
  assert!(!online.cache().data().settings.dirty);
}

#[tokio::test]
async fn invalid_settings_never_touch_the_cache() {
  let dir = tempfile::tempdir().unwrap();
  let mut offline = hub(&dead_url().await, &dir.path().join("cache.json")).await;
  let entries = BTreeMap::from([("show_banner".to_owned(), "yes".to_owned())]);
  assert!(offline.save_settings(entries).await.is_err());
  assert!(offline.cache().data().settings.value.is_none());
}

#[tokio::test]
async fn login_persists_token_and_enables_writes() {
  let dir = tempfile::tempdir().unwrap();
  let cache = dir.path().join("cache.json");
  let (url, store) = serve().await;

  let mut client = hub(&url, &cache).await;
  assert!(!client.login("nope").await.unwrap());
  assert!(!client.is_authenticated());
  assert!(client.login(PASSWORD).await.unwrap());

  // A new process picks the session up from the cache file.
  let mut client = hub(&url, &cache).await;
  assert!(client.is_authenticated());

  let entries = BTreeMap::from([("primary_color".to_owned(), "#112233".to_owned())]);
  let saved = client.save_settings(entries).await.unwrap();
  assert_eq!(saved[0].value, "#112233");
  assert_eq!(store.get_setting("primary_color").await.unwrap().unwrap().value, "#112233");

  let created = client
    .create_announcement(&AnnouncementDraft::new(
      "Going live",
      "Tonight at eight, bring snacks",
      AnnouncementKind::Important,
    ))
    .await
    .unwrap();
  assert_eq!(created.kind, AnnouncementKind::Important);
  client.delete_announcement(created.id).await.unwrap();
  assert!(client.delete_announcement(created.id).await.is_err());

  client.logout().await.unwrap();
  let client = hub(&url, &cache).await;
  assert!(!client.is_authenticated());
}

#[tokio::test]
async fn schedule_write_refreshes_cached_schedule() {
  let dir = tempfile::tempdir().unwrap();
  let cache = dir.path().join("cache.json");
  let (url, _) = serve().await;

  let mut client = hub(&url, &cache).await;
  client.login(PASSWORD).await.unwrap();
  let saved = client
    .save_schedule(&ScheduleDraft::new("Tokyo walk", "IRL", "2024-11-02", "09:30"))
    .await
    .unwrap();

  let mut offline = hub(&dead_url().await, &cache).await;
  let cached = offline.fetch_schedule().await;
  assert_eq!(cached.source, Source::Cache);
  assert_eq!(cached.value, Some(saved));
}

#[tokio::test]
async fn change_password_switches_session() {
  let dir = tempfile::tempdir().unwrap();
  let cache = dir.path().join("cache.json");
  let (url, _) = serve().await;

  let mut client = hub(&url, &cache).await;
  assert!(client.change_password("wrong", "brand-new").await.is_err());
  assert!(!client.is_authenticated());

  client.change_password(PASSWORD, "brand-new").await.unwrap();
  assert_eq!(client.cache().data().token.as_deref(), Some("brand-new"));

  let entries = BTreeMap::from([("banner_text".to_owned(), "rotated".to_owned())]);
  client.save_settings(entries).await.unwrap();
}

#[tokio::test]
async fn later_successful_write_keeps_earlier_rejection_dirty() {
  let dir = tempfile::tempdir().unwrap();
  let cache = dir.path().join("cache.json");
  let (url, store) = serve().await;

  let mut online = hub(&url, &cache).await;
  online.login(PASSWORD).await.unwrap();

  let mut offline = hub(&dead_url().await, &cache).await;
  let entries = BTreeMap::from([("dark_mode".to_owned(), "false".to_owned())]);
  assert!(offline.save_settings(entries).await.is_err());
  assert!(offline.cache().data().settings.dirty);

  let mut online = hub(&url, &cache).await;
  let entries = BTreeMap::from([("banner_text".to_owned(), "Back online".to_owned())]);
  online.save_settings(entries).await.unwrap();

  // The mirror still holds `dark_mode=false`, which the server never saw.
  assert!(store.get_setting("dark_mode").await.unwrap().is_none());
  let section = &online.cache().data().settings;
  assert_eq!(section.value.as_ref().unwrap()["dark_mode"], "false");
  assert!(section.dirty);

  let fetched = online.fetch_settings().await;
  assert_eq!(fetched.source, Source::Server);
  assert!(fetched.value.dark_mode);
  assert_eq!(fetched.value.banner_text, "Back online");
  assert!(!online.cache().data().settings.dirty);
}
