//! Two-tier reads: the server first, then a local JSON mirror, then baseline
//! defaults.
//!
//! Every successful server read refreshes the mirror. Settings writes are
//! echoed into the mirror even when the server rejects them; the section is
//! then marked `dirty` until the next successful read replaces it. Each
//! section remembers when it was last confirmed by the server, so callers
//! can judge staleness themselves.

use std::{
  collections::BTreeMap,
  io::ErrorKind,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use streamhub_core::{
  announcement::{Announcement, AnnouncementDraft},
  schedule::{ScheduleDraft, StreamSchedule},
  setting::{AppSettings, Setting, validate_entry},
};
use strum::Display;

use crate::client::ApiClient;

// ─── Fetch results ────────────────────────────────────────────────────────────

/// Where a value handed to the caller came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Source {
  Server,
  Cache,
  Baseline,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
  pub value:     T,
  pub source:    Source,
  /// When the server last confirmed this section; `None` if never.
  pub last_sync: Option<DateTime<Utc>>,
}

impl<T> Fetched<T> {
  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
    Fetched { value: f(self.value), source: self.source, last_sync: self.last_sync }
  }
}

// ─── Cache file ───────────────────────────────────────────────────────────────

/// One mirrored resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Section<T> {
  pub value:     Option<T>,
  pub last_sync: Option<DateTime<Utc>>,
  /// Holds a local write the server has not accepted.
  pub dirty:     bool,
}

impl<T> Default for Section<T> {
  fn default() -> Self { Self { value: None, last_sync: None, dirty: false } }
}

impl<T> Section<T> {
  /// Whether this section has anything to serve. A synced section with no
  /// value means the server reported "none", which is itself an answer.
  fn is_populated(&self) -> bool { self.value.is_some() || self.last_sync.is_some() }

  fn synced(&mut self, value: Option<T>) {
    self.value = value;
    self.last_sync = Some(Utc::now());
    self.dirty = false;
  }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheData {
  pub settings:      Section<BTreeMap<String, String>>,
  pub announcements: Section<Vec<Announcement>>,
  pub schedule:      Section<StreamSchedule>,
  /// Admin bearer credential from the last successful login.
  pub token:         Option<String>,
}

/// The mirror as it lives on disk.
#[derive(Debug)]
pub struct LocalCache {
  path: PathBuf,
  data: CacheData,
}

/// `$XDG_CACHE_HOME/streamhub/cache.json`, falling back to `~/.cache`.
pub fn default_cache_path() -> PathBuf {
  let base = std::env::var_os("XDG_CACHE_HOME")
    .filter(|v| !v.is_empty())
    .map(PathBuf::from)
    .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".cache")))
    .unwrap_or_else(|| PathBuf::from("."));
  base.join("streamhub").join("cache.json")
}

impl LocalCache {
  /// Load the cache at `path`. A missing file is an empty cache; a corrupt
  /// one is discarded with a warning.
  pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref().to_path_buf();
    let data = match tokio::fs::read(&path).await {
      Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "discarding unreadable cache");
        CacheData::default()
      }),
      Err(e) if e.kind() == ErrorKind::NotFound => CacheData::default(),
      Err(e) => {
        return Err(e).with_context(|| format!("reading cache {}", path.display()));
      }
    };
    Ok(Self { path, data })
  }

  pub fn data(&self) -> &CacheData { &self.data }

  /// Write the cache through a temp file and rename.
  pub async fn save(&self) -> Result<()> {
    if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(parent)
        .await
        .with_context(|| format!("creating {}", parent.display()))?;
    }
    let mut tmp = self.path.clone().into_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    let body = serde_json::to_vec_pretty(&self.data).context("serialising cache")?;
    tokio::fs::write(&tmp, body)
      .await
      .with_context(|| format!("writing {}", tmp.display()))?;
    tokio::fs::rename(&tmp, &self.path)
      .await
      .with_context(|| format!("replacing {}", self.path.display()))?;
    Ok(())
  }
}

// ─── Cached client ────────────────────────────────────────────────────────────

/// [`ApiClient`] plus the local mirror and the login session.
pub struct CachedClient {
  api:   ApiClient,
  cache: LocalCache,
}

impl CachedClient {
  pub fn new(mut api: ApiClient, cache: LocalCache) -> Self {
    if let Some(token) = cache.data.token.clone() {
      api.set_token(Some(token));
    }
    Self { api, cache }
  }

  pub fn api(&self) -> &ApiClient { &self.api }

  pub fn cache(&self) -> &LocalCache { &self.cache }

  pub fn is_authenticated(&self) -> bool { self.cache.data.token.is_some() }

  async fn persist(&self) {
    if let Err(e) = self.cache.save().await {
      tracing::warn!(error = %e, "failed to write local cache");
    }
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// Settings as the typed aggregate.
  pub async fn fetch_settings(&mut self) -> Fetched<AppSettings> {
    self.fetch_settings_raw().await.map(|m| AppSettings::decode(&m))
  }

  pub async fn fetch_settings_raw(&mut self) -> Fetched<BTreeMap<String, String>> {
    match self.api.get_settings().await {
      Ok(map) => {
        self.cache.data.settings.synced(Some(map.clone()));
        self.persist().await;
        let last_sync = self.cache.data.settings.last_sync;
        Fetched { value: map, source: Source::Server, last_sync }
      }
      Err(e) => {
        tracing::warn!(error = %e, "settings unavailable from server; using local copy");
        fallback(&self.cache.data.settings, BTreeMap::new())
      }
    }
  }

  pub async fn fetch_announcements(&mut self) -> Fetched<Vec<Announcement>> {
    match self.api.list_announcements().await {
      Ok(items) => {
        self.cache.data.announcements.synced(Some(items.clone()));
        self.persist().await;
        let last_sync = self.cache.data.announcements.last_sync;
        Fetched { value: items, source: Source::Server, last_sync }
      }
      Err(e) => {
        tracing::warn!(error = %e, "announcements unavailable from server; using local copy");
        fallback(&self.cache.data.announcements, Vec::new())
      }
    }
  }

  pub async fn fetch_schedule(&mut self) -> Fetched<Option<StreamSchedule>> {
    match self.api.get_schedule().await {
      Ok(active) => {
        self.cache.data.schedule.synced(active.clone());
        self.persist().await;
        let last_sync = self.cache.data.schedule.last_sync;
        Fetched { value: active, source: Source::Server, last_sync }
      }
      Err(e) => {
        tracing::warn!(error = %e, "schedule unavailable from server; using local copy");
        let section = &self.cache.data.schedule;
        let source = if section.is_populated() { Source::Cache } else { Source::Baseline };
        Fetched { value: section.value.clone(), source, last_sync: section.last_sync }
      }
    }
  }

  // ── Writes ────────────────────────────────────────────────────────────────

  /// Save raw settings. The local mirror is updated first and stays updated
  /// even if the server write fails; the error is still returned.
  pub async fn save_settings(
    &mut self,
    entries: BTreeMap<String, String>,
  ) -> Result<Vec<Setting>> {
    for (key, value) in &entries {
      validate_entry(key, value)?;
    }

    let section = &mut self.cache.data.settings;
    section.value.get_or_insert_with(BTreeMap::new).extend(entries.clone());

    let result = self.api.save_settings(&entries).await;
    match &result {
      // An earlier rejected write may still sit in the mirror; only a full
      // read clears `dirty`.
      Ok(_) if !self.cache.data.settings.dirty => {
        self.cache.data.settings.last_sync = Some(Utc::now());
      }
      Ok(_) => {}
      Err(e) => {
        tracing::warn!(error = %e, "settings write failed; kept local copy");
        self.cache.data.settings.dirty = true;
      }
    }
    self.persist().await;
    result
  }

  pub async fn create_announcement(&self, draft: &AnnouncementDraft) -> Result<Announcement> {
    // Fail fast on input the server would reject anyway.
    draft.clone().validate()?;
    self.api.create_announcement(draft).await
  }

  pub async fn delete_announcement(&self, id: i64) -> Result<()> {
    self.api.delete_announcement(id).await
  }

  /// Create and activate a schedule, then mirror it as the active one.
  pub async fn save_schedule(&mut self, draft: &ScheduleDraft) -> Result<StreamSchedule> {
    draft.clone().validate()?;
    let saved = self.api.save_schedule(draft).await?;
    self.cache.data.schedule.synced(Some(saved.clone()));
    self.persist().await;
    Ok(saved)
  }

  // ── Session ───────────────────────────────────────────────────────────────

  /// Verify `password` and, if it is right, keep it as the bearer token.
  pub async fn login(&mut self, password: &str) -> Result<bool> {
    if !self.api.verify(password).await? {
      return Ok(false);
    }
    self.cache.data.token = Some(password.to_owned());
    self.api.set_token(Some(password.to_owned()));
    self.cache.save().await?;
    Ok(true)
  }

  /// Forget the session locally. Nothing is sent to the server.
  pub async fn logout(&mut self) -> Result<()> {
    self.cache.data.token = None;
    self.api.set_token(None);
    self.cache.save().await
  }

  /// Change the admin password and switch the session to the new one.
  pub async fn change_password(&mut self, current: &str, new: &str) -> Result<String> {
    // Without a session the current password doubles as the bearer.
    if self.cache.data.token.is_none() {
      self.api.set_token(Some(current.to_owned()));
    }
    let message = match self.api.change_password(current, new).await {
      Ok(m) => m,
      Err(e) => {
        self.api.set_token(self.cache.data.token.clone());
        return Err(e);
      }
    };
    self.cache.data.token = Some(new.to_owned());
    self.api.set_token(Some(new.to_owned()));
    self.cache.save().await?;
    Ok(message)
  }
}

fn fallback<T: Clone>(section: &Section<T>, baseline: T) -> Fetched<T> {
  match &section.value {
    Some(v) => Fetched { value: v.clone(), source: Source::Cache, last_sync: section.last_sync },
    None => Fetched { value: baseline, source: Source::Baseline, last_sync: None },
  }
}
