//! In-memory backends.
//!
//! [`MemoryStore`] and [`MemoryThemeStore`] keep everything behind a single
//! async mutex each. Every operation, including the schedule
//! deactivate-then-insert pair, runs under one lock acquisition.
//!
//! Clones share the same underlying state.

use std::{collections::BTreeMap, convert::Infallible, sync::Arc};

use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
  announcement::{Announcement, NewAnnouncement, sort_newest_first},
  schedule::{NewSchedule, StreamSchedule},
  setting::{NewSetting, Setting},
  store::{HubStore, ThemeStore},
  theme::{ThemeArtifact, ThemeDocument},
};

// ─── Hub store ───────────────────────────────────────────────────────────────

#[derive(Default)]
struct Tables {
  /// Keyed by setting key; the key is unique.
  settings:          BTreeMap<String, Setting>,
  announcements:     BTreeMap<i64, Announcement>,
  schedules:         BTreeMap<i64, StreamSchedule>,
  next_setting:      i64,
  next_announcement: i64,
  next_schedule:     i64,
}

fn bump(counter: &mut i64) -> i64 {
  *counter += 1;
  *counter
}

/// A [`HubStore`] that lives only as long as the process.
#[derive(Clone, Default)]
pub struct MemoryStore {
  tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

impl HubStore for MemoryStore {
  type Error = Infallible;

  async fn get_setting(&self, key: &str) -> Result<Option<Setting>, Infallible> {
    Ok(self.tables.lock().await.settings.get(key).cloned())
  }

  async fn list_settings(&self) -> Result<Vec<Setting>, Infallible> {
    Ok(self.tables.lock().await.settings.values().cloned().collect())
  }

  async fn save_setting(&self, input: NewSetting) -> Result<Setting, Infallible> {
    let mut t = self.tables.lock().await;
    if let Some(existing) = t.settings.get_mut(&input.key) {
      existing.value = input.value;
      return Ok(existing.clone());
    }
    let id = bump(&mut t.next_setting);
    let row = Setting { id, key: input.key, value: input.value };
    t.settings.insert(row.key.clone(), row.clone());
    Ok(row)
  }

  async fn list_announcements(&self) -> Result<Vec<Announcement>, Infallible> {
    let mut items: Vec<_> = self.tables.lock().await.announcements.values().cloned().collect();
    sort_newest_first(&mut items);
    Ok(items)
  }

  async fn get_announcement(&self, id: i64) -> Result<Option<Announcement>, Infallible> {
    Ok(self.tables.lock().await.announcements.get(&id).cloned())
  }

  async fn create_announcement(&self, input: NewAnnouncement) -> Result<Announcement, Infallible> {
    let mut t = self.tables.lock().await;
    let id = bump(&mut t.next_announcement);
    let row = Announcement {
      id,
      title: input.title().to_owned(),
      content: input.content().to_owned(),
      kind: input.kind(),
      timestamp: Utc::now(),
    };
    t.announcements.insert(id, row.clone());
    Ok(row)
  }

  async fn delete_announcement(&self, id: i64) -> Result<bool, Infallible> {
    Ok(self.tables.lock().await.announcements.remove(&id).is_some())
  }

  async fn active_schedule(&self) -> Result<Option<StreamSchedule>, Infallible> {
    Ok(self.tables.lock().await.schedules.values().find(|s| s.is_active).cloned())
  }

  async fn list_schedules(&self) -> Result<Vec<StreamSchedule>, Infallible> {
    Ok(self.tables.lock().await.schedules.values().rev().cloned().collect())
  }

  async fn activate_schedule(&self, input: NewSchedule) -> Result<StreamSchedule, Infallible> {
    let mut t = self.tables.lock().await;
    for s in t.schedules.values_mut().filter(|s| s.is_active) {
      s.is_active = false;
    }
    let id = bump(&mut t.next_schedule);
    let row = input.into_active(id);
    t.schedules.insert(id, row.clone());
    Ok(row)
  }

  async fn delete_schedule(&self, id: i64) -> Result<bool, Infallible> {
    Ok(self.tables.lock().await.schedules.remove(&id).is_some())
  }
}

// ─── Theme store ─────────────────────────────────────────────────────────────

/// A [`ThemeStore`] holding the document in memory.
#[derive(Clone, Default)]
pub struct MemoryThemeStore {
  doc: Arc<Mutex<Option<ThemeDocument>>>,
}

impl MemoryThemeStore {
  pub fn new() -> Self { Self::default() }
}

/// Error type for [`MemoryThemeStore`]; only serialisation can fail.
pub type MemoryThemeError = crate::Error;

impl ThemeStore for MemoryThemeStore {
  type Error = MemoryThemeError;

  async fn load_theme(&self) -> Result<Option<ThemeDocument>, Self::Error> {
    Ok(self.doc.lock().await.clone())
  }

  async fn merge_theme(&self, artifact: ThemeArtifact) -> Result<ThemeDocument, Self::Error> {
    let mut guard = self.doc.lock().await;
    let mut doc = guard.clone().unwrap_or_default();
    artifact.merge_into(&mut doc)?;
    *guard = Some(doc.clone());
    Ok(doc)
  }
}
