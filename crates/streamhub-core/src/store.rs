//! The storage traits every backend implements.
//!
//! [`HubStore`] covers the settings table and the two content collections;
//! [`ThemeStore`] persists the derived theme document, which lives apart from
//! the settings table. Higher layers (`streamhub-api`, `streamhub-server`)
//! depend on these abstractions, never on a concrete backend.

use std::future::Future;

use crate::{
  announcement::{Announcement, NewAnnouncement},
  schedule::{NewSchedule, StreamSchedule},
  setting::{NewSetting, Setting},
  theme::{ThemeArtifact, ThemeDocument},
};

// ─── Content and settings ────────────────────────────────────────────────────

/// Abstraction over a stream hub storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait HubStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Settings ──────────────────────────────────────────────────────────

  /// Look up a single setting by key.
  fn get_setting<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<Setting>, Self::Error>> + Send + 'a;

  /// Every stored setting, in no particular order.
  fn list_settings(&self) -> impl Future<Output = Result<Vec<Setting>, Self::Error>> + Send + '_;

  /// Upsert by key. An existing row keeps its id and gets the new value;
  /// otherwise a row is inserted with a fresh id. Writes to the same key are
  /// serialised by the backend: last write wins.
  fn save_setting(
    &self,
    input: NewSetting,
  ) -> impl Future<Output = Result<Setting, Self::Error>> + Send + '_;

  // ── Announcements ─────────────────────────────────────────────────────

  /// All announcements, newest first.
  fn list_announcements(
    &self,
  ) -> impl Future<Output = Result<Vec<Announcement>, Self::Error>> + Send + '_;

  fn get_announcement(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Announcement>, Self::Error>> + Send + '_;

  /// Allocate an id, stamp the current time, and insert.
  fn create_announcement(
    &self,
    input: NewAnnouncement,
  ) -> impl Future<Output = Result<Announcement, Self::Error>> + Send + '_;

  /// Remove an announcement. Returns `false` if no such id exists.
  fn delete_announcement(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Schedules ─────────────────────────────────────────────────────────

  /// The single active schedule, if any.
  fn active_schedule(
    &self,
  ) -> impl Future<Output = Result<Option<StreamSchedule>, Self::Error>> + Send + '_;

  /// Every schedule ever created and not deleted, newest id first.
  fn list_schedules(
    &self,
  ) -> impl Future<Output = Result<Vec<StreamSchedule>, Self::Error>> + Send + '_;

  /// Deactivate the current active schedule (if any), then insert `input`
  /// as the new active one.
  fn activate_schedule(
    &self,
    input: NewSchedule,
  ) -> impl Future<Output = Result<StreamSchedule, Self::Error>> + Send + '_;

  /// Remove a schedule. Returns `false` if no such id exists.
  fn delete_schedule(&self, id: i64)
  -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

// ─── Theme document ──────────────────────────────────────────────────────────

/// Persistence for the generated theme document.
pub trait ThemeStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The current document, or `None` if none has been written yet.
  fn load_theme(
    &self,
  ) -> impl Future<Output = Result<Option<ThemeDocument>, Self::Error>> + Send + '_;

  /// Merge `artifact` over the existing document and persist the result.
  fn merge_theme(
    &self,
    artifact: ThemeArtifact,
  ) -> impl Future<Output = Result<ThemeDocument, Self::Error>> + Send + '_;
}
