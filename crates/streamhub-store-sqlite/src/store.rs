//! [`SqliteStore`]: the SQLite implementation of [`HubStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use streamhub_core::{
  announcement::{Announcement, NewAnnouncement},
  schedule::{NewSchedule, StreamSchedule},
  setting::{NewSetting, Setting},
  store::HubStore,
};

use crate::{
  Result,
  encode::{RawAnnouncement, encode_dt, encode_kind, schedule_from_row},
  schema::SCHEMA,
};

const ANNOUNCEMENT_COLUMNS: &str = "id, title, content, kind, created_at";
const SCHEDULE_COLUMNS: &str = "id, title, stream_type, date, time, is_active";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A stream hub store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("sqlite schema initialised");
    Ok(())
  }
}

// ─── HubStore impl ───────────────────────────────────────────────────────────

impl HubStore for SqliteStore {
  type Error = crate::Error;

  // ── Settings ──────────────────────────────────────────────────────────────

  async fn get_setting(&self, key: &str) -> Result<Option<Setting>> {
    let key = key.to_owned();
    let row = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, key, value FROM settings WHERE key = ?1",
              rusqlite::params![key],
              |r| Ok(Setting { id: r.get(0)?, key: r.get(1)?, value: r.get(2)? }),
            )
            .optional()?,
        )
      })
      .await?;
    Ok(row)
  }

  async fn list_settings(&self) -> Result<Vec<Setting>> {
    let rows = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT id, key, value FROM settings ORDER BY id")?;
        let rows = stmt
          .query_map([], |r| Ok(Setting { id: r.get(0)?, key: r.get(1)?, value: r.get(2)? }))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn save_setting(&self, input: NewSetting) -> Result<Setting> {
    let row = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "INSERT INTO settings (key, value) VALUES (?1, ?2)
           ON CONFLICT(key) DO UPDATE SET value = excluded.value
           RETURNING id, key, value",
          rusqlite::params![input.key, input.value],
          |r| Ok(Setting { id: r.get(0)?, key: r.get(1)?, value: r.get(2)? }),
        )?)
      })
      .await?;
    Ok(row)
  }

  // ── Announcements ─────────────────────────────────────────────────────────

  async fn list_announcements(&self) -> Result<Vec<Announcement>> {
    let raws: Vec<RawAnnouncement> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt
          .query_map([], RawAnnouncement::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAnnouncement::into_announcement).collect()
  }

  async fn get_announcement(&self, id: i64) -> Result<Option<Announcement>> {
    let raw: Option<RawAnnouncement> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ANNOUNCEMENT_COLUMNS} FROM announcements WHERE id = ?1"),
              rusqlite::params![id],
              RawAnnouncement::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawAnnouncement::into_announcement).transpose()
  }

  async fn create_announcement(&self, input: NewAnnouncement) -> Result<Announcement> {
    let timestamp = Utc::now();
    let title     = input.title().to_owned();
    let content   = input.content().to_owned();
    let kind_str  = encode_kind(input.kind());
    let at_str    = encode_dt(timestamp);

    let (title_c, content_c) = (title.clone(), content.clone());
    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO announcements (title, content, kind, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![title_c, content_c, kind_str, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Announcement { id, title, content, kind: input.kind(), timestamp })
  }

  async fn delete_announcement(&self, id: i64) -> Result<bool> {
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM announcements WHERE id = ?1", rusqlite::params![id])?)
      })
      .await?;
    Ok(n > 0)
  }

  // ── Schedules ─────────────────────────────────────────────────────────────

  async fn active_schedule(&self) -> Result<Option<StreamSchedule>> {
    let row = self
      .conn
      .call(|conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {SCHEDULE_COLUMNS} FROM stream_schedules WHERE is_active = 1"),
              [],
              schedule_from_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(row)
  }

  async fn list_schedules(&self) -> Result<Vec<StreamSchedule>> {
    let rows = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare(&format!("SELECT {SCHEDULE_COLUMNS} FROM stream_schedules ORDER BY id DESC"))?;
        let rows = stmt
          .query_map([], schedule_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn activate_schedule(&self, input: NewSchedule) -> Result<StreamSchedule> {
    let title       = input.title().to_owned();
    let stream_type = input.stream_type().to_owned();
    let date        = input.date().to_owned();
    let time        = input.time().to_owned();

    // Deactivate and insert in one transaction.
    let id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let demoted =
          tx.execute("UPDATE stream_schedules SET is_active = 0 WHERE is_active = 1", [])?;
        tx.execute(
          "INSERT INTO stream_schedules (title, stream_type, date, time, is_active)
           VALUES (?1, ?2, ?3, ?4, 1)",
          rusqlite::params![title, stream_type, date, time],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        tracing::debug!(id, demoted, "activated schedule");
        Ok(id)
      })
      .await?;

    Ok(input.into_active(id))
  }

  async fn delete_schedule(&self, id: i64) -> Result<bool> {
    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM stream_schedules WHERE id = ?1", rusqlite::params![id])?)
      })
      .await?;
    Ok(n > 0)
  }
}
