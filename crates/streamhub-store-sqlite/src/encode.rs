//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; enums as their lowercase
//! literal; booleans as 0/1 integers.

use chrono::{DateTime, SecondsFormat, Utc};
use streamhub_core::{
  announcement::{Announcement, AnnouncementKind},
  schedule::StreamSchedule,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// Fixed-width so that `ORDER BY created_at` sorts chronologically.
pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Nanos, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── AnnouncementKind ────────────────────────────────────────────────────────

pub fn encode_kind(k: AnnouncementKind) -> String { k.to_string() }

pub fn decode_kind(s: &str) -> Result<AnnouncementKind> {
  s.parse().map_err(|_| Error::UnknownKind(s.to_owned()))
}

// ─── Raw row types ───────────────────────────────────────────────────────────

/// An `announcements` row as read from SQLite, before decoding.
pub struct RawAnnouncement {
  pub id:         i64,
  pub title:      String,
  pub content:    String,
  pub kind:       String,
  pub created_at: String,
}

impl RawAnnouncement {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      title:      row.get(1)?,
      content:    row.get(2)?,
      kind:       row.get(3)?,
      created_at: row.get(4)?,
    })
  }

  pub fn into_announcement(self) -> Result<Announcement> {
    Ok(Announcement {
      id:        self.id,
      title:     self.title,
      content:   self.content,
      kind:      decode_kind(&self.kind)?,
      timestamp: decode_dt(&self.created_at)?,
    })
  }
}

/// Map a `stream_schedules` row; every column is already a native type.
pub fn schedule_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StreamSchedule> {
  Ok(StreamSchedule {
    id:          row.get(0)?,
    title:       row.get(1)?,
    stream_type: row.get(2)?,
    date:        row.get(3)?,
    time:        row.get(4)?,
    is_active:   row.get(5)?,
  })
}
