//! Short admin-authored notices shown on the public page.
//!
//! An announcement is immutable once created; the only lifecycle transition
//! after creation is deletion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{Error, Result};

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 100;
pub const CONTENT_MIN: usize = 10;
pub const CONTENT_MAX: usize = 500;

/// Visual emphasis of an announcement.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AnnouncementKind {
  #[default]
  #[serde(rename = "default")]
  #[strum(to_string = "default")]
  Standard,
  Special,
  Important,
}

/// A stored announcement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
  pub id:        i64,
  pub title:     String,
  pub content:   String,
  #[serde(rename = "type")]
  pub kind:      AnnouncementKind,
  /// Server-assigned creation time.
  pub timestamp: DateTime<Utc>,
}

/// Raw announcement input as received from a caller. Nothing is checked yet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnouncementDraft {
  pub title:   Option<String>,
  pub content: Option<String>,
  #[serde(rename = "type")]
  pub kind:    Option<String>,
}

/// Announcement input that has passed validation. The only way to build one
/// is [`AnnouncementDraft::validate`], so stores never see invalid input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnnouncement {
  title:   String,
  content: String,
  kind:    AnnouncementKind,
}

impl NewAnnouncement {
  pub fn title(&self) -> &str { &self.title }

  pub fn content(&self) -> &str { &self.content }

  pub fn kind(&self) -> AnnouncementKind { self.kind }
}

fn check_len(field: &str, value: &str, min: usize, max: usize) -> Result<()> {
  let n = value.chars().count();
  if n < min || n > max {
    return Err(Error::validation(format!(
      "{field} must be between {min} and {max} characters (got {n})"
    )));
  }
  Ok(())
}

impl AnnouncementDraft {
  pub fn new(title: impl Into<String>, content: impl Into<String>, kind: AnnouncementKind) -> Self {
    Self {
      title:   Some(title.into()),
      content: Some(content.into()),
      kind:    Some(kind.to_string()),
    }
  }

  pub fn validate(self) -> Result<NewAnnouncement> {
    let title = self.title.ok_or_else(|| Error::validation("title is required"))?;
    let content = self.content.ok_or_else(|| Error::validation("content is required"))?;
    check_len("title", &title, TITLE_MIN, TITLE_MAX)?;
    check_len("content", &content, CONTENT_MIN, CONTENT_MAX)?;

    let kind = match self.kind.as_deref() {
      None => AnnouncementKind::default(),
      Some(raw) => raw.parse().map_err(|_| {
        Error::validation(format!(
          "type must be one of default, special, important (got {raw:?})"
        ))
      })?,
    };

    Ok(NewAnnouncement { title, content, kind })
  }
}

/// Order announcements newest-first; equal timestamps fall back to id.
pub fn sort_newest_first(items: &mut [Announcement]) {
  items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
}
