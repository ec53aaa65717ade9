//! Stream schedules backing the "next stream" card on the public page.
//!
//! Many schedules may exist but at most one is active. Backends enforce that
//! by deactivating the current record before inserting a new active one.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A stored schedule entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamSchedule {
  pub id:          i64,
  pub title:       String,
  pub stream_type: String,
  /// Calendar date, `YYYY-MM-DD`.
  pub date:        String,
  /// Local time of day, `HH:MM`.
  pub time:        String,
  pub is_active:   bool,
}

/// Raw schedule input as received from a caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleDraft {
  pub title:       Option<String>,
  pub stream_type: Option<String>,
  pub date:        Option<String>,
  pub time:        Option<String>,
}

/// Validated schedule input; produced only by [`ScheduleDraft::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSchedule {
  title:       String,
  stream_type: String,
  date:        String,
  time:        String,
}

impl NewSchedule {
  pub fn title(&self) -> &str { &self.title }

  pub fn stream_type(&self) -> &str { &self.stream_type }

  pub fn date(&self) -> &str { &self.date }

  pub fn time(&self) -> &str { &self.time }

  /// Materialise the active record for a freshly allocated `id`.
  pub fn into_active(self, id: i64) -> StreamSchedule {
    StreamSchedule {
      id,
      title: self.title,
      stream_type: self.stream_type,
      date: self.date,
      time: self.time,
      is_active: true,
    }
  }
}

fn required(field: &str, value: Option<String>) -> Result<String> {
  let v = value.map(|s| s.trim().to_owned()).unwrap_or_default();
  if v.is_empty() {
    return Err(Error::validation(format!("{field} is required")));
  }
  Ok(v)
}

impl ScheduleDraft {
  pub fn new(
    title: impl Into<String>,
    stream_type: impl Into<String>,
    date: impl Into<String>,
    time: impl Into<String>,
  ) -> Self {
    Self {
      title:       Some(title.into()),
      stream_type: Some(stream_type.into()),
      date:        Some(date.into()),
      time:        Some(time.into()),
    }
  }

  pub fn validate(self) -> Result<NewSchedule> {
    let title = required("title", self.title)?;
    let stream_type = required("streamType", self.stream_type)?;
    let date = required("date", self.date)?;
    let time = required("time", self.time)?;

    NaiveDate::parse_from_str(&date, "%Y-%m-%d")
      .map_err(|_| Error::validation(format!("date must be YYYY-MM-DD (got {date:?})")))?;
    NaiveTime::parse_from_str(&time, "%H:%M")
      .map_err(|_| Error::validation(format!("time must be HH:MM (got {time:?})")))?;

    Ok(NewSchedule { title, stream_type, date, time })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn valid_draft_trims_fields() {
    let s = ScheduleDraft::new(" Tokyo Night ", "IRL", "2024-10-15", "19:00")
      .validate()
      .unwrap();
    assert_eq!(s.title(), "Tokyo Night");
    let rec = s.into_active(7);
    assert!(rec.is_active);
    assert_eq!(rec.id, 7);
  }

  #[test]
  fn rejects_missing_and_malformed() {
    assert!(ScheduleDraft::new("", "IRL", "2024-10-15", "19:00").validate().is_err());
    assert!(ScheduleDraft::new("t", "IRL", "15/10/2024", "19:00").validate().is_err());
    assert!(ScheduleDraft::new("t", "IRL", "2024-10-15", "7pm").validate().is_err());
    assert!(ScheduleDraft::new("t", "IRL", "2024-02-30", "19:00").validate().is_err());
    assert!(ScheduleDraft::default().validate().is_err());
  }

  #[test]
  fn wire_names_are_camel_case() {
    let rec = ScheduleDraft::new("t", "Gaming", "2024-10-15", "21:00")
      .validate()
      .unwrap()
      .into_active(1);
    let v = serde_json::to_value(&rec).unwrap();
    assert_eq!(v["streamType"], "Gaming");
    assert_eq!(v["isActive"], true);
  }
}
