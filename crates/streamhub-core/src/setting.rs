//! The key-value rows and the typed aggregate built over them.
//!
//! Every setting is stored as a plain string. [`AppSettings`] and
//! [`SettingsPatch`] are the only places that know how those strings map to
//! booleans and enums; nothing outside this module parses `"true"`/`"false"`.

use std::{collections::BTreeMap, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result};

// ─── Rows ────────────────────────────────────────────────────────────────────

/// A single stored setting. At most one row exists per `key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
  pub id:    i64,
  pub key:   String,
  pub value: String,
}

/// Input to [`HubStore::save_setting`](crate::store::HubStore::save_setting).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSetting {
  pub key:   String,
  pub value: String,
}

impl NewSetting {
  pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
    Self { key: key.into(), value: value.into() }
  }
}

// ─── Keys ────────────────────────────────────────────────────────────────────

/// The setting keys the hub understands. Any other key is stored verbatim.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum SettingKey {
  BannerText,
  ShowBanner,
  PrimaryColor,
  CurrentStream,
  AutoDetectStream,
  OfflineBehavior,
  DarkMode,
  AnimationsEnabled,
  ShowAnnouncements,
  ShowNextStream,
  ShowSocials,
  SeasonalTheme,
  /// The shared admin credential. Never part of [`AppSettings`].
  AdminPassword,
}

impl SettingKey {
  pub fn as_str(self) -> &'static str { self.into() }

  /// Keys that may not be read or written through the generic settings API.
  pub fn is_reserved(self) -> bool { matches!(self, Self::AdminPassword) }

  /// Keys whose change requires the theme artifact to be regenerated.
  pub fn affects_theme(self) -> bool {
    matches!(self, Self::PrimaryColor | Self::DarkMode | Self::SeasonalTheme)
  }

  /// Parse a raw key; `None` for free-form keys the hub does not interpret.
  pub fn parse(key: &str) -> Option<Self> { Self::from_str(key).ok() }
}

// ─── Enumerated values ───────────────────────────────────────────────────────

/// What the public page shows when no channel is live.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OfflineBehavior {
  #[default]
  Clips,
  Message,
  Schedule,
}

/// Seasonal skin applied on top of the primary colour.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SeasonalTheme {
  #[default]
  #[serde(rename = "default")]
  #[strum(to_string = "default")]
  Standard,
  Halloween,
  Christmas,
  Spring,
  Summer,
}

// ─── Value codec ─────────────────────────────────────────────────────────────

fn encode_bool(b: bool) -> String { if b { "true" } else { "false" }.to_owned() }

fn decode_bool(s: &str) -> Option<bool> {
  match s {
    "true" => Some(true),
    "false" => Some(false),
    _ => None,
  }
}

/// Check that `value` is a legal encoding for `key`.
///
/// Free-form keys accept anything; reserved keys and empty keys are rejected.
pub fn validate_entry(key: &str, value: &str) -> Result<()> {
  if key.trim().is_empty() {
    return Err(Error::validation("setting key must not be empty"));
  }
  let Some(known) = SettingKey::parse(key) else {
    return Ok(());
  };
  let ok = match known {
    SettingKey::AdminPassword => {
      return Err(Error::validation(
        "admin_password cannot be set here; use the change-password endpoint",
      ));
    }
    SettingKey::ShowBanner
    | SettingKey::AutoDetectStream
    | SettingKey::DarkMode
    | SettingKey::AnimationsEnabled
    | SettingKey::ShowAnnouncements
    | SettingKey::ShowNextStream
    | SettingKey::ShowSocials => decode_bool(value).is_some(),
    SettingKey::OfflineBehavior => OfflineBehavior::from_str(value).is_ok(),
    SettingKey::SeasonalTheme => SeasonalTheme::from_str(value).is_ok(),
    SettingKey::PrimaryColor => !value.trim().is_empty(),
    SettingKey::BannerText | SettingKey::CurrentStream => true,
  };
  if ok {
    Ok(())
  } else {
    Err(Error::InvalidSetting { key: key.to_owned(), value: value.to_owned() })
  }
}

// ─── Typed aggregate ─────────────────────────────────────────────────────────

/// Typed view over the settings table. Reconstructed on read, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
  pub banner_text:        String,
  pub show_banner:        bool,
  pub primary_color:      String,
  pub current_stream:     String,
  pub auto_detect_stream: bool,
  pub offline_behavior:   OfflineBehavior,
  pub dark_mode:          bool,
  pub animations_enabled: bool,
  pub show_announcements: bool,
  pub show_next_stream:   bool,
  pub show_socials:       bool,
  pub seasonal_theme:     SeasonalTheme,
}

impl Default for AppSettings {
  fn default() -> Self {
    Self {
      banner_text:        "Welcome to the Stream Hub!".to_owned(),
      show_banner:        false,
      primary_color:      "#FF6B00".to_owned(),
      current_stream:     String::new(),
      auto_detect_stream: true,
      offline_behavior:   OfflineBehavior::Clips,
      dark_mode:          true,
      animations_enabled: true,
      show_announcements: true,
      show_next_stream:   true,
      show_socials:       true,
      seasonal_theme:     SeasonalTheme::Standard,
    }
  }
}

impl AppSettings {
  /// Build the aggregate from a key→value map, starting from defaults.
  ///
  /// A stored value that does not decode leaves the default in place.
  pub fn decode(map: &BTreeMap<String, String>) -> Self {
    let mut out = Self::default();
    for (key, value) in map {
      let Some(known) = SettingKey::parse(key) else { continue };
      if out.set(known, value).is_err() {
        tracing::warn!(key = %key, value = %value, "ignoring undecodable setting");
      }
    }
    out
  }

  /// Convenience wrapper over [`AppSettings::decode`] for raw rows.
  pub fn from_rows(rows: &[Setting]) -> Self { Self::decode(&to_map(rows)) }

  /// Encode every field as its stored string form.
  pub fn encode(&self) -> BTreeMap<String, String> {
    SettingsPatch::from(self.clone()).encode()
  }

  fn set(&mut self, key: SettingKey, value: &str) -> Result<()> {
    let bad = || Error::InvalidSetting { key: key.to_string(), value: value.to_owned() };
    let bool_val = || decode_bool(value).ok_or_else(bad);
    match key {
      SettingKey::BannerText => self.banner_text = value.to_owned(),
      SettingKey::ShowBanner => self.show_banner = bool_val()?,
      SettingKey::PrimaryColor => self.primary_color = value.to_owned(),
      SettingKey::CurrentStream => self.current_stream = value.to_owned(),
      SettingKey::AutoDetectStream => self.auto_detect_stream = bool_val()?,
      SettingKey::OfflineBehavior => {
        self.offline_behavior = OfflineBehavior::from_str(value).map_err(|_| bad())?
      }
      SettingKey::DarkMode => self.dark_mode = bool_val()?,
      SettingKey::AnimationsEnabled => self.animations_enabled = bool_val()?,
      SettingKey::ShowAnnouncements => self.show_announcements = bool_val()?,
      SettingKey::ShowNextStream => self.show_next_stream = bool_val()?,
      SettingKey::ShowSocials => self.show_socials = bool_val()?,
      SettingKey::SeasonalTheme => {
        self.seasonal_theme = SeasonalTheme::from_str(value).map_err(|_| bad())?
      }
      SettingKey::AdminPassword => {}
    }
    Ok(())
  }
}

/// Collapse rows into a key→value map.
pub fn to_map(rows: &[Setting]) -> BTreeMap<String, String> {
  rows.iter().map(|s| (s.key.clone(), s.value.clone())).collect()
}

// ─── Partial updates ─────────────────────────────────────────────────────────

/// A partial typed update. Only the fields that are `Some` get written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
  pub banner_text:        Option<String>,
  pub show_banner:        Option<bool>,
  pub primary_color:      Option<String>,
  pub current_stream:     Option<String>,
  pub auto_detect_stream: Option<bool>,
  pub offline_behavior:   Option<OfflineBehavior>,
  pub dark_mode:          Option<bool>,
  pub animations_enabled: Option<bool>,
  pub show_announcements: Option<bool>,
  pub show_next_stream:   Option<bool>,
  pub show_socials:       Option<bool>,
  pub seasonal_theme:     Option<SeasonalTheme>,
}

impl SettingsPatch {
  pub fn is_empty(&self) -> bool { self.encode().is_empty() }

  /// Encode the set fields into their stored key/value form.
  pub fn encode(&self) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    let mut put = |k: SettingKey, v: Option<String>| {
      if let Some(v) = v {
        out.insert(k.as_str().to_owned(), v);
      }
    };
    put(SettingKey::BannerText, self.banner_text.clone());
    put(SettingKey::ShowBanner, self.show_banner.map(encode_bool));
    put(SettingKey::PrimaryColor, self.primary_color.clone());
    put(SettingKey::CurrentStream, self.current_stream.clone());
    put(SettingKey::AutoDetectStream, self.auto_detect_stream.map(encode_bool));
    put(SettingKey::OfflineBehavior, self.offline_behavior.map(|b| b.to_string()));
    put(SettingKey::DarkMode, self.dark_mode.map(encode_bool));
    put(SettingKey::AnimationsEnabled, self.animations_enabled.map(encode_bool));
    put(SettingKey::ShowAnnouncements, self.show_announcements.map(encode_bool));
    put(SettingKey::ShowNextStream, self.show_next_stream.map(encode_bool));
    put(SettingKey::ShowSocials, self.show_socials.map(encode_bool));
    put(SettingKey::SeasonalTheme, self.seasonal_theme.map(|t| t.to_string()));
    out
  }

  /// Overlay the set fields onto `target`.
  pub fn apply_to(&self, target: &mut AppSettings) {
    for (k, v) in self.encode() {
      if let Some(key) = SettingKey::parse(&k) {
        // Values produced by `encode` always decode.
        let _ = target.set(key, &v);
      }
    }
  }

  /// Whether applying this patch changes anything the theme depends on.
  pub fn affects_theme(&self) -> bool {
    self.primary_color.is_some() || self.dark_mode.is_some() || self.seasonal_theme.is_some()
  }
}

impl From<AppSettings> for SettingsPatch {
  fn from(s: AppSettings) -> Self {
    Self {
      banner_text:        Some(s.banner_text),
      show_banner:        Some(s.show_banner),
      primary_color:      Some(s.primary_color),
      current_stream:     Some(s.current_stream),
      auto_detect_stream: Some(s.auto_detect_stream),
      offline_behavior:   Some(s.offline_behavior),
      dark_mode:          Some(s.dark_mode),
      animations_enabled: Some(s.animations_enabled),
      show_announcements: Some(s.show_announcements),
      show_next_stream:   Some(s.show_next_stream),
      show_socials:       Some(s.show_socials),
      seasonal_theme:     Some(s.seasonal_theme),
    }
  }
}
