//! The derived appearance document read by the renderer.
//!
//! The artifact is a pure function of three settings (`primary_color`,
//! `dark_mode`, `seasonal_theme`). It is persisted as a JSON object that may
//! carry extra keys owned by the renderer; writes merge over it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumString};

use crate::{
  Error, Result,
  setting::{AppSettings, SeasonalTheme},
};

/// The persisted theme document. Kept as an open JSON object.
pub type ThemeDocument = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Appearance {
  Dark,
  Light,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ThemeVariant {
  Professional,
  Tint,
  Vibrant,
}

/// Corner radius and style variant for a seasonal theme.
///
/// `None` means no seasonal theme has ever been stored; that case keeps the
/// tighter 0.5 radius the renderer shipped with.
pub fn seasonal_shape(seasonal: Option<SeasonalTheme>) -> (f64, ThemeVariant) {
  match seasonal {
    None => (0.5, ThemeVariant::Vibrant),
    Some(SeasonalTheme::Standard) => (0.75, ThemeVariant::Vibrant),
    Some(SeasonalTheme::Halloween) => (0.25, ThemeVariant::Vibrant),
    Some(SeasonalTheme::Christmas) => (1.0, ThemeVariant::Tint),
    Some(SeasonalTheme::Spring) => (0.85, ThemeVariant::Professional),
    Some(SeasonalTheme::Summer) => (0.5, ThemeVariant::Vibrant),
  }
}

/// The four fields the hub owns inside the theme document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeArtifact {
  pub primary:    String,
  pub appearance: Appearance,
  pub radius:     f64,
  pub variant:    ThemeVariant,
}

impl ThemeArtifact {
  pub fn derive(primary: &str, dark_mode: bool, seasonal: Option<SeasonalTheme>) -> Self {
    let (radius, variant) = seasonal_shape(seasonal);
    Self {
      primary: primary.to_owned(),
      appearance: if dark_mode { Appearance::Dark } else { Appearance::Light },
      radius,
      variant,
    }
  }

  /// Derive from the typed settings. `seasonal_known` is false when the
  /// seasonal key is absent from the store.
  pub fn from_settings(settings: &AppSettings, seasonal_known: bool) -> Self {
    Self::derive(
      &settings.primary_color,
      settings.dark_mode,
      seasonal_known.then_some(settings.seasonal_theme),
    )
  }

  /// Overlay this artifact onto `doc`, leaving unrelated keys untouched.
  pub fn merge_into(&self, doc: &mut ThemeDocument) -> Result<()> {
    let Value::Object(fields) = serde_json::to_value(self)? else {
      return Err(Error::validation("theme artifact did not serialise to an object"));
    };
    doc.extend(fields);
    Ok(())
  }
}

/// Raw body of a direct theme write. Every field is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ThemeDraft {
  pub primary:    Option<String>,
  pub appearance: Option<String>,
  pub radius:     Option<f64>,
  pub variant:    Option<String>,
}

impl ThemeDraft {
  pub fn validate(self) -> Result<ThemeArtifact> {
    let primary = self
      .primary
      .filter(|p| !p.trim().is_empty())
      .ok_or_else(|| Error::validation("primary is required"))?;
    let appearance = self
      .appearance
      .ok_or_else(|| Error::validation("appearance is required"))?
      .parse::<Appearance>()
      .map_err(|_| Error::validation("appearance must be dark or light"))?;
    let radius = self.radius.ok_or_else(|| Error::validation("radius is required"))?;
    if !radius.is_finite() || radius < 0.0 {
      return Err(Error::validation("radius must be a non-negative number"));
    }
    let variant = self
      .variant
      .ok_or_else(|| Error::validation("variant is required"))?
      .parse::<ThemeVariant>()
      .map_err(|_| Error::validation("variant must be professional, tint or vibrant"))?;
    Ok(ThemeArtifact { primary, appearance, radius, variant })
  }
}
