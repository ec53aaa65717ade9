//! [`ThemeFile`]: the theme document as a JSON file on disk.

use std::{
  io::ErrorKind,
  path::{Path, PathBuf},
  sync::Arc,
};

use streamhub_core::{
  store::ThemeStore,
  theme::{ThemeArtifact, ThemeDocument},
};
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum ThemeFileError {
  #[error("theme file i/o: {0}")]
  Io(#[from] std::io::Error),

  #[error("theme file is not valid JSON: {0}")]
  Json(#[from] serde_json::Error),

  #[error("theme file {} does not hold a JSON object", .0.display())]
  NotAnObject(PathBuf),

  #[error(transparent)]
  Core(#[from] streamhub_core::Error),
}

/// A [`ThemeStore`] persisting to a single JSON file.
///
/// Writes go to a sibling temp file that is renamed over the target, so
/// readers see either the old or the new document. Merges are serialised
/// per instance.
#[derive(Clone)]
pub struct ThemeFile {
  path:  PathBuf,
  write: Arc<Mutex<()>>,
}

impl ThemeFile {
  pub fn new(path: impl AsRef<Path>) -> Self {
    Self { path: path.as_ref().to_path_buf(), write: Arc::new(Mutex::new(())) }
  }

  pub fn path(&self) -> &Path { &self.path }

  async fn read(&self) -> Result<Option<ThemeDocument>, ThemeFileError> {
    let bytes = match tokio::fs::read(&self.path).await {
      Ok(b) => b,
      Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
      Err(e) => return Err(e.into()),
    };
    let value: serde_json::Value = serde_json::from_slice(&bytes)?;
    match value {
      serde_json::Value::Object(doc) => Ok(Some(doc)),
      _ => Err(ThemeFileError::NotAnObject(self.path.clone())),
    }
  }

  async fn write_atomic(&self, doc: &ThemeDocument) -> Result<(), ThemeFileError> {
    if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(parent).await?;
    }
    let mut tmp = self.path.clone().into_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let body = serde_json::to_vec_pretty(doc)?;
    tokio::fs::write(&tmp, body).await?;
    tokio::fs::rename(&tmp, &self.path).await?;
    Ok(())
  }
}

impl ThemeStore for ThemeFile {
  type Error = ThemeFileError;

  async fn load_theme(&self) -> Result<Option<ThemeDocument>, ThemeFileError> { self.read().await }

  async fn merge_theme(&self, artifact: ThemeArtifact) -> Result<ThemeDocument, ThemeFileError> {
    let _guard = self.write.lock().await;
    let mut doc = self.read().await?.unwrap_or_default();
    artifact.merge_into(&mut doc)?;
    self.write_atomic(&doc).await?;
    tracing::debug!(path = %self.path.display(), "theme file written");
    Ok(doc)
  }
}
