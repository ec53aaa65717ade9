//! Error types for `streamhub-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Input rejected before it reached any store.
  #[error("{0}")]
  Validation(String),

  #[error("invalid value for setting {key:?}: {value:?}")]
  InvalidSetting { key: String, value: String },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
