//! Settings change notifications.
//!
//! Saving settings publishes a [`SettingsChanged`] on an in-process broadcast
//! channel. Derived artifacts (the theme document) subscribe and react on
//! their own task, so their failures never reach the writer.

use tokio::sync::broadcast;

use crate::setting::{SettingKey, Setting};

/// The rows written by one settings save, in write order.
#[derive(Debug, Clone)]
pub struct SettingsChanged {
  pub changes: Vec<Setting>,
}

impl SettingsChanged {
  /// Whether any changed key feeds the theme artifact.
  pub fn affects_theme(&self) -> bool {
    self
      .changes
      .iter()
      .filter_map(|s| SettingKey::parse(&s.key))
      .any(SettingKey::affects_theme)
  }
}

/// Publisher half of the settings change channel. Cheap to clone.
#[derive(Clone)]
pub struct SettingsEvents {
  sender: broadcast::Sender<SettingsChanged>,
}

impl SettingsEvents {
  pub fn new(capacity: usize) -> Self {
    let (sender, _) = broadcast::channel(capacity);
    Self { sender }
  }

  /// Publish a change. Returns how many subscribers will see it; zero
  /// subscribers is not an error.
  pub fn publish(&self, event: SettingsChanged) -> usize {
    self.sender.send(event).unwrap_or(0)
  }

  pub fn subscribe(&self) -> broadcast::Receiver<SettingsChanged> { self.sender.subscribe() }
}

impl Default for SettingsEvents {
  fn default() -> Self { Self::new(64) }
}
