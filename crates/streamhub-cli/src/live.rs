//! Live-status detection and the stream selector.

use std::{future::Future, sync::Arc, time::Duration};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use streamhub_core::setting::AppSettings;
use tokio::{
  sync::watch,
  task::JoinHandle,
  time::{MissedTickBehavior, interval},
};

/// How often [`LivePoller`] re-checks the channels.
pub const POLL_INTERVAL: Duration = Duration::from_secs(120);

/// Answers "is this channel live right now?". Errors count as offline.
pub trait LiveProbe: Send + Sync {
  fn is_live<'a>(&'a self, channel: &'a str) -> impl Future<Output = bool> + Send + 'a;
}

// ─── HTTP probe ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveStatus {
  is_live: bool,
}

/// Probe backed by `GET <url>?channel=<name>` returning `{"isLive": bool}`.
#[derive(Clone)]
pub struct HttpLiveProbe {
  client: reqwest::Client,
  url:    String,
}

impl HttpLiveProbe {
  pub fn new(url: impl Into<String>) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, url: url.into() })
  }

  async fn check(&self, channel: &str) -> Result<bool> {
    let resp = self
      .client
      .get(&self.url)
      .query(&[("channel", channel)])
      .send()
      .await
      .context("live status request failed")?;
    if !resp.status().is_success() {
      return Err(anyhow!("live status → {}", resp.status()));
    }
    let body: LiveStatus = resp.json().await.context("deserialising live status")?;
    Ok(body.is_live)
  }
}

impl LiveProbe for HttpLiveProbe {
  async fn is_live(&self, channel: &str) -> bool {
    match self.check(channel).await {
      Ok(live) => live,
      Err(e) => {
        tracing::debug!(channel, error = %e, "live probe failed; treating as offline");
        false
      }
    }
  }
}

// ─── Selection ────────────────────────────────────────────────────────────────

/// What the public page should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamStatus {
  pub channel: String,
  pub live:    bool,
}

/// Pick the channel to feature.
///
/// With auto-detect off the configured `current_stream` is shown as live.
/// Otherwise the first live channel in `channels` order wins; if none is live
/// the configured stream is kept and reported offline.
pub async fn select_stream<P: LiveProbe>(
  probe: &P,
  settings: &AppSettings,
  channels: &[String],
) -> StreamStatus {
  if !settings.auto_detect_stream {
    return StreamStatus { channel: settings.current_stream.clone(), live: true };
  }
  for channel in channels {
    if probe.is_live(channel).await {
      return StreamStatus { channel: channel.clone(), live: true };
    }
  }
  StreamStatus { channel: settings.current_stream.clone(), live: false }
}

// ─── Poller ───────────────────────────────────────────────────────────────────

/// Re-runs [`select_stream`] on a fixed tick. Stops when dropped.
pub struct LivePoller {
  handle: JoinHandle<()>,
  status: watch::Receiver<Option<StreamStatus>>,
}

impl LivePoller {
  pub fn spawn<P>(
    probe: Arc<P>,
    settings: AppSettings,
    channels: Vec<String>,
    period: Duration,
  ) -> Self
  where
    P: LiveProbe + 'static,
  {
    let (tx, status) = watch::channel(None);
    let handle = tokio::spawn(async move {
      let mut ticker = interval(period);
      ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
      loop {
        ticker.tick().await;
        let next = select_stream(probe.as_ref(), &settings, &channels).await;
        tracing::debug!(channel = %next.channel, live = next.live, "stream selected");
        tx.send_if_modified(|cur| {
          if cur.as_ref() == Some(&next) {
            return false;
          }
          *cur = Some(next);
          true
        });
        if tx.is_closed() {
          break;
        }
      }
    });
    Self { handle, status }
  }

  /// Most recent selection, `None` before the first tick completes.
  pub fn latest(&self) -> Option<StreamStatus> { self.status.borrow().clone() }

  /// Wait until the selection changes. Errors if the poller task ended.
  pub async fn changed(&mut self) -> Result<Option<StreamStatus>> {
    self.status.changed().await.context("live poller stopped")?;
    Ok(self.status.borrow_and_update().clone())
  }
}

impl Drop for LivePoller {
  fn drop(&mut self) { self.handle.abort(); }
}
