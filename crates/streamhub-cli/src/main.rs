//! `streamhub`: command-line viewer and admin tool for a stream hub server.
//!
//! Reads go through a local cache, so `status` still answers while the
//! server is down (the output says where each value came from).
//!
//! # Usage
//!
//! ```text
//! streamhub --url http://localhost:5000 status
//! streamhub login
//! streamhub settings set dark_mode=false primary_color=#112233
//! streamhub announce add "Going live" "Tonight at eight" --kind special
//! streamhub watch
//! ```

mod cache;
mod client;
mod live;

use std::{
  collections::BTreeMap,
  io::{self, BufRead, Write},
  path::PathBuf,
  sync::Arc,
};

use anyhow::{Context, Result, anyhow, bail};
use cache::{CachedClient, Fetched, LocalCache, default_cache_path};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use live::{HttpLiveProbe, LivePoller, POLL_INTERVAL};
use serde::Deserialize;
use streamhub_core::{
  announcement::{AnnouncementDraft, AnnouncementKind},
  schedule::ScheduleDraft,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "streamhub", about = "Viewer and admin tool for a stream hub")]
struct Args {
  /// Path to a TOML config file (url, cache, channels, probe_url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the stream hub server (default: http://localhost:5000).
  #[arg(long, env = "STREAMHUB_URL")]
  url: Option<String>,

  /// Local cache file.
  #[arg(long, env = "STREAMHUB_CACHE", value_name = "FILE")]
  cache: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Show settings, the next stream and announcements.
  Status,
  /// Read or change settings.
  #[command(subcommand)]
  Settings(SettingsCmd),
  /// Manage announcements.
  #[command(subcommand)]
  Announce(AnnounceCmd),
  /// Manage the stream schedule.
  #[command(subcommand)]
  Schedule(ScheduleCmd),
  /// Print the current theme document.
  Theme,
  /// Check the admin password and remember it for later commands.
  Login {
    /// Read from stdin when omitted.
    password: Option<String>,
  },
  /// Forget the stored admin password.
  Logout,
  /// Change the admin password.
  Passwd {
    #[arg(long)]
    current: Option<String>,
    #[arg(long)]
    new:     String,
  },
  /// Poll channel live status and print the featured stream when it changes.
  Watch,
}

#[derive(Subcommand, Debug)]
enum SettingsCmd {
  /// Print one setting, or all of them.
  Get { key: Option<String> },
  /// Write one or more `key=value` pairs.
  Set {
    #[arg(required = true, value_parser = parse_pair)]
    pairs: Vec<(String, String)>,
  },
}

#[derive(Subcommand, Debug)]
enum AnnounceCmd {
  List,
  Add {
    title:   String,
    content: String,
    #[arg(long, default_value = "default")]
    kind:    AnnouncementKind,
  },
  Delete { id: i64 },
}

#[derive(Subcommand, Debug)]
enum ScheduleCmd {
  /// Show the active schedule.
  Show,
  /// Create a schedule and make it the active one.
  Set {
    title:       String,
    #[arg(long = "type")]
    stream_type: String,
    /// `YYYY-MM-DD`
    date:        String,
    /// `HH:MM`
    time:        String,
  },
  /// List every schedule, active or not.
  List,
  Delete { id: i64 },
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
  raw
    .split_once('=')
    .map(|(k, v)| (k.to_owned(), v.to_owned()))
    .ok_or_else(|| format!("expected key=value, got {raw:?}"))
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
  url:       String,
  cache:     Option<PathBuf>,
  /// Channels to probe, in priority order.
  channels:  Vec<String>,
  probe_url: Option<String>,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(io::stderr)
    .init();

  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let base_url = args
    .url
    .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
    .unwrap_or_else(|| "http://localhost:5000".to_string());
  let cache_path = args
    .cache
    .or_else(|| file_cfg.cache.clone())
    .unwrap_or_else(default_cache_path);

  let api = ApiClient::new(ApiConfig { base_url, token: None })?;
  let cache = LocalCache::load(&cache_path).await?;
  let mut hub = CachedClient::new(api, cache);

  match args.command {
    Command::Status => status(&mut hub).await,
    Command::Settings(cmd) => settings(&mut hub, cmd).await,
    Command::Announce(cmd) => announce(&mut hub, cmd).await,
    Command::Schedule(cmd) => schedule(&mut hub, cmd).await,
    Command::Theme => {
      let doc = hub.api().get_theme().await?;
      println!("{}", serde_json::to_string_pretty(&doc)?);
      Ok(())
    }
    Command::Login { password } => {
      let password = match password {
        Some(p) => p,
        None => prompt("Password: ")?,
      };
      if hub.login(&password).await? {
        println!("Logged in.");
        Ok(())
      } else {
        bail!("wrong password")
      }
    }
    Command::Logout => {
      hub.logout().await?;
      println!("Logged out.");
      Ok(())
    }
    Command::Passwd { current, new } => {
      let current = match current {
        Some(c) => c,
        None => prompt("Current password: ")?,
      };
      println!("{}", hub.change_password(&current, &new).await?);
      Ok(())
    }
    Command::Watch => watch(&mut hub, file_cfg.channels, file_cfg.probe_url).await,
  }
}

fn prompt(label: &str) -> Result<String> {
  print!("{label}");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn require_login(hub: &CachedClient) -> Result<()> {
  if !hub.is_authenticated() {
    bail!("not logged in; run `streamhub login` first");
  }
  Ok(())
}

fn provenance<T>(f: &Fetched<T>) -> String {
  match f.last_sync {
    Some(at) => format!("[{}, synced {}]", f.source, fmt_time(at)),
    None => format!("[{}]", f.source),
  }
}

fn fmt_time(at: DateTime<Utc>) -> String { at.format("%Y-%m-%d %H:%M UTC").to_string() }

// ─── Commands ─────────────────────────────────────────────────────────────────

async fn status(hub: &mut CachedClient) -> Result<()> {
  let settings = hub.fetch_settings().await;
  let s = &settings.value;
  println!("Settings {}", provenance(&settings));
  if hub.cache().data().settings.dirty {
    println!("  (local changes not yet accepted by the server)");
  }
  println!("  stream:      {} (auto-detect {})", s.current_stream, s.auto_detect_stream);
  println!("  banner:      {} {}", s.banner_text, if s.show_banner { "" } else { "(hidden)" });
  let appearance = if s.dark_mode { "dark" } else { "light" };
  println!("  theme:       {} {appearance} {}", s.primary_color, s.seasonal_theme);
  println!("  offline:     {}", s.offline_behavior);

  let schedule = hub.fetch_schedule().await;
  println!("Next stream {}", provenance(&schedule));
  match &schedule.value {
    Some(next) => {
      println!("  {} ({}) on {} at {}", next.title, next.stream_type, next.date, next.time)
    }
    None => println!("  nothing scheduled"),
  }

  let announcements = hub.fetch_announcements().await;
  println!("Announcements {}", provenance(&announcements));
  for a in &announcements.value {
    println!("  #{} [{}] {}: {}", a.id, a.kind, a.title, a.content);
  }
  Ok(())
}

async fn settings(hub: &mut CachedClient, cmd: SettingsCmd) -> Result<()> {
  match cmd {
    SettingsCmd::Get { key: None } => {
      let all = hub.fetch_settings_raw().await;
      eprintln!("{}", provenance(&all));
      for (k, v) in &all.value {
        println!("{k} = {v}");
      }
    }
    SettingsCmd::Get { key: Some(key) } => {
      let all = hub.fetch_settings_raw().await;
      let value = all
        .value
        .get(&key)
        .ok_or_else(|| anyhow!("setting {key:?} not found"))?;
      println!("{value}");
    }
    SettingsCmd::Set { pairs } => {
      require_login(hub)?;
      let entries: BTreeMap<String, String> = pairs.into_iter().collect();
      let saved = hub.save_settings(entries).await?;
      println!("Saved {} setting(s).", saved.len());
    }
  }
  Ok(())
}

async fn announce(hub: &mut CachedClient, cmd: AnnounceCmd) -> Result<()> {
  match cmd {
    AnnounceCmd::List => {
      let items = hub.fetch_announcements().await;
      eprintln!("{}", provenance(&items));
      for a in &items.value {
        println!("#{} {} [{}] {}: {}", a.id, fmt_time(a.timestamp), a.kind, a.title, a.content);
      }
    }
    AnnounceCmd::Add { title, content, kind } => {
      require_login(hub)?;
      let created = hub
        .create_announcement(&AnnouncementDraft::new(title, content, kind))
        .await?;
      println!("Created announcement #{}.", created.id);
    }
    AnnounceCmd::Delete { id } => {
      require_login(hub)?;
      hub.delete_announcement(id).await?;
      println!("Deleted announcement #{id}.");
    }
  }
  Ok(())
}

async fn schedule(hub: &mut CachedClient, cmd: ScheduleCmd) -> Result<()> {
  match cmd {
    ScheduleCmd::Show => {
      let active = hub.fetch_schedule().await;
      eprintln!("{}", provenance(&active));
      match active.value {
        Some(s) => {
          println!("#{} {} ({}) on {} at {}", s.id, s.title, s.stream_type, s.date, s.time)
        }
        None => println!("nothing scheduled"),
      }
    }
    ScheduleCmd::Set { title, stream_type, date, time } => {
      require_login(hub)?;
      let saved = hub
        .save_schedule(&ScheduleDraft::new(title, stream_type, date, time))
        .await?;
      println!("Schedule #{} is now active.", saved.id);
    }
    ScheduleCmd::List => {
      require_login(hub)?;
      for s in hub.api().list_schedules().await? {
        let mark = if s.is_active { "*" } else { " " };
        println!("{mark} #{} {} ({}) on {} at {}", s.id, s.title, s.stream_type, s.date, s.time);
      }
    }
    ScheduleCmd::Delete { id } => {
      require_login(hub)?;
      hub.api().delete_schedule(id).await?;
      println!("Deleted schedule #{id}.");
    }
  }
  Ok(())
}

async fn watch(
  hub: &mut CachedClient,
  channels: Vec<String>,
  probe_url: Option<String>,
) -> Result<()> {
  let probe_url = probe_url.ok_or_else(|| anyhow!("watch needs `probe_url` in the config file"))?;
  let settings = hub.fetch_settings().await;
  let mut channels = channels;
  if channels.is_empty() && !settings.value.current_stream.is_empty() {
    channels.push(settings.value.current_stream.clone());
  }

  let probe = Arc::new(HttpLiveProbe::new(probe_url)?);
  let mut poller = LivePoller::spawn(probe, settings.value, channels, POLL_INTERVAL);
  loop {
    tokio::select! {
      changed = poller.changed() => {
        if let Some(s) = changed? {
          let state = if s.live { "LIVE" } else { "offline" };
          println!("{} {} {state}", fmt_time(Utc::now()), s.channel);
        }
      }
      _ = tokio::signal::ctrl_c() => break,
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests;
