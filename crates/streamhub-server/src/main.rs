//! streamhub server binary.
//!
//! Reads `streamhub.toml` (or the path given with `--config`) plus
//! `STREAMHUB_*` environment variables, opens the configured store and serves
//! the JSON API over HTTP.
//!
//! # Password hash generation
//!
//! With `hash_admin_password = true` the stored credential is an argon2 PHC
//! string. To produce one for `initial_admin_password` by hand:
//!
//! ```text
//! cargo run -p streamhub-server -- --hash-password
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::Parser;
use streamhub_core::memory::MemoryStore;
use streamhub_server::ServerConfig;
use streamhub_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Stream hub API server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "streamhub.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a password entered on stdin and exit.
  #[arg(long)]
  hash_password: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  if cli.hash_password {
    let password = read_password()?;
    println!("{}", streamhub_api::auth::hash_password(&password)?);
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("STREAMHUB"))
    .build()
    .context("failed to read config file")?;

  let mut server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  server_cfg.theme_path = expand_tilde(&server_cfg.theme_path);

  if server_cfg.uses_memory_store() {
    tracing::warn!("using in-memory store; nothing will survive a restart");
    streamhub_server::run(server_cfg, MemoryStore::new()).await
  } else {
    let store_path = expand_tilde(&server_cfg.store_path);
    let store = SqliteStore::open(&store_path)
      .await
      .with_context(|| format!("failed to open store at {store_path:?}"))?;
    streamhub_server::run(server_cfg, store).await
  }
}

fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
