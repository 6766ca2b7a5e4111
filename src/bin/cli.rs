use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rfid_lastfm_scrobbler as lib;
use lib::api::lastfm::LastfmClient;
use lib::config::Config;
use lib::scrobble::scrobble_album;
use std::path::{Path, PathBuf};
use tracing::subscriber as tracing_subscriber_global;
use tracing_appender::rolling::RollingFileAppender;
use tracing_log::LogTracer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "rfid-lastfm-scrobbler", version)]
struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrobble one album by name (one-shot)
    Scrobble {
        #[arg(long)]
        artist: String,
        #[arg(long)]
        album: String,
    },
    /// Resolve a scanned tag id via the config mapping, then scrobble
    Tag {
        /// Tag id as read from the RFID reader
        id: String,
    },
    /// Validate config file and exit
    ConfigValidate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // Resolve config path: explicit --config overrides; otherwise prefer
    // the system-wide config and fall back to the repository example
    // config for local/dev usage.
    let resolved_config_path: PathBuf = match &cli.config {
        Some(p) => p.clone(),
        None => {
            let etc_path = Path::new("/etc/rfid-scrobbler/config.toml");
            if etc_path.exists() {
                etc_path.to_path_buf()
            } else {
                PathBuf::from("config/example-config.toml")
            }
        }
    };

    let cfg = Config::from_path(&resolved_config_path)
        .with_context(|| format!("loading config from {}", resolved_config_path.display()))?;

    // Initialize log->tracing bridge and structured logging.
    // Logs go to both stdout and a daily-rotated file in cfg.log_dir.
    let _ = LogTracer::init();
    let file_appender: RollingFileAppender =
        tracing_appender::rolling::daily(&cfg.log_dir, "rfid-scrobbler.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Honor RUST_LOG if set, otherwise default to info.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer().with_writer(non_blocking);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stdout_layer);

    // Install as global default tracing subscriber without triggering
    // tracing-subscriber's internal log bridge (we already call LogTracer).
    tracing_subscriber_global::set_global_default(subscriber)
        .context("failed to set global tracing subscriber")?;

    match cli.command {
        Commands::Scrobble { artist, album } => {
            run_scrobble(&cfg, &artist, &album).await?;
        }
        Commands::Tag { id } => match cfg.album_for_tag(&id) {
            Some(entry) => {
                let (artist, album) = (entry.artist.clone(), entry.album.clone());
                run_scrobble(&cfg, &artist, &album).await?;
            }
            None => {
                eprintln!("No album mapping for tag {}", id.trim());
                std::process::exit(1);
            }
        },
        Commands::ConfigValidate => {
            match Config::from_path(resolved_config_path.as_path()) {
                Ok(_) => println!("OK"),
                Err(e) => {
                    eprintln!("Config validation failed: {}", e);
                    std::process::exit(2);
                }
            }
        }
    }

    Ok(())
}

/// Invoke the orchestrator once and print the outcome. No retries here;
/// a failed result is reported and left to the operator.
async fn run_scrobble(cfg: &Config, artist: &str, album: &str) -> Result<()> {
    let api = LastfmClient::new();
    match scrobble_album(&api, &cfg.lastfm, artist, album).await {
        Ok(result) => {
            match &result.error {
                None => println!(
                    "Scrobbled '{}' by '{}': accepted {}, ignored {}",
                    album, artist, result.accepted, result.ignored
                ),
                Some(err) => {
                    eprintln!("Scrobble of '{}' by '{}' failed: {}", album, artist, err);
                    if let Some(raw) = &result.raw_response {
                        eprintln!("Diagnostic: {}", raw);
                    }
                    std::process::exit(1);
                }
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Nothing scrobbled for '{}' by '{}': {}", album, artist, e);
            std::process::exit(1);
        }
    }
}
