//! `run_all`: fetch schedule and odds, fetch kickoff weather, train the
//! Elo model, and publish the pick sheet into the cache directory.
//!
//! Intended to be run once per invocation by an external scheduler; a
//! non-zero exit means the run failed and nothing new should be collected.

use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use nfl_picks::config::{self, AppConfig};
use nfl_picks::engine::{run_all, HttpSources};

/// Env var that switches log output to JSON lines.
const LOG_JSON_ENV: &str = "PICKS_LOG_JSON";

#[derive(Parser)]
#[command(name = "run_all")]
#[command(about = "Build the NFL pick sheet and publish it to the cache directory")]
struct Cli {
    /// Config file path (optional; defaults apply when missing)
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cli = Cli::parse();

    init_logging();

    let mut cfg = AppConfig::load_or_default(&cli.config)?;
    cfg.apply_env_overrides(|name| std::env::var(name).ok());
    info!(config = %cli.config.display(), "Config loaded");

    let report = run_all(&cfg, |name| std::env::var(name).ok(), Utc::now(), &HttpSources).await?;

    info!(
        run_id = %report.run_id,
        picks = report.picks,
        odds_events = report.odds_events,
        forecasts = report.forecasts,
        "{report}"
    );

    Ok(())
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nfl_picks=info,run_all=info"));

    let json_logging = std::env::var(LOG_JSON_ENV).is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
