//! One `run_all` invocation: resolve credentials, build the sources, run
//! the pipeline.
//!
//! The sources are built through a [`SourceFactory`] so tests can hand in
//! mocks and observe that nothing is constructed or called when a
//! credential is missing.

use anyhow::Result;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use tracing::info;

use super::pipeline::{Pipeline, PipelineSettings, RunReport};
use crate::config::{AppConfig, Credentials};
use crate::data::odds::OddsApiClient;
use crate::data::schedule::NflverseSchedule;
use crate::data::weather::NwsClient;
use crate::data::{ForecastSource, OddsSource, ScheduleSource};

// ---------------------------------------------------------------------------
// Source construction
// ---------------------------------------------------------------------------

/// Builds the three providers a run needs.
pub trait SourceFactory: Send + Sync {
    fn schedule(&self, cfg: &AppConfig) -> Result<Box<dyn ScheduleSource>>;

    fn odds(&self, cfg: &AppConfig, api_key: SecretString) -> Result<Box<dyn OddsSource>>;

    fn weather(&self, cfg: &AppConfig, user_agent: &str) -> Result<Box<dyn ForecastSource>>;
}

/// The live HTTP providers.
pub struct HttpSources;

impl SourceFactory for HttpSources {
    fn schedule(&self, cfg: &AppConfig) -> Result<Box<dyn ScheduleSource>> {
        let client = NflverseSchedule::new(&cfg.schedule.games_url, cfg.schedule.timeout_secs)?;
        Ok(Box::new(client))
    }

    fn odds(&self, cfg: &AppConfig, api_key: SecretString) -> Result<Box<dyn OddsSource>> {
        Ok(Box::new(OddsApiClient::new(api_key, &cfg.odds)?))
    }

    fn weather(&self, cfg: &AppConfig, user_agent: &str) -> Result<Box<dyn ForecastSource>> {
        Ok(Box::new(NwsClient::new(user_agent, &cfg.weather)?))
    }
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// Run every stage once for a run starting at `now`.
///
/// Both credentials are resolved through `lookup` before any source is
/// built, so a missing one fails without touching the network.
pub async fn run_all(
    cfg: &AppConfig,
    lookup: impl Fn(&str) -> Option<String>,
    now: DateTime<Utc>,
    sources: &dyn SourceFactory,
) -> Result<RunReport> {
    let creds = Credentials::resolve(cfg, lookup)?;

    let settings = PipelineSettings::at(cfg, now);
    info!(
        cache_dir = %settings.cache_dir.display(),
        season = settings.season,
        today = %settings.today,
        "run_all starting"
    );

    let schedule = sources.schedule(cfg)?;
    let odds = sources.odds(cfg, creds.odds_api_key)?;
    let weather = if cfg.weather.enabled {
        Some(sources.weather(cfg, &creds.nws_user_agent)?)
    } else {
        None
    };

    Pipeline::new(schedule, odds, weather, settings).run().await
}
