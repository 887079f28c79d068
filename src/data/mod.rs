//! External data providers.
//!
//! Defines one trait per network seam (schedule, odds, weather) and the
//! HTTP-backed implementations used by the `run_all` binary. Tests swap
//! in-memory implementations behind the same traits.

pub mod schedule;
pub mod odds;
pub mod weather;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::teams::Franchise;
use crate::types::{Forecast, Game};
use odds::OddsEvent;

/// Source of the league game table (historical results and fixtures).
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Fetch every game the source knows about, team codes normalized.
    async fn fetch_games(&self) -> Result<Vec<Game>>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Source of bookmaker odds.
#[async_trait]
pub trait OddsSource: Send + Sync {
    /// Fetch spreads and moneylines for events commencing inside
    /// `[from, to]`, merged into one event list.
    async fn fetch_odds(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<OddsEvent>>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Source of point forecasts at a venue.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    /// Forecast for the hour containing `kickoff` at the franchise's home
    /// stadium. `Ok(None)` when kickoff is outside the forecast horizon.
    async fn forecast_at(&self, venue: &Franchise, kickoff: DateTime<Utc>) -> Result<Option<Forecast>>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Map a non-success response to a typed HTTP error carrying the body.
pub(crate) async fn check_status(service: &str, resp: reqwest::Response) -> Result<reqwest::Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(crate::types::PipelineError::Http {
        service: service.to_string(),
        status,
        body,
    }
    .into())
}
