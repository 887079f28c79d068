//! Weather data provider.
//!
//! Uses the US National Weather Service API for hourly forecasts at
//! stadium coordinates. A forecast takes two calls: `/points/{lat},{lon}`
//! resolves the grid cell and its `forecastHourly` URL, which is then
//! fetched for the hourly periods. Both are memoized per stadium for the
//! lifetime of the client.
//!
//! API: `https://api.weather.gov`
//! Auth: None, but every request must carry an identifying `User-Agent`.
//! Horizon: about 7 days of hourly periods.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, info};

use super::{check_status, ForecastSource};
use crate::config::WeatherConfig;
use crate::teams::Franchise;
use crate::types::Forecast;

// ---------------------------------------------------------------------------
// NWS response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointsProperties {
    forecast_hourly: String,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    properties: ForecastProperties,
}

#[derive(Debug, Deserialize)]
struct ForecastProperties {
    #[serde(default)]
    periods: Vec<HourlyPeriod>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HourlyPeriod {
    start_time: DateTime<FixedOffset>,
    end_time: DateTime<FixedOffset>,
    #[serde(default)]
    temperature: Option<f64>,
    #[serde(default)]
    temperature_unit: Option<String>,
    #[serde(default)]
    wind_speed: Option<String>,
    #[serde(default)]
    probability_of_precipitation: Option<QuantitativeValue>,
    #[serde(default)]
    short_forecast: String,
}

#[derive(Debug, Clone, Deserialize)]
struct QuantitativeValue {
    #[serde(default)]
    value: Option<f64>,
}

impl HourlyPeriod {
    fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start_time.with_timezone(&Utc) <= t && t < self.end_time.with_timezone(&Utc)
    }

    fn to_forecast(&self) -> Forecast {
        let temp_f = match (self.temperature, self.temperature_unit.as_deref()) {
            (Some(t), Some("C")) => Some(t * 9.0 / 5.0 + 32.0),
            (t, _) => t,
        };
        Forecast {
            temp_f,
            wind_mph: self.wind_speed.as_deref().and_then(parse_wind_mph),
            precip_pct: self.probability_of_precipitation.as_ref().and_then(|q| q.value),
            short_forecast: self.short_forecast.clone(),
        }
    }
}

/// Parse NWS wind text ("10 mph", "5 to 15 mph") to the upper speed.
pub fn parse_wind_mph(text: &str) -> Option<f64> {
    text.split(|c: char| !(c.is_ascii_digit() || c == '.'))
        .filter_map(|tok| tok.parse::<f64>().ok())
        .reduce(f64::max)
}

/// The period whose `[start, end)` contains `kickoff`.
fn period_at(periods: &[HourlyPeriod], kickoff: DateTime<Utc>) -> Option<&HourlyPeriod> {
    periods.iter().find(|p| p.contains(kickoff))
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

pub struct NwsClient {
    http: Client,
    base_url: String,
    /// Hourly periods keyed by stadium name, filled on first use. Shared
    /// stadiums (MetLife, SoFi) cost one lookup for both tenants.
    periods: Mutex<HashMap<&'static str, Vec<HourlyPeriod>>>,
}

impl NwsClient {
    /// `user_agent` identifies the caller to NWS, as their terms require.
    pub fn new(user_agent: &str, cfg: &WeatherConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/geo+json"));

        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .user_agent(user_agent)
            .default_headers(headers)
            .build()
            .context("Failed to build NWS HTTP client")?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            periods: Mutex::new(HashMap::new()),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let resp = self.http.get(url).send().await
            .with_context(|| format!("NWS request failed: {url}"))?;
        let resp = check_status("nws", resp).await?;
        resp.json().await
            .with_context(|| format!("Failed to parse NWS response: {url}"))
    }

    /// Hourly periods for the stadium, from memo or the API.
    async fn hourly_periods(&self, venue: &Franchise) -> Result<Vec<HourlyPeriod>> {
        if let Some(p) = self.cached(venue.stadium) {
            debug!(team = venue.code, stadium = venue.stadium, "NWS memo hit");
            return Ok(p);
        }

        let points_url = format!("{}/points/{:.4},{:.4}", self.base_url, venue.lat, venue.lon);
        let points: PointsResponse = self.get_json(&points_url).await?;
        let forecast: ForecastResponse = self.get_json(&points.properties.forecast_hourly).await?;

        info!(
            team = venue.code,
            stadium = venue.stadium,
            periods = forecast.properties.periods.len(),
            "NWS hourly forecast fetched"
        );

        let periods = forecast.properties.periods;
        if let Ok(mut memo) = self.periods.lock() {
            memo.insert(venue.stadium, periods.clone());
        }
        Ok(periods)
    }

    fn cached(&self, stadium: &str) -> Option<Vec<HourlyPeriod>> {
        self.periods.lock().ok()?.get(stadium).cloned()
    }
}

#[async_trait]
impl ForecastSource for NwsClient {
    async fn forecast_at(&self, venue: &Franchise, kickoff: DateTime<Utc>) -> Result<Option<Forecast>> {
        let periods = self.hourly_periods(venue).await?;
        let forecast = period_at(&periods, kickoff).map(HourlyPeriod::to_forecast);
        if forecast.is_none() {
            debug!(team = venue.code, %kickoff, "Kickoff outside NWS forecast horizon");
        }
        Ok(forecast)
    }

    fn name(&self) -> &str {
        "nws"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
