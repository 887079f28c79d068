//! The Odds API integration.
//!
//! Fetches NFL point spreads and moneylines for a kickoff window and merges
//! the two responses into one event list (bookmakers and markets vary per
//! call, so events are merged by id, bookmakers by key, markets by key).
//!
//! API docs: https://the-odds-api.com/liveapi/guides/v4/
//! Base URL: https://api.the-odds-api.com/v4
//! Auth: `apiKey` query parameter. Quota is reported in response headers.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{check_status, OddsSource};
use crate::config::OddsConfig;

// ---------------------------------------------------------------------------
// API response types (also the on-disk `odds_raw.json` format)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsEvent {
    pub id: String,
    #[serde(default)]
    pub commence_time: Option<DateTime<Utc>>,
    /// Full franchise names, e.g. "Kansas City Chiefs".
    #[serde(default)]
    pub home_team: String,
    #[serde(default)]
    pub away_team: String,
    #[serde(default)]
    pub bookmakers: Vec<Bookmaker>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bookmaker {
    pub key: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub markets: Vec<BookMarket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookMarket {
    /// "h2h", "spreads", "totals"
    pub key: String,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub name: String,
    /// American odds.
    #[serde(default)]
    pub price: Option<f64>,
    /// Handicap, present on spreads.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point: Option<f64>,
}

impl OddsEvent {
    /// Market `key` from bookmaker `book`, if quoted.
    pub fn market(&self, book: &str, key: &str) -> Option<&BookMarket> {
        self.bookmakers
            .iter()
            .find(|b| b.key == book)?
            .markets
            .iter()
            .find(|m| m.key == key)
    }
}

// ---------------------------------------------------------------------------
// Merging
// ---------------------------------------------------------------------------

/// Merge several event lists into one. Events keep first-seen order;
/// within an event bookmakers are merged by key and markets by key, with
/// later lists replacing earlier markets of the same key.
pub fn merge_events(lists: Vec<Vec<OddsEvent>>) -> Vec<OddsEvent> {
    let mut merged: Vec<OddsEvent> = Vec::new();

    for event in lists.into_iter().flatten() {
        let idx = match merged.iter().position(|e| e.id == event.id) {
            Some(i) => i,
            None => {
                merged.push(OddsEvent {
                    bookmakers: Vec::new(),
                    ..event.clone()
                });
                merged.len() - 1
            }
        };
        let target = &mut merged[idx];

        for book in event.bookmakers {
            let b = match target.bookmakers.iter().position(|b| b.key == book.key) {
                Some(i) => i,
                None => {
                    target.bookmakers.push(Bookmaker {
                        markets: Vec::new(),
                        ..book.clone()
                    });
                    target.bookmakers.len() - 1
                }
            };
            let tb = &mut target.bookmakers[b];
            for market in book.markets {
                match tb.markets.iter_mut().find(|m| m.key == market.key) {
                    Some(existing) => *existing = market,
                    None => tb.markets.push(market),
                }
            }
        }
    }

    merged
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// The Odds API v4 client.
pub struct OddsApiClient {
    http: Client,
    api_key: SecretString,
    base_url: String,
    sport_key: String,
    regions: String,
}

impl OddsApiClient {
    pub fn new(api_key: SecretString, cfg: &OddsConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .user_agent(concat!("nfl_picks/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client for The Odds API")?;

        Ok(Self {
            http,
            api_key,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            sport_key: cfg.sport_key.clone(),
            regions: cfg.regions.clone(),
        })
    }

    /// Request URL for one market. The key is included, so never log it.
    fn odds_url(&self, market: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> String {
        format!(
            "{}/sports/{}/odds?apiKey={}&regions={}&markets={}&oddsFormat=american&dateFormat=iso&commenceTimeFrom={}&commenceTimeTo={}",
            self.base_url,
            self.sport_key,
            urlencoding::encode(self.api_key.expose_secret()),
            urlencoding::encode(&self.regions),
            market,
            urlencoding::encode(&from.to_rfc3339_opts(SecondsFormat::Secs, true)),
            urlencoding::encode(&to.to_rfc3339_opts(SecondsFormat::Secs, true)),
        )
    }

    /// Fetch one market's events.
    async fn fetch_market(&self, market: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<OddsEvent>> {
        debug!(sport = %self.sport_key, market, %from, %to, "Fetching odds");

        let resp = self
            .http
            .get(self.odds_url(market, from, to))
            .send()
            .await
            .with_context(|| format!("Odds API request failed ({market})"))?;

        let header = |name: &str| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("?")
                .to_string()
        };
        debug!(
            market,
            remaining = %header("x-requests-remaining"),
            used = %header("x-requests-used"),
            "Odds API quota"
        );

        let resp = check_status("odds", resp).await?;
        let events: Vec<OddsEvent> = resp
            .json()
            .await
            .with_context(|| format!("Failed to parse Odds API response ({market})"))?;

        info!(market, events = events.len(), "Odds fetched");
        Ok(events)
    }
}

#[async_trait]
impl OddsSource for OddsApiClient {
    async fn fetch_odds(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<OddsEvent>> {
        let spreads = self.fetch_market("spreads", from, to).await?;
        let h2h = self.fetch_market("h2h", from, to).await?;
        Ok(merge_events(vec![spreads, h2h]))
    }

    fn name(&self) -> &str {
        "the-odds-api"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
