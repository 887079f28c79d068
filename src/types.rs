//! Shared types for the pick-sheet pipeline.
//!
//! These types form the data model passed between stages: games from the
//! schedule, market lines from the odds feed, forecasts from the weather
//! service, and the published pick-sheet row.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Games
// ---------------------------------------------------------------------------

/// A single NFL game, completed or upcoming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub game_id: String,
    pub season: i32,
    pub week: u32,
    /// "REG", "WC", "DIV", "CON", "SB" (nflverse convention)
    pub game_type: String,
    pub gameday: NaiveDate,
    /// Kickoff in US/Eastern local time, when announced.
    pub gametime: Option<NaiveTime>,
    /// Normalized team code (see `teams::normalize_code`).
    pub home_team: String,
    pub away_team: String,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub roof: Roof,
    /// Played away from the home team's stadium (international games,
    /// Super Bowl).
    #[serde(default)]
    pub neutral_site: bool,
}

impl Game {
    /// Both scores are known.
    pub fn is_completed(&self) -> bool {
        self.home_score.is_some() && self.away_score.is_some()
    }

    /// Home win as 1.0, anything else (loss or tie) as 0.0.
    /// `None` for games without a result.
    pub fn home_outcome(&self) -> Option<f64> {
        match (self.home_score, self.away_score) {
            (Some(h), Some(a)) => Some(if h > a { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Matchup key used to join odds onto the schedule.
    pub fn matchup(&self) -> (String, String) {
        (self.home_team.clone(), self.away_team.clone())
    }

    /// Helper to build a test game with sensible defaults.
    #[cfg(test)]
    pub fn sample(id: &str, date: &str, home: &str, away: &str) -> Self {
        Game {
            game_id: id.to_string(),
            season: 2025,
            week: 1,
            game_type: "REG".to_string(),
            gameday: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            gametime: NaiveTime::from_hms_opt(13, 0, 0),
            home_team: home.to_string(),
            away_team: away.to_string(),
            home_score: None,
            away_score: None,
            roof: Roof::Outdoors,
            neutral_site: false,
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} wk{}] {} @ {} ({})",
            self.season, self.week, self.away_team, self.home_team, self.gameday,
        )?;
        if let (Some(h), Some(a)) = (self.home_score, self.away_score) {
            write!(f, " {a}-{h}")?;
        }
        Ok(())
    }
}

/// Stadium roof as reported by the schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Roof {
    Outdoors,
    Open,
    Closed,
    Dome,
    Unknown,
}

impl Roof {
    /// Weather does not reach the field.
    pub fn is_indoor(&self) -> bool {
        matches!(self, Roof::Closed | Roof::Dome)
    }
}

impl fmt::Display for Roof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Roof::Outdoors => write!(f, "outdoors"),
            Roof::Open => write!(f, "open"),
            Roof::Closed => write!(f, "closed"),
            Roof::Dome => write!(f, "dome"),
            Roof::Unknown => write!(f, "unknown"),
        }
    }
}

/// Lenient parse: anything unrecognised becomes `Unknown`.
impl std::str::FromStr for Roof {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "outdoors" | "outdoor" => Roof::Outdoors,
            "open" => Roof::Open,
            "closed" => Roof::Closed,
            "dome" | "indoors" => Roof::Dome,
            _ => Roof::Unknown,
        })
    }
}

// ---------------------------------------------------------------------------
// Market lines
// ---------------------------------------------------------------------------

/// Consensus moneyline for one matchup.
#[derive(Debug, Clone, PartialEq)]
pub struct Moneyline {
    /// American odds.
    pub home_price: f64,
    pub away_price: f64,
    /// Implied probabilities including the bookmaker margin.
    pub home_prob_raw: f64,
    pub away_prob_raw: f64,
    /// Vig-removed probabilities (sum to 1).
    pub home_prob: f64,
    pub away_prob: f64,
}

/// Consensus point spread for one matchup.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadLine {
    /// Home line in points; negative means home favored.
    pub home_line: f64,
    pub home_price: f64,
    pub away_price: f64,
}

/// Everything the odds feed says about one matchup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketLine {
    pub moneyline: Option<Moneyline>,
    pub spread: Option<SpreadLine>,
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// Forecast conditions for a kickoff hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub temp_f: Option<f64>,
    pub wind_mph: Option<f64>,
    pub precip_pct: Option<f64>,
    pub short_forecast: String,
}

/// Weather outcome for a single game.
#[derive(Debug, Clone, PartialEq)]
pub enum GameWeather {
    /// Dome or closed roof; no request was made.
    Indoor,
    Forecast(Forecast),
    /// Kickoff is beyond the forecast horizon, the venue is unknown, or
    /// the game is at a neutral site.
    Unavailable,
}

// ---------------------------------------------------------------------------
// Pick sheet
// ---------------------------------------------------------------------------

/// One published row of `pick_sheet.csv`. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickRow {
    pub season: i32,
    pub week: u32,
    pub gameday: NaiveDate,
    pub gametime: Option<String>,
    pub game_id: String,
    pub home_team: String,
    pub away_team: String,

    pub home_ml: Option<f64>,
    pub away_ml: Option<f64>,
    pub home_prob_raw: Option<f64>,
    pub away_prob_raw: Option<f64>,
    pub home_prob: Option<f64>,
    pub away_prob: Option<f64>,

    pub home_line: Option<f64>,
    pub home_spread_odds: Option<f64>,
    pub away_spread_odds: Option<f64>,

    pub home_elo: f64,
    pub away_elo: f64,
    pub home_prob_model: f64,
    pub away_prob_model: f64,

    pub model_spread: f64,
    pub market_spread: Option<f64>,
    pub spread_edge: Option<f64>,
    pub home_cover_prob: Option<f64>,

    pub home_kelly_5pct: f64,
    pub away_kelly_5pct: f64,
    pub ats_kelly: Option<f64>,

    pub home_rest_days: Option<i64>,
    pub away_rest_days: Option<i64>,
    pub travel_miles: Option<f64>,

    pub roof: Roof,
    pub temp_f: Option<f64>,
    pub wind_mph: Option<f64>,
    pub precip_pct: Option<f64>,
    pub forecast: Option<String>,
}

impl fmt::Display for PickRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} @ {}: model {:.0}% home (spread {:+.1})",
            self.away_team,
            self.home_team,
            self.home_prob_model * 100.0,
            self.model_spread,
        )?;
        if let Some(p) = self.home_prob {
            write!(f, " | market {:.0}%", p * 100.0)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain-specific error types for the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),

    #[error("HTTP error ({service}): {status}: {body}")]
    Http {
        service: String,
        status: u16,
        body: String,
    },

    #[error("Schedule error: {0}")]
    Schedule(String),

    #[error("Publish error: {0}")]
    Publish(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
