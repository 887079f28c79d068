//! League schedule provider.
//!
//! Downloads the nflverse `games.csv` table, which carries every game
//! since 1999 with final scores plus the announced fixtures of the
//! current season. One download serves both the Elo training history and
//! the list of games to predict.
//!
//! Source: `https://github.com/nflverse/nfldata/raw/master/data/games.csv`
//! Auth: None required.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{check_status, ScheduleSource};
use crate::teams::normalize_code;
use crate::types::{Game, PipelineError, Roof};

// ---------------------------------------------------------------------------
// CSV record
// ---------------------------------------------------------------------------

/// One row of `games.csv`. Only the columns we need; the rest are ignored.
/// Numeric cells hold `NA` for unplayed games, hence `invalid_option`.
#[derive(Debug, Deserialize)]
struct GameRecord {
    game_id: String,
    season: i32,
    #[serde(default)]
    game_type: String,
    week: u32,
    #[serde(default)]
    gameday: String,
    #[serde(default)]
    gametime: String,
    #[serde(default)]
    away_team: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    away_score: Option<f64>,
    #[serde(default)]
    home_team: String,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    home_score: Option<f64>,
    /// "Home" or "Neutral".
    #[serde(default)]
    location: String,
    #[serde(default)]
    roof: String,
}

impl GameRecord {
    fn into_game(self) -> Option<Game> {
        if self.home_team.trim().is_empty() || self.away_team.trim().is_empty() {
            return None;
        }
        let gameday = NaiveDate::parse_from_str(self.gameday.trim(), "%Y-%m-%d").ok()?;
        let gametime = NaiveTime::parse_from_str(self.gametime.trim(), "%H:%M").ok();
        let score = |s: Option<f64>| s.filter(|v| v.is_finite() && *v >= 0.0).map(|v| v.round() as u32);

        Some(Game {
            game_id: self.game_id,
            season: self.season,
            week: self.week,
            game_type: self.game_type,
            gameday,
            gametime,
            home_team: normalize_code(&self.home_team),
            away_team: normalize_code(&self.away_team),
            home_score: score(self.home_score),
            away_score: score(self.away_score),
            roof: self.roof.parse().unwrap_or(Roof::Unknown),
            neutral_site: self.location.trim().eq_ignore_ascii_case("neutral"),
        })
    }
}

/// Parse the games table. Rows missing a team or a parseable gameday are
/// skipped; a table with no usable rows is an error.
pub fn parse_games(text: &str) -> Result<Vec<Game>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut games = Vec::new();
    let mut skipped = 0usize;

    for record in reader.deserialize::<GameRecord>() {
        match record {
            Ok(rec) => match rec.into_game() {
                Some(g) => games.push(g),
                None => skipped += 1,
            },
            Err(e) => {
                debug!(error = %e, "Unreadable games.csv row");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!(skipped, parsed = games.len(), "Skipped games.csv rows");
    }

    if games.is_empty() {
        return Err(PipelineError::Schedule("games table contained no usable rows".into()).into());
    }

    Ok(games)
}

// ---------------------------------------------------------------------------
// Splitting
// ---------------------------------------------------------------------------

/// Games partitioned for training and prediction.
#[derive(Debug, Clone, Default)]
pub struct ScheduleSplit {
    /// Completed games in the training window, chronological.
    pub history: Vec<Game>,
    /// Target-season games without a result, on or after `today`.
    pub upcoming: Vec<Game>,
}

/// Partition `games` into training history (completed games with season in
/// `train_from..=train_to`) and upcoming games of `season`.
pub fn split_games(
    games: &[Game],
    season: i32,
    (train_from, train_to): (i32, i32),
    today: NaiveDate,
) -> ScheduleSplit {
    let mut history: Vec<Game> = games
        .iter()
        .filter(|g| g.is_completed() && (train_from..=train_to).contains(&g.season))
        .cloned()
        .collect();
    history.sort_by(|a, b| (a.gameday, &a.game_id).cmp(&(b.gameday, &b.game_id)));

    let mut upcoming: Vec<Game> = games
        .iter()
        .filter(|g| g.season == season && !g.is_completed() && g.gameday >= today)
        .cloned()
        .collect();
    upcoming.sort_by(|a, b| {
        (a.gameday, a.gametime, &a.game_id).cmp(&(b.gameday, b.gametime, &b.game_id))
    });

    ScheduleSplit { history, upcoming }
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

pub struct NflverseSchedule {
    http: Client,
    url: String,
}

impl NflverseSchedule {
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .user_agent(concat!("nfl_picks/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build schedule HTTP client")?;
        Ok(Self {
            http,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl ScheduleSource for NflverseSchedule {
    async fn fetch_games(&self) -> Result<Vec<Game>> {
        debug!(url = %self.url, "Fetching games table");

        let resp = self.http.get(&self.url).send().await
            .context("Schedule request failed")?;
        let resp = check_status("schedule", resp).await?;
        let text = resp.text().await
            .context("Failed to read schedule body")?;

        let games = parse_games(&text)?;
        info!(games = games.len(), "Schedule loaded");
        Ok(games)
    }

    fn name(&self) -> &str {
        "nflverse"
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
