//! The `run_all` pipeline.
//!
//! Stages run strictly in order: schedule → odds → weather → model →
//! publish. Any stage error aborts the run; there are no retries.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::kickoff::{eastern_date, kickoff_utc};
use super::picks::PickBuilder;
use crate::config::{AppConfig, ModelConfig};
use crate::data::odds::OddsEvent;
use crate::data::schedule::split_games;
use crate::data::{ForecastSource, OddsSource, ScheduleSource};
use crate::model::{EloModel, EloParams};
use crate::storage::{Artifacts, Publisher, RunMeta};
use crate::strategy::Consensus;
use crate::teams;
use crate::types::{Game, GameWeather};

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Per-run settings resolved from config and the current date.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub cache_dir: PathBuf,
    pub season: i32,
    pub training_seasons: (i32, i32),
    /// US/Eastern date of the run; games before it are never upcoming.
    pub today: NaiveDate,
    pub preferred_books: Vec<String>,
    pub model: ModelConfig,
}

impl PipelineSettings {
    /// Settings for a run starting at `now`.
    pub fn at(cfg: &AppConfig, now: DateTime<Utc>) -> Self {
        Self::from_config(cfg, eastern_date(now))
    }

    pub fn from_config(cfg: &AppConfig, today: NaiveDate) -> Self {
        let season = cfg.target_season(today);
        Self {
            cache_dir: cfg.pipeline.cache_dir.clone(),
            season,
            training_seasons: cfg.training_seasons(season),
            today,
            preferred_books: cfg.odds.preferred_books.clone(),
            model: cfg.model.clone(),
        }
    }
}

/// Odds request window: two days before the first upcoming game through
/// nine days after the last, both at midnight UTC.
pub fn odds_window(upcoming: &[Game]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let first = upcoming.iter().map(|g| g.gameday).min()?;
    let last = upcoming.iter().map(|g| g.gameday).max()?;
    let from = (first - Duration::days(2)).and_time(chrono::NaiveTime::MIN).and_utc();
    let to = (last + Duration::days(9)).and_time(chrono::NaiveTime::MIN).and_utc();
    Some((from, to))
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub season: i32,
    pub games_loaded: usize,
    pub history_games: usize,
    pub upcoming_games: usize,
    pub odds_events: usize,
    pub lines_matched: usize,
    pub forecasts: usize,
    pub picks: usize,
    pub files: Vec<PathBuf>,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "season {}: {} picks from {} upcoming games ({} with odds, {} with forecasts), \
             Elo trained on {} games, {} files written",
            self.season,
            self.picks,
            self.upcoming_games,
            self.lines_matched,
            self.forecasts,
            self.history_games,
            self.files.len(),
        )
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

pub struct Pipeline {
    schedule: Box<dyn ScheduleSource>,
    odds: Box<dyn OddsSource>,
    weather: Option<Box<dyn ForecastSource>>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        schedule: Box<dyn ScheduleSource>,
        odds: Box<dyn OddsSource>,
        weather: Option<Box<dyn ForecastSource>>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            schedule,
            odds,
            weather,
            settings,
        }
    }

    /// Run every stage once.
    pub async fn run(&self) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let s = &self.settings;
        info!(
            %run_id,
            season = s.season,
            train_from = s.training_seasons.0,
            train_to = s.training_seasons.1,
            today = %s.today,
            "Pipeline starting"
        );

        // 1. Schedule
        let games = self
            .schedule
            .fetch_games()
            .await
            .with_context(|| format!("Schedule fetch failed ({})", self.schedule.name()))?;
        let split = split_games(&games, s.season, s.training_seasons, s.today);
        info!(
            games = games.len(),
            history = split.history.len(),
            upcoming = split.upcoming.len(),
            "Schedule split"
        );

        // 2. Odds
        let events = self.fetch_odds(&split.upcoming).await?;
        let lines = Consensus::new(s.preferred_books.clone()).market_lines(&events);
        let lines_matched = split
            .upcoming
            .iter()
            .filter(|g| lines.contains_key(&g.matchup()))
            .count();
        info!(events = events.len(), matched = lines_matched, "Odds consensus built");

        // 3. Weather
        let weather = self.fetch_weather(&split.upcoming).await?;
        let forecasts = weather
            .values()
            .filter(|w| matches!(w, GameWeather::Forecast(_)))
            .count();

        // 4. Model
        let elo = EloModel::train(EloParams::from(&s.model), &split.history);
        let picks = PickBuilder::new(&elo, &games, &s.model).rows(&split.upcoming, &lines, &weather);

        // 5. Publish
        let meta = RunMeta {
            run_id,
            generated_at: Utc::now(),
            season: s.season,
            training_seasons: s.training_seasons,
            games_loaded: games.len(),
            history_games: split.history.len(),
            upcoming_games: split.upcoming.len(),
            odds_events: events.len(),
            picks: picks.len(),
        };
        let files = Publisher::new(&s.cache_dir).publish(&Artifacts {
            upcoming: &split.upcoming,
            odds: &events,
            picks: &picks,
            elo: &elo,
            meta: &meta,
        })?;

        Ok(RunReport {
            run_id,
            season: s.season,
            games_loaded: games.len(),
            history_games: split.history.len(),
            upcoming_games: split.upcoming.len(),
            odds_events: events.len(),
            lines_matched,
            forecasts,
            picks: picks.len(),
            files,
        })
    }

    async fn fetch_odds(&self, upcoming: &[Game]) -> Result<Vec<OddsEvent>> {
        let Some((from, to)) = odds_window(upcoming) else {
            info!("No upcoming games, skipping odds fetch");
            return Ok(Vec::new());
        };
        self.odds
            .fetch_odds(from, to)
            .await
            .with_context(|| format!("Odds fetch failed ({})", self.odds.name()))
    }

    /// Weather per game id. Requests are made one game at a time.
    async fn fetch_weather(&self, upcoming: &[Game]) -> Result<HashMap<String, GameWeather>> {
        let mut out = HashMap::new();
        let Some(source) = &self.weather else {
            info!("Weather disabled, skipping forecasts");
            return Ok(out);
        };

        for game in upcoming {
            let wx = if game.roof.is_indoor() {
                GameWeather::Indoor
            } else if game.neutral_site {
                debug!(game_id = %game.game_id, "Neutral site, no stadium forecast");
                GameWeather::Unavailable
            } else if let Some(venue) = teams::franchise(&game.home_team) {
                let kickoff = kickoff_utc(game);
                match source
                    .forecast_at(venue, kickoff)
                    .await
                    .with_context(|| format!("Forecast failed for {game} ({})", source.name()))?
                {
                    Some(f) => GameWeather::Forecast(f),
                    None => GameWeather::Unavailable,
                }
            } else {
                warn!(game_id = %game.game_id, team = %game.home_team, "No stadium for home team");
                GameWeather::Unavailable
            };
            out.insert(game.game_id.clone(), wx);
        }

        info!(games = upcoming.len(), "Weather stage complete");
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odds_window() {
        let games = vec![
            Game::sample("g2", "2025-09-14", "KC", "DEN"),
            Game::sample("g1", "2025-09-07", "KC", "BAL"),
        ];
        let (from, to) = odds_window(&games).unwrap();
        assert_eq!(from.to_rfc3339(), "2025-09-05T00:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2025-09-23T00:00:00+00:00");
    }

    #[test]
    fn test_odds_window_empty() {
        assert!(odds_window(&[]).is_none());
    }

    #[test]
    fn test_settings_from_config() {
        let cfg = AppConfig::default();
        let today = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        let s = PipelineSettings::from_config(&cfg, today);
        assert_eq!(s.season, 2025);
        assert_eq!(s.training_seasons, (2018, 2025));
        assert_eq!(s.preferred_books, vec!["draftkings".to_string()]);
    }

    #[test]
    fn test_settings_use_eastern_date() {
        let cfg = AppConfig::default();
        let now = chrono::TimeZone::with_ymd_and_hms(&Utc, 2025, 9, 8, 1, 0, 0).unwrap();
        let s = PipelineSettings::at(&cfg, now);
        assert_eq!(s.today, NaiveDate::from_ymd_opt(2025, 9, 7).unwrap());
    }
}
