//! Mock data sources for integration testing.
//!
//! Deterministic `ScheduleSource`, `OddsSource`, and `ForecastSource`
//! implementations that serve fixed data, count calls, and can be forced
//! to fail. Clones share state, so a test keeps one handle and boxes
//! another into the pipeline.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use std::sync::{Arc, Mutex};

use nfl_picks::data::odds::{BookMarket, Bookmaker, OddsEvent, Outcome};
use nfl_picks::data::schedule::parse_games;
use nfl_picks::config::AppConfig;
use nfl_picks::data::{ForecastSource, OddsSource, ScheduleSource};
use nfl_picks::engine::SourceFactory;
use nfl_picks::teams::Franchise;
use nfl_picks::types::{Forecast, Game};

/// Two completed 2024 games for training, three 2025 fixtures.
pub const GAMES_CSV: &str = "\
game_id,season,game_type,week,gameday,weekday,gametime,away_team,away_score,home_team,home_score,location,roof
2024_01_BAL_KC,2024,REG,1,2024-09-05,Thursday,20:20,BAL,20,KC,27,Home,outdoors
2024_02_KC_CIN,2024,REG,2,2024-09-15,Sunday,16:25,CIN,25,KC,26,Home,outdoors
2025_01_BAL_KC,2025,REG,1,2025-09-07,Sunday,13:00,BAL,NA,KC,NA,Home,outdoors
2025_01_DAL_DET,2025,REG,1,2025-09-07,Sunday,16:25,DAL,NA,DET,NA,Home,dome
2025_01_LV_DEN,2025,REG,1,2025-09-08,Monday,,LV,NA,DEN,NA,Home,outdoors
";

/// Fixed test date: every 2025 fixture above is upcoming.
pub fn today() -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
}

/// Env lookup serving both credentials.
pub fn full_env(name: &str) -> Option<String> {
    match name {
        "THE_ODDS_API_KEY" => Some("test-key".to_string()),
        "NWS_USER_AGENT" => Some("picks-test (ops@example.com)".to_string()),
        _ => None,
    }
}

fn forced(slot: &Arc<Mutex<Option<String>>>) -> Result<()> {
    match slot.lock().unwrap().clone() {
        Some(msg) => Err(anyhow!(msg)),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct MockSchedule {
    games: Vec<Game>,
    pub calls: Arc<Mutex<usize>>,
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockSchedule {
    pub fn new() -> Self {
        Self::with_games(parse_games(GAMES_CSV).unwrap())
    }

    pub fn with_games(games: Vec<Game>) -> Self {
        Self {
            games,
            calls: Arc::new(Mutex::new(0)),
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Only the completed games: nothing left to predict.
    pub fn history_only() -> Self {
        let games = parse_games(GAMES_CSV)
            .unwrap()
            .into_iter()
            .filter(|g| g.is_completed())
            .collect();
        Self::with_games(games)
    }

    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ScheduleSource for MockSchedule {
    async fn fetch_games(&self) -> Result<Vec<Game>> {
        *self.calls.lock().unwrap() += 1;
        forced(&self.force_error)?;
        Ok(self.games.clone())
    }

    fn name(&self) -> &str {
        "mock-schedule"
    }
}

// ---------------------------------------------------------------------------
// Odds
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct MockOdds {
    events: Vec<OddsEvent>,
    pub windows: Arc<Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>>,
    force_error: Arc<Mutex<Option<String>>>,
}

impl MockOdds {
    pub fn new() -> Self {
        Self {
            events: vec![chiefs_ravens()],
            windows: Arc::new(Mutex::new(Vec::new())),
            force_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn set_error(&self, msg: &str) {
        *self.force_error.lock().unwrap() = Some(msg.to_string());
    }

    pub fn call_count(&self) -> usize {
        self.windows.lock().unwrap().len()
    }
}

fn outcome(name: &str, price: f64, point: Option<f64>) -> Outcome {
    Outcome {
        name: name.to_string(),
        price: Some(price),
        point,
    }
}

fn chiefs_ravens() -> OddsEvent {
    let kc = "Kansas City Chiefs";
    let bal = "Baltimore Ravens";
    OddsEvent {
        id: "evt-kc-bal".to_string(),
        commence_time: None,
        home_team: kc.to_string(),
        away_team: bal.to_string(),
        bookmakers: vec![
            Bookmaker {
                key: "fanduel".to_string(),
                title: "FanDuel".to_string(),
                markets: vec![BookMarket {
                    key: "h2h".to_string(),
                    outcomes: vec![outcome(kc, -160.0, None), outcome(bal, 135.0, None)],
                }],
            },
            Bookmaker {
                key: "draftkings".to_string(),
                title: "DraftKings".to_string(),
                markets: vec![
                    BookMarket {
                        key: "h2h".to_string(),
                        outcomes: vec![outcome(kc, -150.0, None), outcome(bal, 130.0, None)],
                    },
                    BookMarket {
                        key: "spreads".to_string(),
                        outcomes: vec![
                            outcome(kc, -110.0, Some(-3.0)),
                            outcome(bal, -110.0, Some(3.0)),
                        ],
                    },
                ],
            },
        ],
    }
}

#[async_trait]
impl OddsSource for MockOdds {
    async fn fetch_odds(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Result<Vec<OddsEvent>> {
        self.windows.lock().unwrap().push((from, to));
        forced(&self.force_error)?;
        Ok(self.events.clone())
    }

    fn name(&self) -> &str {
        "mock-odds"
    }
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct MockWeather {
    /// Team codes of the venues requested, in order.
    pub venues: Arc<Mutex<Vec<String>>>,
    /// Venues that report no forecast (beyond the horizon).
    beyond_horizon: Vec<String>,
}

impl MockWeather {
    pub fn new() -> Self {
        Self {
            venues: Arc::new(Mutex::new(Vec::new())),
            beyond_horizon: vec!["DEN".to_string()],
        }
    }

    pub fn requested(&self) -> Vec<String> {
        self.venues.lock().unwrap().clone()
    }
}

#[async_trait]
impl ForecastSource for MockWeather {
    async fn forecast_at(&self, venue: &Franchise, _kickoff: DateTime<Utc>) -> Result<Option<Forecast>> {
        self.venues.lock().unwrap().push(venue.code.to_string());
        if self.beyond_horizon.iter().any(|c| c == venue.code) {
            return Ok(None);
        }
        Ok(Some(Forecast {
            temp_f: Some(78.0),
            wind_mph: Some(9.0),
            precip_pct: Some(10.0),
            short_forecast: "Partly Sunny".to_string(),
        }))
    }

    fn name(&self) -> &str {
        "mock-weather"
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Hands out clones of the mocks and counts how many sources were built.
pub struct MockFactory {
    pub schedule: MockSchedule,
    pub odds: MockOdds,
    pub weather: MockWeather,
    pub built: Arc<Mutex<usize>>,
}

impl MockFactory {
    pub fn new() -> Self {
        Self {
            schedule: MockSchedule::new(),
            odds: MockOdds::new(),
            weather: MockWeather::new(),
            built: Arc::new(Mutex::new(0)),
        }
    }

    pub fn built_count(&self) -> usize {
        *self.built.lock().unwrap()
    }

    fn bump(&self) {
        *self.built.lock().unwrap() += 1;
    }
}

impl SourceFactory for MockFactory {
    fn schedule(&self, _cfg: &AppConfig) -> Result<Box<dyn ScheduleSource>> {
        self.bump();
        Ok(Box::new(self.schedule.clone()))
    }

    fn odds(&self, _cfg: &AppConfig, _api_key: SecretString) -> Result<Box<dyn OddsSource>> {
        self.bump();
        Ok(Box::new(self.odds.clone()))
    }

    fn weather(&self, _cfg: &AppConfig, _user_agent: &str) -> Result<Box<dyn ForecastSource>> {
        self.bump();
        Ok(Box::new(self.weather.clone()))
    }
}
