//! End-to-end runs of the pipeline against mock sources and a temporary
//! cache directory.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::{TimeZone, Utc};

use nfl_picks::config::AppConfig;
use nfl_picks::data::schedule::parse_games;
use nfl_picks::engine::{run_all, Pipeline, PipelineSettings};
use nfl_picks::model::EloModel;
use nfl_picks::storage::{self, RunMeta};
use nfl_picks::types::{PickRow, PipelineError, Roof};

use crate::mock_sources::{full_env, today, MockFactory, MockOdds, MockSchedule, MockWeather, GAMES_CSV};

fn settings(cache: &Path) -> PipelineSettings {
    let mut cfg = AppConfig::default();
    cfg.pipeline.cache_dir = cache.to_path_buf();
    PipelineSettings::from_config(&cfg, today())
}

fn pipeline(cache: &Path, schedule: &MockSchedule, odds: &MockOdds, weather: &MockWeather) -> Pipeline {
    Pipeline::new(
        Box::new(schedule.clone()),
        Box::new(odds.clone()),
        Some(Box::new(weather.clone())),
        settings(cache),
    )
}

fn picks(cache: &Path) -> Vec<PickRow> {
    storage::read_pick_sheet(&cache.join(storage::PICK_SHEET_FILE)).unwrap()
}

#[tokio::test]
async fn test_run_publishes_all_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("cache");
    let (schedule, odds, weather) = (MockSchedule::new(), MockOdds::new(), MockWeather::new());

    let report = pipeline(&cache, &schedule, &odds, &weather).run().await.unwrap();

    assert_eq!(report.season, 2025);
    assert_eq!(report.history_games, 2);
    assert_eq!(report.upcoming_games, 3);
    assert_eq!(report.picks, 3);
    assert_eq!(report.lines_matched, 1);
    assert_eq!(report.files.len(), 5);
    for name in [
        storage::SCHEDULE_FILE,
        storage::ODDS_FILE,
        storage::PICK_SHEET_FILE,
        storage::ELO_FILE,
        storage::RUN_META_FILE,
    ] {
        assert!(cache.join(name).exists(), "{name} missing");
    }

    let meta: RunMeta =
        serde_json::from_str(&fs::read_to_string(cache.join(storage::RUN_META_FILE)).unwrap()).unwrap();
    assert_eq!(meta.run_id, report.run_id);
    assert_eq!(meta.training_seasons, (2018, 2025));
    assert_eq!(meta.picks, 3);

    let elo: EloModel =
        serde_json::from_str(&fs::read_to_string(cache.join(storage::ELO_FILE)).unwrap()).unwrap();
    assert_eq!(elo.games_trained, 2);
    assert!(elo.rating("KC") > 1500.0);
}

#[tokio::test]
async fn test_pick_sheet_contents() {
    let dir = tempfile::tempdir().unwrap();
    let (schedule, odds, weather) = (MockSchedule::new(), MockOdds::new(), MockWeather::new());
    pipeline(dir.path(), &schedule, &odds, &weather).run().await.unwrap();

    let rows: HashMap<String, PickRow> = picks(dir.path())
        .into_iter()
        .map(|r| (r.game_id.clone(), r))
        .collect();

    // Odds matched by franchise name; DraftKings preferred over FanDuel
    let kc = &rows["2025_01_BAL_KC"];
    assert_eq!(kc.home_ml, Some(-150.0));
    assert_eq!(kc.away_ml, Some(130.0));
    assert_eq!(kc.home_line, Some(-3.0));
    let fair = kc.home_prob.unwrap() + kc.away_prob.unwrap();
    assert!((fair - 1.0).abs() < 1e-3);
    assert!(kc.home_cover_prob.is_some());
    assert!(kc.ats_kelly.is_some());
    assert_eq!(kc.temp_f, Some(78.0));
    assert_eq!(kc.forecast.as_deref(), Some("Partly Sunny"));
    assert!(kc.home_elo > kc.away_elo);
    assert!(kc.home_prob_model > 0.5);

    // Dome: no forecast, no odds
    let det = &rows["2025_01_DAL_DET"];
    assert_eq!(det.roof, Roof::Dome);
    assert_eq!(det.temp_f, None);
    assert_eq!(det.home_ml, None);
    assert_eq!(det.home_kelly_5pct, 0.0);
    assert_eq!(det.market_spread, None);

    // Beyond the forecast horizon: empty weather cells, not an error
    let den = &rows["2025_01_LV_DEN"];
    assert_eq!(den.gametime, None);
    assert_eq!(den.temp_f, None);
    assert!(den.travel_miles.unwrap() > 0.0);

    // Week 1 rest spans back to the previous season's last game
    assert!(kc.home_rest_days.unwrap() > 300);
}

#[tokio::test]
async fn test_indoor_games_skip_weather_requests() {
    let dir = tempfile::tempdir().unwrap();
    let (schedule, odds, weather) = (MockSchedule::new(), MockOdds::new(), MockWeather::new());
    pipeline(dir.path(), &schedule, &odds, &weather).run().await.unwrap();

    assert_eq!(weather.requested(), vec!["KC".to_string(), "DEN".to_string()]);
}

#[tokio::test]
async fn test_identical_inputs_give_identical_pick_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let (schedule, odds, weather) = (MockSchedule::new(), MockOdds::new(), MockWeather::new());
    let path = dir.path().join(storage::PICK_SHEET_FILE);

    pipeline(dir.path(), &schedule, &odds, &weather).run().await.unwrap();
    let first = fs::read(&path).unwrap();
    pipeline(dir.path(), &schedule, &odds, &weather).run().await.unwrap();
    let second = fs::read(&path).unwrap();

    assert_eq!(first, second);
    assert_eq!(schedule.call_count(), 2);
}

#[tokio::test]
async fn test_odds_window_spans_upcoming_games() {
    let dir = tempfile::tempdir().unwrap();
    let (schedule, odds, weather) = (MockSchedule::new(), MockOdds::new(), MockWeather::new());
    pipeline(dir.path(), &schedule, &odds, &weather).run().await.unwrap();

    let windows = odds.windows.lock().unwrap().clone();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].0.to_rfc3339(), "2025-09-05T00:00:00+00:00");
    assert_eq!(windows[0].1.to_rfc3339(), "2025-09-17T00:00:00+00:00");
}

#[tokio::test]
async fn test_no_upcoming_games_skips_odds() {
    let dir = tempfile::tempdir().unwrap();
    let (schedule, odds, weather) = (MockSchedule::history_only(), MockOdds::new(), MockWeather::new());

    let report = pipeline(dir.path(), &schedule, &odds, &weather).run().await.unwrap();

    assert_eq!(odds.call_count(), 0);
    assert!(weather.requested().is_empty());
    assert_eq!(report.picks, 0);
    assert!(picks(dir.path()).is_empty());
    let odds_raw = fs::read_to_string(dir.path().join(storage::ODDS_FILE)).unwrap();
    assert_eq!(odds_raw.trim(), "[]");
}

#[tokio::test]
async fn test_weather_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let (schedule, odds) = (MockSchedule::new(), MockOdds::new());
    let p = Pipeline::new(
        Box::new(schedule.clone()),
        Box::new(odds.clone()),
        None,
        settings(dir.path()),
    );
    let report = p.run().await.unwrap();
    assert_eq!(report.forecasts, 0);
    assert!(picks(dir.path()).iter().all(|r| r.temp_f.is_none()));
}

#[tokio::test]
async fn test_odds_error_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("cache");
    let (schedule, odds, weather) = (MockSchedule::new(), MockOdds::new(), MockWeather::new());
    odds.set_error("quota exhausted");

    let err = pipeline(&cache, &schedule, &odds, &weather).run().await.unwrap_err();

    assert!(format!("{err:#}").contains("quota exhausted"));
    // Nothing downstream ran
    assert!(weather.requested().is_empty());
    assert!(!cache.join(storage::PICK_SHEET_FILE).exists());
}

#[tokio::test]
async fn test_schedule_error_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let (schedule, odds, weather) = (MockSchedule::new(), MockOdds::new(), MockWeather::new());
    schedule.set_error("connection reset");

    let err = pipeline(dir.path(), &schedule, &odds, &weather).run().await.unwrap_err();

    assert!(format!("{err:#}").contains("connection reset"));
    assert_eq!(odds.call_count(), 0);
}

#[tokio::test]
async fn test_neutral_site_game_gets_no_stadium_weather() {
    let dir = tempfile::tempdir().unwrap();
    let csv = format!("{GAMES_CSV}2025_01_MIN_CLE,2025,REG,1,2025-09-07,Sunday,09:30,MIN,NA,CLE,NA,Neutral,outdoors\n");
    let schedule = MockSchedule::with_games(parse_games(&csv).unwrap());
    let (odds, weather) = (MockOdds::new(), MockWeather::new());

    let report = pipeline(dir.path(), &schedule, &odds, &weather).run().await.unwrap();

    assert_eq!(report.upcoming_games, 4);
    assert!(!weather.requested().contains(&"CLE".to_string()));
    let rows = picks(dir.path());
    let cle = rows.iter().find(|r| r.game_id == "2025_01_MIN_CLE").unwrap();
    assert_eq!(cle.temp_f, None);
    assert_eq!(cle.forecast, None);
    assert_eq!(cle.travel_miles, None);
}

fn cache_config(cache: &Path) -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.pipeline.cache_dir = cache.to_path_buf();
    cfg
}

#[tokio::test]
async fn test_run_all_builds_sources_and_publishes() {
    let dir = tempfile::tempdir().unwrap();
    let factory = MockFactory::new();
    let now = Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap();

    let report = run_all(&cache_config(dir.path()), full_env, now, &factory).await.unwrap();

    assert_eq!(factory.built_count(), 3);
    assert_eq!(factory.schedule.call_count(), 1);
    assert_eq!(report.upcoming_games, 3);
    assert!(dir.path().join(storage::PICK_SHEET_FILE).exists());
}

#[tokio::test]
async fn test_missing_credential_fails_before_any_request() {
    let dir = tempfile::tempdir().unwrap();
    let factory = MockFactory::new();
    let now = Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap();
    let only_agent = |name: &str| (name == "NWS_USER_AGENT").then(|| full_env(name)).flatten();

    let err = run_all(&cache_config(dir.path()), only_agent, now, &factory)
        .await
        .unwrap_err();

    match err.downcast_ref::<PipelineError>() {
        Some(PipelineError::MissingCredential(var)) => assert_eq!(var, "THE_ODDS_API_KEY"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(factory.built_count(), 0);
    assert_eq!(factory.schedule.call_count(), 0);
    assert_eq!(factory.odds.call_count(), 0);
    assert!(factory.weather.requested().is_empty());
    assert!(!dir.path().join(storage::RUN_META_FILE).exists());
}

#[tokio::test]
async fn test_blank_user_agent_is_missing() {
    let factory = MockFactory::new();
    let now = Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap();
    let blank_agent = |name: &str| match name {
        "NWS_USER_AGENT" => Some("   ".to_string()),
        _ => full_env(name),
    };

    let err = run_all(&AppConfig::default(), blank_agent, now, &factory)
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::MissingCredential(var)) if var == "NWS_USER_AGENT"
    ));
    assert_eq!(factory.built_count(), 0);
}

#[tokio::test]
async fn test_late_evening_run_keeps_eastern_games() {
    // 21:00 EDT on kickoff Sunday is already Monday in UTC
    let dir = tempfile::tempdir().unwrap();
    let factory = MockFactory::new();
    let now = Utc.with_ymd_and_hms(2025, 9, 8, 1, 0, 0).unwrap();

    let report = run_all(&cache_config(dir.path()), full_env, now, &factory).await.unwrap();

    assert_eq!(report.upcoming_games, 3);
    let ids: Vec<String> = picks(dir.path()).into_iter().map(|r| r.game_id).collect();
    assert!(ids.contains(&"2025_01_BAL_KC".to_string()));
    assert!(ids.contains(&"2025_01_DAL_DET".to_string()));
}
