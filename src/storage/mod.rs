//! Publishing layer.
//!
//! Writes run artifacts into the cache directory as flat files: CSV via
//! `csv` + `serde`, JSON pretty-printed via `serde_json`. Every file is
//! written to `<name>.tmp` first and renamed into place, so a crashed run
//! never leaves a half-written artifact behind.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

use crate::data::odds::OddsEvent;
use crate::model::EloModel;
use crate::types::{Game, PickRow, PipelineError, Roof};

pub const SCHEDULE_FILE: &str = "schedule.csv";
pub const ODDS_FILE: &str = "odds_raw.json";
pub const PICK_SHEET_FILE: &str = "pick_sheet.csv";
pub const ELO_FILE: &str = "elo_ratings.json";
pub const RUN_META_FILE: &str = "run_meta.json";

// ---------------------------------------------------------------------------
// Artifact shapes
// ---------------------------------------------------------------------------

/// One row of `schedule.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub season: i32,
    pub week: u32,
    pub gameday: chrono::NaiveDate,
    pub gametime: Option<String>,
    pub game_id: String,
    pub home_team: String,
    pub away_team: String,
    pub roof: Roof,
}

impl From<&Game> for ScheduleRow {
    fn from(g: &Game) -> Self {
        Self {
            season: g.season,
            week: g.week,
            gameday: g.gameday,
            gametime: g.gametime.map(|t| t.format("%H:%M").to_string()),
            game_id: g.game_id.clone(),
            home_team: g.home_team.clone(),
            away_team: g.away_team.clone(),
            roof: g.roof,
        }
    }
}

/// Contents of `run_meta.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMeta {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub season: i32,
    pub training_seasons: (i32, i32),
    pub games_loaded: usize,
    pub history_games: usize,
    pub upcoming_games: usize,
    pub odds_events: usize,
    pub picks: usize,
}

/// Everything one run publishes.
pub struct Artifacts<'a> {
    pub upcoming: &'a [Game],
    pub odds: &'a [OddsEvent],
    pub picks: &'a [PickRow],
    pub elo: &'a EloModel,
    pub meta: &'a RunMeta,
}

// ---------------------------------------------------------------------------
// Publisher
// ---------------------------------------------------------------------------

pub struct Publisher {
    dir: PathBuf,
}

impl Publisher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write all artifacts, creating the cache directory if needed.
    /// Returns the paths written, in write order.
    pub fn publish(&self, artifacts: &Artifacts<'_>) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| PipelineError::Publish(format!("{}: {e}", self.dir.display())))
            .context("Failed to create cache directory")?;

        let schedule: Vec<ScheduleRow> = artifacts.upcoming.iter().map(ScheduleRow::from).collect();

        let written = vec![
            self.write_csv(SCHEDULE_FILE, &schedule)?,
            self.write_json(ODDS_FILE, &artifacts.odds)?,
            self.write_csv(PICK_SHEET_FILE, artifacts.picks)?,
            self.write_json(ELO_FILE, artifacts.elo)?,
            self.write_json(RUN_META_FILE, artifacts.meta)?,
        ];

        info!(
            dir = %self.dir.display(),
            files = written.len(),
            picks = artifacts.picks.len(),
            "Artifacts published"
        );
        Ok(written)
    }

    /// Serialize `rows` as CSV with a header row. An empty slice still
    /// yields a header so downstream readers see the columns.
    pub fn write_csv<T: Serialize>(&self, name: &str, rows: &[T]) -> Result<PathBuf> {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        for row in rows {
            wtr.serialize(row)
                .with_context(|| format!("Failed to serialise row for {name}"))?;
        }
        let mut bytes = wtr
            .into_inner()
            .map_err(|e| PipelineError::Publish(e.to_string()))
            .with_context(|| format!("Failed to flush {name}"))?;
        if rows.is_empty() {
            bytes = header_for(name)?;
        }
        self.write_atomic(name, &bytes)
    }

    /// Serialize `value` as pretty-printed JSON.
    pub fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<PathBuf> {
        let mut json = serde_json::to_vec_pretty(value)
            .with_context(|| format!("Failed to serialise {name}"))?;
        json.push(b'\n');
        self.write_atomic(name, &json)
    }

    /// Write `bytes` to `<dir>/<name>.tmp`, then rename over `<dir>/<name>`.
    fn write_atomic(&self, name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.dir.join(name);
        let tmp = self.dir.join(format!("{name}.tmp"));

        fs::write(&tmp, bytes)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to move {} into place", path.display()))?;

        debug!(path = %path.display(), bytes = bytes.len(), "Artifact written");
        Ok(path)
    }
}

/// Header line for an empty CSV artifact.
fn header_for(name: &str) -> Result<Vec<u8>> {
    let columns: &[&str] = match name {
        SCHEDULE_FILE => &SCHEDULE_COLUMNS,
        PICK_SHEET_FILE => &PICK_SHEET_COLUMNS,
        _ => return Ok(Vec::new()),
    };
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(columns)
        .with_context(|| format!("Failed to write header for {name}"))?;
    wtr.into_inner()
        .map_err(|e| PipelineError::Publish(e.to_string()).into())
}

pub const SCHEDULE_COLUMNS: [&str; 8] = [
    "season", "week", "gameday", "gametime", "game_id", "home_team", "away_team", "roof",
];

pub const PICK_SHEET_COLUMNS: [&str; 35] = [
    "season", "week", "gameday", "gametime", "game_id", "home_team", "away_team",
    "home_ml", "away_ml", "home_prob_raw", "away_prob_raw", "home_prob", "away_prob",
    "home_line", "home_spread_odds", "away_spread_odds",
    "home_elo", "away_elo", "home_prob_model", "away_prob_model",
    "model_spread", "market_spread", "spread_edge", "home_cover_prob",
    "home_kelly_5pct", "away_kelly_5pct", "ats_kelly",
    "home_rest_days", "away_rest_days", "travel_miles",
    "roof", "temp_f", "wind_mph", "precip_pct", "forecast",
];

/// Read a published pick sheet back.
pub fn read_pick_sheet(path: &Path) -> Result<Vec<PickRow>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    rdr.deserialize()
        .collect::<Result<Vec<PickRow>, _>>()
        .with_context(|| format!("Failed to parse {}", path.display()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
