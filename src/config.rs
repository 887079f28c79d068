//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads an optional `config.toml` and deserializes it into strongly-typed
//! structs; every field has a default, so running without a config file
//! is the normal case. Secrets are referenced by env-var name in the
//! config and resolved once at startup into [`Credentials`].

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::PipelineError;

/// Default location of the optional config file.
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// Env var that overrides `pipeline.cache_dir`.
pub const CACHE_DIR_ENV: &str = "DATA_CACHE_DIR";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub schedule: ScheduleConfig,
    pub odds: OddsConfig,
    pub weather: WeatherConfig,
    pub model: ModelConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    pub cache_dir: PathBuf,
    /// Target season; derived from today's date when absent.
    pub season: Option<i32>,
    /// Number of prior seasons the Elo model trains on.
    pub train_seasons_back: i32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./cache"),
            season: None,
            train_seasons_back: 7,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ScheduleConfig {
    pub games_url: String,
    pub timeout_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            games_url: "https://github.com/nflverse/nfldata/raw/master/data/games.csv".to_string(),
            timeout_secs: 60,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OddsConfig {
    pub api_key_env: String,
    pub base_url: String,
    pub sport_key: String,
    pub regions: String,
    /// Books whose prices win over the cross-book median, in priority order.
    pub preferred_books: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for OddsConfig {
    fn default() -> Self {
        Self {
            api_key_env: "THE_ODDS_API_KEY".to_string(),
            base_url: "https://api.the-odds-api.com/v4".to_string(),
            sport_key: "americanfootball_nfl".to_string(),
            regions: "us,us2".to_string(),
            preferred_books: vec!["draftkings".to_string()],
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WeatherConfig {
    pub enabled: bool,
    pub user_agent_env: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            user_agent_env: "NWS_USER_AGENT".to_string(),
            base_url: "https://api.weather.gov".to_string(),
            timeout_secs: 15,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ModelConfig {
    /// Elo K-factor.
    pub k_factor: f64,
    /// Home-field advantage in Elo points.
    pub home_field_elo: f64,
    pub initial_rating: f64,
    /// Standard deviation of the NFL scoring margin, in points.
    pub margin_sd: f64,
    /// Fraction of full Kelly published for moneylines.
    pub kelly_fraction: f64,
    /// American price assumed for against-the-spread bets.
    pub ats_price: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            k_factor: 20.0,
            home_field_elo: 55.0,
            initial_rating: 1500.0,
            margin_sd: 13.5,
            kelly_fraction: 0.05,
            ats_price: -110.0,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| PipelineError::Config(e.to_string()))
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise fall back to defaults.
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply environment overrides (currently only `DATA_CACHE_DIR`).
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(CACHE_DIR_ENV).filter(|d| !d.trim().is_empty()) {
            self.pipeline.cache_dir = PathBuf::from(dir);
        }
    }

    /// Season to predict, from config or the given date.
    pub fn target_season(&self, today: NaiveDate) -> i32 {
        self.pipeline.season.unwrap_or_else(|| season_for_date(today))
    }

    /// Inclusive range of seasons the model trains on.
    pub fn training_seasons(&self, target: i32) -> (i32, i32) {
        (target - self.pipeline.train_seasons_back.max(0), target)
    }
}

/// NFL seasons start in September and end in February; January and
/// February games belong to the previous calendar year's season.
pub fn season_for_date(date: NaiveDate) -> i32 {
    if date.month() <= 2 {
        date.year() - 1
    } else {
        date.year()
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Process-wide secrets, resolved once and never mutated.
#[derive(Debug)]
pub struct Credentials {
    pub odds_api_key: SecretString,
    pub nws_user_agent: String,
}

impl Credentials {
    /// Resolve both credentials through `lookup`. Blank values count as
    /// missing.
    pub fn resolve(cfg: &AppConfig, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |name: &str| -> Result<String> {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| PipelineError::MissingCredential(name.to_string()).into())
        };

        let odds_api_key = get(&cfg.odds.api_key_env)?;
        let nws_user_agent = get(&cfg.weather.user_agent_env)?;

        Ok(Self {
            odds_api_key: SecretString::new(odds_api_key),
            nws_user_agent,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
