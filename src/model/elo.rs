//! Elo team ratings.
//!
//! Trained on completed games in chronological order; each game moves
//! `K · (outcome − expected)` points from one side to the other, so the
//! rating pool is conserved. Home-field advantage is added to the home
//! rating when computing the expectation only.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::ModelConfig;
use crate::types::Game;

/// Elo parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EloParams {
    pub k_factor: f64,
    pub home_field: f64,
    pub initial_rating: f64,
}

impl Default for EloParams {
    fn default() -> Self {
        Self {
            k_factor: 20.0,
            home_field: 55.0,
            initial_rating: 1500.0,
        }
    }
}

impl From<&ModelConfig> for EloParams {
    fn from(cfg: &ModelConfig) -> Self {
        Self {
            k_factor: cfg.k_factor,
            home_field: cfg.home_field_elo,
            initial_rating: cfg.initial_rating,
        }
    }
}

/// Expected home win probability for the given ratings.
pub fn expected_home(home: f64, away: f64, home_field: f64) -> f64 {
    let diff = (home + home_field) - away;
    1.0 / (1.0 + 10f64.powf(-diff / 400.0))
}

/// A trained Elo model. Serialized as `elo_ratings.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EloModel {
    pub params: EloParams,
    pub games_trained: usize,
    /// Ratings by team code; ordered so the artifact is stable.
    pub ratings: BTreeMap<String, f64>,
}

impl EloModel {
    pub fn new(params: EloParams) -> Self {
        Self {
            params,
            games_trained: 0,
            ratings: BTreeMap::new(),
        }
    }

    /// Train from scratch on `games`. Incomplete games are ignored; the
    /// rest are replayed ordered by `(gameday, game_id)`.
    pub fn train(params: EloParams, games: &[Game]) -> Self {
        let mut completed: Vec<&Game> = games.iter().filter(|g| g.is_completed()).collect();
        completed.sort_by(|a, b| (a.gameday, &a.game_id).cmp(&(b.gameday, &b.game_id)));

        let mut model = Self::new(params);
        for game in completed {
            model.update(game);
        }

        info!(
            games = model.games_trained,
            teams = model.ratings.len(),
            "Elo model trained"
        );
        model
    }

    /// Apply one completed game. Returns the home rating change, or
    /// `None` when the game has no result.
    pub fn update(&mut self, game: &Game) -> Option<f64> {
        let outcome = game.home_outcome()?;
        let rh = self.rating(&game.home_team);
        let ra = self.rating(&game.away_team);
        let p = expected_home(rh, ra, self.params.home_field);
        let delta = self.params.k_factor * (outcome - p);

        self.ratings.insert(game.home_team.clone(), rh + delta);
        self.ratings.insert(game.away_team.clone(), ra - delta);
        self.games_trained += 1;

        debug!(game = %game, delta, "Elo update");
        Some(delta)
    }

    /// Current rating, `initial_rating` for unseen teams.
    pub fn rating(&self, team: &str) -> f64 {
        self.ratings
            .get(team)
            .copied()
            .unwrap_or(self.params.initial_rating)
    }

    /// Home win probability for a matchup under current ratings.
    pub fn predict_home(&self, home: &str, away: &str) -> f64 {
        expected_home(self.rating(home), self.rating(away), self.params.home_field)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
