//! Pick-sheet assembly.
//!
//! Joins upcoming games with their market lines, Elo predictions,
//! rest/travel features, and kickoff weather into [`PickRow`]s. Pure: no
//! I/O, so identical inputs always give identical rows.

use std::collections::HashMap;
use tracing::debug;

use crate::config::ModelConfig;
use crate::model::spread::{home_cover_prob, mean_margin, prob_to_home_line};
use crate::model::{EloModel, GameFeatures, RestIndex};
use crate::strategy::{KellyCalculator, KellyConfig};
use crate::types::{Game, GameWeather, MarketLine, PickRow};

/// Round to 4 decimal places for publishing.
pub fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

fn round_opt(x: Option<f64>) -> Option<f64> {
    x.map(round4)
}

/// Builds pick rows for one run.
pub struct PickBuilder<'a> {
    elo: &'a EloModel,
    rest: RestIndex,
    kelly: KellyCalculator,
    margin_sd: f64,
}

impl<'a> PickBuilder<'a> {
    /// `all_games` is the full schedule table used for rest-day lookups.
    pub fn new(elo: &'a EloModel, all_games: &[Game], cfg: &ModelConfig) -> Self {
        Self {
            elo,
            rest: RestIndex::build(all_games),
            kelly: KellyCalculator::new(KellyConfig::from(cfg)),
            margin_sd: cfg.margin_sd,
        }
    }

    /// One row for `game`. Missing market or weather data leaves the
    /// corresponding cells empty.
    pub fn row(&self, game: &Game, line: Option<&MarketLine>, weather: Option<&GameWeather>) -> PickRow {
        let sd = self.margin_sd;
        let moneyline = line.and_then(|l| l.moneyline.as_ref());
        let spread = line.and_then(|l| l.spread.as_ref());

        let home_elo = self.elo.rating(&game.home_team);
        let away_elo = self.elo.rating(&game.away_team);
        let p_model = self.elo.predict_home(&game.home_team, &game.away_team);

        let model_spread = prob_to_home_line(p_model, sd);
        let market_spread = moneyline.map(|m| prob_to_home_line(m.home_prob, sd));

        // Book line when quoted, otherwise the moneyline-implied one
        let cover_line = spread.map(|s| s.home_line).or(market_spread);
        let mu = mean_margin(p_model, sd);
        let home_cover = cover_line.map(|l| home_cover_prob(mu, l, sd));
        let spread_edge = cover_line.map(|l| model_spread - l);

        let stakes = self.kelly.moneyline(
            p_model,
            moneyline.map(|m| m.home_price),
            moneyline.map(|m| m.away_price),
        );
        let ats_kelly = home_cover.map(|p| self.kelly.ats(p));

        let features = GameFeatures::for_game(game, &self.rest);

        let forecast = match weather {
            Some(GameWeather::Forecast(f)) => Some(f),
            _ => None,
        };

        let row = PickRow {
            season: game.season,
            week: game.week,
            gameday: game.gameday,
            gametime: game.gametime.map(|t| t.format("%H:%M").to_string()),
            game_id: game.game_id.clone(),
            home_team: game.home_team.clone(),
            away_team: game.away_team.clone(),

            home_ml: moneyline.map(|m| m.home_price),
            away_ml: moneyline.map(|m| m.away_price),
            home_prob_raw: round_opt(moneyline.map(|m| m.home_prob_raw)),
            away_prob_raw: round_opt(moneyline.map(|m| m.away_prob_raw)),
            home_prob: round_opt(moneyline.map(|m| m.home_prob)),
            away_prob: round_opt(moneyline.map(|m| m.away_prob)),

            home_line: spread.map(|s| s.home_line),
            home_spread_odds: spread.map(|s| s.home_price),
            away_spread_odds: spread.map(|s| s.away_price),

            home_elo: round4(home_elo),
            away_elo: round4(away_elo),
            home_prob_model: round4(p_model),
            away_prob_model: round4(1.0 - p_model),

            model_spread: round4(model_spread),
            market_spread: round_opt(market_spread),
            spread_edge: round_opt(spread_edge),
            home_cover_prob: round_opt(home_cover),

            home_kelly_5pct: round4(stakes.home),
            away_kelly_5pct: round4(stakes.away),
            ats_kelly: round_opt(ats_kelly),

            home_rest_days: features.home_rest_days,
            away_rest_days: features.away_rest_days,
            travel_miles: round_opt(features.travel_miles),

            roof: game.roof,
            temp_f: round_opt(forecast.and_then(|f| f.temp_f)),
            wind_mph: round_opt(forecast.and_then(|f| f.wind_mph)),
            precip_pct: round_opt(forecast.and_then(|f| f.precip_pct)),
            forecast: forecast.map(|f| f.short_forecast.clone()),
        };

        debug!(game_id = %row.game_id, pick = %row, "Pick row");
        row
    }

    /// Rows for every upcoming game, in input order. Lines are keyed by
    /// `(home, away)` codes and weather by `game_id`.
    pub fn rows(
        &self,
        upcoming: &[Game],
        lines: &HashMap<(String, String), MarketLine>,
        weather: &HashMap<String, GameWeather>,
    ) -> Vec<PickRow> {
        upcoming
            .iter()
            .map(|g| self.row(g, lines.get(&g.matchup()), weather.get(&g.game_id)))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
