//! Rest and travel features.
//!
//! Rest is the number of days since a team's previous game in the league
//! table (played or scheduled). Travel is the away team's great-circle
//! distance from its own stadium to the host's; unknown for neutral-site
//! games, whose venue is not in the franchise table.

use chrono::NaiveDate;
use std::collections::HashMap;

use crate::teams;
use crate::types::Game;

/// Game dates per team, sorted, for rest-day lookups.
#[derive(Debug, Default)]
pub struct RestIndex {
    dates: HashMap<String, Vec<NaiveDate>>,
}

impl RestIndex {
    pub fn build(games: &[Game]) -> Self {
        let mut dates: HashMap<String, Vec<NaiveDate>> = HashMap::new();
        for g in games {
            dates.entry(g.home_team.clone()).or_default().push(g.gameday);
            dates.entry(g.away_team.clone()).or_default().push(g.gameday);
        }
        for list in dates.values_mut() {
            list.sort_unstable();
            list.dedup();
        }
        Self { dates }
    }

    /// Days between `team`'s last game strictly before `on` and `on`.
    pub fn rest_days(&self, team: &str, on: NaiveDate) -> Option<i64> {
        let list = self.dates.get(team)?;
        let idx = list.partition_point(|d| *d < on);
        let prev = list.get(idx.checked_sub(1)?)?;
        Some((on - *prev).num_days())
    }
}

/// Per-game situational features.
#[derive(Debug, Clone, PartialEq)]
pub struct GameFeatures {
    pub home_rest_days: Option<i64>,
    pub away_rest_days: Option<i64>,
    pub travel_miles: Option<f64>,
}

impl GameFeatures {
    pub fn for_game(game: &Game, index: &RestIndex) -> Self {
        Self {
            home_rest_days: index.rest_days(&game.home_team, game.gameday),
            away_rest_days: index.rest_days(&game.away_team, game.gameday),
            travel_miles: if game.neutral_site {
                None
            } else {
                teams::travel_miles(&game.home_team, &game.away_team)
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
