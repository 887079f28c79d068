//! Market consensus from bookmaker quotes.
//!
//! Converts American odds to implied probabilities, removes the vig, and
//! reduces each event's bookmaker quotes to one moneyline and one spread.
//! A preferred book (DraftKings by default) wins outright when it quotes
//! the market; otherwise the cross-book median is used.

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::data::odds::{BookMarket, OddsEvent};
use crate::teams::code_for_name;
use crate::types::{MarketLine, Moneyline, SpreadLine};

// ---------------------------------------------------------------------------
// Odds math
// ---------------------------------------------------------------------------

/// Implied probability of American odds (vig included).
pub fn american_to_prob(odds: f64) -> f64 {
    if odds > 0.0 {
        100.0 / (odds + 100.0)
    } else {
        -odds / (-odds + 100.0)
    }
}

/// Decimal (European) odds for American odds. `None` for 0, which is
/// not a valid American price.
pub fn american_to_decimal(odds: f64) -> Option<f64> {
    if odds > 0.0 {
        Some(1.0 + odds / 100.0)
    } else if odds < 0.0 {
        Some(1.0 + 100.0 / odds.abs())
    } else {
        None
    }
}

/// Proportionally renormalize two implied probabilities so they sum to 1.
pub fn remove_vig(p_home: f64, p_away: f64) -> Option<(f64, f64)> {
    let s = p_home + p_away;
    if s <= 0.0 || !s.is_finite() {
        return None;
    }
    Some((p_home / s, p_away / s))
}

/// Median of the finite values; `None` for an empty input.
pub fn median(values: &[f64]) -> Option<f64> {
    let mut v: Vec<f64> = values.iter().copied().filter(|x| x.is_finite()).collect();
    if v.is_empty() {
        return None;
    }
    v.sort_by(|a, b| a.total_cmp(b));
    let mid = v.len() / 2;
    Some(if v.len() % 2 == 0 {
        (v[mid - 1] + v[mid]) / 2.0
    } else {
        v[mid]
    })
}

// ---------------------------------------------------------------------------
// Consensus
// ---------------------------------------------------------------------------

/// Reduces events to per-matchup market lines.
pub struct Consensus {
    preferred_books: Vec<String>,
}

impl Consensus {
    pub fn new(preferred_books: Vec<String>) -> Self {
        Self { preferred_books }
    }

    fn is_preferred(&self, book: &str) -> bool {
        self.preferred_books.iter().any(|b| b == book)
    }

    /// Bookmaker keys ordered preferred-first (in configured order), the
    /// rest in feed order.
    fn ordered_books<'a>(&self, event: &'a OddsEvent) -> Vec<&'a str> {
        let rank = |key: &str| {
            self.preferred_books
                .iter()
                .position(|b| b == key)
                .unwrap_or(self.preferred_books.len())
        };
        let mut keys: Vec<&str> = event.bookmakers.iter().map(|b| b.key.as_str()).collect();
        keys.sort_by_key(|k| rank(*k));
        keys
    }

    /// Price quoted for `team` (a code) in `market`.
    fn price_for(market: &BookMarket, team: &str) -> Option<(f64, Option<f64>)> {
        market
            .outcomes
            .iter()
            .find(|o| code_for_name(&o.name) == Some(team))
            .and_then(|o| o.price.map(|p| (p, o.point)))
    }

    /// Consensus moneyline for an event whose teams resolved to `home`/`away`.
    pub fn moneyline(&self, event: &OddsEvent, home: &str, away: &str) -> Option<Moneyline> {
        let mut homes = Vec::new();
        let mut aways = Vec::new();
        let mut preferred: Option<(f64, f64)> = None;

        for book in self.ordered_books(event) {
            let Some(market) = event.market(book, "h2h") else { continue };
            let (Some((h, _)), Some((a, _))) =
                (Self::price_for(market, home), Self::price_for(market, away))
            else {
                continue;
            };
            if preferred.is_none() && self.is_preferred(book) {
                preferred = Some((h, a));
            }
            homes.push(h);
            aways.push(a);
        }

        let (home_price, away_price) = match preferred {
            Some(pair) => pair,
            None => (median(&homes)?, median(&aways)?),
        };

        let home_prob_raw = american_to_prob(home_price);
        let away_prob_raw = american_to_prob(away_price);
        let (home_prob, away_prob) = remove_vig(home_prob_raw, away_prob_raw)?;

        Some(Moneyline {
            home_price,
            away_price,
            home_prob_raw,
            away_prob_raw,
            home_prob,
            away_prob,
        })
    }

    /// Consensus spread. The first book in priority order wins when it is
    /// preferred; otherwise medians over the books quoting the line
    /// closest to zero.
    pub fn spread(&self, event: &OddsEvent, home: &str, away: &str) -> Option<SpreadLine> {
        let mut per_book: Vec<(&str, SpreadLine)> = Vec::new();

        for book in self.ordered_books(event) {
            let Some(market) = event.market(book, "spreads") else { continue };
            let (Some((home_price, Some(home_line))), Some((away_price, _))) =
                (Self::price_for(market, home), Self::price_for(market, away))
            else {
                continue;
            };
            per_book.push((book, SpreadLine { home_line, home_price, away_price }));
        }

        let (first_book, first) = per_book.first()?;
        if self.is_preferred(first_book) {
            return Some(first.clone());
        }

        let min_abs = per_book
            .iter()
            .map(|(_, s)| s.home_line.abs())
            .fold(f64::INFINITY, f64::min);
        let cluster: Vec<&SpreadLine> = per_book
            .iter()
            .map(|(_, s)| s)
            .filter(|s| s.home_line.abs() == min_abs)
            .collect();

        let col = |f: fn(&SpreadLine) -> f64| median(&cluster.iter().map(|s| f(s)).collect::<Vec<_>>());
        Some(SpreadLine {
            home_line: col(|s| s.home_line)?,
            home_price: col(|s| s.home_price)?,
            away_price: col(|s| s.away_price)?,
        })
    }

    /// Market lines keyed by `(home_code, away_code)`. Events whose teams
    /// don't resolve to franchise codes are skipped.
    pub fn market_lines(&self, events: &[OddsEvent]) -> HashMap<(String, String), MarketLine> {
        let mut lines = HashMap::new();
        for event in events {
            let (Some(home), Some(away)) = (code_for_name(&event.home_team), code_for_name(&event.away_team)) else {
                warn!(
                    event_id = %event.id,
                    home = %event.home_team,
                    away = %event.away_team,
                    "Unrecognised teams in odds event"
                );
                continue;
            };

            let line = MarketLine {
                moneyline: self.moneyline(event, home, away),
                spread: self.spread(event, home, away),
            };
            debug!(event_id = %event.id, home, away, ?line, "Market line");
            lines.insert((home.to_string(), away.to_string()), line);
        }
        lines
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
