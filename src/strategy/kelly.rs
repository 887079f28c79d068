//! Kelly criterion stake sizing.
//!
//! Moneyline stakes use the quoted American price for each side, scaled by
//! a fractional-Kelly multiplier. Against-the-spread stakes are full Kelly
//! at a fixed price (-110 by default) on the home cover probability.

use tracing::debug;

use super::consensus::american_to_decimal;
use crate::config::ModelConfig;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Kelly sizing configuration.
#[derive(Debug, Clone)]
pub struct KellyConfig {
    /// Fractional Kelly multiplier applied to moneyline stakes.
    pub fraction: f64,
    /// American price assumed for spread bets.
    pub ats_price: f64,
}

impl Default for KellyConfig {
    fn default() -> Self {
        Self {
            fraction: 0.05,   // 5% Kelly
            ats_price: -110.0,
        }
    }
}

impl From<&ModelConfig> for KellyConfig {
    fn from(cfg: &ModelConfig) -> Self {
        Self {
            fraction: cfg.kelly_fraction,
            ats_price: cfg.ats_price,
        }
    }
}

/// Raw Kelly fraction for win probability `p` at net odds `b`, floored at
/// zero. `f* = (b·p − q) / b`, `q = 1 − p`.
pub fn kelly(p: f64, b: f64) -> f64 {
    if b <= 0.0 || !b.is_finite() {
        return 0.0;
    }
    ((b * p - (1.0 - p)) / b).max(0.0)
}

/// Net odds (profit per unit staked) for an American price.
pub fn net_odds(american: f64) -> Option<f64> {
    american_to_decimal(american).map(|d| d - 1.0)
}

// ---------------------------------------------------------------------------
// Kelly calculator
// ---------------------------------------------------------------------------

/// Moneyline stakes for both sides of one game.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoneylineStakes {
    pub home: f64,
    pub away: f64,
}

pub struct KellyCalculator {
    config: KellyConfig,
}

impl KellyCalculator {
    pub fn new(config: KellyConfig) -> Self {
        Self { config }
    }

    /// Access the Kelly configuration.
    pub fn config(&self) -> &KellyConfig {
        &self.config
    }

    /// Fractional Kelly stakes for home and away at the quoted prices.
    /// Both are zero unless both prices are present and valid.
    pub fn moneyline(
        &self,
        p_home: f64,
        home_price: Option<f64>,
        away_price: Option<f64>,
    ) -> MoneylineStakes {
        let (Some(b_home), Some(b_away)) = (home_price.and_then(net_odds), away_price.and_then(net_odds)) else {
            return MoneylineStakes::default();
        };

        let stakes = MoneylineStakes {
            home: self.config.fraction * kelly(p_home, b_home),
            away: self.config.fraction * kelly(1.0 - p_home, b_away),
        };

        debug!(
            p_home,
            home = format!("{:.4}", stakes.home),
            away = format!("{:.4}", stakes.away),
            "Moneyline stakes"
        );
        stakes
    }

    /// Full Kelly for backing home against the spread at the configured price.
    pub fn ats(&self, p_cover: f64) -> f64 {
        net_odds(self.config.ats_price)
            .map(|b| kelly(p_cover, b))
            .unwrap_or(0.0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
