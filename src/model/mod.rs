//! Predictive model: Elo ratings, margin/spread conversions, and
//! situational features.

pub mod elo;
pub mod spread;
pub mod features;

pub use elo::{EloModel, EloParams};
pub use features::{GameFeatures, RestIndex};
