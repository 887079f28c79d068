//! Market math and staking: consensus lines from bookmaker quotes and
//! Kelly sizing against them.

pub mod consensus;
pub mod kelly;

pub use consensus::Consensus;
pub use kelly::{KellyCalculator, KellyConfig, MoneylineStakes};
