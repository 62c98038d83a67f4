//! Belief state snapshot

use serde::{Deserialize, Serialize};

/// Group opinion after one round of voting.
///
/// `p_sell` is always computed as `1.0 - p_buy`, so the pair sums to one
/// exactly. `confidence = |p_buy - 0.5| * 2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeliefState {
    /// Round this snapshot was taken at (0 = prior)
    pub round: u32,
    /// Probability the group favours buying
    pub p_buy: f64,
    /// Probability the group favours selling
    pub p_sell: f64,
    /// Distance from indifference, scaled to [0, 1]
    pub confidence: f64,
}

impl BeliefState {
    /// Uniform prior: 0.5 / 0.5 with zero confidence
    pub fn uniform() -> Self {
        Self::from_p_buy(0, 0.5)
    }

    /// Build a snapshot from P(buy); out-of-range input is clamped.
    pub fn from_p_buy(round: u32, p_buy: f64) -> Self {
        let p_buy = if p_buy.is_nan() { 0.5 } else { p_buy.clamp(0.0, 1.0) };
        Self {
            round,
            p_buy,
            p_sell: 1.0 - p_buy,
            confidence: (p_buy - 0.5).abs() * 2.0,
        }
    }
}

impl Default for BeliefState {
    fn default() -> Self {
        Self::uniform()
    }
}
