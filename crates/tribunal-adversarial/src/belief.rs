//! Bayesian belief tracking across debate rounds
//!
//! Each call to [`BeliefTracker::update`] folds one round of weighted votes
//! into a fresh [`BeliefState`] and appends it to the history. Convergence
//! is declared either when confidence crosses the threshold or when it stops
//! moving, but never before `min_rounds` rounds have been recorded.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

use tribunal_core::{BeliefState, ConvergenceConfig, Recommendation, UNRECOGNIZED_VOTE_PREFERENCE};

/// Weight used for a voter missing from the weight map
pub const DEFAULT_VOTE_WEIGHT: f64 = 0.5;

/// Outcome of a convergence check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceCheck {
    pub converged: bool,
    pub confidence: f64,
    pub verdict: Recommendation,
    /// Always populated so callers can report why a debate ended
    pub reason: String,
    pub round: u32,
}

/// Per-debate belief state machine. Never share one across debates.
#[derive(Debug, Clone)]
pub struct BeliefTracker {
    config: ConvergenceConfig,
    history: Vec<BeliefState>,
}

impl Default for BeliefTracker {
    fn default() -> Self {
        Self::new(ConvergenceConfig::default())
    }
}

impl BeliefTracker {
    pub fn new(config: ConvergenceConfig) -> Self {
        Self {
            config,
            history: Vec::new(),
        }
    }

    pub fn config(&self) -> &ConvergenceConfig {
        &self.config
    }

    /// Drop all history and return to the uniform prior
    pub fn reset(&mut self) {
        self.history.clear();
    }

    pub fn history(&self) -> &[BeliefState] {
        &self.history
    }

    /// Latest belief, or the uniform prior before any update
    pub fn current(&self) -> BeliefState {
        self.history.last().copied().unwrap_or_default()
    }

    /// Number of recorded rounds
    pub fn round(&self) -> u32 {
        self.history.len() as u32
    }

    /// Map a raw vote to a preference in [-1, 1].
    ///
    /// Votes outside the vocabulary fall back to
    /// [`UNRECOGNIZED_VOTE_PREFERENCE`] (a weak buy).
    pub fn preference(vote: &str) -> f64 {
        match vote.parse::<Recommendation>() {
            Ok(rec) => rec.preference(),
            Err(_) => {
                warn!(vote, "Unrecognized vote, applying weak-buy default");
                metrics::counter!("tribunal_unrecognized_votes_total").increment(1);
                UNRECOGNIZED_VOTE_PREFERENCE
            }
        }
    }

    /// Fold one round of votes (persona -> raw vote) into a new belief.
    ///
    /// `p_buy = Σ w·(pref+1)/2 / Σ w`. Missing weights default to
    /// [`DEFAULT_VOTE_WEIGHT`]; negative weights count as zero. With no
    /// usable weight the round records the uniform belief.
    pub fn update(
        &mut self,
        votes: &BTreeMap<String, String>,
        weights: &HashMap<String, f64>,
    ) -> BeliefState {
        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;

        for (persona, vote) in votes {
            let weight = weights
                .get(persona)
                .copied()
                .unwrap_or(DEFAULT_VOTE_WEIGHT)
                .max(0.0);
            let preference = Self::preference(vote);
            weighted_sum += weight * ((preference + 1.0) / 2.0);
            total_weight += weight;
        }

        let round = self.round() + 1;
        let state = if total_weight > 0.0 {
            BeliefState::from_p_buy(round, weighted_sum / total_weight)
        } else {
            warn!(round, voters = votes.len(), "No vote weight this round, keeping uniform belief");
            BeliefState::from_p_buy(round, 0.5)
        };

        debug!(
            round,
            p_buy = state.p_buy,
            confidence = state.confidence,
            "Belief updated"
        );
        metrics::gauge!("tribunal_belief_confidence").set(state.confidence);

        self.history.push(state);
        state
    }

    /// Convergence check using the configured `min_rounds`
    pub fn check_convergence(&self) -> ConvergenceCheck {
        self.check_convergence_with(self.config.min_rounds)
    }

    pub fn check_convergence_with(&self, min_rounds: u32) -> ConvergenceCheck {
        let current = self.current();
        let round = self.round();
        let verdict = Recommendation::from_p_buy(current.p_buy);
        let check = |converged: bool, reason: String| ConvergenceCheck {
            converged,
            confidence: current.confidence,
            verdict,
            reason,
            round,
        };

        if round < min_rounds {
            return check(
                false,
                format!(
                    "Round {} of minimum {}; confidence {:.2} not yet actionable",
                    round, min_rounds, current.confidence
                ),
            );
        }

        if current.confidence >= self.config.threshold {
            return check(
                true,
                format!(
                    "Confidence {:.2} reached threshold {:.2}",
                    current.confidence, self.config.threshold
                ),
            );
        }

        if let [.., previous, last] = self.history.as_slice() {
            let delta = (last.confidence - previous.confidence).abs();
            if self.history.len() >= 3 && delta < self.config.stagnation_delta {
                return check(
                    true,
                    format!(
                        "Confidence stagnated at {:.2} (change {:.3} < {:.2})",
                        current.confidence, delta, self.config.stagnation_delta
                    ),
                );
            }
            return check(
                false,
                format!(
                    "Confidence {:.2} below threshold {:.2} and still moving (change {:.3})",
                    current.confidence, self.config.threshold, delta
                ),
            );
        }

        check(
            false,
            format!(
                "Confidence {:.2} below threshold {:.2}",
                current.confidence, self.config.threshold
            ),
        )
    }
}
