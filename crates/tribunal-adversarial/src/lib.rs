//! # Tribunal Adversarial
//!
//! The pure parts of a debate: challenge scoring and belief tracking.
//!
//! ## Key Types
//!
//! - [`ChallengeScorer`] / [`LexiconScorer`]: classify a challenge/response exchange
//! - [`BeliefTracker`]: weighted Bayesian vote aggregation with convergence checks
//! - [`ChallengeBatch`], [`DebateTranscript`]: what was said, to whom, in which round
//!
//! ## Quick Start
//!
//! ```rust
//! use tribunal_adversarial::{ChallengeScorer, LexiconScorer};
//! use tribunal_core::ChallengeOutcome;
//!
//! let scorer = LexiconScorer::default();
//! let score = scorer.score(
//!     "Your margin assumption ignores rising input costs",
//!     "You're right, I concede that point",
//! );
//! assert_eq!(score.outcome, ChallengeOutcome::Conceded);
//! assert!(score.success);
//! ```
//!
//! ## Belief Tracking
//!
//! ```rust
//! use std::collections::{BTreeMap, HashMap};
//! use tribunal_adversarial::BeliefTracker;
//!
//! let mut tracker = BeliefTracker::default();
//! let votes: BTreeMap<String, String> = [("p1", "BUY"), ("p2", "BUY"), ("p3", "SELL")]
//!     .into_iter()
//!     .map(|(p, v)| (p.to_string(), v.to_string()))
//!     .collect();
//! let weights: HashMap<String, f64> = votes.keys().map(|p| (p.clone(), 1.0)).collect();
//!
//! let belief = tracker.update(&votes, &weights);
//! assert!((belief.p_buy - 0.667).abs() < 0.001);
//! assert!(!tracker.check_convergence().converged);
//! ```

pub mod belief;
pub mod debate;
pub mod scorer;

pub use belief::{BeliefTracker, ConvergenceCheck, DEFAULT_VOTE_WEIGHT};
pub use debate::{
    ChallengeBatch, ChallengerTally, DebateRound, DebateTranscript, IssuedChallenge,
    ResponsePrompt, ScoredChallenge,
};
pub use scorer::{ChallengeScore, ChallengeScorer, LexiconConfig, LexiconScorer};
