//! # Tribunal Core
//!
//! Core types shared by every Tribunal crate:
//! - [`Recommendation`]: the closed vote/verdict vocabulary
//! - [`ChallengeOutcome`]: the four-way challenge classification
//! - [`BeliefState`]: per-round P(buy)/P(sell) snapshot
//! - Debate, challenge and vote records as persisted by the accuracy store
//! - [`EngineConfig`]: thresholds for convergence, weighting, muting and mode selection
//!
//! ```rust
//! use tribunal_core::{BeliefState, Recommendation};
//!
//! let belief = BeliefState::from_p_buy(3, 0.9);
//! assert_eq!(Recommendation::from_p_buy(belief.p_buy), Recommendation::StrongBuy);
//! assert!((belief.confidence - 0.8).abs() < 1e-9);
//! ```

pub mod belief;
pub mod config;
pub mod error;
pub mod records;
pub mod timeframe;
pub mod vocab;

pub use belief::BeliefState;
pub use config::{ConvergenceConfig, EngineConfig, ModeConfig, MutePolicy, WeightingConfig};
pub use error::CoreError;
pub use records::{
    ChallengeRecord, DebateId, DebateRecord, DebateResolution, NewChallenge, NewDebate,
    PersonaAccuracyRecord, PersonaVoteRecord,
};
pub use timeframe::Timeframe;
pub use vocab::{
    ChallengeOutcome, Conviction, DebateMode, Recommendation, UNRECOGNIZED_VOTE_PREFERENCE,
};
