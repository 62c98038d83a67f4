//! # Tribunal Runtime
//!
//! Tokio-based debate orchestration.
//!
//! - [`ModeSelector`] picks the roster and protocol shape for a trade
//! - [`DebateOrchestrator`] runs the debate against an injected
//!   [`AccuracyStore`](tribunal_persist::AccuracyStore) and
//!   [`ChallengeScorer`](tribunal_adversarial::ChallengeScorer)

pub mod error;
pub mod mode;
pub mod orchestrator;

pub use error::OrchestratorError;
pub use mode::{ModeSelector, ProtocolPlan};
pub use orchestrator::{DebateOrchestrator, DebateSummary, OrchestratorConfig, RoundScores};
