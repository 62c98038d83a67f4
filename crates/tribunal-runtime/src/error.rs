//! Orchestrator error types

use tribunal_core::{CoreError, DebateId};
use tribunal_persist::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    #[error("No active debate")]
    NoActiveDebate,

    #[error("Debate {0} is still active")]
    DebateAlreadyActive(DebateId),

    #[error("Round {round}: more than one batch for {target} in a single scoring call")]
    AmbiguousResponse { round: u32, target: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Core(#[from] CoreError),
}
