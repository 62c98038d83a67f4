//! Store error types

use tribunal_core::{CoreError, DebateId};

/// Errors surfaced by the accuracy store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The caller referenced a debate that was never registered
    #[error("Debate not found: {0}")]
    DebateNotFound(DebateId),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Invalid record: {0}")]
    Invalid(#[from] CoreError),
}
