//! Validation errors for core types

/// Errors raised while constructing or parsing core values
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown recommendation: {0}")]
    UnknownRecommendation(String),

    #[error("Unknown challenge outcome: {0}")]
    UnknownOutcome(String),

    #[error("Unknown conviction: {0}")]
    UnknownConviction(String),

    #[error("Unknown debate mode: {0}")]
    UnknownMode(String),

    #[error("Invalid timeframe: {0}")]
    InvalidTimeframe(String),

    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },

    #[error("Invalid persona name: {0:?}")]
    InvalidPersona(String),

    #[error("Invalid roster: {0}")]
    InvalidRoster(String),

    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl CoreError {
    pub(crate) fn out_of_range(field: &'static str, value: f64) -> Self {
        Self::OutOfRange { field, value }
    }
}
