//! Persisted records: persona track records, debates, challenges, votes
//!
//! Every record that enters the store goes through a validating constructor
//! (`NewDebate::new`, `NewChallenge::new`, `DebateResolution::new`), so the
//! store never sees a half-formed row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::CoreError;
use crate::vocab::{ChallengeOutcome, Conviction, DebateMode, Recommendation};

/// Row id of a registered debate
pub type DebateId = i64;

/// Share of the accuracy score driven by challenge success
pub const CHALLENGE_SUCCESS_SHARE: f64 = 0.7;
/// Share of the accuracy score driven by vote correctness
pub const VOTE_ACCURACY_SHARE: f64 = 0.3;
/// Component value used when a persona has no evidence for it yet
pub const NEUTRAL_ACCURACY: f64 = 0.5;

pub(crate) fn validate_persona(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() || name.trim() != name {
        return Err(CoreError::InvalidPersona(name.to_string()));
    }
    Ok(())
}

/// Historical track record of one persona
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaAccuracyRecord {
    pub persona: String,
    pub debates_participated: u32,
    pub successful_challenges: u32,
    pub failed_challenges: u32,
    pub concessions_made: u32,
    pub votes_correct: u32,
    pub votes_total: u32,
    /// Derived score in [0, 1]; refreshed by the store's recompute pass
    pub accuracy_score: f64,
    pub last_updated: DateTime<Utc>,
}

impl PersonaAccuracyRecord {
    /// Fresh record with no history
    pub fn new(persona: &str) -> Self {
        Self {
            persona: persona.to_string(),
            debates_participated: 0,
            successful_challenges: 0,
            failed_challenges: 0,
            concessions_made: 0,
            votes_correct: 0,
            votes_total: 0,
            accuracy_score: NEUTRAL_ACCURACY,
            last_updated: Utc::now(),
        }
    }

    pub fn total_challenges(&self) -> u32 {
        self.successful_challenges + self.failed_challenges
    }

    /// Fraction of issued challenges that succeeded, if any were issued
    pub fn challenge_success_rate(&self) -> Option<f64> {
        let total = self.total_challenges();
        (total > 0).then(|| f64::from(self.successful_challenges) / f64::from(total))
    }

    /// Fraction of scored votes that were correct, if any were scored
    pub fn vote_accuracy(&self) -> Option<f64> {
        (self.votes_total > 0)
            .then(|| f64::from(self.votes_correct) / f64::from(self.votes_total))
    }

    /// `0.7 * challenge_success + 0.3 * vote_accuracy`, each component
    /// defaulting to 0.5 when there is no data for it.
    pub fn computed_accuracy(&self) -> f64 {
        let challenge = self.challenge_success_rate().unwrap_or(NEUTRAL_ACCURACY);
        let votes = self.vote_accuracy().unwrap_or(NEUTRAL_ACCURACY);
        (CHALLENGE_SUCCESS_SHARE * challenge + VOTE_ACCURACY_SHARE * votes).clamp(0.0, 1.0)
    }
}

/// Registration request for a new debate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDebate {
    pub ticker: String,
    pub timeframe: String,
    pub model: String,
    pub mode: DebateMode,
    /// Ordered roster; order is preserved in storage
    pub personas: Vec<String>,
}

impl NewDebate {
    pub fn new(
        ticker: &str,
        timeframe: &str,
        model: &str,
        mode: DebateMode,
        personas: Vec<String>,
    ) -> Result<Self, CoreError> {
        let ticker = ticker.trim().to_ascii_uppercase();
        if ticker.is_empty() {
            return Err(CoreError::InvalidField {
                field: "ticker",
                reason: "must not be empty".to_string(),
            });
        }
        if personas.is_empty() {
            return Err(CoreError::InvalidRoster("roster is empty".to_string()));
        }
        let mut seen = HashSet::new();
        for persona in &personas {
            validate_persona(persona)?;
            if !seen.insert(persona.as_str()) {
                return Err(CoreError::InvalidRoster(format!(
                    "duplicate persona {}",
                    persona
                )));
            }
        }

        Ok(Self {
            ticker,
            timeframe: timeframe.trim().to_string(),
            model: model.trim().to_string(),
            mode,
            personas,
        })
    }
}

/// Final result written when a debate ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateResolution {
    pub verdict: Recommendation,
    pub conviction: Conviction,
    pub rounds_completed: u32,
    pub final_confidence: f64,
    pub total_challenges: u32,
    pub successful_challenges: u32,
    pub concessions: u32,
}

impl DebateResolution {
    pub fn new(
        verdict: Recommendation,
        rounds_completed: u32,
        final_confidence: f64,
        total_challenges: u32,
        successful_challenges: u32,
        concessions: u32,
    ) -> Result<Self, CoreError> {
        if !(0.0..=1.0).contains(&final_confidence) {
            return Err(CoreError::out_of_range("final_confidence", final_confidence));
        }
        if successful_challenges > total_challenges || concessions > total_challenges {
            return Err(CoreError::InvalidField {
                field: "challenge tallies",
                reason: format!(
                    "{} successful / {} conceded exceeds {} total",
                    successful_challenges, concessions, total_challenges
                ),
            });
        }

        Ok(Self {
            verdict,
            conviction: Conviction::from_confidence(final_confidence),
            rounds_completed,
            final_confidence,
            total_challenges,
            successful_challenges,
            concessions,
        })
    }
}

/// Stored debate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateRecord {
    pub id: DebateId,
    pub ticker: String,
    pub timeframe: String,
    pub model: String,
    pub mode: DebateMode,
    pub personas: Vec<String>,
    pub verdict: Option<Recommendation>,
    pub conviction: Option<Conviction>,
    pub rounds_completed: u32,
    pub final_confidence: Option<f64>,
    pub total_challenges: u32,
    pub successful_challenges: u32,
    pub concessions: u32,
    pub actual_outcome: Option<Recommendation>,
    pub outcome_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DebateRecord {
    pub fn is_finalized(&self) -> bool {
        self.verdict.is_some()
    }

    pub fn has_outcome(&self) -> bool {
        self.actual_outcome.is_some()
    }
}

/// A scored challenge ready to be appended to a debate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewChallenge {
    pub round: u32,
    pub challenger: String,
    pub target: String,
    pub challenge_summary: String,
    pub response_summary: String,
    pub outcome: ChallengeOutcome,
    pub quality_score: f64,
}

impl NewChallenge {
    pub fn new(
        round: u32,
        challenger: &str,
        target: &str,
        challenge_summary: &str,
        response_summary: &str,
        outcome: ChallengeOutcome,
        quality_score: f64,
    ) -> Result<Self, CoreError> {
        validate_persona(challenger)?;
        validate_persona(target)?;
        if challenger == target {
            return Err(CoreError::InvalidField {
                field: "target",
                reason: format!("{} cannot challenge itself", challenger),
            });
        }
        if !(-1.0..=1.0).contains(&quality_score) {
            return Err(CoreError::out_of_range("quality_score", quality_score));
        }

        Ok(Self {
            round,
            challenger: challenger.to_string(),
            target: target.to_string(),
            challenge_summary: challenge_summary.to_string(),
            response_summary: response_summary.to_string(),
            outcome,
            quality_score,
        })
    }

    pub fn was_successful(&self) -> bool {
        self.outcome.is_success()
    }

    pub fn is_concession(&self) -> bool {
        self.outcome == ChallengeOutcome::Conceded
    }
}

/// Stored challenge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeRecord {
    pub id: i64,
    pub debate_id: DebateId,
    pub round: u32,
    pub challenger: String,
    pub target: String,
    pub challenge_summary: String,
    pub response_summary: String,
    pub outcome: ChallengeOutcome,
    pub was_successful: bool,
    pub concession: bool,
    pub quality_score: f64,
}

/// Stored vote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaVoteRecord {
    pub id: i64,
    pub debate_id: DebateId,
    pub persona: String,
    /// Raw vote as cast; may fall outside the closed vocabulary
    pub vote: String,
    pub weight: f64,
    /// Filled once the debate's outcome is recorded
    pub was_correct: Option<bool>,
}

impl PersonaVoteRecord {
    /// Parsed vote, if it belongs to the vocabulary
    pub fn recommendation(&self) -> Option<Recommendation> {
        self.vote.parse().ok()
    }
}
