//! Closed vocabularies: recommendations, convictions, challenge outcomes, debate modes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Preference assigned to a vote string outside the closed vocabulary.
///
/// This is a deliberate weak-buy bias: an unparseable vote nudges the tally
/// toward BUY instead of being dropped. Callers that want a neutral fallback
/// must filter unrecognized votes before submitting them.
pub const UNRECOGNIZED_VOTE_PREFERENCE: f64 = 0.25;

fn normalize(raw: &str) -> String {
    raw.trim()
        .to_ascii_uppercase()
        .replace(|c: char| c == ' ' || c == '-', "_")
}

/// Trading recommendation used both for persona votes and for the final verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    StrongBuy,
    Buy,
    Watch,
    Hold,
    Avoid,
    Sell,
    StrongSell,
}

impl Recommendation {
    /// Every member of the vocabulary, most bullish first
    pub const ALL: [Recommendation; 7] = [
        Recommendation::StrongBuy,
        Recommendation::Buy,
        Recommendation::Watch,
        Recommendation::Hold,
        Recommendation::Avoid,
        Recommendation::Sell,
        Recommendation::StrongSell,
    ];

    /// Wire spelling (`STRONG_BUY`, `HOLD`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "STRONG_BUY",
            Recommendation::Buy => "BUY",
            Recommendation::Watch => "WATCH",
            Recommendation::Hold => "HOLD",
            Recommendation::Avoid => "AVOID",
            Recommendation::Sell => "SELL",
            Recommendation::StrongSell => "STRONG_SELL",
        }
    }

    /// Directional preference in [-1, 1]
    pub fn preference(&self) -> f64 {
        match self {
            Recommendation::StrongBuy | Recommendation::Buy => 1.0,
            Recommendation::Watch | Recommendation::Hold => 0.0,
            Recommendation::Avoid | Recommendation::Sell | Recommendation::StrongSell => -1.0,
        }
    }

    /// WATCH and HOLD carry no direction
    pub fn is_neutral(&self) -> bool {
        matches!(self, Recommendation::Watch | Recommendation::Hold)
    }

    /// Canonical verdict table over P(buy).
    ///
    /// STRONG_BUY >= 0.85, BUY >= 0.65, WATCH >= 0.45, AVOID >= 0.35,
    /// otherwise STRONG_SELL. HOLD and SELL are vote-only values and are
    /// never produced here.
    pub fn from_p_buy(p_buy: f64) -> Self {
        if p_buy >= 0.85 {
            Recommendation::StrongBuy
        } else if p_buy >= 0.65 {
            Recommendation::Buy
        } else if p_buy >= 0.45 {
            Recommendation::Watch
        } else if p_buy >= 0.35 {
            Recommendation::Avoid
        } else {
            Recommendation::StrongSell
        }
    }

    /// Whether a vote counts as correct against a realized outcome:
    /// exact match, or both sides neutral.
    pub fn matches_outcome(&self, actual: Recommendation) -> bool {
        *self == actual || (self.is_neutral() && actual.is_neutral())
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Recommendation {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        Recommendation::ALL
            .into_iter()
            .find(|r| r.as_str() == normalized)
            .ok_or_else(|| CoreError::UnknownRecommendation(s.to_string()))
    }
}

/// Conviction label attached to a finalized debate.
///
/// This table classifies confidence only; the verdict always comes from
/// [`Recommendation::from_p_buy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Conviction {
    High,
    Medium,
    Low,
}

impl Conviction {
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.70 {
            Conviction::High
        } else if confidence >= 0.40 {
            Conviction::Medium
        } else {
            Conviction::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Conviction::High => "HIGH",
            Conviction::Medium => "MEDIUM",
            Conviction::Low => "LOW",
        }
    }
}

impl fmt::Display for Conviction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Conviction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "HIGH" => Ok(Conviction::High),
            "MEDIUM" => Ok(Conviction::Medium),
            "LOW" => Ok(Conviction::Low),
            _ => Err(CoreError::UnknownConviction(s.to_string())),
        }
    }
}

/// Classification of one (challenge, response) exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChallengeOutcome {
    /// Target explicitly accepted the criticism
    Conceded,
    /// Target answered with hedges and no evidence
    WeaklyDefended,
    /// Target answered with evidence, or the exchange was inconclusive
    StronglyDefended,
    /// Nothing scorable came back
    Irrelevant,
}

impl ChallengeOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeOutcome::Conceded => "CONCEDED",
            ChallengeOutcome::WeaklyDefended => "WEAKLY_DEFENDED",
            ChallengeOutcome::StronglyDefended => "STRONGLY_DEFENDED",
            ChallengeOutcome::Irrelevant => "IRRELEVANT",
        }
    }

    /// Whether the challenger is credited with a successful challenge
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            ChallengeOutcome::Conceded | ChallengeOutcome::WeaklyDefended
        )
    }

    /// Ordering by benefit to the challenger, higher is better.
    pub fn challenger_benefit(&self) -> u8 {
        match self {
            ChallengeOutcome::Conceded => 3,
            ChallengeOutcome::WeaklyDefended => 2,
            ChallengeOutcome::StronglyDefended => 1,
            ChallengeOutcome::Irrelevant => 0,
        }
    }
}

impl fmt::Display for ChallengeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChallengeOutcome {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "CONCEDED" => Ok(ChallengeOutcome::Conceded),
            "WEAKLY_DEFENDED" => Ok(ChallengeOutcome::WeaklyDefended),
            "STRONGLY_DEFENDED" => Ok(ChallengeOutcome::StronglyDefended),
            "IRRELEVANT" => Ok(ChallengeOutcome::Irrelevant),
            _ => Err(CoreError::UnknownOutcome(s.to_string())),
        }
    }
}

/// Protocol shape of a debate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebateMode {
    /// Three personas, one round, no voting
    Fast,
    /// Full roster, batched challenges, Bayesian early stop
    #[default]
    Parallel,
    /// Full roster, one challenge at a time
    Sequential,
}

impl DebateMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DebateMode::Fast => "fast",
            DebateMode::Parallel => "parallel",
            DebateMode::Sequential => "sequential",
        }
    }
}

impl fmt::Display for DebateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DebateMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(DebateMode::Fast),
            "parallel" => Ok(DebateMode::Parallel),
            "sequential" => Ok(DebateMode::Sequential),
            _ => Err(CoreError::UnknownMode(s.to_string())),
        }
    }
}
