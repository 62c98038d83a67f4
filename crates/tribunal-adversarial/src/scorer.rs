//! Challenge scoring
//!
//! Classifies one (challenge, response) exchange into a [`ChallengeOutcome`].
//! The bundled [`LexiconScorer`] is a cheap, explainable classifier built on
//! phrase lists; any other [`ChallengeScorer`] may replace it as long as it
//! keeps the four outcomes and their polarity.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Debug;

use tribunal_core::ChallengeOutcome;

/// Result of scoring one exchange
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeScore {
    pub outcome: ChallengeOutcome,
    /// Whether the challenger is credited
    pub success: bool,
    /// Quality in [-1, 1]
    pub quality: f64,
    /// Which rule fired and what it matched
    pub reason: String,
}

impl ChallengeScore {
    fn new(outcome: ChallengeOutcome, quality: f64, reason: String) -> Self {
        Self {
            outcome,
            success: outcome.is_success(),
            quality,
            reason,
        }
    }
}

/// Classifier for challenge/response pairs.
///
/// Implementations must be pure: the same pair always yields the same score.
pub trait ChallengeScorer: Send + Sync + Debug {
    fn score(&self, challenge: &str, response: &str) -> ChallengeScore;
}

/// Phrases that accept the challenger's criticism
pub const CONCESSION_PHRASES: &[&str] = &[
    "you're right",
    "you are right",
    "i concede",
    "i stand corrected",
    "fair point",
    "good point",
    "valid point",
    "point taken",
    "i was wrong",
    "i agree",
    "i accept that",
    "i acknowledge",
    "that's a fair criticism",
];

/// Phrases that signal a concrete, checkable defense
pub const EVIDENCE_PHRASES: &[&str] = &[
    "according to",
    "data shows",
    "the data",
    "historically",
    "evidence",
    "revenue",
    "earnings",
    "eps",
    "p/e",
    "margin",
    "margins",
    "guidance",
    "year-over-year",
    "yoy",
    "quarter",
    "quarterly",
    "backtest",
    "backtested",
    "filing",
    "10-k",
    "10-q",
    "balance sheet",
    "cash flow",
    "support level",
    "resistance level",
    "trading volume",
    "average volume",
    "rsi",
    "moving average",
    "studies show",
    "analyst report",
    "earnings report",
    "benchmark",
];

/// Phrases that signal an uncommitted defense
pub const HEDGE_PHRASES: &[&str] = &[
    "maybe",
    "perhaps",
    "might",
    "could",
    "possibly",
    "probably",
    "potentially",
    "uncertain",
    "unclear",
    "not sure",
    "it depends",
    "hard to say",
    "arguably",
    "somewhat",
    "seems",
    "i think",
    "i believe",
];

const STOPWORDS: &[&str] = &[
    "about", "also", "because", "been", "does", "from", "have", "into", "just", "more", "only",
    "some", "such", "than", "that", "their", "them", "then", "there", "they", "this", "very",
    "were", "what", "when", "where", "which", "while", "will", "with", "would", "your", "you're",
];

/// Thresholds for [`LexiconScorer`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexiconConfig {
    /// Responses shorter than this (in characters) are irrelevant
    pub min_response_chars: usize,
    /// Minimum share of challenge content tokens echoed by the response
    pub min_overlap: f64,
    /// Distinct evidence matches needed for a strong defense
    pub min_evidence: usize,
    /// Hedge matches needed for a weak defense
    pub min_hedges: usize,
}

impl Default for LexiconConfig {
    fn default() -> Self {
        Self {
            min_response_chars: 20,
            min_overlap: 0.20,
            min_evidence: 2,
            min_hedges: 2,
        }
    }
}

/// Lexicon-driven scorer. Rules run in priority order, first match wins:
///
/// 1. concession phrase: CONCEDED (quality 1.0)
/// 2. short or off-topic response: IRRELEVANT (quality -1.0)
/// 3. two or more evidence phrases: STRONGLY_DEFENDED (quality 0.0)
/// 4. two or more hedges and no evidence: WEAKLY_DEFENDED (quality 0.5)
/// 5. otherwise: STRONGLY_DEFENDED (quality 0.25)
#[derive(Debug, Clone, Default)]
pub struct LexiconScorer {
    pub config: LexiconConfig,
}

impl LexiconScorer {
    pub fn new(config: LexiconConfig) -> Self {
        Self { config }
    }

    /// Share of the challenge's content tokens that reappear in the response.
    /// A challenge without content tokens has zero overlap.
    pub fn token_overlap(challenge: &str, response: &str) -> f64 {
        let challenge_tokens = content_tokens(challenge);
        if challenge_tokens.is_empty() {
            return 0.0;
        }
        let response_tokens = content_tokens(response);
        let shared = challenge_tokens.intersection(&response_tokens).count();
        shared as f64 / challenge_tokens.len() as f64
    }

    /// Evidence phrases found in `text`, plus numeric figures
    pub fn evidence_matches(text: &str) -> Vec<String> {
        let normalized = normalize(text);
        let mut matches: Vec<String> = find_phrases(&normalized, EVIDENCE_PHRASES)
            .into_iter()
            .map(str::to_string)
            .collect();

        let tokens: Vec<&str> = normalized.split_whitespace().collect();
        let has_digit = |t: &str| t.chars().any(|c| c.is_ascii_digit());
        if tokens.iter().any(|t| t.ends_with('%') && has_digit(t)) {
            matches.push("<percentage>".to_string());
        }
        if tokens.iter().any(|t| t.starts_with('$') && has_digit(t)) {
            matches.push("<dollar figure>".to_string());
        }
        matches
    }
}

impl ChallengeScorer for LexiconScorer {
    fn score(&self, challenge: &str, response: &str) -> ChallengeScore {
        let normalized = normalize(response);

        let concessions = find_phrases(&normalized, CONCESSION_PHRASES);
        if let Some(phrase) = concessions.first() {
            return ChallengeScore::new(
                ChallengeOutcome::Conceded,
                1.0,
                format!("concession: \"{}\"", phrase),
            );
        }

        let length = response.trim().chars().count();
        if length < self.config.min_response_chars {
            return ChallengeScore::new(
                ChallengeOutcome::Irrelevant,
                -1.0,
                format!(
                    "response too short ({} < {} chars)",
                    length, self.config.min_response_chars
                ),
            );
        }

        let overlap = Self::token_overlap(challenge, response);
        if overlap < self.config.min_overlap {
            return ChallengeScore::new(
                ChallengeOutcome::Irrelevant,
                -1.0,
                format!(
                    "response off-topic ({:.0}% token overlap)",
                    overlap * 100.0
                ),
            );
        }

        let evidence = Self::evidence_matches(response);
        if evidence.len() >= self.config.min_evidence {
            return ChallengeScore::new(
                ChallengeOutcome::StronglyDefended,
                0.0,
                format!("evidence: {}", evidence.join(", ")),
            );
        }

        let hedges = find_phrases(&normalized, HEDGE_PHRASES);
        if hedges.len() >= self.config.min_hedges && evidence.is_empty() {
            return ChallengeScore::new(
                ChallengeOutcome::WeaklyDefended,
                0.5,
                format!("hedged without evidence: {}", hedges.join(", ")),
            );
        }

        ChallengeScore::new(
            ChallengeOutcome::StronglyDefended,
            0.25,
            "inconclusive, benefit of the doubt to the defender".to_string(),
        )
    }
}

/// Lowercase, fold typographic quotes, and pad so phrases can be matched on
/// token boundaries.
fn normalize(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '\u{2018}' | '\u{2019}' | '`' => '\'',
            c if c.is_alphanumeric() || "'%$/-".contains(c) => c,
            _ => ' ',
        })
        .collect();
    let joined = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    format!(" {} ", joined)
}

fn find_phrases<'a>(normalized: &str, phrases: &[&'a str]) -> Vec<&'a str> {
    phrases
        .iter()
        .copied()
        .filter(|phrase| normalized.contains(&format!(" {} ", phrase)))
        .collect()
}

fn content_tokens(text: &str) -> HashSet<String> {
    normalize(text)
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|t| t.chars().count() >= 4 && !STOPWORDS.contains(t))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHALLENGE: &str = "Your growth estimate ignores the slowing demand trend";

    fn score(challenge: &str, response: &str) -> ChallengeScore {
        LexiconScorer::default().score(challenge, response)
    }

    #[test]
    fn test_concession_wins_over_evidence() {
        let result = score(
            "Revenue guidance was cut last quarter",
            "You're right, I concede that point. Revenue guidance was cut 12% last quarter.",
        );
        assert_eq!(result.outcome, ChallengeOutcome::Conceded);
        assert!(result.success);
        assert_eq!(result.quality, 1.0);
    }

    #[test]
    fn test_typographic_apostrophe_concession() {
        let result = score(CHALLENGE, "You\u{2019}re right about the demand trend");
        assert_eq!(result.outcome, ChallengeOutcome::Conceded);
    }

    #[test]
    fn test_short_response_is_irrelevant() {
        let result = score(CHALLENGE, "Disagree.");
        assert_eq!(result.outcome, ChallengeOutcome::Irrelevant);
        assert!(!result.success);
        assert_eq!(result.quality, -1.0);
    }

    #[test]
    fn test_off_topic_response_is_irrelevant() {
        let result = score(
            "Margins are compressing because input costs rose",
            "The weather in Paris has been lovely lately, great for tourism overall.",
        );
        assert_eq!(result.outcome, ChallengeOutcome::Irrelevant);
        assert!(result.reason.contains("off-topic"));
    }

    #[test]
    fn test_everyday_words_are_not_evidence() {
        let challenge = "The report does not support this view on demand";
        let plain = score(challenge, "I support this view on demand, see the report for it");
        assert_eq!(plain.outcome, ChallengeOutcome::StronglyDefended);
        assert_eq!(plain.quality, 0.25);

        let technical = score(
            challenge,
            "Demand held the support level at 180 on rising trading volume, this view stands",
        );
        assert_eq!(technical.outcome, ChallengeOutcome::StronglyDefended);
        assert_eq!(technical.quality, 0.0);
        assert!(technical.reason.contains("support level"));
    }

    #[test]
    fn test_vague_challenge_has_no_overlap() {
        assert_eq!(LexiconScorer::token_overlap("Why?", "Because the data says so"), 0.0);
    }

    #[test]
    fn test_evidence_backed_defense() {
        let result = score(
            "Your revenue growth estimate ignores the slowing quarter guidance",
            "Revenue grew 18% year-over-year last quarter and guidance was raised, so the growth estimate holds.",
        );
        assert_eq!(result.outcome, ChallengeOutcome::StronglyDefended);
        assert!(!result.success);
        assert_eq!(result.quality, 0.0);
    }

    #[test]
    fn test_hedged_defense_is_weak() {
        let result = score(
            CHALLENGE,
            "Maybe the demand trend is slowing, I think growth could still hold up somewhat.",
        );
        assert_eq!(result.outcome, ChallengeOutcome::WeaklyDefended);
        assert!(result.success);
        assert_eq!(result.quality, 0.5);
    }

    #[test]
    fn test_inconclusive_defaults_to_defender() {
        let result = score(
            CHALLENGE,
            "The demand trend is not slowing and growth remains intact for this business.",
        );
        assert_eq!(result.outcome, ChallengeOutcome::StronglyDefended);
        assert!(!result.success);
        assert_eq!(result.quality, 0.25);
    }

    #[test]
    fn test_phrases_match_on_token_boundaries() {
        // "steps" must not count as "eps"
        assert!(LexiconScorer::evidence_matches("Next steps are unclear").is_empty());
        let matches = LexiconScorer::evidence_matches("EPS beat and the P/E is 14");
        assert!(matches.contains(&"eps".to_string()));
        assert!(matches.contains(&"p/e".to_string()));
    }
}
