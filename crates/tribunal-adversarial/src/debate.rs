//! Debate transcript: issued challenges, per-target batches, scored exchanges

use serde::{Deserialize, Serialize};

use tribunal_core::BeliefState;

use crate::scorer::ChallengeScore;

/// One objection raised by `challenger` against `target`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuedChallenge {
    pub round: u32,
    pub challenger: String,
    pub target: String,
    pub text: String,
}

impl IssuedChallenge {
    pub fn new(round: u32, challenger: &str, target: &str, text: &str) -> Self {
        Self {
            round,
            challenger: challenger.to_string(),
            target: target.to_string(),
            text: text.to_string(),
        }
    }
}

/// Challenges delivered to one target in a single request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeBatch {
    pub round: u32,
    pub target: String,
    pub challenges: Vec<IssuedChallenge>,
}

impl ChallengeBatch {
    pub fn new(round: u32, target: &str) -> Self {
        Self {
            round,
            target: target.to_string(),
            challenges: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }

    /// Challengers in issue order, deduplicated
    pub fn challengers(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for challenge in &self.challenges {
            if !names.contains(&challenge.challenger) {
                names.push(challenge.challenger.clone());
            }
        }
        names
    }
}

/// Outbound request asking one target to answer its batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponsePrompt {
    pub round: u32,
    pub target: String,
    pub challengers: Vec<String>,
    pub prompt: String,
}

impl ResponsePrompt {
    pub fn for_batch(batch: &ChallengeBatch) -> Self {
        let listed: Vec<String> = batch
            .challenges
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}. [{}] {}", i + 1, c.challenger, c.text.trim()))
            .collect();

        let prompt = format!(
            "Round {} - {}, respond to the following challenges to your position:\n\n\
             {}\n\n\
             For each challenge, either concede the point explicitly or defend your \
             position with specific evidence (figures, filings, price levels). \
             Answer every numbered item.",
            batch.round,
            batch.target,
            listed.join("\n")
        );

        Self {
            round: batch.round,
            target: batch.target.clone(),
            challengers: batch.challengers(),
            prompt,
        }
    }
}

/// A challenge together with the response it received and its score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChallenge {
    pub challenge: IssuedChallenge,
    pub response: String,
    pub score: ChallengeScore,
}

/// Running per-challenger tally across the whole debate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengerTally {
    pub successes: u32,
    pub failures: u32,
    /// Concessions this challenger extracted
    pub concessions: u32,
}

impl ChallengerTally {
    pub fn record(&mut self, score: &ChallengeScore) {
        if score.success {
            self.successes += 1;
        } else {
            self.failures += 1;
        }
        if score.outcome == tribunal_core::ChallengeOutcome::Conceded {
            self.concessions += 1;
        }
    }

    pub fn total(&self) -> u32 {
        self.successes + self.failures
    }

    pub fn success_rate(&self) -> Option<f64> {
        let total = self.total();
        (total > 0).then(|| f64::from(self.successes) / f64::from(total))
    }
}

/// Everything that happened in one round
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebateRound {
    pub round: u32,
    pub scored: Vec<ScoredChallenge>,
    /// Belief after this round's vote, if a vote was taken
    pub belief: Option<BeliefState>,
}

/// Ordered record of a debate's rounds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebateTranscript {
    pub rounds: Vec<DebateRound>,
}

impl DebateTranscript {
    /// Round entry for `round`, created on first use
    pub fn round_mut(&mut self, round: u32) -> &mut DebateRound {
        let index = match self.rounds.iter().position(|r| r.round == round) {
            Some(index) => index,
            None => {
                self.rounds.push(DebateRound {
                    round,
                    ..Default::default()
                });
                self.rounds.len() - 1
            }
        };
        &mut self.rounds[index]
    }

    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    pub fn challenge_count(&self) -> usize {
        self.rounds.iter().map(|r| r.scored.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tribunal_core::ChallengeOutcome;

    fn score(outcome: ChallengeOutcome) -> ChallengeScore {
        ChallengeScore {
            outcome,
            success: outcome.is_success(),
            quality: 0.0,
            reason: String::new(),
        }
    }

    #[test]
    fn test_prompt_lists_every_challenge() {
        let mut batch = ChallengeBatch::new(2, "value_investor");
        batch
            .challenges
            .push(IssuedChallenge::new(2, "contrarian", "value_investor", "Book value is stale"));
        batch
            .challenges
            .push(IssuedChallenge::new(2, "quant_analyst", "value_investor", "Mean reversion failed"));
        batch
            .challenges
            .push(IssuedChallenge::new(2, "contrarian", "value_investor", "Debt is rising"));

        let prompt = ResponsePrompt::for_batch(&batch);
        assert_eq!(prompt.target, "value_investor");
        assert_eq!(prompt.challengers, vec!["contrarian", "quant_analyst"]);
        assert!(prompt.prompt.contains("1. [contrarian] Book value is stale"));
        assert!(prompt.prompt.contains("3. [contrarian] Debt is rising"));
    }

    #[test]
    fn test_tally() {
        let mut tally = ChallengerTally::default();
        tally.record(&score(ChallengeOutcome::Conceded));
        tally.record(&score(ChallengeOutcome::Irrelevant));
        tally.record(&score(ChallengeOutcome::StronglyDefended));

        assert_eq!(tally.total(), 3);
        assert_eq!(tally.successes, 1);
        assert_eq!(tally.concessions, 1);
        assert!((tally.success_rate().unwrap() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_transcript_rounds() {
        let mut transcript = DebateTranscript::default();
        transcript.round_mut(1).belief = Some(BeliefState::uniform());
        transcript.round_mut(1);
        transcript.round_mut(2);
        assert_eq!(transcript.round_count(), 2);
        assert_eq!(transcript.challenge_count(), 0);
    }
}
