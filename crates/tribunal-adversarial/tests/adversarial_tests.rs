use std::collections::{BTreeMap, HashMap};

use proptest::prelude::*;
use tribunal_adversarial::{BeliefTracker, ChallengeScorer, LexiconScorer};
use tribunal_core::{ChallengeOutcome, ConvergenceConfig, Recommendation};

fn vote_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(Recommendation::ALL.to_vec()).prop_map(|r| r.to_string()),
        "[a-z ]{0,8}",
    ]
}

proptest! {
    #[test]
    fn belief_probabilities_always_sum_to_one(
        round in prop::collection::vec((vote_strategy(), 0.01f64..=1.0), 1..12)
    ) {
        let mut votes = BTreeMap::new();
        let mut weights = HashMap::new();
        for (i, (vote, weight)) in round.into_iter().enumerate() {
            let persona = format!("persona_{}", i);
            votes.insert(persona.clone(), vote);
            weights.insert(persona, weight);
        }

        let mut tracker = BeliefTracker::default();
        let state = tracker.update(&votes, &weights);

        prop_assert!((0.0..=1.0).contains(&state.p_buy));
        prop_assert_eq!(state.p_sell, 1.0 - state.p_buy);
        prop_assert!((0.0..=1.0).contains(&state.confidence));
        prop_assert_eq!(state.confidence == 0.0, state.p_buy == 0.5);
    }

    #[test]
    fn early_rounds_never_converge(rounds in 1u32..3, vote in prop::sample::select(Recommendation::ALL.to_vec())) {
        let mut tracker = BeliefTracker::new(ConvergenceConfig::default());
        let votes: BTreeMap<String, String> = [("solo".to_string(), vote.to_string())].into_iter().collect();
        let weights: HashMap<String, f64> = [("solo".to_string(), 1.0)].into_iter().collect();

        for _ in 0..rounds {
            tracker.update(&votes, &weights);
        }

        let check = tracker.check_convergence_with(3);
        prop_assert!(!check.converged);
        prop_assert!(!check.reason.is_empty());
    }

    #[test]
    fn scoring_is_deterministic(challenge in ".{0,60}", response in ".{0,120}") {
        let scorer = LexiconScorer::default();
        prop_assert_eq!(scorer.score(&challenge, &response), scorer.score(&challenge, &response));
    }
}

#[test]
fn test_full_confidence_only_at_extremes() {
    let mut tracker = BeliefTracker::default();
    let weights: HashMap<String, f64> = [("a".to_string(), 1.0)].into_iter().collect();

    let sell: BTreeMap<String, String> = [("a".to_string(), "STRONG_SELL".to_string())].into_iter().collect();
    let state = tracker.update(&sell, &weights);
    assert_eq!(state.p_buy, 0.0);
    assert_eq!(state.confidence, 1.0);

    let hold: BTreeMap<String, String> = [("a".to_string(), "HOLD".to_string())].into_iter().collect();
    let state = tracker.update(&hold, &weights);
    assert_eq!(state.p_buy, 0.5);
    assert_eq!(state.confidence, 0.0);
}

#[test]
fn test_weights_shift_the_balance() {
    let mut tracker = BeliefTracker::default();
    let votes: BTreeMap<String, String> = [
        ("veteran".to_string(), "SELL".to_string()),
        ("rookie_a".to_string(), "BUY".to_string()),
        ("rookie_b".to_string(), "BUY".to_string()),
    ]
    .into_iter()
    .collect();
    let weights: HashMap<String, f64> = [
        ("veteran".to_string(), 1.0),
        ("rookie_a".to_string(), 0.1),
        ("rookie_b".to_string(), 0.1),
    ]
    .into_iter()
    .collect();

    let state = tracker.update(&votes, &weights);
    assert!(state.p_buy < 0.2);
    let check = tracker.check_convergence_with(1);
    assert_eq!(check.verdict, Recommendation::StrongSell);
}

#[test]
fn test_scorer_polarity_across_outcomes() {
    let scorer = LexiconScorer::default();
    let challenge = "Your valuation ignores the declining free cash flow trend";

    let conceded = scorer.score(challenge, "Fair point, the cash flow trend does undercut my valuation.");
    let weak = scorer.score(challenge, "Perhaps the decline is temporary and the valuation might still hold, trend aside.");
    let strong = scorer.score(
        challenge,
        "The cash flow trend reversed: the latest 10-K shows free cash flow up 22% and the valuation uses that filing.",
    );
    let irrelevant = scorer.score(challenge, "No.");

    assert_eq!(conceded.outcome, ChallengeOutcome::Conceded);
    assert_eq!(weak.outcome, ChallengeOutcome::WeaklyDefended);
    assert_eq!(strong.outcome, ChallengeOutcome::StronglyDefended);
    assert_eq!(irrelevant.outcome, ChallengeOutcome::Irrelevant);

    assert!(conceded.quality > weak.quality);
    assert!(weak.quality > strong.quality);
    assert!(strong.quality > irrelevant.quality);
}
