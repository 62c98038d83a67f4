use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tribunal_core::{
    ChallengeOutcome, DebateMode, DebateResolution, MutePolicy, NewChallenge, NewDebate,
    Recommendation,
};
use tribunal_persist::{AccuracyStore, SqliteAccuracyStore, SqliteConfig, StoreError};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn roster(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn votes(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(p, v)| (p.to_string(), v.to_string()))
        .collect()
}

async fn register(store: &dyn AccuracyStore, names: &[&str]) -> Result<i64, StoreError> {
    let debate = NewDebate::new("msft", "swing", "growth", DebateMode::Parallel, roster(names))?;
    store.register_debate(&debate).await
}

async fn challenge(
    store: &dyn AccuracyStore,
    debate_id: i64,
    challenger: &str,
    target: &str,
    outcome: ChallengeOutcome,
) -> Result<i64, StoreError> {
    let new = NewChallenge::new(1, challenger, target, "objection", "reply", outcome, 0.0)?;
    store.record_challenge(debate_id, &new).await
}

#[tokio::test]
async fn test_poor_challenger_weight_follows_accuracy() -> TestResult {
    let store = SqliteAccuracyStore::memory().await?;

    let mut last = 0;
    for _ in 0..10 {
        last = register(&store, &["bear", "bull"]).await?;
    }
    for i in 0..10 {
        let outcome = if i < 2 {
            ChallengeOutcome::WeaklyDefended
        } else {
            ChallengeOutcome::StronglyDefended
        };
        challenge(&store, last, "bear", "bull", outcome).await?;
    }
    store.recompute_accuracy().await?;

    let record = store.get_persona_record("bear").await?.ok_or("missing bear")?;
    assert_eq!(record.successful_challenges, 2);
    assert_eq!(record.failed_challenges, 8);
    assert_eq!(record.votes_total, 0);
    assert!((record.accuracy_score - 0.29).abs() < 1e-9);

    let weight = store.get_persona_weight("bear", 10).await?;
    assert!((weight - 0.29).abs() < 1e-9);

    // Below the debate threshold the cold-start weight applies
    assert_eq!(store.get_persona_weight("bear", 11).await?, 0.5);
    Ok(())
}

#[tokio::test]
async fn test_mute_needs_enough_challenges() -> TestResult {
    let store = SqliteAccuracyStore::memory().await?;
    let policy = MutePolicy::default();
    let id = register(&store, &["contrarian", "value_investor"]).await?;

    for _ in 0..2 {
        challenge(&store, id, "contrarian", "value_investor", ChallengeOutcome::Irrelevant).await?;
    }
    assert_eq!(store.get_challenge_success_rate("contrarian", 3).await?, (1.0, 2));
    assert!(!store.should_mute_persona("contrarian", &policy).await?);

    challenge(&store, id, "contrarian", "value_investor", ChallengeOutcome::StronglyDefended).await?;
    assert_eq!(store.get_challenge_success_rate("contrarian", 3).await?, (0.0, 3));
    assert!(store.should_mute_persona("contrarian", &policy).await?);
    Ok(())
}

#[tokio::test]
async fn test_weight_is_stable_between_writes() -> TestResult {
    let store = SqliteAccuracyStore::memory().await?;
    for _ in 0..12 {
        register(&store, &["quant_analyst"]).await?;
    }

    let first = store.get_persona_weight("quant_analyst", 10).await?;
    store.recompute_accuracy().await?;
    let second = store.get_persona_weight("quant_analyst", 10).await?;
    assert_eq!(first, second);
    assert_eq!(first, 0.5);
    Ok(())
}

#[tokio::test]
async fn test_outcome_scores_votes_and_updates_accuracy() -> TestResult {
    let store = SqliteAccuracyStore::memory().await?;
    let id = register(&store, &["a", "b", "c", "d"]).await?;

    let final_votes = votes(&[("a", "BUY"), ("b", "SELL"), ("c", "HOLD"), ("d", "maybe")]);
    let weights: HashMap<String, f64> = [("a".to_string(), 0.8)].into_iter().collect();
    assert_eq!(store.record_votes(id, &final_votes, &weights).await?, 4);

    let resolution = DebateResolution::new(Recommendation::Buy, 3, 0.5, 0, 0, 0)?;
    store.finalize_debate(id, &resolution).await?;

    let scored = store
        .record_outcome(id, Recommendation::Watch, Some("range bound"))
        .await?;
    assert_eq!(scored, 4);

    let debate = store.get_debate(id).await?;
    assert_eq!(debate.ticker, "MSFT");
    assert_eq!(debate.verdict, Some(Recommendation::Buy));
    assert_eq!(debate.actual_outcome, Some(Recommendation::Watch));
    assert_eq!(debate.notes.as_deref(), Some("range bound"));
    assert!(debate.outcome_date.is_some());

    let stored: HashMap<String, Option<bool>> = store
        .debate_votes(id)
        .await?
        .into_iter()
        .map(|v| (v.persona, v.was_correct))
        .collect();
    assert_eq!(stored["a"], Some(false));
    assert_eq!(stored["b"], Some(false));
    assert_eq!(stored["c"], Some(true));
    assert_eq!(stored["d"], Some(false));

    let c = store.get_persona_record("c").await?.ok_or("missing c")?;
    assert_eq!((c.votes_correct, c.votes_total), (1, 1));
    // 0.7 * 0.5 (no challenges) + 0.3 * 1.0
    assert!((c.accuracy_score - 0.65).abs() < 1e-9);

    // A second outcome rescoring nothing
    assert_eq!(store.record_outcome(id, Recommendation::Buy, None).await?, 0);
    let c = store.get_persona_record("c").await?.ok_or("missing c")?;
    assert_eq!(c.votes_total, 1);
    let debate = store.get_debate(id).await?;
    assert_eq!(debate.notes.as_deref(), Some("range bound"));
    Ok(())
}

#[tokio::test]
async fn test_missing_vote_weight_uses_cold_start() -> TestResult {
    let store = SqliteAccuracyStore::memory().await?;
    let id = register(&store, &["a"]).await?;
    store
        .record_votes(id, &votes(&[("a", "STRONG_BUY")]), &HashMap::new())
        .await?;

    let stored = store.debate_votes(id).await?;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].weight, 0.5);
    assert_eq!(stored[0].was_correct, None);
    assert_eq!(stored[0].recommendation(), Some(Recommendation::StrongBuy));
    Ok(())
}

#[tokio::test]
async fn test_recent_debates_newest_first() -> TestResult {
    let store = SqliteAccuracyStore::memory().await?;
    let first = register(&store, &["a"]).await?;
    let second = register(&store, &["b"]).await?;
    let third = register(&store, &["c"]).await?;

    let recent = store.recent_debates(2).await?;
    let ids: Vec<i64> = recent.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![third, second]);
    assert!(!recent[0].is_finalized());
    assert!(ids.iter().all(|id| *id != first));
    Ok(())
}

#[tokio::test]
async fn test_concurrent_writers_never_lose_counts() -> TestResult {
    let store: Arc<dyn AccuracyStore> = Arc::new(SqliteAccuracyStore::memory().await?);
    let first = register(store.as_ref(), &["hawk", "dove"]).await?;
    let second = register(store.as_ref(), &["hawk", "dove"]).await?;

    let writes = (0..20).map(|i| {
        let store = store.clone();
        let debate_id = if i % 2 == 0 { first } else { second };
        async move {
            challenge(store.as_ref(), debate_id, "hawk", "dove", ChallengeOutcome::Conceded).await
        }
    });
    for result in futures::future::join_all(writes).await {
        result?;
    }

    let finals = [first, second].map(|id| {
        let store = store.clone();
        async move {
            let resolution = DebateResolution::new(Recommendation::Sell, 4, 0.6, 10, 10, 10)?;
            store.finalize_debate(id, &resolution).await
        }
    });
    for result in futures::future::join_all(finals).await {
        result?;
    }

    let hawk = store.get_persona_record("hawk").await?.ok_or("missing hawk")?;
    let dove = store.get_persona_record("dove").await?.ok_or("missing dove")?;
    assert_eq!(hawk.successful_challenges, 20);
    assert_eq!(hawk.debates_participated, 2);
    assert_eq!(dove.concessions_made, 20);
    assert!((hawk.accuracy_score - 0.85).abs() < 1e-9);

    for id in [first, second] {
        let debate = store.get_debate(id).await?;
        assert!(debate.is_finalized());
        assert_eq!(debate.total_challenges, 10);
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_file_store_serializes_concurrent_writers() -> TestResult {
    let dir = tempfile::tempdir()?;
    let url = format!("sqlite:{}?mode=rwc", dir.path().join("tribunal.db").display());
    let config = SqliteConfig::file(&url);
    assert!(config.max_connections > 1);
    let store: Arc<dyn AccuracyStore> = Arc::new(SqliteAccuracyStore::connect(&config).await?);

    let first = register(store.as_ref(), &["hawk", "dove"]).await?;
    let second = register(store.as_ref(), &["hawk", "dove"]).await?;

    let mut handles = Vec::new();
    for i in 0..40 {
        let store = store.clone();
        let debate_id = if i % 2 == 0 { first } else { second };
        handles.push(tokio::spawn(async move {
            challenge(store.as_ref(), debate_id, "hawk", "dove", ChallengeOutcome::Conceded)
                .await
                .map(|_| ())
        }));
    }
    for i in 0..6 {
        let store = store.clone();
        let debate_id = if i % 2 == 0 { first } else { second };
        handles.push(tokio::spawn(async move {
            let resolution = DebateResolution::new(Recommendation::Sell, 4, 0.6, 10, 10, 10)?;
            store.finalize_debate(debate_id, &resolution).await
        }));
    }
    for i in 0..4 {
        let store = store.clone();
        let debate_id = if i % 2 == 0 { first } else { second };
        handles.push(tokio::spawn(async move {
            let ballot = votes(&[("hawk", "SELL"), ("dove", "BUY")]);
            store
                .record_votes(debate_id, &ballot, &HashMap::new())
                .await
                .map(|_| ())
        }));
    }
    for handle in handles {
        handle.await??;
    }
    store.recompute_accuracy().await?;

    let hawk = store.get_persona_record("hawk").await?.ok_or("missing hawk")?;
    let dove = store.get_persona_record("dove").await?.ok_or("missing dove")?;
    assert_eq!(hawk.successful_challenges, 40);
    assert_eq!(hawk.debates_participated, 2);
    assert_eq!(dove.concessions_made, 40);
    assert!((hawk.accuracy_score - 0.85).abs() < 1e-9);

    let mut recorded = 0;
    for id in [first, second] {
        assert!(store.get_debate(id).await?.is_finalized());
        assert_eq!(store.debate_challenges(id).await?.len(), 20);
        recorded += store.debate_votes(id).await?.len();
    }
    assert_eq!(recorded, 8);
    Ok(())
}
