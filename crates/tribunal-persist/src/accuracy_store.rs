//! Persona accuracy store
//!
//! Durable track record of every persona: debates, challenges, votes and the
//! derived accuracy score that turns into vote weight. All read-modify-write
//! sequences run inside a single `BEGIN IMMEDIATE` transaction, and counters
//! are bumped with in-place `x = x + 1` updates, so writers from debates
//! finalizing concurrently queue on the write lock and never lose increments.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{Row, Sqlite, Transaction};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use tracing::{debug, info};

use tribunal_core::{
    ChallengeRecord, CoreError, DebateId, DebateRecord, DebateResolution, MutePolicy,
    NewChallenge, NewDebate, PersonaAccuracyRecord, PersonaVoteRecord, Recommendation,
    WeightingConfig,
};

use crate::error::StoreError;
use crate::sqlite::{connect, SqliteConfig};

/// Durable record of persona performance
#[async_trait]
pub trait AccuracyStore: Send + Sync + Debug {
    /// Create a debate and bump `debates_participated` for every participant
    async fn register_debate(&self, debate: &NewDebate) -> Result<DebateId, StoreError>;

    /// Append a scored challenge and update challenger/target counters
    async fn record_challenge(
        &self,
        debate_id: DebateId,
        challenge: &NewChallenge,
    ) -> Result<i64, StoreError>;

    /// Append one vote per persona with the weight it was counted at
    async fn record_votes(
        &self,
        debate_id: DebateId,
        votes: &BTreeMap<String, String>,
        weights: &HashMap<String, f64>,
    ) -> Result<usize, StoreError>;

    /// Write the verdict and tallies, then recompute every accuracy score
    async fn finalize_debate(
        &self,
        debate_id: DebateId,
        resolution: &DebateResolution,
    ) -> Result<(), StoreError>;

    /// Record ground truth, score unscored votes, then recompute.
    /// Returns the number of votes scored.
    async fn record_outcome(
        &self,
        debate_id: DebateId,
        actual_outcome: Recommendation,
        notes: Option<&str>,
    ) -> Result<usize, StoreError>;

    /// Recompute `accuracy_score` for every persona. Returns rows updated.
    async fn recompute_accuracy(&self) -> Result<usize, StoreError>;

    async fn get_persona_record(
        &self,
        persona: &str,
    ) -> Result<Option<PersonaAccuracyRecord>, StoreError>;

    /// All personas, most accurate first
    async fn list_persona_records(&self) -> Result<Vec<PersonaAccuracyRecord>, StoreError>;

    async fn get_debate(&self, debate_id: DebateId) -> Result<DebateRecord, StoreError>;

    /// Newest debates first
    async fn recent_debates(&self, limit: u32) -> Result<Vec<DebateRecord>, StoreError>;

    async fn debate_challenges(
        &self,
        debate_id: DebateId,
    ) -> Result<Vec<ChallengeRecord>, StoreError>;

    async fn debate_votes(&self, debate_id: DebateId)
        -> Result<Vec<PersonaVoteRecord>, StoreError>;

    /// Weighting rules used by [`AccuracyStore::get_persona_weight`]
    fn weighting(&self) -> &WeightingConfig;

    /// Vote weight in [floor, ceiling]; the cold-start weight below
    /// `min_debates` or for unknown personas.
    async fn get_persona_weight(&self, persona: &str, min_debates: u32) -> Result<f64, StoreError> {
        let weighting = WeightingConfig {
            min_debates,
            ..self.weighting().clone()
        };
        Ok(match self.get_persona_record(persona).await? {
            Some(record) => weighting.weight_for(record.debates_participated, record.accuracy_score),
            None => weighting.cold_start_weight,
        })
    }

    /// Weights for a whole roster
    async fn get_persona_weights(
        &self,
        personas: &[String],
        min_debates: u32,
    ) -> Result<HashMap<String, f64>, StoreError> {
        let mut weights = HashMap::with_capacity(personas.len());
        for persona in personas {
            let weight = self.get_persona_weight(persona, min_debates).await?;
            weights.insert(persona.clone(), weight);
        }
        Ok(weights)
    }

    /// `(rate, total)`; rate is 1.0 while `total < min_challenges`
    async fn get_challenge_success_rate(
        &self,
        persona: &str,
        min_challenges: u32,
    ) -> Result<(f64, u32), StoreError> {
        let record = self.get_persona_record(persona).await?;
        let total = record.as_ref().map_or(0, |r| r.total_challenges());
        if total < min_challenges {
            return Ok((1.0, total));
        }
        let rate = record
            .and_then(|r| r.challenge_success_rate())
            .unwrap_or(1.0);
        Ok((rate, total))
    }

    /// Mute once enough challenges exist and the success rate is below threshold
    async fn should_mute_persona(
        &self,
        persona: &str,
        policy: &MutePolicy,
    ) -> Result<bool, StoreError> {
        let (rate, total) = self
            .get_challenge_success_rate(persona, policy.min_challenges)
            .await?;
        Ok(total >= policy.min_challenges && rate < policy.mute_threshold)
    }
}

/// SQLite implementation of [`AccuracyStore`]
#[derive(Debug, Clone)]
pub struct SqliteAccuracyStore {
    pool: SqlitePool,
    weighting: WeightingConfig,
}

impl SqliteAccuracyStore {
    /// Wrap an already-migrated pool
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            weighting: WeightingConfig::default(),
        }
    }

    /// Connect, migrate and wrap
    pub async fn connect(config: &SqliteConfig) -> Result<Self, StoreError> {
        Ok(Self::new(connect(config).await?))
    }

    /// Fresh in-memory store (testing)
    pub async fn memory() -> Result<Self, StoreError> {
        Self::connect(&SqliteConfig::memory()).await
    }

    pub fn with_weighting(mut self, weighting: WeightingConfig) -> Self {
        self.weighting = weighting;
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Open a transaction holding the write lock from its first statement.
    ///
    /// A deferred transaction that reads before writing cannot be upgraded
    /// while another connection writes, and SQLite reports that as
    /// `SQLITE_BUSY` without consulting `busy_timeout`. `BEGIN IMMEDIATE`
    /// queues on the busy handler instead.
    async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, StoreError> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }

    async fn ensure_debate(
        tx: &mut Transaction<'_, Sqlite>,
        debate_id: DebateId,
    ) -> Result<(), StoreError> {
        let exists = sqlx::query("SELECT 1 FROM debate_outcomes WHERE id = ?")
            .bind(debate_id)
            .fetch_optional(&mut **tx)
            .await?;
        match exists {
            Some(_) => Ok(()),
            None => Err(StoreError::DebateNotFound(debate_id)),
        }
    }

    async fn ensure_persona(
        tx: &mut Transaction<'_, Sqlite>,
        persona: &str,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO persona_accuracy (persona_name, last_updated) VALUES (?, ?) \
             ON CONFLICT(persona_name) DO NOTHING",
        )
        .bind(persona)
        .bind(now)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl AccuracyStore for SqliteAccuracyStore {
    async fn register_debate(&self, debate: &NewDebate) -> Result<DebateId, StoreError> {
        let now = Utc::now();
        let personas_json = serde_json::to_string(&debate.personas)?;
        let mut tx = self.begin_write().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO debate_outcomes (ticker, timeframe, model, mode, debate_date, personas)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&debate.ticker)
        .bind(&debate.timeframe)
        .bind(&debate.model)
        .bind(debate.mode.as_str())
        .bind(now)
        .bind(personas_json)
        .execute(&mut *tx)
        .await?;
        let debate_id = result.last_insert_rowid();

        for persona in &debate.personas {
            sqlx::query(
                r#"
                INSERT INTO persona_accuracy (persona_name, debates_participated, last_updated)
                VALUES (?, 1, ?)
                ON CONFLICT(persona_name) DO UPDATE SET
                    debates_participated = debates_participated + 1,
                    last_updated = excluded.last_updated
                "#,
            )
            .bind(persona)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            debate_id,
            ticker = %debate.ticker,
            mode = %debate.mode,
            personas = debate.personas.len(),
            "Debate registered"
        );
        Ok(debate_id)
    }

    async fn record_challenge(
        &self,
        debate_id: DebateId,
        challenge: &NewChallenge,
    ) -> Result<i64, StoreError> {
        let now = Utc::now();
        let mut tx = self.begin_write().await?;
        Self::ensure_debate(&mut tx, debate_id).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO challenges (
                debate_id, round, challenger, target, challenge_summary, response_summary,
                outcome, was_successful, concession, quality_score
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(debate_id)
        .bind(i64::from(challenge.round))
        .bind(&challenge.challenger)
        .bind(&challenge.target)
        .bind(&challenge.challenge_summary)
        .bind(&challenge.response_summary)
        .bind(challenge.outcome.as_str())
        .bind(challenge.was_successful())
        .bind(challenge.is_concession())
        .bind(challenge.quality_score)
        .execute(&mut *tx)
        .await?;
        let challenge_id = result.last_insert_rowid();

        Self::ensure_persona(&mut tx, &challenge.challenger, now).await?;
        let counter_update = if challenge.was_successful() {
            "UPDATE persona_accuracy SET successful_challenges = successful_challenges + 1, last_updated = ? WHERE persona_name = ?"
        } else {
            "UPDATE persona_accuracy SET failed_challenges = failed_challenges + 1, last_updated = ? WHERE persona_name = ?"
        };
        sqlx::query(counter_update)
            .bind(now)
            .bind(&challenge.challenger)
            .execute(&mut *tx)
            .await?;

        if challenge.is_concession() {
            Self::ensure_persona(&mut tx, &challenge.target, now).await?;
            sqlx::query(
                "UPDATE persona_accuracy SET concessions_made = concessions_made + 1, last_updated = ? WHERE persona_name = ?",
            )
            .bind(now)
            .bind(&challenge.target)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        debug!(
            debate_id,
            round = challenge.round,
            challenger = %challenge.challenger,
            target = %challenge.target,
            outcome = %challenge.outcome,
            "Challenge recorded"
        );
        Ok(challenge_id)
    }

    async fn record_votes(
        &self,
        debate_id: DebateId,
        votes: &BTreeMap<String, String>,
        weights: &HashMap<String, f64>,
    ) -> Result<usize, StoreError> {
        let mut tx = self.begin_write().await?;
        Self::ensure_debate(&mut tx, debate_id).await?;

        for (persona, vote) in votes {
            let weight = weights
                .get(persona)
                .copied()
                .unwrap_or(self.weighting.cold_start_weight);
            if !weight.is_finite() || weight < 0.0 {
                return Err(CoreError::OutOfRange {
                    field: "weight",
                    value: weight,
                }
                .into());
            }

            sqlx::query(
                "INSERT INTO persona_votes (debate_id, persona, vote, weight) VALUES (?, ?, ?, ?)",
            )
            .bind(debate_id)
            .bind(persona)
            .bind(vote)
            .bind(weight)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(debate_id, votes = votes.len(), "Votes recorded");
        Ok(votes.len())
    }

    async fn finalize_debate(
        &self,
        debate_id: DebateId,
        resolution: &DebateResolution,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE debate_outcomes SET
                verdict = ?, conviction = ?, rounds_completed = ?, final_confidence = ?,
                total_challenges = ?, successful_challenges = ?, concessions = ?
            WHERE id = ?
            "#,
        )
        .bind(resolution.verdict.as_str())
        .bind(resolution.conviction.as_str())
        .bind(i64::from(resolution.rounds_completed))
        .bind(resolution.final_confidence)
        .bind(i64::from(resolution.total_challenges))
        .bind(i64::from(resolution.successful_challenges))
        .bind(i64::from(resolution.concessions))
        .bind(debate_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::DebateNotFound(debate_id));
        }

        info!(
            debate_id,
            verdict = %resolution.verdict,
            conviction = %resolution.conviction,
            rounds = resolution.rounds_completed,
            confidence = resolution.final_confidence,
            "Debate finalized"
        );

        self.recompute_accuracy().await?;
        Ok(())
    }

    async fn record_outcome(
        &self,
        debate_id: DebateId,
        actual_outcome: Recommendation,
        notes: Option<&str>,
    ) -> Result<usize, StoreError> {
        let now = Utc::now();
        let mut tx = self.begin_write().await?;
        Self::ensure_debate(&mut tx, debate_id).await?;

        sqlx::query(
            "UPDATE debate_outcomes SET actual_outcome = ?, outcome_date = ?, notes = COALESCE(?, notes) WHERE id = ?",
        )
        .bind(actual_outcome.as_str())
        .bind(now)
        .bind(notes)
        .bind(debate_id)
        .execute(&mut *tx)
        .await?;

        let unscored = sqlx::query(
            "SELECT id, persona, vote FROM persona_votes WHERE debate_id = ? AND was_correct IS NULL",
        )
        .bind(debate_id)
        .fetch_all(&mut *tx)
        .await?;

        for row in &unscored {
            let vote_id: i64 = row.try_get("id")?;
            let persona: String = row.try_get("persona")?;
            let vote: String = row.try_get("vote")?;
            let correct = vote
                .parse::<Recommendation>()
                .map(|v| v.matches_outcome(actual_outcome))
                .unwrap_or(false);

            sqlx::query("UPDATE persona_votes SET was_correct = ? WHERE id = ?")
                .bind(correct)
                .bind(vote_id)
                .execute(&mut *tx)
                .await?;

            Self::ensure_persona(&mut tx, &persona, now).await?;
            sqlx::query(
                r#"
                UPDATE persona_accuracy SET
                    votes_total = votes_total + 1,
                    votes_correct = votes_correct + ?,
                    last_updated = ?
                WHERE persona_name = ?
                "#,
            )
            .bind(i64::from(correct))
            .bind(now)
            .bind(&persona)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            debate_id,
            outcome = %actual_outcome,
            votes_scored = unscored.len(),
            "Outcome recorded"
        );

        self.recompute_accuracy().await?;
        Ok(unscored.len())
    }

    async fn recompute_accuracy(&self) -> Result<usize, StoreError> {
        let now = Utc::now();
        let mut tx = self.begin_write().await?;

        let rows = sqlx::query("SELECT * FROM persona_accuracy")
            .fetch_all(&mut *tx)
            .await?;

        let mut updated = 0;
        for row in &rows {
            let record = persona_from_row(row)?;
            let score = record.computed_accuracy();
            sqlx::query(
                "UPDATE persona_accuracy SET accuracy_score = ?, last_updated = ? WHERE persona_name = ?",
            )
            .bind(score)
            .bind(now)
            .bind(&record.persona)
            .execute(&mut *tx)
            .await?;
            updated += 1;
        }

        tx.commit().await?;

        metrics::counter!("tribunal_accuracy_recomputes_total").increment(1);
        debug!(personas = updated, "Accuracy scores recomputed");
        Ok(updated)
    }

    async fn get_persona_record(
        &self,
        persona: &str,
    ) -> Result<Option<PersonaAccuracyRecord>, StoreError> {
        let row = sqlx::query("SELECT * FROM persona_accuracy WHERE persona_name = ?")
            .bind(persona)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(persona_from_row).transpose()
    }

    async fn list_persona_records(&self) -> Result<Vec<PersonaAccuracyRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM persona_accuracy ORDER BY accuracy_score DESC, persona_name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(persona_from_row).collect()
    }

    async fn get_debate(&self, debate_id: DebateId) -> Result<DebateRecord, StoreError> {
        let row = sqlx::query("SELECT * FROM debate_outcomes WHERE id = ?")
            .bind(debate_id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => debate_from_row(&row),
            None => Err(StoreError::DebateNotFound(debate_id)),
        }
    }

    async fn recent_debates(&self, limit: u32) -> Result<Vec<DebateRecord>, StoreError> {
        let rows = sqlx::query("SELECT * FROM debate_outcomes ORDER BY id DESC LIMIT ?")
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(debate_from_row).collect()
    }

    async fn debate_challenges(
        &self,
        debate_id: DebateId,
    ) -> Result<Vec<ChallengeRecord>, StoreError> {
        let rows = sqlx::query("SELECT * FROM challenges WHERE debate_id = ? ORDER BY round, id")
            .bind(debate_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(challenge_from_row).collect()
    }

    async fn debate_votes(
        &self,
        debate_id: DebateId,
    ) -> Result<Vec<PersonaVoteRecord>, StoreError> {
        let rows = sqlx::query("SELECT * FROM persona_votes WHERE debate_id = ? ORDER BY id")
            .bind(debate_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(vote_from_row).collect()
    }

    fn weighting(&self) -> &WeightingConfig {
        &self.weighting
    }
}

fn count(row: &SqliteRow, column: &str) -> Result<u32, sqlx::Error> {
    let value: i64 = row.try_get(column)?;
    Ok(u32::try_from(value.max(0)).unwrap_or(u32::MAX))
}

fn persona_from_row(row: &SqliteRow) -> Result<PersonaAccuracyRecord, StoreError> {
    Ok(PersonaAccuracyRecord {
        persona: row.try_get("persona_name")?,
        debates_participated: count(row, "debates_participated")?,
        successful_challenges: count(row, "successful_challenges")?,
        failed_challenges: count(row, "failed_challenges")?,
        concessions_made: count(row, "concessions_made")?,
        votes_correct: count(row, "votes_correct")?,
        votes_total: count(row, "votes_total")?,
        accuracy_score: row.try_get("accuracy_score")?,
        last_updated: row.try_get("last_updated")?,
    })
}

fn debate_from_row(row: &SqliteRow) -> Result<DebateRecord, StoreError> {
    let personas_json: String = row.try_get("personas")?;
    let mode: String = row.try_get("mode")?;
    let verdict: Option<String> = row.try_get("verdict")?;
    let conviction: Option<String> = row.try_get("conviction")?;
    let actual_outcome: Option<String> = row.try_get("actual_outcome")?;

    Ok(DebateRecord {
        id: row.try_get("id")?,
        ticker: row.try_get("ticker")?,
        timeframe: row.try_get("timeframe")?,
        model: row.try_get("model")?,
        mode: mode.parse()?,
        personas: serde_json::from_str(&personas_json)?,
        verdict: verdict.map(|v| v.parse()).transpose()?,
        conviction: conviction.map(|c| c.parse()).transpose()?,
        rounds_completed: count(row, "rounds_completed")?,
        final_confidence: row.try_get("final_confidence")?,
        total_challenges: count(row, "total_challenges")?,
        successful_challenges: count(row, "successful_challenges")?,
        concessions: count(row, "concessions")?,
        actual_outcome: actual_outcome.map(|o| o.parse()).transpose()?,
        outcome_date: row.try_get("outcome_date")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("debate_date")?,
    })
}

fn challenge_from_row(row: &SqliteRow) -> Result<ChallengeRecord, StoreError> {
    let outcome: String = row.try_get("outcome")?;
    Ok(ChallengeRecord {
        id: row.try_get("id")?,
        debate_id: row.try_get("debate_id")?,
        round: count(row, "round")?,
        challenger: row.try_get("challenger")?,
        target: row.try_get("target")?,
        challenge_summary: row.try_get("challenge_summary")?,
        response_summary: row.try_get("response_summary")?,
        outcome: outcome.parse()?,
        was_successful: row.try_get("was_successful")?,
        concession: row.try_get("concession")?,
        quality_score: row.try_get("quality_score")?,
    })
}

fn vote_from_row(row: &SqliteRow) -> Result<PersonaVoteRecord, StoreError> {
    Ok(PersonaVoteRecord {
        id: row.try_get("id")?,
        debate_id: row.try_get("debate_id")?,
        persona: row.try_get("persona")?,
        vote: row.try_get("vote")?,
        weight: row.try_get("weight")?,
        was_correct: row.try_get("was_correct")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tribunal_core::{ChallengeOutcome, DebateMode};

    fn roster(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    async fn debate(store: &SqliteAccuracyStore, names: &[&str]) -> DebateId {
        let new = NewDebate::new("AAPL", "3m", "growth", DebateMode::Parallel, roster(names)).unwrap();
        store.register_debate(&new).await.unwrap()
    }

    #[tokio::test]
    async fn test_register_creates_persona_records_lazily() {
        let store = SqliteAccuracyStore::memory().await.unwrap();
        assert!(store.get_persona_record("value_investor").await.unwrap().is_none());

        debate(&store, &["value_investor", "contrarian"]).await;
        debate(&store, &["value_investor"]).await;

        let record = store.get_persona_record("value_investor").await.unwrap().unwrap();
        assert_eq!(record.debates_participated, 2);
        assert_eq!(record.accuracy_score, 0.5);

        let contrarian = store.get_persona_record("contrarian").await.unwrap().unwrap();
        assert_eq!(contrarian.debates_participated, 1);
    }

    #[tokio::test]
    async fn test_concession_credits_both_sides() {
        let store = SqliteAccuracyStore::memory().await.unwrap();
        let id = debate(&store, &["contrarian", "value_investor"]).await;

        let challenge = NewChallenge::new(
            1,
            "contrarian",
            "value_investor",
            "Book value is stale",
            "You're right",
            ChallengeOutcome::Conceded,
            1.0,
        )
        .unwrap();
        store.record_challenge(id, &challenge).await.unwrap();

        let challenger = store.get_persona_record("contrarian").await.unwrap().unwrap();
        let target = store.get_persona_record("value_investor").await.unwrap().unwrap();
        assert_eq!(challenger.successful_challenges, 1);
        assert_eq!(challenger.failed_challenges, 0);
        assert_eq!(target.concessions_made, 1);

        let stored = store.debate_challenges(id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].outcome, ChallengeOutcome::Conceded);
        assert!(stored[0].concession);
    }

    #[tokio::test]
    async fn test_unknown_debate_is_an_error() {
        let store = SqliteAccuracyStore::memory().await.unwrap();
        let challenge = NewChallenge::new(1, "a", "b", "x", "y", ChallengeOutcome::Irrelevant, -1.0).unwrap();

        assert!(matches!(
            store.record_challenge(42, &challenge).await,
            Err(StoreError::DebateNotFound(42))
        ));
        assert!(matches!(
            store.record_votes(42, &BTreeMap::new(), &HashMap::new()).await,
            Err(StoreError::DebateNotFound(42))
        ));
        let resolution = DebateResolution::new(Recommendation::Buy, 3, 0.5, 0, 0, 0).unwrap();
        assert!(matches!(
            store.finalize_debate(42, &resolution).await,
            Err(StoreError::DebateNotFound(42))
        ));
        assert!(matches!(
            store.record_outcome(42, Recommendation::Buy, None).await,
            Err(StoreError::DebateNotFound(42))
        ));
        assert!(matches!(store.get_debate(42).await, Err(StoreError::DebateNotFound(42))));
    }

    #[tokio::test]
    async fn test_unknown_persona_gets_cold_start_defaults() {
        let store = SqliteAccuracyStore::memory().await.unwrap();
        assert_eq!(store.get_persona_weight("nobody", 10).await.unwrap(), 0.5);
        assert_eq!(store.get_challenge_success_rate("nobody", 3).await.unwrap(), (1.0, 0));
        assert!(!store.should_mute_persona("nobody", &MutePolicy::default()).await.unwrap());
    }

    #[tokio::test]
    async fn test_record_votes_rejects_negative_weight() {
        let store = SqliteAccuracyStore::memory().await.unwrap();
        let id = debate(&store, &["a"]).await;
        let votes: BTreeMap<String, String> = [("a".to_string(), "BUY".to_string())].into_iter().collect();
        let weights: HashMap<String, f64> = [("a".to_string(), -0.2)].into_iter().collect();

        assert!(matches!(
            store.record_votes(id, &votes, &weights).await,
            Err(StoreError::Invalid(_))
        ));
        assert!(store.debate_votes(id).await.unwrap().is_empty());
    }
}
