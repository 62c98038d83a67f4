//! Orchestrator - drives one debate from registration to verdict

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use tribunal_adversarial::{
    BeliefTracker, ChallengeBatch, ChallengeScorer, ChallengerTally, ConvergenceCheck,
    DebateTranscript, IssuedChallenge, ResponsePrompt, ScoredChallenge,
};
use tribunal_core::{
    BeliefState, ConvergenceConfig, DebateId, DebateMode, DebateResolution, EngineConfig,
    MutePolicy, NewChallenge, NewDebate, Recommendation,
};
use tribunal_persist::AccuracyStore;

use crate::error::OrchestratorError;
use crate::mode::ProtocolPlan;

/// Stored challenge and response text is cut to this many characters
pub const SUMMARY_CHARS: usize = 500;

/// Configuration for the orchestrator
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub convergence: ConvergenceConfig,
    /// Debates before a persona's accuracy counts toward its weight
    pub min_debates: u32,
    pub muting: MutePolicy,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

impl From<&EngineConfig> for OrchestratorConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            convergence: config.convergence.clone(),
            min_debates: config.weighting.min_debates,
            muting: config.muting.clone(),
        }
    }
}

/// Snapshot of a debate's state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateSummary {
    pub debate_id: DebateId,
    pub ticker: String,
    pub mode: DebateMode,
    pub personas: Vec<String>,
    pub muted_personas: Vec<String>,
    pub rounds_completed: u32,
    pub current_verdict: Recommendation,
    pub confidence: f64,
    pub converged: bool,
    pub reason: String,
    pub total_challenges: u32,
    pub successful_challenges: u32,
    pub concessions: u32,
}

/// Result of scoring one round of responses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundScores {
    pub scored: Vec<ScoredChallenge>,
    /// Cumulative tallies for the whole debate, by challenger
    pub by_challenger: BTreeMap<String, ChallengerTally>,
    /// Personas muted by this call
    pub newly_muted: Vec<String>,
}

#[derive(Debug)]
struct DebateSession {
    debate_id: DebateId,
    ticker: String,
    plan: ProtocolPlan,
    muted: BTreeSet<String>,
    tracker: BeliefTracker,
    tallies: BTreeMap<String, ChallengerTally>,
    transcript: DebateTranscript,
    weights: HashMap<String, f64>,
    last_round: u32,
}

impl DebateSession {
    fn is_participant(&self, persona: &str) -> bool {
        self.plan.roster.iter().any(|p| p == persona)
    }

    fn rounds_completed(&self) -> u32 {
        self.last_round.max(self.tracker.round())
    }

    fn totals(&self) -> (u32, u32, u32) {
        self.tallies.values().fold((0, 0, 0), |(t, s, c), tally| {
            (t + tally.total(), s + tally.successes, c + tally.concessions)
        })
    }

    fn summary(&self, check: &ConvergenceCheck) -> DebateSummary {
        let (total, successful, concessions) = self.totals();
        DebateSummary {
            debate_id: self.debate_id,
            ticker: self.ticker.clone(),
            mode: self.plan.mode,
            personas: self.plan.roster.clone(),
            muted_personas: self.muted.iter().cloned().collect(),
            rounds_completed: self.rounds_completed(),
            current_verdict: check.verdict,
            confidence: check.confidence,
            converged: check.converged,
            reason: check.reason.clone(),
            total_challenges: total,
            successful_challenges: successful,
            concessions,
        }
    }
}

/// Coordinates a debate: challenge routing, scoring, muting, belief
/// updates and finalization.
///
/// One orchestrator runs one debate at a time. Concurrent debates use
/// separate orchestrators sharing the same store.
pub struct DebateOrchestrator {
    pub config: OrchestratorConfig,
    store: Arc<dyn AccuracyStore>,
    scorer: Arc<dyn ChallengeScorer>,
    session: RwLock<Option<DebateSession>>,
}

impl DebateOrchestrator {
    pub fn new(
        store: Arc<dyn AccuracyStore>,
        scorer: Arc<dyn ChallengeScorer>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            config,
            store,
            scorer,
            session: RwLock::new(None),
        }
    }

    pub fn store(&self) -> &Arc<dyn AccuracyStore> {
        &self.store
    }

    /// Id of the debate in progress, if any
    pub async fn active_debate(&self) -> Option<DebateId> {
        self.session.read().await.as_ref().map(|s| s.debate_id)
    }

    /// Register a debate and reset per-debate state.
    ///
    /// The protocol shape follows `mode`; use
    /// [`DebateOrchestrator::start_with_plan`] for a selected plan.
    pub async fn start_debate(
        &self,
        ticker: &str,
        timeframe: &str,
        model: &str,
        mode: DebateMode,
        personas: Vec<String>,
    ) -> Result<DebateId, OrchestratorError> {
        let plan = ProtocolPlan::for_mode(mode, personas, self.config.convergence.max_rounds);
        self.start_with_plan(ticker, timeframe, model, plan).await
    }

    pub async fn start_with_plan(
        &self,
        ticker: &str,
        timeframe: &str,
        model: &str,
        plan: ProtocolPlan,
    ) -> Result<DebateId, OrchestratorError> {
        let mut session = self.session.write().await;
        if let Some(active) = session.as_ref() {
            return Err(OrchestratorError::DebateAlreadyActive(active.debate_id));
        }

        let request = NewDebate::new(ticker, timeframe, model, plan.mode, plan.roster.clone())?;
        let debate_id = self.store.register_debate(&request).await?;

        info!(
            debate_id,
            ticker = %request.ticker,
            mode = %plan.mode,
            personas = plan.roster.len(),
            max_rounds = plan.max_rounds,
            "Debate started"
        );

        *session = Some(DebateSession {
            debate_id,
            ticker: request.ticker,
            plan,
            muted: BTreeSet::new(),
            tracker: BeliefTracker::new(self.config.convergence.clone()),
            tallies: BTreeMap::new(),
            transcript: DebateTranscript::default(),
            weights: HashMap::new(),
            last_round: 0,
        });
        Ok(debate_id)
    }

    /// Route `(challenger, target, text)` triples into per-target batches.
    ///
    /// Batches keep the order in which targets were first challenged. In
    /// sequential debates every challenge is its own batch. Challenges
    /// involving muted or unknown personas, and self-challenges, are dropped.
    pub async fn process_challenges(
        &self,
        round: u32,
        challenges: &[(&str, &str, &str)],
    ) -> Result<Vec<ChallengeBatch>, OrchestratorError> {
        let mut guard = self.session.write().await;
        let session = guard.as_mut().ok_or(OrchestratorError::NoActiveDebate)?;
        session.last_round = session.last_round.max(round);

        let mut batches: Vec<ChallengeBatch> = Vec::new();
        for &(challenger, target, text) in challenges {
            if !session.is_participant(challenger) || !session.is_participant(target) {
                warn!(round, challenger, target, "Dropping challenge outside the roster");
                continue;
            }
            if challenger == target {
                warn!(round, challenger, "Dropping self-challenge");
                continue;
            }
            if session.muted.contains(challenger) || session.muted.contains(target) {
                debug!(round, challenger, target, "Dropping challenge involving muted persona");
                continue;
            }

            let issued = IssuedChallenge::new(round, challenger, target, text);
            let existing = if session.plan.batched {
                batches.iter().position(|b| b.target == target)
            } else {
                None
            };
            match existing {
                Some(index) => batches[index].challenges.push(issued),
                None => {
                    let mut batch = ChallengeBatch::new(round, target);
                    batch.challenges.push(issued);
                    batches.push(batch);
                }
            }
        }

        debug!(
            debate_id = session.debate_id,
            round,
            batches = batches.len(),
            "Challenges routed"
        );
        Ok(batches)
    }

    /// One prompt per batch whose target is still unmuted
    pub async fn get_response_prompts(
        &self,
        batches: &[ChallengeBatch],
    ) -> Result<Vec<ResponsePrompt>, OrchestratorError> {
        let guard = self.session.read().await;
        let session = guard.as_ref().ok_or(OrchestratorError::NoActiveDebate)?;

        Ok(batches
            .iter()
            .filter_map(|batch| live_batch(session, batch))
            .map(|batch| ResponsePrompt::for_batch(&batch))
            .collect())
    }

    /// Score every challenge in `batches` against its target's response.
    ///
    /// `responses` maps target to response text; a target without one is
    /// scored against an empty response. Each exchange is persisted before
    /// muting is decided, so the mute check sees this debate's evidence.
    ///
    /// A target answers at most one batch per call. Sequential debates issue
    /// one batch per challenge, so their callers score each batch with its
    /// own call; two live batches for the same target are rejected with
    /// [`OrchestratorError::AmbiguousResponse`] before anything is recorded.
    pub async fn score_responses(
        &self,
        batches: &[ChallengeBatch],
        responses: &HashMap<String, String>,
    ) -> Result<RoundScores, OrchestratorError> {
        let mut guard = self.session.write().await;
        let session = guard.as_mut().ok_or(OrchestratorError::NoActiveDebate)?;

        let mut scored = Vec::new();
        let mut challengers: Vec<String> = Vec::new();

        let live: Vec<ChallengeBatch> = batches
            .iter()
            .filter_map(|b| live_batch(session, b))
            .collect();
        for (i, batch) in live.iter().enumerate() {
            if live[..i].iter().any(|earlier| earlier.target == batch.target) {
                return Err(OrchestratorError::AmbiguousResponse {
                    round: batch.round,
                    target: batch.target.clone(),
                });
            }
        }

        for batch in live {
            let response = responses.get(&batch.target).map(String::as_str).unwrap_or("");
            if response.is_empty() {
                warn!(round = batch.round, target = %batch.target, "No response supplied");
            }

            for challenge in batch.challenges {
                let score = self.scorer.score(&challenge.text, response);
                let record = NewChallenge::new(
                    challenge.round,
                    &challenge.challenger,
                    &challenge.target,
                    &summarize(&challenge.text),
                    &summarize(response),
                    score.outcome,
                    score.quality,
                )?;
                self.store.record_challenge(session.debate_id, &record).await?;

                debug!(
                    round = challenge.round,
                    challenger = %challenge.challenger,
                    target = %challenge.target,
                    outcome = %score.outcome,
                    reason = %score.reason,
                    "Challenge scored"
                );
                metrics::counter!("tribunal_challenges_scored_total").increment(1);

                session
                    .tallies
                    .entry(challenge.challenger.clone())
                    .or_default()
                    .record(&score);
                if !challengers.contains(&challenge.challenger) {
                    challengers.push(challenge.challenger.clone());
                }

                let entry = ScoredChallenge {
                    challenge,
                    response: response.to_string(),
                    score,
                };
                session
                    .transcript
                    .round_mut(entry.challenge.round)
                    .scored
                    .push(entry.clone());
                scored.push(entry);
            }
        }

        let mut newly_muted = Vec::new();
        if session.plan.muting_enabled {
            for persona in challengers {
                if session.muted.contains(&persona) {
                    continue;
                }
                if self
                    .store
                    .should_mute_persona(&persona, &self.config.muting)
                    .await?
                {
                    info!(
                        debate_id = session.debate_id,
                        persona = %persona,
                        "Persona muted for the rest of the debate"
                    );
                    metrics::counter!("tribunal_personas_muted_total").increment(1);
                    session.muted.insert(persona.clone());
                    newly_muted.push(persona);
                }
            }
        }

        Ok(RoundScores {
            scored,
            by_challenger: session.tallies.clone(),
            newly_muted,
        })
    }

    /// Fold a round of votes into the belief using current persona weights.
    /// Muted personas still vote.
    pub async fn update_bayesian(
        &self,
        votes: &BTreeMap<String, String>,
    ) -> Result<BeliefState, OrchestratorError> {
        self.update_bayesian_filtered(votes, false).await
    }

    pub async fn update_bayesian_filtered(
        &self,
        votes: &BTreeMap<String, String>,
        exclude_muted: bool,
    ) -> Result<BeliefState, OrchestratorError> {
        let mut guard = self.session.write().await;
        let session = guard.as_mut().ok_or(OrchestratorError::NoActiveDebate)?;

        let weights = self
            .store
            .get_persona_weights(&session.plan.roster, self.config.min_debates)
            .await?;

        let counted: BTreeMap<String, String> = votes
            .iter()
            .filter(|(persona, _)| {
                let known = session.is_participant(persona);
                if !known {
                    warn!(persona = %persona, "Ignoring vote from outside the roster");
                }
                known && !(exclude_muted && session.muted.contains(*persona))
            })
            .map(|(p, v)| (p.clone(), v.clone()))
            .collect();

        let belief = session.tracker.update(&counted, &weights);
        session.transcript.round_mut(belief.round).belief = Some(belief);
        session.weights = weights;
        Ok(belief)
    }

    /// Persist final votes with the weights they were counted at
    pub async fn record_final_votes(
        &self,
        votes: &BTreeMap<String, String>,
    ) -> Result<usize, OrchestratorError> {
        let mut guard = self.session.write().await;
        let session = guard.as_mut().ok_or(OrchestratorError::NoActiveDebate)?;

        if session.weights.is_empty() {
            session.weights = self
                .store
                .get_persona_weights(&session.plan.roster, self.config.min_debates)
                .await?;
        }
        Ok(self
            .store
            .record_votes(session.debate_id, votes, &session.weights)
            .await?)
    }

    pub async fn check_convergence(&self) -> Result<ConvergenceCheck, OrchestratorError> {
        let guard = self.session.read().await;
        let session = guard.as_ref().ok_or(OrchestratorError::NoActiveDebate)?;
        Ok(session.tracker.check_convergence())
    }

    /// Whether another round should run
    pub async fn should_continue(&self) -> Result<bool, OrchestratorError> {
        let guard = self.session.read().await;
        let session = guard.as_ref().ok_or(OrchestratorError::NoActiveDebate)?;

        if session.rounds_completed() >= session.plan.max_rounds {
            return Ok(false);
        }
        if session.plan.convergence_enabled {
            return Ok(!session.tracker.check_convergence().converged);
        }
        Ok(true)
    }

    /// Weights used by the latest belief update
    pub async fn current_weights(&self) -> Result<HashMap<String, f64>, OrchestratorError> {
        let guard = self.session.read().await;
        let session = guard.as_ref().ok_or(OrchestratorError::NoActiveDebate)?;
        Ok(session.weights.clone())
    }

    pub async fn muted_personas(&self) -> Result<BTreeSet<String>, OrchestratorError> {
        let guard = self.session.read().await;
        let session = guard.as_ref().ok_or(OrchestratorError::NoActiveDebate)?;
        Ok(session.muted.clone())
    }

    pub async fn transcript(&self) -> Result<DebateTranscript, OrchestratorError> {
        let guard = self.session.read().await;
        let session = guard.as_ref().ok_or(OrchestratorError::NoActiveDebate)?;
        Ok(session.transcript.clone())
    }

    pub async fn summary(&self) -> Result<DebateSummary, OrchestratorError> {
        let guard = self.session.read().await;
        let session = guard.as_ref().ok_or(OrchestratorError::NoActiveDebate)?;
        Ok(session.summary(&session.tracker.check_convergence()))
    }

    /// Finalize with the verdict implied by the current belief
    pub async fn finalize_debate(&self) -> Result<DebateSummary, OrchestratorError> {
        self.finalize(None).await
    }

    /// Finalize with a caller-supplied verdict, as fast debates do
    pub async fn finalize_with_verdict(
        &self,
        verdict: Recommendation,
        confidence: f64,
    ) -> Result<DebateSummary, OrchestratorError> {
        self.finalize(Some((verdict, confidence))).await
    }

    async fn finalize(
        &self,
        verdict: Option<(Recommendation, f64)>,
    ) -> Result<DebateSummary, OrchestratorError> {
        let mut guard = self.session.write().await;
        let session = guard.as_ref().ok_or(OrchestratorError::NoActiveDebate)?;

        let mut check = session.tracker.check_convergence();
        if let Some((verdict, confidence)) = verdict {
            check.verdict = verdict;
            check.confidence = confidence;
            check.reason = format!(
                "Verdict {} supplied after {} round(s)",
                verdict,
                session.rounds_completed()
            );
        }

        let summary = session.summary(&check);
        let resolution = DebateResolution::new(
            summary.current_verdict,
            summary.rounds_completed,
            summary.confidence,
            summary.total_challenges,
            summary.successful_challenges,
            summary.concessions,
        )?;
        self.store
            .finalize_debate(session.debate_id, &resolution)
            .await?;

        metrics::counter!("tribunal_debates_finalized_total").increment(1);
        info!(
            debate_id = summary.debate_id,
            verdict = %resolution.verdict,
            conviction = %resolution.conviction,
            rounds = summary.rounds_completed,
            muted = summary.muted_personas.len(),
            "Debate finalized"
        );

        *guard = None;
        Ok(summary)
    }
}

/// `batch` minus challenges from muted personas; `None` when the target is
/// muted or nothing is left
fn live_batch(session: &DebateSession, batch: &ChallengeBatch) -> Option<ChallengeBatch> {
    if session.muted.contains(&batch.target) {
        return None;
    }
    let challenges: Vec<IssuedChallenge> = batch
        .challenges
        .iter()
        .filter(|c| !session.muted.contains(&c.challenger))
        .cloned()
        .collect();
    if challenges.is_empty() {
        return None;
    }
    Some(ChallengeBatch {
        round: batch.round,
        target: batch.target.clone(),
        challenges,
    })
}

fn summarize(text: &str) -> String {
    let text = text.trim();
    match text.char_indices().nth(SUMMARY_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
