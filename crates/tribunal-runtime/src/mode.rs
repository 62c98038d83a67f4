//! Protocol selection: roster and debate shape from timeframe and model

use serde::{Deserialize, Serialize};
use tracing::debug;

use tribunal_core::{CoreError, DebateMode, EngineConfig, ModeConfig, Timeframe};

/// How a debate will be run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolPlan {
    pub mode: DebateMode,
    pub roster: Vec<String>,
    pub max_rounds: u32,
    /// Challenges grouped per target; false issues them one at a time
    pub batched: bool,
    pub muting_enabled: bool,
    pub voting_enabled: bool,
    pub convergence_enabled: bool,
}

impl ProtocolPlan {
    /// Protocol shape implied by `mode`.
    ///
    /// Fast debates run exactly one round with no voting, muting or
    /// convergence; `max_rounds` only applies to the other modes.
    pub fn for_mode(mode: DebateMode, roster: Vec<String>, max_rounds: u32) -> Self {
        match mode {
            DebateMode::Fast => Self {
                mode,
                roster,
                max_rounds: 1,
                batched: true,
                muting_enabled: false,
                voting_enabled: false,
                convergence_enabled: false,
            },
            DebateMode::Parallel | DebateMode::Sequential => Self {
                mode,
                roster,
                max_rounds: max_rounds.max(1),
                batched: mode == DebateMode::Parallel,
                muting_enabled: true,
                voting_enabled: true,
                convergence_enabled: true,
            },
        }
    }
}

/// Chooses between fast, parallel and sequential debates
#[derive(Debug, Clone)]
pub struct ModeSelector {
    modes: ModeConfig,
    max_rounds: u32,
}

impl Default for ModeSelector {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl ModeSelector {
    pub fn new(modes: ModeConfig, max_rounds: u32) -> Self {
        Self { modes, max_rounds }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.modes.clone(), config.convergence.max_rounds)
    }

    /// Case-insensitive match against the configured scalping-style models
    pub fn is_scalping(&self, model: &str) -> bool {
        let model = model.trim();
        self.modes
            .scalping_models
            .iter()
            .any(|m| m.eq_ignore_ascii_case(model))
    }

    /// Pick the protocol.
    ///
    /// Short horizon with a scalping-style model runs fast. Otherwise the
    /// full roster debates in parallel, or sequentially when turn-order
    /// auditability is required.
    pub fn select(&self, timeframe: &Timeframe, model: &str, audit_required: bool) -> ProtocolPlan {
        let plan = if timeframe.is_short(self.modes.fast_max_days) && self.is_scalping(model) {
            ProtocolPlan::for_mode(DebateMode::Fast, self.modes.fast_roster.clone(), 1)
        } else if audit_required {
            ProtocolPlan::for_mode(
                DebateMode::Sequential,
                self.modes.full_roster.clone(),
                self.max_rounds,
            )
        } else {
            ProtocolPlan::for_mode(
                DebateMode::Parallel,
                self.modes.full_roster.clone(),
                self.max_rounds,
            )
        };

        debug!(
            timeframe = %timeframe,
            days = timeframe.days,
            model,
            audit_required,
            mode = %plan.mode,
            personas = plan.roster.len(),
            "Protocol selected"
        );
        plan
    }

    /// [`ModeSelector::select`] with a timeframe label such as `3d` or `swing`
    pub fn select_label(
        &self,
        timeframe: &str,
        model: &str,
        audit_required: bool,
    ) -> Result<ProtocolPlan, CoreError> {
        let timeframe: Timeframe = timeframe.parse()?;
        Ok(self.select(&timeframe, model, audit_required))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_scalping_runs_fast() {
        let selector = ModeSelector::default();
        let plan = selector.select_label("1d", "Scalping", false).unwrap();

        assert_eq!(plan.mode, DebateMode::Fast);
        assert_eq!(
            plan.roster,
            vec!["technical_analyst", "momentum_trader", "risk_manager"]
        );
        assert_eq!(plan.max_rounds, 1);
        assert!(!plan.voting_enabled);
        assert!(!plan.convergence_enabled);
        assert!(!plan.muting_enabled);
    }

    #[test]
    fn test_fast_needs_both_conditions() {
        let selector = ModeSelector::default();
        // Short horizon, long-term model
        assert_eq!(
            selector.select_label("intraday", "value", false).unwrap().mode,
            DebateMode::Parallel
        );
        // Scalping model, long horizon
        assert_eq!(
            selector.select_label("swing", "day_trading", false).unwrap().mode,
            DebateMode::Parallel
        );
        // Boundary is inclusive
        assert_eq!(
            selector.select_label("3d", "day_trading", true).unwrap().mode,
            DebateMode::Fast
        );
    }

    #[test]
    fn test_default_is_parallel_full_roster() {
        let plan = ModeSelector::default().select_label("3m", "growth", false).unwrap();
        assert_eq!(plan.mode, DebateMode::Parallel);
        assert_eq!(plan.roster.len(), 7);
        assert_eq!(plan.max_rounds, 5);
        assert!(plan.batched);
        assert!(plan.muting_enabled && plan.voting_enabled && plan.convergence_enabled);
    }

    #[test]
    fn test_audit_selects_sequential() {
        let plan = ModeSelector::default().select_label("1y", "value", true).unwrap();
        assert_eq!(plan.mode, DebateMode::Sequential);
        assert!(!plan.batched);
        assert!(plan.convergence_enabled);
    }

    #[test]
    fn test_configured_thresholds() {
        let config = EngineConfig::from_lookup(|key| match key {
            "TRIBUNAL_FAST_MAX_DAYS" => Some("10".to_string()),
            "TRIBUNAL_SCALPING_MODELS" => Some("momentum".to_string()),
            "TRIBUNAL_MAX_ROUNDS" => Some("8".to_string()),
            _ => None,
        });
        let selector = ModeSelector::from_config(&config);

        assert_eq!(selector.select_label("1w", "MOMENTUM", false).unwrap().mode, DebateMode::Fast);
        assert!(!selector.is_scalping("scalping"));
        assert_eq!(selector.select_label("2w", "momentum", false).unwrap().max_rounds, 8);
    }

    #[test]
    fn test_bad_timeframe_is_an_error() {
        assert!(ModeSelector::default().select_label("soon", "scalping", false).is_err());
    }
}
