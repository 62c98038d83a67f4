//! Engine configuration
//!
//! Defaults match the documented protocol; every knob can be overridden
//! through `TRIBUNAL_*` environment variables via [`EngineConfig::from_env`].

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::warn;

/// Stopping rules for the belief tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceConfig {
    /// Confidence at which the debate stops (env: TRIBUNAL_CONVERGENCE_THRESHOLD)
    pub threshold: f64,
    /// Rounds that must elapse before any stop (env: TRIBUNAL_MIN_ROUNDS)
    pub min_rounds: u32,
    /// Hard cap on rounds for multi-round modes (env: TRIBUNAL_MAX_ROUNDS)
    pub max_rounds: u32,
    /// Confidence change below which the debate has stagnated (env: TRIBUNAL_STAGNATION_DELTA)
    pub stagnation_delta: f64,
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            threshold: 0.90,
            min_rounds: 3,
            max_rounds: 5,
            stagnation_delta: 0.05,
        }
    }
}

/// How historical accuracy turns into vote weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightingConfig {
    /// Debates required before accuracy counts (env: TRIBUNAL_MIN_DEBATES)
    pub min_debates: u32,
    /// Weight used below `min_debates`
    pub cold_start_weight: f64,
    pub floor: f64,
    pub ceiling: f64,
}

impl Default for WeightingConfig {
    fn default() -> Self {
        Self {
            min_debates: 10,
            cold_start_weight: 0.5,
            floor: 0.1,
            ceiling: 1.0,
        }
    }
}

impl WeightingConfig {
    /// `clamp(0.5 + (accuracy - 0.5), floor, ceiling)`
    pub fn weight_for(&self, debates_participated: u32, accuracy_score: f64) -> f64 {
        if debates_participated < self.min_debates {
            return self.cold_start_weight;
        }
        (0.5 + (accuracy_score - 0.5)).clamp(self.floor, self.ceiling)
    }
}

/// When a chronically unsuccessful challenger gets muted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutePolicy {
    /// Success rate below which a persona is muted (env: TRIBUNAL_MUTE_THRESHOLD)
    pub mute_threshold: f64,
    /// Challenges required before muting can trigger (env: TRIBUNAL_MIN_CHALLENGES)
    pub min_challenges: u32,
}

impl Default for MutePolicy {
    fn default() -> Self {
        Self {
            mute_threshold: 0.30,
            min_challenges: 3,
        }
    }
}

/// Inputs for protocol selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModeConfig {
    /// Longest horizon still eligible for fast mode (env: TRIBUNAL_FAST_MAX_DAYS)
    pub fast_max_days: u32,
    /// Models treated as scalping-style (env: TRIBUNAL_SCALPING_MODELS, comma separated)
    pub scalping_models: Vec<String>,
    /// Roster for parallel/sequential debates (env: TRIBUNAL_FULL_ROSTER)
    pub full_roster: Vec<String>,
    /// Roster for fast debates (env: TRIBUNAL_FAST_ROSTER)
    pub fast_roster: Vec<String>,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            fast_max_days: 3,
            scalping_models: vec!["scalping".to_string(), "day_trading".to_string()],
            full_roster: [
                "value_investor",
                "growth_investor",
                "technical_analyst",
                "macro_strategist",
                "risk_manager",
                "contrarian",
                "quant_analyst",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            fast_roster: ["technical_analyst", "momentum_trader", "risk_manager"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Full engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub convergence: ConvergenceConfig,
    pub weighting: WeightingConfig,
    pub muting: MutePolicy,
    pub modes: ModeConfig,
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Overlay values from `lookup` on the defaults. Values that fail to
    /// parse are ignored with a warning.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        override_parsed(&lookup, "TRIBUNAL_CONVERGENCE_THRESHOLD", &mut config.convergence.threshold);
        override_parsed(&lookup, "TRIBUNAL_MIN_ROUNDS", &mut config.convergence.min_rounds);
        override_parsed(&lookup, "TRIBUNAL_MAX_ROUNDS", &mut config.convergence.max_rounds);
        override_parsed(&lookup, "TRIBUNAL_STAGNATION_DELTA", &mut config.convergence.stagnation_delta);
        override_parsed(&lookup, "TRIBUNAL_MIN_DEBATES", &mut config.weighting.min_debates);
        override_parsed(&lookup, "TRIBUNAL_MUTE_THRESHOLD", &mut config.muting.mute_threshold);
        override_parsed(&lookup, "TRIBUNAL_MIN_CHALLENGES", &mut config.muting.min_challenges);
        override_parsed(&lookup, "TRIBUNAL_FAST_MAX_DAYS", &mut config.modes.fast_max_days);
        override_list(&lookup, "TRIBUNAL_SCALPING_MODELS", &mut config.modes.scalping_models);
        override_list(&lookup, "TRIBUNAL_FULL_ROSTER", &mut config.modes.full_roster);
        override_list(&lookup, "TRIBUNAL_FAST_ROSTER", &mut config.modes.fast_roster);

        if config.convergence.max_rounds < 1 {
            warn!("TRIBUNAL_MAX_ROUNDS must be at least 1, using default");
            config.convergence.max_rounds = ConvergenceConfig::default().max_rounds;
        }

        config
    }
}

fn override_parsed<F, T>(lookup: &F, key: &str, slot: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    if let Some(raw) = lookup(key) {
        match raw.trim().parse::<T>() {
            Ok(value) => *slot = value,
            Err(_) => warn!(key, value = %raw, "Ignoring unparseable configuration value"),
        }
    }
}

fn override_list<F>(lookup: &F, key: &str, slot: &mut Vec<String>)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(key) {
        let items: Vec<String> = raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if items.is_empty() {
            warn!(key, "Ignoring empty list configuration value");
        } else {
            *slot = items;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.convergence.threshold, 0.90);
        assert_eq!(config.convergence.min_rounds, 3);
        assert_eq!(config.weighting.min_debates, 10);
        assert_eq!(config.muting.mute_threshold, 0.30);
        assert_eq!(config.modes.fast_roster.len(), 3);
    }

    #[test]
    fn test_lookup_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TRIBUNAL_CONVERGENCE_THRESHOLD", "0.8"),
            ("TRIBUNAL_MIN_ROUNDS", "2"),
            ("TRIBUNAL_MUTE_THRESHOLD", "not-a-number"),
            ("TRIBUNAL_FAST_ROSTER", "a, b ,c"),
        ]
        .into_iter()
        .collect();

        let config = EngineConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.convergence.threshold, 0.8);
        assert_eq!(config.convergence.min_rounds, 2);
        assert_eq!(config.muting.mute_threshold, 0.30);
        assert_eq!(config.modes.fast_roster, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_weight_for() {
        let weighting = WeightingConfig::default();
        assert_eq!(weighting.weight_for(3, 0.95), 0.5);
        assert!((weighting.weight_for(10, 0.29) - 0.29).abs() < 1e-9);
        assert_eq!(weighting.weight_for(12, 0.02), 0.1);
        assert_eq!(weighting.weight_for(12, 1.0), 1.0);
    }
}
