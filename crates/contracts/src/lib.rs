//! Cross-crate contracts for the attune engine: profiles, catalog entries,
//! turn context, compatibility reports and engine configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod activity;
mod lenient;
pub mod profile;
pub mod report;
pub mod serde_u64_string;
pub mod turn;

pub use activity::{
    Activity, ActivityId, ActivityType, Actor, PowerRole, Rating, RequiredBodyparts, ScriptStep,
    MAX_INTENSITY, MIN_INTENSITY,
};
pub use profile::{
    unit, Anatomy, ArousalPropensity, BodyPart, Boundaries, BoundaryKey, Domain, Orientation,
    PowerDynamic, Profile, TruthTopic, UnknownKey, NEUTRAL_DOMAIN_SCORE, NEUTRAL_INTEREST,
    NEUTRAL_POWER_INTENSITY,
};
pub use report::{
    BoundaryConflict, CompatibilityBand, CompatibilityBreakdown, CompatibilityReport,
    COMPATIBILITY_VERSION,
};
pub use turn::TurnContext;

pub const SCHEMA_VERSION: &str = "1.0";
pub const DEFAULT_SESSION_LENGTH: u32 = 25;

/// A value that is structurally impossible, as opposed to merely unusual.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{entity}: {field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        entity: String,
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{entity}: {field} is not a finite number")]
    NotFinite { entity: String, field: String },
    #[error("activity:{0}: duplicate id in catalog")]
    DuplicateActivity(ActivityId),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("config field {field} is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Engine configuration
// ---------------------------------------------------------------------------

/// Blend weights for the per-candidate base score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectionWeights {
    pub mutual_interest: f64,
    pub power_alignment: f64,
    pub domain_fit: f64,
}

impl Default for SelectionWeights {
    fn default() -> Self {
        Self {
            mutual_interest: 0.5,
            power_alignment: 0.3,
            domain_fit: 0.2,
        }
    }
}

/// Blend weights for the overall compatibility score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompatibilityWeights {
    pub power: f64,
    pub domain: f64,
    pub activity: f64,
    pub truth: f64,
}

impl Default for CompatibilityWeights {
    fn default() -> Self {
        Self {
            power: 0.20,
            domain: 0.25,
            activity: 0.45,
            truth: 0.10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub schema_version: String,
    pub session_length: u32,
    /// Steps before this one never show an item either participant answered "maybe".
    pub maybe_gate_step: u32,
    pub min_words_per_step: usize,
    pub max_words_per_step: usize,
    pub max_script_steps: usize,
    /// Upper bound on candidates scored per turn.
    pub candidate_pool_limit: usize,
    /// When set, content written for a pole nobody can take is dropped before scoring.
    pub power_hard_veto: bool,
    pub selection_weights: SelectionWeights,
    /// Share of the base score kept when topic fit is zero.
    pub topic_blend_floor: f64,
    pub compatibility_weights: CompatibilityWeights,
    #[serde(with = "serde_u64_string")]
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            session_length: DEFAULT_SESSION_LENGTH,
            maybe_gate_step: 6,
            min_words_per_step: 3,
            max_words_per_step: 20,
            max_script_steps: 2,
            candidate_pool_limit: 75,
            power_hard_veto: true,
            selection_weights: SelectionWeights::default(),
            topic_blend_floor: 0.5,
            compatibility_weights: CompatibilityWeights::default(),
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.session_length == 0 {
            return Err(ConfigError::invalid("session_length", "must be at least 1"));
        }
        if self.min_words_per_step == 0 || self.min_words_per_step > self.max_words_per_step {
            return Err(ConfigError::invalid(
                "min_words_per_step",
                format!(
                    "need 1 <= min ({}) <= max ({})",
                    self.min_words_per_step, self.max_words_per_step
                ),
            ));
        }
        if self.max_script_steps == 0 {
            return Err(ConfigError::invalid("max_script_steps", "must be at least 1"));
        }
        if self.candidate_pool_limit == 0 {
            return Err(ConfigError::invalid("candidate_pool_limit", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.topic_blend_floor) {
            return Err(ConfigError::invalid(
                "topic_blend_floor",
                format!("{} is outside [0, 1]", self.topic_blend_floor),
            ));
        }
        let selection = self.selection_weights;
        check_weights(
            "selection_weights",
            &[
                selection.mutual_interest,
                selection.power_alignment,
                selection.domain_fit,
            ],
        )?;
        let compat = self.compatibility_weights;
        check_weights(
            "compatibility_weights",
            &[compat.power, compat.domain, compat.activity, compat.truth],
        )
    }
}

fn check_weights(field: &'static str, weights: &[f64]) -> Result<(), ConfigError> {
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(ConfigError::invalid(field, "weights must be finite and non-negative"));
    }
    if weights.iter().sum::<f64>() <= 0.0 {
        return Err(ConfigError::invalid(field, "weights must not all be zero"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"session_length":40,"seed":"99"}"#).expect("config");
        assert_eq!(config.session_length, 40);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.maybe_gate_step, 6);
        assert_eq!(config.selection_weights, SelectionWeights::default());
    }

    #[test]
    fn inverted_word_limits_are_rejected() {
        let config = EngineConfig {
            min_words_per_step: 30,
            ..EngineConfig::default()
        };
        let err = config.validate().expect_err("inverted limits");
        assert!(err.to_string().contains("min_words_per_step"));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let mut config = EngineConfig::default();
        config.compatibility_weights.truth = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validation_error_names_entity_and_field() {
        let err = ValidationError::NotFinite {
            entity: "activity:4".to_string(),
            field: "intensity".to_string(),
        };
        assert_eq!(err.to_string(), "activity:4: intensity is not a finite number");
    }
}
