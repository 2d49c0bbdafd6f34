//! Per-candidate structural checks, independent of ranking.

use std::fmt;

use contracts::{Activity, Actor, EngineConfig, Profile};

use crate::phase::IntensityBand;

/// Answer value that marks a preference as "maybe".
pub const MAYBE_INTEREST: f64 = 0.5;

/// Why a candidate failed validation. A rejection only removes the
/// candidate from the pool; it is not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    IntensityOutOfRange { intensity: u8, band: IntensityBand },
    MaybeTooEarly { step: u32, gate: u32 },
    EmptyScript,
    TooManySteps { steps: usize, max: usize },
    TooShort { step: usize, words: usize, min: usize },
    TooLong { step: usize, words: usize, max: usize },
    InvalidActor { step: usize, label: String },
    HardLimit,
}

impl Rejection {
    /// Stable short label used for funnel counts.
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::IntensityOutOfRange { .. } => "intensity_out_of_range",
            Rejection::MaybeTooEarly { .. } => "maybe_too_early",
            Rejection::EmptyScript => "empty_script",
            Rejection::TooManySteps { .. } => "too_many_steps",
            Rejection::TooShort { .. } => "too_short",
            Rejection::TooLong { .. } => "too_long",
            Rejection::InvalidActor { .. } => "invalid_actor",
            Rejection::HardLimit => "hard_limit",
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::IntensityOutOfRange { intensity, band } => {
                write!(f, "intensity out of range: {intensity} not in {band}")
            }
            Rejection::MaybeTooEarly { gate, .. } => {
                write!(f, "maybe item not allowed before step {gate}")
            }
            Rejection::EmptyScript => f.write_str("script has no steps"),
            Rejection::TooManySteps { steps, max } => {
                write!(f, "too many steps: {steps} > {max}")
            }
            Rejection::TooShort { step, words, min } => {
                write!(f, "step {step} too short: {words} words < {min}")
            }
            Rejection::TooLong { step, words, max } => {
                write!(f, "step {step} too long: {words} words > {max}")
            }
            Rejection::InvalidActor { step, label } => {
                write!(f, "step {step} has invalid actor label {label:?}")
            }
            Rejection::HardLimit => f.write_str("violates a hard limit"),
        }
    }
}

/// Facts computed upstream and handed to the validator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CandidateChecks {
    pub maybe_item: bool,
    pub violates_hard_limit: bool,
}

impl CandidateChecks {
    pub fn for_pair(activity: &Activity, profile_a: &Profile, profile_b: &Profile) -> Self {
        Self {
            maybe_item: is_maybe_item(activity, profile_a, profile_b),
            violates_hard_limit: crate::filter::violates_hard_limits(activity, profile_a, profile_b),
        }
    }
}

/// A matched preference key either participant explicitly answered "maybe".
/// Unanswered keys do not count.
pub fn is_maybe_item(activity: &Activity, profile_a: &Profile, profile_b: &Profile) -> bool {
    activity.preference_keys.iter().any(|key| {
        profile_a.answered(key) == Some(MAYBE_INTEREST)
            || profile_b.answered(key) == Some(MAYBE_INTEREST)
    })
}

/// Runs every check in order and reports the first failure.
pub fn validate(
    activity: &Activity,
    step: u32,
    band: IntensityBand,
    checks: CandidateChecks,
    config: &EngineConfig,
) -> Result<(), Rejection> {
    if !band.contains(activity.intensity) {
        return Err(Rejection::IntensityOutOfRange {
            intensity: activity.intensity,
            band,
        });
    }

    if checks.maybe_item && step < config.maybe_gate_step {
        return Err(Rejection::MaybeTooEarly {
            step,
            gate: config.maybe_gate_step,
        });
    }

    if activity.script.is_empty() {
        return Err(Rejection::EmptyScript);
    }
    if activity.script.len() > config.max_script_steps {
        return Err(Rejection::TooManySteps {
            steps: activity.script.len(),
            max: config.max_script_steps,
        });
    }

    for (step_no, script_step) in (1..).zip(&activity.script) {
        let words = script_step.text.split_whitespace().count();
        if words < config.min_words_per_step {
            return Err(Rejection::TooShort {
                step: step_no,
                words,
                min: config.min_words_per_step,
            });
        }
        if words > config.max_words_per_step {
            return Err(Rejection::TooLong {
                step: step_no,
                words,
                max: config.max_words_per_step,
            });
        }
    }

    for (step_no, script_step) in (1..).zip(&activity.script) {
        if Actor::from_label(&script_step.actor).is_none() {
            return Err(Rejection::InvalidActor {
                step: step_no,
                label: script_step.actor.clone(),
            });
        }
    }

    if checks.violates_hard_limit {
        return Err(Rejection::HardLimit);
    }
    Ok(())
}
