//! Activity catalog entry contract types.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::profile::check_range;
use crate::{lenient, BodyPart, BoundaryKey, Domain, TruthTopic, ValidationError};

pub type ActivityId = u64;

pub const MIN_INTENSITY: u8 = 1;
pub const MAX_INTENSITY: u8 = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    #[serde(alias = "TRUTH", alias = "Truth")]
    Truth,
    #[serde(alias = "DARE", alias = "Dare")]
    Dare,
}

impl ActivityType {
    pub fn other(self) -> ActivityType {
        match self {
            ActivityType::Truth => ActivityType::Dare,
            ActivityType::Dare => ActivityType::Truth,
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivityType::Truth => f.write_str("truth"),
            ActivityType::Dare => f.write_str("dare"),
        }
    }
}

/// Content rating, ordered from tamest to most explicit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rating {
    G,
    R,
    X,
}

impl Rating {
    /// Whether a session at this tier may show content rated `content`.
    pub fn admits(self, content: Rating) -> bool {
        content <= self
    }

    /// Maps the 1..=5 intimacy dial onto a rating tier.
    pub fn from_intimacy_level(level: u8) -> Rating {
        match level {
            0..=2 => Rating::G,
            3..=4 => Rating::R,
            _ => Rating::X,
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Rating::G => "G",
            Rating::R => "R",
            Rating::X => "X",
        };
        f.write_str(label)
    }
}

/// The orientation a piece of content is written for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum PowerRole {
    Top,
    Bottom,
    #[default]
    Neutral,
    Switch,
}

/// Script actor slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Actor {
    A,
    B,
}

impl Actor {
    /// Parses a script label; only the exact labels "A" and "B" are valid.
    pub fn from_label(label: &str) -> Option<Actor> {
        match label {
            "A" => Some(Actor::A),
            "B" => Some(Actor::B),
            _ => None,
        }
    }

    pub fn other(self) -> Actor {
        match self {
            Actor::A => Actor::B,
            Actor::B => Actor::A,
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::A => f.write_str("A"),
            Actor::B => f.write_str("B"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RequiredBodyparts {
    /// Anatomy the acting participant must have.
    #[serde(default, deserialize_with = "lenient::key_set")]
    pub active: BTreeSet<BodyPart>,
    /// Anatomy the receiving participant must have.
    #[serde(default, deserialize_with = "lenient::key_set")]
    pub partner: BTreeSet<BodyPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScriptStep {
    /// Kept verbatim so a malformed label reaches the validator.
    pub actor: String,
    #[serde(alias = "do")]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Activity {
    #[serde(alias = "activity_id")]
    pub id: ActivityId,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub rating: Rating,
    pub intensity: u8,
    #[serde(default)]
    pub power_role: PowerRole,
    #[serde(default)]
    pub preference_keys: BTreeSet<String>,
    #[serde(default, deserialize_with = "lenient::key_set")]
    pub domains: BTreeSet<Domain>,
    #[serde(
        default,
        alias = "hard_limit_keys",
        deserialize_with = "lenient::key_set"
    )]
    pub hard_boundaries: BTreeSet<BoundaryKey>,
    #[serde(default, deserialize_with = "lenient::key_set")]
    pub truth_topics: BTreeSet<TruthTopic>,
    #[serde(default)]
    pub required_bodyparts: RequiredBodyparts,
    #[serde(default)]
    pub script: Vec<ScriptStep>,
}

impl Activity {
    pub fn is_truth(&self) -> bool {
        self.activity_type == ActivityType::Truth
    }

    /// Truth content carrying at least one sensitive-topic tag.
    pub fn is_topic_gated(&self) -> bool {
        self.is_truth() && !self.truth_topics.is_empty()
    }

    /// Text of the first script step, if any.
    pub fn lead_text(&self) -> Option<&str> {
        self.script.first().map(|step| step.text.as_str())
    }

    /// Rejects entries that cannot exist in a well-formed catalog.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range(
            &format!("activity:{}", self.id),
            "intensity",
            f64::from(self.intensity),
            f64::from(MIN_INTENSITY),
            f64::from(MAX_INTENSITY),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_admission_is_cumulative() {
        assert!(Rating::G.admits(Rating::G));
        assert!(!Rating::G.admits(Rating::R));
        assert!(Rating::R.admits(Rating::G));
        assert!(!Rating::R.admits(Rating::X));
        assert!(Rating::X.admits(Rating::R));
    }

    #[test]
    fn intimacy_level_maps_to_tier() {
        assert_eq!(Rating::from_intimacy_level(1), Rating::G);
        assert_eq!(Rating::from_intimacy_level(2), Rating::G);
        assert_eq!(Rating::from_intimacy_level(3), Rating::R);
        assert_eq!(Rating::from_intimacy_level(4), Rating::R);
        assert_eq!(Rating::from_intimacy_level(5), Rating::X);
    }

    #[test]
    fn activity_parses_legacy_field_names() {
        let activity: Activity = serde_json::from_str(
            r#"{
                "activity_id": 7,
                "type": "dare",
                "rating": "R",
                "intensity": 2,
                "hard_limit_keys": ["impact_play", "unknown"],
                "script": [{"actor": "A", "do": "Whisper something sweet to your partner"}]
            }"#,
        )
        .expect("activity");
        assert_eq!(activity.id, 7);
        assert_eq!(activity.power_role, PowerRole::Neutral);
        assert_eq!(activity.hard_boundaries, BTreeSet::from([BoundaryKey::Impact]));
        assert_eq!(
            activity.lead_text(),
            Some("Whisper something sweet to your partner")
        );
    }

    #[test]
    fn invalid_actor_label_survives_parsing() {
        let step: ScriptStep =
            serde_json::from_str(r#"{"actor":"C","text":"x"}"#).expect("step");
        assert_eq!(step.actor, "C");
        assert_eq!(Actor::from_label(&step.actor), None);
    }

    #[test]
    fn intensity_outside_scale_fails_validation() {
        let activity = Activity {
            id: 3,
            activity_type: ActivityType::Dare,
            rating: Rating::G,
            intensity: 9,
            power_role: PowerRole::Neutral,
            preference_keys: BTreeSet::new(),
            domains: BTreeSet::new(),
            hard_boundaries: BTreeSet::new(),
            truth_topics: BTreeSet::new(),
            required_bodyparts: RequiredBodyparts::default(),
            script: Vec::new(),
        };
        assert!(activity.validate().is_err());
    }
}
