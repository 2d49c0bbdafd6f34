//! Participant profile contract types.
//!
//! A profile is an immutable snapshot consumed per computation. Dictionaries
//! that the survey exposes as free-form strings are closed enumerations here;
//! unknown keys are dropped on deserialization instead of flowing through as
//! strings that no filter understands.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{lenient, ValidationError};

/// Neutral interest used when a participant never answered a key.
pub const NEUTRAL_INTEREST: f64 = 0.5;
/// Neutral domain score used when a domain is missing from a profile.
pub const NEUTRAL_DOMAIN_SCORE: f64 = 50.0;
/// Neutral power intensity used when a profile omits it.
pub const NEUTRAL_POWER_INTENSITY: f64 = 0.5;

// ---------------------------------------------------------------------------
// Power dynamic
// ---------------------------------------------------------------------------

/// Self-described power role preference.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[serde(alias = "top")]
    Top,
    #[serde(alias = "bottom")]
    Bottom,
    #[default]
    #[serde(alias = "switch")]
    Switch,
    #[serde(alias = "versatile")]
    Versatile,
    #[serde(rename = "Versatile/Undefined", alias = "versatile_undefined")]
    VersatileUndefined,
}

impl Orientation {
    /// Switch and both versatile variants can adapt to either side.
    pub fn is_flexible(self) -> bool {
        matches!(
            self,
            Orientation::Switch | Orientation::Versatile | Orientation::VersatileUndefined
        )
    }

    /// The complementary orientation; flexible orientations have none and map to Switch.
    pub fn inverted(self) -> Orientation {
        match self {
            Orientation::Top => Orientation::Bottom,
            Orientation::Bottom => Orientation::Top,
            _ => Orientation::Switch,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PowerDynamic {
    #[serde(default)]
    pub orientation: Orientation,
    /// Strength of the orientation in [0, 1].
    #[serde(default = "default_power_intensity")]
    pub intensity: f64,
}

impl Default for PowerDynamic {
    fn default() -> Self {
        Self {
            orientation: Orientation::Switch,
            intensity: NEUTRAL_POWER_INTENSITY,
        }
    }
}

fn default_power_intensity() -> f64 {
    NEUTRAL_POWER_INTENSITY
}

// ---------------------------------------------------------------------------
// Closed key sets
// ---------------------------------------------------------------------------

/// The five fixed preference domains.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Sensation,
    Connection,
    Power,
    Exploration,
    Verbal,
}

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::Sensation,
        Domain::Connection,
        Domain::Power,
        Domain::Exploration,
        Domain::Verbal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::Sensation => "sensation",
            Domain::Connection => "connection",
            Domain::Power => "power",
            Domain::Exploration => "exploration",
            Domain::Verbal => "verbal",
        }
    }
}

impl FromStr for Domain {
    type Err = UnknownKey;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Domain::ALL
            .into_iter()
            .find(|domain| domain.as_str().eq_ignore_ascii_case(raw.trim()))
            .ok_or_else(|| UnknownKey(raw.to_string()))
    }
}

/// The eight sensitive truth topics a participant consents to (or not).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TruthTopic {
    PastExperiences,
    Fantasies,
    TurnOns,
    TurnOffs,
    Insecurities,
    Boundaries,
    FutureFantasies,
    FeelingDesired,
}

impl TruthTopic {
    pub const ALL: [TruthTopic; 8] = [
        TruthTopic::PastExperiences,
        TruthTopic::Fantasies,
        TruthTopic::TurnOns,
        TruthTopic::TurnOffs,
        TruthTopic::Insecurities,
        TruthTopic::Boundaries,
        TruthTopic::FutureFantasies,
        TruthTopic::FeelingDesired,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TruthTopic::PastExperiences => "past_experiences",
            TruthTopic::Fantasies => "fantasies",
            TruthTopic::TurnOns => "turn_ons",
            TruthTopic::TurnOffs => "turn_offs",
            TruthTopic::Insecurities => "insecurities",
            TruthTopic::Boundaries => "boundaries",
            TruthTopic::FutureFantasies => "future_fantasies",
            TruthTopic::FeelingDesired => "feeling_desired",
        }
    }
}

impl FromStr for TruthTopic {
    type Err = UnknownKey;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        TruthTopic::ALL
            .into_iter()
            .find(|topic| topic.as_str() == raw.trim())
            .ok_or_else(|| UnknownKey(raw.to_string()))
    }
}

/// Fixed hard-boundary taxonomy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BoundaryKey {
    #[serde(rename = "hardBoundaryImpact")]
    Impact,
    #[serde(rename = "hardBoundaryRestrain")]
    Restrain,
    #[serde(rename = "hardBoundaryBreath")]
    Breath,
    #[serde(rename = "hardBoundaryDegrade")]
    Degrade,
    #[serde(rename = "hardBoundaryPublic")]
    Public,
    #[serde(rename = "hardBoundaryRecord")]
    Record,
    #[serde(rename = "hardBoundaryAnal")]
    Anal,
    #[serde(rename = "hardBoundaryWatersports")]
    Watersports,
}

impl BoundaryKey {
    pub const ALL: [BoundaryKey; 8] = [
        BoundaryKey::Impact,
        BoundaryKey::Restrain,
        BoundaryKey::Breath,
        BoundaryKey::Degrade,
        BoundaryKey::Public,
        BoundaryKey::Record,
        BoundaryKey::Anal,
        BoundaryKey::Watersports,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BoundaryKey::Impact => "hardBoundaryImpact",
            BoundaryKey::Restrain => "hardBoundaryRestrain",
            BoundaryKey::Breath => "hardBoundaryBreath",
            BoundaryKey::Degrade => "hardBoundaryDegrade",
            BoundaryKey::Public => "hardBoundaryPublic",
            BoundaryKey::Record => "hardBoundaryRecord",
            BoundaryKey::Anal => "hardBoundaryAnal",
            BoundaryKey::Watersports => "hardBoundaryWatersports",
        }
    }

    /// Preference-key stems that explore this boundary's territory.
    pub fn preference_stems(self) -> &'static [&'static str] {
        match self {
            BoundaryKey::Impact => &["impact", "spanking", "slapping"],
            BoundaryKey::Restrain => &["restraints", "bondage"],
            BoundaryKey::Breath => &["breath", "choking"],
            BoundaryKey::Degrade => &["degradation", "humiliation", "spitting"],
            BoundaryKey::Public => &["public"],
            BoundaryKey::Record => &["recording", "photos", "videos"],
            BoundaryKey::Anal => &["anal", "rimming"],
            BoundaryKey::Watersports => &["watersports", "bodily_fluids"],
        }
    }

    /// Whether a preference key falls inside this boundary's territory.
    pub fn covers_preference(self, preference_key: &str) -> bool {
        if preference_key == self.as_str() {
            return true;
        }
        self.preference_stems().iter().any(|stem| {
            preference_key == *stem
                || preference_key
                    .strip_prefix(stem)
                    .is_some_and(|rest| rest.starts_with('_'))
        })
    }
}

impl FromStr for BoundaryKey {
    type Err = UnknownKey;

    /// Accepts the canonical keys plus the legacy spellings older profiles carry.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let key = match raw.trim() {
            "hardBoundaryImpact" | "impact_play" | "impact" => BoundaryKey::Impact,
            "hardBoundaryRestrain" | "restraints_bondage" | "restraints" | "bondage" => {
                BoundaryKey::Restrain
            }
            "hardBoundaryBreath" | "breath_play" | "breath" | "choking" => BoundaryKey::Breath,
            "hardBoundaryDegrade" | "degradation_humiliation" | "degradation" | "humiliation" => {
                BoundaryKey::Degrade
            }
            "hardBoundaryPublic" | "public_activities" | "public" | "public_play" => {
                BoundaryKey::Public
            }
            "hardBoundaryRecord" | "recording" | "recording_photos" | "recording_videos"
            | "photos" | "videos" => BoundaryKey::Record,
            "hardBoundaryAnal" | "anal_activities" | "anal" => BoundaryKey::Anal,
            "hardBoundaryWatersports" | "watersports" | "watersports_scat" | "bodily_fluids" => {
                BoundaryKey::Watersports
            }
            other => return Err(UnknownKey(other.to_string())),
        };
        Ok(key)
    }
}

impl fmt::Display for BoundaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body-part tags used by anatomy requirements.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BodyPart {
    Penis,
    Vagina,
    Breasts,
}

impl BodyPart {
    pub const ALL: [BodyPart; 3] = [BodyPart::Penis, BodyPart::Vagina, BodyPart::Breasts];
}

impl FromStr for BodyPart {
    type Err = UnknownKey;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "penis" => Ok(BodyPart::Penis),
            "vagina" => Ok(BodyPart::Vagina),
            "breasts" => Ok(BodyPart::Breasts),
            _ => Err(UnknownKey(raw.to_string())),
        }
    }
}

/// A key outside one of the closed taxonomies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKey(pub String);

impl fmt::Display for UnknownKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown key: {}", self.0)
    }
}

impl std::error::Error for UnknownKey {}

// ---------------------------------------------------------------------------
// Profile sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Boundaries {
    #[serde(default, deserialize_with = "lenient::key_set")]
    pub hard_limits: BTreeSet<BoundaryKey>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Anatomy {
    /// Body parts the participant has.
    #[serde(
        rename = "self",
        alias = "anatomy_self",
        default,
        deserialize_with = "lenient::key_set"
    )]
    pub has: BTreeSet<BodyPart>,
    /// Body parts the participant wants a partner to have.
    #[serde(
        alias = "anatomy_preference",
        default,
        deserialize_with = "lenient::key_set"
    )]
    pub preference: BTreeSet<BodyPart>,
}

/// Dual-control arousal propensity, each scale in [0, 1].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ArousalPropensity {
    #[serde(alias = "sexual_excitation")]
    pub excitation: f64,
    pub inhibition_performance: f64,
    pub inhibition_consequence: f64,
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// One participant's preference snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Profile {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub power_dynamic: PowerDynamic,
    #[serde(default, deserialize_with = "lenient::key_map")]
    pub domain_scores: BTreeMap<Domain, f64>,
    /// Preference key -> interest. Absent keys are unanswered.
    #[serde(default, deserialize_with = "lenient::key_map")]
    pub activities: BTreeMap<String, f64>,
    #[serde(default, deserialize_with = "lenient::key_map")]
    pub truth_topics: BTreeMap<TruthTopic, f64>,
    #[serde(default)]
    pub boundaries: Boundaries,
    #[serde(default)]
    pub anatomy: Anatomy,
    #[serde(default)]
    pub arousal_propensity: Option<ArousalPropensity>,
}

impl Profile {
    pub fn orientation(&self) -> Orientation {
        self.power_dynamic.orientation
    }

    pub fn power_intensity(&self) -> f64 {
        unit(self.power_dynamic.intensity, NEUTRAL_POWER_INTENSITY)
    }

    /// Interest in a preference key, neutral when unanswered.
    pub fn interest(&self, key: &str) -> f64 {
        self.answered(key).unwrap_or(NEUTRAL_INTEREST)
    }

    /// Interest only if the participant actually answered the key.
    pub fn answered(&self, key: &str) -> Option<f64> {
        self.activities
            .get(key)
            .map(|value| unit(*value, NEUTRAL_INTEREST))
    }

    pub fn topic_interest(&self, topic: TruthTopic) -> f64 {
        self.truth_topics
            .get(&topic)
            .map(|value| unit(*value, NEUTRAL_INTEREST))
            .unwrap_or(NEUTRAL_INTEREST)
    }

    /// Domain score in [0, 100], neutral when missing.
    pub fn domain_score(&self, domain: Domain) -> f64 {
        self.domain_scores
            .get(&domain)
            .map(|value| {
                if value.is_finite() {
                    value.clamp(0.0, 100.0)
                } else {
                    NEUTRAL_DOMAIN_SCORE
                }
            })
            .unwrap_or(NEUTRAL_DOMAIN_SCORE)
    }

    pub fn hard_limits(&self) -> &BTreeSet<BoundaryKey> {
        &self.boundaries.hard_limits
    }

    pub fn has_body_parts(&self, required: &BTreeSet<BodyPart>) -> bool {
        required.is_subset(&self.anatomy.has)
    }

    /// Name shown on cards, falling back to the id.
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.id)
    }

    /// Reports the first numeric field outside its declared range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let entity = format!("profile:{}", self.id);
        check_range(&entity, "power_dynamic.intensity", self.power_dynamic.intensity, 0.0, 1.0)?;
        for (domain, score) in &self.domain_scores {
            check_range(
                &entity,
                &format!("domain_scores.{}", domain.as_str()),
                *score,
                0.0,
                100.0,
            )?;
        }
        for (key, interest) in &self.activities {
            check_range(&entity, &format!("activities.{key}"), *interest, 0.0, 1.0)?;
        }
        for (topic, interest) in &self.truth_topics {
            check_range(
                &entity,
                &format!("truth_topics.{}", topic.as_str()),
                *interest,
                0.0,
                1.0,
            )?;
        }
        if let Some(arousal) = &self.arousal_propensity {
            check_range(&entity, "arousal_propensity.excitation", arousal.excitation, 0.0, 1.0)?;
            check_range(
                &entity,
                "arousal_propensity.inhibition_performance",
                arousal.inhibition_performance,
                0.0,
                1.0,
            )?;
            check_range(
                &entity,
                "arousal_propensity.inhibition_consequence",
                arousal.inhibition_consequence,
                0.0,
                1.0,
            )?;
        }
        Ok(())
    }
}

pub(crate) fn check_range(
    entity: &str,
    field: &str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            entity: entity.to_string(),
            field: field.to_string(),
        });
    }
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            entity: entity.to_string(),
            field: field.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(())
}

/// Clamp to [0, 1], replacing non-finite values with `fallback`.
pub fn unit(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        fallback
    }
}
