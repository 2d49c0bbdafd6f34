//! Compatibility report contract types.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Actor, BoundaryKey, TruthTopic};

pub const COMPATIBILITY_VERSION: &str = "0.6";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CompatibilityBand {
    Exceptional,
    High,
    Moderate,
    Lower,
    Challenging,
}

impl CompatibilityBand {
    pub fn from_score(score: u8) -> Self {
        match score {
            90.. => CompatibilityBand::Exceptional,
            75..=89 => CompatibilityBand::High,
            60..=74 => CompatibilityBand::Moderate,
            45..=59 => CompatibilityBand::Lower,
            _ => CompatibilityBand::Challenging,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CompatibilityBand::Exceptional => "Exceptional",
            CompatibilityBand::High => "High",
            CompatibilityBand::Moderate => "Moderate",
            CompatibilityBand::Lower => "Lower",
            CompatibilityBand::Challenging => "Challenging",
        }
    }
}

impl fmt::Display for CompatibilityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Factor scores in [0, 1]; modifiers are small signed adjustments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompatibilityBreakdown {
    pub power_complement: f64,
    pub domain_similarity: f64,
    pub activity_overlap: f64,
    pub truth_overlap: f64,
    pub se_modifier: Option<f64>,
    pub sisc_modifier: Option<f64>,
}

/// One participant wants something the other has ruled out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BoundaryConflict {
    pub boundary: BoundaryKey,
    pub preference_key: String,
    pub wanted_by: Actor,
    pub limited_by: Actor,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompatibilityReport {
    pub compatibility_version: String,
    /// Percentage in [0, 100].
    pub overall_score: u8,
    pub interpretation_label: CompatibilityBand,
    pub breakdown: CompatibilityBreakdown,
    pub mutual_activities: Vec<String>,
    pub growth_opportunities: Vec<String>,
    pub mutual_truth_topics: Vec<TruthTopic>,
    pub boundary_conflicts: Vec<BoundaryConflict>,
    pub blocked_activities: Vec<BoundaryKey>,
}
