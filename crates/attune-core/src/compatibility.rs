//! Pairwise compatibility between two full profiles. Stateless and
//! independent of any session.

use contracts::{
    Actor, ArousalPropensity, BoundaryConflict, BoundaryKey, CompatibilityBand,
    CompatibilityBreakdown, CompatibilityReport, CompatibilityWeights, Domain, Orientation,
    Profile, TruthTopic, COMPATIBILITY_VERSION,
};
use tracing::debug;

// ---------------------------------------------------------------------------
// Coefficients
// ---------------------------------------------------------------------------

/// Floor for a Top/Bottom pair; intensity alignment adds up to the remainder.
const COMPLEMENT_FLOOR: f64 = 0.80;
const SWITCH_PAIR: f64 = 0.85;
const FLEXIBLE_PAIR: f64 = 0.75;
const SWITCH_WITH_POLE: f64 = 0.75;
const VERSATILE_WITH_POLE: f64 = 0.65;
const SAME_POLE: f64 = 0.50;

/// Multiplier on domain similarity when both participants share a pole.
pub const SAME_POLE_DOMAIN_PENALTY: f64 = 0.5;

/// Overlap reported when the two profiles share no keys.
const NO_SHARED_SIGNAL: f64 = 0.5;

const WANTS_THRESHOLD: f64 = 0.7;
const OPEN_THRESHOLD: f64 = 0.3;
const MUTUAL_TOPIC_THRESHOLD: f64 = 0.5;

const AROUSAL_HIGH: f64 = 0.65;
const AROUSAL_LOW: f64 = 0.35;
const SE_BOTH_HIGH: f64 = 0.03;
const SE_HIGH_MID: f64 = 0.015;
const SE_HIGH_LOW: f64 = 0.005;
const SISC_BOTH_MID: f64 = 0.02;
const SISC_PARTIAL_MISMATCH: f64 = -0.01;
const SISC_FULL_MISMATCH: f64 = -0.03;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn calculate_compatibility(profile_a: &Profile, profile_b: &Profile) -> CompatibilityReport {
    calculate_compatibility_weighted(profile_a, profile_b, &CompatibilityWeights::default())
}

pub fn calculate_compatibility_weighted(
    profile_a: &Profile,
    profile_b: &Profile,
    weights: &CompatibilityWeights,
) -> CompatibilityReport {
    let orientation_a = profile_a.orientation();
    let orientation_b = profile_b.orientation();

    let power_complement = power_complement(
        orientation_a,
        profile_a.power_intensity(),
        orientation_b,
        profile_b.power_intensity(),
    );
    let domain_similarity = domain_similarity(profile_a, profile_b);
    let activity_overlap = activity_overlap(profile_a, profile_b);
    let truth_overlap = truth_overlap(profile_a, profile_b);

    let modifiers = arousal_modifiers(
        profile_a.arousal_propensity.as_ref(),
        profile_b.arousal_propensity.as_ref(),
    );
    let se_modifier = modifiers.map(|(se, _)| se);
    let sisc_modifier = modifiers.map(|(_, sisc)| sisc);

    let weight_sum = weights.power + weights.domain + weights.activity + weights.truth;
    let weighted = if weight_sum > 0.0 {
        (weights.power * power_complement
            + weights.domain * domain_similarity
            + weights.activity * activity_overlap
            + weights.truth * truth_overlap)
            / weight_sum
    } else {
        NO_SHARED_SIGNAL
    };
    let overall = (weighted + se_modifier.unwrap_or(0.0) + sisc_modifier.unwrap_or(0.0))
        .clamp(0.0, 1.0);
    let overall_score = (overall * 100.0).round() as u8;

    let report = CompatibilityReport {
        compatibility_version: COMPATIBILITY_VERSION.to_string(),
        overall_score,
        interpretation_label: CompatibilityBand::from_score(overall_score),
        breakdown: CompatibilityBreakdown {
            power_complement,
            domain_similarity,
            activity_overlap,
            truth_overlap,
            se_modifier,
            sisc_modifier,
        },
        mutual_activities: mutual_activities(profile_a, profile_b),
        growth_opportunities: growth_opportunities(profile_a, profile_b),
        mutual_truth_topics: mutual_truth_topics(profile_a, profile_b),
        boundary_conflicts: boundary_conflicts(profile_a, profile_b),
        blocked_activities: blocked_activities(profile_a, profile_b),
    };
    debug!(
        profile_a = %profile_a.id,
        profile_b = %profile_b.id,
        score = report.overall_score,
        label = %report.interpretation_label,
        conflicts = report.boundary_conflicts.len(),
        "compatibility calculated"
    );
    report
}

// ---------------------------------------------------------------------------
// Primary factors
// ---------------------------------------------------------------------------

fn is_pole(orientation: Orientation) -> bool {
    matches!(orientation, Orientation::Top | Orientation::Bottom)
}

pub fn is_same_pole(a: Orientation, b: Orientation) -> bool {
    is_pole(a) && a == b
}

pub fn power_complement(
    a: Orientation,
    intensity_a: f64,
    b: Orientation,
    intensity_b: f64,
) -> f64 {
    if is_pole(a) && is_pole(b) {
        if a == b {
            return SAME_POLE;
        }
        let alignment = 1.0 - (intensity_a - intensity_b).abs().clamp(0.0, 1.0);
        return COMPLEMENT_FLOOR + (1.0 - COMPLEMENT_FLOOR) * alignment;
    }
    match (a, b) {
        (Orientation::Switch, Orientation::Switch) => SWITCH_PAIR,
        (x, y) if x.is_flexible() && y.is_flexible() => FLEXIBLE_PAIR,
        (Orientation::Switch, _) | (_, Orientation::Switch) => SWITCH_WITH_POLE,
        _ => VERSATILE_WITH_POLE,
    }
}

/// One minus the mean absolute difference across all five domains, halved
/// for same-pole pairs.
pub fn domain_similarity(profile_a: &Profile, profile_b: &Profile) -> f64 {
    let total_diff = Domain::ALL
        .iter()
        .map(|domain| (profile_a.domain_score(*domain) - profile_b.domain_score(*domain)).abs() / 100.0)
        .sum::<f64>();
    let raw = 1.0 - total_diff / Domain::ALL.len() as f64;
    if is_same_pole(profile_a.orientation(), profile_b.orientation()) {
        raw * SAME_POLE_DOMAIN_PENALTY
    } else {
        raw
    }
}

/// Agreement over keys both participants answered. Matching answers,
/// including a shared "no", count as full agreement.
pub fn activity_overlap(profile_a: &Profile, profile_b: &Profile) -> f64 {
    agreement(profile_a.activities.iter().filter_map(|(key, _)| {
        Some((profile_a.answered(key)?, profile_b.answered(key)?))
    }))
}

pub fn truth_overlap(profile_a: &Profile, profile_b: &Profile) -> f64 {
    agreement(profile_a.truth_topics.keys().filter_map(|topic| {
        profile_b
            .truth_topics
            .contains_key(topic)
            .then(|| (profile_a.topic_interest(*topic), profile_b.topic_interest(*topic)))
    }))
}

fn agreement(pairs: impl Iterator<Item = (f64, f64)>) -> f64 {
    let (sum, count) = pairs.fold((0.0, 0usize), |(sum, count), (a, b)| {
        (sum + 1.0 - (a - b).abs(), count + 1)
    });
    if count == 0 {
        NO_SHARED_SIGNAL
    } else {
        sum / count as f64
    }
}

// ---------------------------------------------------------------------------
// Arousal modifiers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Level {
    Low,
    Mid,
    High,
}

fn level(value: f64) -> Level {
    if value >= AROUSAL_HIGH {
        Level::High
    } else if value < AROUSAL_LOW {
        Level::Low
    } else {
        Level::Mid
    }
}

/// Excitation bonus; rewards pairs where at least one side runs high.
pub fn se_modifier(excitation_a: f64, excitation_b: f64) -> f64 {
    let (lower, higher) = ordered(level(excitation_a), level(excitation_b));
    match (lower, higher) {
        (Level::High, Level::High) => SE_BOTH_HIGH,
        (Level::Mid, Level::High) => SE_HIGH_MID,
        (Level::Low, Level::High) => SE_HIGH_LOW,
        _ => 0.0,
    }
}

/// Consequence-inhibition modifier: aligned moderate is a bonus, aligned
/// extremes are neutral, mismatch is a penalty.
pub fn sisc_modifier(inhibition_a: f64, inhibition_b: f64) -> f64 {
    let (lower, higher) = ordered(level(inhibition_a), level(inhibition_b));
    match (lower, higher) {
        (Level::Mid, Level::Mid) => SISC_BOTH_MID,
        (Level::Low, Level::High) => SISC_FULL_MISMATCH,
        (x, y) if x != y => SISC_PARTIAL_MISMATCH,
        _ => 0.0,
    }
}

fn ordered(a: Level, b: Level) -> (Level, Level) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Both modifiers for a pair, if both carry arousal data.
pub fn arousal_modifiers(
    a: Option<&ArousalPropensity>,
    b: Option<&ArousalPropensity>,
) -> Option<(f64, f64)> {
    let (a, b) = (a?, b?);
    Some((
        se_modifier(a.excitation, b.excitation),
        sisc_modifier(a.inhibition_consequence, b.inhibition_consequence),
    ))
}

// ---------------------------------------------------------------------------
// Report lists
// ---------------------------------------------------------------------------

fn shared_answers<'p>(
    profile_a: &'p Profile,
    profile_b: &'p Profile,
) -> impl Iterator<Item = (&'p String, f64, f64)> + 'p {
    profile_a.activities.keys().filter_map(move |key| {
        Some((key, profile_a.answered(key)?, profile_b.answered(key)?))
    })
}

/// Keys both participants want.
pub fn mutual_activities(profile_a: &Profile, profile_b: &Profile) -> Vec<String> {
    shared_answers(profile_a, profile_b)
        .filter(|(_, a, b)| *a >= WANTS_THRESHOLD && *b >= WANTS_THRESHOLD)
        .map(|(key, _, _)| key.clone())
        .collect()
}

/// Keys one participant wants and the other is open to.
pub fn growth_opportunities(profile_a: &Profile, profile_b: &Profile) -> Vec<String> {
    let open = |v: f64| (OPEN_THRESHOLD..WANTS_THRESHOLD).contains(&v);
    shared_answers(profile_a, profile_b)
        .filter(|(_, a, b)| (*a >= WANTS_THRESHOLD && open(*b)) || (*b >= WANTS_THRESHOLD && open(*a)))
        .map(|(key, _, _)| key.clone())
        .collect()
}

/// Topics both participants explicitly answered at least "maybe".
pub fn mutual_truth_topics(profile_a: &Profile, profile_b: &Profile) -> Vec<TruthTopic> {
    TruthTopic::ALL
        .into_iter()
        .filter(|topic| {
            let a = profile_a.truth_topics.get(topic).copied().unwrap_or(0.0);
            let b = profile_b.truth_topics.get(topic).copied().unwrap_or(0.0);
            a >= MUTUAL_TOPIC_THRESHOLD && b >= MUTUAL_TOPIC_THRESHOLD
        })
        .collect()
}

/// Every wanted key that falls inside the other participant's hard limits.
pub fn boundary_conflicts(profile_a: &Profile, profile_b: &Profile) -> Vec<BoundaryConflict> {
    let mut conflicts = Vec::new();
    for (wanting, limiting, wanted_by) in [
        (profile_a, profile_b, Actor::A),
        (profile_b, profile_a, Actor::B),
    ] {
        for key in wanting.activities.keys() {
            if wanting.interest(key) < WANTS_THRESHOLD {
                continue;
            }
            for boundary in limiting.hard_limits() {
                if boundary.covers_preference(key) {
                    conflicts.push(BoundaryConflict {
                        boundary: *boundary,
                        preference_key: key.clone(),
                        wanted_by,
                        limited_by: wanted_by.other(),
                    });
                }
            }
        }
    }
    conflicts
}

/// Union of both participants' hard limits.
pub fn blocked_activities(profile_a: &Profile, profile_b: &Profile) -> Vec<BoundaryKey> {
    profile_a
        .hard_limits()
        .union(profile_b.hard_limits())
        .copied()
        .collect()
}
