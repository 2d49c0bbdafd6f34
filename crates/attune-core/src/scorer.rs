//! Candidate fitness scoring.

use contracts::{Activity, Orientation, PowerRole, Profile, SelectionWeights};
use serde::Serialize;

/// Interest at or above this reads as "yes".
pub const YES_THRESHOLD: f64 = 0.75;
/// Interest at or below this reads as "no".
pub const NO_THRESHOLD: f64 = 0.25;

const YES_YES: f64 = 1.0;
const YES_MAYBE: f64 = 0.6;
const YES_NO: f64 = 0.1;
const NEUTRAL: f64 = 0.5;

/// Alignment when someone natively holds the needed role but nobody
/// anchors the opposite side.
pub const UNANCHORED_ALIGNMENT: f64 = 0.8;
/// Alignment when a flexible participant has to adapt into the missing role.
pub const SWITCH_ADAPT_ALIGNMENT: f64 = 0.6;
/// Alignment when nobody in the pair can take the needed role. Zero is a
/// soft veto: it only sinks the score unless the caller enforces a hard veto.
pub const POWER_SOFT_ZERO: f64 = 0.0;

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ScoreBreakdown {
    pub mutual_interest: f64,
    pub power_alignment: f64,
    pub domain_fit: f64,
    /// Weighted blend of the three factors above.
    pub base: f64,
    /// Present only for topic-tagged truths.
    pub topic_fit: Option<f64>,
    pub total: f64,
}

pub fn score(
    activity: &Activity,
    profile_a: &Profile,
    profile_b: &Profile,
    weights: &SelectionWeights,
    topic_blend_floor: f64,
) -> ScoreBreakdown {
    let mutual_interest = mutual_interest(activity, profile_a, profile_b);
    let power_alignment = power_alignment(
        activity.power_role,
        profile_a.orientation(),
        profile_b.orientation(),
    );
    let domain_fit = domain_fit(activity, profile_a, profile_b);

    let weight_sum = weights.mutual_interest + weights.power_alignment + weights.domain_fit;
    let base = if weight_sum > 0.0 {
        (weights.mutual_interest * mutual_interest
            + weights.power_alignment * power_alignment
            + weights.domain_fit * domain_fit)
            / weight_sum
    } else {
        NEUTRAL
    };

    let topic_fit = topic_fit(activity, profile_a, profile_b);
    let total = match topic_fit {
        Some(fit) => base * (topic_blend_floor + (1.0 - topic_blend_floor) * fit),
        None => base,
    };

    ScoreBreakdown {
        mutual_interest,
        power_alignment,
        domain_fit,
        base,
        topic_fit,
        total: total.clamp(0.0, 1.0),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Answer {
    Yes,
    Maybe,
    No,
}

fn classify(interest: f64) -> Answer {
    if interest >= YES_THRESHOLD {
        Answer::Yes
    } else if interest <= NO_THRESHOLD {
        Answer::No
    } else {
        Answer::Maybe
    }
}

/// Pairwise agreement on one preference key.
pub fn key_interest(a: f64, b: f64) -> f64 {
    match (classify(a), classify(b)) {
        (Answer::Yes, Answer::Yes) => YES_YES,
        (Answer::Yes, Answer::Maybe) | (Answer::Maybe, Answer::Yes) => YES_MAYBE,
        (Answer::Yes, Answer::No) | (Answer::No, Answer::Yes) => YES_NO,
        _ => (a + b) / 2.0,
    }
}

pub fn mutual_interest(activity: &Activity, profile_a: &Profile, profile_b: &Profile) -> f64 {
    if activity.preference_keys.is_empty() {
        return NEUTRAL;
    }
    let total = activity
        .preference_keys
        .iter()
        .map(|key| key_interest(profile_a.interest(key), profile_b.interest(key)))
        .sum::<f64>();
    total / activity.preference_keys.len() as f64
}

/// How well the pair can fill the role the content is written for.
///
/// Top content is anchored on a bottom: a native Bottom next to anyone who
/// can top aligns fully. A native Top without a bottom still fits well, a
/// flexible participant adapting into the top role fits less, and a pair
/// where nobody can top gets the soft zero. The bottom case mirrors it.
pub fn power_alignment(role: PowerRole, a: Orientation, b: Orientation) -> f64 {
    let (needed, anchor) = match role {
        PowerRole::Neutral | PowerRole::Switch => return 1.0,
        PowerRole::Top => (Orientation::Top, Orientation::Bottom),
        PowerRole::Bottom => (Orientation::Bottom, Orientation::Top),
    };
    let can_take = |o: Orientation| o == needed || o.is_flexible();

    if (a == anchor && can_take(b)) || (b == anchor && can_take(a)) {
        1.0
    } else if a == needed || b == needed {
        UNANCHORED_ALIGNMENT
    } else if can_take(a) || can_take(b) {
        SWITCH_ADAPT_ALIGNMENT
    } else {
        POWER_SOFT_ZERO
    }
}

/// Mean of both participants' normalized scores over the tagged domains.
pub fn domain_fit(activity: &Activity, profile_a: &Profile, profile_b: &Profile) -> f64 {
    if activity.domains.is_empty() {
        return NEUTRAL;
    }
    let total = activity
        .domains
        .iter()
        .map(|domain| (profile_a.domain_score(*domain) + profile_b.domain_score(*domain)) / 200.0)
        .sum::<f64>();
    total / activity.domains.len() as f64
}

/// Mean over tagged topics of the lower of the two interests.
/// `None` for dares and untagged truths.
pub fn topic_fit(activity: &Activity, profile_a: &Profile, profile_b: &Profile) -> Option<f64> {
    if !activity.is_topic_gated() {
        return None;
    }
    let total = activity
        .truth_topics
        .iter()
        .map(|topic| {
            profile_a
                .topic_interest(*topic)
                .min(profile_b.topic_interest(*topic))
        })
        .sum::<f64>();
    Some(total / activity.truth_topics.len() as f64)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use contracts::{ActivityType, Domain, Rating, RequiredBodyparts, TruthTopic};

    use super::*;

    fn activity(keys: &[&str]) -> Activity {
        Activity {
            id: 1,
            activity_type: ActivityType::Dare,
            rating: Rating::R,
            intensity: 2,
            power_role: PowerRole::Neutral,
            preference_keys: keys.iter().map(|k| k.to_string()).collect(),
            domains: BTreeSet::new(),
            hard_boundaries: BTreeSet::new(),
            truth_topics: BTreeSet::new(),
            required_bodyparts: RequiredBodyparts::default(),
            script: Vec::new(),
        }
    }

    fn answering(key: &str, value: f64) -> Profile {
        let mut profile = Profile::default();
        profile.activities.insert(key.to_string(), value);
        profile
    }

    #[test]
    fn key_interest_penalizes_mismatch() {
        assert_eq!(key_interest(1.0, 1.0), 1.0);
        assert_eq!(key_interest(1.0, 0.5), 0.6);
        assert_eq!(key_interest(0.0, 1.0), 0.1);
        assert_eq!(key_interest(0.5, 0.0), 0.25);
    }

    #[test]
    fn mutual_interest_is_neutral_without_keys() {
        let p = Profile::default();
        assert_eq!(mutual_interest(&activity(&[]), &p, &p), 0.5);
    }

    #[test]
    fn unanswered_key_reads_as_maybe() {
        let a = answering("massage_give", 1.0);
        let b = Profile::default();
        assert_eq!(mutual_interest(&activity(&["massage_give"]), &a, &b), 0.6);
    }

    #[test]
    fn power_alignment_table() {
        use Orientation::*;
        assert_eq!(power_alignment(PowerRole::Neutral, Bottom, Bottom), 1.0);
        assert_eq!(power_alignment(PowerRole::Switch, Top, Top), 1.0);
        assert_eq!(power_alignment(PowerRole::Top, Top, Bottom), 1.0);
        assert_eq!(power_alignment(PowerRole::Top, Bottom, Switch), 1.0);
        assert_eq!(power_alignment(PowerRole::Top, Versatile, Bottom), 1.0);
        assert_eq!(power_alignment(PowerRole::Top, Bottom, Bottom), 0.0);
        assert_eq!(power_alignment(PowerRole::Top, Top, Top), 0.8);
        assert_eq!(power_alignment(PowerRole::Top, Top, Switch), 0.8);
        assert_eq!(power_alignment(PowerRole::Top, Switch, Switch), 0.6);
        assert_eq!(power_alignment(PowerRole::Top, Versatile, VersatileUndefined), 0.6);
        assert_eq!(power_alignment(PowerRole::Bottom, Top, Top), 0.0);
        assert_eq!(power_alignment(PowerRole::Bottom, Bottom, Bottom), 0.8);
        assert_eq!(power_alignment(PowerRole::Bottom, Switch, Top), 1.0);
        assert_eq!(power_alignment(PowerRole::Bottom, Bottom, Switch), 0.8);
        assert_eq!(power_alignment(PowerRole::Bottom, Switch, Switch), 0.6);
    }

    #[test]
    fn domain_fit_rises_with_either_score() {
        let mut tagged = activity(&[]);
        tagged.domains = BTreeSet::from([Domain::Sensation]);
        let mut a = Profile::default();
        let b = Profile::default();
        a.domain_scores.insert(Domain::Sensation, 40.0);
        let low = domain_fit(&tagged, &a, &b);
        a.domain_scores.insert(Domain::Sensation, 90.0);
        let high = domain_fit(&tagged, &a, &b);
        assert!(high > low);
        assert_eq!(domain_fit(&activity(&[]), &a, &b), 0.5);
    }

    #[test]
    fn topic_fit_uses_the_lower_interest() {
        let mut truth = activity(&[]);
        truth.activity_type = ActivityType::Truth;
        truth.truth_topics = BTreeSet::from([TruthTopic::Fantasies, TruthTopic::TurnOns]);
        let mut a = Profile::default();
        a.truth_topics.insert(TruthTopic::Fantasies, 1.0);
        a.truth_topics.insert(TruthTopic::TurnOns, 1.0);
        let mut b = Profile::default();
        b.truth_topics.insert(TruthTopic::Fantasies, 0.5);
        b.truth_topics.insert(TruthTopic::TurnOns, 1.0);
        assert_eq!(topic_fit(&truth, &a, &b), Some(0.75));
        assert_eq!(topic_fit(&activity(&[]), &a, &b), None);
    }

    #[test]
    fn topic_fit_is_blended_only_when_present() {
        let weights = SelectionWeights::default();
        let p = Profile::default();
        let dare = score(&activity(&[]), &p, &p, &weights, 0.5);
        assert_eq!(dare.topic_fit, None);
        assert_eq!(dare.total, dare.base);

        let mut truth = activity(&[]);
        truth.activity_type = ActivityType::Truth;
        truth.truth_topics = BTreeSet::from([TruthTopic::Boundaries]);
        let scored = score(&truth, &p, &p, &weights, 0.5);
        assert_eq!(scored.topic_fit, Some(0.5));
        assert!((scored.total - scored.base * 0.75).abs() < 1e-12);
    }
}
