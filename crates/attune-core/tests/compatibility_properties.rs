use std::collections::BTreeMap;

use attune_core::compatibility::{
    activity_overlap, domain_similarity, power_complement, se_modifier, sisc_modifier,
    truth_overlap,
};
use attune_core::calculate_compatibility;
use contracts::{
    ArousalPropensity, CompatibilityBand, Domain, Orientation, Profile, TruthTopic,
};
use proptest::prelude::*;

fn answer() -> impl Strategy<Value = f64> {
    prop_oneof![Just(0.0), Just(0.5), Just(1.0)]
}

fn with_domains(orientation: Orientation, scores: &[f64]) -> Profile {
    let mut profile = Profile::default();
    profile.power_dynamic.orientation = orientation;
    profile.domain_scores = Domain::ALL
        .into_iter()
        .zip(scores.iter().copied())
        .collect::<BTreeMap<_, _>>();
    profile
}

fn with_arousal(excitation: f64, inhibition_consequence: f64) -> Profile {
    Profile {
        arousal_propensity: Some(ArousalPropensity {
            excitation,
            inhibition_performance: 0.5,
            inhibition_consequence,
        }),
        ..Profile::default()
    }
}

#[test]
fn property_power_complement_floors_and_ordering() {
    use Orientation::*;
    assert_eq!(power_complement(Top, 0.9, Top, 0.2), 0.50);
    assert_eq!(power_complement(Bottom, 0.4, Bottom, 0.4), 0.50);
    assert_eq!(power_complement(Switch, 0.5, Switch, 0.5), 0.85);

    let versatile_pair = power_complement(Versatile, 0.5, Versatile, 0.5);
    assert!(versatile_pair >= 0.70 && versatile_pair > 0.50);
    assert!(power_complement(VersatileUndefined, 0.5, Versatile, 0.5) >= 0.70);

    for (pole, other) in [(Top, Bottom), (Bottom, Top)] {
        let complementary = power_complement(pole, 0.6, other, 0.6);
        assert!(complementary >= 0.8);
        for versatile in [Versatile, VersatileUndefined] {
            let mixed = power_complement(versatile, 0.6, pole, 0.6);
            assert!(mixed > 0.50 && mixed < complementary);
        }
    }
}

#[test]
fn property_se_modifier_both_high_is_symmetric_full_bonus() {
    assert_eq!(se_modifier(0.8, 0.75), se_modifier(0.75, 0.8));
    assert_eq!(se_modifier(0.8, 0.75), 0.03);
}

#[test]
fn sisc_alignment_moves_overall_score_in_the_documented_direction() {
    let report = |a: &Profile, b: &Profile| calculate_compatibility(a, b);

    let both_mid = report(&with_arousal(0.5, 0.5), &with_arousal(0.5, 0.5));
    let mismatch = report(&with_arousal(0.5, 0.9), &with_arousal(0.5, 0.1));
    let both_high = report(&with_arousal(0.5, 0.9), &with_arousal(0.5, 0.85));
    let no_arousal = report(&Profile::default(), &Profile::default());

    assert!(both_mid.overall_score > no_arousal.overall_score);
    assert!(mismatch.overall_score < no_arousal.overall_score);
    assert!(both_high.overall_score.abs_diff(no_arousal.overall_score) <= 1);
}

#[test]
fn complementary_pair_with_shared_answers_scores_high() {
    let mut top = with_domains(Orientation::Top, &[80.0, 70.0, 90.0, 60.0, 50.0]);
    top.power_dynamic.intensity = 0.8;
    let mut bottom = with_domains(Orientation::Bottom, &[80.0, 70.0, 90.0, 60.0, 50.0]);
    bottom.power_dynamic.intensity = 0.8;
    for (key, value) in [("massage_give", 1.0), ("kissing", 1.0), ("choking", 0.0)] {
        top.activities.insert(key.to_string(), value);
        bottom.activities.insert(key.to_string(), value);
    }
    for topic in TruthTopic::ALL {
        top.truth_topics.insert(topic, 1.0);
        bottom.truth_topics.insert(topic, 1.0);
    }

    let report = calculate_compatibility(&top, &bottom);
    assert_eq!(report.overall_score, 100);
    assert_eq!(report.interpretation_label, CompatibilityBand::Exceptional);
    assert_eq!(report.mutual_activities.len(), 2);
    assert_eq!(report.mutual_truth_topics.len(), TruthTopic::ALL.len());
    assert!(report.boundary_conflicts.is_empty());
}

proptest! {
    #[test]
    fn property_self_overlap_is_near_total(
        answers in proptest::collection::btree_map("[a-z]{1,8}_(give|receive)", answer(), 1..40),
    ) {
        let profile = Profile { activities: answers, ..Profile::default() };
        prop_assert!(activity_overlap(&profile, &profile) >= 0.95);
    }

    #[test]
    fn property_self_truth_overlap_is_total(values in proptest::collection::vec(answer(), 8)) {
        let mut profile = Profile::default();
        for (topic, value) in TruthTopic::ALL.into_iter().zip(values) {
            profile.truth_topics.insert(topic, value);
        }
        prop_assert!(truth_overlap(&profile, &profile) >= 0.95);
    }

    #[test]
    fn property_identical_domains_depend_on_pole_pairing(
        scores in proptest::collection::vec(0.0_f64..=100.0, 5),
    ) {
        let same = |a: Orientation, b: Orientation| {
            domain_similarity(&with_domains(a, &scores), &with_domains(b, &scores))
        };
        prop_assert!(same(Orientation::Top, Orientation::Bottom) >= 0.90);
        prop_assert!(same(Orientation::Switch, Orientation::Switch) >= 0.90);
        prop_assert!(same(Orientation::Top, Orientation::Top) <= 0.55);
        prop_assert!(same(Orientation::Bottom, Orientation::Bottom) <= 0.55);
    }

    #[test]
    fn property_modifiers_are_symmetric_and_small(a in 0.0_f64..=1.0, b in 0.0_f64..=1.0) {
        prop_assert_eq!(se_modifier(a, b), se_modifier(b, a));
        prop_assert_eq!(sisc_modifier(a, b), sisc_modifier(b, a));
        prop_assert!(se_modifier(a, b).abs() <= 0.03);
        prop_assert!(sisc_modifier(a, b).abs() <= 0.03);
    }

    #[test]
    fn property_report_is_symmetric_in_score(
        a_answers in proptest::collection::btree_map("[a-c]_give", answer(), 0..3),
        b_answers in proptest::collection::btree_map("[a-c]_give", answer(), 0..3),
    ) {
        let a = Profile { activities: a_answers, ..Profile::default() };
        let b = Profile { activities: b_answers, ..Profile::default() };
        let forward = calculate_compatibility(&a, &b);
        let backward = calculate_compatibility(&b, &a);
        prop_assert_eq!(forward.overall_score, backward.overall_score);
        prop_assert!(forward.overall_score <= 100);
    }
}
