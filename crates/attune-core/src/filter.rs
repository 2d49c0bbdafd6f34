//! Hard-constraint candidate filter.
//!
//! The acting participant alternates with step parity (odd step: A acts).
//! Anatomy requirements are checked against whoever actually acts this step.

use std::fmt;

use contracts::{Activity, Actor, Profile, TruthTopic, TurnContext};
use serde::Serialize;

/// Why the filter discarded a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterReason {
    Rating,
    Anatomy,
    HardBoundary,
    RefusedTopic(TruthTopic),
    AlreadyUsed,
}

impl fmt::Display for FilterReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterReason::Rating => f.write_str("rating above session tier"),
            FilterReason::Anatomy => f.write_str("anatomy requirement not met"),
            FilterReason::HardBoundary => f.write_str("touches a hard limit"),
            FilterReason::RefusedTopic(topic) => write!(f, "topic {} refused", topic.as_str()),
            FilterReason::AlreadyUsed => f.write_str("already used this session"),
        }
    }
}

/// Per-reason discard counts for one filtering pass.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct FilterStats {
    pub examined: usize,
    pub admitted: usize,
    pub rating: usize,
    pub anatomy: usize,
    pub hard_boundary: usize,
    pub refused_topic: usize,
    pub already_used: usize,
}

impl FilterStats {
    pub fn record(&mut self, outcome: Result<(), FilterReason>) {
        self.examined += 1;
        match outcome {
            Ok(()) => self.admitted += 1,
            Err(FilterReason::Rating) => self.rating += 1,
            Err(FilterReason::Anatomy) => self.anatomy += 1,
            Err(FilterReason::HardBoundary) => self.hard_boundary += 1,
            Err(FilterReason::RefusedTopic(_)) => self.refused_topic += 1,
            Err(FilterReason::AlreadyUsed) => self.already_used += 1,
        }
    }
}

/// Resolves (actor, partner) profiles for the turn's parity.
pub fn roles<'p>(
    ctx: &TurnContext,
    profile_a: &'p Profile,
    profile_b: &'p Profile,
) -> (&'p Profile, &'p Profile) {
    match ctx.acting() {
        Actor::A => (profile_a, profile_b),
        Actor::B => (profile_b, profile_a),
    }
}

/// Checks one catalog entry against every hard constraint, in order.
pub fn admit(
    activity: &Activity,
    ctx: &TurnContext,
    profile_a: &Profile,
    profile_b: &Profile,
) -> Result<(), FilterReason> {
    if !ctx.rating_tier.admits(activity.rating) {
        return Err(FilterReason::Rating);
    }

    let (actor, partner) = roles(ctx, profile_a, profile_b);
    if !actor.has_body_parts(&activity.required_bodyparts.active)
        || !partner.has_body_parts(&activity.required_bodyparts.partner)
    {
        return Err(FilterReason::Anatomy);
    }

    if violates_hard_limits(activity, profile_a, profile_b) {
        return Err(FilterReason::HardBoundary);
    }

    if let Some(topic) = refused_topic(activity, profile_a, profile_b) {
        return Err(FilterReason::RefusedTopic(topic));
    }

    if ctx.excluded_activity_ids.contains(&activity.id) {
        return Err(FilterReason::AlreadyUsed);
    }
    Ok(())
}

pub fn violates_hard_limits(activity: &Activity, profile_a: &Profile, profile_b: &Profile) -> bool {
    activity
        .hard_boundaries
        .iter()
        .any(|key| profile_a.hard_limits().contains(key) || profile_b.hard_limits().contains(key))
}

/// First tagged topic either participant answered with an explicit zero.
/// Untagged truths and dares never match.
fn refused_topic(activity: &Activity, profile_a: &Profile, profile_b: &Profile) -> Option<TruthTopic> {
    if !activity.is_topic_gated() {
        return None;
    }
    activity.truth_topics.iter().copied().find(|topic| {
        profile_a.topic_interest(*topic) == 0.0 || profile_b.topic_interest(*topic) == 0.0
    })
}
