//! Per-turn selection context.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{ActivityId, ActivityType, Actor, Rating};

/// Everything the engine needs to know about one turn. Created fresh per
/// turn; persisting it between turns is the caller's concern.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnContext {
    /// 1-based step in the session. May exceed `total_steps` for sessions
    /// that keep going; pacing wraps around.
    pub step_index: u32,
    pub total_steps: u32,
    pub rating_tier: Rating,
    #[serde(default)]
    pub running_truth_count: u32,
    #[serde(default)]
    pub running_dare_count: u32,
    #[serde(default)]
    pub forced_type: Option<ActivityType>,
    #[serde(default)]
    pub excluded_activity_ids: BTreeSet<ActivityId>,
}

impl TurnContext {
    pub fn new(step_index: u32, total_steps: u32, rating_tier: Rating) -> Self {
        Self {
            step_index,
            total_steps,
            rating_tier,
            running_truth_count: 0,
            running_dare_count: 0,
            forced_type: None,
            excluded_activity_ids: BTreeSet::new(),
        }
    }

    /// Odd steps are acted by participant A, even steps by participant B.
    pub fn acting(&self) -> Actor {
        if self.step_index % 2 == 1 {
            Actor::A
        } else {
            Actor::B
        }
    }
}
