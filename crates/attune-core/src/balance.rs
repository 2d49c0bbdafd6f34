//! Truth/dare type balancing.

use contracts::ActivityType;

use crate::phase::Phase;

/// Truths the warmup phase must deliver before balancing takes over.
pub const WARMUP_MIN_TRUTHS: u32 = 2;
const LOW_TRUTH_RATIO: f64 = 0.4;
const HIGH_TRUTH_RATIO: f64 = 0.6;

/// Picks the type of the next card from the running counts.
pub fn choose_type(
    phase: Phase,
    truths: u32,
    dares: u32,
    forced: Option<ActivityType>,
) -> ActivityType {
    if let Some(forced) = forced {
        return forced;
    }
    if phase == Phase::Warmup && truths < WARMUP_MIN_TRUTHS {
        return ActivityType::Truth;
    }
    let total = truths + dares;
    if total == 0 {
        return ActivityType::Truth;
    }
    let truth_ratio = f64::from(truths) / f64::from(total);
    if truth_ratio < LOW_TRUTH_RATIO {
        ActivityType::Truth
    } else if truth_ratio > HIGH_TRUTH_RATIO {
        ActivityType::Dare
    } else if truths > dares {
        ActivityType::Dare
    } else {
        ActivityType::Truth
    }
}
