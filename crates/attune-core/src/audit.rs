//! After-the-fact check of a played sequence.

use contracts::{Activity, ActivityId, EngineConfig, Profile, Rating};
use serde::Serialize;

use crate::balance::WARMUP_MIN_TRUTHS;
use crate::phase::{Phase, PhaseSchedule};
use crate::validator::{self, CandidateChecks, Rejection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditFinding {
    pub step: u32,
    pub activity_id: ActivityId,
    pub rejection: Rejection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceAudit {
    pub findings: Vec<AuditFinding>,
    pub warmup_truths: u32,
    /// Truths the warmup span should have delivered but did not.
    pub warmup_truth_shortfall: u32,
}

impl SequenceAudit {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty() && self.warmup_truth_shortfall == 0
    }
}

/// One played pick: the step it was dealt at and the pair that acted on it.
#[derive(Debug, Clone, Copy)]
pub struct PlayedPick<'a> {
    pub step: u32,
    pub activity: &'a Activity,
    pub profile_a: &'a Profile,
    pub profile_b: &'a Profile,
}

/// Summary counts for logs and CLI output.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct AuditSummary {
    pub findings: usize,
    pub warmup_truths: u32,
    pub warmup_truth_shortfall: u32,
}

impl From<&SequenceAudit> for AuditSummary {
    fn from(audit: &SequenceAudit) -> Self {
        Self {
            findings: audit.findings.len(),
            warmup_truths: audit.warmup_truths,
            warmup_truth_shortfall: audit.warmup_truth_shortfall,
        }
    }
}

/// Re-validates each pick at the step it was played, against the pair that
/// played it, and checks that the warmup delivered its minimum truths. The
/// warmup rule is only judged once play has reached the end of the warmup.
pub fn audit_sequence(
    picks: &[PlayedPick<'_>],
    total_steps: u32,
    rating: Rating,
    config: &EngineConfig,
) -> SequenceAudit {
    let schedule = PhaseSchedule::new(total_steps);
    let mut audit = SequenceAudit::default();

    for pick in picks {
        let step = pick.step;
        let band = schedule.band_at(step, rating);
        let checks = CandidateChecks::for_pair(pick.activity, pick.profile_a, pick.profile_b);
        if let Err(rejection) = validator::validate(pick.activity, step, band, checks, config) {
            audit.findings.push(AuditFinding {
                step,
                activity_id: pick.activity.id,
                rejection,
            });
        }
        if step <= total_steps
            && schedule.phase_at(step) == Phase::Warmup
            && pick.activity.is_truth()
        {
            audit.warmup_truths += 1;
        }
    }

    if let Some((start, end)) = schedule.span(Phase::Warmup) {
        let covered = picks.iter().any(|pick| pick.step >= end);
        let required = WARMUP_MIN_TRUTHS.min(end - start + 1);
        if covered && audit.warmup_truths < required {
            audit.warmup_truth_shortfall = required - audit.warmup_truths;
        }
    }
    audit
}
