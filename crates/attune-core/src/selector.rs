//! Per-turn selection: scheduler, balancer, filter, validator and scorer
//! composed into one pass over the catalog snapshot.

use std::collections::BTreeMap;

use contracts::{Activity, ActivityType, Actor, EngineConfig, Profile, TurnContext};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, warn};

use crate::balance::choose_type;
use crate::catalog::ActivityCatalog;
use crate::filter::{self, FilterStats};
use crate::phase::{IntensityBand, Phase, PhaseSchedule};
use crate::scorer::{self, ScoreBreakdown};
use crate::validator::{self, CandidateChecks};

/// Scores closer than this are treated as tied.
const TIE_EPSILON: f64 = 1e-9;

/// How the catalog narrowed down to the pick.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct FunnelStats {
    pub filter: FilterStats,
    pub rejections: BTreeMap<&'static str, usize>,
    pub valid: usize,
    pub sampled: usize,
    pub power_vetoed: usize,
    pub tied: usize,
    /// The balancer's type had no candidates and the other type was used.
    pub fell_back: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectedActivity<'c> {
    pub activity: &'c Activity,
    pub activity_type: ActivityType,
    pub step_index: u32,
    pub phase: Phase,
    pub band: IntensityBand,
    pub actor: Actor,
    pub score: ScoreBreakdown,
    pub funnel: FunnelStats,
}

/// Outcome of one turn. `NotFound` is a normal result when nothing survives
/// the filter and validator.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Selection<'c> {
    Found(SelectedActivity<'c>),
    NotFound {
        requested: ActivityType,
        phase: Phase,
        funnel: FunnelStats,
    },
}

impl<'c> Selection<'c> {
    pub fn activity(&self) -> Option<&'c Activity> {
        match self {
            Selection::Found(selected) => Some(selected.activity),
            Selection::NotFound { .. } => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Selection::Found(_))
    }
}

/// RNG seeded from config when a seed is set, from entropy otherwise.
pub fn rng_for(config: &EngineConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// One-shot selection with default configuration.
pub fn select_activity<'c>(
    ctx: &TurnContext,
    profile_a: &Profile,
    profile_b: &Profile,
    catalog: &'c ActivityCatalog,
) -> Selection<'c> {
    let selector = Selector::default();
    let mut rng = rng_for(selector.config());
    selector.select(ctx, profile_a, profile_b, catalog, &mut rng)
}

#[derive(Debug, Clone, Default)]
pub struct Selector {
    config: EngineConfig,
}

impl Selector {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Picks the turn's type with the balancer, falling back to the other
    /// type only when the type was not forced.
    pub fn select<'c, R: Rng + ?Sized>(
        &self,
        ctx: &TurnContext,
        profile_a: &Profile,
        profile_b: &Profile,
        catalog: &'c ActivityCatalog,
        rng: &mut R,
    ) -> Selection<'c> {
        let schedule = PhaseSchedule::new(ctx.total_steps);
        let phase = schedule.phase_at(ctx.step_index);
        let requested = choose_type(
            phase,
            ctx.running_truth_count,
            ctx.running_dare_count,
            ctx.forced_type,
        );

        let selection = self.select_type(ctx, profile_a, profile_b, catalog, requested, rng);
        if selection.is_found() || ctx.forced_type.is_some() {
            return selection;
        }

        debug!(
            step = ctx.step_index,
            requested = %requested,
            "no candidates for balanced type, trying the other"
        );
        match self.select_type(ctx, profile_a, profile_b, catalog, requested.other(), rng) {
            Selection::Found(mut selected) => {
                selected.funnel.fell_back = true;
                Selection::Found(selected)
            }
            Selection::NotFound { .. } => selection,
        }
    }

    /// Runs the pipeline restricted to one activity type.
    pub fn select_type<'c, R: Rng + ?Sized>(
        &self,
        ctx: &TurnContext,
        profile_a: &Profile,
        profile_b: &Profile,
        catalog: &'c ActivityCatalog,
        activity_type: ActivityType,
        rng: &mut R,
    ) -> Selection<'c> {
        let schedule = PhaseSchedule::new(ctx.total_steps);
        let phase = schedule.phase_at(ctx.step_index);
        let band = phase.band(ctx.rating_tier);
        let mut funnel = FunnelStats::default();

        let mut valid = Vec::new();
        for activity in catalog.of_type(activity_type) {
            let admitted = filter::admit(activity, ctx, profile_a, profile_b);
            funnel.filter.record(admitted);
            if admitted.is_err() {
                continue;
            }
            let checks = CandidateChecks::for_pair(activity, profile_a, profile_b);
            match validator::validate(activity, ctx.step_index, band, checks, &self.config) {
                Ok(()) => valid.push(activity),
                Err(rejection) => *funnel.rejections.entry(rejection.kind()).or_default() += 1,
            }
        }
        funnel.valid = valid.len();

        let pool: Vec<&Activity> = if valid.len() > self.config.candidate_pool_limit {
            valid
                .choose_multiple(rng, self.config.candidate_pool_limit)
                .copied()
                .collect()
        } else {
            valid
        };
        funnel.sampled = pool.len();

        let mut scored = Vec::with_capacity(pool.len());
        for activity in pool {
            let breakdown = scorer::score(
                activity,
                profile_a,
                profile_b,
                &self.config.selection_weights,
                self.config.topic_blend_floor,
            );
            if self.config.power_hard_veto && breakdown.power_alignment <= scorer::POWER_SOFT_ZERO {
                funnel.power_vetoed += 1;
                continue;
            }
            scored.push((activity, breakdown));
        }

        let best_total = scored
            .iter()
            .map(|(_, breakdown)| breakdown.total)
            .fold(f64::NEG_INFINITY, f64::max);
        let tied: Vec<&(&Activity, ScoreBreakdown)> = scored
            .iter()
            .filter(|(_, breakdown)| best_total - breakdown.total <= TIE_EPSILON)
            .collect();
        funnel.tied = tied.len();

        let Some(&&(activity, score)) = tied.choose(rng) else {
            warn!(
                step = ctx.step_index,
                phase = %phase,
                requested = %activity_type,
                examined = funnel.filter.examined,
                admitted = funnel.filter.admitted,
                valid = funnel.valid,
                vetoed = funnel.power_vetoed,
                "no activity survived selection"
            );
            return Selection::NotFound {
                requested: activity_type,
                phase,
                funnel,
            };
        };

        debug!(
            step = ctx.step_index,
            phase = %phase,
            activity_id = activity.id,
            total = score.total,
            mutual_interest = score.mutual_interest,
            power_alignment = score.power_alignment,
            domain_fit = score.domain_fit,
            topic_fit = ?score.topic_fit,
            tied = funnel.tied,
            "selected activity"
        );
        Selection::Found(SelectedActivity {
            activity,
            activity_type,
            step_index: ctx.step_index,
            phase,
            band,
            actor: ctx.acting(),
            score,
            funnel,
        })
    }
}
