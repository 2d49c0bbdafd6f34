//! Stateful session planner over [`Selector`]: rotates players, keeps the
//! running type counts and the exclusion history between turns.

use std::collections::BTreeSet;

use contracts::{
    ActivityId, ActivityType, EngineConfig, Profile, Rating, TurnContext,
    DEFAULT_SESSION_LENGTH,
};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::audit::{audit_sequence, PlayedPick, SequenceAudit};
use crate::catalog::ActivityCatalog;
use crate::error::EngineError;
use crate::phase::Phase;
use crate::scorer::ScoreBreakdown;
use crate::selector::{Selection, Selector};
use crate::text::PartnerNameResolver;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerOrder {
    #[default]
    Sequential,
    Random,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionMode {
    /// The engine picks one card per turn.
    #[default]
    Random,
    /// The engine offers a truth and a dare; the player commits one.
    Manual,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SessionSettings {
    pub rating_tier: Rating,
    pub total_steps: u32,
    pub forced_type: Option<ActivityType>,
    /// When false the session is truth-only.
    pub include_dare: bool,
    pub player_order: PlayerOrder,
    pub selection_mode: SelectionMode,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            rating_tier: Rating::R,
            total_steps: DEFAULT_SESSION_LENGTH,
            forced_type: None,
            include_dare: true,
            player_order: PlayerOrder::Sequential,
            selection_mode: SelectionMode::Random,
        }
    }
}

impl SessionSettings {
    pub fn effective_forced_type(&self) -> Option<ActivityType> {
        if self.include_dare {
            self.forced_type
        } else {
            Some(ActivityType::Truth)
        }
    }
}

/// A card ready to show: the picked activity with its text personalized.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Card {
    pub step: u32,
    pub activity_id: ActivityId,
    pub activity_type: ActivityType,
    pub phase: Phase,
    /// Index of the acting player.
    pub primary: usize,
    pub secondary: usize,
    pub text: String,
    pub score: ScoreBreakdown,
}

/// Manual-mode choice for one turn.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Offer {
    pub step: u32,
    pub primary: usize,
    pub secondary: usize,
    pub truth: Option<Card>,
    pub dare: Option<Card>,
}

impl Offer {
    pub fn card(&self, activity_type: ActivityType) -> Option<&Card> {
        match activity_type {
            ActivityType::Truth => self.truth.as_ref(),
            ActivityType::Dare => self.dare.as_ref(),
        }
    }
}

pub struct SessionPlanner<'c, R> {
    catalog: &'c ActivityCatalog,
    selector: Selector,
    settings: SessionSettings,
    players: Vec<Profile>,
    resolver: PartnerNameResolver,
    rng: R,
    next_step: u32,
    truths: u32,
    dares: u32,
    used: BTreeSet<ActivityId>,
    played: Vec<Card>,
}

impl<'c, R: Rng> SessionPlanner<'c, R> {
    pub fn new(
        catalog: &'c ActivityCatalog,
        config: EngineConfig,
        settings: SessionSettings,
        players: Vec<Profile>,
        rng: R,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        if players.len() < 2 {
            return Err(EngineError::NotEnoughPlayers(players.len()));
        }
        for player in &players {
            player.validate()?;
        }
        Ok(Self {
            catalog,
            selector: Selector::new(config),
            settings,
            players,
            resolver: PartnerNameResolver::new()?,
            rng,
            next_step: 1,
            truths: 0,
            dares: 0,
            used: BTreeSet::new(),
            played: Vec::new(),
        })
    }

    pub fn next_step(&self) -> u32 {
        self.next_step
    }

    pub fn played(&self) -> &[Card] {
        &self.played
    }

    pub fn counts(&self) -> (u32, u32) {
        (self.truths, self.dares)
    }

    /// Plays one turn in random mode. The step advances even when nothing
    /// fits; the caller decides what to show in that case.
    pub fn next_card(&mut self) -> Option<Card> {
        let step = self.next_step;
        let (primary, secondary) = self.rotation(step);
        let ctx = self.context(step);
        let (profile_a, profile_b) = acting_pair(&self.players, step, primary, secondary);

        let selection = self
            .selector
            .select(&ctx, profile_a, profile_b, self.catalog, &mut self.rng);
        let card = self.card_from(&selection, step, primary, secondary);
        self.next_step += 1;

        match card {
            Some(card) => {
                self.record(&card);
                self.played.push(card.clone());
                Some(card)
            }
            None => {
                info!(step, "no card available for turn");
                None
            }
        }
    }

    /// Builds a manual-mode offer without advancing the session.
    pub fn offer(&mut self) -> Offer {
        let step = self.next_step;
        let (primary, secondary) = self.rotation(step);
        let ctx = self.context(step);
        let (profile_a, profile_b) = acting_pair(&self.players, step, primary, secondary);
        let forced = self.settings.effective_forced_type();

        let mut pick = |activity_type: ActivityType| {
            if forced.is_some_and(|only| only != activity_type) {
                return None;
            }
            let selection = self.selector.select_type(
                &ctx,
                profile_a,
                profile_b,
                self.catalog,
                activity_type,
                &mut self.rng,
            );
            Some(selection)
        };
        let truth = pick(ActivityType::Truth);
        let dare = pick(ActivityType::Dare);

        Offer {
            step,
            primary,
            secondary,
            truth: truth.and_then(|s| self.card_from(&s, step, primary, secondary)),
            dare: dare.and_then(|s| self.card_from(&s, step, primary, secondary)),
        }
    }

    /// Commits the chosen side of an offer. Both offered cards leave the pool.
    pub fn commit(&mut self, offer: &Offer, choice: ActivityType) -> Result<Card, EngineError> {
        if offer.step != self.next_step {
            return Err(EngineError::StaleOffer {
                offered: offer.step,
                current: self.next_step,
            });
        }
        let card = offer
            .card(choice)
            .cloned()
            .ok_or(EngineError::ChoiceUnavailable {
                step: offer.step,
                choice,
            })?;
        for offered in [&offer.truth, &offer.dare].into_iter().flatten() {
            self.used.insert(offered.activity_id);
        }
        self.record(&card);
        self.played.push(card.clone());
        self.next_step += 1;
        Ok(card)
    }

    /// Audits the played sequence against the acting pair of each step.
    pub fn audit(&self) -> SequenceAudit {
        let picks: Vec<PlayedPick<'_>> = self
            .played
            .iter()
            .filter_map(|card| {
                let activity = self.catalog.get(card.activity_id)?;
                let (profile_a, profile_b) =
                    acting_pair(&self.players, card.step, card.primary, card.secondary);
                Some(PlayedPick {
                    step: card.step,
                    activity,
                    profile_a,
                    profile_b,
                })
            })
            .collect();
        audit_sequence(
            &picks,
            self.settings.total_steps,
            self.settings.rating_tier,
            self.selector.config(),
        )
    }

    fn rotation(&mut self, step: u32) -> (usize, usize) {
        let count = self.players.len();
        let primary = match self.settings.player_order {
            PlayerOrder::Sequential => (step.saturating_sub(1) as usize) % count,
            PlayerOrder::Random => self.rng.gen_range(0..count),
        };
        (primary, (primary + 1) % count)
    }

    fn context(&self, step: u32) -> TurnContext {
        TurnContext {
            step_index: step,
            total_steps: self.settings.total_steps,
            rating_tier: self.settings.rating_tier,
            running_truth_count: self.truths,
            running_dare_count: self.dares,
            forced_type: self.settings.effective_forced_type(),
            excluded_activity_ids: self.used.clone(),
        }
    }

    fn card_from(
        &self,
        selection: &Selection<'_>,
        step: u32,
        primary: usize,
        secondary: usize,
    ) -> Option<Card> {
        let Selection::Found(selected) = selection else {
            return None;
        };
        let lead = selected.activity.lead_text().unwrap_or_default();
        Some(Card {
            step,
            activity_id: selected.activity.id,
            activity_type: selected.activity_type,
            phase: selected.phase,
            primary,
            secondary,
            text: self.resolver.resolve(lead, self.players[secondary].name()),
            score: selected.score,
        })
    }

    fn record(&mut self, card: &Card) {
        self.used.insert(card.activity_id);
        match card.activity_type {
            ActivityType::Truth => self.truths += 1,
            ActivityType::Dare => self.dares += 1,
        }
        debug!(
            step = card.step,
            activity_id = card.activity_id,
            truths = self.truths,
            dares = self.dares,
            "card committed"
        );
    }
}

/// Orders the pair so the engine's parity rule makes the primary act.
fn acting_pair(
    players: &[Profile],
    step: u32,
    primary: usize,
    secondary: usize,
) -> (&Profile, &Profile) {
    let (primary, secondary) = (&players[primary], &players[secondary]);
    if step % 2 == 1 {
        (primary, secondary)
    } else {
        (secondary, primary)
    }
}
