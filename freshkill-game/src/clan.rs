//! Clan food state: the pile, the nutrition records and the passes that
//! connect them.
use serde::{Deserialize, Serialize};

use crate::allocation::{FeedingOutcome, FeedingPass, PassKind};
use crate::config::PreyConfig;
use crate::constants::{
    LOG_FEEDING_SUPPRESSED, LOG_GROUP_UNDERFED, LOG_MANUAL_FEEDING, LOG_PREY_CONSUMED,
    LOG_PREY_SPOILED, LOG_RATIONING, SUPPLY_DIVIDER_DEFAULT, SUPPLY_DIVIDER_EXPANDED,
    SUPPLY_MIN_FACTOR_EXPANDED,
};
use crate::member::{ClanMember, MemberId};
use crate::numbers::{count_to_f64, i64_to_f64, round_f64_to_i64, round_prey};
use crate::nutrition::{NutritionStatus, NutritionTracker, sickness_surcharge};
use crate::pile::FreshkillPile;
use crate::policy::{CarveOut, plan_feeding};
use crate::queens::QueenIndex;
use crate::settings::{ClanSettings, GameMode};

/// Supply bands an event can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplyTrigger {
    Always,
    Low,
    Adequate,
    Full,
    Excess,
}

/// Result of one moon for the pile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoonReport {
    pub spoiled: f64,
    /// Clan need after the moon, for the next round of supply checks.
    pub needed: f64,
    pub outcome: FeedingOutcome,
    pub logs: Vec<String>,
}

impl MoonReport {
    #[must_use]
    pub fn consumed(&self) -> f64 {
        self.outcome.consumed
    }
}

/// Persisted clan food state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClanFood {
    pub pile: FreshkillPile,
    #[serde(default)]
    pub nutrition: NutritionTracker,
    #[serde(skip, default = "PreyConfig::default_config")]
    config: PreyConfig,
    #[serde(skip)]
    needed_prey: f64,
}

impl Default for ClanFood {
    fn default() -> Self {
        Self::new(PreyConfig::default_config())
    }
}

impl ClanFood {
    #[must_use]
    pub fn new(config: PreyConfig) -> Self {
        Self {
            pile: FreshkillPile::with_start_amount(config.start_amount),
            nutrition: NutritionTracker::new(),
            config,
            needed_prey: 0.0,
        }
    }

    #[must_use]
    pub fn with_pile(mut self, pile: FreshkillPile) -> Self {
        self.pile = pile;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &PreyConfig {
        &self.config
    }

    /// Swap in balance data, e.g. after loading saved state.
    pub fn set_config(&mut self, config: PreyConfig) {
        self.config = config;
    }

    /// Need computed at the end of the last moon.
    #[must_use]
    pub const fn cached_need(&self) -> f64 {
        self.needed_prey
    }

    pub fn add_prey(&mut self, amount: f64) {
        self.pile.add(amount);
    }

    /// Age the pile and feed every living member.
    pub fn moon_skip(&mut self, roster: &[ClanMember], settings: &ClanSettings) -> MoonReport {
        let spoiled = self.pile.age_one_tick();
        let mut logs = Vec::new();
        if self.config.report_spoilage && spoiled > 0.0 {
            log::debug!("{:.2} prey spoiled", round_prey(spoiled));
            logs.push(String::from(LOG_PREY_SPOILED));
        }

        let members: Vec<&ClanMember> = roster.iter().filter(|member| member.alive_in_clan).collect();
        let outcome = self.run_pass(PassKind::MoonSkip, roster, &members, settings, &mut logs);
        logs.push(String::from(LOG_PREY_CONSUMED));

        self.needed_prey = self.amount_food_needed(roster, settings.game_mode);
        MoonReport {
            spoiled,
            needed: self.needed_prey,
            outcome,
            logs,
        }
    }

    /// Top up the selected members from the pile. Scores never drop.
    pub fn feed_members(
        &mut self,
        roster: &[ClanMember],
        selected: &[MemberId],
        settings: &ClanSettings,
    ) -> FeedingOutcome {
        let members: Vec<&ClanMember> = roster
            .iter()
            .filter(|member| member.alive_in_clan && selected.contains(&member.id))
            .collect();
        let mut logs = vec![String::from(LOG_MANUAL_FEEDING)];
        self.run_pass(PassKind::Manual, roster, &members, settings, &mut logs)
    }

    fn run_pass(
        &mut self,
        kind: PassKind,
        roster: &[ClanMember],
        members: &[&ClanMember],
        settings: &ClanSettings,
        logs: &mut Vec<String>,
    ) -> FeedingOutcome {
        let queens = QueenIndex::build(roster, self.config.queen_kit_age_moons);
        self.nutrition
            .recompute(roster, &queens, settings.game_mode, &self.config);

        let needed_total = needed_with(roster, &queens, settings.game_mode, &self.config);
        let carve_out = CarveOut::for_pass(members, &queens);
        let plan = plan_feeding(members, settings, &self.nutrition, &carve_out);

        let mut pass = FeedingPass::new(kind, settings, carve_out, needed_total, &queens, &self.config);
        if pass.gate.is_suppressed() {
            logs.push(String::from(LOG_FEEDING_SUPPRESSED));
        }
        if pass.ration_prey {
            logs.push(String::from(LOG_RATIONING));
        }
        let mut outcome = pass.run(&plan, &mut self.pile, &mut self.nutrition);
        let underfed = outcome.underfed();
        if !underfed.is_empty() {
            log::debug!("{} members went short this pass", underfed.len());
            logs.push(String::from(LOG_GROUP_UNDERFED));
        }
        outcome.logs.clone_from(logs);
        outcome
    }

    /// Prey the living clan needs for one moon.
    #[must_use]
    pub fn amount_food_needed(&self, roster: &[ClanMember], mode: GameMode) -> f64 {
        let queens = QueenIndex::build(roster, self.config.queen_kit_age_moons);
        needed_with(roster, &queens, mode, &self.config)
    }

    #[must_use]
    pub fn has_enough_food(&self, roster: &[ClanMember], mode: GameMode) -> bool {
        self.amount_food_needed(roster, mode) <= self.pile.total()
    }

    /// Whether the pile sits in any of the requested supply bands. `factor`
    /// overrides the configured base trigger factor.
    #[must_use]
    pub fn supply_matches(
        &self,
        roster: &[ClanMember],
        triggers: &[SupplyTrigger],
        mode: GameMode,
        factor: Option<f64>,
    ) -> bool {
        let needed = self.amount_food_needed(roster, mode);
        let clan_size = roster.iter().filter(|member| member.alive_in_clan).count();
        supply_matches(
            self.pile.total(),
            needed,
            triggers,
            factor.unwrap_or(self.config.base_event_trigger_factor),
            clan_size,
            mode,
        )
    }

    #[must_use]
    pub fn nutrition_status(&self, id: MemberId) -> Option<NutritionStatus> {
        self.nutrition.status_of(id, &self.config.nutrition)
    }

    /// Candidates for manual feeding.
    #[must_use]
    pub fn low_nutrition_members(&self) -> Vec<MemberId> {
        self.nutrition
            .low_nutrition(self.config.nutrition.low_percentage)
    }
}

fn needed_with(
    roster: &[ClanMember],
    queens: &QueenIndex,
    mode: GameMode,
    config: &PreyConfig,
) -> f64 {
    let total: f64 = roster
        .iter()
        .filter(|member| member.alive_in_clan && !queens.is_nursed(member.id))
        .map(|member| {
            let base = config
                .requirement_for(queens.feeding_status(member))
                .unwrap_or(0.0);
            base + sickness_surcharge(member, mode, config)
        })
        .sum();
    round_prey(total)
}

/// Pile level above which the clan counts as having an excess.
#[must_use]
pub fn excess_threshold(factor: f64, clan_size: usize, mode: GameMode, needed: f64) -> f64 {
    let divider = if mode == GameMode::Expanded {
        SUPPLY_DIVIDER_EXPANDED
    } else {
        SUPPLY_DIVIDER_DEFAULT
    };
    let crowding = (count_to_f64(clan_size) / divider).powi(2).round_ties_even();
    let mut factor = factor - crowding;
    let floor = i64_to_f64(SUPPLY_MIN_FACTOR_EXPANDED);
    if mode == GameMode::Expanded && factor < floor {
        factor = floor;
    }
    round_prey(factor * needed)
}

/// Read contract used by events that depend on the pile's supply.
#[must_use]
pub fn supply_matches(
    total: f64,
    needed: f64,
    triggers: &[SupplyTrigger],
    factor: f64,
    clan_size: usize,
    mode: GameMode,
) -> bool {
    if mode == GameMode::Classic {
        return false;
    }
    let half = needed / 2.0;
    let excess = excess_threshold(factor, clan_size, mode, needed);
    triggers.iter().any(|trigger| match trigger {
        SupplyTrigger::Always => true,
        SupplyTrigger::Low => total < half,
        SupplyTrigger::Adequate => half < total && total < needed,
        SupplyTrigger::Full => needed < total && total < excess,
        SupplyTrigger::Excess => total > excess,
    })
}

/// Whole-prey display value, rounded half away from zero.
#[must_use]
pub fn display_amount(amount: f64) -> i64 {
    round_f64_to_i64(amount)
}
