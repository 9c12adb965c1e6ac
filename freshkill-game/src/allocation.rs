//! Greedy prey allocation for a single feeding pass.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::PreyConfig;
use crate::constants::{FULL_PERCENTAGE, RATION_DIVISOR, SURPLUS_BONUS_TIERS};
use crate::member::{ClanMember, FeedingStatus, MemberId};
use crate::nutrition::NutritionTracker;
use crate::pile::{DrawGate, FreshkillPile};
use crate::policy::{CarveOut, FeedingPlan};
use crate::queens::QueenIndex;
use crate::settings::ClanSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassKind {
    /// Player-triggered top-up; scores only ever go up.
    Manual,
    /// The once-per-moon pass; members who go short lose score.
    MoonSkip,
}

/// State that lives for exactly one feeding pass.
#[derive(Debug)]
pub struct FeedingPass<'a> {
    pub kind: PassKind,
    pub gate: DrawGate,
    pub ration_prey: bool,
    /// Clan-wide prey need the surplus bonus is measured against.
    pub needed_total: f64,
    pub carve_out: CarveOut,
    queens: &'a QueenIndex,
    config: &'a PreyConfig,
    already_fed: HashSet<MemberId>,
}

impl<'a> FeedingPass<'a> {
    #[must_use]
    pub fn new(
        kind: PassKind,
        settings: &ClanSettings,
        carve_out: CarveOut,
        needed_total: f64,
        queens: &'a QueenIndex,
        config: &'a PreyConfig,
    ) -> Self {
        let gate = match kind {
            PassKind::MoonSkip if !settings.auto_feed => DrawGate::Suppressed,
            _ => DrawGate::Open,
        };
        Self {
            kind,
            gate,
            ration_prey: settings.ration_prey,
            needed_total,
            carve_out,
            queens,
            config,
            already_fed: HashSet::new(),
        }
    }

    #[must_use]
    pub fn was_fed(&self, id: MemberId) -> bool {
        self.already_fed.contains(&id)
    }

    /// Feed everyone in `plan`, in order.
    pub fn run(
        &mut self,
        plan: &FeedingPlan<'_>,
        pile: &mut FreshkillPile,
        tracker: &mut NutritionTracker,
    ) -> FeedingOutcome {
        let pile_before = pile.total();
        let mut outcome = FeedingOutcome {
            kind: self.kind,
            nursed_kits: self.carve_out.nursed_kits().to_vec(),
            ..FeedingOutcome::default()
        };
        for member in plan.members() {
            if let Some(meal) = self.feed_member(member, pile, tracker) {
                outcome.meals.push(meal);
            }
        }
        outcome.consumed = (pile_before - pile.total()).max(0.0);
        outcome
    }

    /// Feed one member. Returns `None` when the member is skipped: already
    /// fed this pass, nursed by a queen, or without a nutrition record.
    pub fn feed_member(
        &mut self,
        member: &ClanMember,
        pile: &mut FreshkillPile,
        tracker: &mut NutritionTracker,
    ) -> Option<MealRecord> {
        if self.was_fed(member.id) || self.carve_out.is_nursed(member.id) {
            return None;
        }
        let status = self.queens.feeding_status(member);
        let required = self.config.requirement_for(status)?;
        let before = tracker.get(member.id)?.current_score();
        let percentage = tracker.percentage_of(member.id)?;

        let allowed = allowance(
            required,
            status,
            self.ration_prey,
            percentage,
            pile.total(),
            self.needed_total,
        );
        let unmet = pile.take(allowed, self.gate);
        self.already_fed.insert(member.id);

        let record = tracker.get_mut(member.id)?;
        match self.kind {
            PassKind::Manual => record.adjust(allowed - unmet),
            PassKind::MoonSkip => {
                let ration_deficit = required - allowed;
                if unmet > 0.0 {
                    record.adjust(-unmet);
                    if ration_deficit > 0.0 {
                        record.adjust(-ration_deficit);
                    }
                } else if percentage < FULL_PERCENTAGE {
                    record.adjust(allowed - required);
                } else if ration_deficit > 0.0 {
                    record.adjust(-ration_deficit);
                }
            }
        }

        Some(MealRecord {
            id: member.id,
            status,
            required,
            allowed,
            eaten: allowed - unmet,
            unmet,
            score_before: before,
            score_after: record.current_score(),
        })
    }
}

/// What a member may eat: half rations when rationing (newborns excepted),
/// otherwise the requirement plus a surplus bonus for hungry members when the
/// pile outstrips the clan's need.
#[must_use]
pub fn allowance(
    required: f64,
    status: FeedingStatus,
    ration_prey: bool,
    percentage: f64,
    pile_total: f64,
    needed_total: f64,
) -> f64 {
    if ration_prey && !status.is_newborn() {
        return required / RATION_DIVISOR;
    }
    if percentage < FULL_PERCENTAGE {
        required + surplus_bonus(pile_total, needed_total)
    } else {
        required
    }
}

#[must_use]
pub fn surplus_bonus(pile_total: f64, needed_total: f64) -> f64 {
    SURPLUS_BONUS_TIERS
        .iter()
        .find(|(ratio, _)| pile_total > needed_total * ratio)
        .map_or(0.0, |(_, bonus)| *bonus)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealRecord {
    pub id: MemberId,
    pub status: FeedingStatus,
    pub required: f64,
    pub allowed: f64,
    pub eaten: f64,
    pub unmet: f64,
    pub score_before: f64,
    pub score_after: f64,
}

impl MealRecord {
    #[must_use]
    pub fn went_short(&self) -> bool {
        self.unmet > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedingOutcome {
    pub kind: PassKind,
    pub meals: Vec<MealRecord>,
    /// Kits that ate through their queen this pass.
    pub nursed_kits: Vec<MemberId>,
    pub consumed: f64,
    #[serde(default)]
    pub logs: Vec<String>,
}

impl Default for FeedingOutcome {
    fn default() -> Self {
        Self {
            kind: PassKind::MoonSkip,
            meals: Vec::new(),
            nursed_kits: Vec::new(),
            consumed: 0.0,
            logs: Vec::new(),
        }
    }
}

impl FeedingOutcome {
    #[must_use]
    pub fn meal_for(&self, id: MemberId) -> Option<&MealRecord> {
        self.meals.iter().find(|meal| meal.id == id)
    }

    #[must_use]
    pub fn total_eaten(&self) -> f64 {
        self.meals.iter().map(|meal| meal.eaten).sum()
    }

    #[must_use]
    pub fn underfed(&self) -> Vec<MemberId> {
        self.meals
            .iter()
            .filter(|meal| meal.went_short())
            .map(|meal| meal.id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::Role;
    use crate::nutrition::Nutrition;
    use crate::policy::plan_feeding;

    #[test]
    fn bonus_tiers_follow_pile_ratio() {
        assert!((surplus_bonus(21.0, 10.0) - 2.0).abs() < f64::EPSILON);
        assert!((surplus_bonus(19.0, 10.0) - 1.5).abs() < f64::EPSILON);
        assert!((surplus_bonus(13.0, 10.0) - 1.0).abs() < f64::EPSILON);
        assert!((surplus_bonus(11.0, 10.0) - 0.5).abs() < f64::EPSILON);
        assert!(surplus_bonus(10.0, 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rationing_halves_all_but_newborns() {
        let warrior = FeedingStatus::Role(Role::Warrior);
        assert!((allowance(3.0, warrior, true, 50.0, 100.0, 1.0) - 1.5).abs() < f64::EPSILON);
        let newborn = FeedingStatus::Role(Role::Newborn);
        assert!((allowance(1.0, newborn, true, 100.0, 0.0, 1.0) - 1.0).abs() < f64::EPSILON);
        assert!((allowance(3.0, warrior, false, 100.0, 100.0, 1.0) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn hungry_member_recovers_from_surplus() {
        let roster = vec![ClanMember::new(1, Role::Warrior, 30)];
        let config = PreyConfig::default();
        let queens = QueenIndex::default();
        let mut tracker = NutritionTracker::new();
        tracker.insert_record(MemberId(1), Nutrition::with_current(9.0, 4.5));
        let mut pile = FreshkillPile::with_start_amount(10.0);

        let members: Vec<&ClanMember> = roster.iter().collect();
        let settings = ClanSettings::default();
        let plan = plan_feeding(&members, &settings, &tracker, &CarveOut::default());
        let mut pass = FeedingPass::new(PassKind::MoonSkip, &settings, CarveOut::default(), 3.0, &queens, &config);
        let outcome = pass.run(&plan, &mut pile, &mut tracker);

        let meal = outcome.meal_for(MemberId(1)).unwrap();
        assert!((meal.allowed - 5.0).abs() < f64::EPSILON);
        assert!((meal.score_after - 6.5).abs() < f64::EPSILON);
        assert!((pile.total() - 5.0).abs() < f64::EPSILON);
        assert!(pass.was_fed(MemberId(1)));
    }

    #[test]
    fn empty_pile_costs_score() {
        let member = ClanMember::new(1, Role::Warrior, 30);
        let config = PreyConfig::default();
        let queens = QueenIndex::default();
        let mut tracker = NutritionTracker::new();
        tracker.insert_record(MemberId(1), Nutrition::new(9.0));
        let mut pile = FreshkillPile::default();
        let settings = ClanSettings::default();
        let mut pass = FeedingPass::new(PassKind::MoonSkip, &settings, CarveOut::default(), 3.0, &queens, &config);

        let meal = pass.feed_member(&member, &mut pile, &mut tracker).unwrap();
        assert!((meal.unmet - 3.0).abs() < f64::EPSILON);
        assert!((meal.score_after - 6.0).abs() < f64::EPSILON);
        assert!(pass.feed_member(&member, &mut pile, &mut tracker).is_none());
    }

    #[test]
    fn auto_feed_off_suppresses_draws_on_moon_skip_only() {
        let config = PreyConfig::default();
        let queens = QueenIndex::default();
        let settings = ClanSettings::default().with_auto_feed(false);
        let pass = FeedingPass::new(PassKind::MoonSkip, &settings, CarveOut::default(), 0.0, &queens, &config);
        assert_eq!(pass.gate, DrawGate::Suppressed);
        let pass = FeedingPass::new(PassKind::Manual, &settings, CarveOut::default(), 0.0, &queens, &config);
        assert_eq!(pass.gate, DrawGate::Open);
    }
}
