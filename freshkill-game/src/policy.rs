//! Feeding order: who eats first when the pile may not stretch to everyone.
//!
//! A plan is built in three layers. The carve-out pulls queens and pregnant
//! members into their own status and removes the kits they nurse. An optional
//! priority layer is partitioned out next, and the ordering tactic arranges
//! whoever is left. The result is a list of disjoint groups.
use std::cmp::Ordering;

use crate::constants::FULL_PERCENTAGE;
use crate::member::{ClanMember, FeedingStatus, MemberId, Skill};
use crate::nutrition::NutritionTracker;
use crate::queens::QueenIndex;
use crate::settings::{ClanSettings, FeedingPriority, FeedingTactic};

/// Queens and pregnant members of one pass, plus the kits eating through them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CarveOut {
    queens: Vec<MemberId>,
    nursed_kits: Vec<MemberId>,
}

impl CarveOut {
    /// Carve-out restricted to `members`: a kit is only skipped when the
    /// queen nursing it is fed in the same pass.
    #[must_use]
    pub fn for_pass(members: &[&ClanMember], queens: &QueenIndex) -> Self {
        let in_pass = |id: MemberId| members.iter().any(|member| member.id == id);
        let mut carve_out = Self::default();
        for member in members {
            if member.pregnant || queens.is_queen(member.id) {
                carve_out.queens.push(member.id);
            }
            if queens.queen_of(member.id).is_some_and(in_pass) {
                carve_out.nursed_kits.push(member.id);
            }
        }
        carve_out
    }

    #[must_use]
    pub fn is_queen(&self, id: MemberId) -> bool {
        self.queens.contains(&id)
    }

    #[must_use]
    pub fn is_nursed(&self, id: MemberId) -> bool {
        self.nursed_kits.contains(&id)
    }

    #[must_use]
    pub fn queens(&self) -> &[MemberId] {
        &self.queens
    }

    #[must_use]
    pub fn nursed_kits(&self) -> &[MemberId] {
        &self.nursed_kits
    }
}

/// Why a group sits where it does in the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Priority(FeedingPriority),
    Rank(FeedingStatus),
    Ordered(FeedingTactic),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedingGroup<'a> {
    pub kind: GroupKind,
    pub members: Vec<&'a ClanMember>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedingPlan<'a> {
    pub groups: Vec<FeedingGroup<'a>>,
}

impl<'a> FeedingPlan<'a> {
    fn push(&mut self, kind: GroupKind, members: Vec<&'a ClanMember>) {
        if !members.is_empty() {
            self.groups.push(FeedingGroup { kind, members });
        }
    }

    /// Every planned member in feeding order.
    pub fn members(&self) -> impl Iterator<Item = &'a ClanMember> + '_ {
        self.groups.iter().flat_map(|group| group.members.iter().copied())
    }

    #[must_use]
    pub fn order(&self) -> Vec<MemberId> {
        self.members().map(|member| member.id).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.iter().map(|group| group.members.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Arrange `members` into feeding groups.
#[must_use]
pub fn plan_feeding<'a>(
    members: &[&'a ClanMember],
    settings: &ClanSettings,
    tracker: &NutritionTracker,
    carve_out: &CarveOut,
) -> FeedingPlan<'a> {
    let mut plan = FeedingPlan::default();
    let mut remaining: Vec<&'a ClanMember> = members
        .iter()
        .copied()
        .filter(|member| !carve_out.is_nursed(member.id))
        .collect();

    if let Some(priority) = settings.priority {
        let first = match priority {
            FeedingPriority::SickInjuredFirst => take_sick(&mut remaining),
            FeedingPriority::HunterFirst => take_hunters(&mut remaining),
        };
        log::debug!("{} members fed first by {}", first.len(), priority.key());
        plan.push(GroupKind::Priority(priority), first);
    }

    match settings.tactic {
        FeedingTactic::LowRank => push_by_rank(&mut plan, remaining, carve_out, false),
        FeedingTactic::HighRank => push_by_rank(&mut plan, remaining, carve_out, true),
        FeedingTactic::YoungestFirst => {
            remaining.sort_by_key(|member| member.moons);
            plan.push(GroupKind::Ordered(FeedingTactic::YoungestFirst), remaining);
        }
        FeedingTactic::OldestFirst => {
            remaining.sort_by_key(|member| std::cmp::Reverse(member.moons));
            plan.push(GroupKind::Ordered(FeedingTactic::OldestFirst), remaining);
        }
        FeedingTactic::ExperienceFirst => {
            remaining.sort_by_key(|member| std::cmp::Reverse(member.experience));
            plan.push(GroupKind::Ordered(FeedingTactic::ExperienceFirst), remaining);
        }
        FeedingTactic::HungriestFirst => {
            let (mut hungry, fed): (Vec<_>, Vec<_>) = remaining.into_iter().partition(|member| {
                tracker
                    .percentage_of(member.id)
                    .is_some_and(|pct| pct < FULL_PERCENTAGE)
            });
            hungry.sort_by(|a, b| compare_percentage(tracker, a.id, b.id));
            plan.push(GroupKind::Ordered(FeedingTactic::HungriestFirst), hungry);
            push_by_rank(&mut plan, fed, carve_out, false);
        }
    }
    plan
}

fn take_sick<'a>(remaining: &mut Vec<&'a ClanMember>) -> Vec<&'a ClanMember> {
    let (sick, healthy): (Vec<_>, Vec<_>) = remaining
        .drain(..)
        .partition(|member| member.is_incapacitated());
    *remaining = healthy;
    sick
}

/// Hunters are collected tier by tier, lowest first, each pushed to the
/// front so the best hunters end up eating first.
fn take_hunters<'a>(remaining: &mut Vec<&'a ClanMember>) -> Vec<&'a ClanMember> {
    let mut hunters: Vec<&'a ClanMember> = Vec::new();
    for tier in 1..=Skill::MAX_TIER {
        for member in remaining
            .iter()
            .copied()
            .filter(|member| member.hunting_tier() == Some(tier))
        {
            hunters.insert(0, member);
        }
    }
    remaining.retain(|member| member.hunting_tier().is_none());
    hunters
}

/// Walk the rank order one status at a time. Each rank is a group sorted by
/// age, youngest first in either direction.
fn push_by_rank<'a>(
    plan: &mut FeedingPlan<'a>,
    members: Vec<&'a ClanMember>,
    carve_out: &CarveOut,
    highest_first: bool,
) {
    let mut order = FeedingStatus::FEEDING_ORDER;
    if highest_first {
        order.reverse();
    }
    for status in order {
        let mut group: Vec<&'a ClanMember> = match status {
            FeedingStatus::QueenOrPregnant => members
                .iter()
                .copied()
                .filter(|member| carve_out.is_queen(member.id))
                .collect(),
            FeedingStatus::Role(role) => members
                .iter()
                .copied()
                .filter(|member| member.role == role && !carve_out.is_queen(member.id))
                .collect(),
        };
        if !matches!(status, FeedingStatus::QueenOrPregnant) {
            group.sort_by_key(|member| member.moons);
        }
        plan.push(GroupKind::Rank(status), group);
    }
}

fn compare_percentage(tracker: &NutritionTracker, a: MemberId, b: MemberId) -> Ordering {
    let pa = tracker.percentage_of(a).unwrap_or(FULL_PERCENTAGE);
    let pb = tracker.percentage_of(b).unwrap_or(FULL_PERCENTAGE);
    pa.total_cmp(&pb)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::{Gender, Role, SkillPath};
    use crate::nutrition::Nutrition;

    fn refs(roster: &[ClanMember]) -> Vec<&ClanMember> {
        roster.iter().collect()
    }

    fn ids(values: &[u32]) -> Vec<MemberId> {
        values.iter().copied().map(MemberId).collect()
    }

    #[test]
    fn low_rank_walks_feeding_order_by_age() {
        let roster = vec![
            ClanMember::new(1, Role::Leader, 60),
            ClanMember::new(2, Role::Warrior, 40),
            ClanMember::new(3, Role::Warrior, 20),
            ClanMember::new(4, Role::Elder, 130),
            ClanMember::new(5, Role::Kitten, 5),
        ];
        let members = refs(&roster);
        let plan = plan_feeding(
            &members,
            &ClanSettings::default(),
            &NutritionTracker::new(),
            &CarveOut::default(),
        );
        assert_eq!(plan.order(), ids(&[5, 4, 3, 2, 1]));

        let high = ClanSettings::default().with_tactic(FeedingTactic::HighRank);
        let plan = plan_feeding(&members, &high, &NutritionTracker::new(), &CarveOut::default());
        assert_eq!(plan.order(), ids(&[1, 3, 2, 4, 5]));
    }

    #[test]
    fn queens_take_their_rank_slot_and_kits_are_skipped() {
        let roster = vec![
            ClanMember::new(1, Role::Warrior, 30).with_gender(Gender::Female),
            ClanMember::new(2, Role::Warrior, 35),
            ClanMember::new(3, Role::Newborn, 1).with_parents([MemberId(1)]),
            ClanMember::new(4, Role::Apprentice, 8),
        ];
        let members = refs(&roster);
        let queens = QueenIndex::build(&roster, 3);
        let carve_out = CarveOut::for_pass(&members, &queens);
        assert_eq!(carve_out.queens(), &[MemberId(1)]);
        assert_eq!(carve_out.nursed_kits(), &[MemberId(3)]);

        let plan = plan_feeding(&members, &ClanSettings::default(), &NutritionTracker::new(), &carve_out);
        assert_eq!(plan.order(), ids(&[1, 4, 2]));
        assert_eq!(plan.groups[0].kind, GroupKind::Rank(FeedingStatus::QueenOrPregnant));
    }

    #[test]
    fn kit_without_its_queen_in_the_pass_eats_alone() {
        let roster = vec![
            ClanMember::new(1, Role::Warrior, 30),
            ClanMember::new(2, Role::Kitten, 2).with_parents([MemberId(1)]),
        ];
        let queens = QueenIndex::build(&roster, 3);
        let kit_only = vec![&roster[1]];
        let carve_out = CarveOut::for_pass(&kit_only, &queens);
        assert!(carve_out.nursed_kits().is_empty());
    }

    #[test]
    fn hunters_are_ordered_by_tier() {
        let roster = vec![
            ClanMember::new(1, Role::Warrior, 30).with_primary_skill(Skill::new(SkillPath::Hunter, 0)),
            ClanMember::new(2, Role::Warrior, 30).with_primary_skill(Skill::new(SkillPath::Hunter, 25)),
            ClanMember::new(3, Role::Warrior, 30),
            ClanMember::new(4, Role::Warrior, 30).with_primary_skill(Skill::new(SkillPath::Hunter, 12)),
        ];
        let members = refs(&roster);
        let settings = ClanSettings::default().with_priority(FeedingPriority::HunterFirst);
        let plan = plan_feeding(&members, &settings, &NutritionTracker::new(), &CarveOut::default());
        assert_eq!(plan.order(), ids(&[2, 4, 1, 3]));
    }

    #[test]
    fn hungriest_first_sorts_by_percentage() {
        let roster = vec![
            ClanMember::new(1, Role::Warrior, 30),
            ClanMember::new(2, Role::Warrior, 30),
            ClanMember::new(3, Role::Elder, 120),
            ClanMember::new(4, Role::Apprentice, 8),
        ];
        let mut tracker = NutritionTracker::new();
        tracker.insert_record(MemberId(1), Nutrition::with_current(9.0, 9.0));
        tracker.insert_record(MemberId(2), Nutrition::with_current(9.0, 3.0));
        tracker.insert_record(MemberId(3), Nutrition::with_current(3.0, 3.0));
        tracker.insert_record(MemberId(4), Nutrition::with_current(4.5, 3.0));
        let members = refs(&roster);
        let settings = ClanSettings::default().with_tactic(FeedingTactic::HungriestFirst);
        let plan = plan_feeding(&members, &settings, &tracker, &CarveOut::default());
        assert_eq!(plan.order(), ids(&[2, 4, 3, 1]));
    }

    #[test]
    fn groups_are_disjoint() {
        let roster = vec![
            ClanMember::new(1, Role::Warrior, 30).with_illness(),
            ClanMember::new(2, Role::Elder, 130).with_injury(),
            ClanMember::new(3, Role::Warrior, 31),
            ClanMember::new(4, Role::MedicineCat, 50),
        ];
        let members = refs(&roster);
        let settings = ClanSettings::default()
            .with_priority(FeedingPriority::SickInjuredFirst)
            .with_tactic(FeedingTactic::ExperienceFirst);
        let plan = plan_feeding(&members, &settings, &NutritionTracker::new(), &CarveOut::default());
        let mut order = plan.order();
        assert_eq!(&order[..2], &ids(&[1, 2])[..]);
        order.sort();
        order.dedup();
        assert_eq!(order.len(), roster.len());
    }
}
