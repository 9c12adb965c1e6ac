//! Queen and nursing-kit classification.
//!
//! Kits below the nursing age are fed through one of their living parents.
//! That parent is treated as a queen for the moon and eats the larger
//! queen/pregnant requirement instead of the kit drawing from the pile.
use smallvec::SmallVec;
use std::collections::HashMap;

use crate::member::{ClanMember, FeedingStatus, Gender, MemberId};

pub type KitList = SmallVec<[MemberId; 4]>;

/// Read-only view of which members nurse which kits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueenIndex {
    queens: Vec<(MemberId, KitList)>,
    unparented: KitList,
}

impl QueenIndex {
    /// Classify the living members of `roster`. Kits are nursing while they
    /// hold a baby role and are younger than `kit_age_moons`.
    #[must_use]
    pub fn build(roster: &[ClanMember], kit_age_moons: u32) -> Self {
        let living: HashMap<MemberId, &ClanMember> = roster
            .iter()
            .filter(|member| member.alive_in_clan)
            .map(|member| (member.id, member))
            .collect();

        let mut index = Self::default();
        for kit in roster
            .iter()
            .filter(|member| member.alive_in_clan)
            .filter(|member| member.role.is_baby() && member.moons < kit_age_moons)
        {
            let parents: SmallVec<[&ClanMember; 2]> = kit
                .parents
                .iter()
                .filter_map(|id| living.get(id).copied())
                .collect();
            match nursing_parent(&parents) {
                Some(queen) => index.assign(queen, kit.id),
                None => index.unparented.push(kit.id),
            }
        }
        index
    }

    fn assign(&mut self, queen: MemberId, kit: MemberId) {
        if let Some((_, kits)) = self.queens.iter_mut().find(|(id, _)| *id == queen) {
            kits.push(kit);
        } else {
            let mut kits = KitList::new();
            kits.push(kit);
            self.queens.push((queen, kits));
        }
    }

    #[must_use]
    pub fn is_queen(&self, id: MemberId) -> bool {
        self.queens.iter().any(|(queen, _)| *queen == id)
    }

    /// Queens in the order their first kit appeared in the roster.
    pub fn queens(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.queens.iter().map(|(queen, _)| *queen)
    }

    #[must_use]
    pub fn kits_of(&self, queen: MemberId) -> &[MemberId] {
        self.queens
            .iter()
            .find(|(id, _)| *id == queen)
            .map_or(&[], |(_, kits)| kits.as_slice())
    }

    #[must_use]
    pub fn queen_of(&self, kit: MemberId) -> Option<MemberId> {
        self.queens
            .iter()
            .find(|(_, kits)| kits.contains(&kit))
            .map(|(queen, _)| *queen)
    }

    #[must_use]
    pub fn is_nursed(&self, kit: MemberId) -> bool {
        self.queen_of(kit).is_some()
    }

    /// Young kits with no living parent in the clan; they eat for themselves.
    #[must_use]
    pub fn unparented(&self) -> &[MemberId] {
        &self.unparented
    }

    #[must_use]
    pub fn queen_count(&self) -> usize {
        self.queens.len()
    }

    /// Queens and pregnant members are fed as `QueenOrPregnant`.
    #[must_use]
    pub fn feeding_status(&self, member: &ClanMember) -> FeedingStatus {
        if member.pregnant || self.is_queen(member.id) {
            FeedingStatus::QueenOrPregnant
        } else {
            FeedingStatus::Role(member.role)
        }
    }
}

/// A single parent nurses; among two, the first listed parent unless it is
/// male and the second is not.
fn nursing_parent(parents: &[&ClanMember]) -> Option<MemberId> {
    match parents {
        [] => None,
        [first, second] if first.gender == Gender::Male && second.gender != Gender::Male => {
            Some(second.id)
        }
        [first, ..] => Some(first.id),
    }
}
