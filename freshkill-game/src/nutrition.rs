//! Per-member nutrition records.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::config::{NutritionThresholds, PreyConfig};
use crate::constants::{BABY_ELDER_MULTIPLIER, DEFAULT_MULTIPLIER, FULL_PERCENTAGE};
use crate::member::{ClanMember, FeedingStatus, MemberId, Role};
use crate::queens::QueenIndex;
use crate::settings::GameMode;

/// A bounded running score: `0 <= current_score <= max_score`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Nutrition {
    max_score: f64,
    current_score: f64,
}

impl Nutrition {
    /// A full record with the given ceiling.
    #[must_use]
    pub fn new(max_score: f64) -> Self {
        let max_score = max_score.max(0.0);
        Self {
            max_score,
            current_score: max_score,
        }
    }

    #[must_use]
    pub fn with_current(max_score: f64, current_score: f64) -> Self {
        let mut record = Self::new(max_score);
        record.set_current_score(current_score);
        record
    }

    #[must_use]
    pub const fn max_score(&self) -> f64 {
        self.max_score
    }

    #[must_use]
    pub const fn current_score(&self) -> f64 {
        self.current_score
    }

    pub fn set_current_score(&mut self, value: f64) {
        self.current_score = if value.is_finite() {
            value.clamp(0.0, self.max_score)
        } else {
            0.0
        };
    }

    pub fn adjust(&mut self, delta: f64) {
        self.set_current_score(self.current_score + delta);
    }

    /// Change the ceiling, keeping the same fraction of it filled.
    pub fn rescale(&mut self, max_score: f64) {
        let ratio = if self.max_score > 0.0 {
            self.current_score / self.max_score
        } else {
            1.0
        };
        self.max_score = max_score.max(0.0);
        self.set_current_score(ratio * self.max_score);
    }

    #[must_use]
    pub fn percentage(&self) -> f64 {
        if self.max_score <= 0.0 {
            return 0.0;
        }
        self.current_score / self.max_score * FULL_PERCENTAGE
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.percentage() >= FULL_PERCENTAGE
    }

    #[must_use]
    pub fn status(&self, thresholds: &NutritionThresholds) -> NutritionStatus {
        NutritionStatus::from_percentage(self.percentage(), thresholds)
    }
}

impl From<(f64, f64)> for Nutrition {
    fn from((max_score, current_score): (f64, f64)) -> Self {
        Self::with_current(max_score, current_score)
    }
}

impl From<Nutrition> for (f64, f64) {
    fn from(record: Nutrition) -> Self {
        (record.max_score, record.current_score)
    }
}

/// Hunger band read by events that react to how well a member is eating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NutritionStatus {
    Starving,
    Malnourished,
    Hungry,
    Satisfied,
}

impl NutritionStatus {
    #[must_use]
    pub fn from_percentage(percentage: f64, thresholds: &NutritionThresholds) -> Self {
        if percentage <= thresholds.starving_percentage {
            Self::Starving
        } else if percentage <= thresholds.malnourished_percentage {
            Self::Malnourished
        } else if percentage < FULL_PERCENTAGE {
            Self::Hungry
        } else {
            Self::Satisfied
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Starving => "starving",
            Self::Malnourished => "malnourished",
            Self::Hungry => "hungry",
            Self::Satisfied => "satisfied",
        }
    }
}

/// How much surplus a member's score can bank above one moon's requirement.
#[must_use]
pub fn category_multiplier(role: Role, moons: u32, config: &PreyConfig) -> u8 {
    let lean_elder = role == Role::Elder && moons > config.elder_lean_moons;
    if role.is_baby() || lean_elder {
        BABY_ELDER_MULTIPLIER
    } else {
        DEFAULT_MULTIPLIER
    }
}

/// Extra prey an ill or injured member needs in cruel season. Pregnancy
/// already raises the requirement and does not stack with it.
#[must_use]
pub fn sickness_surcharge(member: &ClanMember, mode: GameMode, config: &PreyConfig) -> f64 {
    if mode == GameMode::CruelSeason && member.is_incapacitated() && !member.pregnant {
        config.condition_increase
    } else {
        0.0
    }
}

/// Ceiling of a member's score, or `None` when their status does not eat
/// from the pile.
#[must_use]
pub fn max_score_for(
    member: &ClanMember,
    status: FeedingStatus,
    mode: GameMode,
    config: &PreyConfig,
) -> Option<f64> {
    let base = config.requirement_for(status).filter(|req| *req > 0.0)?;
    let surcharge = sickness_surcharge(member, mode, config);
    let multiplier = f64::from(category_multiplier(member.role, member.moons, config));
    Some((base + surcharge) * multiplier)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NutritionTracker {
    records: BTreeMap<MemberId, Nutrition>,
}

impl NutritionTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring the records in line with the living roster: drop the departed,
    /// resize the ceilings of members whose needs changed and start newcomers
    /// at a full score.
    pub fn recompute(
        &mut self,
        roster: &[ClanMember],
        queens: &QueenIndex,
        mode: GameMode,
        config: &PreyConfig,
    ) {
        let living: HashSet<MemberId> = roster
            .iter()
            .filter(|member| member.alive_in_clan)
            .map(|member| member.id)
            .collect();
        self.records.retain(|id, _| living.contains(id));

        for member in roster.iter().filter(|member| member.alive_in_clan) {
            let status = queens.feeding_status(member);
            let Some(max_score) = max_score_for(member, status, mode, config) else {
                self.records.remove(&member.id);
                continue;
            };
            match self.records.get_mut(&member.id) {
                Some(record) => {
                    if (record.max_score() - max_score).abs() > f64::EPSILON {
                        log::debug!(
                            "rescaling nutrition of {} from {:.2} to {max_score:.2}",
                            member.id,
                            record.max_score()
                        );
                        record.rescale(max_score);
                    }
                }
                None => {
                    self.records.insert(member.id, Nutrition::new(max_score));
                }
            }
        }
    }

    #[must_use]
    pub fn get(&self, id: MemberId) -> Option<&Nutrition> {
        self.records.get(&id)
    }

    pub fn get_mut(&mut self, id: MemberId) -> Option<&mut Nutrition> {
        self.records.get_mut(&id)
    }

    #[must_use]
    pub fn percentage_of(&self, id: MemberId) -> Option<f64> {
        self.get(id).map(Nutrition::percentage)
    }

    #[must_use]
    pub fn status_of(&self, id: MemberId, thresholds: &NutritionThresholds) -> Option<NutritionStatus> {
        self.get(id).map(|record| record.status(thresholds))
    }

    pub fn insert_record(&mut self, id: MemberId, record: Nutrition) {
        self.records.insert(id, record);
    }

    pub fn remove(&mut self, id: MemberId) -> Option<Nutrition> {
        self.records.remove(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MemberId, &Nutrition)> + '_ {
        self.records.iter().map(|(id, record)| (*id, record))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Members at or below `threshold` percent, lowest id first.
    #[must_use]
    pub fn low_nutrition(&self, threshold: f64) -> Vec<MemberId> {
        self.iter()
            .filter(|(_, record)| record.percentage() <= threshold)
            .map(|(id, _)| id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::member::Gender;

    fn cfg() -> PreyConfig {
        PreyConfig::default()
    }

    #[test]
    fn scores_are_clamped() {
        let mut record = Nutrition::new(9.0);
        record.adjust(5.0);
        assert!((record.current_score() - 9.0).abs() < f64::EPSILON);
        record.adjust(-20.0);
        assert!(record.current_score().abs() < f64::EPSILON);
        record.set_current_score(f64::NAN);
        assert!(record.current_score().abs() < f64::EPSILON);
    }

    #[test]
    fn rescale_keeps_fraction() {
        let mut record = Nutrition::with_current(9.0, 4.5);
        record.rescale(12.0);
        assert!((record.current_score() - 6.0).abs() < 1e-9);
        assert!((record.percentage() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn multiplier_rules() {
        let config = cfg();
        assert_eq!(category_multiplier(Role::Kitten, 4, &config), 2);
        assert_eq!(category_multiplier(Role::Elder, 120, &config), 2);
        assert_eq!(category_multiplier(Role::Elder, 114, &config), 3);
        assert_eq!(category_multiplier(Role::Warrior, 200, &config), 3);
    }

    #[test]
    fn recompute_creates_full_records_and_skips_newborns() {
        let roster = vec![
            ClanMember::new(1, Role::Warrior, 30),
            ClanMember::new(2, Role::Newborn, 0),
            ClanMember::new(3, Role::Kitten, 4),
        ];
        let mut tracker = NutritionTracker::new();
        tracker.recompute(&roster, &QueenIndex::default(), GameMode::Classic, &cfg());
        assert_eq!(tracker.len(), 2);
        assert!((tracker.get(MemberId(1)).unwrap().max_score() - 9.0).abs() < f64::EPSILON);
        assert!((tracker.get(MemberId(3)).unwrap().max_score() - 1.0).abs() < f64::EPSILON);
        assert!(tracker.get(MemberId(2)).is_none());
        assert!((tracker.percentage_of(MemberId(1)).unwrap() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn recompute_drops_departed_and_rescales_queens() {
        let mother = ClanMember::new(1, Role::Warrior, 30);
        let kit = ClanMember::new(2, Role::Newborn, 0).with_parents([MemberId(1)]);
        let mut gone = ClanMember::new(3, Role::Elder, 130);
        let mut tracker = NutritionTracker::new();
        let config = cfg();

        let roster = vec![mother.clone(), gone.clone()];
        tracker.recompute(&roster, &QueenIndex::default(), GameMode::Classic, &config);
        tracker.get_mut(MemberId(1)).unwrap().set_current_score(4.5);

        gone.alive_in_clan = false;
        let roster = vec![mother, kit, gone];
        let queens = QueenIndex::build(&roster, config.queen_kit_age_moons);
        tracker.recompute(&roster, &queens, GameMode::Classic, &config);

        assert!(tracker.get(MemberId(3)).is_none());
        let queen = tracker.get(MemberId(1)).unwrap();
        assert!((queen.max_score() - 12.0).abs() < f64::EPSILON);
        assert!((queen.percentage() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn cruel_season_adds_sickness_surcharge() {
        let config = cfg();
        let sick = ClanMember::new(1, Role::Warrior, 30).with_illness();
        let sick_pregnant = ClanMember::new(2, Role::Warrior, 30)
            .with_gender(Gender::Female)
            .with_injury()
            .with_pregnancy();
        assert!((sickness_surcharge(&sick, GameMode::CruelSeason, &config) - 0.5).abs() < f64::EPSILON);
        assert!(sickness_surcharge(&sick, GameMode::Expanded, &config).abs() < f64::EPSILON);
        assert!(sickness_surcharge(&sick_pregnant, GameMode::CruelSeason, &config).abs() < f64::EPSILON);
        let max = max_score_for(&sick, sick.role.into(), GameMode::CruelSeason, &config).unwrap();
        assert!((max - 10.5).abs() < f64::EPSILON);
    }

    #[test]
    fn status_bands_follow_thresholds() {
        let thresholds = NutritionThresholds::default();
        assert_eq!(NutritionStatus::from_percentage(10.0, &thresholds), NutritionStatus::Starving);
        assert_eq!(NutritionStatus::from_percentage(45.0, &thresholds), NutritionStatus::Malnourished);
        assert_eq!(NutritionStatus::from_percentage(80.0, &thresholds), NutritionStatus::Hungry);
        assert_eq!(NutritionStatus::from_percentage(100.0, &thresholds), NutritionStatus::Satisfied);
    }

    #[test]
    fn low_nutrition_lists_hungry_members() {
        let mut tracker = NutritionTracker::new();
        tracker.insert_record(MemberId(1), Nutrition::with_current(9.0, 9.0));
        tracker.insert_record(MemberId(2), Nutrition::with_current(9.0, 7.2));
        tracker.insert_record(MemberId(3), Nutrition::with_current(9.0, 3.0));
        assert_eq!(tracker.low_nutrition(90.0), vec![MemberId(2), MemberId(3)]);
    }

    #[test]
    fn records_persist_as_pairs() {
        let mut tracker = NutritionTracker::new();
        tracker.insert_record(MemberId(7), Nutrition::with_current(6.0, 3.0));
        let json = serde_json::to_string(&tracker).unwrap();
        assert_eq!(json, r#"{"7":[6.0,3.0]}"#);
        let back: NutritionTracker = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tracker);
    }
}
