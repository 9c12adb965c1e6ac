//! Clan member records as handed over by the surrounding game.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// Stable identity of a clan member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub u32);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Newborn,
    Kitten,
    Apprentice,
    MedicineCatApprentice,
    MediatorApprentice,
    Warrior,
    Mediator,
    MedicineCat,
    Deputy,
    Leader,
    Elder,
}

impl Role {
    pub const ALL: [Self; 11] = [
        Self::Newborn,
        Self::Kitten,
        Self::Apprentice,
        Self::MedicineCatApprentice,
        Self::MediatorApprentice,
        Self::Warrior,
        Self::Mediator,
        Self::MedicineCat,
        Self::Deputy,
        Self::Leader,
        Self::Elder,
    ];

    #[must_use]
    pub const fn is_baby(self) -> bool {
        matches!(self, Self::Newborn | Self::Kitten)
    }

    /// Default prey needed per moon to keep a member of this role satisfied.
    #[must_use]
    pub const fn default_requirement(self) -> f64 {
        match self {
            Self::Newborn => 0.0,
            Self::Kitten => 0.5,
            Self::Apprentice | Self::MedicineCatApprentice | Self::MediatorApprentice => 1.5,
            Self::Elder => 1.5,
            Self::Mediator | Self::MedicineCat => 2.0,
            Self::Warrior | Self::Deputy | Self::Leader => 3.0,
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Newborn => "newborn",
            Self::Kitten => "kitten",
            Self::Apprentice => "apprentice",
            Self::MedicineCatApprentice => "medicine_cat_apprentice",
            Self::MediatorApprentice => "mediator_apprentice",
            Self::Warrior => "warrior",
            Self::Mediator => "mediator",
            Self::MedicineCat => "medicine_cat",
            Self::Deputy => "deputy",
            Self::Leader => "leader",
            Self::Elder => "elder",
        }
    }
}

/// What a member is fed as: their own role, or the shared queen/pregnant
/// status which overrides role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedingStatus {
    Role(Role),
    QueenOrPregnant,
}

impl FeedingStatus {
    /// Rank order used by the rank tactics, lowest rank first.
    pub const FEEDING_ORDER: [Self; 12] = [
        Self::Role(Role::Newborn),
        Self::Role(Role::Kitten),
        Self::Role(Role::Elder),
        Self::QueenOrPregnant,
        Self::Role(Role::MedicineCatApprentice),
        Self::Role(Role::Apprentice),
        Self::Role(Role::MediatorApprentice),
        Self::Role(Role::MedicineCat),
        Self::Role(Role::Mediator),
        Self::Role(Role::Warrior),
        Self::Role(Role::Deputy),
        Self::Role(Role::Leader),
    ];

    #[must_use]
    pub const fn is_newborn(self) -> bool {
        matches!(self, Self::Role(Role::Newborn))
    }
}

impl From<Role> for FeedingStatus {
    fn from(role: Role) -> Self {
        Self::Role(role)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    #[default]
    Female,
    Male,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillPath {
    Hunter,
    Climber,
    Runner,
    Swimmer,
    Fighter,
    Teacher,
    Healer,
    Speaker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub path: SkillPath,
    pub points: u32,
}

impl Skill {
    pub const MAX_TIER: u8 = 3;
    const POINTS_PER_TIER: u32 = 10;

    #[must_use]
    pub const fn new(path: SkillPath, points: u32) -> Self {
        Self { path, points }
    }

    /// Skill tier from 1 (interested) to 3 (expert).
    #[must_use]
    pub fn tier(self) -> u8 {
        let tier = self.points / Self::POINTS_PER_TIER + 1;
        u8::try_from(tier).unwrap_or(Self::MAX_TIER).min(Self::MAX_TIER)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SkillSet {
    #[serde(default)]
    pub primary: Option<Skill>,
    #[serde(default)]
    pub secondary: Option<Skill>,
}

impl SkillSet {
    /// Highest tier among the member's hunting skills, if any.
    #[must_use]
    pub fn best_tier_in(&self, path: SkillPath) -> Option<u8> {
        [self.primary, self.secondary]
            .into_iter()
            .flatten()
            .filter(|skill| skill.path == path)
            .map(Skill::tier)
            .max()
    }
}

/// A living (or recently living) member of the clan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClanMember {
    pub id: MemberId,
    pub role: Role,
    pub moons: u32,
    #[serde(default)]
    pub experience: u32,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub parents: SmallVec<[MemberId; 2]>,
    #[serde(default)]
    pub skills: SkillSet,
    #[serde(default)]
    pub ill: bool,
    #[serde(default)]
    pub injured: bool,
    #[serde(default)]
    pub pregnant: bool,
    #[serde(default = "default_alive")]
    pub alive_in_clan: bool,
}

const fn default_alive() -> bool {
    true
}

impl ClanMember {
    #[must_use]
    pub fn new(id: u32, role: Role, moons: u32) -> Self {
        Self {
            id: MemberId(id),
            role,
            moons,
            experience: 0,
            gender: Gender::default(),
            parents: SmallVec::new(),
            skills: SkillSet::default(),
            ill: false,
            injured: false,
            pregnant: false,
            alive_in_clan: true,
        }
    }

    #[must_use]
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    #[must_use]
    pub fn with_experience(mut self, experience: u32) -> Self {
        self.experience = experience;
        self
    }

    #[must_use]
    pub fn with_parents<I>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = MemberId>,
    {
        self.parents = parents.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_primary_skill(mut self, skill: Skill) -> Self {
        self.skills.primary = Some(skill);
        self
    }

    #[must_use]
    pub fn with_secondary_skill(mut self, skill: Skill) -> Self {
        self.skills.secondary = Some(skill);
        self
    }

    #[must_use]
    pub fn with_illness(mut self) -> Self {
        self.ill = true;
        self
    }

    #[must_use]
    pub fn with_injury(mut self) -> Self {
        self.injured = true;
        self
    }

    #[must_use]
    pub fn with_pregnancy(mut self) -> Self {
        self.pregnant = true;
        self
    }

    /// Ill or injured; pregnancy is tracked separately and does not count.
    #[must_use]
    pub const fn is_incapacitated(&self) -> bool {
        self.ill || self.injured
    }

    #[must_use]
    pub fn hunting_tier(&self) -> Option<u8> {
        self.skills.best_tier_in(SkillPath::Hunter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_tiers_are_capped() {
        assert_eq!(Skill::new(SkillPath::Hunter, 0).tier(), 1);
        assert_eq!(Skill::new(SkillPath::Hunter, 25).tier(), 3);
        assert_eq!(Skill::new(SkillPath::Hunter, 90).tier(), 3);
    }

    #[test]
    fn best_hunting_tier_considers_both_skills() {
        let member = ClanMember::new(1, Role::Warrior, 30)
            .with_primary_skill(Skill::new(SkillPath::Hunter, 3))
            .with_secondary_skill(Skill::new(SkillPath::Hunter, 15));
        assert_eq!(member.hunting_tier(), Some(2));

        let climber = ClanMember::new(2, Role::Warrior, 30)
            .with_primary_skill(Skill::new(SkillPath::Climber, 25));
        assert_eq!(climber.hunting_tier(), None);
    }

    #[test]
    fn feeding_order_covers_every_role_once() {
        for role in Role::ALL {
            let hits = FeedingStatus::FEEDING_ORDER
                .iter()
                .filter(|status| **status == FeedingStatus::Role(role))
                .count();
            assert_eq!(hits, 1, "{}", role.key());
        }
    }

    #[test]
    fn member_deserializes_with_defaults() {
        let member: ClanMember =
            serde_json::from_str(r#"{"id": 4, "role": "medicine_cat", "moons": 40}"#).unwrap();
        assert_eq!(member.id, MemberId(4));
        assert!(member.alive_in_clan);
        assert!(member.parents.is_empty());
        assert!(!member.is_incapacitated());
    }
}
