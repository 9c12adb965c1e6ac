//! Seeded clan rosters for simulation runs.
use freshkill_game::{ClanMember, Gender, MemberId, Role, Skill, SkillPath};
use rand::Rng;
use rand::seq::SliceRandom;

/// Leader, deputy and medicine cat are always present.
pub const MIN_CLAN_SIZE: usize = 6;

const OTHER_PATHS: [SkillPath; 5] = [
    SkillPath::Climber,
    SkillPath::Runner,
    SkillPath::Swimmer,
    SkillPath::Fighter,
    SkillPath::Teacher,
];

/// Odds that a generated adult is ill, injured, or (if female) pregnant.
#[derive(Debug, Clone, Copy)]
pub struct RosterShape {
    pub illness: f64,
    pub injury: f64,
    pub pregnancy: f64,
    pub hunters: f64,
}

impl Default for RosterShape {
    fn default() -> Self {
        Self {
            illness: 0.08,
            injury: 0.08,
            pregnancy: 0.1,
            hunters: 0.35,
        }
    }
}

/// Build a roster of `size` living members. Kits are parented by warriors
/// already on the roster.
pub fn generate_roster<R: Rng>(rng: &mut R, size: usize, shape: RosterShape) -> Vec<ClanMember> {
    let size = size.max(MIN_CLAN_SIZE);
    let mut roster = vec![
        adult(rng, 1, Role::Leader, 60..=110, shape),
        adult(rng, 2, Role::Deputy, 40..=90, shape),
        adult(rng, 3, Role::MedicineCat, 30..=100, shape),
    ];

    let mut next_id = 4_u32;
    while roster.len() < size {
        let id = next_id;
        next_id += 1;
        let member = match rng.gen_range(0..100) {
            0..=54 => adult(rng, id, Role::Warrior, 12..=80, shape),
            55..=66 => ClanMember::new(id, Role::Apprentice, rng.gen_range(6..=11)),
            67..=76 => adult(rng, id, Role::Elder, 100..=160, shape),
            _ => kit(rng, id, &roster),
        };
        roster.push(member);
    }
    roster
}

fn adult<R: Rng>(
    rng: &mut R,
    id: u32,
    role: Role,
    moons: std::ops::RangeInclusive<u32>,
    shape: RosterShape,
) -> ClanMember {
    let gender = if rng.gen_bool(0.5) {
        Gender::Female
    } else {
        Gender::Male
    };
    let skill = if rng.gen_bool(shape.hunters) {
        Skill::new(SkillPath::Hunter, rng.gen_range(0..=30))
    } else {
        let path = OTHER_PATHS.choose(rng).copied().unwrap_or(SkillPath::Climber);
        Skill::new(path, rng.gen_range(0..=30))
    };
    let mut member = ClanMember::new(id, role, rng.gen_range(moons))
        .with_gender(gender)
        .with_experience(rng.gen_range(0..=100))
        .with_primary_skill(skill);
    member.ill = rng.gen_bool(shape.illness);
    member.injured = rng.gen_bool(shape.injury);
    member.pregnant = gender == Gender::Female && role != Role::Elder && rng.gen_bool(shape.pregnancy);
    member
}

fn kit<R: Rng>(rng: &mut R, id: u32, roster: &[ClanMember]) -> ClanMember {
    let moons = rng.gen_range(0..=5);
    let role = if moons == 0 { Role::Newborn } else { Role::Kitten };
    let warriors: Vec<MemberId> = roster
        .iter()
        .filter(|member| member.role == Role::Warrior)
        .map(|member| member.id)
        .collect();
    let parents: Vec<MemberId> = warriors.choose_multiple(rng, 2).copied().collect();
    ClanMember::new(id, role, moons).with_parents(parents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn roster_is_deterministic_per_seed() {
        let first = generate_roster(&mut ChaCha20Rng::seed_from_u64(7), 20, RosterShape::default());
        let second = generate_roster(&mut ChaCha20Rng::seed_from_u64(7), 20, RosterShape::default());
        assert_eq!(first, second);
        assert_eq!(first.len(), 20);
    }

    #[test]
    fn roster_keeps_the_leadership() {
        let roster = generate_roster(&mut ChaCha20Rng::seed_from_u64(1), 2, RosterShape::default());
        assert_eq!(roster.len(), MIN_CLAN_SIZE);
        assert_eq!(roster[0].role, Role::Leader);
        assert_eq!(roster[1].role, Role::Deputy);
        assert_eq!(roster[2].role, Role::MedicineCat);
    }

    #[test]
    fn kits_only_name_warriors_as_parents() {
        let roster = generate_roster(&mut ChaCha20Rng::seed_from_u64(99), 40, RosterShape::default());
        for member in roster.iter().filter(|member| member.role.is_baby()) {
            for parent in &member.parents {
                let parent = roster.iter().find(|other| other.id == *parent).unwrap();
                assert_eq!(parent.role, Role::Warrior);
            }
        }
    }
}
