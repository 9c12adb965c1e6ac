//! Named simulation scenarios and the outcomes they expect.
use anyhow::{Context, Result, ensure};
use freshkill_game::{ClanFood, ClanMember, ClanSettings, GameMode, MemberId, SupplyTrigger, ToggleValue};

use crate::logic::roster::RosterShape;
use crate::logic::simulation::{SimulationConfig, SimulationSummary};

type Expectation = fn(&SimulationSummary) -> Result<()>;

pub struct Scenario {
    pub key: &'static str,
    pub description: &'static str,
    toggles: Vec<(&'static str, ToggleValue)>,
    clan_size: usize,
    moons: u32,
    income: (f64, f64),
    raid_chance: f64,
    manual_topup: bool,
    shape: RosterShape,
    expectation: Expectation,
}

impl Scenario {
    fn new(key: &'static str, description: &'static str, expectation: Expectation) -> Self {
        Self {
            key,
            description,
            toggles: vec![("game_mode", ToggleValue::from("expanded"))],
            clan_size: 14,
            moons: 8,
            income: (1.0, 1.2),
            raid_chance: 0.0,
            manual_topup: false,
            shape: RosterShape::default(),
            expectation,
        }
    }

    fn toggle(mut self, name: &'static str, value: impl Into<ToggleValue>) -> Self {
        self.toggles.retain(|(existing, _)| *existing != name);
        self.toggles.push((name, value.into()));
        self
    }

    fn income(mut self, low: f64, high: f64) -> Self {
        self.income = (low, high);
        self
    }

    fn moons(mut self, moons: u32) -> Self {
        self.moons = moons;
        self
    }

    fn raids(mut self, chance: f64) -> Self {
        self.raid_chance = chance;
        self
    }

    fn manual_topup(mut self) -> Self {
        self.manual_topup = true;
        self
    }

    fn shape(mut self, shape: RosterShape) -> Self {
        self.shape = shape;
        self
    }

    /// Clan settings parsed from the scenario's toggles.
    pub fn settings(&self) -> Result<ClanSettings> {
        ClanSettings::from_toggles(self.toggles.iter().map(|(name, value)| (*name, value)))
            .with_context(|| format!("scenario {} has invalid toggles", self.key))
    }

    pub fn plan(&self, seed: u64, moons: Option<u32>, clan_size: Option<usize>) -> Result<SimulationConfig> {
        let mut config = SimulationConfig::new(self.settings()?, seed)
            .with_moons(moons.unwrap_or(self.moons))
            .with_clan_size(clan_size.unwrap_or(self.clan_size))
            .with_income(self.income.0, self.income.1)
            .with_raids(self.raid_chance)
            .with_manual_topup(self.manual_topup);
        config.shape = self.shape;
        Ok(config)
    }

    pub fn check(&self, summary: &SimulationSummary) -> Result<()> {
        (self.expectation)(summary)
    }
}

pub fn all_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "steady",
            "Hunts cover the clan's need every moon; nobody goes short",
            steady_expectation,
        )
        .income(1.3, 1.6),
        Scenario::new(
            "famine",
            "Thin hunts and raids on the pile; hungriest members eat first",
            famine_expectation,
        )
        .toggle("hungriest_first", true)
        .income(0.0, 0.4)
        .raids(0.5),
        Scenario::new(
            "rationing",
            "Rationing halves every meal and the clan slowly thins",
            rationing_expectation,
        )
        .toggle("ration_prey", true),
        Scenario::new(
            "feast",
            "Hunts far outstrip the need; surplus spoils on the pile",
            feast_expectation,
        )
        .toggle("youngest_first", true)
        .income(2.5, 3.0),
        Scenario::new(
            "hunters-first",
            "Scarce prey with hunters served ahead of the rest",
            hunters_first_expectation,
        )
        .toggle("hunter_first", true)
        .toggle("high_rank", true)
        .income(0.4, 0.7)
        .moons(6),
        Scenario::new(
            "manual-topup",
            "Automatic feeding off; hungry members are fed by hand each moon",
            manual_topup_expectation,
        )
        .toggle("auto_feed", false)
        .income(1.0, 1.4)
        .moons(6)
        .manual_topup(),
        Scenario::new(
            "cruel-season",
            "Cruel season with a sickly clan; the ill and injured eat first",
            cruel_season_expectation,
        )
        .toggle("game_mode", "cruel season")
        .toggle("sick_injured_first", true)
        .income(0.8, 1.1)
        .shape(RosterShape {
            illness: 0.3,
            injury: 0.2,
            ..RosterShape::default()
        }),
    ]
}

pub fn find_scenario(key: &str) -> Option<Scenario> {
    all_scenarios().into_iter().find(|scenario| scenario.key == key)
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    all_scenarios()
        .iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

fn steady_expectation(summary: &SimulationSummary) -> Result<()> {
    let short: usize = summary.moons.iter().map(|moon| moon.went_short).sum();
    ensure!(short == 0, "{short} meals went short in a well-fed clan");
    ensure!(summary.starving_at_end == 0, "a well-fed clan has starving members");
    Ok(())
}

fn famine_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.starving_at_end > 0,
        "famine left nobody starving"
    );
    ensure!(
        summary.log_keys.contains("log.freshkill.group-underfed"),
        "famine never reported an underfed pass"
    );
    Ok(())
}

fn rationing_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.log_keys.contains("log.freshkill.rationing"),
        "rationing was never announced"
    );
    ensure!(
        summary.below_full_at_end > 0,
        "rationing left every member full"
    );
    Ok(())
}

fn feast_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(summary.total_spoiled > 0.0, "a feast left nothing to spoil");
    ensure!(summary.starving_at_end == 0, "members starved during a feast");
    for moon in &summary.moons {
        ensure!(
            matches!(moon.supply, Some(SupplyTrigger::Full | SupplyTrigger::Excess)),
            "moon {} ended with {:?} supply",
            moon.moon,
            moon.supply
        );
    }
    Ok(())
}

fn hunters_first_expectation(summary: &SimulationSummary) -> Result<()> {
    served_first(summary, "hunter", |member| member.hunting_tier().is_some())
}

fn manual_topup_expectation(summary: &SimulationSummary) -> Result<()> {
    let topped_up: usize = summary.moons.iter().map(|moon| moon.topped_up).sum();
    ensure!(topped_up > 0, "nobody was fed by hand");
    ensure!(
        summary.log_keys.contains("log.freshkill.manual"),
        "manual feeding was never logged"
    );
    Ok(())
}

fn cruel_season_expectation(summary: &SimulationSummary) -> Result<()> {
    let food = ClanFood::default();
    let sickly = summary
        .roster
        .iter()
        .any(|member| member.is_incapacitated() && !member.pregnant && !member.role.is_baby());
    if sickly {
        let cruel = food.amount_food_needed(&summary.roster, GameMode::CruelSeason);
        let expanded = food.amount_food_needed(&summary.roster, GameMode::Expanded);
        ensure!(
            cruel > expanded,
            "cruel season need {cruel:.2} does not exceed {expanded:.2}"
        );
    }
    served_first(summary, "ill or injured", ClanMember::is_incapacitated)
}

/// Every member matching `first` is served before anyone who does not.
fn served_first(
    summary: &SimulationSummary,
    label: &str,
    first: impl Fn(&ClanMember) -> bool,
) -> Result<()> {
    let matches = |id: &MemberId| {
        summary
            .roster
            .iter()
            .find(|member| member.id == *id)
            .is_some_and(&first)
    };
    for moon in &summary.moons {
        let last_first = moon.served.iter().rposition(&matches);
        let first_other = moon.served.iter().position(|id| !matches(id));
        if let (Some(last), Some(other)) = (last_first, first_other) {
            ensure!(
                last < other,
                "moon {}: a {label} member was served after {}",
                moon.moon,
                moon.served[other]
            );
        }
    }
    Ok(())
}
