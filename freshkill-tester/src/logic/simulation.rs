use freshkill_game::constants::PREY_TOLERANCE;
use freshkill_game::{
    Bucket, ClanFood, ClanMember, ClanSettings, FreshkillPile, MemberId, NutritionStatus,
    PreyConfig, SupplyTrigger,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::logic::roster::{RosterShape, generate_roster};

const SUPPLY_BANDS: [SupplyTrigger; 4] = [
    SupplyTrigger::Low,
    SupplyTrigger::Adequate,
    SupplyTrigger::Full,
    SupplyTrigger::Excess,
];

/// Configuration for a simulation session.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub seed: u64,
    pub settings: ClanSettings,
    pub clan_size: usize,
    pub moons: u32,
    /// Prey caught each moon, as a fraction range of the clan's need.
    pub income: (f64, f64),
    /// Chance per moon that predators raid the pile.
    pub raid_chance: f64,
    pub manual_topup: bool,
    pub shape: RosterShape,
}

impl SimulationConfig {
    #[must_use]
    pub fn new(settings: ClanSettings, seed: u64) -> Self {
        Self {
            seed,
            settings,
            clan_size: 14,
            moons: 8,
            income: (1.0, 1.0),
            raid_chance: 0.0,
            manual_topup: false,
            shape: RosterShape::default(),
        }
    }

    #[must_use]
    pub const fn with_moons(mut self, moons: u32) -> Self {
        self.moons = moons;
        self
    }

    #[must_use]
    pub const fn with_clan_size(mut self, clan_size: usize) -> Self {
        self.clan_size = clan_size;
        self
    }

    #[must_use]
    pub const fn with_income(mut self, low: f64, high: f64) -> Self {
        self.income = (low, high);
        self
    }

    #[must_use]
    pub const fn with_raids(mut self, chance: f64) -> Self {
        self.raid_chance = chance;
        self
    }

    #[must_use]
    pub const fn with_manual_topup(mut self, enabled: bool) -> Self {
        self.manual_topup = enabled;
        self
    }
}

/// What happened to the pile and the clan over one moon.
#[derive(Debug, Clone, Serialize)]
pub struct MoonRecord {
    pub moon: u32,
    pub income: f64,
    pub raided: f64,
    pub spoiled: f64,
    pub needed: f64,
    pub consumed: f64,
    pub pile_after: f64,
    pub went_short: usize,
    pub starving: usize,
    pub topped_up: usize,
    pub supply: Option<SupplyTrigger>,
    /// Members in the order they were served by the moon-skip pass.
    #[serde(skip)]
    pub served: Vec<MemberId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationSummary {
    pub seed: u64,
    pub moons: Vec<MoonRecord>,
    pub final_pile: f64,
    pub total_eaten: f64,
    pub total_spoiled: f64,
    pub starving_at_end: usize,
    pub below_full_at_end: usize,
    pub log_keys: BTreeSet<String>,
    pub violations: Vec<String>,
    #[serde(skip)]
    pub roster: Vec<ClanMember>,
}

/// Deterministic multi-moon run of one clan.
pub struct SimulationSession {
    food: ClanFood,
    roster: Vec<ClanMember>,
    config: SimulationConfig,
    rng: ChaCha20Rng,
    moon: u32,
    log_keys: BTreeSet<String>,
    violations: Vec<String>,
}

impl SimulationSession {
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(config.seed);
        let roster = generate_roster(&mut rng, config.clan_size, config.shape);
        let food = ClanFood::new(PreyConfig::default_config());
        Self {
            food,
            roster,
            config,
            rng,
            moon: 0,
            log_keys: BTreeSet::new(),
            violations: Vec::new(),
        }
    }

    /// Hunt, maybe lose prey to a raid, skip the moon and check the books.
    pub fn advance(&mut self) -> MoonRecord {
        self.moon += 1;
        let settings = self.config.settings;
        let need = self.food.amount_food_needed(&self.roster, settings.game_mode);

        let (low, high) = self.config.income;
        let share = if high > low {
            self.rng.gen_range(low..=high)
        } else {
            low
        };
        let income = need * share;
        self.food.add_prey(income);

        let mut raided = 0.0;
        if self.config.raid_chance > 0.0 && self.rng.gen_bool(self.config.raid_chance) {
            let before = self.food.pile.total();
            let loss = before * self.rng.gen_range(0.1..=0.3);
            self.food.pile.remove_with_rng(loss, &mut self.rng);
            raided = before - self.food.pile.total();
        }

        let pile_before = self.food.pile;
        let report = self.food.moon_skip(&self.roster, &settings);
        self.check_moon(&pile_before, report.spoiled, report.consumed(), report.outcome.total_eaten());
        self.check_scores("moon-skip");
        if settings.ration_prey && report.consumed() > report.needed / 2.0 + PREY_TOLERANCE {
            self.violate(format!(
                "rationing ate {:.2} of a {:.2} need",
                report.consumed(),
                report.needed
            ));
        }
        if !settings.auto_feed && report.consumed() > PREY_TOLERANCE {
            self.violate(format!("auto-feed off still ate {:.2}", report.consumed()));
        }
        self.log_keys.extend(report.logs.iter().cloned());

        let topped_up = if self.config.manual_topup {
            self.top_up(&settings)
        } else {
            0
        };

        let supply = SUPPLY_BANDS.into_iter().find(|band| {
            self.food
                .supply_matches(&self.roster, &[*band], settings.game_mode, None)
        });
        let starving = self.count_status(NutritionStatus::Starving);

        if let Some(band) = supply {
            log::debug!("moon {} ends with {:?} supply", self.moon, band);
        }
        MoonRecord {
            moon: self.moon,
            income,
            raided,
            spoiled: report.spoiled,
            needed: report.needed,
            consumed: report.consumed(),
            pile_after: self.food.pile.total(),
            went_short: report.outcome.underfed().len(),
            starving,
            topped_up,
            supply,
            served: report.outcome.meals.iter().map(|meal| meal.id).collect(),
        }
    }

    /// Run every configured moon and summarize.
    #[must_use]
    pub fn run(mut self) -> SimulationSummary {
        let moons: Vec<MoonRecord> = (0..self.config.moons).map(|_| self.advance()).collect();
        let total_eaten = moons.iter().map(|moon| moon.consumed).sum();
        let total_spoiled = moons.iter().map(|moon| moon.spoiled).sum();
        let starving_at_end = self.count_status(NutritionStatus::Starving);
        let below_full_at_end = self
            .food
            .nutrition
            .iter()
            .filter(|(_, record)| !record.is_full())
            .count();
        SimulationSummary {
            seed: self.config.seed,
            final_pile: self.food.pile.total(),
            total_eaten,
            total_spoiled,
            starving_at_end,
            below_full_at_end,
            moons,
            log_keys: self.log_keys,
            violations: self.violations,
            roster: self.roster,
        }
    }

    fn top_up(&mut self, settings: &ClanSettings) -> usize {
        let hungry = self.food.low_nutrition_members();
        if hungry.is_empty() {
            return 0;
        }
        let before: Vec<(MemberId, f64)> = hungry
            .iter()
            .filter_map(|id| self.food.nutrition.get(*id).map(|r| (*id, r.current_score())))
            .collect();
        let pile_before = self.food.pile.total();
        let outcome = self.food.feed_members(&self.roster, &hungry, settings);
        self.log_keys.extend(outcome.logs.iter().cloned());

        let drawn = pile_before - self.food.pile.total();
        if (drawn - outcome.total_eaten()).abs() > PREY_TOLERANCE {
            self.violate(format!(
                "manual feeding drew {drawn:.2} but recorded {:.2}",
                outcome.total_eaten()
            ));
        }
        for (id, score) in before {
            let after = self
                .food
                .nutrition
                .get(id)
                .map_or(score, |record| record.current_score());
            if after + PREY_TOLERANCE < score {
                self.violate(format!("manual feeding lowered {id} from {score:.2} to {after:.2}"));
            }
        }
        self.check_scores("manual");
        outcome.meals.len()
    }

    fn check_moon(&mut self, before: &FreshkillPile, spoiled: f64, consumed: f64, eaten: f64) {
        let expiring = before.bucket(Bucket::ExpiresIn1);
        if (spoiled - expiring).abs() > PREY_TOLERANCE {
            self.violate(format!("spoiled {spoiled:.2} but {expiring:.2} was expiring"));
        }
        if (consumed - eaten).abs() > PREY_TOLERANCE {
            self.violate(format!("pile lost {consumed:.2} but meals ate {eaten:.2}"));
        }
        let expected = before.total() - spoiled - consumed;
        let after = self.food.pile.total();
        if (expected - after).abs() > PREY_TOLERANCE {
            self.violate(format!("pile holds {after:.2}, expected {expected:.2}"));
        }
        for bucket in Bucket::SOONEST_FIRST {
            if self.food.pile.bucket(bucket) < 0.0 {
                self.violate(format!("{bucket} went negative"));
            }
        }
    }

    fn check_scores(&mut self, stage: &str) {
        let broken: Vec<String> = self
            .food
            .nutrition
            .iter()
            .filter(|(_, record)| {
                record.current_score() < 0.0
                    || record.current_score() > record.max_score() + PREY_TOLERANCE
            })
            .map(|(id, record)| {
                format!(
                    "{stage}: {id} at {:.2} of {:.2}",
                    record.current_score(),
                    record.max_score()
                )
            })
            .collect();
        for message in broken {
            self.violate(message);
        }
    }

    fn count_status(&self, status: NutritionStatus) -> usize {
        self.food
            .nutrition
            .iter()
            .filter(|(id, _)| self.food.nutrition_status(*id) == Some(status))
            .count()
    }

    fn violate(&mut self, message: String) {
        log::warn!("moon {}: {message}", self.moon);
        self.violations.push(format!("moon {}: {message}", self.moon));
    }
}
