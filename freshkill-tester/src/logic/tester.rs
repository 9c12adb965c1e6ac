use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::logic::scenarios::Scenario;
use crate::logic::simulation::{SimulationSession, SimulationSummary};

/// Overrides applied to every scenario in a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOverrides {
    pub moons: Option<u32>,
    pub clan_size: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub seed: u64,
    pub passed: bool,
    pub moons_run: usize,
    pub final_pile: f64,
    pub total_eaten: f64,
    pub total_spoiled: f64,
    pub starving_at_end: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

pub struct LogicTester {
    verbose: bool,
    overrides: RunOverrides,
}

impl LogicTester {
    pub const fn new(verbose: bool, overrides: RunOverrides) -> Self {
        Self { verbose, overrides }
    }

    pub fn run_scenario(&self, scenario: &Scenario, seeds: &[u64]) -> Vec<ScenarioResult> {
        seeds
            .iter()
            .map(|&seed| {
                if self.verbose {
                    println!(
                        "🧪 Testing scenario: {} (seed: {seed})",
                        scenario.key.bright_white()
                    );
                }
                self.run_single_scenario(scenario, seed)
            })
            .collect()
    }

    fn run_single_scenario(&self, scenario: &Scenario, seed: u64) -> ScenarioResult {
        let start = Instant::now();
        let config = match scenario.plan(seed, self.overrides.moons, self.overrides.clan_size) {
            Ok(config) => config,
            Err(err) => return failed(scenario, seed, format!("{err:#}"), start.elapsed()),
        };

        let summary = SimulationSession::new(config).run();
        let mut failures = summary.violations.clone();
        if let Err(err) = scenario.check(&summary) {
            failures.push(format!("{err:#}"));
        }
        if self.verbose {
            print_moons(&summary);
        }

        ScenarioResult {
            scenario_name: scenario.key.to_string(),
            seed,
            passed: failures.is_empty(),
            moons_run: summary.moons.len(),
            final_pile: summary.final_pile,
            total_eaten: summary.total_eaten,
            total_spoiled: summary.total_spoiled,
            starving_at_end: summary.starving_at_end,
            failures,
            duration: start.elapsed(),
        }
    }
}

fn failed(scenario: &Scenario, seed: u64, reason: String, duration: Duration) -> ScenarioResult {
    ScenarioResult {
        scenario_name: scenario.key.to_string(),
        seed,
        passed: false,
        moons_run: 0,
        final_pile: 0.0,
        total_eaten: 0.0,
        total_spoiled: 0.0,
        starving_at_end: 0,
        failures: vec![reason],
        duration,
    }
}

fn print_moons(summary: &SimulationSummary) {
    for moon in &summary.moons {
        println!(
            "   moon {:>2}: +{:.2} caught, -{:.2} raided, -{:.2} spoiled, {:.2}/{:.2} eaten, {:.2} left, {} short, {} starving",
            moon.moon,
            moon.income,
            moon.raided,
            moon.spoiled,
            moon.consumed,
            moon.needed,
            moon.pile_after,
            moon.went_short,
            moon.starving
        );
    }
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::scenarios::{all_scenarios, find_scenario};

    #[test]
    fn steady_scenario_passes() {
        let tester = LogicTester::new(false, RunOverrides::default());
        let scenario = find_scenario("steady").unwrap();
        let results = tester.run_scenario(&scenario, &[1337, 7]);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed), "{results:?}");
        assert!(results.iter().all(|r| r.moons_run == 8));
    }

    #[test]
    fn every_scenario_passes_on_the_default_seed() {
        let tester = LogicTester::new(false, RunOverrides::default());
        for scenario in all_scenarios() {
            let results = tester.run_scenario(&scenario, &[1337]);
            assert!(results[0].passed, "{}: {:?}", scenario.key, results[0].failures);
        }
    }

    #[test]
    fn overrides_shorten_the_run() {
        let overrides = RunOverrides {
            moons: Some(2),
            clan_size: Some(8),
        };
        let tester = LogicTester::new(false, overrides);
        let scenario = find_scenario("feast").unwrap();
        let result = &tester.run_scenario(&scenario, &[3])[0];
        assert_eq!(result.moons_run, 2);
    }

    #[test]
    fn result_serializes_duration_as_millis() {
        let result = ScenarioResult {
            scenario_name: "steady".to_string(),
            seed: 1,
            passed: true,
            moons_run: 1,
            final_pile: 2.0,
            total_eaten: 1.0,
            total_spoiled: 0.0,
            starving_at_end: 0,
            failures: Vec::new(),
            duration: Duration::from_millis(42),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["duration"], 42);
    }
}
