pub mod reports;
pub mod roster;
pub mod scenarios;
pub mod simulation;
pub mod tester;

pub use scenarios::{find_scenario, list_scenarios};
pub use tester::{LogicTester, RunOverrides, ScenarioResult};
