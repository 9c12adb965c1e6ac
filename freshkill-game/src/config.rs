//! Prey balance configuration
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::member::{FeedingStatus, Role};

const DEFAULT_PREY_CONFIG: &str = include_str!("../assets/prey_config.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreyConfig {
    #[serde(default = "default_start_amount")]
    pub start_amount: f64,
    #[serde(default = "default_requirements")]
    pub prey_requirement: BTreeMap<Role, f64>,
    #[serde(default = "default_queen_requirement")]
    pub queen_or_pregnant: f64,
    /// Extra prey an incapacitated member needs in cruel season.
    #[serde(default = "default_condition_increase")]
    pub condition_increase: f64,
    /// Kits younger than this are fed by their queen.
    #[serde(default = "default_queen_kit_age")]
    pub queen_kit_age_moons: u32,
    /// Elders older than this bank less surplus.
    #[serde(default = "default_elder_lean_moons")]
    pub elder_lean_moons: u32,
    #[serde(default = "default_trigger_factor")]
    pub base_event_trigger_factor: f64,
    #[serde(default)]
    pub nutrition: NutritionThresholds,
    #[serde(default = "default_true")]
    pub report_spoilage: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionThresholds {
    #[serde(default = "default_starving_pct")]
    pub starving_percentage: f64,
    #[serde(default = "default_malnourished_pct")]
    pub malnourished_percentage: f64,
    /// Members at or below this percentage are offered for manual feeding.
    #[serde(default = "default_low_pct")]
    pub low_percentage: f64,
}

impl Default for NutritionThresholds {
    fn default() -> Self {
        Self {
            starving_percentage: default_starving_pct(),
            malnourished_percentage: default_malnourished_pct(),
            low_percentage: default_low_pct(),
        }
    }
}

impl Default for PreyConfig {
    fn default() -> Self {
        Self {
            start_amount: default_start_amount(),
            prey_requirement: default_requirements(),
            queen_or_pregnant: default_queen_requirement(),
            condition_increase: default_condition_increase(),
            queen_kit_age_moons: default_queen_kit_age(),
            elder_lean_moons: default_elder_lean_moons(),
            base_event_trigger_factor: default_trigger_factor(),
            nutrition: NutritionThresholds::default(),
            report_spoilage: true,
        }
    }
}

impl PreyConfig {
    /// Load the bundled prey configuration, falling back to built-in values.
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_PREY_CONFIG).unwrap_or_default()
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self::load_from_static()
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a prey configuration.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Prey needed per moon for a feeding status. `None` means the status
    /// is not fed from the pile at all.
    #[must_use]
    pub fn requirement_for(&self, status: FeedingStatus) -> Option<f64> {
        match status {
            FeedingStatus::Role(role) => self.prey_requirement.get(&role).copied(),
            FeedingStatus::QueenOrPregnant => Some(self.queen_or_pregnant),
        }
    }

    #[must_use]
    pub fn with_requirement(mut self, role: Role, amount: f64) -> Self {
        self.prey_requirement.insert(role, amount);
        self
    }

    #[must_use]
    pub fn without_requirement(mut self, role: Role) -> Self {
        self.prey_requirement.remove(&role);
        self
    }
}

fn default_requirements() -> BTreeMap<Role, f64> {
    Role::ALL
        .into_iter()
        .map(|role| (role, role.default_requirement()))
        .collect()
}

const fn default_start_amount() -> f64 {
    10.0
}

const fn default_queen_requirement() -> f64 {
    4.0
}

const fn default_condition_increase() -> f64 {
    0.5
}

const fn default_queen_kit_age() -> u32 {
    3
}

const fn default_elder_lean_moons() -> u32 {
    114
}

const fn default_trigger_factor() -> f64 {
    4.0
}

const fn default_starving_pct() -> f64 {
    20.0
}

const fn default_malnourished_pct() -> f64 {
    50.0
}

const fn default_low_pct() -> f64 {
    90.0
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_config_matches_builtin_defaults() {
        assert_eq!(PreyConfig::load_from_static(), PreyConfig::default());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = PreyConfig::from_json(r#"{"start_amount": 25, "prey_requirement": {"warrior": 4}}"#)
            .unwrap();
        assert!((cfg.start_amount - 25.0).abs() < f64::EPSILON);
        assert_eq!(cfg.requirement_for(FeedingStatus::Role(Role::Warrior)), Some(4.0));
        assert_eq!(cfg.requirement_for(FeedingStatus::Role(Role::Kitten)), None);
        assert_eq!(cfg.requirement_for(FeedingStatus::QueenOrPregnant), Some(4.0));
        assert!((cfg.nutrition.low_percentage - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn requirement_overrides_apply() {
        let cfg = PreyConfig::default()
            .with_requirement(Role::Elder, 2.0)
            .without_requirement(Role::Mediator);
        assert_eq!(cfg.requirement_for(Role::Elder.into()), Some(2.0));
        assert_eq!(cfg.requirement_for(Role::Mediator.into()), None);
    }
}
