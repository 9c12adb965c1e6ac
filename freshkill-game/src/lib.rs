//! Freshkill Engine
//!
//! Platform-agnostic food logic for a Clan: the decaying freshkill pile,
//! per-member nutrition, and the feeding passes that connect them.
//! Rendering, event text and save formats belong to the embedding game.

pub mod allocation;
pub mod clan;
pub mod config;
pub mod constants;
pub mod member;
pub mod numbers;
pub mod nutrition;
pub mod pile;
pub mod policy;
pub mod queens;
pub mod settings;

// Re-export commonly used types
pub use allocation::{FeedingOutcome, FeedingPass, MealRecord, PassKind, allowance, surplus_bonus};
pub use clan::{ClanFood, MoonReport, SupplyTrigger, excess_threshold, supply_matches};
pub use config::{NutritionThresholds, PreyConfig};
pub use member::{
    ClanMember, FeedingStatus, Gender, MemberId, Role, Skill, SkillPath, SkillSet,
};
pub use nutrition::{Nutrition, NutritionStatus, NutritionTracker, category_multiplier};
pub use pile::{Bucket, DrawGate, FreshkillPile};
pub use policy::{CarveOut, FeedingGroup, FeedingPlan, GroupKind, plan_feeding};
pub use queens::QueenIndex;
pub use settings::{
    ClanSettings, FeedingPriority, FeedingTactic, GameMode, SettingsError, ToggleValue,
};

/// Trait for abstracting data loading operations
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the prey balance data.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or parsed.
    fn load_prey_config(&self) -> Result<PreyConfig, Self::Error>;
}

/// Trait for abstracting save/load operations
/// Platform-specific implementations should provide this
pub trait ClanStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Save clan food state
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be saved.
    fn save_food(&self, save_name: &str, food: &ClanFood) -> Result<(), Self::Error>;

    /// Load clan food state
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be loaded.
    fn load_food(&self, save_name: &str) -> Result<Option<ClanFood>, Self::Error>;

    /// Delete saved state
    ///
    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    fn delete_save(&self, save_name: &str) -> Result<(), Self::Error>;
}

/// Creates, saves and reloads clan food state.
pub struct FreshkillEngine<L, S>
where
    L: DataLoader,
    S: ClanStorage,
{
    data_loader: L,
    storage: S,
}

impl<L, S> FreshkillEngine<L, S>
where
    L: DataLoader,
    S: ClanStorage,
{
    pub const fn new(data_loader: L, storage: S) -> Self {
        Self {
            data_loader,
            storage,
        }
    }

    /// Start a fresh pile with the loader's balance data.
    ///
    /// # Errors
    ///
    /// Returns an error if the prey configuration cannot be loaded.
    pub fn create_food(&self) -> Result<ClanFood, L::Error> {
        let config = self.data_loader.load_prey_config()?;
        Ok(ClanFood::new(config))
    }

    /// # Errors
    ///
    /// Returns an error if the state cannot be saved.
    pub fn save_food(&self, save_name: &str, food: &ClanFood) -> Result<(), S::Error> {
        self.storage.save_food(save_name, food)
    }

    /// Load saved state and attach current balance data to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the state or the configuration cannot be loaded.
    pub fn load_food(&self, save_name: &str) -> Result<Option<ClanFood>, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
        S::Error: Into<anyhow::Error>,
    {
        if let Some(mut food) = self.storage.load_food(save_name).map_err(Into::into)? {
            let config = self.data_loader.load_prey_config().map_err(Into::into)?;
            food.set_config(config);
            Ok(Some(food))
        } else {
            Ok(None)
        }
    }

    /// # Errors
    ///
    /// Returns an error if the save cannot be deleted.
    pub fn delete_food(&self, save_name: &str) -> Result<(), S::Error> {
        self.storage.delete_save(save_name)
    }
}
