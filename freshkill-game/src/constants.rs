//! Centralized balance and tuning constants for freshkill logic.
//!
//! Values that players may want to rebalance live in the bundled prey
//! config instead; these are the structural constants of the feeding math.

// Logging keys -------------------------------------------------------------
pub(crate) const LOG_PREY_SPOILED: &str = "log.freshkill.spoiled";
pub(crate) const LOG_PREY_CONSUMED: &str = "log.freshkill.consumed";
pub(crate) const LOG_GROUP_UNDERFED: &str = "log.freshkill.group-underfed";
pub(crate) const LOG_FEEDING_SUPPRESSED: &str = "log.freshkill.auto-feed-off";
pub(crate) const LOG_RATIONING: &str = "log.freshkill.rationing";
pub(crate) const LOG_MANUAL_FEEDING: &str = "log.freshkill.manual";

// Pile ---------------------------------------------------------------------
/// Tolerance used when comparing prey totals.
pub const PREY_TOLERANCE: f64 = 0.01;
/// Number of expiry levels in the pile.
pub const PILE_BUCKETS: usize = 4;

// Nutrition ----------------------------------------------------------------
pub(crate) const FULL_PERCENTAGE: f64 = 100.0;
pub(crate) const BABY_ELDER_MULTIPLIER: u8 = 2;
pub(crate) const DEFAULT_MULTIPLIER: u8 = 3;

// Allocation ---------------------------------------------------------------
pub(crate) const RATION_DIVISOR: f64 = 2.0;
/// Surplus bonus tiers as `(pile / need ratio that must be exceeded, bonus)`,
/// checked from the highest ratio down.
pub(crate) const SURPLUS_BONUS_TIERS: [(f64, f64); 4] =
    [(2.0, 2.0), (1.8, 1.5), (1.2, 1.0), (1.0, 0.5)];

// Supply events ------------------------------------------------------------
pub(crate) const SUPPLY_DIVIDER_EXPANDED: f64 = 35.0;
pub(crate) const SUPPLY_DIVIDER_DEFAULT: f64 = 20.0;
pub(crate) const SUPPLY_MIN_FACTOR_EXPANDED: i64 = 2;
