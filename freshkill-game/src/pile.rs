//! The freshkill pile: prey grouped by how many moons remain before it spoils.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::numbers::{round_prey, sanitize_amount};

/// One expiry level of the pile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    ExpiresIn4,
    ExpiresIn3,
    ExpiresIn2,
    ExpiresIn1,
}

impl Bucket {
    /// Draw order for feeding and removal: prey closest to spoiling goes first.
    pub const SOONEST_FIRST: [Self; 4] = [
        Self::ExpiresIn1,
        Self::ExpiresIn2,
        Self::ExpiresIn3,
        Self::ExpiresIn4,
    ];

    #[must_use]
    pub const fn moons_left(self) -> u8 {
        match self {
            Self::ExpiresIn4 => 4,
            Self::ExpiresIn3 => 3,
            Self::ExpiresIn2 => 2,
            Self::ExpiresIn1 => 1,
        }
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::ExpiresIn4 => "expires_in_4",
            Self::ExpiresIn3 => "expires_in_3",
            Self::ExpiresIn2 => "expires_in_2",
            Self::ExpiresIn1 => "expires_in_1",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Whether a draw may actually take prey off the pile.
///
/// Moon-skip passes with automatic feeding disabled still walk every member
/// through the allocation math, but their draws come back entirely unmet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawGate {
    #[default]
    Open,
    Suppressed,
}

impl DrawGate {
    #[must_use]
    pub const fn is_suppressed(self) -> bool {
        matches!(self, Self::Suppressed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FreshkillPile {
    #[serde(default)]
    expires_in_4: f64,
    #[serde(default)]
    expires_in_3: f64,
    #[serde(default)]
    expires_in_2: f64,
    #[serde(default)]
    expires_in_1: f64,
}

impl FreshkillPile {
    /// A pile holding `amount` fresh prey.
    #[must_use]
    pub fn with_start_amount(amount: f64) -> Self {
        let mut pile = Self::default();
        pile.add(amount);
        pile
    }

    /// Build a pile from explicit levels, freshest first.
    #[must_use]
    pub fn from_buckets(levels: [f64; 4]) -> Self {
        let [four, three, two, one] = levels.map(sanitize_amount);
        Self {
            expires_in_4: four,
            expires_in_3: three,
            expires_in_2: two,
            expires_in_1: one,
        }
    }

    #[must_use]
    pub const fn bucket(&self, bucket: Bucket) -> f64 {
        match bucket {
            Bucket::ExpiresIn4 => self.expires_in_4,
            Bucket::ExpiresIn3 => self.expires_in_3,
            Bucket::ExpiresIn2 => self.expires_in_2,
            Bucket::ExpiresIn1 => self.expires_in_1,
        }
    }

    const fn bucket_mut(&mut self, bucket: Bucket) -> &mut f64 {
        match bucket {
            Bucket::ExpiresIn4 => &mut self.expires_in_4,
            Bucket::ExpiresIn3 => &mut self.expires_in_3,
            Bucket::ExpiresIn2 => &mut self.expires_in_2,
            Bucket::ExpiresIn1 => &mut self.expires_in_1,
        }
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.expires_in_4 + self.expires_in_3 + self.expires_in_2 + self.expires_in_1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() <= 0.0
    }

    /// Put freshly caught prey on the pile.
    pub fn add(&mut self, amount: f64) {
        if !amount.is_finite() || amount < 0.0 {
            log::warn!("ignoring invalid prey amount {amount}");
        }
        let clean = sanitize_amount(amount);
        if clean <= 0.0 {
            return;
        }
        self.expires_in_4 = round_prey(self.expires_in_4 + clean);
    }

    /// Take `amount` off the pile, spoiling-soonest prey first.
    pub fn remove(&mut self, amount: f64) {
        self.remove_in_order(amount, Bucket::SOONEST_FIRST);
    }

    /// Take `amount` off the pile, visiting the levels in random order.
    pub fn remove_with_rng(&mut self, amount: f64, rng: &mut impl Rng) {
        let mut order = Bucket::SOONEST_FIRST;
        order.shuffle(rng);
        self.remove_in_order(amount, order);
    }

    fn remove_in_order(&mut self, amount: f64, order: [Bucket; 4]) {
        let mut remaining = sanitize_amount(amount);
        for bucket in order {
            if remaining <= 0.0 {
                break;
            }
            let level = self.bucket_mut(bucket);
            let taken = level.min(remaining);
            *level -= taken;
            remaining -= taken;
        }
    }

    /// Advance one moon. Prey that was about to expire spoils and is returned.
    pub fn age_one_tick(&mut self) -> f64 {
        let spoiled = self.expires_in_1;
        self.expires_in_1 = self.expires_in_2;
        self.expires_in_2 = self.expires_in_3;
        self.expires_in_3 = self.expires_in_4;
        self.expires_in_4 = 0.0;
        spoiled
    }

    /// Draw up to `requested` from a single level and return what is still
    /// missing. A suppressed gate leaves the pile untouched.
    pub fn take_from(&mut self, bucket: Bucket, requested: f64, gate: DrawGate) -> f64 {
        if gate.is_suppressed() {
            return requested;
        }
        if requested <= 0.0 {
            return 0.0;
        }
        let level = self.bucket_mut(bucket);
        if *level >= requested {
            *level -= requested;
            0.0
        } else {
            let remainder = requested - *level;
            *level = 0.0;
            remainder
        }
    }

    /// Draw `requested` across every level, soonest-expiring first.
    pub fn take(&mut self, requested: f64, gate: DrawGate) -> f64 {
        Bucket::SOONEST_FIRST
            .into_iter()
            .fold(requested, |remaining, bucket| {
                self.take_from(bucket, remaining, gate)
            })
    }
}
