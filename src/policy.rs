//! Parameter policy.
//!
//! Pure parameter generation for the campaign loop: per-transaction
//! amounts, discount values, and rotation over validator/LSU pairs.
//! Amounts are whole XRD and discounts integer fixed-point units; nothing
//! here touches the decimal-string wire format, which is the manifest
//! builder's job.

use crate::config::ValidatorPair;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Default random amount range for liquidity campaigns, whole XRD.
pub const LIQUIDITY_AMOUNT_RANGE: (u64, u64) = (10_000, 100_000);
/// Default random amount range for unstake campaigns, whole XRD.
pub const UNSTAKE_AMOUNT_RANGE: (u64, u64) = (100_000, 500_000);
/// Default discount range in 5-decimal fixed-point units (0.5% - 1.5%),
/// stepped by 25.
pub const DISCOUNT_RANGE: (u32, u32, u32) = (500, 1500, 25);

/// How the per-transaction amount is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountMode {
    /// A caller-supplied constant, capped at the remaining budget.
    Fixed(u64),
    /// Uniform draw over `[low, high]`, capped at the remaining budget.
    /// When the cap falls below `low`, exactly the remainder is returned
    /// so a campaign can finish with a sub-minimum final transaction.
    BoundedRandom { low: u64, high: u64 },
}

/// How the discount parameter is chosen, in 5-decimal fixed-point units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountMode {
    Fixed(u32),
    /// Draw from `low..high` on a fixed step grid (high exclusive).
    SteppedRandom { low: u32, high: u32, step: u32 },
}

/// How rotation pool entries are picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationMode {
    /// Uniform random pick per iteration.
    RandomPick,
    /// Deterministic round-robin over the pool.
    Cycle,
}

/// Produces the next transaction's quantitative parameters, given the
/// remaining campaign budget.
#[derive(Debug)]
pub struct ParameterPolicy {
    amount: AmountMode,
    discount: DiscountMode,
    rotation: RotationMode,
    cursor: usize,
    rng: StdRng,
}

impl ParameterPolicy {
    pub fn new(amount: AmountMode, discount: DiscountMode, rotation: RotationMode) -> Self {
        Self {
            amount,
            discount,
            rotation,
            cursor: 0,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic policy for tests.
    pub fn with_seed(
        amount: AmountMode,
        discount: DiscountMode,
        rotation: RotationMode,
        seed: u64,
    ) -> Self {
        Self {
            amount,
            discount,
            rotation,
            cursor: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Next amount, never exceeding `remaining` when `remaining > 0`.
    pub fn next_amount(&mut self, remaining: u64) -> u64 {
        match self.amount {
            AmountMode::Fixed(value) => value.min(remaining),
            AmountMode::BoundedRandom { low, high } => {
                let capped_high = high.min(remaining);
                if capped_high < low {
                    remaining
                } else {
                    self.rng.gen_range(low..=capped_high)
                }
            }
        }
    }

    /// Next discount value in fixed-point units.
    pub fn next_discount(&mut self) -> u32 {
        match self.discount {
            DiscountMode::Fixed(value) => value,
            DiscountMode::SteppedRandom { low, high, step } => {
                let steps = (high.saturating_sub(low)) / step.max(1);
                if steps == 0 {
                    low
                } else {
                    low + self.rng.gen_range(0..steps) * step
                }
            }
        }
    }

    /// Next rotation pool entry. Panics on an empty pool, which callers
    /// rule out by construction.
    pub fn next_pair<'a>(&mut self, pool: &'a [ValidatorPair]) -> &'a ValidatorPair {
        match self.rotation {
            RotationMode::RandomPick => &pool[self.rng.gen_range(0..pool.len())],
            RotationMode::Cycle => {
                let pair = &pool[self.cursor % pool.len()];
                self.cursor += 1;
                pair
            }
        }
    }
}
