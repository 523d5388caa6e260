//! Fixed-point money and rate arithmetic.
//!
//! All monetary values are **minor units** (e.g. cents) in an `i64`; rates are
//! basis points. Binary floats never touch financial math: repeated
//! aggregation over floats drifts, integer arithmetic does not.

use serde::{Deserialize, Serialize};

use crate::value_object::ValueObject;

/// A monetary amount in minor units (e.g. cents).
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// From minor units (cents).
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// From major units (whole currency), e.g. `Money::from_major(10)` == 10.00.
    /// Saturates at the `i64` minor-unit range.
    pub const fn from_major(major: i64) -> Self {
        Self(major.saturating_mul(100))
    }

    pub const fn minor(self) -> i64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Saturating addition, for reductions that must not fail.
    pub fn saturating_add(self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }

    /// Divide evenly across `count` parts, rounding half up.
    /// Returns zero when `count` is zero (used by averaging reductions).
    pub fn div_round(self, count: u64) -> Money {
        if count == 0 {
            return Money::ZERO;
        }
        Money(round_half_up(self.0 as i128, count as i128))
    }

    /// Apply a rate, rounding half away from zero to the nearest minor unit.
    ///
    /// Matches 2-decimal half-up rounding when minor units are cents. The
    /// intermediate product is computed in `i128`, so this cannot overflow.
    pub fn apply_rate(self, rate: Rate) -> Money {
        let numer = self.0 as i128 * rate.basis_points() as i128;
        Money(round_half_up(numer, Rate::SCALE as i128))
    }

    /// Take a whole-percent share of this amount, rounding half up.
    pub fn percent_share(self, percent: u8) -> Money {
        let numer = self.0 as i128 * percent as i128;
        Money(round_half_up(numer, 100))
    }
}

impl core::fmt::Display for Money {
    /// Renders as major.minor, e.g. `12.34` or `-0.05`.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl ValueObject for Money {}

/// A percentage rate in basis points (10_000 == 100%).
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate(u32);

impl Rate {
    /// Basis points per whole (100%).
    pub const SCALE: u32 = 10_000;

    pub const fn from_basis_points(bp: u32) -> Self {
        Self(bp)
    }

    /// From whole percent, e.g. `Rate::from_percent(10)` == 10.00%.
    pub const fn from_percent(percent: u32) -> Self {
        Self(percent * 100)
    }

    pub const fn basis_points(self) -> u32 {
        self.0
    }
}

impl core::fmt::Display for Rate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{:02}%", self.0 / 100, self.0 % 100)
    }
}

impl ValueObject for Rate {}

/// Integer division rounding half away from zero.
fn round_half_up(numer: i128, denom: i128) -> i64 {
    debug_assert!(denom > 0);
    let quotient = if numer >= 0 {
        (numer + denom / 2) / denom
    } else {
        -((-numer + denom / 2) / denom)
    };
    quotient as i64
}
