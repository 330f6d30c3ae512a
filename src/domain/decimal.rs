//! Lossless decimal numeric type backed by rust_decimal.
//!
//! Every price, share count and percentage flowing through the recommendation
//! engine uses this type so recomputation is bit-identical.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal as RustDecimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lossless decimal numeric type for financial calculations.
///
/// Serializes to a JSON number (not a string).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Decimal {
    pub const ZERO: Decimal = Decimal(RustDecimal::ZERO);
    pub const ONE: Decimal = Decimal(RustDecimal::ONE);
    pub const HUNDRED: Decimal = Decimal(RustDecimal::ONE_HUNDRED);

    /// `num × 10^-scale`, usable in constants: `Decimal::scaled(1035, 3)` is 1.035.
    pub const fn scaled(num: i64, scale: u32) -> Self {
        let magnitude = num.unsigned_abs();
        Decimal(RustDecimal::from_parts(
            magnitude as u32,
            (magnitude >> 32) as u32,
            0,
            num < 0,
            scale,
        ))
    }

    /// Parse a Decimal from a string losslessly.
    ///
    /// # Errors
    /// Returns an error if the string is not a valid decimal number.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s).map(Decimal)
    }

    /// Format the Decimal as a canonical string (no exponent notation).
    pub fn to_canonical_string(&self) -> String {
        let normalized = self.0.normalize();
        format!("{}", normalized)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the value is > 0.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Returns true if the value is < 0.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    pub fn abs(&self) -> Self {
        Decimal(self.0.abs())
    }

    /// Smallest integer greater than or equal to the value.
    pub fn ceil(&self) -> Self {
        Decimal(self.0.ceil())
    }

    /// Largest integer less than or equal to the value.
    pub fn floor(&self) -> Self {
        Decimal(self.0.floor())
    }

    pub fn max(self, other: Decimal) -> Self {
        if self >= other {
            self
        } else {
            other
        }
    }

    pub fn min(self, other: Decimal) -> Self {
        if self <= other {
            self
        } else {
            other
        }
    }

    /// Division that yields `None` for a zero divisor or on overflow.
    pub fn checked_div(self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_div(rhs.0).map(Decimal)
    }

    /// Percent change from `base` to `self`: `(self - base) / base × 100`.
    ///
    /// `None` when `base` is zero.
    pub fn percent_change_from(self, base: Decimal) -> Option<Decimal> {
        (self - base)
            .checked_div(base)
            .map(|ratio| ratio * Decimal::HUNDRED)
    }

    /// Converts a percentage into a fraction (`5` → `0.05`).
    pub fn pct(self) -> Decimal {
        Decimal(self.0 / RustDecimal::ONE_HUNDRED)
    }

    /// Integer part as `u32` if it fits.
    pub fn to_u32(&self) -> Option<u32> {
        self.0.trunc().to_u32()
    }

    /// Round half away from zero to `dp` decimal places.
    pub fn round_dp(&self, dp: u32) -> Self {
        Decimal(
            self.0
                .round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero),
        )
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(precision) => {
                let rounded = self.0.round_dp_with_strategy(
                    precision as u32,
                    RoundingStrategy::MidpointAwayFromZero,
                );
                write!(f, "{:.*}", precision, rounded)
            }
            None => write!(f, "{}", self.to_canonical_string()),
        }
    }
}

impl FromStr for Decimal {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<RustDecimal> for Decimal {
    fn from(value: RustDecimal) -> Self {
        Decimal(value)
    }
}

impl From<Decimal> for RustDecimal {
    fn from(value: Decimal) -> Self {
        value.0
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
        Decimal(RustDecimal::from(value))
    }
}

impl From<u32> for Decimal {
    fn from(value: u32) -> Self {
        Decimal(RustDecimal::from(value))
    }
}

// Arithmetic operations
impl std::ops::Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 + rhs.0)
    }
}

impl std::ops::AddAssign for Decimal {
    fn add_assign(&mut self, rhs: Decimal) {
        self.0 += rhs.0;
    }
}

impl std::ops::Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 - rhs.0)
    }
}

impl std::ops::SubAssign for Decimal {
    fn sub_assign(&mut self, rhs: Decimal) {
        self.0 -= rhs.0;
    }
}

impl std::ops::Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 * rhs.0)
    }
}

impl std::ops::MulAssign for Decimal {
    fn mul_assign(&mut self, rhs: Decimal) {
        self.0 *= rhs.0;
    }
}

/// Panics on a zero divisor like `rust_decimal`; use [`Decimal::checked_div`]
/// wherever the denominator is not already known to be non-zero.
impl std::ops::Div for Decimal {
    type Output = Decimal;

    fn div(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 / rhs.0)
    }
}

impl std::ops::Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal(-self.0)
    }
}

impl std::iter::Sum for Decimal {
    fn sum<I: Iterator<Item = Decimal>>(iter: I) -> Decimal {
        iter.fold(Decimal::ZERO, |acc, x| acc + x)
    }
}
