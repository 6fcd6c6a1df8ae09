//! Lossless decimal numeric type backed by rust_decimal.
//!
//! Provides canonical parsing from strings, formatting without exponent
//! notation, and exact conversion to token base units.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal as RustDecimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest decimal count rust_decimal can scale to.
pub const MAX_TOKEN_DECIMALS: u32 = 28;

/// Lossless decimal numeric type for token amounts and scores.
///
/// Backed by rust_decimal to avoid floating-point drift. Travels as a JSON
/// string in both directions; JSON numbers are rejected since they would
/// pass through an f64.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::str")] RustDecimal);

impl Decimal {
    /// Build `num / 10^scale` exactly, e.g. `from_parts(5, 1) == 0.5`.
    pub fn from_parts(num: i64, scale: u32) -> Self {
        Decimal(RustDecimal::new(num, scale))
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

    /// The additive identity (0).
    pub fn zero() -> Self {
        Decimal(RustDecimal::ZERO)
    }

    /// Returns true if the value is exactly zero.
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

    /// Returns the value 100.
    pub fn hundred() -> Self {
        Decimal(RustDecimal::ONE_HUNDRED)
    }

    /// Round toward zero, keeping at most `decimals` fractional digits.
    pub fn floor_to_decimals(&self, decimals: u32) -> Self {
        Decimal(
            self.0
                .round_dp_with_strategy(decimals, RoundingStrategy::ToZero),
        )
    }

    /// Integer part (toward zero).
    pub fn trunc(&self) -> Self {
        Decimal(self.0.trunc())
    }

    /// Checked multiplication; None on overflow.
    pub fn checked_mul(&self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_mul(rhs.0).map(Decimal)
    }

    /// Checked division; None on overflow or division by zero.
    pub fn checked_div(&self, rhs: Decimal) -> Option<Decimal> {
        self.0.checked_div(rhs.0).map(Decimal)
    }

    /// Clamp into `[lo, hi]`.
    pub fn clamp_to(&self, lo: Decimal, hi: Decimal) -> Self {
        if *self < lo {
            lo
        } else if *self > hi {
            hi
        } else {
            *self
        }
    }

    /// Convert to an integer count of base units (`value * 10^decimals`).
    ///
    /// Returns None when the value is negative, does not fit, or carries
    /// more fractional digits than `decimals` (the conversion would round).
    pub fn to_base_units(&self, decimals: u32) -> Option<u128> {
        if decimals > MAX_TOKEN_DECIMALS || self.is_negative() {
            return None;
        }
        let scaled = self.0.checked_mul(pow10(decimals)?)?;
        if scaled.fract() != RustDecimal::ZERO {
            return None;
        }
        scaled.to_u128()
    }

    /// Convert a base-unit integer back to a human-readable amount.
    pub fn from_base_units(units: u128, decimals: u32) -> Option<Self> {
        if decimals > MAX_TOKEN_DECIMALS {
            return None;
        }
        let value = RustDecimal::from_i128_with_scale(i128::try_from(units).ok()?, 0);
        value.checked_div(pow10(decimals)?).map(Decimal)
    }

    /// Lossy conversion for callers that need an i64 (e.g. cycle counts).
    pub fn to_i64(&self) -> Option<i64> {
        self.0.to_i64()
    }
}

fn pow10(decimals: u32) -> Option<RustDecimal> {
    let mut factor = RustDecimal::ONE;
    for _ in 0..decimals {
        factor = factor.checked_mul(RustDecimal::TEN)?;
    }
    Some(factor)
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl FromStr for Decimal {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_canonical(s)
    }
}

impl From<i64> for Decimal {
    fn from(value: i64) -> Self {
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

impl std::ops::Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 * rhs.0)
    }
}

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
