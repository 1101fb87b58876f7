//! Fixed-Point Arithmetic for Financial Amounts
//!
//! All mana, token, and LP-share quantities in the engine are integers
//! scaled by [`SCALE`] (1 display unit = 1_000_000 raw units). Reserve
//! invariants can only be verified under deterministic integer math, so
//! floating point is banned from every amount calculation.
//!
//! ## Rounding Policy
//!
//! Every division names its rounding mode at the call site:
//!
//! - `*_ceil` for amounts charged to a trader (fees, post-trade reserve
//!   floors) — rounds in the pool's favor.
//! - `*_floor` for amounts paid out to a trader (swap output, withdrawal
//!   proceeds) — again rounds in the pool's favor.
//!
//! The trader absorbs sub-unit dust; the pool's constant product never
//! decreases through rounding alone.
//!
//! ## Overflow Behavior
//!
//! All operations are checked and fail with
//! [`FixedPointError::ArithmeticOverflow`] rather than wrapping. Raw
//! values are `u128`, so products of two realistic (sub-2^64) reserves
//! always fit an intermediate `u128`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Raw units per display unit (6 decimal places).
pub const SCALE: u128 = 1_000_000;

/// Basis-point denominator for fee math (30 bps = 0.3%).
pub const BPS_DENOMINATOR: u128 = 10_000;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FixedPointError {
    #[error("Arithmetic overflow in {op}")]
    ArithmeticOverflow { op: &'static str },

    #[error("Division by zero in {op}")]
    DivisionByZero { op: &'static str },
}

pub type Result<T> = std::result::Result<T, FixedPointError>;

/// Non-negative fixed-point amount in smallest units.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct FixedPoint {
    raw: u128,
}

impl FixedPoint {
    pub const ZERO: FixedPoint = FixedPoint { raw: 0 };

    /// Wrap a raw amount already expressed in smallest units.
    pub const fn from_raw(raw: u128) -> Self {
        Self { raw }
    }

    /// Convert whole display units (e.g. whole mana) into an amount.
    pub const fn from_units(units: u64) -> Self {
        Self {
            raw: units as u128 * SCALE,
        }
    }

    pub const fn raw(&self) -> u128 {
        self.raw
    }

    pub const fn is_zero(&self) -> bool {
        self.raw == 0
    }

    pub fn checked_add(self, other: FixedPoint) -> Result<FixedPoint> {
        self.raw
            .checked_add(other.raw)
            .map(FixedPoint::from_raw)
            .ok_or(FixedPointError::ArithmeticOverflow { op: "add" })
    }

    /// Checked subtraction; going below zero is an overflow, not a wrap.
    pub fn checked_sub(self, other: FixedPoint) -> Result<FixedPoint> {
        self.raw
            .checked_sub(other.raw)
            .map(FixedPoint::from_raw)
            .ok_or(FixedPointError::ArithmeticOverflow { op: "sub" })
    }

    /// Full-width product of two amounts, for constant-product invariants.
    pub fn checked_product(self, other: FixedPoint) -> Result<u128> {
        self.raw
            .checked_mul(other.raw)
            .ok_or(FixedPointError::ArithmeticOverflow { op: "product" })
    }

    /// `self * numerator / denominator`, rounded down.
    pub fn mul_div_floor(self, numerator: FixedPoint, denominator: FixedPoint) -> Result<FixedPoint> {
        if denominator.raw == 0 {
            return Err(FixedPointError::DivisionByZero { op: "mul_div_floor" });
        }
        let product = self
            .raw
            .checked_mul(numerator.raw)
            .ok_or(FixedPointError::ArithmeticOverflow { op: "mul_div_floor" })?;
        Ok(FixedPoint::from_raw(product / denominator.raw))
    }

    /// `self * numerator / denominator`, rounded up.
    pub fn mul_div_ceil(self, numerator: FixedPoint, denominator: FixedPoint) -> Result<FixedPoint> {
        if denominator.raw == 0 {
            return Err(FixedPointError::DivisionByZero { op: "mul_div_ceil" });
        }
        let product = self
            .raw
            .checked_mul(numerator.raw)
            .ok_or(FixedPointError::ArithmeticOverflow { op: "mul_div_ceil" })?;
        Ok(FixedPoint::from_raw(ceil_div(product, denominator.raw)?))
    }

    /// Apply a basis-point rate, rounding up (used for fees charged in).
    pub fn mul_bps_ceil(self, bps: u32) -> Result<FixedPoint> {
        let product = self
            .raw
            .checked_mul(bps as u128)
            .ok_or(FixedPointError::ArithmeticOverflow { op: "mul_bps_ceil" })?;
        Ok(FixedPoint::from_raw(ceil_div(product, BPS_DENOMINATOR)?))
    }

    /// Apply a basis-point rate, rounding down.
    pub fn mul_bps_floor(self, bps: u32) -> Result<FixedPoint> {
        let product = self
            .raw
            .checked_mul(bps as u128)
            .ok_or(FixedPointError::ArithmeticOverflow { op: "mul_bps_floor" })?;
        Ok(FixedPoint::from_raw(product / BPS_DENOMINATOR))
    }

    /// Conversion for reporting-only ratios (price impact, spot price).
    /// Saturates past Decimal's 96-bit mantissa; never feed the result
    /// back into reserve math.
    pub fn to_decimal(&self) -> Decimal {
        if self.raw > i128::MAX as u128 {
            return Decimal::MAX;
        }
        Decimal::try_from_i128_with_scale(self.raw as i128, 6).unwrap_or(Decimal::MAX)
    }
}

/// Ceiling division on raw `u128` values.
pub fn ceil_div(numerator: u128, denominator: u128) -> Result<u128> {
    if denominator == 0 {
        return Err(FixedPointError::DivisionByZero { op: "ceil_div" });
    }
    let quotient = numerator / denominator;
    if numerator % denominator == 0 {
        Ok(quotient)
    } else {
        quotient
            .checked_add(1)
            .ok_or(FixedPointError::ArithmeticOverflow { op: "ceil_div" })
    }
}

impl fmt::Display for FixedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.raw / SCALE;
        let fractional = self.raw % SCALE;
        write!(f, "{}.{:06}", whole, fractional)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_scaling_and_display() {
        let amount = FixedPoint::from_units(1500);
        assert_eq!(amount.raw(), 1_500_000_000);
        assert_eq!(amount.to_string(), "1500.000000");

        let dust = FixedPoint::from_raw(42);
        assert_eq!(dust.to_string(), "0.000042");
    }

    #[test]
    fn test_checked_add_sub() {
        let a = FixedPoint::from_units(10);
        let b = FixedPoint::from_units(3);
        assert_eq!(a.checked_add(b).unwrap(), FixedPoint::from_units(13));
        assert_eq!(a.checked_sub(b).unwrap(), FixedPoint::from_units(7));

        // Subtraction below zero must fail, not wrap
        assert!(matches!(
            b.checked_sub(a),
            Err(FixedPointError::ArithmeticOverflow { op: "sub" })
        ));

        assert!(FixedPoint::from_raw(u128::MAX)
            .checked_add(FixedPoint::from_raw(1))
            .is_err());
    }

    #[test]
    fn test_mul_div_rounding_modes() {
        // 10 * 1 / 3: floor = 3, ceil = 4 (raw units)
        let ten = FixedPoint::from_raw(10);
        let one = FixedPoint::from_raw(1);
        let three = FixedPoint::from_raw(3);

        assert_eq!(ten.mul_div_floor(one, three).unwrap().raw(), 3);
        assert_eq!(ten.mul_div_ceil(one, three).unwrap().raw(), 4);

        // Exact division agrees in both modes
        let nine = FixedPoint::from_raw(9);
        assert_eq!(nine.mul_div_floor(one, three).unwrap().raw(), 3);
        assert_eq!(nine.mul_div_ceil(one, three).unwrap().raw(), 3);
    }

    #[test]
    fn test_bps_fee_rounding() {
        // 1000 raw units at 30 bps: exact fee is 3
        let amount = FixedPoint::from_raw(1000);
        assert_eq!(amount.mul_bps_ceil(30).unwrap().raw(), 3);

        // 1001 raw units at 30 bps: 3.003 exact, ceil charges 4, floor pays 3
        let amount = FixedPoint::from_raw(1001);
        assert_eq!(amount.mul_bps_ceil(30).unwrap().raw(), 4);
        assert_eq!(amount.mul_bps_floor(30).unwrap().raw(), 3);
    }

    #[test]
    fn test_division_by_zero() {
        let a = FixedPoint::from_units(1);
        assert!(matches!(
            a.mul_div_floor(a, FixedPoint::ZERO),
            Err(FixedPointError::DivisionByZero { .. })
        ));
        assert!(matches!(
            ceil_div(10, 0),
            Err(FixedPointError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_product_overflow_is_reported() {
        let huge = FixedPoint::from_raw(u128::MAX);
        assert!(matches!(
            huge.checked_product(huge),
            Err(FixedPointError::ArithmeticOverflow { .. })
        ));
        assert!(huge.mul_bps_ceil(30).is_err());
    }

    #[test]
    fn test_to_decimal_reporting() {
        let amount = FixedPoint::from_raw(1_234_567);
        assert_eq!(amount.to_decimal(), dec!(1.234567));
    }
}
