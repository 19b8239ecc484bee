//! Discounts
//!
//! A [`Discount`] is one rule match: a stable code, a label for the shopper and an
//! amount in minor units. Amounts are rounded to whole minor units when they are
//! computed, never carried as fractions.

use std::fmt;

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::ZodiacSign;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,
}

/// Stable identifier of a discount, e.g. `DUO10` or `FAMILY15-ARI`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscountCode(String);

impl DiscountCode {
    /// Create a code from any string.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Create a code parameterised by zodiac sign (`<prefix>-<SIGN>`).
    pub fn for_sign(prefix: &str, sign: ZodiacSign) -> Self {
        Self(format!("{prefix}-{}", sign.code()))
    }

    /// The code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DiscountCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DiscountCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

/// A single discount produced by a promotion rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discount {
    /// Stable code; discounts are merged by this value
    pub code: DiscountCode,

    /// Human readable description
    pub label: String,

    /// Amount in minor units, never negative
    pub amount_minor: i64,

    /// Zodiac sign for sign-specific discounts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign: Option<ZodiacSign>,
}

impl Discount {
    /// Create a discount, clamping negative amounts to zero.
    pub fn new(code: DiscountCode, label: impl Into<String>, amount_minor: i64) -> Self {
        Self {
            code,
            label: label.into(),
            amount_minor: amount_minor.max(0),
            sign: None,
        }
    }

    /// Attach a zodiac sign.
    #[must_use]
    pub fn with_sign(mut self, sign: ZodiacSign) -> Self {
        self.sign = Some(sign);
        self
    }
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// The result is rounded half away from zero, which for the non-negative amounts
/// used here is round-half-up.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the multiplication overflows or
/// the result does not fit in an `i64`.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    // `Percentage` doesn't expose its inner decimal, multiplying by one yields it.
    ((*percent) * Decimal::ONE)
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Merge discounts sharing a code, summing their amounts.
///
/// The first occurrence of each code keeps its position and label.
pub fn merge_by_code(discounts: impl IntoIterator<Item = Discount>) -> Vec<Discount> {
    let mut positions: FxHashMap<DiscountCode, usize> = FxHashMap::default();
    let mut merged: Vec<Discount> = Vec::new();

    for discount in discounts {
        match positions.get(&discount.code).and_then(|idx| merged.get_mut(*idx)) {
            Some(existing) => {
                existing.amount_minor = existing.amount_minor.saturating_add(discount.amount_minor);
            }
            None => {
                positions.insert(discount.code.clone(), merged.len());
                merged.push(discount);
            }
        }
    }

    merged
}

/// Total of all discount amounts in minor units.
pub fn total_minor<'a>(discounts: impl IntoIterator<Item = &'a Discount>) -> i64 {
    discounts
        .into_iter()
        .fold(0_i64, |acc, discount| acc.saturating_add(discount.amount_minor))
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use testresult::TestResult;

    use super::*;

    fn percent(value: i64, scale: u32) -> Percentage {
        Percentage::from(Decimal::new(value, scale))
    }

    #[test]
    fn percent_of_minor_calculates_correctly() -> TestResult {
        assert_eq!(percent_of_minor(&percent(10, 2), 7000)?, 700);
        assert_eq!(percent_of_minor(&percent(15, 2), 5000)?, 750);
        assert_eq!(percent_of_minor(&percent(20, 2), 2000)?, 400);

        Ok(())
    }

    #[test]
    fn percent_of_minor_rounds_to_nearest_cent() -> TestResult {
        // 1667 * 0.15 = 250.05
        assert_eq!(percent_of_minor(&percent(15, 2), 1667)?, 250);
        // 1670 * 0.15 = 250.5
        assert_eq!(percent_of_minor(&percent(15, 2), 1670)?, 251);
        // 1663 * 0.15 = 249.45
        assert_eq!(percent_of_minor(&percent(15, 2), 1663)?, 249);

        Ok(())
    }

    #[test]
    fn percent_of_zero_is_zero() -> TestResult {
        assert_eq!(percent_of_minor(&percent(20, 2), 0)?, 0);

        Ok(())
    }

    #[test]
    fn percent_of_minor_overflow_returns_error() -> TestResult {
        let percent = Percentage::try_from("100000000000000000000")?;
        let result = percent_of_minor(&percent, i64::MAX);

        assert_eq!(result, Err(DiscountError::PercentConversion));

        Ok(())
    }

    #[test]
    fn merge_by_code_sums_amounts_and_keeps_order() {
        let merged = merge_by_code([
            Discount::new("DUO10".into(), "Duo", 700),
            Discount::new("POSTER20".into(), "Poster", 400),
            Discount::new("DUO10".into(), "Duo again", 300),
        ]);

        assert_eq!(
            merged,
            vec![
                Discount::new("DUO10".into(), "Duo", 1000),
                Discount::new("POSTER20".into(), "Poster", 400),
            ]
        );
    }

    #[test]
    fn merge_by_code_ignores_labels() {
        let merged = merge_by_code([
            Discount::new("A".into(), "Same", 1),
            Discount::new("B".into(), "Same", 2),
        ]);

        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn new_clamps_negative_amounts() {
        assert_eq!(Discount::new("X".into(), "X", -5).amount_minor, 0);
    }

    #[test]
    fn for_sign_appends_sign_code() {
        assert_eq!(
            DiscountCode::for_sign("FAMILY15", ZodiacSign::Aries).as_str(),
            "FAMILY15-ARI"
        );
    }

    #[test]
    fn total_minor_sums_amounts() {
        let discounts = [
            Discount::new("A".into(), "A", 120),
            Discount::new("B".into(), "B", 700),
        ];

        assert_eq!(total_minor(&discounts), 820);
    }
}
