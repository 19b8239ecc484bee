//! Duo Promotion
//!
//! Percentage off the two highest priced adult apparel units in the cart.

use std::cmp::Reverse;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;

use crate::{
    cart::{CartLine, Department},
    discounts::{Discount, DiscountCode, DiscountError, percent_of_minor},
};

/// Number of units the duo discount is taken from.
const DUO_UNITS: usize = 2;

/// Duo promotion configuration.
#[derive(Debug, Clone)]
pub struct DuoPromotion {
    code: DiscountCode,
    label: String,
    percent: Percentage,
}

impl DuoPromotion {
    /// Create a new duo promotion.
    pub fn new(code: DiscountCode, label: impl Into<String>, percent: Percentage) -> Self {
        Self {
            code,
            label: label.into(),
            percent,
        }
    }

    /// Discount code
    pub fn code(&self) -> &DiscountCode {
        &self.code
    }

    /// Label shown to the shopper
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Discount rate
    pub fn percent(&self) -> Percentage {
        self.percent
    }

    /// Evaluate the promotion against normalized lines.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the percentage cannot be applied to the basis.
    pub fn evaluate(&self, lines: &[CartLine]) -> Result<Option<Discount>, DiscountError> {
        let pool = lines
            .iter()
            .filter(|line| line.department() == Department::Adult && !line.is_poster());

        let qualifying: u64 = pool.clone().map(|line| u64::from(line.quantity())).sum();

        if qualifying < 2 {
            return Ok(None);
        }

        // No line can contribute more than two units, so expand at most two per line.
        let mut units: Vec<i64> = pool
            .flat_map(|line| {
                let take = if line.quantity() > 1 { DUO_UNITS } else { 1 };
                std::iter::repeat_n(line.unit_price_minor(), take)
            })
            .collect();

        // Stable sort keeps encounter order for equal prices.
        units.sort_by_key(|price| Reverse(*price));

        let basis = units
            .iter()
            .take(DUO_UNITS)
            .fold(0_i64, |acc, price| acc.saturating_add(*price));

        let amount = percent_of_minor(&self.percent, basis)?;

        Ok(Some(Discount::new(self.code.clone(), self.label.clone(), amount)))
    }
}

impl Default for DuoPromotion {
    fn default() -> Self {
        Self::new(
            DiscountCode::new("DUO10"),
            "Duo: 10% off two adult tees",
            Percentage::from(Decimal::new(10, 2)),
        )
    }
}
