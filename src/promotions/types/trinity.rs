//! Trinity Promotion
//!
//! Three or more units of anything earn a percentage off the single cheapest unit.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;

use crate::{
    cart::CartLine,
    discounts::{Discount, DiscountCode, DiscountError, percent_of_minor},
};

/// Minimum number of units in the cart.
const TRINITY_UNITS: u64 = 3;

/// Trinity promotion configuration.
#[derive(Debug, Clone)]
pub struct TrinityPromotion {
    code: DiscountCode,
    label: String,
    percent: Percentage,
}

impl TrinityPromotion {
    /// Create a new trinity promotion.
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
        let units: u64 = lines.iter().map(|line| u64::from(line.quantity())).sum();

        if units < TRINITY_UNITS {
            return Ok(None);
        }

        // `min_by_key` returns the first of equally cheap lines.
        let Some(cheapest) = lines.iter().min_by_key(|line| line.unit_price_minor()) else {
            return Ok(None);
        };

        let amount = percent_of_minor(&self.percent, cheapest.unit_price_minor())?;

        Ok(Some(Discount::new(self.code.clone(), self.label.clone(), amount)))
    }
}

impl Default for TrinityPromotion {
    fn default() -> Self {
        Self::new(
            DiscountCode::new("TRINITY15"),
            "Trinity: 15% off your cheapest item",
            Percentage::from(Decimal::new(15, 2)),
        )
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn amount(lines: &[CartLine]) -> Result<Option<i64>, DiscountError> {
        Ok(TrinityPromotion::default()
            .evaluate(lines)?
            .map(|discount| discount.amount_minor))
    }

    #[test]
    fn three_units_discount_cheapest() -> TestResult {
        let lines = [
            CartLine::new("A", "Item A", 1000, 1),
            CartLine::new("B", "Item B", 1500, 1),
            CartLine::new("C", "Item C", 800, 1),
        ];

        assert_eq!(amount(&lines)?, Some(120));

        Ok(())
    }

    #[test]
    fn only_one_unit_of_cheapest_line_is_discounted() -> TestResult {
        let lines = [CartLine::new("A", "Item A", 1000, 5)];

        assert_eq!(amount(&lines)?, Some(150));

        Ok(())
    }

    #[test]
    fn counts_posters_and_youth() -> TestResult {
        let lines = [
            CartLine::new("POSTER-ARI", "Aries Print", 2000, 1),
            CartLine::new("YTH-ARI-S", "Aries Youth Tee", 2500, 2),
        ];

        assert_eq!(amount(&lines)?, Some(300));

        Ok(())
    }

    #[test]
    fn two_units_do_not_qualify() -> TestResult {
        let lines = [CartLine::new("A", "Item A", 1000, 2)];

        assert_eq!(amount(&lines)?, None);

        Ok(())
    }
}
