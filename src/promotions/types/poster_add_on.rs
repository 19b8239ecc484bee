//! Poster Add-on Promotion
//!
//! Posters bought alongside anything else are discounted together.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;

use crate::{
    cart::CartLine,
    discounts::{Discount, DiscountCode, DiscountError, percent_of_minor},
};

/// Poster add-on promotion configuration.
#[derive(Debug, Clone)]
pub struct PosterAddOnPromotion {
    code: DiscountCode,
    label: String,
    percent: Percentage,
}

impl PosterAddOnPromotion {
    /// Create a new poster add-on promotion.
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
        let has_other = lines.iter().any(|line| !line.is_poster());
        let mut posters = lines.iter().filter(|line| line.is_poster()).peekable();

        if !has_other || posters.peek().is_none() {
            return Ok(None);
        }

        let basis = posters.fold(0_i64, |acc, line| acc.saturating_add(line.subtotal_minor()));
        let amount = percent_of_minor(&self.percent, basis)?;

        Ok(Some(Discount::new(self.code.clone(), self.label.clone(), amount)))
    }
}

impl Default for PosterAddOnPromotion {
    fn default() -> Self {
        Self::new(
            DiscountCode::new("POSTER20"),
            "Poster Add-on: 20% off posters with apparel",
            Percentage::from(Decimal::new(20, 2)),
        )
    }
}
