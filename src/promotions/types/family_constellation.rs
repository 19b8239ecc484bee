//! Family Constellation Promotion
//!
//! When an adult and a youth line share a zodiac sign, the youth lines of that sign
//! are discounted. Each qualifying sign produces its own discount.

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use smallvec::SmallVec;

use crate::{
    cart::{CartLine, Department, ZodiacSign, subtotal_minor},
    discounts::{Discount, DiscountCode, DiscountError, percent_of_minor},
};

/// Family constellation promotion configuration.
#[derive(Debug, Clone)]
pub struct FamilyConstellationPromotion {
    code_prefix: String,
    label: String,
    percent: Percentage,
}

impl FamilyConstellationPromotion {
    /// Create a new family constellation promotion.
    ///
    /// Discount codes are formed as `<code_prefix>-<SIGN>`.
    pub fn new(
        code_prefix: impl Into<String>,
        label: impl Into<String>,
        percent: Percentage,
    ) -> Self {
        Self {
            code_prefix: code_prefix.into(),
            label: label.into(),
            percent,
        }
    }

    /// Code prefix
    pub fn code_prefix(&self) -> &str {
        &self.code_prefix
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
    /// Discounts are returned in zodiac calendar order.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the percentage cannot be applied to a basis.
    pub fn evaluate(
        &self,
        lines: &[CartLine],
    ) -> Result<SmallVec<[Discount; 2]>, DiscountError> {
        let mut discounts = SmallVec::new();

        for sign in ZodiacSign::ALL {
            let has_adult = lines
                .iter()
                .any(|line| line.sign() == Some(sign) && line.department() == Department::Adult);

            let youth: Vec<CartLine> = lines
                .iter()
                .filter(|line| line.sign() == Some(sign) && line.department() == Department::Youth)
                .cloned()
                .collect();

            if !has_adult || youth.is_empty() {
                continue;
            }

            let amount = percent_of_minor(&self.percent, subtotal_minor(&youth))?;

            discounts.push(
                Discount::new(
                    DiscountCode::for_sign(&self.code_prefix, sign),
                    format!("{} ({})", self.label, sign.name()),
                    amount,
                )
                .with_sign(sign),
            );
        }

        Ok(discounts)
    }
}

impl Default for FamilyConstellationPromotion {
    fn default() -> Self {
        Self::new(
            "FAMILY15",
            "Family Constellation: 15% off matching youth tees",
            Percentage::from(Decimal::new(15, 2)),
        )
    }
}
