//! Receipt
//!
//! Renders a cart summary: the normalized lines, the eligible bundles with the
//! headline one marked, and the totals the shopper will be charged at checkout.

use std::io;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{Alignment, Style, Theme, object::Columns},
};
use thiserror::Error;

use crate::{
    cart::{Cart, CartLine},
    selection::{AppliedPromotions, BundleEvaluation},
};

/// Errors that can occur when writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// IO error
    #[error("failed to write receipt: {0}")]
    Io(#[from] io::Error),
}

/// Cart summary for a single evaluation.
#[derive(Debug, Clone)]
pub struct Receipt {
    lines: Vec<CartLine>,
    evaluation: BundleEvaluation,
    applied: AppliedPromotions,
    currency: &'static Currency,
}

impl Receipt {
    /// Create a receipt from both aggregation modes' results.
    pub fn new(cart: &Cart, evaluation: BundleEvaluation, applied: AppliedPromotions) -> Self {
        Self {
            lines: cart.lines().to_vec(),
            evaluation,
            applied,
            currency: cart.currency(),
        }
    }

    /// Total cost before any discounts
    pub fn subtotal(&self) -> Money<'static, Currency> {
        self.money(self.evaluation.subtotal_minor)
    }

    /// Savings of the headline bundle
    pub fn headline_savings(&self) -> Money<'static, Currency> {
        self.money(self.evaluation.savings_minor)
    }

    /// Every discount stacked, as charged at checkout
    pub fn stacked_discount(&self) -> Money<'static, Currency> {
        self.money(self.applied.total_discount_minor)
    }

    /// Total after the stacked discount, never below zero
    pub fn total(&self) -> Money<'static, Currency> {
        self.money(
            self.evaluation
                .subtotal_minor
                .saturating_sub(self.applied.total_discount_minor)
                .max(0),
        )
    }

    /// Stacked discount as a fraction of the subtotal.
    pub fn savings_percent(&self) -> Percentage {
        let subtotal = self.evaluation.subtotal_minor;

        if subtotal <= 0 {
            return Percentage::from(Decimal::ZERO);
        }

        let ratio = Decimal::from(self.applied.total_discount_minor)
            .checked_div(Decimal::from(subtotal))
            .unwrap_or(Decimal::ZERO);

        Percentage::from(ratio)
    }

    /// Currency used for all monetary values.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Write the receipt.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if writing fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        writeln!(out, "\n{}", self.lines_table())?;

        if !self.evaluation.eligible_bundles.is_empty() {
            writeln!(out, "\n{}", self.bundles_table())?;
        }

        self.write_summary(&mut out)
    }

    fn money(&self, minor: i64) -> Money<'static, Currency> {
        Money::from_minor(minor, self.currency)
    }

    fn lines_table(&self) -> String {
        let mut builder = Builder::default();

        builder.push_record(["", "Item", "SKU", "Department", "Sign", "Qty", "Unit", "Total"]);

        for (idx, line) in self.lines.iter().enumerate() {
            builder.push_record([
                format!("#{:<3}", idx + 1),
                line.title().to_string(),
                line.sku().to_string(),
                line.department().to_string(),
                line.sign().map(|sign| sign.name().to_string()).unwrap_or_default(),
                line.quantity().to_string(),
                format!("{}", self.money(line.unit_price_minor())),
                format!("{}", self.money(line.subtotal_minor())),
            ]);
        }

        let mut table = builder.build();

        table.with(header_theme());
        table.modify(Columns::new(5..8), Alignment::right());

        table.to_string()
    }

    fn bundles_table(&self) -> String {
        let selected = self
            .evaluation
            .selected_bundle
            .as_ref()
            .map(|discount| &discount.code);

        let mut builder = Builder::default();

        builder.push_record(["", "Bundle", "Code", "Savings"]);

        for discount in &self.evaluation.eligible_bundles {
            let marker = if Some(&discount.code) == selected { "*" } else { "" };

            builder.push_record([
                marker.to_string(),
                discount.label.clone(),
                discount.code.to_string(),
                format!("-{}", self.money(discount.amount_minor)),
            ]);
        }

        let mut table = builder.build();

        table.with(header_theme());
        table.modify(Columns::last(), Alignment::right());

        table.to_string()
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        // `Percentage` is a fraction, multiply by 100 for percent points.
        let percent_points =
            ((self.savings_percent() * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2);

        let rows = [
            ("Subtotal:", format!("{}", self.subtotal())),
            ("Best bundle:", format!("-{}", self.headline_savings())),
            (
                "Checkout discount:",
                format!("({percent_points}%) -{}", self.stacked_discount()),
            ),
            ("Total:", format!("{}", self.total())),
        ];

        let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        let value_width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

        writeln!(out)?;

        for (label, value) in rows {
            writeln!(out, " {label:>label_width$}  {value:>value_width$}")?;
        }

        Ok(())
    }
}

/// Rounded table theme with a single line under the header row.
fn header_theme() -> Theme {
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    theme
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use crate::{
        promotions::PromotionSet,
        selection::{apply_promotions, evaluate_bundle_discount},
    };

    use super::*;

    /// Count header separator lines in rendered output.
    fn header_row_count(table: &str) -> usize {
        table.lines().filter(|line| line.starts_with('├')).count()
    }

    fn receipt() -> Receipt {
        let cart = Cart::with_lines(
            vec![
                CartLine::new("TEE-ARI-M", "Aries Tee", 4000, 1),
                CartLine::new("TEE-TAU-M", "Taurus Tee", 3000, 1),
                CartLine::new("MUG-LEO", "Leo Mug", 1000, 1),
            ],
            USD,
        );
        let promotions = PromotionSet::default();

        Receipt::new(
            &cart,
            evaluate_bundle_discount(&cart, &promotions, None),
            apply_promotions(&cart, &promotions),
        )
    }

    #[test]
    fn totals_use_stacked_discount() {
        let receipt = receipt();

        assert_eq!(receipt.subtotal(), Money::from_minor(8000, USD));
        assert_eq!(receipt.headline_savings(), Money::from_minor(700, USD));
        assert_eq!(receipt.stacked_discount(), Money::from_minor(850, USD));
        assert_eq!(receipt.total(), Money::from_minor(7150, USD));
    }

    #[test]
    fn savings_percent_of_empty_cart_is_zero() {
        let cart = Cart::new(USD);
        let promotions = PromotionSet::default();
        let receipt = Receipt::new(
            &cart,
            evaluate_bundle_discount(&cart, &promotions, None),
            apply_promotions(&cart, &promotions),
        );

        assert_eq!(receipt.savings_percent() * Decimal::ONE, Decimal::ZERO);
        assert_eq!(receipt.total(), Money::from_minor(0, USD));
    }

    #[test]
    fn write_to_renders_lines_bundles_and_totals() -> TestResult {
        let mut out = Vec::new();

        receipt().write_to(&mut out)?;

        let text = String::from_utf8(out)?;

        assert!(text.contains("Aries Tee"), "missing line title:\n{text}");
        assert!(text.contains("DUO10"), "missing duo bundle:\n{text}");
        assert!(text.contains("TRINITY15"), "missing trinity bundle:\n{text}");
        assert!(text.contains("$71.50"), "missing total:\n{text}");
        assert!(text.contains("-$8.50"), "missing stacked discount:\n{text}");
        assert_eq!(header_row_count(&text), 2, "one header separator per table");

        Ok(())
    }
}
