//! Checkout
//!
//! Builds the line item list handed to the payment gateway. The gateway cannot take
//! negative line items, so the stacked discount is spread across every unit price
//! proportionally instead of being credited on its own line.

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::cart::{CartLine, subtotal_minor};

/// Smallest unit amount the gateway will charge, in minor units.
pub const DEFAULT_MINIMUM_UNIT_AMOUNT: i64 = 50;

/// Errors building or completing a checkout.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// No lines were provided
    #[error("cannot check out an empty cart")]
    EmptyCart,

    /// A scaled price could not be represented
    #[error("scaled price for {0} overflowed")]
    PriceOverflow(String),

    /// The gateway rejected the session
    #[error("payment gateway error: {0}")]
    Gateway(String),
}

/// Options for building a checkout payload.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutOptions {
    /// Currency of the session
    pub currency: &'static Currency,

    /// Minimum chargeable unit amount in minor units
    pub minimum_unit_amount: i64,
}

impl CheckoutOptions {
    /// Options with the default minimum unit amount.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            currency,
            minimum_unit_amount: DEFAULT_MINIMUM_UNIT_AMOUNT,
        }
    }
}

/// A single gateway line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutLineItem {
    /// Stock keeping unit
    pub sku: String,

    /// Product name shown on the payment page
    pub name: String,

    /// Discounted unit amount in minor units
    pub unit_amount_minor: i64,

    /// Quantity
    pub quantity: u32,
}

/// The session request sent to the payment gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutPayload {
    /// ISO currency code
    pub currency: String,

    /// Line items with the discount spread across their unit amounts
    pub line_items: Vec<CheckoutLineItem>,

    /// Subtotal before discounts
    pub subtotal_minor: i64,

    /// Stacked discount requested
    pub discount_minor: i64,

    /// What the gateway will actually charge
    pub charged_total_minor: i64,
}

impl CheckoutPayload {
    /// Charged total as money.
    pub fn charged_total(&self, currency: &'static Currency) -> Money<'static, Currency> {
        Money::from_minor(self.charged_total_minor, currency)
    }
}

/// Build the gateway payload for the given lines and total discount.
///
/// Every unit amount is multiplied by `max(0, (subtotal - discount) / subtotal)`,
/// rounded to the nearest minor unit and raised to the gateway minimum.
///
/// # Errors
///
/// Returns [`CheckoutError::EmptyCart`] when there are no lines and
/// [`CheckoutError::PriceOverflow`] if a scaled price cannot be represented.
pub fn build_checkout_payload(
    lines: &[CartLine],
    total_discount_minor: i64,
    options: &CheckoutOptions,
) -> Result<CheckoutPayload, CheckoutError> {
    if lines.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let subtotal = subtotal_minor(lines);
    let discount = total_discount_minor.max(0);
    let factor = scale_factor(subtotal, discount);

    let line_items = lines
        .iter()
        .map(|line| {
            let scaled = Decimal::from_i64(line.unit_price_minor())
                .and_then(|price| price.checked_mul(factor))
                .and_then(|price| {
                    price
                        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                        .to_i64()
                })
                .ok_or_else(|| CheckoutError::PriceOverflow(line.sku().to_string()))?;

            Ok(CheckoutLineItem {
                sku: line.sku().to_string(),
                name: display_name(line),
                unit_amount_minor: scaled.max(options.minimum_unit_amount),
                quantity: line.quantity(),
            })
        })
        .collect::<Result<Vec<_>, CheckoutError>>()?;

    let charged_total_minor = line_items.iter().fold(0_i64, |acc, item| {
        acc.saturating_add(item.unit_amount_minor.saturating_mul(i64::from(item.quantity)))
    });

    debug!(
        subtotal_minor = subtotal,
        discount_minor = discount,
        charged_total_minor,
        "checkout payload built"
    );

    Ok(CheckoutPayload {
        currency: options.currency.iso_alpha_code.to_string(),
        line_items,
        subtotal_minor: subtotal,
        discount_minor: discount,
        charged_total_minor,
    })
}

/// Ratio of the discounted subtotal to the subtotal, never below zero.
fn scale_factor(subtotal: i64, discount: i64) -> Decimal {
    if subtotal <= 0 {
        return Decimal::ONE;
    }

    let remaining = Decimal::from(subtotal.saturating_sub(discount).max(0));

    remaining
        .checked_div(Decimal::from(subtotal))
        .unwrap_or(Decimal::ONE)
}

fn display_name(line: &CartLine) -> String {
    if line.title().is_empty() {
        line.sku().to_string()
    } else {
        line.title().to_string()
    }
}

/// Reply from the gateway's session endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CheckoutSessionResponse {
    /// Session created; redirect the shopper here
    Redirect {
        /// Hosted payment page URL
        url: String,
    },

    /// Session rejected
    Error {
        /// Error message from the gateway
        error: String,
    },
}

impl CheckoutSessionResponse {
    /// Turn the reply into the redirect URL.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Gateway`] for the error shape.
    pub fn into_result(self) -> Result<String, CheckoutError> {
        match self {
            CheckoutSessionResponse::Redirect { url } => Ok(url),
            CheckoutSessionResponse::Error { error } => Err(CheckoutError::Gateway(error)),
        }
    }
}
