//! Cart
//!
//! Raw cart entries arrive in whatever shape the storefront kept in local storage.
//! [`normalize`] turns each of them into a [`CartLine`] with safe prices and
//! quantities, a department, an optional zodiac sign and a poster flag.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub mod classification;
pub mod zodiac;

pub use classification::{Classification, Department, classify};
pub use zodiac::ZodiacSign;

/// A cart entry as stored by the storefront, before normalization.
///
/// Every field is optional and loosely typed; prices and quantities may be numbers
/// or numeric strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCartItem {
    /// Stock keeping unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<Value>,

    /// Product or variant id, used when `sku` is missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,

    /// Variant SKU, used when `sku` and `id` are missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_sku: Option<Value>,

    /// Display title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,

    /// Display name, used when `title` is missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,

    /// Unit price in major units (e.g. `25.00` or `"$25.00"`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Value>,

    /// Unit price in minor units, preferred over `price` when valid
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<Value>,

    /// Quantity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Value>,

    /// Short-hand quantity, used when `quantity` is missing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qty: Option<Value>,
}

impl RawCartItem {
    /// Create a raw item from well-typed parts.
    pub fn new(sku: &str, title: &str, price_minor: i64, quantity: u32) -> Self {
        Self {
            sku: Some(Value::from(sku)),
            title: Some(Value::from(title)),
            price_cents: Some(Value::from(price_minor)),
            quantity: Some(Value::from(quantity)),
            ..Self::default()
        }
    }

    /// The SKU as text: `sku`, then `id`, then `variant_sku`; empty if none is usable.
    pub fn sku_text(&self) -> String {
        first_text(&[
            self.sku.as_ref(),
            self.id.as_ref(),
            self.variant_sku.as_ref(),
        ])
    }
}

/// A normalized cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    sku: String,
    title: String,
    unit_price_minor: i64,
    quantity: u32,
    department: Department,
    sign: Option<ZodiacSign>,
    is_poster: bool,
}

impl CartLine {
    /// Create a line, classifying it from its SKU and title.
    ///
    /// Negative prices become zero and a zero quantity becomes one.
    pub fn new(
        sku: impl Into<String>,
        title: impl Into<String>,
        unit_price_minor: i64,
        quantity: u32,
    ) -> Self {
        let sku = sku.into();
        let title = title.into();
        let Classification {
            department,
            is_poster,
        } = classify(&sku, &title);
        let sign = ZodiacSign::from_sku(&sku);

        Self {
            sku,
            title,
            unit_price_minor: unit_price_minor.max(0),
            quantity: quantity.max(1),
            department,
            sign,
            is_poster,
        }
    }

    /// Stock keeping unit
    pub fn sku(&self) -> &str {
        &self.sku
    }

    /// Display title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Unit price in minor units, never negative
    pub fn unit_price_minor(&self) -> i64 {
        self.unit_price_minor
    }

    /// Quantity, at least one
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Department
    pub fn department(&self) -> Department {
        self.department
    }

    /// Zodiac sign encoded in the SKU, if any
    pub fn sign(&self) -> Option<ZodiacSign> {
        self.sign
    }

    /// Whether this line is a poster
    pub fn is_poster(&self) -> bool {
        self.is_poster
    }

    /// Quantity multiplied by unit price.
    pub fn subtotal_minor(&self) -> i64 {
        self.unit_price_minor
            .saturating_mul(i64::from(self.quantity))
    }
}

/// Normalize a raw cart entry into a [`CartLine`].
///
/// Never fails: unreadable prices become zero and unreadable quantities become one.
pub fn normalize(raw: &RawCartItem) -> CartLine {
    let sku = raw.sku_text();
    let title = first_text(&[raw.title.as_ref(), raw.name.as_ref()]);

    let price_minor = raw
        .price_cents
        .as_ref()
        .and_then(coerce_minor)
        .or_else(|| raw.price.as_ref().and_then(coerce_major_to_minor))
        .unwrap_or_else(|| {
            debug!(sku = %sku, "cart line has no usable price, defaulting to zero");
            0
        });

    let quantity = raw
        .quantity
        .as_ref()
        .and_then(coerce_quantity)
        .or_else(|| raw.qty.as_ref().and_then(coerce_quantity))
        .unwrap_or_else(|| {
            debug!(sku = %sku, "cart line has no usable quantity, defaulting to one");
            1
        });

    CartLine::new(sku, title, price_minor, quantity)
}

impl From<&RawCartItem> for CartLine {
    fn from(raw: &RawCartItem) -> Self {
        normalize(raw)
    }
}

/// Return the first value that renders as non-empty text.
fn first_text(values: &[Option<&Value>]) -> String {
    values
        .iter()
        .flatten()
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .unwrap_or_default()
}

/// Read a number or numeric string as a decimal.
fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_err| Decimal::from_scientific(&n.to_string()))
            .ok(),
        Value::String(s) => {
            let trimmed = s
                .trim()
                .trim_start_matches(['$', '£', '€'])
                .replace(',', "");

            Decimal::from_str(trimmed.trim()).ok()
        }
        _ => None,
    }
}

/// Coerce a minor unit value; negative values are rejected.
fn coerce_minor(value: &Value) -> Option<i64> {
    as_decimal(value)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .filter(|minor| *minor >= 0)
}

/// Coerce a major unit price into minor units; negative values are rejected.
pub(crate) fn coerce_major_to_minor(value: &Value) -> Option<i64> {
    as_decimal(value)?
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .filter(|minor| *minor >= 0)
}

/// Coerce a quantity, truncating fractions; values below one are rejected.
fn coerce_quantity(value: &Value) -> Option<u32> {
    as_decimal(value)?
        .trunc()
        .to_u32()
        .filter(|quantity| *quantity >= 1)
}

/// A set of normalized lines priced in a single currency.
#[derive(Debug, Clone)]
pub struct Cart {
    lines: Vec<CartLine>,
    currency: &'static Currency,
}

impl Cart {
    /// Create an empty cart.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            lines: Vec::new(),
            currency,
        }
    }

    /// Create a cart from already normalized lines.
    pub fn with_lines(lines: impl Into<Vec<CartLine>>, currency: &'static Currency) -> Self {
        Self {
            lines: lines.into(),
            currency,
        }
    }

    /// Normalize raw entries into a cart.
    pub fn from_raw<'r>(
        items: impl IntoIterator<Item = &'r RawCartItem>,
        currency: &'static Currency,
    ) -> Self {
        Self {
            lines: items.into_iter().map(normalize).collect(),
            currency,
        }
    }

    /// Add a line.
    pub fn push(&mut self, line: CartLine) {
        self.lines.push(line);
    }

    /// The normalized lines, in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Iterate over the lines.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity())).sum()
    }

    /// Subtotal in minor units.
    pub fn subtotal_minor(&self) -> i64 {
        subtotal_minor(&self.lines)
    }

    /// Subtotal as money in the cart currency.
    pub fn subtotal(&self) -> Money<'static, Currency> {
        Money::from_minor(self.subtotal_minor(), self.currency)
    }

    /// Currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

/// Sum of line subtotals in minor units.
pub fn subtotal_minor(lines: &[CartLine]) -> i64 {
    lines
        .iter()
        .fold(0_i64, |acc, line| acc.saturating_add(line.subtotal_minor()))
}
