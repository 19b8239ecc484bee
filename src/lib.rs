//! Astral
//!
//! Astral is the bundle promotion engine behind a zodiac apparel storefront. It
//! normalizes raw cart entries, evaluates the Duo, Family Constellation, Poster
//! Add-on and Trinity bundles, selects the discount shown to the shopper, and builds
//! the line items sent to the payment gateway.

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod discounts;
pub mod preferences;
pub mod prelude;
pub mod promotions;
pub mod receipt;
pub mod selection;
