//! Discount Selection
//!
//! Two aggregation modes are supported and deliberately kept apart:
//!
//! - [`apply_promotions`] stacks every discount, merged by code. Checkout charges this.
//! - [`evaluate_bundle_discount`] picks a single headline discount for the cart summary,
//!   honouring the shopper's sticky [`BundlePreference`] while it stays eligible.
//!
//! The sticky preference is passed in and handed back rather than held globally; the
//! caller owns persisting it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    cart::{Cart, CartLine, ZodiacSign},
    discounts::{Discount, DiscountCode, merge_by_code, total_minor},
    promotions::PromotionSet,
};

/// A bundle the shopper chose, or the last headline bundle shown to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundlePreference {
    /// Code of the preferred discount
    pub code: DiscountCode,

    /// Label at the time the preference was stored
    pub label: String,

    /// Amount at the time the preference was stored
    pub amount_minor: i64,

    /// Zodiac sign for sign-specific bundles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sign: Option<ZodiacSign>,
}

impl BundlePreference {
    /// Snapshot a discount as a preference, e.g. when a bundle chip is clicked.
    pub fn from_discount(discount: &Discount) -> Self {
        Self {
            code: discount.code.clone(),
            label: discount.label.clone(),
            amount_minor: discount.amount_minor,
            sign: discount.sign,
        }
    }
}

/// Outcome of merge-all mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedPromotions {
    /// The cart lines the discounts were computed for
    pub items: Vec<CartLine>,

    /// Every eligible discount, merged by code
    pub discounts: Vec<Discount>,

    /// Sum of all discount amounts
    pub total_discount_minor: i64,
}

/// Outcome of single-best mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleEvaluation {
    /// The headline discount shown to the shopper
    pub selected_bundle: Option<Discount>,

    /// Amount of the selected discount, zero when nothing is eligible
    pub savings_minor: i64,

    /// Every eligible discount, merged by code
    pub eligible_bundles: Vec<Discount>,

    /// Cart subtotal before discounts
    pub subtotal_minor: i64,

    /// Preference to persist: the selected bundle, or `None` to clear it
    pub preference: Option<BundlePreference>,
}

/// Stack every eligible discount.
pub fn apply_promotions(cart: &Cart, promotions: &PromotionSet) -> AppliedPromotions {
    let discounts = merge_by_code(promotions.evaluate(cart.lines()));
    let total_discount_minor = total_minor(&discounts);

    debug!(
        discounts = discounts.len(),
        total_discount_minor, "promotions applied"
    );

    AppliedPromotions {
        items: cart.lines().to_vec(),
        discounts,
        total_discount_minor,
    }
}

/// Pick the headline discount for the cart summary.
pub fn evaluate_bundle_discount(
    cart: &Cart,
    promotions: &PromotionSet,
    previous: Option<&BundlePreference>,
) -> BundleEvaluation {
    let eligible_bundles = merge_by_code(promotions.evaluate(cart.lines()));
    let selected_bundle = select_best(&eligible_bundles, previous).cloned();

    if selected_bundle.is_none() && previous.is_some() {
        debug!("no bundles eligible, clearing preference");
    }

    BundleEvaluation {
        savings_minor: selected_bundle
            .as_ref()
            .map_or(0, |discount| discount.amount_minor),
        preference: selected_bundle.as_ref().map(BundlePreference::from_discount),
        selected_bundle,
        eligible_bundles,
        subtotal_minor: cart.subtotal_minor(),
    }
}

/// Select a single discount.
///
/// A preference whose code is still eligible wins. Otherwise the largest amount wins,
/// and equal amounts go to the discount evaluated first.
pub fn select_best<'d>(
    discounts: &'d [Discount],
    previous: Option<&BundlePreference>,
) -> Option<&'d Discount> {
    if let Some(preference) = previous {
        if let Some(sticky) = discounts
            .iter()
            .find(|discount| discount.code == preference.code)
        {
            debug!(code = %sticky.code, "keeping sticky bundle preference");
            return Some(sticky);
        }

        debug!(code = %preference.code, "sticky bundle preference no longer eligible");
    }

    discounts.iter().fold(None, |best, discount| match best {
        Some(best) if best.amount_minor >= discount.amount_minor => Some(best),
        _ => Some(discount),
    })
}
