//! Promotions
//!
//! Each bundle rule is evaluated independently against the normalized cart lines.
//! A [`PromotionSet`] holds the rules in evaluation order; that order is also the
//! tie-break order used when a single best discount is selected.

use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::{
    cart::CartLine,
    discounts::{Discount, DiscountError},
};

pub mod types;

pub use types::{
    DuoPromotion, FamilyConstellationPromotion, PosterAddOnPromotion, TrinityPromotion,
};

/// Promotion enum
#[derive(Debug, Clone)]
pub enum Promotion {
    /// Two adult apparel units
    Duo(DuoPromotion),

    /// Adult and youth lines sharing a zodiac sign
    FamilyConstellation(FamilyConstellationPromotion),

    /// Posters alongside other goods
    PosterAddOn(PosterAddOnPromotion),

    /// Three or more units of anything
    Trinity(TrinityPromotion),
}

impl Promotion {
    /// Short rule name used in logs and receipts.
    pub fn name(&self) -> &'static str {
        match self {
            Promotion::Duo(_) => "duo",
            Promotion::FamilyConstellation(_) => "family_constellation",
            Promotion::PosterAddOn(_) => "poster_add_on",
            Promotion::Trinity(_) => "trinity",
        }
    }

    /// Evaluate the promotion, returning every discount it produces.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if a percentage cannot be applied to its basis.
    pub fn evaluate(&self, lines: &[CartLine]) -> Result<SmallVec<[Discount; 2]>, DiscountError> {
        match self {
            Promotion::Duo(duo) => Ok(duo.evaluate(lines)?.into_iter().collect()),
            Promotion::FamilyConstellation(family) => family.evaluate(lines),
            Promotion::PosterAddOn(poster) => Ok(poster.evaluate(lines)?.into_iter().collect()),
            Promotion::Trinity(trinity) => Ok(trinity.evaluate(lines)?.into_iter().collect()),
        }
    }
}

/// An ordered set of promotions.
#[derive(Debug, Clone)]
pub struct PromotionSet {
    promotions: Vec<Promotion>,
}

impl PromotionSet {
    /// Create a set evaluated in the given order.
    pub fn new(promotions: impl Into<Vec<Promotion>>) -> Self {
        Self {
            promotions: promotions.into(),
        }
    }

    /// Iterate over the promotions in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = &Promotion> {
        self.promotions.iter()
    }

    /// Number of promotions in the set.
    pub fn len(&self) -> usize {
        self.promotions.len()
    }

    /// Check if the set has no promotions.
    pub fn is_empty(&self) -> bool {
        self.promotions.is_empty()
    }

    /// Evaluate every promotion against the lines.
    ///
    /// Discounts are returned in evaluation order. Discounts that round to nothing
    /// are dropped, and a rule whose arithmetic fails is skipped with a warning so
    /// the other rules still apply. The lines are never modified.
    pub fn evaluate(&self, lines: &[CartLine]) -> Vec<Discount> {
        let mut discounts = Vec::new();

        for promotion in &self.promotions {
            match promotion.evaluate(lines) {
                Ok(found) => {
                    for discount in found {
                        if discount.amount_minor <= 0 {
                            continue;
                        }

                        debug!(
                            promotion = promotion.name(),
                            code = %discount.code,
                            amount_minor = discount.amount_minor,
                            "promotion matched"
                        );

                        discounts.push(discount);
                    }
                }
                Err(err) => {
                    warn!(promotion = promotion.name(), error = %err, "promotion skipped");
                }
            }
        }

        debug!(
            lines = lines.len(),
            discounts = discounts.len(),
            "promotions evaluated"
        );

        discounts
    }
}

impl Default for PromotionSet {
    /// Duo, Family Constellation, Poster Add-on and Trinity, in that order.
    fn default() -> Self {
        Self::new(vec![
            Promotion::Duo(DuoPromotion::default()),
            Promotion::FamilyConstellation(FamilyConstellationPromotion::default()),
            Promotion::PosterAddOn(PosterAddOnPromotion::default()),
            Promotion::Trinity(TrinityPromotion::default()),
        ])
    }
}

/// Evaluate the default promotions against the lines.
pub fn evaluate(lines: &[CartLine]) -> Vec<Discount> {
    PromotionSet::default().evaluate(lines)
}
