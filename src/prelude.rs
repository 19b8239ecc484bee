//! Astral prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartLine, Department, RawCartItem, ZodiacSign, normalize},
    catalog::{Catalog, CatalogError, CatalogProduct, CatalogVariant},
    checkout::{
        CheckoutError, CheckoutLineItem, CheckoutOptions, CheckoutPayload,
        CheckoutSessionResponse, build_checkout_payload,
    },
    config::{ConfigError, PromotionConfig},
    discounts::{Discount, DiscountCode, DiscountError, merge_by_code},
    preferences::{
        JsonFilePreferenceStore, MemoryPreferenceStore, PreferenceError, PreferenceStore,
    },
    promotions::{
        DuoPromotion, FamilyConstellationPromotion, PosterAddOnPromotion, Promotion,
        PromotionSet, TrinityPromotion, evaluate,
    },
    receipt::{Receipt, ReceiptError},
    selection::{
        AppliedPromotions, BundleEvaluation, BundlePreference, apply_promotions,
        evaluate_bundle_discount, select_best,
    },
};
