//! Carts, catalogs and promotion configs loaded from `fixtures/`.

use std::{fs, path::Path};

use rusty_money::iso::{GBP, USD};
use testresult::TestResult;

use astral::{
    cart::RawCartItem,
    preferences::{JsonFilePreferenceStore, PreferenceStore},
    prelude::*,
};

fn fixture_path(kind: &str, name: &str) -> String {
    format!("./fixtures/{kind}/{name}")
}

fn load_cart(name: &str, config: &PromotionConfig) -> TestResult<Cart> {
    let contents = fs::read_to_string(fixture_path("carts", name))?;
    let items: Vec<RawCartItem> = serde_json::from_str(&contents)?;

    Ok(Cart::from_raw(&items, config.currency))
}

#[test]
fn default_config_matches_built_in_rules() -> TestResult {
    let config = PromotionConfig::from_path(fixture_path("promotions", "default.yml"))?;
    let cart = load_cart("stacked.json", &config)?;

    assert_eq!(config.currency, USD);
    assert_eq!(config.minimum_unit_amount, 50);
    assert_eq!(
        apply_promotions(&cart, &config.promotions),
        apply_promotions(&cart, &PromotionSet::default())
    );

    Ok(())
}

#[test]
fn stacked_cart_normalizes_mixed_price_fields() -> TestResult {
    let config = PromotionConfig::default();
    let cart = load_cart("stacked.json", &config)?;

    let prices: Vec<i64> = cart.iter().map(CartLine::unit_price_minor).collect();

    assert_eq!(prices, vec![4000, 3000, 1000]);
    assert_eq!(cart.subtotal_minor(), 8000);

    let applied = apply_promotions(&cart, &config.promotions);

    assert_eq!(applied.total_discount_minor, 850);

    Ok(())
}

#[test]
fn family_cart_selects_family_bundle() -> TestResult {
    let config = PromotionConfig::default();
    let cart = load_cart("family.json", &config)?;

    let evaluation = evaluate_bundle_discount(&cart, &config.promotions, None);
    let selected = evaluation.selected_bundle.ok_or("missing selection")?;

    assert_eq!(selected.code.as_str(), "FAMILY15-ARI");
    assert_eq!(selected.sign, Some(ZodiacSign::Aries));
    assert_eq!(evaluation.savings_minor, 750);

    Ok(())
}

#[test]
fn malformed_cart_still_evaluates() -> TestResult {
    let config = PromotionConfig::default();
    let cart = load_cart("malformed.json", &config)?;

    assert_eq!(cart.len(), 4);
    assert_eq!(cart.total_quantity(), 5);
    assert_eq!(cart.subtotal_minor(), 2000);

    let applied = apply_promotions(&cart, &config.promotions);
    let codes: Vec<&str> = applied
        .discounts
        .iter()
        .map(|discount| discount.code.as_str())
        .collect();

    assert_eq!(codes, vec!["POSTER20"], "zero priced bundles are dropped");
    assert_eq!(applied.total_discount_minor, 400);

    Ok(())
}

#[test]
fn summer_config_overrides_rules_and_currency() -> TestResult {
    let config = PromotionConfig::from_path(fixture_path("promotions", "summer.yml"))?;
    let cart = load_cart("stacked.json", &config)?;

    assert_eq!(config.currency, GBP);
    assert_eq!(config.minimum_unit_amount, 100);
    assert_eq!(config.promotions.len(), 2, "trinity is disabled");

    let applied = apply_promotions(&cart, &config.promotions);
    let codes: Vec<&str> = applied
        .discounts
        .iter()
        .map(|discount| discount.code.as_str())
        .collect();

    assert_eq!(codes, vec!["SUMMERDUO"]);
    assert_eq!(applied.total_discount_minor, 1750);

    let payload = build_checkout_payload(
        &applied.items,
        applied.total_discount_minor,
        &config.checkout_options(),
    )?;

    assert_eq!(payload.currency, "GBP");

    Ok(())
}

#[test]
fn catalog_cart_resolves_skus() -> TestResult {
    let config = PromotionConfig::default();
    let catalog = Catalog::from_json(&fs::read_to_string(fixture_path(
        "catalogs",
        "storefront.json",
    ))?)?;

    let entries: Vec<RawCartItem> =
        serde_json::from_str(&fs::read_to_string(fixture_path("carts", "storefront.json"))?)?;

    let items = entries
        .iter()
        .map(|entry| catalog.resolve(entry))
        .collect::<Result<Vec<_>, _>>()?;

    let cart = Cart::from_raw(&items, config.currency);

    assert_eq!(cart.subtotal_minor(), 10_600);

    let applied = apply_promotions(&cart, &config.promotions);
    let evaluation = evaluate_bundle_discount(&cart, &config.promotions, None);

    assert_eq!(applied.total_discount_minor, 1630);
    assert_eq!(evaluation.savings_minor, 640);
    assert_eq!(evaluation.eligible_bundles.len(), 4);

    Ok(())
}

#[test]
fn preference_file_round_trips_between_evaluations() -> TestResult {
    let config = PromotionConfig::default();
    let cart = load_cart("stacked.json", &config)?;
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("preference.json");

    let mut store = JsonFilePreferenceStore::new(&path);

    assert_eq!(store.load()?, None);

    let chosen = Discount::new(DiscountCode::new("TRINITY15"), "Trinity", 150);

    store.save(Some(&BundlePreference::from_discount(&chosen)))?;

    let evaluation = evaluate_bundle_discount(&cart, &config.promotions, store.load()?.as_ref());

    store.save(evaluation.preference.as_ref())?;

    assert!(Path::new(&path).exists(), "preference file written");
    assert_eq!(
        store.load()?.map(|preference| preference.code),
        Some(DiscountCode::new("TRINITY15"))
    );
    assert_eq!(evaluation.savings_minor, 150);

    Ok(())
}
