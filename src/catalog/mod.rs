//! Catalog
//!
//! Product data reaches the storefront in three shapes: local seed records,
//! print-on-demand sync payloads and legacy flat arrays. They are all reduced to
//! [`CatalogProduct`]s whose variants can be turned into cart entries.

use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::cart::{RawCartItem, coerce_major_to_minor};

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The document is not valid JSON or an entry is malformed
    #[error("Failed to parse catalog: {0}")]
    Json(#[from] serde_json::Error),

    /// The document matches no known catalog shape
    #[error("Unrecognized catalog shape: {0}")]
    UnknownShape(String),

    /// No variant has this SKU
    #[error("Unknown SKU: {0}")]
    UnknownSku(String),
}

/// A purchasable variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogVariant {
    /// Stock keeping unit
    pub sku: String,

    /// Display title
    pub title: String,

    /// Unit price in minor units
    pub price_minor: i64,
}

/// A product with its variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogProduct {
    /// Product id
    pub id: String,

    /// Display title
    pub title: String,

    /// Variants with a SKU
    pub variants: Vec<CatalogVariant>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ProductShape {
    Sync(SyncProduct),
    Record(ProductRecord),
}

#[derive(Debug, Deserialize)]
struct SyncProduct {
    sync_product: SyncHeader,
    #[serde(default)]
    sync_variants: Vec<SyncVariant>,
}

#[derive(Debug, Deserialize)]
struct SyncHeader {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SyncVariant {
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    retail_price: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ProductRecord {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    price: Option<Value>,
    #[serde(default)]
    variants: Vec<VariantRecord>,
}

#[derive(Debug, Deserialize)]
struct VariantRecord {
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    price: Option<Value>,
}

fn id_text(id: Option<&Value>) -> String {
    match id {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

fn price_minor(price: Option<&Value>) -> i64 {
    price.and_then(coerce_major_to_minor).unwrap_or(0)
}

fn non_empty(sku: Option<String>) -> Option<String> {
    sku.map(|sku| sku.trim().to_string())
        .filter(|sku| !sku.is_empty())
}

impl From<SyncProduct> for CatalogProduct {
    fn from(sync: SyncProduct) -> Self {
        let title = sync.sync_product.name.unwrap_or_default();

        let variants = sync
            .sync_variants
            .into_iter()
            .filter_map(|variant| {
                let sku = non_empty(variant.sku)?;

                Some(CatalogVariant {
                    title: variant.name.unwrap_or_else(|| title.clone()),
                    price_minor: price_minor(variant.retail_price.as_ref()),
                    sku,
                })
            })
            .collect();

        Self {
            id: id_text(sync.sync_product.id.as_ref()),
            title,
            variants,
        }
    }
}

impl From<ProductRecord> for CatalogProduct {
    fn from(record: ProductRecord) -> Self {
        let title = record.title.or(record.name).unwrap_or_default();
        let base_price = price_minor(record.price.as_ref());

        let mut variants: Vec<CatalogVariant> = record
            .variants
            .into_iter()
            .filter_map(|variant| {
                let sku = non_empty(variant.sku)?;

                Some(CatalogVariant {
                    title: variant.title.map_or_else(
                        || title.clone(),
                        |label| format!("{title} / {label}"),
                    ),
                    price_minor: variant
                        .price
                        .as_ref()
                        .and_then(coerce_major_to_minor)
                        .unwrap_or(base_price),
                    sku,
                })
            })
            .collect();

        if variants.is_empty() {
            if let Some(sku) = non_empty(record.sku.clone()) {
                variants.push(CatalogVariant {
                    sku,
                    title: title.clone(),
                    price_minor: base_price,
                });
            }
        }

        let id = match record.id.as_ref() {
            Some(id) => id_text(Some(id)),
            None => record.sku.unwrap_or_default(),
        };

        Self {
            id,
            title,
            variants,
        }
    }
}

impl From<ProductShape> for CatalogProduct {
    fn from(shape: ProductShape) -> Self {
        match shape {
            ProductShape::Sync(sync) => sync.into(),
            ProductShape::Record(record) => record.into(),
        }
    }
}

impl ProductRecord {
    /// A record needs something that identifies it as a product.
    fn is_product(&self) -> bool {
        self.sku.is_some() || self.title.is_some() || self.name.is_some() || !self.variants.is_empty()
    }
}

/// Split a document into product entries.
///
/// Documents are a bare array, `{"products": [...]}`, `{"result": <document>}` or a
/// single product object.
fn shapes(document: Value) -> Result<Vec<ProductShape>, CatalogError> {
    match document {
        Value::Array(entries) => entries.into_iter().map(shape).collect(),
        Value::Object(mut fields) => {
            if let Some(products) = fields.remove("products") {
                let entries: Vec<Value> = serde_json::from_value(products)?;

                return entries.into_iter().map(shape).collect();
            }

            if let Some(result) = fields.remove("result") {
                return shapes(result);
            }

            Ok(vec![shape(Value::Object(fields))?])
        }
        other => Err(CatalogError::UnknownShape(format!(
            "expected an object or array, found {other}"
        ))),
    }
}

fn shape(entry: Value) -> Result<ProductShape, CatalogError> {
    let shape: ProductShape = serde_json::from_value(entry)?;

    if matches!(&shape, ProductShape::Record(record) if !record.is_product()) {
        return Err(CatalogError::UnknownShape(
            "product has no sku, title, name or variants".to_string(),
        ));
    }

    Ok(shape)
}

/// Normalized product catalog with SKU lookup.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<CatalogProduct>,
    skus: FxHashMap<String, CatalogVariant>,
}

impl Catalog {
    /// Build a catalog from normalized products. The first variant with a given SKU wins.
    pub fn new(products: Vec<CatalogProduct>) -> Self {
        let mut skus = FxHashMap::default();

        for variant in products.iter().flat_map(|product| product.variants.iter()) {
            if skus.contains_key(&variant.sku) {
                debug!(sku = %variant.sku, "duplicate SKU in catalog, keeping first");
                continue;
            }

            skus.insert(variant.sku.clone(), variant.clone());
        }

        Self { products, skus }
    }

    /// Parse and normalize a catalog document.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError::Json`] if the text is not JSON or an entry is malformed,
    /// and [`CatalogError::UnknownShape`] if the document is not a catalog.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let document: Value = serde_json::from_str(json)?;

        Ok(Self::new(
            shapes(document)?
                .into_iter()
                .map(CatalogProduct::from)
                .collect(),
        ))
    }

    /// Normalized products in document order.
    pub fn products(&self) -> &[CatalogProduct] {
        &self.products
    }

    /// Look up a variant by SKU.
    pub fn variant(&self, sku: &str) -> Option<&CatalogVariant> {
        self.skus.get(sku)
    }

    /// Create a cart entry for a SKU.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownSku`] if no variant has the SKU.
    pub fn cart_item(&self, sku: &str, quantity: u32) -> Result<RawCartItem, CatalogError> {
        let variant = self
            .variant(sku)
            .ok_or_else(|| CatalogError::UnknownSku(sku.to_string()))?;

        Ok(RawCartItem::new(
            &variant.sku,
            &variant.title,
            variant.price_minor,
            quantity,
        ))
    }

    /// Fill in a cart entry's title and price from the catalog.
    ///
    /// The entry's `quantity` and `qty` are kept as given, so they are coerced by
    /// [`normalize`](crate::cart::normalize) like any other storefront entry.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownSku`] if no variant has the entry's SKU.
    pub fn resolve(&self, entry: &RawCartItem) -> Result<RawCartItem, CatalogError> {
        let sku = entry.sku_text();
        let variant = self
            .variant(&sku)
            .ok_or_else(|| CatalogError::UnknownSku(sku.clone()))?;

        Ok(RawCartItem {
            quantity: entry.quantity.clone(),
            qty: entry.qty.clone(),
            ..RawCartItem::new(&variant.sku, &variant.title, variant.price_minor, 1)
        })
    }
}
