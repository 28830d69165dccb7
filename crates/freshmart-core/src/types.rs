//! # Domain Types
//!
//! Core domain types used throughout the scanning assistant.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────────┐        ┌──────────────────────┐              │
//! │  │    ProductRecord     │        │      CartEntry       │              │
//! │  │  ──────────────────  │ frozen │  ──────────────────  │              │
//! │  │  barcode (key)       │ ─────► │  product (snapshot)  │              │
//! │  │  name, price         │  copy  │  discounted_price    │              │
//! │  │  discount_percent    │        │  added_at            │              │
//! │  │  details             │        └──────────────────────┘              │
//! │  │  ingredients         │                                               │
//! │  │  nutrition           │        ┌──────────────────────┐              │
//! │  │  allergens           │        │   DiscountPercent    │              │
//! │  └──────────────────────┘        │   0..=100            │              │
//! │                                  └──────────────────────┘              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! A product is identified by its barcode alone. Barcodes are opaque,
//! case-sensitive strings: store labels mix 10-digit and 13-digit codes, so
//! nothing here parses them as numbers or checks check-digits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Discount Percent
// =============================================================================

/// A whole-number percentage discount, 0 to 100 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DiscountPercent(u8);

impl DiscountPercent {
    /// Creates a discount, rejecting values above 100.
    pub fn new(value: u8) -> Result<Self, ValidationError> {
        if value > 100 {
            return Err(ValidationError::OutOfRange {
                field: "discount_percent".to_string(),
                min: 0,
                max: 100,
            });
        }
        Ok(DiscountPercent(value))
    }

    /// No discount.
    #[inline]
    pub const fn none() -> Self {
        DiscountPercent(0)
    }

    /// Returns the percentage.
    #[inline]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Checks whether any discount applies.
    #[inline]
    pub const fn is_discounted(&self) -> bool {
        self.0 > 0
    }
}

impl TryFrom<u8> for DiscountPercent {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        DiscountPercent::new(value)
    }
}

impl From<DiscountPercent> for u8 {
    fn from(pct: DiscountPercent) -> Self {
        pct.0
    }
}

// =============================================================================
// Nutrition Facts
// =============================================================================

/// Named numeric nutrition values, e.g. `calories` or `protein_g`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NutritionFacts(BTreeMap<String, f64>);

impl NutritionFacts {
    /// Creates an empty set of facts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one named value.
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    /// Looks up a value by name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    /// Energy in kcal.
    pub fn calories(&self) -> Option<f64> {
        self.get("calories")
    }

    /// Protein in grams.
    pub fn protein_g(&self) -> Option<f64> {
        self.get("protein_g")
    }

    /// Iterates over all values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =============================================================================
// Product Record
// =============================================================================

/// A product in the store catalog.
///
/// Immutable once built: the catalog owns its records for the whole process
/// and hands out shared references only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Catalog key, exactly as printed on the label.
    pub barcode: String,

    /// Display name shown to the shopper and on the bill.
    pub name: String,

    /// Shelf price before discount.
    #[serde(rename = "price_cents")]
    pub price: Money,

    /// Percentage taken off the shelf price.
    #[serde(rename = "discount_percent", default)]
    pub discount: DiscountPercent,

    /// Free-form label fields ("Net Weight" → "500 g").
    #[serde(default)]
    pub details: BTreeMap<String, String>,

    /// Ingredients in label order. Empty when the product declares none.
    #[serde(default)]
    pub ingredients: Vec<String>,

    /// Nutrition facts, when the label has them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nutrition: Option<NutritionFacts>,

    /// Declared allergens in label order.
    #[serde(default)]
    pub allergens: Vec<String>,
}

impl ProductRecord {
    /// Creates a product with no discount, details, ingredients or allergens.
    pub fn new(barcode: impl Into<String>, name: impl Into<String>, price: Money) -> Self {
        ProductRecord {
            barcode: barcode.into(),
            name: name.into(),
            price,
            discount: DiscountPercent::none(),
            details: BTreeMap::new(),
            ingredients: Vec::new(),
            nutrition: None,
            allergens: Vec::new(),
        }
    }

    pub fn with_discount(mut self, discount: DiscountPercent) -> Self {
        self.discount = discount;
        self
    }

    pub fn with_detail(mut self, label: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(label.into(), value.into());
        self
    }

    pub fn with_ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients = ingredients.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_nutrition(mut self, nutrition: NutritionFacts) -> Self {
        self.nutrition = Some(nutrition);
        self
    }

    pub fn with_allergens<I, S>(mut self, allergens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allergens = allergens.into_iter().map(Into::into).collect();
        self
    }

    /// Price after the product's discount.
    ///
    /// ## Example
    /// ```rust
    /// use freshmart_core::{Money, ProductRecord, DiscountPercent};
    ///
    /// let p = ProductRecord::new("8903363011411", "Trail Mix", Money::from_cents(15000))
    ///     .with_discount(DiscountPercent::new(10).unwrap());
    /// assert_eq!(p.final_price().cents(), 13500);
    /// ```
    #[inline]
    pub fn final_price(&self) -> Money {
        self.price.apply_discount(self.discount)
    }

    /// Whether the label declares an ingredient list.
    #[inline]
    pub fn has_ingredients(&self) -> bool {
        !self.ingredients.is_empty()
    }
}

// =============================================================================
// Cart Entry
// =============================================================================

/// A product accepted into the cart.
///
/// ## Price Freezing
/// The discounted price is computed once, when the shopper accepts the
/// item. The entry is never modified after it is appended to the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    /// Snapshot of the catalog record at acceptance time.
    pub product: ProductRecord,

    /// `price × (1 − discount/100)`, rounded to the minor unit.
    pub discounted_price: Money,

    /// When the shopper accepted the item.
    pub added_at: DateTime<Utc>,
}

impl CartEntry {
    /// Builds an entry from a catalog record, freezing its final price.
    pub fn from_product(product: &ProductRecord) -> Self {
        CartEntry {
            product: product.clone(),
            discounted_price: product.final_price(),
            added_at: Utc::now(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.product.name
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
