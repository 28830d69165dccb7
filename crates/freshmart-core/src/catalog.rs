//! # Catalog
//!
//! Read-only barcode → product lookup.
//!
//! The session controller only sees the [`Catalog`] trait. Where the records
//! come from (the embedded store table, a JSON file) is decided once at
//! startup by `freshmart-catalog`.

use std::collections::HashMap;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::ProductRecord;
use crate::validation::{validate_product, ValidationResult};

/// Barcode lookup.
///
/// Barcodes are opaque, case-sensitive keys: `"abc"` and `"ABC"` are
/// different products, and `"0123"` is not `"123"`.
pub trait Catalog {
    /// Returns the product for `barcode`, or `None` when it is unknown.
    fn lookup(&self, barcode: &str) -> Option<&ProductRecord>;

    /// Number of products.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Like [`lookup`](Self::lookup), but a miss is a [`CoreError::LookupMiss`].
    fn require(&self, barcode: &str) -> CoreResult<&ProductRecord> {
        self.lookup(barcode)
            .ok_or_else(|| CoreError::LookupMiss(barcode.to_string()))
    }
}

/// Catalog held entirely in memory, keyed by barcode.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    products: HashMap<String, ProductRecord>,
}

impl InMemoryCatalog {
    /// Builds a catalog, validating every record.
    ///
    /// ## Errors
    /// - Any record failing [`validate_product`]
    /// - Two records with the same barcode ([`ValidationError::Duplicate`])
    pub fn from_products<I>(products: I) -> ValidationResult<Self>
    where
        I: IntoIterator<Item = ProductRecord>,
    {
        let mut map = HashMap::new();
        for product in products {
            validate_product(&product)?;
            if map.contains_key(&product.barcode) {
                return Err(ValidationError::Duplicate {
                    field: "barcode".to_string(),
                    value: product.barcode,
                });
            }
            map.insert(product.barcode.clone(), product);
        }
        Ok(InMemoryCatalog { products: map })
    }

    /// All products, sorted by barcode.
    pub fn products(&self) -> Vec<&ProductRecord> {
        let mut all: Vec<&ProductRecord> = self.products.values().collect();
        all.sort_by(|a, b| a.barcode.cmp(&b.barcode));
        all
    }
}

impl Catalog for InMemoryCatalog {
    fn lookup(&self, barcode: &str) -> Option<&ProductRecord> {
        self.products.get(barcode)
    }

    fn len(&self) -> usize {
        self.products.len()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::from_products([
            ProductRecord::new("8906008815191", "Kala Chana", Money::from_cents(8500)),
            ProductRecord::new("1001972587", "College Book", Money::from_cents(5500)),
            ProductRecord::new("ab12", "Lowercase Label", Money::from_cents(100)),
        ])
        .unwrap()
    }

    #[test]
    fn test_lookup_hit_and_miss() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.lookup("8906008815191").map(|p| p.name.as_str()),
            Some("Kala Chana")
        );
        assert!(catalog.lookup("0000000000000").is_none());
    }

    #[test]
    fn test_lookup_is_exact_and_case_sensitive() {
        let catalog = catalog();
        assert!(catalog.lookup("AB12").is_none());
        assert!(catalog.lookup(" ab12").is_none());
        assert!(catalog.lookup("01001972587").is_none());
        assert!(catalog.lookup("ab12").is_some());
    }

    #[test]
    fn test_require_reports_miss() {
        let catalog = catalog();
        assert!(catalog.require("ab12").is_ok());
        assert!(matches!(
            catalog.require("nope"),
            Err(CoreError::LookupMiss(barcode)) if barcode == "nope"
        ));
    }

    #[test]
    fn test_duplicate_barcode_rejected() {
        let result = InMemoryCatalog::from_products([
            ProductRecord::new("1", "One", Money::from_cents(100)),
            ProductRecord::new("1", "Also One", Money::from_cents(200)),
        ]);
        assert!(matches!(result, Err(ValidationError::Duplicate { .. })));
    }

    #[test]
    fn test_invalid_record_rejected() {
        let result =
            InMemoryCatalog::from_products([ProductRecord::new("", "Nameless", Money::zero())]);
        assert!(result.is_err());
    }

    #[test]
    fn test_products_sorted() {
        let catalog = catalog();
        let barcodes: Vec<&str> = catalog.products().iter().map(|p| p.barcode.as_str()).collect();
        assert_eq!(barcodes, vec!["1001972587", "8906008815191", "ab12"]);
    }
}
