//! # JSON Catalog Files
//!
//! ## File Format
//! ```json
//! {
//!   "products": [
//!     {
//!       "barcode": "8903363011411",
//!       "name": "FreshMart Premia Trail Mix",
//!       "price_cents": 15000,
//!       "discount_percent": 10,
//!       "details": { "Net Quantity": "100 g" },
//!       "ingredients": ["Cranberry", "Cashew Nuts"],
//!       "nutrition": { "calories": 450, "protein_g": 15 },
//!       "allergens": ["Tree Nuts"]
//!     }
//!   ]
//! }
//! ```
//!
//! `discount_percent`, `details`, `ingredients`, `nutrition` and `allergens`
//! are optional. Every record is validated and duplicate barcodes are
//! rejected, exactly as for the embedded table.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use freshmart_core::{InMemoryCatalog, ProductRecord};

use crate::error::{CatalogError, CatalogResult};

/// On-disk catalog document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub products: Vec<ProductRecord>,
}

impl CatalogFile {
    pub fn new(products: Vec<ProductRecord>) -> Self {
        CatalogFile { products }
    }

    /// Validates the records and builds a catalog.
    pub fn into_catalog(self) -> CatalogResult<InMemoryCatalog> {
        Ok(InMemoryCatalog::from_products(self.products)?)
    }

    /// Pretty-printed JSON, with a trailing newline.
    pub fn to_json_pretty(&self) -> CatalogResult<String> {
        let mut text = serde_json::to_string_pretty(self).map_err(|source| CatalogError::Parse {
            origin: "catalog export".to_string(),
            source,
        })?;
        text.push('\n');
        Ok(text)
    }
}

/// Parses catalog JSON held in memory. `origin` names it in errors.
pub fn from_json_str(text: &str, origin: &str) -> CatalogResult<InMemoryCatalog> {
    let file: CatalogFile = serde_json::from_str(text).map_err(|source| CatalogError::Parse {
        origin: origin.to_string(),
        source,
    })?;
    debug!(origin, records = file.products.len(), "Parsed catalog document");
    file.into_catalog()
}

/// Reads and validates a catalog file.
///
/// ## Example
/// ```rust,ignore
/// let catalog = freshmart_catalog::load_from_path("/etc/freshmart/catalog.json")?;
/// ```
pub fn load_from_path(path: impl AsRef<Path>) -> CatalogResult<InMemoryCatalog> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let catalog = from_json_str(&text, &path.display().to_string())?;
    info!(path = %path.display(), products = catalog.products().len(), "Catalog loaded");
    Ok(catalog)
}
