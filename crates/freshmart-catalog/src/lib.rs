//! # freshmart-catalog: Catalog Data Sources
//!
//! Builds the [`InMemoryCatalog`] the session controller looks barcodes up
//! in. The controller never knows which source was used.
//!
//! ## Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   catalog path configured?                                              │
//! │        │                                                                │
//! │        ├── no  ──► embedded::freshmart_catalog()   (built-in table)     │
//! │        │                                                                │
//! │        └── yes ──► loader::load_from_path(path)    (JSON file)          │
//! │                          │                                              │
//! │                          ▼                                              │
//! │              InMemoryCatalog::from_products()  ← validation, dedup      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`embedded`] - The built-in FreshMart product table
//! - [`loader`] - JSON catalog files
//! - [`error`] - Catalog error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod embedded;
pub mod error;
pub mod loader;

// =============================================================================
// Re-exports
// =============================================================================

pub use embedded::{freshmart_catalog, freshmart_products};
pub use error::{CatalogError, CatalogResult};
pub use loader::{from_json_str, load_from_path, CatalogFile};

use std::path::Path;

use freshmart_core::InMemoryCatalog;

/// Loads the catalog from `path`, or the built-in table when `path` is `None`.
pub fn load(path: Option<&Path>) -> CatalogResult<InMemoryCatalog> {
    match path {
        Some(path) => load_from_path(path),
        None => {
            tracing::debug!("Using the embedded FreshMart catalog");
            freshmart_catalog()
        }
    }
}
