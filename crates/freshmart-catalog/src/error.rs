//! # Catalog Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error / serde_json::Error / ValidationError                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CatalogError (this module) ← Adds the file path                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AppError (scanner app) ← Printed once, process exits non-zero         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use thiserror::Error;

use freshmart_core::ValidationError;

/// Catalog loading errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    ///
    /// ## When This Occurs
    /// - File doesn't exist
    /// - Permission denied
    #[error("Cannot read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog text is not a valid catalog document.
    ///
    /// ## When This Occurs
    /// - Malformed JSON
    /// - Missing `products` array or required product fields
    /// - Discount above 100
    #[error("Malformed catalog in {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    /// A record parsed but failed validation (blank name, duplicate barcode, ...).
    #[error("Invalid catalog record: {0}")]
    Invalid(#[from] ValidationError),
}

pub type CatalogResult<T> = Result<T, CatalogError>;
