//! # Error Types
//!
//! Domain-specific error types for freshmart-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  freshmart-core errors (this file)                                     │
//! │  ├── CoreError        - Session and domain failures                    │
//! │  └── ValidationError  - Input / record validation failures             │
//! │                                                                         │
//! │  freshmart-catalog errors (separate crate)                             │
//! │  └── CatalogError     - Catalog file loading failures                  │
//! │                                                                         │
//! │  scanner app errors                                                    │
//! │  ├── ConfigError      - Config file / env problems                     │
//! │  └── AppError         - What ends the process                          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → AppError → exit code              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Which Errors Are Fatal?
//! Only [`CoreError::StartupUnavailable`]. Everything else is either
//! recovered where it happens (bad item limit → ask again) or reported to
//! the shopper as an ordinary outcome (unknown barcode).

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core errors of the scanning session.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The frame source could not be opened before the loop started.
    ///
    /// ## When This Occurs
    /// - Feed file or FIFO does not exist
    /// - Decoder process cannot be spawned
    ///
    /// This is the only unrecoverable condition of a session.
    #[error("Frame source unavailable: {0}")]
    StartupUnavailable(String),

    /// Startup configuration was rejected.
    ///
    /// The interactive setup re-prompts on this error; it only escapes when
    /// the value came from somewhere that cannot be asked again.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ValidationError),

    /// Barcode is not in the catalog.
    #[error("Product not found for barcode: {0}")]
    LookupMiss(String),

    /// Cart already holds `capacity` entries.
    ///
    /// ## When This Occurs
    /// Never, in a correct session loop: the controller stops before the
    /// cart is full. The ledger still refuses the append.
    #[error("Cart cannot have more than {capacity} items")]
    CapacityExceeded { capacity: usize },

    /// The cart total would overflow.
    ///
    /// ## When This Occurs
    /// Only with prices far beyond [`crate::MAX_PRICE_CENTS`], which catalog
    /// validation rejects. The item is refused and the session goes on.
    #[error("Cart total is too large to add this item")]
    TotalOverflow,
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used both for shopper input at startup and for catalog records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be greater than 0")]
    MustBePositive { field: String },

    /// Invalid format (e.g. letters where a whole number was expected).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g. the same barcode twice in one catalog).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
