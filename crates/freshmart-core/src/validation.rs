//! # Validation Module
//!
//! Input validation for shopper answers and catalog records.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Where Validation Happens                           │
//! │                                                                         │
//! │  Startup answers (console / CLI flags)                                  │
//! │  ├── parse_cart_capacity()   "5" → 5, "abc" / "0" → error              │
//! │  └── parse_allergy_list()    "Nuts, ,soy" → ["nuts", "soy"]            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Catalog construction (embedded table / JSON file)                      │
//! │  └── validate_product()      barcode, name, price                       │
//! │                                                                         │
//! │  The session loop itself never validates: everything it touches was   │
//! │  checked on the way in.                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::ProductRecord;
use crate::{MAX_PRICE_CENTS, MAX_PRODUCT_NAME_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Startup Answers
// =============================================================================

/// Parses the maximum number of cart items.
///
/// ## Rules
/// - Surrounding whitespace is ignored
/// - Must be a whole number
/// - Must be greater than zero
///
/// ## Example
/// ```rust
/// use freshmart_core::validation::parse_cart_capacity;
///
/// assert_eq!(parse_cart_capacity(" 5 ").unwrap(), 5);
/// assert!(parse_cart_capacity("0").is_err());
/// assert!(parse_cart_capacity("five").is_err());
/// ```
pub fn parse_cart_capacity(text: &str) -> ValidationResult<usize> {
    let text = text.trim();

    // Parse as signed so "-3" is reported as not positive, not as garbage
    let value: i64 = text.parse().map_err(|_| ValidationError::InvalidFormat {
        field: "item limit".to_string(),
        reason: "must be a whole number".to_string(),
    })?;

    if value <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "item limit".to_string(),
        });
    }

    usize::try_from(value).map_err(|_| ValidationError::OutOfRange {
        field: "item limit".to_string(),
        min: 1,
        max: i64::MAX,
    })
}

/// Splits a comma-separated allergy answer into normalized terms.
///
/// Terms are trimmed and lowercased; empty entries are dropped, as are
/// repeats of a term already seen. Order of first appearance is kept.
///
/// ## Example
/// ```rust
/// use freshmart_core::validation::parse_allergy_list;
///
/// assert_eq!(parse_allergy_list(" Nuts, ,SOY,nuts"), vec!["nuts", "soy"]);
/// assert!(parse_allergy_list("").is_empty());
/// ```
pub fn parse_allergy_list(text: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for raw in text.split(',') {
        let term = raw.trim().to_lowercase();
        if term.is_empty() || terms.contains(&term) {
            continue;
        }
        terms.push(term);
    }
    terms
}

// =============================================================================
// Catalog Records
// =============================================================================

/// Validates a barcode key.
///
/// Barcodes are opaque: the only rule is that the key is not blank. No
/// length, digit or check-digit rules apply.
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    if barcode.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }
    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_PRODUCT_NAME_LEN`] characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_PRODUCT_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_PRODUCT_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a price in minor units. Zero is allowed (free items), and
/// nothing above [`MAX_PRICE_CENTS`].
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }
    Ok(())
}

/// Validates a whole catalog record.
///
/// Discount bounds are enforced by [`crate::types::DiscountPercent`] itself.
pub fn validate_product(product: &ProductRecord) -> ValidationResult<()> {
    validate_barcode(&product.barcode)?;
    validate_product_name(&product.name)?;
    validate_price_cents(product.price.cents())?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
