//! # freshmart-core: Pure Scan-to-Decision Logic
//!
//! This crate is the **heart** of the FreshMart scanning assistant. It holds
//! the control loop that turns raw barcode reads into cart decisions, with
//! zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     FreshMart Scanner Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  apps/scanner (console CLI)                     │   │
//! │  │   LineFeed ──► TextDecoder ──► ConsolePresenter ──► stdout      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ trait calls                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ freshmart-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ debounce  │  │  allergy  │  │   cart    │  │  session  │  │   │
//! │  │   │ Debouncer │  │  Verdict  │  │CartLedger │  │Controller │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO TERMINAL • NO FILES • PURE STATE TRANSITIONS     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Catalog trait                          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              freshmart-catalog (embedded / JSON file)           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (ProductRecord, CartEntry, DiscountPercent)
//! - [`money`] - Money type with integer arithmetic
//! - [`catalog`] - Catalog lookup trait and in-memory implementation
//! - [`allergy`] - Allergy profile and verdicts
//! - [`debounce`] - Repeated-scan suppression
//! - [`cart`] - Bounded cart ledger
//! - [`session`] - The scan-to-decision state machine
//! - [`setup`] - Startup questions (allergies, item limit)
//! - [`validation`] - Input and record validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use freshmart_core::money::Money;
//! use freshmart_core::types::DiscountPercent;
//!
//! let price = Money::from_cents(15000); // 150.00
//! let discount = DiscountPercent::new(10).unwrap();
//!
//! assert_eq!(price.apply_discount(discount).cents(), 13500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod allergy;
pub mod cart;
pub mod catalog;
pub mod debounce;
pub mod error;
pub mod money;
pub mod session;
pub mod setup;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use allergy::{AllergyProfile, AllergyWarning, Verdict};
pub use cart::{CartLedger, CartSnapshot};
pub use catalog::{Catalog, InMemoryCatalog};
pub use debounce::{Debouncer, ScanDecision, ScanEvent};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use session::{
    open_source, BarcodeDecoder, Clock, Decision, EndReason, FrameAck, FrameSource,
    MonotonicClock, Presenter, SessionController, SessionState, SessionSummary,
};
pub use setup::{collect_session_setup, parse_allergy_profile, SessionSetup, StartupPrompt};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// How long the same barcode is ignored after it was accepted as a new scan.
///
/// A camera sees the same label on many consecutive frames; this window
/// turns that burst into one event.
pub const DEFAULT_SCAN_COOLDOWN_SECS: u64 = 4;

/// Maximum length of a product name in the catalog.
pub const MAX_PRODUCT_NAME_LEN: usize = 200;

/// Highest catalog price in minor units (1,00,00,000.00).
pub const MAX_PRICE_CENTS: i64 = 1_000_000_000;
