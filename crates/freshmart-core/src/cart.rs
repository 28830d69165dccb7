//! # Cart Ledger
//!
//! The bounded, append-only list of accepted items and its running total.
//!
//! ## Ledger Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Ledger Operations                               │
//! │                                                                         │
//! │  Session Event            Ledger Call             State Change          │
//! │  ─────────────            ───────────             ────────────          │
//! │                                                                         │
//! │  Session start ─────────► CartLedger::new(cap) ─► empty, total 0       │
//! │                                                                         │
//! │  Shopper accepts ───────► try_append(entry) ────► entries.push(entry)  │
//! │                                                   total += price        │
//! │                                                                         │
//! │  Render / final bill ───► snapshot() ───────────► (read only)          │
//! │                                                                         │
//! │  NOTE: There is no remove, no clear, no quantity edit. The ledger only │
//! │        grows, and never past its capacity.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - `len() <= capacity()` at all times
//! - `total() == sum(entry.discounted_price)` exactly (integer money)

use serde::Serialize;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::CartEntry;

/// Bounded cart owned by the session controller.
#[derive(Debug, Clone)]
pub struct CartLedger {
    entries: Vec<CartEntry>,
    capacity: usize,
    total: Money,
}

impl CartLedger {
    /// Creates an empty ledger.
    ///
    /// ## Errors
    /// A capacity of zero is rejected; a cart that can hold nothing would
    /// end the session before the first scan.
    pub fn new(capacity: usize) -> CoreResult<Self> {
        if capacity == 0 {
            return Err(ValidationError::MustBePositive {
                field: "item limit".to_string(),
            }
            .into());
        }
        Ok(CartLedger {
            // Capacity is shopper input and may be huge; grow by append only
            entries: Vec::new(),
            capacity,
            total: Money::zero(),
        })
    }

    /// Appends an accepted entry.
    ///
    /// ## Returns
    /// - `Ok(())` when the entry was added
    /// - `Err(CoreError::CapacityExceeded)` when the cart is already full
    /// - `Err(CoreError::TotalOverflow)` when the total would not fit
    ///
    /// On error the ledger is left untouched.
    pub fn try_append(&mut self, entry: CartEntry) -> CoreResult<()> {
        if self.is_full() {
            return Err(CoreError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        let total = self
            .total
            .checked_add(entry.discounted_price)
            .ok_or(CoreError::TotalOverflow)?;
        self.total = total;
        self.entries.push(entry);
        Ok(())
    }

    /// Read-only view for rendering.
    pub fn snapshot(&self) -> CartSnapshot<'_> {
        CartSnapshot {
            entries: &self.entries,
            total: self.total,
            capacity: self.capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    /// Items that still fit.
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.entries.len())
    }

    /// Consumes the ledger, returning its entries in acceptance order.
    pub fn into_entries(self) -> Vec<CartEntry> {
        self.entries
    }
}

/// Borrowed view of a ledger.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CartSnapshot<'a> {
    pub entries: &'a [CartEntry],
    pub total: Money,
    pub capacity: usize,
}

impl CartSnapshot<'_> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
