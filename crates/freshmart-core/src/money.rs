//! # Money Module
//!
//! Provides the `Money` type for prices and cart totals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  With f64 prices:                                                       │
//! │    21.50 + 0.10 + 0.20 = 21.800000000000001                            │
//! │    and the "total == sum of lines" check needs a tolerance              │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units (paise)                              │
//! │    2150 + 10 + 20 = 2180, exactly, every time                           │
//! │    The cart total is always the exact sum of its lines                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use freshmart_core::money::Money;
//!
//! let price = Money::from_major_minor(21, 50); // 21.50
//! let total = price + Money::from_cents(8500); // 106.50
//! assert_eq!(total.to_string(), "106.50");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

use crate::types::DiscountPercent;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (paise for INR).
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  ProductRecord.price ──► apply_discount() ──► CartEntry.discounted_price│
/// │                                                      │                  │
/// │                                                      ▼                  │
/// │                                              CartLedger.total           │
/// │                                                                         │
/// │  The currency symbol is NOT part of Money; the console adds it.         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use freshmart_core::money::Money;
    ///
    /// let price = Money::from_cents(15000); // 150.00
    /// assert_eq!(price.cents(), 15000);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Adds two amounts, or `None` if the sum does not fit.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Applies a percentage discount and returns the price to pay.
    ///
    /// ## Implementation
    /// Integer math: `discount = (amount * pct + 50) / 100`, i.e. the
    /// discount amount is rounded half up to the nearest minor unit and
    /// then subtracted.
    ///
    /// ## Example
    /// ```rust
    /// use freshmart_core::money::Money;
    /// use freshmart_core::types::DiscountPercent;
    ///
    /// let trail_mix = Money::from_cents(15000); // 150.00
    /// let pct = DiscountPercent::new(10).unwrap();
    /// assert_eq!(trail_mix.apply_discount(pct).cents(), 13500); // 135.00
    /// ```
    pub fn apply_discount(&self, discount: DiscountPercent) -> Money {
        // i128 keeps the intermediate product from overflowing
        let discount_amount = (self.0 as i128 * discount.value() as i128 + 50) / 100;
        Money::from_cents(self.0 - discount_amount as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders `major.minor` with two decimals, no currency symbol.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let text = format!("{}{}.{:02}", sign, self.major().abs(), self.minor_part());
        // `pad` so callers can use width/alignment like `{:<7}`
        f.pad(&text)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
