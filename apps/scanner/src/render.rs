//! # Screen Rendering
//!
//! Pure text builders for every screen the shopper sees. Nothing here
//! touches the terminal; [`crate::console`] decides where the text goes.
//!
//! ## Screens
//! ```text
//! =======================================================
//! 🛒  WELCOME TO FRESHMART - YOUR SMART SHOPPING ASSISTANT 🛒
//! =======================================================
//!
//! --- Your Cart ---
//! 1. FreshMart Premia Trail Mix     ₹135.00  (10% off!)
//! -------------------------------------------------------
//! TOTAL ITEMS:                   1 / 2
//! TOTAL CART VALUE:              ₹135.00
//!
//! Point camera at a new barcode... (press 'q' to quit)
//! ```

use chrono::{DateTime, Local, Utc};
use std::fmt::Write;

use freshmart_core::{
    CartEntry, CartSnapshot, CoreError, Money, ProductRecord, SessionSummary, Verdict,
};

use crate::config::ScannerConfig;

const RULE_WIDTH: usize = 55;
const NAME_WIDTH: usize = 30;

/// Store name, currency and quit key used on every screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderStyle {
    pub store_name: String,
    pub currency: String,
    pub quit_key: char,
}

impl RenderStyle {
    pub fn from_config(config: &ScannerConfig) -> Self {
        RenderStyle {
            store_name: config.store.name.clone(),
            currency: config.store.currency_symbol.clone(),
            quit_key: config.quit_key(),
        }
    }

    fn money(&self, amount: Money) -> String {
        format!("{}{}", self.currency, amount)
    }
}

impl Default for RenderStyle {
    fn default() -> Self {
        RenderStyle::from_config(&ScannerConfig::default())
    }
}

fn rule(c: char) -> String {
    c.to_string().repeat(RULE_WIDTH)
}

// =============================================================================
// Cart
// =============================================================================

/// Banner, cart lines and totals.
pub fn cart_summary(cart: &CartSnapshot<'_>, style: &RenderStyle) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", rule('='));
    let _ = writeln!(
        out,
        "🛒  WELCOME TO {} - YOUR SMART SHOPPING ASSISTANT 🛒",
        style.store_name.to_uppercase()
    );
    let _ = writeln!(out, "{}", rule('='));

    if cart.is_empty() {
        let _ = writeln!(out, "\nYour cart is empty. Start scanning to add items!");
    } else {
        let _ = writeln!(out, "\n--- Your Cart ---");
        for (i, entry) in cart.entries.iter().enumerate() {
            let _ = writeln!(out, "{}", cart_line(i + 1, entry, style).trim_end());
        }
        let _ = writeln!(out, "{}", rule('-'));
        let _ = writeln!(
            out,
            "{:<width$} {} / {}",
            "TOTAL ITEMS:",
            cart.len(),
            cart.capacity,
            width = NAME_WIDTH
        );
        let _ = writeln!(
            out,
            "{:<width$} {}",
            "TOTAL CART VALUE:",
            style.money(cart.total),
            width = NAME_WIDTH
        );
    }
    out
}

fn cart_line(position: usize, entry: &CartEntry, style: &RenderStyle) -> String {
    let discount = if entry.product.discount.is_discounted() {
        format!("({}% off!)", entry.product.discount.value())
    } else {
        String::new()
    };
    format!(
        "{}. {:<name_w$} {:<8} {}",
        position,
        entry.name(),
        style.money(entry.discounted_price),
        discount,
        name_w = NAME_WIDTH
    )
}

/// Shown under the cart while waiting for the next frame.
pub fn scan_hint(style: &RenderStyle) -> String {
    format!(
        "\nPoint camera at a new barcode... (press '{}' to quit)\n",
        style.quit_key
    )
}

// =============================================================================
// Product
// =============================================================================

/// Product detail with nutrition and the allergy verdict.
pub fn product_detail(product: &ProductRecord, verdict: &Verdict, style: &RenderStyle) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n--- ✅ Product Scanned! ---");
    let _ = writeln!(out, "{}", field("Name", &product.name));
    let _ = writeln!(out, "{}", field("Price", style.money(product.price)));
    if product.discount.is_discounted() {
        let discount = format!(
            "{}% OFF! (Final Price: {})",
            product.discount.value(),
            style.money(product.final_price())
        );
        let _ = writeln!(out, "{}", field("Discount", discount));
    }
    for (label, value) in &product.details {
        let _ = writeln!(out, "{}", field(label, value));
    }

    if let Some(nutrition) = &product.nutrition {
        let _ = writeln!(out, "\n--- Nutrition Info ---");
        let calories = format!("{} kcal", optional(nutrition.calories()));
        let protein = format!("{} g", optional(nutrition.protein_g()));
        let _ = writeln!(out, "{}", field("Calories", calories));
        let _ = writeln!(out, "{}", field("Protein", protein));
        for (name, value) in nutrition.iter() {
            if name != "calories" && name != "protein_g" {
                let _ = writeln!(out, "{}", field(name, value));
            }
        }
    }

    let _ = writeln!(out, "\n--- Allergy Check ---");
    let _ = writeln!(out, "{}", field("Status", verdict));
    let _ = writeln!(out, "{}", "-".repeat(26));
    out
}

/// `Label:` padded to a fixed column, then the value.
fn field(label: &str, value: impl std::fmt::Display) -> String {
    format!("{:<11} {}", format!("{}:", label), value)
}

fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

pub const CONFIRM_PROMPT: &str = "Add this item to your cart? (y/n): ";

pub fn not_found(barcode: &str) -> String {
    format!("\nProduct not found for barcode: {}\n", barcode)
}

pub fn added(entry: &CartEntry) -> String {
    format!("'{}' added to cart!\n", entry.name())
}

pub fn refused(entry: &CartEntry, reason: &CoreError) -> String {
    format!("\n'{}' could not be added: {}\n", entry.name(), reason)
}

// =============================================================================
// Final Bill
// =============================================================================

/// The closing screen, rendered once per session.
pub fn final_bill(summary: &SessionSummary, style: &RenderStyle) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\nThank you for shopping at {}!", style.store_name);
    let _ = writeln!(out, "{}", rule('='));
    let _ = writeln!(out, "{:^width$}", "Final Bill", width = RULE_WIDTH);
    let _ = writeln!(out, "{}", rule('='));
    let _ = writeln!(out, "{}", field("Session", summary.session_id));
    let _ = writeln!(out, "{}", field("Started", local_time(summary.started_at)));
    let _ = writeln!(out, "{}", field("Ended", local_time(summary.ended_at)));
    let _ = writeln!(out, "{}", field("Reason", summary.end_reason));
    out.push_str(&cart_summary(&summary.snapshot(), style));
    let _ = writeln!(out, "{}", rule('='));
    let _ = writeln!(out, "Your shopping session has ended.");
    out
}

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
