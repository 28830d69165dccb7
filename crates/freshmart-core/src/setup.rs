//! # Startup Setup
//!
//! The two questions asked before scanning starts: allergies and the item
//! limit.
//!
//! ## Flow
//! ```text
//! "Enter your allergies, separated by commas:" ──► AllergyProfile (asked once)
//!                 │
//!                 ▼
//! "Set a maximum number of items ...:" ──► parse_cart_capacity()
//!                 │                               │
//!                 │            invalid ◄──────────┤
//!                 │   notify + ask again          │ valid
//!                 ▼                               ▼
//!          input closed → None            SessionSetup { profile, capacity }
//! ```
//!
//! Questions go through [`StartupPrompt`], so tests script the answers
//! instead of driving a terminal.

use tracing::debug;

use crate::allergy::AllergyProfile;
use crate::error::ValidationError;
use crate::validation::parse_cart_capacity;

pub const ALLERGY_QUESTION: &str = "Enter your allergies, separated by commas: ";
pub const CAPACITY_QUESTION: &str = "Set a maximum number of items for your cart (e.g., 5): ";

/// Synchronous question/answer channel with the shopper.
pub trait StartupPrompt {
    /// Shows `prompt` and blocks for one line. `None` means input is closed.
    fn read_line(&mut self, prompt: &str) -> Option<String>;

    /// Shows an informational message.
    fn notify(&mut self, message: &str);

    /// Shown once before the first question is asked.
    fn greet(&mut self) {}
}

/// Answers collected before the session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSetup {
    pub profile: AllergyProfile,
    pub capacity: usize,
}

/// Parses the comma-separated allergy answer into a profile.
///
/// Blank entries and repeats are dropped; an empty answer gives an empty
/// profile, which makes every verdict `NotApplicable`.
pub fn parse_allergy_profile(text: &str) -> AllergyProfile {
    AllergyProfile::parse(text)
}

/// Asks for the allergy list once.
pub fn ask_allergy_profile<P: StartupPrompt + ?Sized>(prompt: &mut P) -> Option<AllergyProfile> {
    let answer = prompt.read_line(ALLERGY_QUESTION)?;
    let profile = parse_allergy_profile(&answer);
    debug!(terms = ?profile.terms(), "Allergy profile set");
    Some(profile)
}

/// Asks for the item limit until a positive whole number is given.
///
/// Bad answers never escape: each one is reported through
/// [`StartupPrompt::notify`] and the question is repeated.
pub fn ask_cart_capacity<P: StartupPrompt + ?Sized>(prompt: &mut P) -> Option<usize> {
    loop {
        let answer = prompt.read_line(CAPACITY_QUESTION)?;
        match parse_cart_capacity(&answer) {
            Ok(capacity) => {
                debug!(capacity, "Item limit set");
                return Some(capacity);
            }
            Err(err) => {
                debug!(%err, answer = %answer.trim(), "Rejected item limit");
                prompt.notify(capacity_hint(&err));
            }
        }
    }
}

/// Runs both questions.
pub fn collect_session_setup<P: StartupPrompt + ?Sized>(prompt: &mut P) -> Option<SessionSetup> {
    let profile = ask_allergy_profile(prompt)?;
    let capacity = ask_cart_capacity(prompt)?;
    Some(SessionSetup { profile, capacity })
}

fn capacity_hint(err: &ValidationError) -> &'static str {
    match err {
        ValidationError::MustBePositive { .. } => "Please enter a number greater than 0.",
        _ => "Invalid input. Please enter a whole number.",
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
