//! # Allergy Evaluator
//!
//! Checks a product against the shopper's declared restrictions.
//!
//! ## Matching Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  For each profile term, in profile order:                               │
//! │                                                                         │
//! │   term ∈ allergens (lowercased, EXACT)?                                 │
//! │        │ yes ──► "Contains allergen '<term>'"        (next term)        │
//! │        │ no                                                             │
//! │        ▼                                                                │
//! │   product has ingredients AND term ⊂ some ingredient (SUBSTRING)?       │
//! │        │ yes ──► "Ingredient list contains '<term>'"                    │
//! │        │ no  ──► nothing                                                │
//! │                                                                         │
//! │  "nuts" vs allergen "Tree Nuts"     → no allergen match (exact only)    │
//! │  "nuts" vs ingredient "Cashew Nuts" → ingredient match (substring)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The allergen check is exact membership and the ingredient check is a
//! substring search. Both behaviours are kept as they are.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::ProductRecord;
use crate::validation::parse_allergy_list;

// =============================================================================
// Allergy Profile
// =============================================================================

/// The shopper's restriction terms, lowercase, fixed for the session.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AllergyProfile {
    terms: Vec<String>,
}

impl AllergyProfile {
    /// A profile with no restrictions.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a profile from raw terms: trimmed, lowercased, blanks and
    /// repeats dropped.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut normalized: Vec<String> = Vec::new();
        for raw in terms {
            let term = raw.as_ref().trim().to_lowercase();
            if !term.is_empty() && !normalized.contains(&term) {
                normalized.push(term);
            }
        }
        AllergyProfile { terms: normalized }
    }

    /// Parses the comma-separated answer given at startup.
    pub fn parse(text: &str) -> Self {
        AllergyProfile {
            terms: parse_allergy_list(text),
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

// =============================================================================
// Verdict
// =============================================================================

/// One triggered restriction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AllergyWarning {
    /// The term is one of the declared allergens.
    ContainsAllergen(String),
    /// The term occurs inside an ingredient name.
    IngredientMatch(String),
}

impl AllergyWarning {
    /// The profile term that triggered this warning.
    pub fn term(&self) -> &str {
        match self {
            AllergyWarning::ContainsAllergen(term) | AllergyWarning::IngredientMatch(term) => term,
        }
    }
}

impl fmt::Display for AllergyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllergyWarning::ContainsAllergen(term) => write!(f, "Contains allergen '{}'", term),
            AllergyWarning::IngredientMatch(term) => {
                write!(f, "Ingredient list contains '{}'", term)
            }
        }
    }
}

/// Safety classification of a product for this shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// No profile declared, or no product to check.
    NotApplicable,
    /// Nothing in the profile matched.
    Safe,
    /// At least one term matched; warnings are in profile-term order.
    Warning(Vec<AllergyWarning>),
}

impl Verdict {
    pub fn is_warning(&self) -> bool {
        matches!(self, Verdict::Warning(_))
    }

    /// Triggered warnings, empty unless this is a [`Verdict::Warning`].
    pub fn warnings(&self) -> &[AllergyWarning] {
        match self {
            Verdict::Warning(warnings) => warnings,
            _ => &[],
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::NotApplicable => write!(f, "Not applicable or no allergies entered."),
            Verdict::Safe => write!(f, "Safe for you."),
            Verdict::Warning(warnings) => {
                let lines: Vec<String> =
                    warnings.iter().map(|w| format!("WARNING: {}.", w)).collect();
                write!(f, "{}", lines.join(" "))
            }
        }
    }
}

// =============================================================================
// Evaluation
// =============================================================================

/// Evaluates `product` against `profile`.
///
/// ## Example
/// ```rust
/// use freshmart_core::allergy::{evaluate, AllergyProfile, Verdict};
/// use freshmart_core::{Money, ProductRecord};
///
/// let muesli = ProductRecord::new("8904335600312", "Muesli", Money::from_cents(4000))
///     .with_allergens(["Oats", "Nuts", "Soy"]);
///
/// let verdict = evaluate(Some(&muesli), &AllergyProfile::parse("soy"));
/// assert_eq!(verdict.to_string(), "WARNING: Contains allergen 'soy'.");
///
/// assert_eq!(evaluate(None, &AllergyProfile::parse("soy")), Verdict::NotApplicable);
/// ```
pub fn evaluate(product: Option<&ProductRecord>, profile: &AllergyProfile) -> Verdict {
    let product = match product {
        Some(product) if !profile.is_empty() => product,
        _ => return Verdict::NotApplicable,
    };

    let allergens: Vec<String> = product.allergens.iter().map(|a| a.to_lowercase()).collect();
    let ingredients: Vec<String> = product
        .ingredients
        .iter()
        .map(|i| i.to_lowercase())
        .collect();

    let mut warnings = Vec::new();
    for term in profile.terms() {
        if allergens.iter().any(|a| a == term) {
            warnings.push(AllergyWarning::ContainsAllergen(term.clone()));
        } else if !ingredients.is_empty() && ingredients.iter().any(|i| i.contains(term.as_str())) {
            warnings.push(AllergyWarning::IngredientMatch(term.clone()));
        }
    }

    if warnings.is_empty() {
        Verdict::Safe
    } else {
        Verdict::Warning(warnings)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
