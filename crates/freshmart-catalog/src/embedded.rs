//! # Embedded FreshMart Table
//!
//! The store's built-in product table, used when no catalog file is
//! configured.
//!
//! ## Contents
//! - Food & grocery: six items with ingredients, and nutrition and
//!   allergens where the label has them
//! - General & stationery: four items, most without an ingredient list
//!
//! Prices are in paise (₹1 = 100). Barcodes are kept exactly as printed,
//! including the 10-digit `1001972587`.

use freshmart_core::{DiscountPercent, InMemoryCatalog, Money, NutritionFacts, ProductRecord};

use crate::error::CatalogResult;

/// One row of the built-in table.
struct Row {
    barcode: &'static str,
    name: &'static str,
    price_cents: i64,
    discount: u8,
    details: &'static [(&'static str, &'static str)],
    ingredients: &'static [&'static str],
    /// (calories kcal, protein g)
    nutrition: Option<(f64, f64)>,
    allergens: &'static [&'static str],
}

const FRESHMART_TABLE: &[Row] = &[
    // === Food & Grocery ===
    Row {
        barcode: "8903363011411",
        name: "FreshMart Premia Trail Mix",
        price_cents: 15000,
        discount: 10,
        details: &[("Net Quantity", "100 g")],
        ingredients: &[
            "Cranberry",
            "Black Raisins",
            "Pumpkin Seeds",
            "Almonds",
            "Cashew Nuts",
        ],
        nutrition: Some((450.0, 15.0)),
        allergens: &["Tree Nuts"],
    },
    Row {
        barcode: "8906008815191",
        name: "Fortune Sushan Kala Chana",
        price_cents: 8500,
        discount: 0,
        details: &[("Net Weight", "500 g")],
        ingredients: &["Kala Chana"],
        nutrition: Some((364.0, 20.0)),
        allergens: &[],
    },
    Row {
        barcode: "8904335600312",
        name: "Yoga Bar Crunchy Muesli",
        price_cents: 4000,
        discount: 0,
        details: &[("Net Weight", "40 g")],
        ingredients: &[
            "Rolled Oats",
            "Ragi Flakes",
            "Almonds",
            "Flax Seeds",
            "Chia Seeds",
        ],
        nutrition: Some((156.0, 4.6)),
        allergens: &["Oats", "Nuts", "Soy"],
    },
    Row {
        barcode: "8901207048760",
        name: "Dabur Hajmola Imli",
        price_cents: 3000,
        discount: 5,
        details: &[("Type", "Tasty Digestive Tablets")],
        ingredients: &[
            "Pippali",
            "Sunthi",
            "Nimbu Saar",
            "Imli Saar",
            "Samudra Lavana",
        ],
        nutrition: Some((10.0, 0.1)),
        allergens: &[],
    },
    Row {
        barcode: "8906021924436",
        name: "Royal Zahidi Dates",
        price_cents: 25000,
        discount: 0,
        details: &[("Net Weight", "500 g"), ("Country of Origin", "Iraq")],
        ingredients: &["Zahidi Dates"],
        nutrition: Some((282.0, 2.5)),
        allergens: &["May contain traces of nuts and seeds"],
    },
    Row {
        barcode: "8902346012360",
        name: "Electral (ORS)",
        price_cents: 2150,
        discount: 0,
        details: &[("Contents", "4.40 g"), ("Formula", "W.H.O.")],
        ingredients: &[
            "Sodium Chloride",
            "Potassium Chloride",
            "Sodium Citrate",
            "Dextrose Anhydrous",
        ],
        nutrition: None,
        allergens: &[],
    },
    // === General & Stationery ===
    Row {
        barcode: "9780190135096",
        name: "Oxford Mini Dictionary",
        price_cents: 27500,
        discount: 15,
        details: &[("Publisher", "Oxford University Press")],
        ingredients: &[],
        nutrition: None,
        allergens: &[],
    },
    Row {
        barcode: "8906073789327",
        name: "DOMS A5 Poly Notebook",
        price_cents: 8000,
        discount: 0,
        details: &[("Ruling", "Single Line"), ("Pages", "160")],
        ingredients: &[],
        nutrition: None,
        allergens: &[],
    },
    Row {
        barcode: "8906128100320",
        name: "Minimalist Face Cleanser",
        price_cents: 29900,
        discount: 0,
        details: &[("Net Content", "100 ml")],
        ingredients: &["Aqua", "Glycerin", "Cocamidopropyl Betaine"],
        nutrition: None,
        allergens: &[],
    },
    Row {
        barcode: "1001972587",
        name: "TRU NOTE A4 College Book",
        price_cents: 5500,
        discount: 0,
        details: &[("Ruling", "Unruled"), ("Pages", "140")],
        ingredients: &[],
        nutrition: None,
        allergens: &[],
    },
];

impl Row {
    fn to_record(&self) -> CatalogResult<ProductRecord> {
        let mut product = ProductRecord::new(
            self.barcode,
            self.name,
            Money::from_cents(self.price_cents),
        )
        .with_discount(DiscountPercent::new(self.discount)?)
        .with_ingredients(self.ingredients.iter().copied())
        .with_allergens(self.allergens.iter().copied());

        for (label, value) in self.details {
            product = product.with_detail(*label, *value);
        }
        if let Some((calories, protein)) = self.nutrition {
            product = product.with_nutrition(
                NutritionFacts::new()
                    .with("calories", calories)
                    .with("protein_g", protein),
            );
        }
        Ok(product)
    }
}

/// The built-in records, in table order.
pub fn freshmart_products() -> CatalogResult<Vec<ProductRecord>> {
    FRESHMART_TABLE.iter().map(Row::to_record).collect()
}

/// The built-in table as a validated catalog.
pub fn freshmart_catalog() -> CatalogResult<InMemoryCatalog> {
    Ok(InMemoryCatalog::from_products(freshmart_products()?)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use freshmart_core::allergy::{evaluate, AllergyProfile, AllergyWarning, Verdict};
    use freshmart_core::Catalog;

    #[test]
    fn test_table_is_complete_and_valid() {
        let catalog = freshmart_catalog().unwrap();
        assert_eq!(catalog.len(), 10);
    }

    #[test]
    fn test_scenario_products() {
        let catalog = freshmart_catalog().unwrap();

        let trail_mix = catalog.lookup("8903363011411").unwrap();
        assert_eq!(trail_mix.price, Money::from_cents(15000));
        assert_eq!(trail_mix.final_price(), Money::from_cents(13500));

        let kala_chana = catalog.lookup("8906008815191").unwrap();
        assert_eq!(kala_chana.final_price(), Money::from_cents(8500));
    }

    #[test]
    fn test_short_barcode_and_fractional_price() {
        let catalog = freshmart_catalog().unwrap();
        assert_eq!(
            catalog.lookup("1001972587").map(|p| p.name.as_str()),
            Some("TRU NOTE A4 College Book")
        );
        let ors = catalog.lookup("8902346012360").unwrap();
        assert_eq!(ors.price.to_string(), "21.50");
        assert!(ors.nutrition.is_none());

        // 5% off 30.00
        let hajmola = catalog.lookup("8901207048760").unwrap();
        assert_eq!(hajmola.final_price(), Money::from_cents(2850));
    }

    #[test]
    fn test_stationery_has_no_ingredients() {
        let catalog = freshmart_catalog().unwrap();
        let dictionary = catalog.lookup("9780190135096").unwrap();
        assert!(!dictionary.has_ingredients());
        assert_eq!(
            evaluate(Some(dictionary), &AllergyProfile::parse("nuts")),
            Verdict::Safe
        );
    }

    #[test]
    fn test_nutrition_values() {
        let catalog = freshmart_catalog().unwrap();
        let muesli = catalog.lookup("8904335600312").unwrap();
        let facts = muesli.nutrition.as_ref().unwrap();
        assert_eq!(facts.calories(), Some(156.0));
        assert_eq!(facts.protein_g(), Some(4.6));
    }

    #[test]
    fn test_embedded_allergy_scenarios() {
        let catalog = freshmart_catalog().unwrap();
        let nuts = AllergyProfile::parse("nuts");

        // "Tree Nuts" is not an exact match, "Cashew Nuts" is a substring match
        assert_eq!(
            evaluate(catalog.lookup("8903363011411"), &nuts),
            Verdict::Warning(vec![AllergyWarning::IngredientMatch("nuts".into())])
        );
        // The allergen phrase mentions nuts but is not exactly "nuts"
        assert_eq!(evaluate(catalog.lookup("8906021924436"), &nuts), Verdict::Safe);
        // Muesli declares "Nuts" exactly
        assert_eq!(
            evaluate(catalog.lookup("8904335600312"), &nuts),
            Verdict::Warning(vec![AllergyWarning::ContainsAllergen("nuts".into())])
        );
    }
}
