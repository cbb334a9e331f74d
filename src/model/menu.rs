//! The read-only menu catalog.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use thiserror::Error;

/// Lookup failures against the catalog.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MenuError {
    #[error("Category \"{0}\" does not exist")]
    UnknownCategory(String),

    #[error("Item \"{item}\" not found in category \"{category}\"")]
    UnknownItem { category: String, item: String },
}

/// Category → item name → unit price.
#[derive(Debug, Clone, Default)]
pub struct Menu {
    categories: BTreeMap<String, BTreeMap<String, Decimal>>,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or reprices) an item. Prices are given in cents.
    pub fn with_item(mut self, category: &str, item: &str, cents: i64) -> Self {
        self.categories
            .entry(category.to_string())
            .or_default()
            .insert(item.to_string(), Decimal::new(cents, 2));
        self
    }

    pub fn price_of(&self, category: &str, item: &str) -> Result<Decimal, MenuError> {
        let items = self
            .categories
            .get(category)
            .ok_or_else(|| MenuError::UnknownCategory(category.to_string()))?;
        items.get(item).copied().ok_or_else(|| MenuError::UnknownItem {
            category: category.to_string(),
            item: item.to_string(),
        })
    }

    pub fn categories(&self) -> Vec<String> {
        self.categories.keys().cloned().collect()
    }

    pub fn items_in(&self, category: &str) -> Result<&BTreeMap<String, Decimal>, MenuError> {
        self.categories
            .get(category)
            .ok_or_else(|| MenuError::UnknownCategory(category.to_string()))
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    /// The restaurant's standard catalog.
    pub fn standard() -> Self {
        const TABLE: &[(&str, &[(&str, i64)])] = &[
            (
                "dressings",
                &[
                    ("Avocado Lime Ranch", 25),
                    ("Barbeque Sauce", 15),
                    ("Chick-fil-A Sauce", 15),
                    ("Creamy Salsa", 25),
                    ("Fat-Free Honey Mustard", 25),
                    ("Garden Herb Ranch", 25),
                    ("Honey Mustard Sauce", 15),
                    ("Honey Roasted BBQ Sauce", 25),
                    ("Light Balsamic Vinaigrette", 25),
                    ("Light Italian", 25),
                    ("Polynesian Sauce", 15),
                    ("Sweet & Spicy Sriracha Sauce", 15),
                    ("Zesty Apple Cider Vinaigrette", 25),
                    ("Zesty Buffalo", 15),
                ],
            ),
            (
                "drinks",
                &[
                    ("Dasani Water Bottle", 189),
                    ("Large Lemonade", 244),
                    ("Large Iced Coffee", 289),
                    ("Large Fountain Drink", 289),
                    ("Large Tea", 229),
                    ("Medium Lemonade", 224),
                    ("Medium Fountain Drink", 179),
                    ("Medium Tea", 179),
                    ("Small Iced Coffee", 229),
                ],
            ),
            (
                "entrees",
                &[
                    ("12 ct Chick-Fil-A Nuggets Entree", 649),
                    ("12 ct Grilled Nuggets Entree", 639),
                    ("8 ct Chick-Fil-A Nuggets Entree", 459),
                    ("8 ct Grilled Nuggets Entree", 439),
                    ("Chick-Fil-A Chicken Sandwich Entree", 369),
                    ("Chick-Fil-A Deluxe Entree", 429),
                    ("Grilled Chicken Club Entree", 625),
                    ("Grilled Chicken Entree", 495),
                    ("Maple Pepper Bacon Sandwich", 367),
                    ("Spicy Chicken Entree", 399),
                    ("Spicy Deluxe Entree", 459),
                ],
            ),
            (
                "Original Meals",
                &[
                    ("12 ct Chick-Fil-A Nugget Meal", 749),
                    ("8 ct Chick-Fil-A Nuggets Meal", 710),
                    ("Chick-Fil-A Chicken Sandwich Meal", 649),
                    ("Chick-Fil-A Deluxe Meal", 709),
                    ("Spicy Chicken Meal", 685),
                    ("Spicy Deluxe Meal", 745),
                ],
            ),
            (
                "Grilled Meals",
                &[
                    ("12 ct Grilled Nuggets Meal", 919),
                    ("8 ct Grilled Nuggets Meal", 719),
                    ("Grilled Chicken Club Meal", 919),
                    ("Grilled Chicken Meal", 789),
                ],
            ),
            (
                "salads",
                &[
                    ("Cobb Salad", 849),
                    ("Market Salad", 869),
                    ("Spicy Southwest", 869),
                ],
            ),
            (
                "sides",
                &[
                    ("Bowl of Chicken Soup", 389),
                    ("Fruit Cup", 329),
                    ("Greek Yogurt Parfait", 339),
                    ("Kale Crunch", 199),
                    ("Mac & Cheese", 329),
                    ("Side Salad", 355),
                    ("Waffle Chips", 189),
                    ("Waffle Potato Fries", 244),
                ],
            ),
            (
                "treats",
                &[
                    ("Ice Cream Cone", 125),
                    ("Strawberry Milkshake", 274),
                    ("Seasonal Milkshake", 299),
                    ("Cookies & Cream Milkshake", 299),
                    ("Vanilla Milkshake", 250),
                    ("Chocolate Milkshake", 288),
                    ("Peppermint Mocha", 388),
                    ("Frosted Lemonade", 388),
                    ("Frosted Coffee", 229),
                    ("Chocolate Fudge Brownie", 125),
                    ("Chocolate Chunk Cookie", 125),
                ],
            ),
        ];

        TABLE.iter().fold(Self::new(), |menu, (category, items)| {
            items
                .iter()
                .fold(menu, |menu, (item, cents)| menu.with_item(category, item, *cents))
        })
    }
}
