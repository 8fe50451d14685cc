//! Domain types for the product catalog.
//!
//! Plain values: a [`Product`] with its [`Rating`]. They carry no wire
//! concerns; the JSON shape lives in [`crate::dto`].

use serde::{Deserialize, Serialize};

/// Unique identifier for a product, stable across fetches
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(i64);

impl ProductId {
    /// Creates a `ProductId` from its numeric value
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the numeric value
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Customer rating of a product
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Average rating, in `[0, 5]`
    pub rate: f64,
    /// Number of ratings
    pub count: u32,
}

/// A product in the catalog
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier
    pub id: ProductId,
    /// Display title
    pub title: String,
    /// Price, never negative
    pub price: f64,
    /// Long description
    pub description: String,
    /// Category key (non-empty, case-sensitive)
    pub category: String,
    /// Image URI
    pub image_url: String,
    /// Customer rating
    pub rating: Rating,
}

impl Product {
    /// Whether the product belongs to `category` (exact match)
    #[must_use]
    pub fn is_in(&self, category: &str) -> bool {
        self.category == category
    }
}
