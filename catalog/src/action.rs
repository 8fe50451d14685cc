//! Actions for the catalog reducer.

use crate::types::Product;

/// Every input to [`CatalogReducer`](crate::CatalogReducer)
#[derive(Clone, Debug, PartialEq)]
pub enum CatalogAction {
    // ========== Intents ==========
    /// Fetch the catalog (issued at session start)
    Load,

    /// Fetch the catalog again, keeping what is shown meanwhile
    Refresh,

    /// Filter the grid by category, `None` shows everything
    SelectCategory {
        /// Category key
        category: Option<String>,
    },

    /// Open a product in the detail view
    SelectProduct {
        /// The product to show
        product: Product,
    },

    /// Close the detail view
    ClearSelection,

    // ========== Fetch results ==========
    /// The fetch succeeded
    ProductsLoaded {
        /// Products in source order
        products: Vec<Product>,
    },

    /// The fetch failed
    LoadFailed {
        /// Human-readable reason
        message: String,
    },
}

impl CatalogAction {
    /// Shorthand for [`CatalogAction::SelectCategory`]
    #[must_use]
    pub fn select_category(category: Option<&str>) -> Self {
        Self::SelectCategory {
            category: category.map(str::to_string),
        }
    }
}
