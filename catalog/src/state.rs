//! View state for the catalog.
//!
//! [`CatalogState`] is the single root a session owns. Its derived fields
//! (grouping, category list, visible products) are private and rebuilt from
//! `items` and `selected_category` on every mutation, so they cannot drift.
//! Only the reducer mutates it.

use crate::types::{Product, ProductId};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// What happens to the open product when a refresh succeeds
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StaleSelection {
    /// Leave the selection untouched, even if the product is gone
    #[default]
    Keep,
    /// Replace it with the same-id product from the new snapshot if present
    Reread,
    /// Like `Reread`, but clear it when the product is gone
    Close,
}

impl StaleSelection {
    /// Lowercase name, as accepted by `FromStr`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Reread => "reread",
            Self::Close => "close",
        }
    }
}

impl fmt::Display for StaleSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised [`StaleSelection`] name
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown stale selection policy {0:?}, expected keep, reread or close")]
pub struct ParseStaleSelectionError(String);

impl FromStr for StaleSelection {
    type Err = ParseStaleSelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "keep" => Ok(Self::Keep),
            "reread" => Ok(Self::Reread),
            "close" => Ok(Self::Close),
            _ => Err(ParseStaleSelectionError(s.to_string())),
        }
    }
}

/// The four modes a screen distinguishes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewMode {
    /// First fetch in flight, nothing to show yet
    InitialLoading,
    /// Products (possibly none) and no error; a refresh may be in flight
    Loaded,
    /// Fetch failed and there is nothing to show
    ErrorEmpty,
    /// A refresh failed; the previous products are still shown
    ErrorStale,
}

/// Navigation target implied by the selection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// The product grid
    ProductList,
    /// Detail view of one product
    ProductDetail(ProductId),
}

impl Route {
    /// Route name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ProductList => "products_list",
            Self::ProductDetail(_) => "product_detail",
        }
    }
}

/// Catalog view state
///
/// Compare snapshots with `==`; the runtime publishes a new snapshot only
/// when it differs from the previous one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogState {
    is_loading: bool,
    items: Vec<Product>,
    by_category: BTreeMap<String, Vec<Product>>,
    categories: Vec<String>,
    selected_category: Option<String>,
    visible: Vec<Product>,
    selected_product: Option<Product>,
    error: Option<String>,
    last_loaded_at: Option<DateTime<Utc>>,
}

impl CatalogState {
    /// Empty state, as at session start
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// State holding `products` as if a fetch had just succeeded
    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        let mut state = Self {
            items: products,
            ..Self::default()
        };
        state.rederive();
        state
    }

    // ========== Queries ==========

    /// Whether a fetch is in flight
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Whether a fetch is in flight while products are already shown
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.is_loading && !self.items.is_empty()
    }

    /// Products from the last successful fetch, in fetch order
    #[must_use]
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    /// Products grouped by category, each group in fetch order
    #[must_use]
    pub const fn items_by_category(&self) -> &BTreeMap<String, Vec<Product>> {
        &self.by_category
    }

    /// Products of one category (empty if unknown)
    #[must_use]
    pub fn products_in(&self, category: &str) -> &[Product] {
        self.by_category
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Distinct categories, ascending
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Active category filter, `None` for all products
    #[must_use]
    pub fn selected_category(&self) -> Option<&str> {
        self.selected_category.as_deref()
    }

    /// Products passing the category filter, in fetch order
    #[must_use]
    pub fn visible_items(&self) -> &[Product] {
        &self.visible
    }

    /// Product open in the detail view
    #[must_use]
    pub const fn selected_product(&self) -> Option<&Product> {
        self.selected_product.as_ref()
    }

    /// Message of the last failed fetch
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// When the last successful fetch completed
    #[must_use]
    pub const fn last_loaded_at(&self) -> Option<DateTime<Utc>> {
        self.last_loaded_at
    }

    /// Presentation mode
    #[must_use]
    pub fn mode(&self) -> ViewMode {
        match (self.is_loading, self.items.is_empty(), self.error.is_some()) {
            (true, true, _) => ViewMode::InitialLoading,
            (false, true, true) => ViewMode::ErrorEmpty,
            (false, false, true) => ViewMode::ErrorStale,
            _ => ViewMode::Loaded,
        }
    }

    /// Where navigation should be
    #[must_use]
    pub fn route(&self) -> Route {
        self.selected_product
            .as_ref()
            .map_or(Route::ProductList, |product| Route::ProductDetail(product.id))
    }

    // ========== Transitions ==========

    pub(crate) fn begin_loading(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    pub(crate) fn finish_loading(
        &mut self,
        products: Vec<Product>,
        loaded_at: DateTime<Utc>,
        policy: StaleSelection,
    ) {
        self.is_loading = false;
        self.error = None;
        self.items = products;
        self.last_loaded_at = Some(loaded_at);
        self.apply_stale_selection(policy);
        self.rederive();
    }

    pub(crate) fn fail_loading(&mut self, message: String) {
        self.is_loading = false;
        self.error = Some(message);
    }

    pub(crate) fn select_category(&mut self, category: Option<String>) {
        self.selected_category = category;
        self.rederive_visible();
    }

    pub(crate) fn select_product(&mut self, product: Product) {
        self.selected_product = Some(product);
    }

    pub(crate) fn clear_selection(&mut self) {
        self.selected_product = None;
    }

    fn apply_stale_selection(&mut self, policy: StaleSelection) {
        if policy == StaleSelection::Keep {
            return;
        }
        let Some(id) = self.selected_product.as_ref().map(|product| product.id) else {
            return;
        };

        match self.items.iter().find(|product| product.id == id) {
            Some(fresh) => self.selected_product = Some(fresh.clone()),
            None if policy == StaleSelection::Close => self.selected_product = None,
            None => {},
        }
    }

    fn rederive(&mut self) {
        let mut by_category: BTreeMap<String, Vec<Product>> = BTreeMap::new();
        for product in &self.items {
            by_category
                .entry(product.category.clone())
                .or_default()
                .push(product.clone());
        }
        self.categories = by_category.keys().cloned().collect();
        self.by_category = by_category;
        self.rederive_visible();
    }

    fn rederive_visible(&mut self) {
        self.visible = match &self.selected_category {
            None => self.items.clone(),
            Some(category) => self.products_in(category).to_vec(),
        };
    }
}
