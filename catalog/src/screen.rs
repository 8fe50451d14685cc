//! Text screens.
//!
//! Screens turn a snapshot into output and nothing else. They read the
//! state handed to them and never hold on to it.

use crate::state::{CatalogState, ViewMode};
use crate::types::Product;

/// Renders catalog snapshots
pub trait Screen {
    /// What one render produces
    type Output;

    /// Render `state`
    fn render(&self, state: &CatalogState) -> Self::Output;
}

/// `$12.50` style price
#[must_use]
pub fn format_price(price: f64) -> String {
    format!("${price:.2}")
}

/// Category key with its first letter upper-cased
#[must_use]
pub fn display_category(category: &str) -> String {
    let mut chars = category.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// The product grid with its category filter
#[derive(Clone, Debug)]
pub struct ProductListScreen {
    /// Products per row
    pub columns: usize,
}

impl Default for ProductListScreen {
    fn default() -> Self {
        Self { columns: 2 }
    }
}

impl ProductListScreen {
    fn filter_bar(state: &CatalogState) -> String {
        let chip = |label: &str, active: bool| {
            if active {
                format!("[{label}]")
            } else {
                format!(" {label} ")
            }
        };

        let mut bar = chip("All", state.selected_category().is_none());
        for category in state.categories() {
            bar.push(' ');
            bar.push_str(&chip(
                &display_category(category),
                state.selected_category() == Some(category.as_str()),
            ));
        }
        bar
    }

    fn cell(product: &Product) -> String {
        format!(
            "#{} {} {} ({:.1}*, {} reviews)",
            product.id,
            product.title,
            format_price(product.price),
            product.rating.rate,
            product.rating.count
        )
    }
}

impl Screen for ProductListScreen {
    type Output = String;

    fn render(&self, state: &CatalogState) -> String {
        match state.mode() {
            ViewMode::InitialLoading => return "Loading products...\n".to_string(),
            ViewMode::ErrorEmpty => {
                let message = state.error().unwrap_or("An error occurred");
                return format!("{message}\n[Retry]\n");
            },
            ViewMode::Loaded | ViewMode::ErrorStale => {},
        }

        let mut out = String::new();
        if state.is_refreshing() {
            out.push_str("Refreshing...\n");
        }
        if let Some(error) = state.error() {
            out.push_str(&format!("Refresh failed: {error}\n"));
        }
        out.push_str(&Self::filter_bar(state));
        out.push('\n');

        if state.visible_items().is_empty() {
            out.push_str("No products\n");
            return out;
        }

        for row in state.visible_items().chunks(self.columns.max(1)) {
            let cells: Vec<String> = row.iter().map(Self::cell).collect();
            out.push_str(&cells.join(" | "));
            out.push('\n');
        }
        out
    }
}

/// Detail view of the selected product
///
/// Renders `None` when nothing is selected.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProductDetailScreen;

impl Screen for ProductDetailScreen {
    type Output = Option<String>;

    fn render(&self, state: &CatalogState) -> Option<String> {
        let product = state.selected_product()?;

        Some(format!(
            "{title}\n{price}\nImage: {image}\nRating: {rate} ({count} reviews)\nDescription: {description}\nCategory: {category}\n",
            title = product.title,
            price = format_price(product.price),
            image = product.image_url,
            rate = product.rating.rate,
            count = product.rating.count,
            description = product.description,
            category = display_category(&product.category),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::product;

    #[test]
    fn prices_have_two_decimals() {
        assert_eq!(format_price(109.95), "$109.95");
        assert_eq!(format_price(7.0), "$7.00");
    }

    #[test]
    fn categories_are_capitalised() {
        assert_eq!(display_category("men's clothing"), "Men's clothing");
        assert_eq!(display_category("électronique"), "Électronique");
        assert_eq!(display_category(""), "");
    }

    #[test]
    fn loading_and_error_screens() {
        let mut state = CatalogState::new();
        state.begin_loading();
        assert_eq!(ProductListScreen::default().render(&state), "Loading products...\n");

        state.fail_loading("Network error: offline".to_string());
        assert_eq!(
            ProductListScreen::default().render(&state),
            "Network error: offline\n[Retry]\n"
        );
    }

    #[test]
    fn grid_marks_selected_category() {
        let mut state = CatalogState::with_products(vec![
            product(1, "books"),
            product(2, "games"),
            product(3, "books"),
        ]);
        state.select_category(Some("books".to_string()));

        let out = ProductListScreen { columns: 1 }.render(&state);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], " All  [Books]  Games ");
        assert!(lines[1].starts_with("#1 Product 1"));
        assert!(lines[2].starts_with("#3 Product 3"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn stale_error_is_shown_above_grid() {
        let mut state = CatalogState::with_products(vec![product(1, "a")]);
        state.begin_loading();
        assert!(ProductListScreen::default().render(&state).starts_with("Refreshing..."));

        state.fail_loading("Network error: timeout".to_string());
        let out = ProductListScreen::default().render(&state);
        assert!(out.starts_with("Refresh failed: Network error: timeout\n"));
        assert!(out.contains("#1 Product 1"));
    }

    #[test]
    fn empty_filter_result() {
        let mut state = CatalogState::with_products(vec![product(1, "a")]);
        state.select_category(Some("b".to_string()));
        assert!(ProductListScreen::default().render(&state).ends_with("No products\n"));
    }

    #[test]
    fn detail_renders_selection_only() {
        let mut state = CatalogState::with_products(vec![product(4, "jewelery")]);
        assert_eq!(ProductDetailScreen.render(&state), None);

        state.select_product(product(4, "jewelery"));
        let out = ProductDetailScreen.render(&state).unwrap();
        assert!(out.starts_with("Product 4\n$4.99\n"));
        assert!(out.contains("Category: Jewelery\n"));
        assert_eq!(
            out.lines().collect::<Vec<_>>()[2..5],
            [
                "Image: https://img.example/4.jpg",
                "Rating: 4 (10 reviews)",
                "Description: Description of product 4",
            ]
        );
    }
}
