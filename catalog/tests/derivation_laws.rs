//! Property tests for the derived catalog views
//!
//! Whatever products arrive and whichever category is selected, the grouped
//! and filtered views must agree with the fetched list.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use catalog::mocks::{ScriptedFetcher, product};
use catalog::{CatalogAction, CatalogEnvironment, CatalogReducer, CatalogState, Product};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use storefront_core::reducer::Reducer;
use storefront_testing::test_clock;

const CATEGORIES: [&str; 4] = ["books", "games", "jewelery", "music"];

fn env() -> CatalogEnvironment {
    CatalogEnvironment::new(Arc::new(ScriptedFetcher::new()), Arc::new(test_clock()))
}

/// Products with unique ids in a random order, drawn from a few categories
fn catalogs() -> impl Strategy<Value = Vec<Product>> {
    prop::collection::btree_map(0_i64..500, 0..CATEGORIES.len(), 0..24).prop_flat_map(|picks| {
        let products: Vec<Product> = picks
            .into_iter()
            .map(|(id, category)| product(id, CATEGORIES[category]))
            .collect();
        Just(products).prop_shuffle()
    })
}

fn selection() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::sample::select(vec!["books", "games", "jewelery", "music", "toys"]))
        .prop_map(|category| category.map(str::to_string))
}

fn apply(state: &mut CatalogState, actions: Vec<CatalogAction>) {
    let env = env();
    let reducer = CatalogReducer::new();
    for action in actions {
        // None of these actions reach the network
        assert!(reducer.reduce(state, action, &env).is_empty());
    }
}

fn loaded(products: Vec<Product>, category: Option<String>) -> CatalogState {
    let mut state = CatalogState::new();
    apply(
        &mut state,
        vec![
            CatalogAction::SelectCategory { category },
            CatalogAction::ProductsLoaded { products },
        ],
    );
    state
}

proptest! {
    #[test]
    fn visible_items_follow_the_filter(products in catalogs(), category in selection()) {
        let state = loaded(products.clone(), category.clone());

        let expected: Vec<Product> = products
            .iter()
            .filter(|p| category.as_deref().is_none_or(|c| p.is_in(c)))
            .cloned()
            .collect();
        prop_assert_eq!(state.visible_items(), expected.as_slice());
    }

    #[test]
    fn groups_partition_the_items(products in catalogs()) {
        let state = loaded(products.clone(), None);

        let total: usize = state.items_by_category().values().map(Vec::len).sum();
        prop_assert_eq!(total, products.len());

        for (category, group) in state.items_by_category() {
            prop_assert!(!group.is_empty());
            prop_assert!(group.iter().all(|p| p.is_in(category)));

            // Each group keeps fetch order
            let order: Vec<usize> = group
                .iter()
                .map(|p| products.iter().position(|q| q.id == p.id).unwrap())
                .collect();
            prop_assert!(order.windows(2).all(|pair| pair[0] < pair[1]));
        }
    }

    #[test]
    fn categories_are_sorted_and_distinct(products in catalogs()) {
        let state = loaded(products.clone(), None);

        let expected: Vec<String> = products
            .iter()
            .map(|p| p.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        prop_assert_eq!(state.categories(), expected.as_slice());
    }

    #[test]
    fn selecting_a_category_twice_changes_nothing(
        products in catalogs(),
        category in selection(),
    ) {
        let mut state = loaded(products, None);
        apply(&mut state, vec![CatalogAction::SelectCategory { category: category.clone() }]);
        let once = state.clone();

        apply(&mut state, vec![CatalogAction::SelectCategory { category }]);
        prop_assert_eq!(state, once);
    }

    #[test]
    fn selection_round_trip_restores_state(products in catalogs(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!products.is_empty());
        let state = loaded(products.clone(), None);
        let chosen = products[pick.index(products.len())].clone();

        let mut after = state.clone();
        apply(
            &mut after,
            vec![
                CatalogAction::SelectProduct { product: chosen },
                CatalogAction::ClearSelection,
            ],
        );
        prop_assert_eq!(after, state);
    }

    #[test]
    fn filter_survives_reload(
        first in catalogs(),
        second in catalogs(),
        category in selection(),
    ) {
        let mut state = loaded(first, category.clone());
        apply(&mut state, vec![CatalogAction::ProductsLoaded { products: second.clone() }]);

        prop_assert_eq!(state.selected_category(), category.as_deref());
        let expected: Vec<Product> = second
            .into_iter()
            .filter(|p| category.as_deref().is_none_or(|c| p.is_in(c)))
            .collect();
        prop_assert_eq!(state.visible_items(), expected.as_slice());
    }
}

#[test]
fn empty_catalog_has_no_categories() {
    let state = loaded(Vec::new(), Some("books".to_string()));

    assert!(state.items().is_empty());
    assert!(state.categories().is_empty());
    assert!(state.visible_items().is_empty());
    assert!(state.products_in("books").is_empty());
}
