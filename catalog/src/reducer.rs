//! Reducer logic for the catalog.
//!
//! Fetch intents start at most one fetch at a time: a `Load` or `Refresh`
//! that arrives while a fetch is in flight is ignored, with no effect and no
//! state change. The fetch result comes back as `ProductsLoaded` or
//! `LoadFailed`. Category and product selection never wait on the network.

use crate::action::CatalogAction;
use crate::error::FetchError;
use crate::fetcher::ProductFetcher;
use crate::state::{CatalogState, StaleSelection};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use storefront_core::{SmallVec, effect::Effect, environment::Clock, reducer::Reducer, smallvec};

/// Environment dependencies for the catalog reducer
#[derive(Clone)]
pub struct CatalogEnvironment {
    /// Source of products
    pub fetcher: Arc<dyn ProductFetcher>,
    /// Clock for load timestamps
    pub clock: Arc<dyn Clock>,
    /// What a successful refresh does to the open product
    pub stale_selection: StaleSelection,
}

impl CatalogEnvironment {
    /// Creates a new `CatalogEnvironment` with the default selection policy
    #[must_use]
    pub fn new(fetcher: Arc<dyn ProductFetcher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            fetcher,
            clock,
            stale_selection: StaleSelection::default(),
        }
    }

    /// Use a different stale selection policy
    #[must_use]
    pub fn with_stale_selection(mut self, policy: StaleSelection) -> Self {
        self.stale_selection = policy;
        self
    }
}

impl std::fmt::Debug for CatalogEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogEnvironment")
            .field("stale_selection", &self.stale_selection)
            .finish_non_exhaustive()
    }
}

/// Reducer for the catalog view state
#[derive(Clone, Debug, Default)]
pub struct CatalogReducer;

impl CatalogReducer {
    /// Creates a new `CatalogReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Effect running one fetch and reporting its outcome as an action
    ///
    /// A panicking fetcher is reported as `LoadFailed`, so the in-flight
    /// flag is always cleared.
    fn fetch(env: &CatalogEnvironment) -> Effect<CatalogAction> {
        let fetcher = Arc::clone(&env.fetcher);
        Effect::future(async move {
            let outcome = AssertUnwindSafe(async { fetcher.fetch_all().await })
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(FetchError::Unknown(panic_message(&*payload))));

            let action = match outcome {
                Ok(products) => CatalogAction::ProductsLoaded { products },
                Err(error) => {
                    tracing::warn!(kind = %error.kind(), %error, "Catalog fetch failed");
                    CatalogAction::LoadFailed {
                        message: error.to_string(),
                    }
                },
            };
            Some(action)
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned());

    match detail {
        Some(detail) => format!("Product fetch panicked: {detail}"),
        None => "Product fetch panicked".to_string(),
    }
}

impl Reducer for CatalogReducer {
    type State = CatalogState;
    type Action = CatalogAction;
    type Environment = CatalogEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Intents ==========
            CatalogAction::Load | CatalogAction::Refresh => {
                if state.is_loading() {
                    tracing::debug!(?action, "Fetch already in flight, ignoring");
                    return SmallVec::new();
                }

                tracing::debug!(?action, refreshing = !state.items().is_empty(), "Starting fetch");
                state.begin_loading();
                smallvec![Self::fetch(env)]
            },

            CatalogAction::SelectCategory { category } => {
                state.select_category(category);
                SmallVec::new()
            },

            CatalogAction::SelectProduct { product } => {
                tracing::trace!(id = %product.id, "Product selected");
                state.select_product(product);
                SmallVec::new()
            },

            CatalogAction::ClearSelection => {
                state.clear_selection();
                SmallVec::new()
            },

            // ========== Fetch results ==========
            CatalogAction::ProductsLoaded { products } => {
                tracing::info!(count = products.len(), "Catalog loaded");
                state.finish_loading(products, env.clock.now(), env.stale_selection);
                SmallVec::new()
            },

            CatalogAction::LoadFailed { message } => {
                tracing::info!(
                    error = %message,
                    stale_items = state.items().len(),
                    "Catalog load failed"
                );
                state.fail_loading(message);
                SmallVec::new()
            },
        }
    }
}
