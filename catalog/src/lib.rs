//! Product catalog built on the Storefront runtime.
//!
//! Fetches a product catalog from a remote source, groups it by category,
//! filters it by the selected category and tracks the product open in the
//! detail view. All of it lives in one [`CatalogState`] owned by a
//! [`CatalogViewModel`]; screens subscribe to its snapshots and invoke
//! intents.
//!
//! - Domain types ([`Product`], [`Rating`])
//! - Fetch port ([`ProductFetcher`]) with an HTTP adapter
//! - Mapping layer from the wire format
//! - Reducer with a single in-flight fetch
//! - Text screens for the list and detail views
//!
//! # Quick Start
//!
//! ```no_run
//! use catalog::{CatalogEnvironment, CatalogViewModel, HttpProductFetcher};
//! use std::sync::Arc;
//! use std::time::Duration;
//! use storefront_core::environment::SystemClock;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let fetcher = HttpProductFetcher::new(
//!     "https://fakestoreapi.com",
//!     Duration::from_secs(30),
//!     "catalog-example",
//! )?;
//! let env = CatalogEnvironment::new(Arc::new(fetcher), Arc::new(SystemClock));
//!
//! let view_model = CatalogViewModel::start(env).await?;
//! let mut snapshots = view_model.subscribe();
//! let state = snapshots.wait_for(|s| !s.is_loading()).await;
//!
//! if let Some(state) = state {
//!     println!("{} products in {} categories", state.items().len(), state.categories().len());
//! }
//! view_model.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod config;
pub mod dto;
pub mod error;
pub mod fetcher;
pub mod mapper;
pub mod mocks;
pub mod reducer;
pub mod screen;
pub mod state;
pub mod types;
pub mod view_model;

// Re-export commonly used types
pub use action::CatalogAction;
pub use config::Config;
pub use error::{ConfigError, FetchError, FetchErrorKind};
pub use fetcher::{HttpProductFetcher, ProductFetcher};
pub use reducer::{CatalogEnvironment, CatalogReducer};
pub use screen::{ProductDetailScreen, ProductListScreen, Screen};
pub use state::{CatalogState, Route, StaleSelection, ViewMode};
pub use types::{Product, ProductId, Rating};
pub use view_model::{CatalogStore, CatalogViewModel};
