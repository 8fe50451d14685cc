//! Presentation contract for catalog screens.
//!
//! A screen holds a [`CatalogViewModel`], subscribes to its snapshots and
//! invokes intents. It never mutates state. Every intent is safe to repeat:
//! a second refresh while one is in flight is ignored, and selecting the
//! same category twice yields the same snapshot.

use crate::action::CatalogAction;
use crate::reducer::{CatalogEnvironment, CatalogReducer};
use crate::state::CatalogState;
use crate::types::Product;
use std::time::Duration;
use storefront_runtime::{EffectHandle, Store, StoreConfig, StoreError, Subscription};

/// Store specialised to the catalog
pub type CatalogStore = Store<CatalogState, CatalogAction, CatalogEnvironment, CatalogReducer>;

/// Session-scoped owner of the catalog view state
///
/// Dropping the view model ends the session: in-flight fetches are
/// cancelled and their results never reach the state.
///
/// # Example
///
/// ```ignore
/// let view_model = CatalogViewModel::start(env).await?;
/// let mut snapshots = view_model.subscribe();
///
/// while let Some(state) = snapshots.next().await {
///     render(&state);
/// }
/// ```
pub struct CatalogViewModel {
    store: CatalogStore,
}

impl CatalogViewModel {
    /// Create a view model with empty state, without loading
    #[must_use]
    pub fn new(env: CatalogEnvironment) -> Self {
        Self::with_config(env, StoreConfig::default())
    }

    /// Like [`CatalogViewModel::new`] with explicit store settings
    #[must_use]
    pub fn with_config(env: CatalogEnvironment, config: StoreConfig) -> Self {
        Self::from_state(CatalogState::new(), env, config)
    }

    /// Resume from an existing snapshot
    #[must_use]
    pub fn from_state(state: CatalogState, env: CatalogEnvironment, config: StoreConfig) -> Self {
        Self {
            store: Store::with_config(state, CatalogReducer::new(), env, config),
        }
    }

    /// Create a view model and issue the initial load
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] only if the store refuses the load, which a
    /// fresh store never does.
    pub async fn start(env: CatalogEnvironment) -> Result<Self, StoreError> {
        let view_model = Self::new(env);
        view_model.load().await?;
        Ok(view_model)
    }

    // ========== Intents ==========

    /// Fetch the catalog; ignored while a fetch is in flight
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`CatalogViewModel::close`].
    pub async fn load(&self) -> Result<EffectHandle, StoreError> {
        self.store.send(CatalogAction::Load).await
    }

    /// Fetch the catalog again; ignored while a fetch is in flight
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`CatalogViewModel::close`].
    pub async fn refresh(&self) -> Result<EffectHandle, StoreError> {
        self.store.send(CatalogAction::Refresh).await
    }

    /// Filter by `category`, or show everything with `None`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`CatalogViewModel::close`].
    pub async fn select_category(&self, category: Option<&str>) -> Result<(), StoreError> {
        self.store
            .send(CatalogAction::select_category(category))
            .await
            .map(drop)
    }

    /// Open `product` in the detail view
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`CatalogViewModel::close`].
    pub async fn select_product(&self, product: Product) -> Result<(), StoreError> {
        self.store
            .send(CatalogAction::SelectProduct { product })
            .await
            .map(drop)
    }

    /// Close the detail view
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownInProgress`] after [`CatalogViewModel::close`].
    pub async fn clear_selection(&self) -> Result<(), StoreError> {
        self.store.send(CatalogAction::ClearSelection).await.map(drop)
    }

    // ========== Observation ==========

    /// Subscribe to snapshots, starting with the current one
    #[must_use]
    pub fn subscribe(&self) -> Subscription<CatalogState> {
        self.store.subscribe()
    }

    /// The current snapshot
    #[must_use]
    pub fn snapshot(&self) -> CatalogState {
        self.store.snapshot()
    }

    /// The underlying store
    #[must_use]
    pub const fn store(&self) -> &CatalogStore {
        &self.store
    }

    // ========== Teardown ==========

    /// End the session, waiting up to the configured shutdown timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if effect tasks outlive the timeout.
    pub async fn close(self) -> Result<(), StoreError> {
        self.store.shutdown_gracefully().await
    }

    /// End the session, waiting up to `timeout`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ShutdownTimeout`] if effect tasks outlive the timeout.
    pub async fn close_with_timeout(self, timeout: Duration) -> Result<(), StoreError> {
        self.store.shutdown(timeout).await
    }

    /// Whether the session has ended
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.store.is_shut_down()
    }
}

impl Drop for CatalogViewModel {
    fn drop(&mut self) {
        self.store.cancel();
    }
}

impl std::fmt::Debug for CatalogViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogViewModel")
            .field("closed", &self.is_closed())
            .field("pending_effects", &self.store.pending_effects())
            .finish_non_exhaustive()
    }
}
