//! # Storefront Runtime
//!
//! Runtime implementation for the Storefront architecture.
//!
//! This crate provides the [`Store`]: the single owner of a view-state root.
//! It serializes every action through the reducer, publishes each resulting
//! snapshot to subscribers, and executes the effects the reducer describes.
//!
//! ## Core Components
//!
//! - **Store**: Owns the state, runs the reducer, executes effects
//! - **Subscription**: Observes snapshots (current value first, then every change)
//! - **Effect Handle**: Awaits completion of the effects started by one action
//!
//! ## Example
//!
//! ```ignore
//! use storefront_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//! let mut snapshots = store.subscribe();
//!
//! // Send an action
//! store.send(Action::Refresh).await?;
//!
//! // Observe the result
//! let state = snapshots.wait_for(|s| !s.is_loading()).await;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use storefront_core::{effect::Effect, reducer::Reducer};
use tokio::sync::{RwLock, watch};

/// Metric names and descriptions recorded by the Store
pub mod metrics;

/// Snapshot subscriptions
pub mod subscription;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// Returned by `send()` once `cancel()` or `shutdown()` has been called.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for effects or for a matching snapshot
        #[error("Timeout waiting for store")]
        Timeout,

        /// The store was dropped while a subscriber was still waiting
        #[error("Store closed")]
        Closed,
    }
}

pub use error::StoreError;
pub use subscription::Subscription;

/// Configuration for Store instances
///
/// # Example
///
/// ```ignore
/// let config = StoreConfig::default()
///     .with_shutdown_timeout(Duration::from_secs(2));
///
/// let store = Store::with_config(state, reducer, env, config);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Default timeout for graceful shutdown
    pub default_shutdown_timeout: Duration,
}

impl StoreConfig {
    /// Create a new configuration
    #[must_use]
    pub const fn new(default_shutdown_timeout: Duration) -> Self {
        Self {
            default_shutdown_timeout,
        }
    }

    /// Set the default shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.default_shutdown_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            default_shutdown_timeout: Duration::from_secs(5),
        }
    }
}

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`]. Effects run in spawned tasks, so `send()`
/// returns as soon as the reducer has run; await the handle to know when the
/// effects started by that action (including the reducer pass for any action
/// they fed back) are done.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(Action::Refresh).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // The fetch has resolved and its result has been reduced
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a handle together with the tracking context used by the runtime
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: Arc::new(tx),
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (_tx, rx) = watch::channel(());

        Self {
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Whether every tracked effect has finished
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.effects.load(Ordering::SeqCst) == 0
    }

    /// Wait for all effects to complete
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                // Every tracking context is gone, nothing left to wait for
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all
    /// effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: tracking context shared by the effects of one action
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: Arc<watch::Sender<()>>,
}

impl EffectTracking {
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            // Counter reached zero, notify waiters
            self.notifier.send_replace(());
        }
    }
}

/// Internal: RAII guard that decrements the effect counter on drop
///
/// Runs on completion, on cancellation and if the effect panics.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Guard that decrements an atomic counter on drop (for shutdown tracking)
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Resolves once the cancellation flag flips to `true`
async fn cancelled(mut signal: watch::Receiver<bool>) {
    loop {
        if *signal.borrow_and_update() {
            return;
        }
        if signal.changed().await.is_err() {
            // Sender lives as long as the store; never cancel on its drop
            std::future::pending::<()>().await;
        }
    }
}

/// Store module - The runtime for reducers
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicCounterGuard, AtomicUsize, DecrementGuard, Duration, Effect,
        EffectHandle, EffectTracking, Ordering, Reducer, RwLock, StoreConfig, StoreError,
        Subscription, cancelled, metrics::names, watch,
    };
    use std::future::Future;
    use std::pin::Pin;

    /// The Store - single owner of a view-state root
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`; the reducer runs under the write lock, so
    ///    mutations are serialized)
    /// 2. Reducer (state transitions)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop and cancellation)
    /// 5. Snapshot publication (a `watch` channel holding the latest state)
    ///
    /// A snapshot is published while the write lock is still held, so
    /// subscribers only ever see complete states, in reducer order.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        config: StoreConfig,
        snapshots: Arc<watch::Sender<S>>,
        cancellation: Arc<watch::Sender<bool>>,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
        A: Send + 'static,
        S: Clone + PartialEq + Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        ///
        /// Uses [`StoreConfig::default()`].
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        #[must_use]
        pub fn with_config(
            initial_state: S,
            reducer: R,
            environment: E,
            config: StoreConfig,
        ) -> Self {
            let (snapshots, _) = watch::channel(initial_state.clone());
            let (cancellation, _) = watch::channel(false);

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                config,
                snapshots: Arc::new(snapshots),
                cancellation: Arc::new(cancellation),
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// The configuration this store was built with
        #[must_use]
        pub const fn config(&self) -> &StoreConfig {
            &self.config
        }

        /// Send an action to the store
        ///
        /// 1. Acquires the write lock on state
        /// 2. Calls the reducer with (state, action, environment)
        /// 3. Publishes the new snapshot if the state changed
        /// 4. Spawns the returned effects; their actions are fed back here
        ///
        /// `send()` returns after the reducer has run, not after the effects
        /// complete. Use the returned [`EffectHandle`] to wait for them.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store has been
        /// cancelled or is shutting down. The action is not reduced.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
            let (handle, tracking) = EffectHandle::new();

            let effects = {
                let mut state = self.state.write().await;
                tracing::trace!("Acquired write lock on state");

                // Checked under the lock so no action lands after cancel()
                if self.shutdown.load(Ordering::Acquire) {
                    tracing::debug!("Rejected action: store is shutting down");
                    metrics::counter!(names::ACTIONS_REJECTED).increment(1);
                    return Err(StoreError::ShutdownInProgress);
                }

                metrics::counter!(names::ACTIONS_TOTAL).increment(1);

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut state, action, &self.environment);
                metrics::histogram!(names::REDUCER_DURATION)
                    .record(start.elapsed().as_secs_f64());

                tracing::trace!("Reducer completed, returned {} effects", effects.len());

                self.publish(&state);
                effects
            };

            for effect in effects {
                self.execute_effect(effect, &tracking);
            }

            Ok(handle)
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let count = store.state(|s| s.items().len()).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&state)
        }

        /// The most recently published snapshot
        #[must_use]
        pub fn snapshot(&self) -> S {
            self.snapshots.borrow().clone()
        }

        /// Subscribe to snapshots
        ///
        /// The subscription yields the current snapshot first, then one
        /// snapshot per change. A slow subscriber skips intermediate
        /// snapshots and sees the latest one.
        #[must_use]
        pub fn subscribe(&self) -> Subscription<S> {
            metrics::counter!(names::SUBSCRIPTIONS_OPENED).increment(1);
            Subscription::new(self.snapshots.subscribe())
        }

        /// Number of live subscriptions
        #[must_use]
        pub fn subscriber_count(&self) -> usize {
            self.snapshots.receiver_count()
        }

        /// Stop the store immediately
        ///
        /// Every in-flight effect is dropped at its next suspension point and
        /// its result is never reduced. Subsequent `send()` calls fail with
        /// [`StoreError::ShutdownInProgress`]. Idempotent.
        pub fn cancel(&self) {
            if !self.shutdown.swap(true, Ordering::AcqRel) {
                tracing::info!(
                    pending_effects = self.pending_effects.load(Ordering::Acquire),
                    "Store cancelled, dropping in-flight effects"
                );
                metrics::counter!(names::SHUTDOWN_INITIATED).increment(1);
            }
            self.cancellation.send_replace(true);
        }

        /// Whether `cancel()` or `shutdown()` has been called
        #[must_use]
        pub fn is_shut_down(&self) -> bool {
            self.shutdown.load(Ordering::Acquire)
        }

        /// Number of effects currently running
        #[must_use]
        pub fn pending_effects(&self) -> usize {
            self.pending_effects.load(Ordering::Acquire)
        }

        /// Cancel the store and wait for its effect tasks to wind down
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if effect tasks are still
        /// running when the timeout elapses.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            self.cancel();

            let start = std::time::Instant::now();
            let poll_interval = Duration::from_millis(10);

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);

                if pending == 0 {
                    tracing::info!("All effects stopped, shutdown complete");
                    metrics::counter!(names::SHUTDOWN_COMPLETED).increment(1);
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(
                        pending_effects = pending,
                        "Shutdown timeout: {} effects still running",
                        pending
                    );
                    metrics::counter!(names::SHUTDOWN_TIMEOUT).increment(1);
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Shut down using [`StoreConfig::default_shutdown_timeout`]
        ///
        /// # Errors
        ///
        /// See [`Store::shutdown`].
        pub async fn shutdown_gracefully(&self) -> Result<(), StoreError> {
            self.shutdown(self.config.default_shutdown_timeout).await
        }

        fn publish(&self, state: &S) {
            let changed = self.snapshots.send_if_modified(|current| {
                if current == state {
                    false
                } else {
                    current.clone_from(state);
                    true
                }
            });

            if changed {
                metrics::counter!(names::SNAPSHOTS_PUBLISHED).increment(1);
                tracing::trace!("Published snapshot");
            } else {
                tracing::trace!("State unchanged, no snapshot published");
            }
        }

        /// Spawn an effect under the store's cancellation signal
        fn execute_effect(&self, effect: Effect<A>, tracking: &EffectTracking) {
            if effect.is_none() {
                metrics::counter!(names::EFFECTS_EXECUTED, "type" => "none").increment(1);
                return;
            }

            tracking.increment();
            let effect_guard = DecrementGuard(tracking.clone());

            self.pending_effects.fetch_add(1, Ordering::SeqCst);
            let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

            let signal = self.cancellation.subscribe();
            let store = self.clone();

            tokio::spawn(async move {
                let _effect_guard = effect_guard;
                let _pending_guard = pending_guard;

                tokio::select! {
                    () = store.run_effect(effect) => {
                        tracing::trace!("Effect completed");
                    }
                    () = cancelled(signal) => {
                        metrics::counter!(names::EFFECTS_CANCELLED).increment(1);
                        tracing::debug!("Effect dropped by store cancellation");
                    }
                }
            });
        }

        /// Run an effect to completion, feeding produced actions back
        fn run_effect(&self, effect: Effect<A>) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
            Box::pin(async move {
                match effect {
                    Effect::None => {},
                    Effect::Future(fut) => {
                        metrics::counter!(names::EFFECTS_EXECUTED, "type" => "future")
                            .increment(1);
                        if let Some(action) = fut.await {
                            self.feed_back(action).await;
                        } else {
                            tracing::trace!("Effect::Future completed with no action");
                        }
                    },
                    Effect::Delay { duration, action } => {
                        metrics::counter!(names::EFFECTS_EXECUTED, "type" => "delay")
                            .increment(1);
                        tokio::time::sleep(duration).await;
                        self.feed_back(*action).await;
                    },
                    Effect::Parallel(effects) => {
                        metrics::counter!(names::EFFECTS_EXECUTED, "type" => "parallel")
                            .increment(1);
                        futures::future::join_all(
                            effects.into_iter().map(|effect| self.run_effect(effect)),
                        )
                        .await;
                    },
                    Effect::Sequential(effects) => {
                        metrics::counter!(names::EFFECTS_EXECUTED, "type" => "sequential")
                            .increment(1);
                        for effect in effects {
                            self.run_effect(effect).await;
                        }
                    },
                }
            })
        }

        async fn feed_back(&self, action: A) {
            if let Err(error) = self.send(action).await {
                tracing::debug!(%error, "Dropped action produced by effect");
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                config: self.config.clone(),
                snapshots: Arc::clone(&self.snapshots),
                cancellation: Arc::clone(&self.cancellation),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;
