//! # Storefront Testing
//!
//! Testing utilities and helpers for the Storefront architecture.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - A Given-When-Then harness for reducers
//! - Helpers for awaiting store snapshots and resolving effects
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use storefront_testing::{helpers, test_clock};
//! use storefront_runtime::Store;
//!
//! #[tokio::test]
//! async fn refresh_loads_products() {
//!     let store = Store::new(CatalogState::default(), CatalogReducer, test_environment());
//!     let mut snapshots = store.subscribe();
//!
//!     store.send(CatalogAction::Refresh).await?;
//!
//!     let state = helpers::await_state(&mut snapshots, Duration::from_secs(1), |s| {
//!         !s.is_loading()
//!     })
//!     .await?;
//!     assert_eq!(state.items().len(), 3);
//! }
//! ```

use chrono::{DateTime, Utc};
use storefront_core::environment::Clock;


pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::{Mutex, PoisonError};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use storefront_testing::mocks::FixedClock;
    /// use storefront_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that tests move forward by hand
    ///
    /// ```
    /// use storefront_testing::mocks::ManualClock;
    /// use storefront_core::environment::Clock;
    /// use chrono::{Duration, Utc};
    ///
    /// let start = Utc::now();
    /// let clock = ManualClock::new(start);
    /// clock.advance(Duration::seconds(30));
    /// assert_eq!(clock.now(), start + Duration::seconds(30));
    /// ```
    #[derive(Debug)]
    pub struct ManualClock {
        time: Mutex<DateTime<Utc>>,
    }

    impl ManualClock {
        /// Create a clock reading `time`
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self {
                time: Mutex::new(time),
            }
        }

        /// Move the clock forward
        pub fn advance(&self, by: chrono::Duration) {
            let mut time = self.time.lock().unwrap_or_else(PoisonError::into_inner);
            *time += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.time.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Test helpers and utilities.
pub mod helpers {
    use std::time::Duration;
    use storefront_core::effect::Effect;
    use storefront_runtime::{StoreError, Subscription};

    /// Install a test tracing subscriber honouring `RUST_LOG`
    ///
    /// Output goes through the test writer, so it only shows for failing
    /// tests. Safe to call from every test.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    }

    /// Wait until the subscription yields a snapshot matching `predicate`
    ///
    /// # Errors
    ///
    /// - [`StoreError::Timeout`] if nothing matches within `timeout`
    /// - [`StoreError::Closed`] if the store is dropped first
    pub async fn await_state<S, F>(
        subscription: &mut Subscription<S>,
        timeout: Duration,
        predicate: F,
    ) -> Result<S, StoreError>
    where
        S: Clone,
        F: FnMut(&S) -> bool,
    {
        match tokio::time::timeout(timeout, subscription.wait_for(predicate)).await {
            Ok(Some(state)) => Ok(state),
            Ok(None) => Err(StoreError::Closed),
            Err(_) => Err(StoreError::Timeout),
        }
    }

    /// Run an effect without a store and collect the actions it produces
    ///
    /// Parallel children are run in order. Delays are honoured.
    pub async fn collect_actions<A: Send>(effect: Effect<A>) -> Vec<A> {
        let mut actions = Vec::new();
        let mut pending = vec![effect];

        // Depth-first, preserving declaration order
        while let Some(effect) = pending.pop() {
            match effect {
                Effect::None => {},
                Effect::Future(fut) => {
                    if let Some(action) = fut.await {
                        actions.push(action);
                    }
                },
                Effect::Delay { duration, action } => {
                    tokio::time::sleep(duration).await;
                    actions.push(*action);
                },
                Effect::Parallel(effects) | Effect::Sequential(effects) => {
                    pending.extend(effects.into_iter().rev());
                },
            }
        }

        actions
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, ManualClock, test_clock};
