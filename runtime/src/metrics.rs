//! Metrics recorded by the Store runtime.
//!
//! The runtime only talks to the [`metrics`] facade. Nothing is exported
//! unless the host application installs a recorder; without one every
//! counter and histogram below is a no-op.
//!
//! # Example
//!
//! ```ignore
//! // Once, after installing a recorder
//! storefront_runtime::metrics::describe_metrics();
//! ```

use metrics::{describe_counter, describe_histogram};

/// Metric names recorded by the Store
pub mod names {
    /// Actions accepted and reduced
    pub const ACTIONS_TOTAL: &str = "store_actions_total";
    /// Actions rejected because the store was cancelled
    pub const ACTIONS_REJECTED: &str = "store_actions_rejected_total";
    /// Time spent inside `Reducer::reduce`
    pub const REDUCER_DURATION: &str = "store_reducer_duration_seconds";
    /// Effects started, labelled by `type`
    pub const EFFECTS_EXECUTED: &str = "store_effects_executed_total";
    /// Effects dropped by cancellation before completing
    pub const EFFECTS_CANCELLED: &str = "store_effects_cancelled_total";
    /// Snapshots published to subscribers
    pub const SNAPSHOTS_PUBLISHED: &str = "store_snapshots_published_total";
    /// Subscriptions opened
    pub const SUBSCRIPTIONS_OPENED: &str = "store_subscriptions_opened_total";
    /// Stores cancelled or shut down
    pub const SHUTDOWN_INITIATED: &str = "store_shutdown_initiated_total";
    /// Shutdowns that drained every effect in time
    pub const SHUTDOWN_COMPLETED: &str = "store_shutdown_completed_total";
    /// Shutdowns that gave up with effects still running
    pub const SHUTDOWN_TIMEOUT: &str = "store_shutdown_timeout_total";
}

/// Register descriptions for every Store metric.
///
/// Call once after installing a metrics recorder. Safe to call again.
pub fn describe_metrics() {
    describe_counter!(
        names::ACTIONS_TOTAL,
        "Total number of actions reduced by stores"
    );
    describe_counter!(
        names::ACTIONS_REJECTED,
        "Total number of actions rejected by cancelled stores"
    );
    describe_histogram!(
        names::REDUCER_DURATION,
        "Time taken to execute reducers"
    );

    describe_counter!(
        names::EFFECTS_EXECUTED,
        "Total number of effects executed"
    );
    describe_counter!(
        names::EFFECTS_CANCELLED,
        "Total number of effects dropped by store cancellation"
    );

    describe_counter!(
        names::SNAPSHOTS_PUBLISHED,
        "Total number of state snapshots published"
    );
    describe_counter!(
        names::SUBSCRIPTIONS_OPENED,
        "Total number of snapshot subscriptions opened"
    );

    describe_counter!(
        names::SHUTDOWN_INITIATED,
        "Total number of stores cancelled"
    );
    describe_counter!(
        names::SHUTDOWN_COMPLETED,
        "Total number of shutdowns that completed in time"
    );
    describe_counter!(
        names::SHUTDOWN_TIMEOUT,
        "Total number of shutdowns that timed out"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_without_recorder_is_noop() {
        describe_metrics();
        describe_metrics();
    }

    #[test]
    fn names_share_store_prefix() {
        for name in [
            names::ACTIONS_TOTAL,
            names::ACTIONS_REJECTED,
            names::REDUCER_DURATION,
            names::EFFECTS_EXECUTED,
            names::EFFECTS_CANCELLED,
            names::SNAPSHOTS_PUBLISHED,
            names::SUBSCRIPTIONS_OPENED,
            names::SHUTDOWN_INITIATED,
            names::SHUTDOWN_COMPLETED,
            names::SHUTDOWN_TIMEOUT,
        ] {
            assert!(name.starts_with("store_"), "{name}");
        }
    }
}
