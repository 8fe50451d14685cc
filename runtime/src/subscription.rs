//! Snapshot subscriptions.
//!
//! A [`Subscription`] observes the snapshots published by a
//! [`Store`](crate::Store). It delivers the snapshot current at the time of
//! the first read, then one snapshot per change. Snapshots are whole states,
//! never partial ones, and arrive in the order the reducer produced them.
//! A subscriber that falls behind skips straight to the latest snapshot.

use futures::Stream;
use tokio::sync::watch;

/// Observer of a store's snapshots
///
/// Dropping the subscription (or calling [`Subscription::unsubscribe`])
/// stops delivery. Other subscribers are unaffected.
#[derive(Debug)]
pub struct Subscription<S> {
    receiver: watch::Receiver<S>,
    delivered_current: bool,
}

impl<S> Subscription<S>
where
    S: Clone,
{
    pub(crate) const fn new(receiver: watch::Receiver<S>) -> Self {
        Self {
            receiver,
            delivered_current: false,
        }
    }

    /// The latest snapshot, without waiting
    #[must_use]
    pub fn current(&self) -> S {
        self.receiver.borrow().clone()
    }

    /// Whether a snapshot is ready that `next()` has not yielded yet
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.delivered_current || self.receiver.has_changed().unwrap_or(false)
    }

    /// The next snapshot
    ///
    /// The first call yields the current snapshot immediately. Later calls
    /// wait for a change. Returns `None` once the store is gone.
    pub async fn next(&mut self) -> Option<S> {
        if self.delivered_current {
            self.receiver.changed().await.ok()?;
        }
        self.delivered_current = true;
        Some(self.receiver.borrow_and_update().clone())
    }

    /// Wait for a snapshot matching `predicate`
    ///
    /// Checks the current snapshot first, then every change after it.
    /// Returns `None` if the store is dropped before a match.
    pub async fn wait_for<F>(&mut self, mut predicate: F) -> Option<S>
    where
        F: FnMut(&S) -> bool,
    {
        self.delivered_current = true;
        loop {
            let snapshot = self.receiver.borrow_and_update().clone();
            if predicate(&snapshot) {
                return Some(snapshot);
            }
            self.receiver.changed().await.ok()?;
        }
    }

    /// Convert into a stream of snapshots
    ///
    /// The stream yields what repeated `next()` calls would and ends when the
    /// store is dropped.
    pub fn into_stream(mut self) -> impl Stream<Item = S>
    where
        S: Send + Sync + 'static,
    {
        async_stream::stream! {
            while let Some(snapshot) = self.next().await {
                yield snapshot;
            }
        }
    }

    /// Stop observing
    pub fn unsubscribe(self) {
        tracing::trace!("Subscription closed");
    }
}
