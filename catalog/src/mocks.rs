//! Test doubles for the fetch port.
//!
//! [`ScriptedFetcher`] plays back scripted outcomes and can hold fetches in
//! flight until a test releases them, which is how the in-flight and
//! teardown rules are exercised.

#![allow(clippy::module_name_repetitions)]

use crate::error::FetchError;
use crate::fetcher::{FetchFuture, ProductFetcher};
use crate::types::{Product, ProductId, Rating};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio::sync::Semaphore;

type Outcome = Result<Vec<Product>, FetchError>;

/// Fetcher returning scripted outcomes in order
///
/// The last outcome repeats once the script runs out. With an empty script
/// every fetch fails with `FetchError::Unknown`.
///
/// # Example
///
/// ```
/// use catalog::mocks::{ScriptedFetcher, product};
///
/// let fetcher = ScriptedFetcher::gated();
/// fetcher.push_success(vec![product(1, "books")]);
/// // ... start a load, observe `is_loading`, then:
/// fetcher.release(1);
/// ```
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    outcomes: Mutex<VecDeque<Outcome>>,
    calls: AtomicUsize,
    gate: Option<Semaphore>,
}

impl ScriptedFetcher {
    /// Fetcher that answers immediately
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher whose fetches wait until [`ScriptedFetcher::release`]
    #[must_use]
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    /// Queue a successful fetch
    pub fn push_success(&self, products: Vec<Product>) -> &Self {
        self.push(Ok(products))
    }

    /// Queue a failed fetch
    pub fn push_failure(&self, error: FetchError) -> &Self {
        self.push(Err(error))
    }

    /// Let `fetches` gated fetches complete
    pub fn release(&self, fetches: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(fetches);
        }
    }

    /// Number of fetches started so far
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn push(&self, outcome: Outcome) -> &Self {
        self.outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(outcome);
        self
    }

    fn next_outcome(&self) -> Outcome {
        let mut outcomes = self.outcomes.lock().unwrap_or_else(PoisonError::into_inner);
        match outcomes.len() {
            0 => Err(FetchError::Unknown(String::new())),
            1 => outcomes[0].clone(),
            _ => outcomes
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Unknown(String::new()))),
        }
    }
}

impl ProductFetcher for ScriptedFetcher {
    fn fetch_all(&self) -> FetchFuture<'_> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.acquire()
                    .await
                    .map_err(|error| FetchError::Unknown(error.to_string()))?
                    .forget();
            }
            self.next_outcome()
        })
    }
}

/// A valid product in `category`, with fields derived from `id`
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn product(id: i64, category: &str) -> Product {
    Product {
        id: ProductId::new(id),
        title: format!("Product {id}"),
        price: (id.unsigned_abs() % 1_000) as f64 + 0.99,
        description: format!("Description of product {id}"),
        category: category.to_string(),
        image_url: format!("https://img.example/{id}.jpg"),
        rating: Rating {
            rate: 4.0,
            count: 10,
        },
    }
}
