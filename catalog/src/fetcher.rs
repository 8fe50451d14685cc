//! Fetch port: the one capability the catalog needs from the outside world.
//!
//! [`ProductFetcher`] retrieves the whole catalog in one call and reports
//! failures as values. It never retries; a retry is a user-triggered refresh.

use crate::config::Config;
use crate::error::{ConfigError, FetchError};
use crate::mapper;
use crate::types::Product;
use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

/// Future returned by [`ProductFetcher::fetch_all`]
pub type FetchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<Product>, FetchError>> + Send + 'a>>;

/// Retrieves every product
///
/// # Example
///
/// ```ignore
/// impl ProductFetcher for FixtureFetcher {
///     fn fetch_all(&self) -> FetchFuture<'_> {
///         let products = self.products.clone();
///         Box::pin(async move { Ok(products) })
///     }
/// }
/// ```
pub trait ProductFetcher: Send + Sync {
    /// Fetch the full catalog, in source order
    ///
    /// Performs at most one round trip per call.
    fn fetch_all(&self) -> FetchFuture<'_>;
}

/// Metric names recorded by [`HttpProductFetcher`]
pub mod names {
    /// Fetch attempts
    pub const FETCH_TOTAL: &str = "catalog_fetch_total";
    /// Failed fetches, labelled by `kind`
    pub const FETCH_FAILURES: &str = "catalog_fetch_failures_total";
    /// Round-trip time of a fetch, including decoding
    pub const FETCH_DURATION: &str = "catalog_fetch_duration_seconds";
}

/// [`ProductFetcher`] backed by a REST API
///
/// Issues `GET {base_url}/products`. Non-success statuses become
/// [`FetchError::Transport`]; bodies that do not map become
/// [`FetchError::MalformedData`].
#[derive(Clone, Debug)]
pub struct HttpProductFetcher {
    client: reqwest::Client,
    products_url: String,
}

impl HttpProductFetcher {
    /// Build a fetcher for the API at `base_url`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the HTTP client cannot be
    /// built (for example when no TLS backend is available).
    pub fn new(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|error| ConfigError::HttpClient(error.to_string()))?;

        Ok(Self {
            client,
            products_url: format!("{}/products", base_url.trim_end_matches('/')),
        })
    }

    /// Build a fetcher from loaded configuration
    ///
    /// # Errors
    ///
    /// See [`HttpProductFetcher::new`].
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::new(&config.api_url, config.http_timeout, &config.user_agent)
    }

    /// The URL every fetch requests
    #[must_use]
    pub fn products_url(&self) -> &str {
        &self.products_url
    }

    #[tracing::instrument(skip(self), fields(url = %self.products_url))]
    async fn fetch(&self) -> Result<Vec<Product>, FetchError> {
        metrics::counter!(names::FETCH_TOTAL).increment(1);
        let start = Instant::now();

        let result = self.request().await;

        metrics::histogram!(names::FETCH_DURATION).record(start.elapsed().as_secs_f64());
        match &result {
            Ok(products) => {
                tracing::debug!(count = products.len(), "Fetched products");
            },
            Err(error) => {
                metrics::counter!(names::FETCH_FAILURES, "kind" => error.kind().as_str())
                    .increment(1);
                tracing::warn!(kind = %error.kind(), %error, "Product fetch failed");
            },
        }

        result
    }

    async fn request(&self) -> Result<Vec<Product>, FetchError> {
        let response = self.client.get(&self.products_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Transport(format!("server responded with {status}")));
        }

        let body = response.bytes().await?;
        mapper::decode_products(&body)
    }
}

impl ProductFetcher for HttpProductFetcher {
    fn fetch_all(&self) -> FetchFuture<'_> {
        Box::pin(self.fetch())
    }
}
