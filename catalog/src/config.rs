//! Configuration management for the catalog binary.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Unlike a silent fallback, a variable that is set but unusable is an error.

use crate::error::ConfigError;
use crate::state::StaleSelection;
use std::time::Duration;
use storefront_runtime::StoreConfig;

/// Base URL of the products API
pub const API_URL_VAR: &str = "CATALOG_API_URL";
/// Request timeout in whole seconds
pub const HTTP_TIMEOUT_VAR: &str = "CATALOG_HTTP_TIMEOUT_SECS";
/// User-Agent header sent with every request
pub const USER_AGENT_VAR: &str = "CATALOG_USER_AGENT";
/// `keep`, `reread` or `close`
pub const STALE_SELECTION_VAR: &str = "CATALOG_STALE_SELECTION";
/// Graceful shutdown timeout in whole seconds
pub const SHUTDOWN_TIMEOUT_VAR: &str = "CATALOG_SHUTDOWN_TIMEOUT_SECS";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the products API (without `/products`)
    pub api_url: String,
    /// HTTP request timeout
    pub http_timeout: Duration,
    /// User-Agent header
    pub user_agent: String,
    /// What a successful refresh does to the open product
    pub stale_selection: StaleSelection,
    /// How long closing the view model waits for effects to stop
    pub shutdown_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "https://fakestoreapi.com".to_string(),
            http_timeout: Duration::from_secs(30),
            user_agent: concat!("catalog/", env!("CARGO_PKG_VERSION")).to_string(),
            stale_selection: StaleSelection::default(),
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set to a value
    /// that cannot be used.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup` instead of the process environment
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = match lookup(API_URL_VAR) {
            Some(url) => parse_url(url)?,
            None => defaults.api_url,
        };

        let http_timeout = match lookup(HTTP_TIMEOUT_VAR) {
            Some(value) => parse_seconds(HTTP_TIMEOUT_VAR, &value)?,
            None => defaults.http_timeout,
        };

        let user_agent = lookup(USER_AGENT_VAR)
            .filter(|agent| !agent.trim().is_empty())
            .unwrap_or(defaults.user_agent);

        let stale_selection = match lookup(STALE_SELECTION_VAR) {
            Some(value) => {
                value
                    .parse::<StaleSelection>()
                    .map_err(|error| ConfigError::InvalidValue {
                        name: STALE_SELECTION_VAR,
                        value: value.clone(),
                        reason: error.to_string(),
                    })?
            },
            None => defaults.stale_selection,
        };

        let shutdown_timeout = match lookup(SHUTDOWN_TIMEOUT_VAR) {
            Some(value) => parse_seconds(SHUTDOWN_TIMEOUT_VAR, &value)?,
            None => defaults.shutdown_timeout,
        };

        Ok(Self {
            api_url,
            http_timeout,
            user_agent,
            stale_selection,
            shutdown_timeout,
        })
    }

    /// Store settings derived from this configuration
    #[must_use]
    pub const fn store_config(&self) -> StoreConfig {
        StoreConfig::new(self.shutdown_timeout)
    }
}

fn parse_url(url: String) -> Result<String, ConfigError> {
    let trimmed = url.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidValue {
            name: API_URL_VAR,
            value: url,
            reason: "expected an http:// or https:// URL".to_string(),
        })
    }
}

fn parse_seconds(name: &'static str, value: &str) -> Result<Duration, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: value.to_string(),
            reason: "expected a positive number of seconds".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api_url, "https://fakestoreapi.com");
        assert!(config.user_agent.starts_with("catalog/"));
        assert_eq!(config.stale_selection, StaleSelection::Keep);
    }

    #[test]
    fn reads_every_variable() {
        let config = Config::from_lookup(lookup_from(&[
            (API_URL_VAR, "http://localhost:8080 "),
            (HTTP_TIMEOUT_VAR, "3"),
            (USER_AGENT_VAR, "shop-kiosk/2"),
            (STALE_SELECTION_VAR, "close"),
            (SHUTDOWN_TIMEOUT_VAR, "1"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "http://localhost:8080");
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert_eq!(config.user_agent, "shop-kiosk/2");
        assert_eq!(config.stale_selection, StaleSelection::Close);
        assert_eq!(
            config.store_config().default_shutdown_timeout,
            Duration::from_secs(1)
        );
    }

    #[test]
    fn rejects_bad_values() {
        let bad_url = Config::from_lookup(lookup_from(&[(API_URL_VAR, "fakestoreapi.com")]));
        assert!(matches!(
            bad_url,
            Err(ConfigError::InvalidValue { name: API_URL_VAR, .. })
        ));

        let zero = Config::from_lookup(lookup_from(&[(HTTP_TIMEOUT_VAR, "0")]));
        assert!(matches!(
            zero,
            Err(ConfigError::InvalidValue { name: HTTP_TIMEOUT_VAR, .. })
        ));

        let policy = Config::from_lookup(lookup_from(&[(STALE_SELECTION_VAR, "sometimes")]));
        assert!(matches!(
            policy,
            Err(ConfigError::InvalidValue { name: STALE_SELECTION_VAR, .. })
        ));
    }

    #[test]
    fn blank_user_agent_uses_default() {
        let config = Config::from_lookup(lookup_from(&[(USER_AGENT_VAR, "  ")])).unwrap();
        assert_eq!(config.user_agent, Config::default().user_agent);
    }
}
