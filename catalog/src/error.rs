//! Error types for the catalog.

use thiserror::Error;

/// Why a catalog fetch failed
///
/// The `Display` text is what the view state records as its error message,
/// so it is written for people, not for logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Network or I/O failure, including non-success HTTP statuses
    #[error("Network error: {0}")]
    Transport(String),

    /// The payload could not be mapped to products
    #[error("Malformed product data: {0}")]
    MalformedData(String),

    /// Anything else
    #[error("{}", unknown_message(.0))]
    Unknown(String),
}

fn unknown_message(message: &str) -> &str {
    if message.is_empty() {
        "An error occurred"
    } else {
        message
    }
}

/// Failure category of a [`FetchError`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    /// See [`FetchError::Transport`]
    Transport,
    /// See [`FetchError::MalformedData`]
    MalformedData,
    /// See [`FetchError::Unknown`]
    Unknown,
}

impl FetchErrorKind {
    /// Stable lowercase name, used as a metric label
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::MalformedData => "malformed_data",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FetchError {
    /// The failure category
    #[must_use]
    pub const fn kind(&self) -> FetchErrorKind {
        match self {
            Self::Transport(_) => FetchErrorKind::Transport,
            Self::MalformedData(_) => FetchErrorKind::MalformedData,
            Self::Unknown(_) => FetchErrorKind::Unknown,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::MalformedData(error.to_string())
        } else {
            Self::Transport(error.to_string())
        }
    }
}

/// Invalid configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable holds a value that cannot be used
    #[error("Invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        /// Variable name
        name: &'static str,
        /// Offending value
        value: String,
        /// What is wrong with it
        reason: String,
    },

    /// The HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_human_readable() {
        assert_eq!(
            FetchError::Transport("connection refused".to_string()).to_string(),
            "Network error: connection refused"
        );
        assert_eq!(
            FetchError::MalformedData("record 0: missing title".to_string()).to_string(),
            "Malformed product data: record 0: missing title"
        );
        assert_eq!(
            FetchError::Unknown("boom".to_string()).to_string(),
            "boom"
        );
    }

    #[test]
    fn empty_unknown_falls_back_to_generic_message() {
        assert_eq!(
            FetchError::Unknown(String::new()).to_string(),
            "An error occurred"
        );
    }

    #[test]
    fn kinds_match_variants() {
        assert_eq!(
            FetchError::Transport(String::new()).kind(),
            FetchErrorKind::Transport
        );
        assert_eq!(
            FetchError::MalformedData(String::new()).kind().as_str(),
            "malformed_data"
        );
        assert_eq!(FetchError::Unknown(String::new()).kind().to_string(), "unknown");
    }

    #[test]
    fn config_error_names_variable() {
        let error = ConfigError::InvalidValue {
            name: "CATALOG_HTTP_TIMEOUT_SECS",
            value: "soon".to_string(),
            reason: "expected whole seconds".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid value for CATALOG_HTTP_TIMEOUT_SECS: \"soon\" (expected whole seconds)"
        );
    }
}
