//! Error types for data operations.
//!
//! This module defines [`DataError`] which covers all error cases that can occur
//! when fetching, converting, or caching financial data.

use thiserror::Error;

/// Errors that can occur during data operations.
#[derive(Error, Debug)]
pub enum DataError {
    /// Network-related errors (connection failures, timeouts, non-success HTTP status).
    #[error("Network error: {0}")]
    Network(String),

    /// Error parsing data from a provider.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The requested symbol was not found.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// Error interacting with the cache.
    #[error("Cache error: {0}")]
    Cache(String),

    /// The requested provider is not configured.
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl DataError {
    /// Returns true if this error came from fetching data out of a provider.
    ///
    /// These are the failures the service layer degrades to an empty result.
    #[must_use]
    pub const fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Parse(_) | Self::SymbolNotFound(_) | Self::Other(_)
        )
    }
}

impl From<serde_json::Error> for DataError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Result type alias using [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_failure_classification() {
        assert!(DataError::Network("timeout".into()).is_provider_failure());
        assert!(DataError::Parse("bad json".into()).is_provider_failure());
        assert!(!DataError::Cache("poisoned".into()).is_provider_failure());
        assert!(!DataError::InvalidParameter("empty".into()).is_provider_failure());
        assert!(!DataError::ProviderNotConfigured("none".into()).is_provider_failure());
    }
}
