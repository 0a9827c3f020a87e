//! Error types for the market data crate.

use thiserror::Error;

/// Errors that can occur while fetching daily history.
///
/// Inside the registry, per-provider errors are logged and absorbed by the
/// fallback chain; only [`NoProvidersAvailable`](Self::NoProvidersAvailable)
/// escapes to the caller, since it indicates a misconfigured registry rather
/// than an unlucky symbol.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The requested symbol was not found by the provider.
    /// Terminal for that provider - there is no point retrying other ranges.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The symbol exists but has no observations in the requested range.
    #[error("No data for range")]
    NoDataForRange,

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// A provider-specific error occurred.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider returned data that failed conversion or sanity checks.
    #[error("Validation failed: {message}")]
    ValidationFailed {
        /// Description of the validation failure
        message: String,
    },

    /// The registry was constructed without any providers.
    #[error("No providers available")]
    NoProvidersAvailable,

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}
