//! The provider trait every market data source implements.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{Bar, HistoryRange};
use crate::registry::RateLimitConfig;

/// A source of daily price history.
///
/// Implement this trait to add a new market data backend. The registry
/// orders providers by [`priority`](Self::priority) and applies each
/// provider's [`rate_limit`](Self::rate_limit) before every call.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier, a constant like "YAHOO" or "ALPHA_VANTAGE".
    /// Used for logging and rate limiter bucketing.
    fn id(&self) -> &'static str;

    /// Provider priority for ordering. Lower values = higher priority.
    fn priority(&self) -> u8 {
        10
    }

    /// Rate limiting configuration applied by the registry.
    fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig::default()
    }

    /// Fetch daily bars for `symbol` over the given lookback range.
    ///
    /// Bars must be returned in ascending date order. An empty vector is a
    /// valid response meaning the symbol exists but the range holds no
    /// observations; `SymbolNotFound` means the provider does not know the
    /// symbol at all.
    async fn daily_history(
        &self,
        symbol: &str,
        range: HistoryRange,
    ) -> Result<Vec<Bar>, MarketDataError>;
}
