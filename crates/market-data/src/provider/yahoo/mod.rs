//! Yahoo Finance market data provider.
//!
//! Fetches daily history through the chart API's range tokens ("1y",
//! "1mo", "5d"), which matches the registry's fallback chain without any
//! date arithmetic on this side.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use num_traits::FromPrimitive;
use rust_decimal::Decimal;
use yahoo_finance_api as yahoo;

use crate::errors::MarketDataError;
use crate::models::{Bar, HistoryRange};
use crate::provider::MarketDataProvider;
use crate::registry::RateLimitConfig;

pub struct YahooProvider {
    connector: yahoo::YahooConnector,
}

impl YahooProvider {
    pub fn new() -> Result<Self, MarketDataError> {
        let connector =
            yahoo::YahooConnector::new().map_err(|e| MarketDataError::ProviderError {
                provider: "YAHOO".to_string(),
                message: format!("Failed to initialize Yahoo connector: {}", e),
            })?;
        Ok(Self { connector })
    }

    /// Convert a Yahoo quote to a daily bar.
    ///
    /// The timestamp marks the session open in exchange time; only the
    /// calendar date is kept.
    fn to_bar(yahoo_quote: yahoo::Quote) -> Result<Bar, MarketDataError> {
        let timestamp: DateTime<Utc> = DateTime::from_timestamp(yahoo_quote.timestamp as i64, 0)
            .ok_or_else(|| MarketDataError::ValidationFailed {
                message: format!("Invalid timestamp: {}", yahoo_quote.timestamp),
            })?;

        let close = Decimal::from_f64_retain(yahoo_quote.close).ok_or_else(|| {
            MarketDataError::ValidationFailed {
                message: format!(
                    "Failed to convert close price {} to Decimal",
                    yahoo_quote.close
                ),
            }
        })?;

        Ok(Bar {
            date: timestamp.date_naive(),
            close,
            volume: Decimal::from_u64(yahoo_quote.volume).unwrap_or(Decimal::ZERO),
        })
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn id(&self) -> &'static str {
        "YAHOO"
    }

    fn rate_limit(&self) -> RateLimitConfig {
        // The chart API tolerates bursts but throttles sustained scans of a
        // few hundred symbols; 120/min keeps a full cycle under the radar.
        RateLimitConfig {
            requests_per_minute: 120,
            burst_capacity: 10.0,
        }
    }

    async fn daily_history(
        &self,
        symbol: &str,
        range: HistoryRange,
    ) -> Result<Vec<Bar>, MarketDataError> {
        debug!(
            "Fetching {} of daily history for {} from Yahoo",
            range.as_yahoo_range(),
            symbol
        );

        let response = self
            .connector
            .get_quote_range(symbol, "1d", range.as_yahoo_range())
            .await
            .map_err(|e| {
                if matches!(e, yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult) {
                    MarketDataError::SymbolNotFound(symbol.to_string())
                } else {
                    MarketDataError::ProviderError {
                        provider: "YAHOO".to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        match response.quotes() {
            Ok(yahoo_quotes) => {
                let bars: Vec<Bar> = yahoo_quotes
                    .into_iter()
                    .filter_map(|q| match Self::to_bar(q) {
                        Ok(bar) => Some(bar),
                        Err(e) => {
                            warn!("Skipping bar for {} due to conversion error: {:?}", symbol, e);
                            None
                        }
                    })
                    .collect();
                Ok(bars)
            }
            Err(yahoo::YahooError::NoQuotes) => Err(MarketDataError::NoDataForRange),
            Err(e) => Err(MarketDataError::ProviderError {
                provider: "YAHOO".to_string(),
                message: e.to_string(),
            }),
        }
    }
}
