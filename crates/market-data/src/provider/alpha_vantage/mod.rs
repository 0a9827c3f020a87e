//! Alpha Vantage market data provider.
//!
//! Secondary provider behind Yahoo, using the TIME_SERIES_DAILY endpoint.
//! The free tier allows 5 calls per minute and only the compact output
//! size (latest 100 sessions), so responses are trimmed client-side to the
//! requested range.

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, warn};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::models::{Bar, HistoryRange};
use crate::provider::MarketDataProvider;
use crate::registry::RateLimitConfig;

const BASE_URL: &str = "https://www.alphavantage.co/query";
const PROVIDER_ID: &str = "ALPHA_VANTAGE";

pub struct AlphaVantageProvider {
    client: Client,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(rename = "Time Series (Daily)")]
    time_series: Option<HashMap<String, DailyQuote>>,
    #[serde(rename = "Error Message")]
    error_message: Option<String>,
    #[serde(rename = "Note")]
    note: Option<String>,
    #[serde(rename = "Information")]
    information: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DailyQuote {
    #[serde(rename = "4. close")]
    close: String,
    #[serde(rename = "5. volume")]
    volume: String,
}

impl AlphaVantageProvider {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, api_key }
    }

    async fn fetch(&self, params: &[(&str, &str)]) -> Result<String, MarketDataError> {
        let mut all_params: Vec<(&str, &str)> = params.to_vec();
        all_params.push(("apikey", &self.api_key));

        let url = reqwest::Url::parse_with_params(BASE_URL, &all_params).map_err(|e| {
            MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to build URL: {}", e),
            }
        })?;

        debug!(
            "Alpha Vantage request: {}",
            url.as_str().replace(&self.api_key, "***")
        );

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        if !status.is_success() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {}", status),
            });
        }

        Ok(response.text().await?)
    }

    /// Check for API-level errors reported inside a 200 response.
    fn check_api_error(
        error_message: &Option<String>,
        note: &Option<String>,
        information: &Option<String>,
    ) -> Result<(), MarketDataError> {
        if let Some(msg) = error_message {
            if msg.contains("Invalid API call") || msg.contains("not found") {
                return Err(MarketDataError::SymbolNotFound(msg.clone()));
            }
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: msg.clone(),
            });
        }

        // "Note" and "Information" usually carry rate limit complaints.
        for msg in [note, information].into_iter().flatten() {
            if msg.contains("API call frequency") || msg.contains("rate limit") {
                return Err(MarketDataError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            warn!("Alpha Vantage: {}", msg);
        }

        Ok(())
    }
}

#[async_trait]
impl MarketDataProvider for AlphaVantageProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        20
    }

    fn rate_limit(&self) -> RateLimitConfig {
        // Free tier limit.
        RateLimitConfig {
            requests_per_minute: 5,
            burst_capacity: 1.0,
        }
    }

    async fn daily_history(
        &self,
        symbol: &str,
        range: HistoryRange,
    ) -> Result<Vec<Bar>, MarketDataError> {
        // TIME_SERIES_DAILY: 'full' is premium-only, compact covers the
        // latest 100 sessions which is enough for every fallback range
        // except a sparse one-year lookback.
        let params = [
            ("function", "TIME_SERIES_DAILY"),
            ("symbol", symbol),
            ("outputsize", "compact"),
        ];

        let text = self.fetch(&params).await?;
        let response: TimeSeriesResponse =
            serde_json::from_str(&text).map_err(|e| MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse response: {}", e),
            })?;

        Self::check_api_error(
            &response.error_message,
            &response.note,
            &response.information,
        )?;

        let time_series = response
            .time_series
            .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))?;

        let mut bars: Vec<Bar> = time_series
            .into_iter()
            .filter_map(|(date_str, daily)| {
                let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").ok()?;
                let close = Decimal::from_str(&daily.close).ok()?;
                let volume = Decimal::from_str(&daily.volume).ok()?;
                Some(Bar {
                    date,
                    close,
                    volume,
                })
            })
            .collect();

        bars.sort_by_key(|b| b.date);

        // Trim to the requested lookback, measured from the newest session.
        if let Some(newest) = bars.last().map(|b| b.date) {
            let cutoff = newest - chrono::Duration::days(range.days());
            bars.retain(|b| b.date >= cutoff);
        }

        debug!(
            "Alpha Vantage: fetched {} daily bars for {}",
            bars.len(),
            symbol
        );

        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_time_series_parsing() {
        let json = r#"{
            "Meta Data": {"2. Symbol": "THYAO.IS"},
            "Time Series (Daily)": {
                "2024-01-08": {
                    "1. open": "270.00",
                    "2. high": "276.25",
                    "3. low": "269.50",
                    "4. close": "275.50",
                    "5. volume": "123456789"
                }
            }
        }"#;

        let response: TimeSeriesResponse = serde_json::from_str(json).unwrap();
        let series = response.time_series.unwrap();
        let daily = &series["2024-01-08"];
        assert_eq!(Decimal::from_str(&daily.close).unwrap(), dec!(275.50));
        assert_eq!(Decimal::from_str(&daily.volume).unwrap(), dec!(123456789));
    }

    #[test]
    fn test_note_maps_to_rate_limited() {
        let result = AlphaVantageProvider::check_api_error(
            &None,
            &Some("Thank you! Our standard API call frequency is 5 calls per minute".to_string()),
            &None,
        );
        assert!(matches!(result, Err(MarketDataError::RateLimited { .. })));
    }

    #[test]
    fn test_error_message_maps_to_symbol_not_found() {
        let result = AlphaVantageProvider::check_api_error(
            &Some("Invalid API call. Please retry".to_string()),
            &None,
            &None,
        );
        assert!(matches!(result, Err(MarketDataError::SymbolNotFound(_))));
    }
}
