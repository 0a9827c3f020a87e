//! The provider registry.
//!
//! Walks providers in priority order and, per provider, walks the range
//! fallback chain from widest to narrowest. The first response that meets
//! its step's minimum bar count wins outright; otherwise the longest
//! non-empty response seen anywhere is kept, so a symbol with any usable
//! observation at all still resolves after the chain is exhausted.

use std::sync::Arc;

use log::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::{Bar, FALLBACK_CHAIN};
use crate::provider::MarketDataProvider;
use crate::registry::RateLimiter;

pub struct ProviderRegistry {
    providers: Vec<Arc<dyn MarketDataProvider>>,
    rate_limiter: RateLimiter,
}

impl ProviderRegistry {
    /// Build a registry over the given providers, sorted by priority and
    /// with each provider's declared rate limit installed.
    pub fn new(mut providers: Vec<Arc<dyn MarketDataProvider>>) -> Self {
        providers.sort_by_key(|p| p.priority());

        let rate_limiter = RateLimiter::new();
        for provider in &providers {
            rate_limiter.configure(provider.id(), provider.rate_limit());
        }

        Self {
            providers,
            rate_limiter,
        }
    }

    pub fn provider_ids(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    /// Resolve daily history for `symbol`.
    ///
    /// `Ok(None)` means every provider and range was tried and nothing came
    /// back; the symbol is unresolvable this cycle. Provider errors are
    /// logged and absorbed - a misbehaving provider must never take down a
    /// whole fetch cycle.
    pub async fn daily_history(&self, symbol: &str) -> Result<Option<Vec<Bar>>, MarketDataError> {
        if self.providers.is_empty() {
            return Err(MarketDataError::NoProvidersAvailable);
        }

        let mut best: Vec<Bar> = Vec::new();

        for provider in &self.providers {
            for step in &FALLBACK_CHAIN {
                self.rate_limiter.acquire(provider.id()).await;

                match provider.daily_history(symbol, step.range).await {
                    Ok(bars) if bars.len() >= step.min_points => {
                        debug!(
                            "{}: resolved {} via {} ({} bars)",
                            symbol,
                            step.range.as_yahoo_range(),
                            provider.id(),
                            bars.len()
                        );
                        return Ok(Some(bars));
                    }
                    Ok(bars) => {
                        debug!(
                            "{}: {} from {} returned {} bars, below minimum {}",
                            symbol,
                            step.range.as_yahoo_range(),
                            provider.id(),
                            bars.len(),
                            step.min_points
                        );
                        if bars.len() > best.len() {
                            best = bars;
                        }
                    }
                    Err(MarketDataError::NoDataForRange) => {
                        debug!(
                            "{}: {} has nothing in range {}",
                            symbol,
                            provider.id(),
                            step.range.as_yahoo_range()
                        );
                    }
                    Err(MarketDataError::SymbolNotFound(_)) => {
                        // Terminal for this provider; narrower ranges will
                        // not make the symbol appear.
                        debug!("{}: unknown to {}", symbol, provider.id());
                        break;
                    }
                    Err(e) => {
                        warn!(
                            "{}: {} failed for range {}: {}",
                            symbol,
                            provider.id(),
                            step.range.as_yahoo_range(),
                            e
                        );
                    }
                }
            }
        }

        if best.is_empty() {
            Ok(None)
        } else {
            Ok(Some(best))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HistoryRange;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn bars(count: usize) -> Vec<Bar> {
        (0..count)
            .map(|i| Bar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
                    + chrono::Duration::days(i as i64),
                close: dec!(100) + Decimal::from(i as u32),
                volume: dec!(1_000_000),
            })
            .collect()
    }

    /// Provider returning a fixed bar count for every range.
    struct FixedProvider {
        id: &'static str,
        priority: u8,
        bar_count: usize,
        calls: AtomicUsize,
    }

    impl FixedProvider {
        fn new(id: &'static str, priority: u8, bar_count: usize) -> Self {
            Self {
                id,
                priority,
                bar_count,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MarketDataProvider for FixedProvider {
        fn id(&self) -> &'static str {
            self.id
        }

        fn priority(&self) -> u8 {
            self.priority
        }

        async fn daily_history(
            &self,
            _symbol: &str,
            _range: HistoryRange,
        ) -> Result<Vec<Bar>, MarketDataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(bars(self.bar_count))
        }
    }

    /// Provider whose history only reaches back a few sessions; the wide
    /// ranges come back empty.
    struct ShortHistoryProvider;

    #[async_trait]
    impl MarketDataProvider for ShortHistoryProvider {
        fn id(&self) -> &'static str {
            "SHORT"
        }

        fn priority(&self) -> u8 {
            1
        }

        async fn daily_history(
            &self,
            _symbol: &str,
            range: HistoryRange,
        ) -> Result<Vec<Bar>, MarketDataError> {
            match range {
                HistoryRange::FiveDays => Ok(bars(3)),
                _ => Err(MarketDataError::NoDataForRange),
            }
        }
    }

    /// Provider that always errors.
    struct FailingProvider;

    #[async_trait]
    impl MarketDataProvider for FailingProvider {
        fn id(&self) -> &'static str {
            "FAILING"
        }

        fn priority(&self) -> u8 {
            1
        }

        async fn daily_history(
            &self,
            _symbol: &str,
            _range: HistoryRange,
        ) -> Result<Vec<Bar>, MarketDataError> {
            Err(MarketDataError::ProviderError {
                provider: "FAILING".to_string(),
                message: "boom".to_string(),
            })
        }
    }

    /// Provider that does not know the symbol.
    struct UnknownSymbolProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MarketDataProvider for UnknownSymbolProvider {
        fn id(&self) -> &'static str {
            "NO_SYMBOLS"
        }

        fn priority(&self) -> u8 {
            1
        }

        async fn daily_history(
            &self,
            symbol: &str,
            _range: HistoryRange,
        ) -> Result<Vec<Bar>, MarketDataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(MarketDataError::SymbolNotFound(symbol.to_string()))
        }
    }

    #[tokio::test]
    async fn test_first_sufficient_response_wins() {
        let registry = ProviderRegistry::new(vec![Arc::new(FixedProvider::new("PRIMARY", 1, 30))]);

        let history = registry.daily_history("THYAO.IS").await.unwrap().unwrap();
        assert_eq!(history.len(), 30);
    }

    #[tokio::test]
    async fn test_falls_through_to_secondary_provider() {
        let primary = Arc::new(FailingProvider);
        let secondary = Arc::new(FixedProvider::new("SECONDARY", 20, 5));

        let registry = ProviderRegistry::new(vec![primary, secondary.clone()]);

        let history = registry.daily_history("THYAO.IS").await.unwrap().unwrap();
        assert_eq!(history.len(), 5);
        // First sufficient step on the secondary ends the walk.
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_ranges_fall_through_to_narrower_step() {
        // NoDataForRange on the wide steps keeps the chain walking; the
        // newly listed symbol still resolves via the 5d step.
        let registry = ProviderRegistry::new(vec![Arc::new(ShortHistoryProvider)]);

        let history = registry.daily_history("NEW.IS").await.unwrap().unwrap();
        assert_eq!(history.len(), 3);
    }

    #[tokio::test]
    async fn test_single_bar_resolves_via_last_step() {
        // One bar fails the wide steps (min 2) but passes the 5d step.
        let registry = ProviderRegistry::new(vec![Arc::new(FixedProvider::new("PRIMARY", 1, 1))]);

        let history = registry.daily_history("NEW.IS").await.unwrap().unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_symbol_short_circuits_provider() {
        let provider = Arc::new(UnknownSymbolProvider {
            calls: AtomicUsize::new(0),
        });
        let registry = ProviderRegistry::new(vec![provider.clone()]);

        let result = registry.daily_history("GHOST.IS").await.unwrap();
        assert!(result.is_none());
        // SymbolNotFound ends the chain after the first call.
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_empty_is_unresolved() {
        let registry = ProviderRegistry::new(vec![Arc::new(FixedProvider::new("EMPTY", 1, 0))]);

        let result = registry.daily_history("GHOST.IS").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_empty_registry_is_an_error() {
        let registry = ProviderRegistry::new(vec![]);
        let result = registry.daily_history("THYAO.IS").await;
        assert!(matches!(
            result,
            Err(MarketDataError::NoProvidersAvailable)
        ));
    }

    #[test]
    fn test_providers_sorted_by_priority() {
        let registry = ProviderRegistry::new(vec![
            Arc::new(FixedProvider::new("SLOW", 20, 0)),
            Arc::new(FixedProvider::new("FAST", 1, 0)),
        ]);
        assert_eq!(registry.provider_ids(), vec!["FAST", "SLOW"]);
    }
}
