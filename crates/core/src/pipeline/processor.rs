//! Per-symbol processing: resolve, backfill, calculate.
//!
//! The steps within one symbol are strictly ordered (resolve, then
//! backfill, then calculate) because the calculation depends on the
//! backfill's in-memory fallback value. Failures never escape the symbol:
//! store reads degrade to not-found, store writes are logged and swallowed,
//! and an unresolvable symbol simply produces no result.

use log::{debug, warn};
use rust_decimal::Decimal;

use crate::changes::{percent_change, ChangeSet, REFERENCE_WINDOWS};
use crate::errors::Result;
use crate::pipeline::model::{format_volume, SymbolStats};
use crate::pipeline::store::{PriceHistoryStore, SeriesSource};
use crate::series::TimeSeries;

pub struct SymbolProcessor<'a> {
    source: &'a dyn SeriesSource,
    history: &'a dyn PriceHistoryStore,
}

impl<'a> SymbolProcessor<'a> {
    pub fn new(source: &'a dyn SeriesSource, history: &'a dyn PriceHistoryStore) -> Self {
        Self { source, history }
    }

    /// Runs the full per-symbol pipeline.
    ///
    /// Returns `Ok(None)` when the symbol could not be resolved by any
    /// provider; the caller counts it as skipped. All reference dates are
    /// anchored on the resolved series' latest observation date, so a cycle
    /// run on a non-trading day measures against the last actual close.
    pub async fn process(&self, symbol: &str) -> Result<Option<SymbolStats>> {
        let series = match self.source.daily_series(symbol).await? {
            Some(series) => series,
            None => {
                debug!("{}: unresolved after all providers, skipping", symbol);
                return Ok(None);
            }
        };

        let latest = series.latest().clone();
        let anchor = latest.date;

        // Today's close is persisted unconditionally once resolution
        // succeeded, so the next cycle can serve it without a provider call.
        if let Err(e) = self.history.upsert(symbol, anchor, latest.close).await {
            warn!("{}: failed to persist close for {}: {}", symbol, anchor, e);
        }

        let mut changes = ChangeSet::new();
        for window in &REFERENCE_WINDOWS {
            let target = window.target_date(anchor);
            let reference = self.reference_price(symbol, target, &series).await;
            changes.insert(window.label, percent_change(latest.close, reference));
        }

        Ok(Some(SymbolStats {
            last_price: latest.close.round_dp(2),
            volume_display: format_volume(latest.volume),
            changes,
        }))
    }

    /// Resolves the reference price for one target date.
    ///
    /// Prefers the persisted store; on a miss (or a degraded read) falls
    /// back to the live series as-of lookup and backfills the store under
    /// the target date, best effort, so subsequent cycles hit the store.
    async fn reference_price(
        &self,
        symbol: &str,
        target: chrono::NaiveDate,
        series: &TimeSeries,
    ) -> Option<Decimal> {
        match self.history.get(symbol, target) {
            Ok(Some(close)) => return Some(close),
            Ok(None) => {}
            Err(e) => {
                warn!(
                    "{}: history read for {} failed ({}), falling back to live series",
                    symbol, target, e
                );
            }
        }

        // A single observation cannot supply a distinct reference; comparing
        // the current price to itself collapses the change to zero.
        if series.len() < 2 {
            return Some(series.latest().close);
        }

        let point = series.as_of(target);
        if let Err(e) = self.history.upsert(symbol, target, point.close).await {
            warn!("{}: backfill for {} failed: {}", symbol, target, e);
        }
        Some(point.close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::WindowLabel;
    use crate::errors::{DatabaseError, Error};
    use crate::series::PricePoint;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) struct FixtureSource {
        series: HashMap<String, Vec<PricePoint>>,
    }

    impl FixtureSource {
        pub(crate) fn new() -> Self {
            Self {
                series: HashMap::new(),
            }
        }

        pub(crate) fn with_series(mut self, symbol: &str, points: Vec<(NaiveDate, Decimal)>) -> Self {
            self.series.insert(
                symbol.to_string(),
                points
                    .into_iter()
                    .map(|(d, close)| PricePoint::new(d, close, dec!(2_000_000)))
                    .collect(),
            );
            self
        }
    }

    #[async_trait]
    impl SeriesSource for FixtureSource {
        async fn daily_series(&self, symbol: &str) -> Result<Option<TimeSeries>> {
            match self.series.get(symbol) {
                Some(points) => Ok(TimeSeries::from_observations(points.clone()).ok()),
                None => Ok(None),
            }
        }
    }

    #[derive(Default)]
    pub(crate) struct MemoryHistory {
        records: Mutex<HashMap<(String, NaiveDate), Decimal>>,
    }

    impl MemoryHistory {
        pub(crate) fn stored(&self, symbol: &str, d: NaiveDate) -> Option<Decimal> {
            self.records
                .lock()
                .unwrap()
                .get(&(symbol.to_string(), d))
                .copied()
        }
    }

    #[async_trait]
    impl PriceHistoryStore for MemoryHistory {
        fn get(&self, symbol: &str, d: NaiveDate) -> Result<Option<Decimal>> {
            Ok(self
                .records
                .lock()
                .unwrap()
                .get(&(symbol.to_string(), d))
                .copied())
        }

        async fn upsert(&self, symbol: &str, d: NaiveDate, close: Decimal) -> Result<()> {
            self.records
                .lock()
                .unwrap()
                .insert((symbol.to_string(), d), close);
            Ok(())
        }
    }

    /// Store that rejects every operation, for degradation tests.
    struct BrokenHistory;

    #[async_trait]
    impl PriceHistoryStore for BrokenHistory {
        fn get(&self, _: &str, _: NaiveDate) -> Result<Option<Decimal>> {
            Err(Error::Database(DatabaseError::QueryFailed(
                "store unreachable".to_string(),
            )))
        }

        async fn upsert(&self, _: &str, _: NaiveDate, _: Decimal) -> Result<()> {
            Err(Error::Database(DatabaseError::QueryFailed(
                "store unreachable".to_string(),
            )))
        }
    }

    #[tokio::test]
    async fn test_end_to_end_changes_with_backfill() {
        // 2024-01-08 is a Monday; the prior bar is a week earlier.
        let source = FixtureSource::new().with_series(
            "ABC.IS",
            vec![
                (date(2024, 1, 1), dec!(100)),
                (date(2024, 1, 8), dec!(110)),
            ],
        );
        let history = MemoryHistory::default();

        let stats = SymbolProcessor::new(&source, &history)
            .process("ABC.IS")
            .await
            .unwrap()
            .expect("symbol should resolve");

        assert_eq!(stats.last_price, dec!(110));
        // previous trading day (2024-01-05) pads back to the 100 close.
        assert_eq!(stats.changes.percent(WindowLabel::OneDay), dec!(10.00));
        // last completed Friday from a Monday is also 2024-01-05.
        assert_eq!(stats.changes.percent(WindowLabel::OneWeek), dec!(10.00));

        // Today's close persisted under the anchor date.
        assert_eq!(
            history.stored("ABC.IS", date(2024, 1, 8)),
            Some(dec!(110))
        );
        // The miss on 2024-01-05 was backfilled with the as-of value.
        assert_eq!(
            history.stored("ABC.IS", date(2024, 1, 5)),
            Some(dec!(100))
        );
    }

    #[tokio::test]
    async fn test_store_hit_is_preferred_over_series() {
        let source = FixtureSource::new().with_series(
            "ABC.IS",
            vec![
                (date(2024, 1, 1), dec!(100)),
                (date(2024, 1, 8), dec!(110)),
            ],
        );
        let history = MemoryHistory::default();
        // Persisted close for the 1d reference differs from what the series
        // would pad to.
        history
            .upsert("ABC.IS", date(2024, 1, 5), dec!(104))
            .await
            .unwrap();

        let stats = SymbolProcessor::new(&source, &history)
            .process("ABC.IS")
            .await
            .unwrap()
            .unwrap();

        // (110 - 104) / 104 * 100 = 5.769...
        assert_eq!(stats.changes.percent(WindowLabel::OneDay), dec!(5.77));
        // The stored value was not overwritten by a backfill.
        assert_eq!(
            history.stored("ABC.IS", date(2024, 1, 5)),
            Some(dec!(104))
        );
    }

    #[tokio::test]
    async fn test_unresolved_symbol_yields_none() {
        let source = FixtureSource::new();
        let history = MemoryHistory::default();
        let result = SymbolProcessor::new(&source, &history)
            .process("GHOST.IS")
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_broken_store_degrades_to_live_series() {
        let source = FixtureSource::new().with_series(
            "ABC.IS",
            vec![
                (date(2024, 1, 1), dec!(100)),
                (date(2024, 1, 8), dec!(110)),
            ],
        );

        let stats = SymbolProcessor::new(&source, &BrokenHistory)
            .process("ABC.IS")
            .await
            .unwrap()
            .expect("calculation must complete without the store");

        assert_eq!(stats.changes.percent(WindowLabel::OneDay), dec!(10.00));
    }

    #[tokio::test]
    async fn test_single_point_series_collapses_changes_to_zero() {
        let source =
            FixtureSource::new().with_series("NEW.IS", vec![(date(2024, 1, 8), dec!(55))]);
        let history = MemoryHistory::default();

        let stats = SymbolProcessor::new(&source, &history)
            .process("NEW.IS")
            .await
            .unwrap()
            .unwrap();

        for (_, percent) in stats.changes.iter() {
            assert_eq!(percent, Decimal::ZERO);
        }
    }
}
