//! Adapter from the provider registry to the pipeline's series source.

use async_trait::async_trait;

use bistpulse_core::errors::{Error, Result};
use bistpulse_core::pipeline::SeriesSource;
use bistpulse_core::series::{PricePoint, TimeSeries};
use bistpulse_market_data::{Bar, ProviderRegistry};

pub struct RegistrySeriesSource {
    registry: ProviderRegistry,
}

impl RegistrySeriesSource {
    pub fn new(registry: ProviderRegistry) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl SeriesSource for RegistrySeriesSource {
    async fn daily_series(&self, symbol: &str) -> Result<Option<TimeSeries>> {
        let bars = self
            .registry
            .daily_history(symbol)
            .await
            .map_err(|e| Error::MarketData(e.to_string()))?;

        match bars {
            Some(bars) => Ok(bars_to_series(bars)),
            None => Ok(None),
        }
    }
}

/// A provider can hand back bars that all collapse to the same date (or an
/// empty set after filtering); treat that as unresolved rather than a
/// half-usable series.
fn bars_to_series(bars: Vec<Bar>) -> Option<TimeSeries> {
    let points: Vec<PricePoint> = bars
        .into_iter()
        .map(|bar| PricePoint::new(bar.date, bar.close, bar.volume))
        .collect();
    TimeSeries::from_observations(points).ok()
}
