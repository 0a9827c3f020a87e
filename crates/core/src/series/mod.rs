//! Immutable daily price series with as-of lookups.
//!
//! A [`TimeSeries`] is the normalized form of whatever a market data provider
//! returned for one symbol: date-ordered, deduplicated, never empty. The
//! as-of lookup is the single documented primitive for resolving a reference
//! price from sparse history ("pad" semantics, never interpolated, never a
//! future observation).

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A provider returned no usable observations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("empty price series")]
pub struct EmptySeries;

/// One daily observation for a symbol. Immutable once observed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: Decimal,
    pub volume: Decimal,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: Decimal, volume: Decimal) -> Self {
        Self {
            date,
            close,
            volume,
        }
    }
}

/// Date-ordered, deduplicated sequence of [`PricePoint`]s for one symbol.
///
/// Invariants, guaranteed by construction:
/// - dates are strictly increasing
/// - at most one point per date
/// - the series is never empty, so [`latest`](Self::latest) is infallible
///
/// The series is owned by the resolution call that created it; it is not
/// persisted as a whole (the history store persists selected points only).
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    points: Vec<PricePoint>,
}

impl TimeSeries {
    /// Builds a series from raw observations, sorting and deduplicating by
    /// date. When the same date appears more than once the last observation
    /// wins.
    pub fn from_observations(points: Vec<PricePoint>) -> Result<Self, EmptySeries> {
        let mut by_date: BTreeMap<NaiveDate, PricePoint> = BTreeMap::new();
        for point in points {
            by_date.insert(point.date, point);
        }

        if by_date.is_empty() {
            return Err(EmptySeries);
        }

        Ok(Self {
            points: by_date.into_values().collect(),
        })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; empty input is rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The observation with the maximum date.
    pub fn latest(&self) -> &PricePoint {
        // Non-empty by construction.
        self.points
            .last()
            .expect("TimeSeries is never empty by construction")
    }

    /// The earliest available observation.
    pub fn earliest(&self) -> &PricePoint {
        self.points
            .first()
            .expect("TimeSeries is never empty by construction")
    }

    /// Most recent observation at or before `target` ("pad" semantics).
    ///
    /// Never interpolates and never returns a future observation. When the
    /// target predates all available history the earliest point is returned
    /// as a degraded fallback - a documented approximation for lookback
    /// windows that exceed the available history, not an error.
    pub fn as_of(&self, target: NaiveDate) -> &PricePoint {
        match self.points.partition_point(|p| p.date <= target) {
            0 => self.earliest(),
            n => &self.points[n - 1],
        }
    }

    /// Exact-date lookup, no fallback.
    pub fn price_at(&self, date: NaiveDate) -> Option<&PricePoint> {
        self.points
            .binary_search_by_key(&date, |p| p.date)
            .ok()
            .map(|i| &self.points[i])
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }
}
