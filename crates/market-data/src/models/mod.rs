//! Data types shared by providers and the registry.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One daily observation as returned by a provider.
///
/// Providers normalize their native payloads into this shape; open, high
/// and low are dropped at the edge because nothing downstream consumes
/// them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub close: Decimal,
    pub volume: Decimal,
}

/// Lookback ranges the registry can request, widest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryRange {
    OneYear,
    OneMonth,
    FiveDays,
}

impl HistoryRange {
    /// The Yahoo Finance range token for this lookback.
    pub fn as_yahoo_range(&self) -> &'static str {
        match self {
            HistoryRange::OneYear => "1y",
            HistoryRange::OneMonth => "1mo",
            HistoryRange::FiveDays => "5d",
        }
    }

    /// Approximate calendar days covered, for providers that take explicit
    /// date bounds instead of range tokens.
    pub fn days(&self) -> i64 {
        match self {
            HistoryRange::OneYear => 365,
            HistoryRange::OneMonth => 30,
            HistoryRange::FiveDays => 5,
        }
    }
}

/// One step of the range-fallback chain: the range to request and the
/// minimum number of bars that counts as a usable response.
#[derive(Debug, Clone, Copy)]
pub struct FallbackStep {
    pub range: HistoryRange,
    pub min_points: usize,
}

/// The fallback chain walked per provider, widest range first.
///
/// The wide ranges demand at least two bars so a reference price distinct
/// from the current one exists; the last step accepts a single bar, which
/// downstream collapses every change to zero rather than dropping the
/// symbol.
pub const FALLBACK_CHAIN: [FallbackStep; 3] = [
    FallbackStep {
        range: HistoryRange::OneYear,
        min_points: 2,
    },
    FallbackStep {
        range: HistoryRange::OneMonth,
        min_points: 2,
    },
    FallbackStep {
        range: HistoryRange::FiveDays,
        min_points: 1,
    },
];
