//! Result records emitted by the pipeline.
//!
//! These are transient: built once per cycle per symbol, handed to the
//! snapshot sink, and discarded. Only the price history store retains data
//! across cycles.

use chrono::{DateTime, Utc};
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::changes::ChangeSet;
use crate::instruments::{display_symbol, IndexInfo};

/// Computed per-symbol statistics: current price plus the change for every
/// reference window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolStats {
    pub last_price: Decimal,
    pub volume_display: String,
    pub changes: ChangeSet,
}

/// Snapshot row for one tracked index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSnapshot {
    pub code: String,
    pub name: String,
    pub category: String,
    pub last_price: Decimal,
    pub changes: ChangeSet,
    pub volume: String,
    pub updated_at: DateTime<Utc>,
}

impl IndexSnapshot {
    pub fn from_stats(info: &IndexInfo, stats: SymbolStats, updated_at: DateTime<Utc>) -> Self {
        Self {
            code: display_symbol(&info.code).to_string(),
            name: info.name.clone(),
            category: info.category.clone(),
            last_price: stats.last_price,
            changes: stats.changes,
            volume: stats.volume_display,
            updated_at,
        }
    }
}

/// Snapshot row for one constituent stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSnapshot {
    pub symbol: String,
    /// Cleaned codes of the indices this stock belongs to.
    pub parent_indices: Vec<String>,
    pub price: Decimal,
    pub changes: ChangeSet,
    pub updated_at: DateTime<Utc>,
}

/// Human-readable volume in millions, one decimal place: "12.3M".
pub fn format_volume(volume: Decimal) -> String {
    let millions = volume.to_f64().unwrap_or(0.0) / 1_000_000.0;
    format!("{:.1}M", millions)
}
