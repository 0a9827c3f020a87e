//! Collaborator traits consumed by the pipeline.
//!
//! These traits abstract the persistence layer and the provider layer so
//! different backends can be used interchangeably (and so tests can inject
//! in-memory fixtures). The SQLite implementations live in
//! `bistpulse-storage-sqlite`; the provider-backed series source is wired in
//! the fetcher app on top of `bistpulse-market-data`.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::Result;
use crate::pipeline::model::{IndexSnapshot, StockSnapshot};
use crate::series::TimeSeries;

/// Resolves a symbol's daily history from the configured providers.
///
/// `Ok(None)` is the terminal Unresolved state: every provider and window
/// fallback was exhausted without a single usable observation, and the
/// symbol is skipped for this cycle. `Err` is reserved for total outages
/// that should surface as a cycle-level failure.
#[async_trait]
pub trait SeriesSource: Send + Sync {
    async fn daily_series(&self, symbol: &str) -> Result<Option<TimeSeries>>;
}

/// Persistent per-symbol, per-date close price cache.
///
/// The store is the system's only long-lived state: append-only from the
/// pipeline's perspective, with last-writer-wins upsert semantics per
/// (symbol, date) key and no versioning.
#[async_trait]
pub trait PriceHistoryStore: Send + Sync {
    /// Exact-date read; no fallback.
    fn get(&self, symbol: &str, date: NaiveDate) -> Result<Option<Decimal>>;

    /// Idempotent write; a colliding (symbol, date) overwrites the prior
    /// close.
    async fn upsert(&self, symbol: &str, date: NaiveDate, close: Decimal) -> Result<()>;
}

/// Durable sink for cycle results, keyed by symbol with upsert semantics.
///
/// Only the latest cycle's record per symbol is retained; the sink is
/// responsible for chunking batches that exceed its backend's limits.
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    async fn save_index_snapshots(&self, snapshots: &[IndexSnapshot]) -> Result<usize>;

    async fn save_stock_snapshots(&self, snapshots: &[StockSnapshot]) -> Result<usize>;
}
