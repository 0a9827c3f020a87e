//! One full processing cycle over the injected catalog.
//!
//! Symbols are processed sequentially: each symbol's resolution, backfill
//! writes, and calculation complete before the next symbol starts. No
//! result depends on cross-symbol ordering, and provider pacing is enforced
//! inside the series source, so the driver itself stays simple.

use chrono::Utc;
use log::{error, info, warn};
use std::sync::Arc;

use crate::errors::{Error, Result};
use crate::instruments::{display_symbol, InstrumentCatalog};
use crate::pipeline::model::{IndexSnapshot, StockSnapshot};
use crate::pipeline::processor::SymbolProcessor;
use crate::pipeline::store::{PriceHistoryStore, SeriesSource, SnapshotSink};

/// Outcome counts for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleSummary {
    pub index_count: usize,
    pub stock_count: usize,
    pub skipped: usize,
}

/// Drives one "fetch everything" cycle: indices first, then the
/// deduplicated constituent stocks, then both snapshot batches to the sink.
pub struct CycleRunner {
    source: Arc<dyn SeriesSource>,
    history: Arc<dyn PriceHistoryStore>,
    sink: Arc<dyn SnapshotSink>,
    catalog: InstrumentCatalog,
}

impl CycleRunner {
    pub fn new(
        source: Arc<dyn SeriesSource>,
        history: Arc<dyn PriceHistoryStore>,
        sink: Arc<dyn SnapshotSink>,
        catalog: InstrumentCatalog,
    ) -> Self {
        Self {
            source,
            history,
            sink,
            catalog,
        }
    }

    /// Runs one cycle. Per-symbol failures are contained and counted as
    /// skips; only a cycle that attempted symbols and produced nothing at
    /// all (or a sink that rejects the final batches) is a failure.
    pub async fn run(&self) -> Result<CycleSummary> {
        let processor = SymbolProcessor::new(&*self.source, &*self.history);
        let now = Utc::now();
        let mut summary = CycleSummary::default();

        let indices = self.catalog.indices();
        info!("Processing {} indices...", indices.len());
        let mut index_rows = Vec::with_capacity(indices.len());
        for index in indices {
            match processor.process(&index.code).await {
                Ok(Some(stats)) => index_rows.push(IndexSnapshot::from_stats(index, stats, now)),
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    warn!("{}: processing failed: {}", index.code, e);
                    summary.skipped += 1;
                }
            }
        }

        let stocks = self.catalog.unique_stocks();
        info!("Processing {} stocks...", stocks.len());
        let mut stock_rows = Vec::with_capacity(stocks.len());
        for symbol in &stocks {
            match processor.process(symbol).await {
                Ok(Some(stats)) => stock_rows.push(StockSnapshot {
                    symbol: display_symbol(symbol).to_string(),
                    parent_indices: self.catalog.parents_of(symbol),
                    price: stats.last_price,
                    changes: stats.changes,
                    updated_at: now,
                }),
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    warn!("{}: processing failed: {}", symbol, e);
                    summary.skipped += 1;
                }
            }
        }

        let attempted = indices.len() + stocks.len();
        if attempted > 0 && index_rows.is_empty() && stock_rows.is_empty() {
            error!(
                "cycle produced no results for {} attempted symbols",
                attempted
            );
            return Err(Error::CycleFailed(format!(
                "no symbol resolved out of {} attempted",
                attempted
            )));
        }

        // A sink rejection here means the persistent store is unreachable
        // for the whole cycle, which is the one failure worth surfacing to
        // the scheduler.
        if !index_rows.is_empty() {
            summary.index_count = self.sink.save_index_snapshots(&index_rows).await?;
        }
        if !stock_rows.is_empty() {
            summary.stock_count = self.sink.save_stock_snapshots(&stock_rows).await?;
        }

        info!(
            "Cycle complete: {} indices, {} stocks, {} skipped",
            summary.index_count, summary.stock_count, summary.skipped
        );
        Ok(summary)
    }
}
