//! BistPulse core domain crate.
//!
//! Database-agnostic logic for resolving historical prices and computing
//! period changes over fixed lookback windows:
//!
//! - [`series`] - immutable, date-ordered price series with as-of lookups
//! - [`calendar`] - weekend-aware reference date math
//! - [`changes`] - the reference window table and percent change calculation
//! - [`instruments`] - the injected index/constituent catalog
//! - [`pipeline`] - the per-symbol processor and the cycle driver, plus the
//!   storage and provider traits it consumes
//!
//! Persistence and provider access live in sibling crates
//! (`bistpulse-storage-sqlite`, `bistpulse-market-data`); this crate only
//! defines the traits those crates implement or are adapted to.

pub mod calendar;
pub mod changes;
pub mod errors;
pub mod instruments;
pub mod pipeline;
pub mod series;

pub use changes::{percent_change, ChangeSet, ReferenceDateRule, ReferenceWindow, WindowLabel};
pub use errors::{DatabaseError, Error, Result};
pub use instruments::{IndexInfo, InstrumentCatalog};
pub use pipeline::{
    CycleRunner, CycleSummary, IndexSnapshot, PriceHistoryStore, SeriesSource, SnapshotSink,
    StockSnapshot, SymbolProcessor, SymbolStats,
};
pub use series::{EmptySeries, PricePoint, TimeSeries};
