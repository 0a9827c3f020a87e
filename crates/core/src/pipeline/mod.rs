pub mod cycle;
pub mod model;
pub mod processor;
pub mod store;

pub use cycle::{CycleRunner, CycleSummary};
pub use model::{format_volume, IndexSnapshot, StockSnapshot, SymbolStats};
pub use processor::SymbolProcessor;
pub use store::{PriceHistoryStore, SeriesSource, SnapshotSink};
