//! Market data providers.

pub mod alpha_vantage;
mod traits;
pub mod yahoo;

pub use traits::MarketDataProvider;
