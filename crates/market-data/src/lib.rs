//! BistPulse market data crate.
//!
//! Provider-agnostic daily price history fetching:
//!
//! - [`provider`] - the `MarketDataProvider` trait plus the Yahoo Finance
//!   and Alpha Vantage implementations
//! - [`registry`] - the provider registry with its range-fallback chain and
//!   per-provider rate limiting
//! - [`models`] - the daily [`Bar`] and the [`HistoryRange`] fallback table
//!
//! The registry is the only entry point callers need: it orders providers
//! by priority, walks the fallback chain per provider, and returns either a
//! usable history or `Ok(None)` once every option is exhausted.

pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;

pub use errors::MarketDataError;
pub use models::{Bar, FallbackStep, HistoryRange, FALLBACK_CHAIN};
pub use provider::alpha_vantage::AlphaVantageProvider;
pub use provider::yahoo::YahooProvider;
pub use provider::MarketDataProvider;
pub use registry::{ProviderRegistry, RateLimitConfig, RateLimiter};
