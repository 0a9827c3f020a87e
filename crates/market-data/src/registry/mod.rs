//! Provider registry: ordering, rate limiting, and range fallback.

mod rate_limiter;
#[allow(clippy::module_inception)]
mod registry;

pub use rate_limiter::{RateLimitConfig, RateLimiter};
pub use registry::ProviderRegistry;
