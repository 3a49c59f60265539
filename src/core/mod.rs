//! Core business logic abstractions

pub mod config;
pub mod currency;
pub mod error;
pub mod log;
pub mod metrics;
pub mod price;
pub mod sampler;
pub mod schedule;
pub mod summary;

// Re-export main types for cleaner imports
pub use currency::CurrencyRateProvider;
pub use error::{FetchError, MetricsError};
pub use metrics::{Asset, EnrichedRow, PriceRow, compute};
pub use price::PriceProvider;
pub use summary::{InvestmentSummary, summarize};
