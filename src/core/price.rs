//! Pricing abstractions

use crate::core::error::FetchError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Daily close of `symbol` for the candle opening at `at`.
    ///
    /// `Ok(None)` means the source answered without a usable price.
    async fn get_close_price(
        &self,
        symbol: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<f64>, FetchError>;
}
