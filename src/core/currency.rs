//! Currency conversion abstractions

use crate::core::error::FetchError;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    /// Units of `to` per one unit of `from` as of `on`.
    async fn get_rate(
        &self,
        from: &str,
        to: &str,
        on: NaiveDate,
    ) -> Result<Option<f64>, FetchError>;
}
