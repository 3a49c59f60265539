//! Collects one price row per scheduled date.
use crate::core::{CurrencyRateProvider, FetchError, PriceProvider, PriceRow};
use chrono::{NaiveDate, NaiveTime};
use std::time::Duration;
use tracing::{debug, info, warn};

pub const BTC_SYMBOL: &str = "BTCUSDT";
pub const ETH_SYMBOL: &str = "ETHUSDT";
pub const FX_FROM: &str = "USD";
pub const FX_TO: &str = "TRY";

pub struct Sampler<'a> {
    price_provider: &'a dyn PriceProvider,
    currency_provider: &'a dyn CurrencyRateProvider,
    request_delay: Duration,
}

impl<'a> Sampler<'a> {
    pub fn new(
        price_provider: &'a dyn PriceProvider,
        currency_provider: &'a dyn CurrencyRateProvider,
        request_delay: Duration,
    ) -> Self {
        Sampler {
            price_provider,
            currency_provider,
            request_delay,
        }
    }

    /// Samples every date in order. Failed lookups become absent prices;
    /// `on_sample` is called after each row.
    pub async fn sample(&self, dates: &[NaiveDate], on_sample: &dyn Fn(&PriceRow)) -> Vec<PriceRow> {
        info!("Sampling {} scheduled dates", dates.len());
        let mut rows = Vec::with_capacity(dates.len());

        for (i, &date) in dates.iter().enumerate() {
            if i > 0 && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }
            let row = self.sample_date(date).await;
            on_sample(&row);
            rows.push(row);
        }

        rows
    }

    pub async fn sample_date(&self, date: NaiveDate) -> PriceRow {
        let at = date.and_time(NaiveTime::MIN).and_utc();

        let (btc, eth, fx) = futures::join!(
            self.price_provider.get_close_price(BTC_SYMBOL, at),
            self.price_provider.get_close_price(ETH_SYMBOL, at),
            self.currency_provider.get_rate(FX_FROM, FX_TO, date),
        );

        let row = PriceRow {
            date,
            btc_price_usd: recover(date, BTC_SYMBOL, btc),
            eth_price_usd: recover(date, ETH_SYMBOL, eth),
            fx_rate_try_per_usd: recover(date, "USDTRY", fx),
        };
        debug!(?row, "Sampled prices");
        row
    }
}

/// A failed lookup is a missing sample, filled in later by the calculator.
fn recover(date: NaiveDate, label: &str, result: Result<Option<f64>, FetchError>) -> Option<f64> {
    match result {
        Ok(Some(value)) => Some(value),
        Ok(None) => {
            warn!("No {label} data for {date}");
            None
        }
        Err(e) => {
            warn!("Fetching {label} for {date} failed: {e}");
            None
        }
    }
}
