use crate::core::{CurrencyRateProvider, FetchError};
use crate::providers::util::{RetryPolicy, fetch_text, with_retry};
use async_trait::async_trait;
use chrono::{Days, NaiveDate, NaiveTime};
use serde::Deserialize;
use tracing::{debug, instrument};

/// Days of history requested before the target date, so weekends and
/// holidays still resolve to the last trading close.
const LOOKBACK_DAYS: u64 = 5;

// YahooCurrencyProvider implementation for CurrencyRateProvider
pub struct YahooCurrencyProvider {
    base_url: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl YahooCurrencyProvider {
    pub fn new(base_url: &str, client: reqwest::Client, retry: RetryPolicy) -> Self {
        YahooCurrencyProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retry,
        }
    }
}

#[derive(Debug, Deserialize)]
struct YahooCurrencyResponse {
    chart: CurrencyChartResult,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartResult {
    result: Option<Vec<CurrencyChartItem>>,
}

#[derive(Debug, Deserialize)]
struct CurrencyChartItem {
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

/// Last non-null close in the requested window.
fn last_close(symbol: &str, body: &str) -> Result<Option<f64>, FetchError> {
    let data: YahooCurrencyResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Parse {
            symbol: symbol.to_string(),
            message: e.to_string(),
        })?;

    let rate = data
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|item| item.indicators)
        .and_then(|inds| inds.quote.into_iter().next())
        .and_then(|q| q.close)
        .and_then(|closes| closes.into_iter().rev().flatten().next());

    Ok(rate.filter(|r| *r > 0.0))
}

fn midnight_timestamp(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

#[async_trait]
impl CurrencyRateProvider for YahooCurrencyProvider {
    #[instrument(name = "YahooRateFetch", skip(self))]
    async fn get_rate(
        &self,
        from: &str,
        to: &str,
        on: NaiveDate,
    ) -> Result<Option<f64>, FetchError> {
        let symbol = format!("{from}{to}=X");
        let window_start = on.checked_sub_days(Days::new(LOOKBACK_DAYS)).unwrap_or(on);
        let window_end = on.checked_add_days(Days::new(1)).unwrap_or(on);

        let url = format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d",
            self.base_url,
            symbol,
            midnight_timestamp(window_start),
            midnight_timestamp(window_end)
        );
        debug!("Requesting currency rate from {}", url);

        let rate = with_retry(
            || async {
                let body = fetch_text(&self.client, &symbol, &url).await?;
                last_close(&symbol, &body)
            },
            &self.retry,
        )
        .await?;
        if rate.is_none() {
            debug!("No rate data found for currency pair: {symbol} on {on}");
        }
        Ok(rate)
    }
}
