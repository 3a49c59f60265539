use crate::core::{FetchError, PriceProvider};
use crate::providers::util::{RetryPolicy, fetch_text, with_retry};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, instrument};

/// Daily klines from the Binance spot market.
pub struct BinanceProvider {
    base_url: String,
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl BinanceProvider {
    pub fn new(base_url: &str, client: reqwest::Client, retry: RetryPolicy) -> Self {
        BinanceProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retry,
        }
    }
}

/// Close of the first kline. Each kline is a mixed array:
/// `[open_time, "open", "high", "low", "close", "volume", ...]`.
fn parse_close(symbol: &str, body: &str) -> Result<Option<f64>, FetchError> {
    let parse_error = |message: String| FetchError::Parse {
        symbol: symbol.to_string(),
        message,
    };

    let klines: Vec<Vec<Value>> =
        serde_json::from_str(body).map_err(|e| parse_error(e.to_string()))?;
    let Some(kline) = klines.first() else {
        return Ok(None);
    };

    let close = match kline.get(4) {
        Some(Value::String(s)) => s
            .parse::<f64>()
            .map_err(|e| parse_error(format!("invalid close '{s}': {e}")))?,
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| parse_error(format!("invalid close {n}")))?,
        _ => return Err(parse_error("kline has no close field".to_string())),
    };

    if close > 0.0 {
        Ok(Some(close))
    } else {
        debug!("Ignoring non-positive close {close} for {symbol}");
        Ok(None)
    }
}

#[async_trait]
impl PriceProvider for BinanceProvider {
    #[instrument(name = "BinancePriceFetch", skip(self), fields(symbol = %symbol))]
    async fn get_close_price(
        &self,
        symbol: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<f64>, FetchError> {
        let url = format!(
            "{}/api/v3/klines?symbol={}&interval=1d&limit=1&startTime={}",
            self.base_url,
            symbol,
            at.timestamp_millis()
        );
        debug!("Requesting kline from {}", url);

        with_retry(
            || async {
                let body = fetch_text(&self.client, symbol, &url).await?;
                parse_close(symbol, &body)
            },
            &self.retry,
        )
        .await
    }
}
