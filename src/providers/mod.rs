pub mod binance;
pub mod util;
pub mod yahoo_finance;

use anyhow::{Context, Result};
use std::time::Duration;

/// HTTP client shared by all providers of a run.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent("dcareport/1.0")
        .timeout(timeout)
        .build()
        .context("Failed to build HTTP client")
}
