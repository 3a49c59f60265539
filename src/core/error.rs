//! Error types shared by the metrics calculator and the provider seams

use thiserror::Error;

/// Structural errors raised by the metrics calculator and summary reducer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricsError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Cannot summarize an empty series")]
    EmptyInput,
}

/// Failure of a single price or rate lookup after all retries.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request error for {symbol}: {source}")]
    Request {
        symbol: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error: {status} for {symbol}")]
    Status {
        symbol: String,
        status: reqwest::StatusCode,
    },

    #[error("Failed to parse response for {symbol}: {message}")]
    Parse { symbol: String, message: String },
}
