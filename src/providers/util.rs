use crate::core::FetchError;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// GETs `url` and returns the body of a 2xx response. `symbol` only labels errors.
pub async fn fetch_text(
    client: &reqwest::Client,
    symbol: &str,
    url: &str,
) -> Result<String, FetchError> {
    let request_error = |source| FetchError::Request {
        symbol: symbol.to_string(),
        source,
    };

    let response = client.get(url).send().await.map_err(request_error)?;
    if !response.status().is_success() {
        return Err(FetchError::Status {
            symbol: symbol.to_string(),
            status: response.status(),
        });
    }
    response.text().await.map_err(request_error)
}

/// How often and how patiently a failing request is repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of retry attempts (total runs = 1 initial + retries)
    pub retries: usize,
    /// Milliseconds before the first retry
    pub delay_ms: u64,
    /// Multiplier applied to the delay after each retry
    pub backoff_factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            retries: 3,
            delay_ms: 500,
            backoff_factor: 2,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let exponent = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        let factor = u64::from(self.backoff_factor.max(1)).saturating_pow(exponent);
        Duration::from_millis(self.delay_ms.saturating_mul(factor))
    }
}

/// Retries an async operation with exponential backoff
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `policy`: Attempts and delays between them
///
/// # Returns
/// Either the successful result or the error after all attempts
pub async fn with_retry<F, Fut, T, E>(mut operation: F, policy: &RetryPolicy) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > policy.retries {
                    return Err(err);
                }
                let delay = policy.delay_for(attempt);
                debug!(
                    "Attempt {}/{} failed: {}. Retrying in {:?}...",
                    attempt, policy.retries, err, delay
                );
                attempt += 1;
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn quick_policy(retries: usize) -> RetryPolicy {
        RetryPolicy {
            retries,
            delay_ms: 0,
            backoff_factor: 2,
        }
    }

    #[tokio::test]
    async fn test_retry_succeeds_after_failures() {
        let calls = AtomicUsize::new(0);
        let result: Result<u32, String> = with_retry(
            || async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 { Err(format!("failure {n}")) } else { Ok(7) }
            },
            &quick_policy(3),
        )
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_with_last_error() {
        let calls = AtomicUsize::new(0);
        let result: Result<u32, String> = with_retry(
            || async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                Err(format!("failure {n}"))
            },
            &quick_policy(2),
        )
        .await;

        assert_eq!(result, Err("failure 2".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_retries_runs_once() {
        let calls = AtomicUsize::new(0);
        let result: Result<(), &str> = with_retry(
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("down")
            },
            &quick_policy(0),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_delays() {
        let policy = RetryPolicy {
            retries: 4,
            delay_ms: 100,
            backoff_factor: 3,
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(300));
        assert_eq!(policy.delay_for(3), Duration::from_millis(900));

        let flat = RetryPolicy {
            backoff_factor: 0,
            ..policy
        };
        assert_eq!(flat.delay_for(3), Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_fetch_text_returns_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quote"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[1,2]"))
            .mount(&mock_server)
            .await;

        let url = format!("{}/quote", mock_server.uri());
        let body = fetch_text(&reqwest::Client::new(), "BTCUSDT", &url)
            .await
            .unwrap();
        assert_eq!(body, "[1,2]");
    }

    #[tokio::test]
    async fn test_fetch_text_rejects_error_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/quote"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .mount(&mock_server)
            .await;

        let url = format!("{}/quote", mock_server.uri());
        let err = fetch_text(&reqwest::Client::new(), "BTCUSDT", &url)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { ref symbol, .. } if symbol == "BTCUSDT"));
        assert_eq!(err.to_string(), "HTTP error: 404 Not Found for BTCUSDT");
    }
}
