use std::fs;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_binance_mock_server(
        btc_response: Option<&str>,
        eth_response: Option<&str>,
    ) -> MockServer {
        let mock_server = MockServer::start().await;

        for (symbol, response) in [("BTCUSDT", btc_response), ("ETHUSDT", eth_response)] {
            let template = match response {
                Some(body) => ResponseTemplate::new(200).set_body_string(body),
                None => ResponseTemplate::new(500),
            };
            Mock::given(method("GET"))
                .and(path("/api/v3/klines"))
                .and(query_param("symbol", symbol))
                .respond_with(template)
                .mount(&mock_server)
                .await;
        }

        mock_server
    }

    pub async fn create_yahoo_mock_server(mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/USDTRY=X"))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn kline(close: &str) -> String {
        format!(r#"[[1706227200000,"1.0","1.0","1.0","{close}","10.0",1706313599999,"0",1,"0","0","0"]]"#)
    }

    pub const USDTRY_RESPONSE: &str = r#"{
        "chart": {
            "result": [{
                "meta": { "currency": "TRY" },
                "timestamp": [1705881600, 1705968000],
                "indicators": { "quote": [{ "close": [31.5, 32.0] }] }
            }]
        }
    }"#;
}

fn write_config(
    dir: &std::path::Path,
    binance_uri: &str,
    yahoo_uri: &str,
    output_dir: &std::path::Path,
) -> std::path::PathBuf {
    let config_path = dir.join("config.yaml");
    let config_content = format!(
        r#"
schedule:
  mode: fixed_day
  investment_day: 26
years_back: 1
contribution: 1024
end_date: 2024-03-26
output_dir: "{}"
providers:
  binance:
    base_url: {}
  yahoo:
    base_url: {}
network:
  retries: 0
  retry_delay_ms: 0
  request_delay_ms: 0
"#,
        output_dir.display(),
        binance_uri,
        yahoo_uri
    );
    fs::write(&config_path, config_content).expect("Failed to write config file");
    config_path
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_mock() {
    let btc = test_utils::kline("4096.00");
    let eth = test_utils::kline("256.00");
    let binance = test_utils::create_binance_mock_server(Some(&btc), Some(&eth)).await;
    let yahoo = test_utils::create_yahoo_mock_server(test_utils::USDTRY_RESPONSE).await;

    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let output_dir = temp_dir.path().join("reports");
    let config_path = write_config(temp_dir.path(), &binance.uri(), &yahoo.uri(), &output_dir);

    let result = dcareport::run_command(
        dcareport::AppCommand::Report,
        Some(config_path.to_str().unwrap()),
    )
    .await;
    let files = result.expect("Report command failed");
    info!(?files, "Report files written");

    assert!(files.detail.starts_with(&output_dir));
    let detail = fs::read_to_string(&files.detail).unwrap();
    let lines: Vec<&str> = detail.lines().collect();
    // Header plus 2023-03-26 ..= 2024-03-26
    assert_eq!(lines.len(), 14);
    assert!(lines[1].starts_with("2023-03-26,4096.00,256.00,32.0000,1024.00"));
    assert!(lines[13].starts_with("2024-03-26,4096.00,256.00,32.0000,13312.00"));

    // Flat prices: every position breaks even.
    let summary = fs::read_to_string(&files.summary).unwrap();
    assert!(summary.contains("BTC,0.10156250,13312.00,13312.00,0.00,0.00"));
    assert!(summary.contains("ETH,1.62500000,13312.00,13312.00,0.00,0.00"));
    assert!(summary.contains("USD,416.00000000,13312.00,13312.00,0.00,0.00"));
}

#[test_log::test(tokio::test)]
async fn test_failing_price_source_reports_no_data() {
    let btc = test_utils::kline("4096.00");
    let binance = test_utils::create_binance_mock_server(Some(&btc), None).await;
    let yahoo = test_utils::create_yahoo_mock_server(test_utils::USDTRY_RESPONSE).await;

    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let output_dir = temp_dir.path().join("reports");
    let config_path = write_config(temp_dir.path(), &binance.uri(), &yahoo.uri(), &output_dir);

    let files = dcareport::run_command(
        dcareport::AppCommand::Report,
        Some(config_path.to_str().unwrap()),
    )
    .await
    .expect("A failing source should not abort the report");

    let summary = fs::read_to_string(&files.summary).unwrap();
    assert!(summary.contains("ETH,N/A,13312.00,N/A,N/A,N/A"));
    assert!(summary.contains("BTC,0.10156250,13312.00,13312.00,0.00,0.00"));
}

#[test_log::test(tokio::test)]
async fn test_invalid_config_writes_nothing() {
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let output_dir = temp_dir.path().join("reports");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(
        &config_path,
        format!(
            "years_back: 1\ncontribution: 0\noutput_dir: \"{}\"\n",
            output_dir.display()
        ),
    )
    .unwrap();

    let result = dcareport::run_command(
        dcareport::AppCommand::Report,
        Some(config_path.to_str().unwrap()),
    )
    .await;

    assert!(result.is_err());
    assert!(!output_dir.exists());
}
