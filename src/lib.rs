pub mod cli;
pub mod core;
pub mod export;
pub mod providers;

use crate::export::ReportFiles;
use anyhow::Result;
use tracing::{debug, info};

pub enum AppCommand {
    Report,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<ReportFiles> {
    info!("DCA report starting...");

    let config = match config_path {
        Some(path) => core::config::AppConfig::load_from_path(path)?,
        None => core::config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let client = providers::http_client(config.network.timeout())?;
    let retry = config.network.retry_policy();

    let binance_url = config
        .providers
        .binance
        .as_ref()
        .map_or("https://api.binance.com", |p| &p.base_url);
    let price_provider =
        providers::binance::BinanceProvider::new(binance_url, client.clone(), retry);

    let yahoo_url = config
        .providers
        .yahoo
        .as_ref()
        .map_or("https://query1.finance.yahoo.com", |p| &p.base_url);
    let currency_provider =
        providers::yahoo_finance::YahooCurrencyProvider::new(yahoo_url, client, retry);

    match command {
        AppCommand::Report => cli::report::run(&config, &price_provider, &currency_provider).await,
    }
}
