use super::ui;
use crate::core::config::AppConfig;
use crate::core::sampler::Sampler;
use crate::core::schedule::lookback_start;
use crate::core::{
    CurrencyRateProvider, InvestmentSummary, PriceProvider, PriceRow, compute, summarize,
};
use crate::export::{self, ReportFiles};
use anyhow::{Context, Result};
use comfy_table::Cell;
use tracing::info;

impl InvestmentSummary {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();

        table.set_header(vec![
            ui::header_cell("Asset"),
            ui::header_cell("Units"),
            ui::header_cell("Invested (TRY)"),
            ui::header_cell("Value (TRY)"),
            ui::header_cell("P/L (TRY)"),
            ui::header_cell("ROI (%)"),
        ]);

        for entry in &self.assets {
            table.add_row(vec![
                Cell::new(entry.asset.to_string()),
                ui::format_optional_cell(entry.units, |u| format!("{u:.8}")),
                Cell::new(format!("{:.2}", entry.total_invested_try)),
                ui::format_optional_cell(entry.current_value_try, |v| format!("{v:.2}")),
                ui::signed_cell(entry.pl_try, ""),
                ui::signed_cell(entry.pl_pct, "%"),
            ]);
        }

        let mut output = format!(
            "DCA summary as of {} | periods: {}\n\n",
            ui::style_text(&self.as_of.to_string(), ui::StyleType::Title),
            self.periods
        );
        output.push_str(&table.to_string());
        output
    }
}

/// Samples prices, computes the metrics and writes the report files.
pub async fn run(
    config: &AppConfig,
    price_provider: &dyn PriceProvider,
    currency_provider: &dyn CurrencyRateProvider,
) -> Result<ReportFiles> {
    let now = chrono::Local::now().naive_local();
    let end = config.end_date_or(now.date());
    let start = lookback_start(end, config.years_back)?;
    let dates = config.schedule.dates(start, end)?;
    info!(
        "Schedule {} from {} to {}: {} periods",
        config.schedule,
        start,
        end,
        dates.len()
    );

    let pb = ui::new_progress_bar(dates.len() as u64);
    pb.set_message("Fetching prices...");
    let sampler = Sampler::new(
        price_provider,
        currency_provider,
        config.network.request_delay(),
    );
    let rows = sampler
        .sample(&dates, &|row: &PriceRow| {
            pb.set_message(format!("Fetched {}", row.date));
            pb.inc(1);
        })
        .await;
    pb.finish_and_clear();

    let enriched =
        compute(&rows, config.contribution).context("Failed to compute investment metrics")?;
    let summary = summarize(&enriched).context("Failed to summarize investment metrics")?;

    let output_dir = config.default_output_dir()?;
    let files = export::write_report(&output_dir, &enriched, &summary, now)?;

    println!("{}", summary.display_as_table());
    println!(
        "\n{} {}\n{} {}",
        ui::style_text("Report:", ui::StyleType::TotalLabel),
        files.detail.display(),
        ui::style_text("Summary:", ui::StyleType::Subtle),
        files.summary.display()
    );

    Ok(files)
}
