//! CSV report files.
use crate::core::{Asset, EnrichedRow, InvestmentSummary};
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Rendered in place of any value that could not be derived.
pub const NO_DATA: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFiles {
    pub detail: PathBuf,
    pub summary: PathBuf,
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| NO_DATA.to_string(), |v| format!("{v:.precision$}"))
}

fn detail_header() -> Vec<String> {
    let mut header: Vec<String> = ["Date", "BTCUSDT", "ETHUSDT", "USDTRY", "Total_Invested_TRY"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    for column in ["Bought", "Total", "Value_TRY", "PL_TRY", "ROI_%"] {
        for asset in Asset::ALL {
            header.push(format!("{asset}_{column}"));
        }
    }
    header
}

fn detail_record(row: &EnrichedRow) -> Vec<String> {
    let mut record = vec![
        row.date.format("%Y-%m-%d").to_string(),
        fmt_opt(row.btc_price_usd, 2),
        fmt_opt(row.eth_price_usd, 2),
        fmt_opt(row.fx_rate_try_per_usd, 4),
        format!("{:.2}", row.total_invested_try),
    ];
    let positions = Asset::ALL.map(|asset| row.position(asset));
    record.extend(positions.iter().map(|p| fmt_opt(p.bought, 8)));
    record.extend(positions.iter().map(|p| fmt_opt(p.cumulative, 8)));
    record.extend(positions.iter().map(|p| fmt_opt(p.value_try, 2)));
    record.extend(positions.iter().map(|p| fmt_opt(p.pl_try, 2)));
    record.extend(positions.iter().map(|p| fmt_opt(p.pl_pct, 2)));
    record
}

/// One line per period, one column per field.
pub fn write_detail<W: Write>(out: W, rows: &[EnrichedRow]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(detail_header())?;
    for row in rows {
        writer.write_record(detail_record(row))?;
    }
    writer.flush()?;
    Ok(())
}

/// One line per asset.
pub fn write_summary<W: Write>(out: W, summary: &InvestmentSummary) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record([
        "Asset",
        "Units",
        "Total_Invested_TRY",
        "Current_Value_TRY",
        "PL_TRY",
        "ROI_%",
    ])?;
    for entry in &summary.assets {
        writer.write_record([
            entry.asset.to_string(),
            fmt_opt(entry.units, 8),
            format!("{:.2}", entry.total_invested_try),
            fmt_opt(entry.current_value_try, 2),
            fmt_opt(entry.pl_try, 2),
            fmt_opt(entry.pl_pct, 2),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes both tables into `dir`, named after `generated_at`.
pub fn write_report(
    dir: &Path,
    rows: &[EnrichedRow],
    summary: &InvestmentSummary,
    generated_at: NaiveDateTime,
) -> Result<ReportFiles> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let stamp = generated_at.format("%Y%m%d_%H%M%S");
    let files = ReportFiles {
        detail: dir.join(format!("dca_report_{stamp}.csv")),
        summary: dir.join(format!("dca_summary_{stamp}.csv")),
    };

    debug!("Writing detail table to {}", files.detail.display());
    let detail = fs::File::create(&files.detail)
        .with_context(|| format!("Failed to create {}", files.detail.display()))?;
    write_detail(detail, rows)
        .with_context(|| format!("Failed to write {}", files.detail.display()))?;

    debug!("Writing summary table to {}", files.summary.display());
    let summary_file = fs::File::create(&files.summary)
        .with_context(|| format!("Failed to create {}", files.summary.display()))?;
    write_summary(summary_file, summary)
        .with_context(|| format!("Failed to write {}", files.summary.display()))?;

    info!("Report written to {}", dir.display());
    Ok(files)
}
