//! Condenses an enriched table into one line per asset.
use crate::core::error::MetricsError;
use crate::core::metrics::{Asset, EnrichedRow};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct AssetSummary {
    pub asset: Asset,
    pub units: Option<f64>,
    pub total_invested_try: f64,
    pub current_value_try: Option<f64>,
    pub pl_try: Option<f64>,
    pub pl_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentSummary {
    /// Date of the last period, whose prices value every holding.
    pub as_of: NaiveDate,
    pub periods: usize,
    pub assets: Vec<AssetSummary>,
}

/// Reads the final holdings and returns from the last enriched row.
pub fn summarize(enriched: &[EnrichedRow]) -> Result<InvestmentSummary, MetricsError> {
    let last = enriched.last().ok_or(MetricsError::EmptyInput)?;

    let assets = Asset::ALL
        .iter()
        .map(|&asset| {
            let position = last.position(asset);
            AssetSummary {
                asset,
                units: position.cumulative,
                total_invested_try: last.total_invested_try,
                current_value_try: position.value_try,
                pl_try: position.pl_try,
                pl_pct: position.pl_pct,
            }
        })
        .collect();

    Ok(InvestmentSummary {
        as_of: last.date,
        periods: enriched.len(),
        assets,
    })
}
