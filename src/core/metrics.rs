//! Dollar-cost averaging metrics over a periodic price table.
//!
//! Everything here is a pure transform: no I/O, no shared state. Missing
//! samples are forward-filled per column, and anything that cannot be
//! derived (because a column has no observation yet) stays `None`.
use crate::core::error::MetricsError;
use chrono::NaiveDate;
use std::fmt::Display;

/// The tracked positions, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Asset {
    Btc,
    Eth,
    Usd,
}

impl Asset {
    pub const ALL: [Asset; 3] = [Asset::Btc, Asset::Eth, Asset::Usd];
}

impl Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Asset::Btc => "BTC",
                Asset::Eth => "ETH",
                Asset::Usd => "USD",
            }
        )
    }
}

/// One sampled period. A `None` price means the lookup failed or was empty.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub date: NaiveDate,
    pub btc_price_usd: Option<f64>,
    pub eth_price_usd: Option<f64>,
    pub fx_rate_try_per_usd: Option<f64>,
}

/// Derived figures for one asset in one period.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    /// Units bought this period.
    pub bought: Option<f64>,
    /// Units held after this period's purchase.
    pub cumulative: Option<f64>,
    /// Holding valued at the last period's prices, in TRY.
    pub value_try: Option<f64>,
    pub pl_try: Option<f64>,
    pub pl_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRow {
    pub date: NaiveDate,
    /// Gap-filled prices.
    pub btc_price_usd: Option<f64>,
    pub eth_price_usd: Option<f64>,
    pub fx_rate_try_per_usd: Option<f64>,
    pub total_invested_try: f64,
    pub btc: Position,
    pub eth: Position,
    pub usd: Position,
}

impl EnrichedRow {
    pub fn position(&self, asset: Asset) -> &Position {
        match asset {
            Asset::Btc => &self.btc,
            Asset::Eth => &self.eth,
            Asset::Usd => &self.usd,
        }
    }

    fn position_mut(&mut self, asset: Asset) -> &mut Position {
        match asset {
            Asset::Btc => &mut self.btc,
            Asset::Eth => &mut self.eth,
            Asset::Usd => &mut self.usd,
        }
    }
}

/// Last-known-value state for one column.
#[derive(Debug, Default, Clone, Copy)]
struct Carry(Option<f64>);

impl Carry {
    fn fill(&mut self, value: Option<f64>) -> Option<f64> {
        if value.is_some() {
            self.0 = value;
        }
        self.0
    }
}

/// Running total that skips undefined contributions.
#[derive(Debug, Default, Clone, Copy)]
struct Running(Option<f64>);

impl Running {
    fn add(&mut self, value: Option<f64>) -> Option<f64> {
        if let Some(v) = value {
            self.0 = Some(self.0.unwrap_or(0.0) + v);
        }
        self.0
    }
}

/// Replaces each missing value with the nearest preceding one.
/// Values before the first observation stay `None`.
pub fn forward_fill<I>(values: I) -> Vec<Option<f64>>
where
    I: IntoIterator<Item = Option<f64>>,
{
    values
        .into_iter()
        .scan(Carry::default(), |carry, v| Some(carry.fill(v)))
        .collect()
}

fn divide(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    numerator.zip(denominator).map(|(n, d)| n / d)
}

/// Simulates buying `contribution_per_period` TRY worth of USD, BTC and ETH
/// on every row and values the accumulated holdings at the last row's prices.
pub fn compute(
    rows: &[PriceRow],
    contribution_per_period: f64,
) -> Result<Vec<EnrichedRow>, MetricsError> {
    if rows.is_empty() {
        return Err(MetricsError::InvalidInput(
            "price series is empty".to_string(),
        ));
    }
    if !contribution_per_period.is_finite() || contribution_per_period <= 0.0 {
        return Err(MetricsError::InvalidInput(format!(
            "contribution per period must be positive, got {contribution_per_period}"
        )));
    }

    let (mut btc_price, mut eth_price, mut fx_rate) =
        (Carry::default(), Carry::default(), Carry::default());
    let (mut cum_btc, mut cum_eth, mut cum_usd) =
        (Running::default(), Running::default(), Running::default());

    let mut enriched: Vec<EnrichedRow> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let btc = btc_price.fill(row.btc_price_usd);
            let eth = eth_price.fill(row.eth_price_usd);
            let fx = fx_rate.fill(row.fx_rate_try_per_usd);

            let usd_bought = divide(Some(contribution_per_period), fx);
            let btc_bought = divide(usd_bought, btc);
            let eth_bought = divide(usd_bought, eth);

            EnrichedRow {
                date: row.date,
                btc_price_usd: btc,
                eth_price_usd: eth,
                fx_rate_try_per_usd: fx,
                total_invested_try: contribution_per_period * (i + 1) as f64,
                btc: Position {
                    bought: btc_bought,
                    cumulative: cum_btc.add(btc_bought),
                    ..Position::default()
                },
                eth: Position {
                    bought: eth_bought,
                    cumulative: cum_eth.add(eth_bought),
                    ..Position::default()
                },
                usd: Position {
                    bought: usd_bought,
                    cumulative: cum_usd.add(usd_bought),
                    ..Position::default()
                },
            }
        })
        .collect();

    // The carries now hold the last row's gap-filled prices.
    let fx_last = fx_rate.0;
    let unit_price_try = |asset: Asset| -> Option<f64> {
        match asset {
            Asset::Btc => btc_price.0.zip(fx_last).map(|(p, fx)| p * fx),
            Asset::Eth => eth_price.0.zip(fx_last).map(|(p, fx)| p * fx),
            Asset::Usd => fx_last,
        }
    };
    let last_prices: Vec<(Asset, Option<f64>)> =
        Asset::ALL.iter().map(|&a| (a, unit_price_try(a))).collect();

    for row in &mut enriched {
        let invested = row.total_invested_try;
        for &(asset, price_try) in &last_prices {
            let position = row.position_mut(asset);
            position.value_try = position.cumulative.zip(price_try).map(|(u, p)| u * p);
            position.pl_try = position.value_try.map(|v| v - invested);
            position.pl_pct = position.pl_try.map(|pl| pl / invested * 100.0);
        }
    }

    Ok(enriched)
}
