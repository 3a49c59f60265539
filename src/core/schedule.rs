//! Investment calendars

use anyhow::{Result, anyhow, bail};
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

fn default_investment_day() -> u32 {
    26
}

fn default_interval_days() -> u32 {
    30
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Schedule {
    /// Same day every month, clamped to the month's last day.
    FixedDay {
        #[serde(default = "default_investment_day")]
        investment_day: u32,
    },
    /// Every `interval_days` days from the lookback start.
    FixedInterval {
        #[serde(default = "default_interval_days")]
        interval_days: u32,
    },
}

impl Default for Schedule {
    fn default() -> Self {
        Schedule::FixedDay {
            investment_day: default_investment_day(),
        }
    }
}

impl Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Schedule::FixedDay { investment_day } => {
                write!(f, "fixed_day (day {investment_day})")
            }
            Schedule::FixedInterval { interval_days } => {
                write!(f, "fixed_interval (every {interval_days} days)")
            }
        }
    }
}

impl Schedule {
    pub fn validate(&self) -> Result<()> {
        match *self {
            Schedule::FixedDay { investment_day } if !(1..=31).contains(&investment_day) => {
                bail!("investment_day must be between 1 and 31, got {investment_day}")
            }
            Schedule::FixedInterval { interval_days: 0 } => {
                bail!("interval_days must be at least 1")
            }
            _ => Ok(()),
        }
    }

    /// All scheduled dates from `start` up to and including `end`, ascending.
    pub fn dates(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<NaiveDate>> {
        self.validate()?;
        let mut dates = Vec::new();

        match *self {
            Schedule::FixedDay { investment_day } => {
                let mut current = pin_day(start, investment_day)?;
                while current <= end {
                    dates.push(current);
                    let next_month = first_of_month(current)?
                        .checked_add_months(Months::new(1))
                        .ok_or_else(|| anyhow!("date out of range after {current}"))?;
                    current = pin_day(next_month, investment_day)?;
                }
            }
            Schedule::FixedInterval { interval_days } => {
                let mut current = start;
                while current <= end {
                    dates.push(current);
                    current = current
                        .checked_add_days(Days::new(u64::from(interval_days)))
                        .ok_or_else(|| anyhow!("date out of range after {current}"))?;
                }
            }
        }

        Ok(dates)
    }
}

/// `end` moved back by whole calendar years.
pub fn lookback_start(end: NaiveDate, years_back: u32) -> Result<NaiveDate> {
    end.checked_sub_months(Months::new(years_back.saturating_mul(12)))
        .ok_or_else(|| anyhow!("cannot look back {years_back} years from {end}"))
}

fn first_of_month(date: NaiveDate) -> Result<NaiveDate> {
    date.with_day(1)
        .ok_or_else(|| anyhow!("invalid month start for {date}"))
}

/// Moves `date` to `day` of its month, or the month's last day if shorter.
fn pin_day(date: NaiveDate, day: u32) -> Result<NaiveDate> {
    if let Some(pinned) = date.with_day(day) {
        return Ok(pinned);
    }
    first_of_month(date)?
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| anyhow!("cannot find last day of month for {date}"))
}
