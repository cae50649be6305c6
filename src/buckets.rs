//! Time buckets for the trend chart.
//!
//! A bucket is one local calendar day or month. A sequence always ends at the
//! period containing the reference date and has no gaps.

use crate::error::ReportError;
use crate::types::TimeBucket;
use crate::util::{day_key, month_key};
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Granularity {
    Daily(u32),
    Monthly(u32),
}

impl Granularity {
    /// Canonical key of the bucket that would contain `date`.
    pub fn key_for(self, date: NaiveDate) -> String {
        match self {
            Granularity::Daily(_) => day_key(date),
            Granularity::Monthly(_) => month_key(date),
        }
    }

    pub fn len(self) -> u32 {
        match self {
            Granularity::Daily(n) | Granularity::Monthly(n) => n,
        }
    }

    pub fn is_empty(self) -> bool {
        self.len() == 0
    }
}

/// The four trend windows offered to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TrendWindow {
    #[serde(rename = "7D")]
    Last7Days,
    #[serde(rename = "30D")]
    Last30Days,
    #[serde(rename = "6M")]
    Last6Months,
    #[serde(rename = "YTD")]
    YearToDate,
}

impl TrendWindow {
    pub fn token(self) -> &'static str {
        match self {
            TrendWindow::Last7Days => "7D",
            TrendWindow::Last30Days => "30D",
            TrendWindow::Last6Months => "6M",
            TrendWindow::YearToDate => "YTD",
        }
    }

    /// Year-to-date depends on the reference month, so the window resolves
    /// against a local reference date.
    pub fn granularity(self, reference: NaiveDate) -> Granularity {
        match self {
            TrendWindow::Last7Days => Granularity::Daily(7),
            TrendWindow::Last30Days => Granularity::Daily(30),
            TrendWindow::Last6Months => Granularity::Monthly(6),
            TrendWindow::YearToDate => Granularity::Monthly(reference.month()),
        }
    }
}

impl fmt::Display for TrendWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for TrendWindow {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "7D" => Ok(TrendWindow::Last7Days),
            "30D" => Ok(TrendWindow::Last30Days),
            "6M" => Ok(TrendWindow::Last6Months),
            "YTD" => Ok(TrendWindow::YearToDate),
            _ => Err(ReportError::UnknownWindow(s.to_string())),
        }
    }
}

/// Build the ordered bucket sequence ending at the period containing `reference`.
pub fn generate_buckets(granularity: Granularity, reference: NaiveDate) -> Vec<TimeBucket> {
    match granularity {
        Granularity::Daily(n) => (0..n as u64)
            .rev()
            .filter_map(|back| reference.checked_sub_days(Days::new(back)))
            .map(|date| TimeBucket {
                key: day_key(date),
                label: date.format("%b %-d").to_string(),
                start: date,
            })
            .collect(),
        Granularity::Monthly(n) => {
            let Some(first) = reference.with_day(1) else {
                return Vec::new();
            };
            (0..n)
                .rev()
                .filter_map(|back| first.checked_sub_months(Months::new(back)))
                .map(|date| TimeBucket {
                    key: month_key(date),
                    label: date.format("%b %y").to_string(),
                    start: date,
                })
                .collect()
        }
    }
}
