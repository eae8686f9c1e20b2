//! BAS reporting period parsing
//!
//! Two period formats exist: `Q<n>-<year>` for a calendar quarter and
//! `<startYear>-<endYear>` for an Australian financial year (July 1 to
//! June 30).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::types::{CoreError, CoreResult};

/// A resolved reporting period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxPeriod {
    /// The label as supplied ("Q2-2024", "2023-2024")
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TaxPeriod {
    /// Parse a period string. `"Q2-2024"` resolves to April 1 - June 30
    /// 2024; `"2023-2024"` resolves to July 1 2023 - June 30 2024.
    pub fn parse(period: &str) -> CoreResult<Self> {
        let (start, end) = if let Some(rest) = period.strip_prefix('Q') {
            parse_quarter(rest)?
        } else {
            parse_financial_year(period)?
        };
        Ok(Self {
            label: period.to_string(),
            start,
            end,
        })
    }

    /// GST due date: the 28th of the month following the period's end month
    pub fn gst_due_date(&self) -> NaiveDate {
        let (year, month) = match self.end.month() {
            12 => (self.end.year() + 1, 1),
            m => (self.end.year(), m + 1),
        };
        // the 28th exists in every month
        NaiveDate::from_ymd_opt(year, month, 28).unwrap_or(self.end)
    }
}

fn parse_quarter(rest: &str) -> CoreResult<(NaiveDate, NaiveDate)> {
    let (quarter, year) = rest
        .split_once('-')
        .ok_or_else(|| malformed("expected Q<n>-<year>"))?;
    let quarter: u32 = quarter.parse().map_err(|_| malformed("invalid quarter"))?;
    let year: i32 = year.parse().map_err(|_| malformed("invalid year"))?;
    if !(1..=4).contains(&quarter) {
        return Err(malformed("quarter must be 1-4"));
    }

    let start_month = (quarter - 1) * 3 + 1;
    let start = date(year, start_month, 1)?;
    let end = last_day_of_month(year, start_month + 2)?;
    Ok((start, end))
}

fn parse_financial_year(period: &str) -> CoreResult<(NaiveDate, NaiveDate)> {
    let (start_year, end_year) = period
        .split_once('-')
        .ok_or_else(|| malformed("expected <startYear>-<endYear>"))?;
    let start_year: i32 = start_year
        .parse()
        .map_err(|_| malformed("invalid start year"))?;
    let end_year: i32 = end_year.parse().map_err(|_| malformed("invalid end year"))?;

    Ok((date(start_year, 7, 1)?, date(end_year, 6, 30)?))
}

fn last_day_of_month(year: i32, month: u32) -> CoreResult<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    date(next_year, next_month, 1)?
        .pred_opt()
        .ok_or_else(|| malformed("period out of range"))
}

fn date(year: i32, month: u32, day: u32) -> CoreResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| malformed("period out of range"))
}

fn malformed(detail: &str) -> CoreError {
    CoreError::Validation(format!("Malformed period: {detail}"))
}
