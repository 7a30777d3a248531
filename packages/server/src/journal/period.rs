use std::ops::Range;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};

use super::error::JournalError;

/// A calendar month in UTC, used to bound listing queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthPeriod {
    pub year: i32,
    pub month: u32,
    pub start: DateTime<Utc>,
    /// First instant of the following month (exclusive).
    pub end: DateTime<Utc>,
    pub days_in_month: u32,
}

impl MonthPeriod {
    pub fn new(year: i32, month: u32) -> Result<Self, JournalError> {
        if !(1..=12).contains(&month) {
            return Err(JournalError::Validation(
                "Month must be between 1 and 12".into(),
            ));
        }
        let next_start = if month == 12 {
            year.checked_add(1).map(|next_year| (next_year, 1))
        } else {
            Some((year, month + 1))
        };
        let first = NaiveDate::from_ymd_opt(year, month, 1);
        let next = next_start.and_then(|(y, m)| NaiveDate::from_ymd_opt(y, m, 1));
        let (Some(first), Some(next)) = (first, next) else {
            return Err(JournalError::Validation(format!(
                "Year {year} is out of range"
            )));
        };

        Ok(Self {
            year,
            month,
            start: first.and_time(NaiveTime::MIN).and_utc(),
            end: next.and_time(NaiveTime::MIN).and_utc(),
            days_in_month: (next - first).num_days() as u32,
        })
    }

    /// Resolve optional query parameters, defaulting each to the month of `now`.
    pub fn resolve(
        year: Option<i32>,
        month: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<Self, JournalError> {
        Self::new(year.unwrap_or(now.year()), month.unwrap_or(now.month()))
    }

    pub fn range(&self) -> Range<DateTime<Utc>> {
        self.start..self.end
    }
}
