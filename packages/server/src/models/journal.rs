use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::journal::{DayMood, JournalRecord, MonthListing, MonthPeriod};

/// Month selector. Both default to the current UTC month.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MonthQuery {
    /// 1-12.
    pub month: Option<u32>,
    pub year: Option<i32>,
}

#[derive(Serialize, ToSchema)]
pub struct JournalResponse {
    pub data: JournalRecord,
}

#[derive(Serialize, ToSchema)]
pub struct ListMeta {
    pub filter_month: u32,
    pub filter_year: i32,
    pub days_in_month: u32,
    pub period_start: DateTime<Utc>,
    /// Exclusive upper bound.
    pub period_end: DateTime<Utc>,
}

impl From<MonthPeriod> for ListMeta {
    fn from(period: MonthPeriod) -> Self {
        Self {
            filter_month: period.month,
            filter_year: period.year,
            days_in_month: period.days_in_month,
            period_start: period.start,
            period_end: period.end,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct JournalListResponse {
    pub meta: ListMeta,
    /// Newest first.
    pub data: Vec<JournalRecord>,
}

impl From<MonthListing> for JournalListResponse {
    fn from(listing: MonthListing) -> Self {
        Self {
            meta: listing.period.into(),
            data: listing.journals,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct MoodCalendarResponse {
    pub year: i32,
    pub month: u32,
    /// Keyed by day of month; days without journals are absent.
    pub moods: BTreeMap<u32, DayMood>,
}

#[derive(Serialize, ToSchema)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Serialize, ToSchema)]
pub struct DeleteResponse {
    pub data: MessageBody,
}
