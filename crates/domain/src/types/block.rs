//! Staff unavailability blocks and recurring-series shapes

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Recurrence descriptor carried by every member of a recurring series.
///
/// Weekdays are numbered 0 = Sunday .. 6 = Saturday. An empty set means the
/// rule fires every day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub days_of_week: BTreeSet<u8>,
    pub start_time_of_day: NaiveTime,
    pub end_time_of_day: NaiveTime,
}

impl RecurrenceRule {
    /// Whether this rule generates an occurrence on the given date.
    pub fn matches(&self, date: NaiveDate) -> bool {
        self.days_of_week.is_empty()
            || self.days_of_week.contains(&weekday_number(date))
    }
}

/// Weekday of `date` in the 0 = Sunday .. 6 = Saturday numbering.
pub fn weekday_number(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// A period during which a staff member cannot take bookings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBlock {
    pub id: String,
    pub tenant_id: String,
    pub staff_id: String,
    pub start_time: DateTime<Utc>,
    /// Exclusive upper bound: the block covers `[start_time, end_time)`.
    pub end_time: DateTime<Utc>,
    pub reason: Option<String>,
    /// Present only on members of a recurring series.
    pub series_id: Option<String>,
    /// Present only on members of a recurring series.
    pub recurrence: Option<RecurrenceRule>,
    pub created_at: DateTime<Utc>,
}

/// Request shape for a one-off block.
#[derive(Debug, Clone, Deserialize)]
pub struct NewTimeBlock {
    pub tenant_id: String,
    pub staff_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub reason: Option<String>,
}

/// Request shape for a recurring series.
///
/// Time-of-day fields arrive as raw `HH:MM[:SS]` strings from the API layer
/// and are validated by the scheduling core.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRecurringBlocks {
    pub tenant_id: String,
    pub staff_id: String,
    pub start_date: NaiveDate,
    /// Defaults to twelve months past `start_date` when absent.
    pub end_date: Option<NaiveDate>,
    pub start_time_of_day: String,
    pub end_time_of_day: String,
    /// 0 = Sunday .. 6 = Saturday; empty means every day.
    pub days_of_week: BTreeSet<u8>,
    pub reason: Option<String>,
}

/// Replacement window for a single block.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeBlockUpdate {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// `None` keeps the stored reason.
    pub reason: Option<String>,
}

/// Partial update applied across series members.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeriesUpdate {
    pub reason: Option<String>,
    pub start_time_of_day: Option<String>,
    pub end_time_of_day: Option<String>,
}

impl SeriesUpdate {
    /// Whether the update touches member windows at all.
    pub fn changes_time(&self) -> bool {
        self.start_time_of_day.is_some() || self.end_time_of_day.is_some()
    }
}

/// Aggregate result of a recurring-creation call.
#[derive(Debug, Clone, Serialize)]
pub struct RecurringOutcome {
    pub series_id: String,
    pub blocks_created: usize,
    pub bookings_cancelled: usize,
}

/// Aggregate result of a whole-series update.
#[derive(Debug, Clone, Serialize)]
pub struct SeriesUpdateOutcome {
    pub members_updated: usize,
    pub bookings_cancelled: usize,
}

/// Aggregate result of a this-and-following update.
#[derive(Debug, Clone, Serialize)]
pub struct SplitUpdateOutcome {
    /// Fresh series id assigned to the split-off members; `None` when the
    /// anchor block was not part of a series.
    pub series_id: Option<String>,
    pub members_updated: usize,
    pub bookings_cancelled: usize,
}
