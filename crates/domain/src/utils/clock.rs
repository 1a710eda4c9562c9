//! Fixed-offset time arithmetic.
//!
//! Tenants store their timezone as a signed whole-hour offset string (for
//! example `"-3"`), not an IANA zone, so conversion is plain addition and
//! subtraction of that offset. Daylight-saving transitions are therefore not
//! modelled: a tenant in a DST region will see wall-clock times drift by an
//! hour across a transition. Known limitation, kept until tenant data moves
//! to real zone identifiers.

use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, Utc};

use crate::constants::{
    DEFAULT_UTC_OFFSET_HOURS, MAX_UTC_OFFSET_HOURS, MIN_UTC_OFFSET_HOURS, TIME_OF_DAY_FORMAT,
};
use crate::errors::{Result, ScheduleError};

/// Convert a tenant-local naive datetime to a UTC instant.
pub fn to_utc(local: NaiveDateTime, offset_hours: i32) -> DateTime<Utc> {
    (local - Duration::hours(i64::from(offset_hours))).and_utc()
}

/// Convert a UTC instant to a tenant-local naive datetime.
pub fn to_local(utc: DateTime<Utc>, offset_hours: i32) -> NaiveDateTime {
    utc.naive_utc() + Duration::hours(i64::from(offset_hours))
}

/// Parse a tenant offset setting.
///
/// Anything absent, unparsable, or outside [-12, 14] falls back to the
/// platform default of -3.
pub fn parse_offset_hours(raw: &str) -> i32 {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|hours| (MIN_UTC_OFFSET_HOURS..=MAX_UTC_OFFSET_HOURS).contains(hours))
        .unwrap_or(DEFAULT_UTC_OFFSET_HOURS)
}

/// Parse a time-of-day string, accepting `HH:MM` and `HH:MM:SS`.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, TIME_OF_DAY_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| ScheduleError::Validation(format!("invalid time of day: {raw:?}")))
}
