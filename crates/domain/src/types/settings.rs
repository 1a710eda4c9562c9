//! Tenant schedule settings resolved from storage

use std::collections::BTreeSet;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_UTC_OFFSET_HOURS;

/// Per-tenant scheduling configuration, pre-resolved from the raw setting
/// strings so the core never performs ambient lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSettings {
    /// Signed whole-hour UTC offset. Fixed offset only; see
    /// [`crate::utils::clock`] for the DST caveat.
    pub utc_offset_hours: i32,
    pub opens_at: NaiveTime,
    pub closes_at: NaiveTime,
    /// Fully-closed weekdays, 0 = Sunday .. 6 = Saturday.
    pub closed_weekdays: BTreeSet<u8>,
    /// Candidate slots starting sooner than now + this many minutes are
    /// offered as unavailable.
    pub min_advance_minutes: i64,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            opens_at: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            closes_at: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default(),
            closed_weekdays: BTreeSet::new(),
            min_advance_minutes: 0,
        }
    }
}

impl ScheduleSettings {
    /// Whether the tenant is fully closed on the given weekday
    /// (0 = Sunday .. 6 = Saturday).
    pub fn is_closed_on(&self, weekday: u8) -> bool {
        self.closed_weekdays.contains(&weekday)
    }
}
