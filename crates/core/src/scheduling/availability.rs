//! Bookable-slot computation for a staff member's day

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use reservo_domain::constants::TIME_OF_DAY_FORMAT;
use reservo_domain::types::block::weekday_number;
use reservo_domain::utils::clock::{to_local, to_utc};
use reservo_domain::{Booking, Result, ScheduleError, ScheduleSettings, SlotOffer, TimeBlock};
use tracing::debug;

use super::overlap::{obstructing_bookings, overlapping_blocks};
use super::ports::{BookingRepository, TenantSettingsProvider, TimeBlockRepository};

/// Inputs for one slot computation.
#[derive(Debug, Clone)]
pub struct SlotQuery {
    pub date: NaiveDate,
    pub service_duration_minutes: i64,
    pub now_utc: DateTime<Utc>,
}

/// Enumerate the offerable start times for one staff day.
///
/// `bookings` and `blocks` are a staff-scoped snapshot covering the business
/// day. Candidates advance in steps of the service duration from opening
/// until the last start that still fits before closing. A candidate lost to
/// an overlap is omitted; one failing only the minimum-advance rule is kept
/// but flagged unavailable so callers can render it differently. The result
/// is chronological and fully materialized — a business day holds a bounded
/// number of slots.
pub fn compute_available_slots(
    query: &SlotQuery,
    settings: &ScheduleSettings,
    bookings: &[Booking],
    blocks: &[TimeBlock],
) -> Result<Vec<SlotOffer>> {
    if query.service_duration_minutes <= 0 {
        return Err(ScheduleError::Validation(format!(
            "service duration must be positive, got {}",
            query.service_duration_minutes
        )));
    }

    if settings.is_closed_on(weekday_number(query.date)) {
        return Ok(Vec::new());
    }

    let duration = query.service_duration_minutes;
    let open_minute = i64::from(settings.opens_at.num_seconds_from_midnight()) / 60;
    let close_minute = i64::from(settings.closes_at.num_seconds_from_midnight()) / 60;

    // Earliest start a caller could still book: local "now" plus the
    // tenant's advance-notice requirement.
    let earliest_start = to_local(query.now_utc, settings.utc_offset_hours)
        + Duration::minutes(settings.min_advance_minutes);

    let mut slots = Vec::new();
    let mut minute = open_minute;
    while minute + duration <= close_minute {
        let Some(time) = NaiveTime::from_num_seconds_from_midnight_opt((minute * 60) as u32, 0)
        else {
            break;
        };
        let local_start = query.date.and_time(time);
        let start = to_utc(local_start, settings.utc_offset_hours);
        let end = start + Duration::minutes(duration);

        let obstructed = !obstructing_bookings(bookings, start, end).is_empty()
            || !overlapping_blocks(blocks, start, end).is_empty();
        if !obstructed {
            let available = local_start >= earliest_start;
            slots.push(SlotOffer::new(time.format(TIME_OF_DAY_FORMAT).to_string(), available));
        }

        minute += duration;
    }

    debug!(date = %query.date, offered = slots.len(), "computed slot availability");
    Ok(slots)
}

/// Slot calculator wired to the persistence ports.
pub struct AvailabilityService {
    bookings: Arc<dyn BookingRepository>,
    blocks: Arc<dyn TimeBlockRepository>,
    settings: Arc<dyn TenantSettingsProvider>,
}

impl AvailabilityService {
    /// Create a new calculator over the persistence ports.
    pub fn new(
        bookings: Arc<dyn BookingRepository>,
        blocks: Arc<dyn TimeBlockRepository>,
        settings: Arc<dyn TenantSettingsProvider>,
    ) -> Self {
        Self { bookings, blocks, settings }
    }

    /// Offerable start times for `(staff, date, service duration)`.
    ///
    /// Reads run against the current snapshot without blocking writers.
    pub async fn available_slots(
        &self,
        tenant_id: &str,
        staff_id: &str,
        date: NaiveDate,
        service_duration_minutes: i64,
        now_utc: DateTime<Utc>,
    ) -> Result<Vec<SlotOffer>> {
        let settings = self.settings.schedule_settings(tenant_id).await?;

        // One read per store covering the whole local business day.
        let day_start = to_utc(date.and_time(settings.opens_at), settings.utc_offset_hours);
        let day_end = to_utc(date.and_time(settings.closes_at), settings.utc_offset_hours);
        let bookings = self.bookings.find_overlapping(staff_id, day_start, day_end, true).await?;
        let blocks = self.blocks.find_overlapping(staff_id, day_start, day_end, None).await?;

        let query = SlotQuery { date, service_duration_minutes, now_utc };
        compute_available_slots(&query, &settings, &bookings, &blocks)
    }
}
