//! Port interfaces for the scheduling engine
//!
//! These traits define the boundaries between the scheduling core and the
//! persistence collaborators that own bookings, time blocks, and tenant
//! settings.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reservo_domain::{Booking, Result, ScheduleSettings, TimeBlock};

/// Read access to the booking ledger.
///
/// Bookings are owned by the booking subsystem; the scheduling engine only
/// queries them here and requests cancellations through
/// [`ScheduleUnitOfWork`].
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Bookings for `staff_id` overlapping the half-open window
    /// `[start, end)`. With `exclude_cancelled` set, cancelled bookings are
    /// filtered out — they never obstruct a window.
    async fn find_overlapping(
        &self,
        staff_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_cancelled: bool,
    ) -> Result<Vec<Booking>>;
}

/// Read access to stored time blocks.
#[async_trait]
pub trait TimeBlockRepository: Send + Sync {
    /// Blocks for `staff_id` overlapping `[start, end)`, optionally ignoring
    /// one block id (used when re-checking a block against its own window).
    async fn find_overlapping(
        &self,
        staff_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_block_id: Option<&str>,
    ) -> Result<Vec<TimeBlock>>;

    /// Fetch a single block.
    async fn get(&self, block_id: &str) -> Result<Option<TimeBlock>>;

    /// Every member of a series, ordered by start time ascending.
    async fn list_by_series(&self, series_id: &str) -> Result<Vec<TimeBlock>>;
}

/// Resolved schedule settings for a tenant.
#[async_trait]
pub trait TenantSettingsProvider: Send + Sync {
    /// The tenant's schedule settings with parsing defaults already applied.
    async fn schedule_settings(&self, tenant_id: &str) -> Result<ScheduleSettings>;
}

/// Mutations requested by one scheduling call.
///
/// Booking cancellations and block writes belonging to the same call must
/// become visible together or not at all, so the core hands them to the
/// store as one batch instead of issuing row-level writes.
#[derive(Debug, Default)]
pub struct ScheduleWriteBatch {
    /// Bookings to transition to `cancelled`.
    pub cancel_booking_ids: Vec<String>,
    pub insert_blocks: Vec<TimeBlock>,
    pub update_blocks: Vec<TimeBlock>,
    pub delete_block_ids: Vec<String>,
}

impl ScheduleWriteBatch {
    /// Record a booking cancellation, ignoring duplicates (the same booking
    /// can surface as a conflict more than once within one call).
    pub fn cancel_booking(&mut self, booking_id: &str) {
        if !self.cancel_booking_ids.iter().any(|id| id == booking_id) {
            self.cancel_booking_ids.push(booking_id.to_string());
        }
    }

    /// Whether the batch carries any writes at all.
    pub fn is_empty(&self) -> bool {
        self.cancel_booking_ids.is_empty()
            && self.insert_blocks.is_empty()
            && self.update_blocks.is_empty()
            && self.delete_block_ids.is_empty()
    }
}

/// Transactional write path for the scheduling engine.
#[async_trait]
pub trait ScheduleUnitOfWork: Send + Sync {
    /// Apply the whole batch atomically: either every cancellation and block
    /// write commits, or none are visible.
    async fn commit(&self, batch: ScheduleWriteBatch) -> Result<()>;
}
