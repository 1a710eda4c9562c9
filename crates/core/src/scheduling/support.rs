//! In-memory port implementations shared by the scheduling service tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reservo_domain::{
    Booking, BookingStatus, Result, ScheduleError, ScheduleSettings, TimeBlock,
};

use super::overlap::intervals_overlap;
use super::ports::{
    BookingRepository, ScheduleUnitOfWork, ScheduleWriteBatch, TenantSettingsProvider,
    TimeBlockRepository,
};
use super::series::BlockScheduleService;

#[derive(Default)]
struct MemoryState {
    bookings: Vec<Booking>,
    blocks: Vec<TimeBlock>,
}

/// Single-struct implementation of every port over one shared snapshot.
/// Cloning shares the underlying state, so a clone can serve as each of the
/// service's port arguments.
#[derive(Clone, Default)]
pub struct InMemorySchedule {
    state: Arc<Mutex<MemoryState>>,
    settings: Arc<Mutex<ScheduleSettings>>,
}

impl InMemorySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_booking(&self, booking: Booking) {
        self.state.lock().unwrap().bookings.push(booking);
    }

    pub fn add_block(&self, block: TimeBlock) {
        self.state.lock().unwrap().blocks.push(block);
    }

    pub fn booking(&self, id: &str) -> Option<Booking> {
        self.state.lock().unwrap().bookings.iter().find(|b| b.id == id).cloned()
    }

    pub fn block(&self, id: &str) -> Option<TimeBlock> {
        self.state.lock().unwrap().blocks.iter().find(|b| b.id == id).cloned()
    }

    pub fn blocks(&self) -> Vec<TimeBlock> {
        self.state.lock().unwrap().blocks.clone()
    }
}

#[async_trait]
impl BookingRepository for InMemorySchedule {
    async fn find_overlapping(
        &self,
        staff_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_cancelled: bool,
    ) -> Result<Vec<Booking>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .bookings
            .iter()
            .filter(|b| b.staff_id == staff_id)
            .filter(|b| !exclude_cancelled || b.status.is_obstructing())
            .filter(|b| intervals_overlap(b.start_time, b.end_time, start, end))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TimeBlockRepository for InMemorySchedule {
    async fn find_overlapping(
        &self,
        staff_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_block_id: Option<&str>,
    ) -> Result<Vec<TimeBlock>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .blocks
            .iter()
            .filter(|b| b.staff_id == staff_id)
            .filter(|b| exclude_block_id != Some(b.id.as_str()))
            .filter(|b| intervals_overlap(b.start_time, b.end_time, start, end))
            .cloned()
            .collect())
    }

    async fn get(&self, block_id: &str) -> Result<Option<TimeBlock>> {
        Ok(self.block(block_id))
    }

    async fn list_by_series(&self, series_id: &str) -> Result<Vec<TimeBlock>> {
        let state = self.state.lock().unwrap();
        let mut members: Vec<TimeBlock> = state
            .blocks
            .iter()
            .filter(|b| b.series_id.as_deref() == Some(series_id))
            .cloned()
            .collect();
        members.sort_by_key(|b| b.start_time);
        Ok(members)
    }
}

#[async_trait]
impl TenantSettingsProvider for InMemorySchedule {
    async fn schedule_settings(&self, _tenant_id: &str) -> Result<ScheduleSettings> {
        Ok(self.settings.lock().unwrap().clone())
    }
}

#[async_trait]
impl ScheduleUnitOfWork for InMemorySchedule {
    async fn commit(&self, batch: ScheduleWriteBatch) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        for id in &batch.cancel_booking_ids {
            let booking = state
                .bookings
                .iter_mut()
                .find(|b| b.id == *id)
                .ok_or_else(|| ScheduleError::NotFound(format!("booking {id}")))?;
            booking.status = BookingStatus::Cancelled;
        }
        state.blocks.extend(batch.insert_blocks);
        for block in batch.update_blocks {
            let stored = state
                .blocks
                .iter_mut()
                .find(|b| b.id == block.id)
                .ok_or_else(|| ScheduleError::NotFound(format!("time block {}", block.id)))?;
            *stored = block;
        }
        for id in &batch.delete_block_ids {
            state.blocks.retain(|b| b.id != *id);
        }
        Ok(())
    }
}

/// Wire a service to one shared in-memory store.
pub fn service(store: &InMemorySchedule) -> BlockScheduleService {
    BlockScheduleService::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
    )
}

/// UTC instant shorthand for test fixtures.
pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
        .and_utc()
}

pub fn make_booking(
    id: &str,
    staff_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Booking {
    Booking {
        id: id.into(),
        tenant_id: "tenant-1".into(),
        staff_id: staff_id.into(),
        start_time: start,
        end_time: end,
        status: BookingStatus::Confirmed,
        created_at: start - chrono::Duration::days(1),
    }
}

pub fn make_block(id: &str, staff_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> TimeBlock {
    TimeBlock {
        id: id.into(),
        tenant_id: "tenant-1".into(),
        staff_id: staff_id.into(),
        start_time: start,
        end_time: end,
        reason: None,
        series_id: None,
        recurrence: None,
        created_at: start - chrono::Duration::days(1),
    }
}
