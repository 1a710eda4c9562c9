//! Block and recurring-series lifecycle
//!
//! Owns creation, update, and deletion of staff unavailability blocks,
//! including recurring-series expansion, cascading series updates, and
//! series splitting. A series is nothing but the set of blocks sharing a
//! series id; splitting re-ids the later members and leaves the earlier
//! ones untouched.
//!
//! Every mutating call accumulates its writes into one
//! [`ScheduleWriteBatch`] and commits it through the unit-of-work port, so
//! force-cancelled bookings and the block writes they compensate become
//! visible together or not at all.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Months, NaiveTime, Utc};
use reservo_domain::constants::OPEN_ENDED_RECURRENCE_MONTHS;
use reservo_domain::utils::clock::{parse_time_of_day, to_local, to_utc};
use reservo_domain::{
    NewRecurringBlocks, NewTimeBlock, RecurrenceRule, RecurringOutcome, Result, ScheduleError,
    SeriesUpdate, SeriesUpdateOutcome, SplitUpdateOutcome, TimeBlock, TimeBlockUpdate,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::conflict::resolve_booking_conflicts;
use super::ports::{
    BookingRepository, ScheduleUnitOfWork, ScheduleWriteBatch, TenantSettingsProvider,
    TimeBlockRepository,
};

/// Block and series lifecycle service.
pub struct BlockScheduleService {
    blocks: Arc<dyn TimeBlockRepository>,
    bookings: Arc<dyn BookingRepository>,
    writer: Arc<dyn ScheduleUnitOfWork>,
    settings: Arc<dyn TenantSettingsProvider>,
}

impl BlockScheduleService {
    /// Create a new service over the persistence ports.
    pub fn new(
        blocks: Arc<dyn TimeBlockRepository>,
        bookings: Arc<dyn BookingRepository>,
        writer: Arc<dyn ScheduleUnitOfWork>,
        settings: Arc<dyn TenantSettingsProvider>,
    ) -> Self {
        Self { blocks, bookings, writer, settings }
    }

    /// Create a one-off block.
    ///
    /// Booking conflicts abort the call unless `force` cancels them; block
    /// conflicts always abort, force flag or not.
    pub async fn create_block(&self, request: NewTimeBlock, force: bool) -> Result<TimeBlock> {
        validate_window(request.start_time, request.end_time)?;

        let conflicts = self
            .bookings
            .find_overlapping(&request.staff_id, request.start_time, request.end_time, true)
            .await?;
        let to_cancel = resolve_booking_conflicts(conflicts, force)?;

        self.ensure_no_block_conflict(
            &request.staff_id,
            request.start_time,
            request.end_time,
            None,
        )
        .await?;

        let block = TimeBlock {
            id: new_id(),
            tenant_id: request.tenant_id,
            staff_id: request.staff_id,
            start_time: request.start_time,
            end_time: request.end_time,
            reason: request.reason,
            series_id: None,
            recurrence: None,
            created_at: Utc::now(),
        };

        let mut batch = ScheduleWriteBatch::default();
        for booking in &to_cancel {
            batch.cancel_booking(&booking.id);
        }
        batch.insert_blocks.push(block.clone());
        self.writer.commit(batch).await?;

        info!(
            block_id = %block.id,
            staff_id = %block.staff_id,
            cancelled = to_cancel.len(),
            "created time block"
        );
        Ok(block)
    }

    /// Expand a recurring request into per-date blocks under one series id.
    ///
    /// Dates are accepted or rejected independently: a block overlap or an
    /// unresolved booking conflict skips that date and the run continues,
    /// reporting aggregate counts. An absent end date means twelve months
    /// past the start date.
    pub async fn create_recurring(
        &self,
        request: NewRecurringBlocks,
        force: bool,
    ) -> Result<RecurringOutcome> {
        let start_tod = parse_time_of_day(&request.start_time_of_day)?;
        let end_tod = parse_time_of_day(&request.end_time_of_day)?;
        if end_tod <= start_tod {
            return Err(ScheduleError::Validation(format!(
                "end of day window {end_tod} must be after start {start_tod}"
            )));
        }
        validate_weekdays(&request.days_of_week)?;

        let end_date = match request.end_date {
            Some(date) => date,
            None => request
                .start_date
                .checked_add_months(Months::new(OPEN_ENDED_RECURRENCE_MONTHS))
                .ok_or_else(|| {
                    ScheduleError::Validation("recurrence horizon out of range".into())
                })?,
        };
        if end_date < request.start_date {
            return Err(ScheduleError::Validation(format!(
                "end date {end_date} precedes start date {}",
                request.start_date
            )));
        }

        let offset = self.settings.schedule_settings(&request.tenant_id).await?.utc_offset_hours;
        let rule = RecurrenceRule {
            days_of_week: request.days_of_week.clone(),
            start_time_of_day: start_tod,
            end_time_of_day: end_tod,
        };
        let series_id = new_id();

        let mut batch = ScheduleWriteBatch::default();
        let mut created = 0usize;
        // Walk date by date so a year-long request never materializes more
        // than the accepted occurrences.
        for date in request.start_date.iter_days() {
            if date > end_date {
                break;
            }
            if !rule.matches(date) {
                continue;
            }

            let start = to_utc(date.and_time(start_tod), offset);
            let end = to_utc(date.and_time(end_tod), offset);

            let blocked =
                self.blocks.find_overlapping(&request.staff_id, start, end, None).await?;
            if !blocked.is_empty() {
                debug!(%date, "skipping occurrence: overlaps an existing block");
                continue;
            }

            let conflicts =
                self.bookings.find_overlapping(&request.staff_id, start, end, true).await?;
            if !conflicts.is_empty() && !force {
                debug!(
                    %date,
                    conflicts = conflicts.len(),
                    "skipping occurrence: unresolved booking conflict"
                );
                continue;
            }
            for booking in &conflicts {
                batch.cancel_booking(&booking.id);
            }

            batch.insert_blocks.push(TimeBlock {
                id: new_id(),
                tenant_id: request.tenant_id.clone(),
                staff_id: request.staff_id.clone(),
                start_time: start,
                end_time: end,
                reason: request.reason.clone(),
                series_id: Some(series_id.clone()),
                recurrence: Some(rule.clone()),
                created_at: Utc::now(),
            });
            created += 1;
        }

        let cancelled = batch.cancel_booking_ids.len();
        self.writer.commit(batch).await?;

        info!(%series_id, created, cancelled, "expanded recurring blocks");
        Ok(RecurringOutcome { series_id, blocks_created: created, bookings_cancelled: cancelled })
    }

    /// Replace a single block's window and, when given, its reason.
    ///
    /// Same conflict policy as creation, except the block's own stored
    /// window is excluded from the block-overlap check.
    pub async fn update_block(
        &self,
        block_id: &str,
        update: TimeBlockUpdate,
        force: bool,
    ) -> Result<TimeBlock> {
        let mut block = self.get_block(block_id).await?;
        validate_window(update.start_time, update.end_time)?;

        let conflicts = self
            .bookings
            .find_overlapping(&block.staff_id, update.start_time, update.end_time, true)
            .await?;
        let to_cancel = resolve_booking_conflicts(conflicts, force)?;

        self.ensure_no_block_conflict(
            &block.staff_id,
            update.start_time,
            update.end_time,
            Some(block_id),
        )
        .await?;

        block.start_time = update.start_time;
        block.end_time = update.end_time;
        if let Some(reason) = update.reason {
            block.reason = Some(reason);
        }

        let mut batch = ScheduleWriteBatch::default();
        for booking in &to_cancel {
            batch.cancel_booking(&booking.id);
        }
        batch.update_blocks.push(block.clone());
        self.writer.commit(batch).await?;

        info!(%block_id, cancelled = to_cancel.len(), "updated time block");
        Ok(block)
    }

    /// Remove one block. Deleting a restriction cannot conflict with
    /// anything, so there are no checks beyond existence.
    pub async fn delete_block(&self, block_id: &str) -> Result<()> {
        let block = self.get_block(block_id).await?;

        let mut batch = ScheduleWriteBatch::default();
        batch.delete_block_ids.push(block.id);
        self.writer.commit(batch).await?;

        info!(%block_id, "deleted time block");
        Ok(())
    }

    /// Remove every member of a series.
    pub async fn delete_series(&self, series_id: &str) -> Result<usize> {
        let members = self.blocks.list_by_series(series_id).await?;
        if members.is_empty() {
            return Err(ScheduleError::NotFound(format!("series {series_id}")));
        }

        let mut batch = ScheduleWriteBatch::default();
        batch.delete_block_ids.extend(members.into_iter().map(|m| m.id));
        let removed = batch.delete_block_ids.len();
        self.writer.commit(batch).await?;

        info!(%series_id, removed, "deleted series");
        Ok(removed)
    }

    /// Remove a block and every later member of its series.
    ///
    /// Earlier members stay on the original series id, untouched. A block
    /// without a series id is deleted alone.
    pub async fn delete_from(&self, block_id: &str) -> Result<usize> {
        let block = self.get_block(block_id).await?;
        let Some(series_id) = block.series_id.as_deref() else {
            self.delete_block(block_id).await?;
            return Ok(1);
        };

        let members = self.blocks.list_by_series(series_id).await?;
        let mut batch = ScheduleWriteBatch::default();
        batch.delete_block_ids.extend(
            members.into_iter().filter(|m| m.start_time >= block.start_time).map(|m| m.id),
        );
        let removed = batch.delete_block_ids.len();
        self.writer.commit(batch).await?;

        info!(%block_id, series_id, removed, "deleted series tail");
        Ok(removed)
    }

    /// Apply a partial update to every member of a series.
    ///
    /// A new reason overwrites unconditionally. A new time-of-day pair is
    /// recomputed against each member's local date; members whose new window
    /// cannot be applied keep their current time and the pass continues.
    /// Partial success is expected and reported via counts, not errors.
    pub async fn update_series(
        &self,
        series_id: &str,
        update: SeriesUpdate,
        force: bool,
    ) -> Result<SeriesUpdateOutcome> {
        let members = self.blocks.list_by_series(series_id).await?;
        if members.is_empty() {
            return Err(ScheduleError::NotFound(format!("series {series_id}")));
        }

        let tenant_id = members[0].tenant_id.clone();
        let offset = self.settings.schedule_settings(&tenant_id).await?.utc_offset_hours;

        let mut batch = ScheduleWriteBatch::default();
        let updated =
            self.update_members(members, &update, offset, force, false, &mut batch).await?;
        let cancelled = batch.cancel_booking_ids.len();
        self.writer.commit(batch).await?;

        info!(%series_id, updated, cancelled, "updated series");
        Ok(SeriesUpdateOutcome { members_updated: updated, bookings_cancelled: cancelled })
    }

    /// Update a block and every later member of its series, splitting them
    /// onto a fresh series id first.
    ///
    /// Earlier members keep the original series id and are left untouched.
    /// A block without a series id is updated alone and no split happens.
    pub async fn update_from(
        &self,
        block_id: &str,
        update: SeriesUpdate,
        force: bool,
    ) -> Result<SplitUpdateOutcome> {
        let block = self.get_block(block_id).await?;
        let offset = self.settings.schedule_settings(&block.tenant_id).await?.utc_offset_hours;

        let Some(series_id) = block.series_id.clone() else {
            let mut batch = ScheduleWriteBatch::default();
            let updated =
                self.update_members(vec![block], &update, offset, force, false, &mut batch).await?;
            let cancelled = batch.cancel_booking_ids.len();
            self.writer.commit(batch).await?;
            return Ok(SplitUpdateOutcome {
                series_id: None,
                members_updated: updated,
                bookings_cancelled: cancelled,
            });
        };

        let mut tail: Vec<TimeBlock> = self
            .blocks
            .list_by_series(&series_id)
            .await?
            .into_iter()
            .filter(|m| m.start_time >= block.start_time)
            .collect();

        // Detach the tail before retiming it; the split persists even for
        // members whose time change ends up skipped.
        let new_series_id = new_id();
        for member in &mut tail {
            member.series_id = Some(new_series_id.clone());
        }

        let mut batch = ScheduleWriteBatch::default();
        let updated = self.update_members(tail, &update, offset, force, true, &mut batch).await?;
        let cancelled = batch.cancel_booking_ids.len();
        self.writer.commit(batch).await?;

        info!(
            %block_id,
            original_series = %series_id,
            new_series = %new_series_id,
            updated,
            cancelled,
            "split and updated series tail"
        );
        Ok(SplitUpdateOutcome {
            series_id: Some(new_series_id),
            members_updated: updated,
            bookings_cancelled: cancelled,
        })
    }

    /// Per-member update pass shared by [`update_series`] and
    /// [`update_from`]. Returns the number of members that received a reason
    /// or time change; with `always_write`, unchanged members still get a
    /// row written (series reassignment must persist).
    async fn update_members(
        &self,
        members: Vec<TimeBlock>,
        update: &SeriesUpdate,
        offset: i32,
        force: bool,
        always_write: bool,
        batch: &mut ScheduleWriteBatch,
    ) -> Result<usize> {
        let new_start = update.start_time_of_day.as_deref().map(parse_time_of_day).transpose()?;
        let new_end = update.end_time_of_day.as_deref().map(parse_time_of_day).transpose()?;
        if let (Some(start), Some(end)) = (new_start, new_end) {
            if end <= start {
                return Err(ScheduleError::Validation(format!(
                    "end of day window {end} must be after start {start}"
                )));
            }
        }

        let mut updated = 0usize;
        for mut member in members {
            let mut changed = false;
            if let Some(reason) = &update.reason {
                member.reason = Some(reason.clone());
                changed = true;
            }
            if update.changes_time()
                && self
                    .reschedule_member(&mut member, new_start, new_end, offset, force, batch)
                    .await?
            {
                changed = true;
            }
            if changed {
                updated += 1;
            }
            if changed || always_write {
                batch.update_blocks.push(member);
            }
        }
        Ok(updated)
    }

    /// Recompute one member's window from its local date and the new
    /// time-of-day pair. Returns whether the window was applied; an
    /// unresolved booking conflict or any block overlap leaves the window
    /// as-is.
    async fn reschedule_member(
        &self,
        member: &mut TimeBlock,
        new_start: Option<NaiveTime>,
        new_end: Option<NaiveTime>,
        offset: i32,
        force: bool,
        batch: &mut ScheduleWriteBatch,
    ) -> Result<bool> {
        let local_date = to_local(member.start_time, offset).date();
        let start_tod = new_start.unwrap_or_else(|| to_local(member.start_time, offset).time());
        let end_tod = new_end.unwrap_or_else(|| to_local(member.end_time, offset).time());
        if end_tod <= start_tod {
            return Err(ScheduleError::Validation(format!(
                "updated window for block {} inverts: {end_tod} is not after {start_tod}",
                member.id
            )));
        }

        let start = to_utc(local_date.and_time(start_tod), offset);
        let end = to_utc(local_date.and_time(end_tod), offset);

        // The block-overlap invariant is never force-overridable, so a
        // colliding member is skipped rather than cancelled over.
        let blocked =
            self.blocks.find_overlapping(&member.staff_id, start, end, Some(&member.id)).await?;
        if !blocked.is_empty() {
            warn!(
                block_id = %member.id,
                "series member left unchanged: new window overlaps another block"
            );
            return Ok(false);
        }

        let conflicts =
            self.bookings.find_overlapping(&member.staff_id, start, end, true).await?;
        if !conflicts.is_empty() && !force {
            debug!(
                block_id = %member.id,
                conflicts = conflicts.len(),
                "series member left unchanged: unresolved booking conflict"
            );
            return Ok(false);
        }
        for booking in &conflicts {
            batch.cancel_booking(&booking.id);
        }

        member.start_time = start;
        member.end_time = end;
        if let Some(rule) = member.recurrence.as_mut() {
            rule.start_time_of_day = start_tod;
            rule.end_time_of_day = end_tod;
        }
        Ok(true)
    }

    async fn get_block(&self, block_id: &str) -> Result<TimeBlock> {
        self.blocks
            .get(block_id)
            .await?
            .ok_or_else(|| ScheduleError::NotFound(format!("time block {block_id}")))
    }

    async fn ensure_no_block_conflict(
        &self,
        staff_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_block_id: Option<&str>,
    ) -> Result<()> {
        let overlapping =
            self.blocks.find_overlapping(staff_id, start, end, exclude_block_id).await?;
        if overlapping.is_empty() {
            Ok(())
        } else {
            Err(ScheduleError::BlockConflict {
                block_ids: overlapping.into_iter().map(|b| b.id).collect(),
            })
        }
    }
}

fn new_id() -> String {
    Uuid::now_v7().to_string()
}

fn validate_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    if end > start {
        Ok(())
    } else {
        Err(ScheduleError::Validation("end time must be after start time".into()))
    }
}

fn validate_weekdays(days: &BTreeSet<u8>) -> Result<()> {
    match days.iter().find(|day| **day > 6) {
        Some(day) => {
            Err(ScheduleError::Validation(format!("invalid weekday {day}, expected 0-6")))
        }
        None => Ok(()),
    }
}
