//! SQLite-backed implementation of the ScheduleUnitOfWork port.

use std::sync::Arc;

use async_trait::async_trait;
use reservo_core::{ScheduleUnitOfWork, ScheduleWriteBatch};
use reservo_domain::{Result, ScheduleError, TimeBlock};
use rusqlite::{params, Transaction};
use tracing::{debug, instrument};

use super::DbManager;
use crate::errors::InfraError;

/// SQLite implementation of [`ScheduleUnitOfWork`].
///
/// A whole write batch runs inside one transaction, so force-cancelled
/// bookings and the block writes they compensate commit together or roll
/// back together.
pub struct SqliteScheduleUnitOfWork {
    db: Arc<DbManager>,
}

impl SqliteScheduleUnitOfWork {
    /// Create a new unit of work over the shared manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

fn recurrence_json(block: &TimeBlock) -> Result<Option<String>> {
    block
        .recurrence
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| ScheduleError::Storage(format!("recurrence serialization: {e}")))
}

fn insert_block(tx: &Transaction<'_>, block: &TimeBlock) -> Result<()> {
    tx.execute(
        "INSERT INTO time_blocks (id, tenant_id, staff_id, start_ts, end_ts, reason, series_id, recurrence_json, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            block.id,
            block.tenant_id,
            block.staff_id,
            block.start_time.timestamp(),
            block.end_time.timestamp(),
            block.reason,
            block.series_id,
            recurrence_json(block)?,
            block.created_at.timestamp(),
        ],
    )
    .map_err(InfraError::from)?;
    Ok(())
}

fn update_block(tx: &Transaction<'_>, block: &TimeBlock) -> Result<()> {
    let changed = tx
        .execute(
            "UPDATE time_blocks
             SET start_ts = ?2, end_ts = ?3, reason = ?4, series_id = ?5, recurrence_json = ?6
             WHERE id = ?1",
            params![
                block.id,
                block.start_time.timestamp(),
                block.end_time.timestamp(),
                block.reason,
                block.series_id,
                recurrence_json(block)?,
            ],
        )
        .map_err(InfraError::from)?;
    if changed == 0 {
        return Err(ScheduleError::NotFound(format!("time block {}", block.id)));
    }
    Ok(())
}

#[async_trait]
impl ScheduleUnitOfWork for SqliteScheduleUnitOfWork {
    #[instrument(skip(self, batch))]
    async fn commit(&self, batch: ScheduleWriteBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut conn = self.db.get_connection()?;
        let tx = conn.transaction().map_err(InfraError::from)?;

        for booking_id in &batch.cancel_booking_ids {
            let changed = tx
                .execute(
                    "UPDATE bookings SET status = 'cancelled' WHERE id = ?1",
                    params![booking_id],
                )
                .map_err(InfraError::from)?;
            if changed == 0 {
                // Dropping the transaction rolls everything back.
                return Err(ScheduleError::NotFound(format!("booking {booking_id}")));
            }
        }

        for block in &batch.insert_blocks {
            insert_block(&tx, block)?;
        }
        for block in &batch.update_blocks {
            update_block(&tx, block)?;
        }
        for block_id in &batch.delete_block_ids {
            tx.execute("DELETE FROM time_blocks WHERE id = ?1", params![block_id])
                .map_err(InfraError::from)?;
        }

        let (cancelled, inserted, updated, deleted) = (
            batch.cancel_booking_ids.len(),
            batch.insert_blocks.len(),
            batch.update_blocks.len(),
            batch.delete_block_ids.len(),
        );
        tx.commit().map_err(InfraError::from)?;

        debug!(cancelled, inserted, updated, deleted, "committed schedule write batch");
        Ok(())
    }
}
