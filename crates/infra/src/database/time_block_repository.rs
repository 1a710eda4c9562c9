//! SQLite-backed implementation of the TimeBlockRepository port.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reservo_core::TimeBlockRepository;
use reservo_domain::{RecurrenceRule, Result, TimeBlock};
use rusqlite::params;
use tracing::{debug, instrument};

use super::{timestamp_to_utc, DbManager};
use crate::errors::InfraError;

const BLOCK_COLUMNS: &str =
    "id, tenant_id, staff_id, start_ts, end_ts, reason, series_id, recurrence_json, created_at";

/// SQLite implementation of [`TimeBlockRepository`].
pub struct SqliteTimeBlockRepository {
    db: Arc<DbManager>,
}

impl SqliteTimeBlockRepository {
    /// Create a new time-block repository.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

pub(crate) fn block_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TimeBlock> {
    let recurrence_json: Option<String> = row.get(7)?;
    let recurrence: Option<RecurrenceRule> =
        recurrence_json.and_then(|raw| serde_json::from_str(&raw).ok());
    Ok(TimeBlock {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        staff_id: row.get(2)?,
        start_time: timestamp_to_utc(row.get(3)?),
        end_time: timestamp_to_utc(row.get(4)?),
        reason: row.get(5)?,
        series_id: row.get(6)?,
        recurrence,
        created_at: timestamp_to_utc(row.get(8)?),
    })
}

#[async_trait]
impl TimeBlockRepository for SqliteTimeBlockRepository {
    #[instrument(skip(self))]
    async fn find_overlapping(
        &self,
        staff_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_block_id: Option<&str>,
    ) -> Result<Vec<TimeBlock>> {
        let conn = self.db.get_connection()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {BLOCK_COLUMNS}
                 FROM time_blocks
                 WHERE staff_id = ?1 AND start_ts < ?2 AND end_ts > ?3
                   AND (?4 IS NULL OR id <> ?4)
                 ORDER BY start_ts ASC"
            ))
            .map_err(InfraError::from)?;

        let blocks = stmt
            .query_map(
                params![staff_id, end.timestamp(), start.timestamp(), exclude_block_id],
                block_from_row,
            )
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(InfraError::from)?;

        debug!(staff_id, count = blocks.len(), "queried overlapping blocks");
        Ok(blocks)
    }

    #[instrument(skip(self))]
    async fn get(&self, block_id: &str) -> Result<Option<TimeBlock>> {
        let conn = self.db.get_connection()?;
        let result = conn.query_row(
            &format!("SELECT {BLOCK_COLUMNS} FROM time_blocks WHERE id = ?1"),
            params![block_id],
            block_from_row,
        );

        match result {
            Ok(block) => Ok(Some(block)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(InfraError::from(e).into()),
        }
    }

    #[instrument(skip(self))]
    async fn list_by_series(&self, series_id: &str) -> Result<Vec<TimeBlock>> {
        let conn = self.db.get_connection()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {BLOCK_COLUMNS}
                 FROM time_blocks
                 WHERE series_id = ?1
                 ORDER BY start_ts ASC"
            ))
            .map_err(InfraError::from)?;

        let members = stmt
            .query_map(params![series_id], block_from_row)
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(InfraError::from)?;

        debug!(series_id, count = members.len(), "listed series members");
        Ok(members)
    }
}
