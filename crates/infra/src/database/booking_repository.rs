//! SQLite-backed implementation of the BookingRepository port.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reservo_core::BookingRepository;
use reservo_domain::{Booking, BookingStatus, Result};
use rusqlite::params;
use tracing::{debug, instrument};

use super::{timestamp_to_utc, DbManager};
use crate::errors::InfraError;

/// SQLite implementation of [`BookingRepository`].
pub struct SqliteBookingRepository {
    db: Arc<DbManager>,
}

impl SqliteBookingRepository {
    /// Create a new booking repository.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

fn booking_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Booking> {
    let status_raw: String = row.get(5)?;
    let status = BookingStatus::parse(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            rusqlite::types::Type::Text,
            format!("unknown booking status {status_raw}").into(),
        )
    })?;
    Ok(Booking {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        staff_id: row.get(2)?,
        start_time: timestamp_to_utc(row.get(3)?),
        end_time: timestamp_to_utc(row.get(4)?),
        status,
        created_at: timestamp_to_utc(row.get(6)?),
    })
}

#[async_trait]
impl BookingRepository for SqliteBookingRepository {
    #[instrument(skip(self))]
    async fn find_overlapping(
        &self,
        staff_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_cancelled: bool,
    ) -> Result<Vec<Booking>> {
        let conn = self.db.get_connection()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, tenant_id, staff_id, start_ts, end_ts, status, created_at
                 FROM bookings
                 WHERE staff_id = ?1 AND start_ts < ?2 AND end_ts > ?3
                   AND (?4 = 0 OR status <> 'cancelled')
                 ORDER BY start_ts ASC",
            )
            .map_err(InfraError::from)?;

        let bookings = stmt
            .query_map(
                params![staff_id, end.timestamp(), start.timestamp(), exclude_cancelled],
                booking_from_row,
            )
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(InfraError::from)?;

        debug!(staff_id, count = bookings.len(), "queried overlapping bookings");
        Ok(bookings)
    }
}
