//! SQLite-backed tenant settings provider.
//!
//! Settings rows hold raw strings exactly as the admin surface saved them —
//! the UTC offset in particular is a signed-hour string like `"-3"`. Parsing
//! and defaulting happen here so the core only ever sees resolved values.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use reservo_core::TenantSettingsProvider;
use reservo_domain::utils::clock::{parse_offset_hours, parse_time_of_day};
use reservo_domain::{Result, ScheduleSettings};
use rusqlite::params;
use tracing::{debug, instrument};

use super::DbManager;
use crate::errors::InfraError;

/// SQLite implementation of [`TenantSettingsProvider`].
pub struct SqliteTenantSettingsProvider {
    db: Arc<DbManager>,
}

impl SqliteTenantSettingsProvider {
    /// Create a new settings provider.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

type SettingsRow = (Option<String>, Option<String>, Option<String>, Option<String>, Option<i64>);

#[async_trait]
impl TenantSettingsProvider for SqliteTenantSettingsProvider {
    #[instrument(skip(self))]
    async fn schedule_settings(&self, tenant_id: &str) -> Result<ScheduleSettings> {
        let conn = self.db.get_connection()?;
        let row: std::result::Result<SettingsRow, rusqlite::Error> = conn.query_row(
            "SELECT utc_offset, opens_at, closes_at, closed_weekdays, min_advance_minutes
             FROM tenant_settings
             WHERE tenant_id = ?1",
            params![tenant_id],
            |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            },
        );

        let defaults = ScheduleSettings::default();
        let (offset_raw, opens_raw, closes_raw, closed_raw, advance) = match row {
            Ok(values) => values,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                debug!(tenant_id, "no schedule settings stored, using defaults");
                return Ok(defaults);
            }
            Err(e) => return Err(InfraError::from(e).into()),
        };

        Ok(ScheduleSettings {
            utc_offset_hours: offset_raw
                .as_deref()
                .map(parse_offset_hours)
                .unwrap_or(defaults.utc_offset_hours),
            opens_at: opens_raw
                .as_deref()
                .and_then(|raw| parse_time_of_day(raw).ok())
                .unwrap_or(defaults.opens_at),
            closes_at: closes_raw
                .as_deref()
                .and_then(|raw| parse_time_of_day(raw).ok())
                .unwrap_or(defaults.closes_at),
            closed_weekdays: closed_raw
                .as_deref()
                .and_then(|raw| serde_json::from_str::<BTreeSet<u8>>(raw).ok())
                .unwrap_or_default(),
            min_advance_minutes: advance.unwrap_or(defaults.min_advance_minutes),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;
    use tempfile::TempDir;

    use super::*;

    fn setup_test_db() -> (Arc<DbManager>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Arc::new(DbManager::new(temp_dir.path().join("reservo.db"), 2).unwrap());
        db.run_migrations().unwrap();
        (db, temp_dir)
    }

    fn insert_settings(
        db: &DbManager,
        tenant_id: &str,
        offset: &str,
        opens: &str,
        closes: &str,
        closed: &str,
        advance: i64,
    ) {
        let conn = db.get_connection().unwrap();
        conn.execute(
            "INSERT INTO tenant_settings (tenant_id, utc_offset, opens_at, closes_at, closed_weekdays, min_advance_minutes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![tenant_id, offset, opens, closes, closed, advance],
        )
        .unwrap();
    }

    #[tokio::test]
    async fn missing_row_yields_defaults() {
        let (db, _temp) = setup_test_db();
        let provider = SqliteTenantSettingsProvider::new(Arc::clone(&db));

        let settings = provider.schedule_settings("unknown-tenant").await.unwrap();
        assert_eq!(settings, ScheduleSettings::default());
    }

    #[tokio::test]
    async fn stored_values_are_parsed() {
        let (db, _temp) = setup_test_db();
        insert_settings(&db, "tenant-1", "+2", "08:30", "20:00", "[0,6]", 120);
        let provider = SqliteTenantSettingsProvider::new(Arc::clone(&db));

        let settings = provider.schedule_settings("tenant-1").await.unwrap();
        assert_eq!(settings.utc_offset_hours, 2);
        assert_eq!(settings.opens_at, NaiveTime::from_hms_opt(8, 30, 0).unwrap());
        assert_eq!(settings.closes_at, NaiveTime::from_hms_opt(20, 0, 0).unwrap());
        assert_eq!(settings.closed_weekdays, BTreeSet::from([0, 6]));
        assert_eq!(settings.min_advance_minutes, 120);
    }

    #[tokio::test]
    async fn unparsable_fields_fall_back_per_field() {
        let (db, _temp) = setup_test_db();
        insert_settings(&db, "tenant-1", "Santiago", "late", "20:00", "weekends", 30);
        let provider = SqliteTenantSettingsProvider::new(Arc::clone(&db));

        let settings = provider.schedule_settings("tenant-1").await.unwrap();
        // Unparsable offset defaults to -3; unparsable opening time falls
        // back while the parseable closing time is kept.
        assert_eq!(settings.utc_offset_hours, -3);
        assert_eq!(settings.opens_at, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(settings.closes_at, NaiveTime::from_hms_opt(20, 0, 0).unwrap());
        assert!(settings.closed_weekdays.is_empty());
        assert_eq!(settings.min_advance_minutes, 30);
    }
}
