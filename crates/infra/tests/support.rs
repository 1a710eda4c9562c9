//! Shared context for integration tests that drive the scheduling services
//! against a real SQLite database.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use reservo_core::{AvailabilityService, BlockScheduleService};
use reservo_infra::database::{
    DbManager, SqliteBookingRepository, SqliteScheduleUnitOfWork, SqliteTenantSettingsProvider,
    SqliteTimeBlockRepository,
};
use rusqlite::params;
use tempfile::TempDir;

/// Shared context for integration tests that need the services plus direct
/// database access.
pub struct TestContext {
    pub db: Arc<DbManager>,
    pub schedule: BlockScheduleService,
    pub availability: AvailabilityService,
    /// Keep the temporary directory alive for the lifetime of the context.
    _temp_dir: TempDir,
}

/// Create a new test context with a fresh migrated database.
pub fn setup_test_context() -> TestContext {
    // Repeated init attempts are fine; only the first one wins.
    let _ = tracing_subscriber::fmt().with_env_filter("info").with_test_writer().try_init();

    let temp_dir = TempDir::new().expect("failed to create temporary database directory");
    let db = Arc::new(
        DbManager::new(temp_dir.path().join("reservo.db"), 4)
            .expect("failed to initialise sqlite manager"),
    );
    db.run_migrations().expect("failed to run schema migrations");

    let blocks = Arc::new(SqliteTimeBlockRepository::new(Arc::clone(&db)));
    let bookings = Arc::new(SqliteBookingRepository::new(Arc::clone(&db)));
    let writer = Arc::new(SqliteScheduleUnitOfWork::new(Arc::clone(&db)));
    let settings = Arc::new(SqliteTenantSettingsProvider::new(Arc::clone(&db)));

    let schedule =
        BlockScheduleService::new(blocks.clone(), bookings.clone(), writer, settings.clone());
    let availability = AvailabilityService::new(bookings, blocks, settings);

    TestContext { db, schedule, availability, _temp_dir: temp_dir }
}

/// UTC instant shorthand for fixtures.
pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(year, month, day)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
        .and_utc()
}

pub fn insert_booking(
    ctx: &TestContext,
    id: &str,
    staff_id: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) {
    let conn = ctx.db.get_connection().unwrap();
    conn.execute(
        "INSERT INTO bookings (id, tenant_id, staff_id, start_ts, end_ts, status, created_at)
         VALUES (?1, 'tenant-1', ?2, ?3, ?4, 'confirmed', 0)",
        params![id, staff_id, start.timestamp(), end.timestamp()],
    )
    .unwrap();
}

pub fn booking_status(ctx: &TestContext, id: &str) -> String {
    let conn = ctx.db.get_connection().unwrap();
    conn.query_row("SELECT status FROM bookings WHERE id = ?1", params![id], |row| row.get(0))
        .unwrap()
}

pub fn insert_settings(
    ctx: &TestContext,
    tenant_id: &str,
    offset: &str,
    opens: &str,
    closes: &str,
) {
    let conn = ctx.db.get_connection().unwrap();
    conn.execute(
        "INSERT INTO tenant_settings (tenant_id, utc_offset, opens_at, closes_at, closed_weekdays, min_advance_minutes)
         VALUES (?1, ?2, ?3, ?4, '[]', 0)",
        params![tenant_id, offset, opens, closes],
    )
    .unwrap();
}

/// Series ids of every stored block, ordered by start time.
pub fn stored_series_ids(ctx: &TestContext) -> Vec<Option<String>> {
    let conn = ctx.db.get_connection().unwrap();
    let mut stmt =
        conn.prepare("SELECT series_id FROM time_blocks ORDER BY start_ts ASC").unwrap();
    let rows = stmt.query_map(params![], |row| row.get(0)).unwrap();
    rows.collect::<rusqlite::Result<Vec<_>>>().unwrap()
}
