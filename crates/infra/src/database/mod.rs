//! SQLite persistence for the scheduling engine

pub mod booking_repository;
pub mod manager;
pub mod settings_repository;
pub mod time_block_repository;
pub mod unit_of_work;

pub use booking_repository::SqliteBookingRepository;
pub use manager::DbManager;
pub use settings_repository::SqliteTenantSettingsProvider;
pub use time_block_repository::SqliteTimeBlockRepository;
pub use unit_of_work::SqliteScheduleUnitOfWork;

/// Instants are stored as epoch seconds; out-of-range rows collapse to the
/// epoch rather than failing the whole read.
pub(crate) fn timestamp_to_utc(ts: i64) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp(ts, 0).unwrap_or_default()
}
