//! Error types used throughout the scheduling engine

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Reservo scheduling operations
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum ScheduleError {
    /// Malformed input: inverted time range, unparsable time-of-day,
    /// out-of-range weekday values.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The requested window overlaps bookings that were not force-cancelled.
    /// Carries the conflicting booking ids so the caller can decide whether
    /// to retry with the force flag set.
    #[error("conflicts with {count} existing booking(s)", count = booking_ids.len())]
    BookingConflict { booking_ids: Vec<String> },

    /// The requested window overlaps another time block for the same staff
    /// member. Never overridable, force flag or not.
    #[error("overlaps {count} existing time block(s)", count = block_ids.len())]
    BlockConflict { block_ids: Vec<String> },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type alias for scheduling operations
pub type Result<T> = std::result::Result<T, ScheduleError>;
