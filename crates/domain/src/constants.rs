//! Domain constants
//!
//! Centralized location for the scheduling defaults shared between the core
//! services and the storage adapter.

/// Fallback UTC offset (whole hours) when a tenant setting is absent or
/// unparsable.
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = -3;

/// Offsets outside [-12, 14] are treated as unparsable.
pub const MIN_UTC_OFFSET_HOURS: i32 = -12;
pub const MAX_UTC_OFFSET_HOURS: i32 = 14;

/// Horizon applied to open-ended recurring requests, in calendar months.
pub const OPEN_ENDED_RECURRENCE_MONTHS: u32 = 12;

/// Canonical display/parse format for slot start times.
pub const TIME_OF_DAY_FORMAT: &str = "%H:%M";
