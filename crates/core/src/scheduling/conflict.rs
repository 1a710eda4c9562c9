//! Force-override policy for booking conflicts
//!
//! Only booking conflicts can be overridden. Block-to-block conflicts are
//! rejected before this policy is ever consulted.

use reservo_domain::{Booking, Result, ScheduleError};
use tracing::debug;

/// Decide what happens to the bookings standing in the way of a block write.
///
/// Without `force`, any conflict aborts the call and surfaces the conflicting
/// booking ids. With `force`, the conflicting bookings are returned so the
/// caller can record their cancellation in the same write batch as the block
/// mutation — the cancellations and the block write commit as one unit.
pub fn resolve_booking_conflicts(conflicts: Vec<Booking>, force: bool) -> Result<Vec<Booking>> {
    if conflicts.is_empty() {
        return Ok(Vec::new());
    }
    if !force {
        return Err(ScheduleError::BookingConflict {
            booking_ids: conflicts.into_iter().map(|b| b.id).collect(),
        });
    }
    debug!(count = conflicts.len(), "force flag set, conflicting bookings will be cancelled");
    Ok(conflicts)
}
