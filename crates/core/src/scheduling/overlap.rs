//! Half-open interval overlap detection
//!
//! Every scheduling window is half-open `[start, end)`: two windows that
//! only touch at an endpoint do not overlap.

use chrono::{DateTime, Utc};
use reservo_domain::{Booking, TimeBlock};

/// Strict overlap predicate for half-open intervals.
pub fn intervals_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && a_end > b_start
}

/// Bookings in the snapshot that obstruct `[start, end)`.
///
/// Cancelled bookings never obstruct.
pub fn obstructing_bookings<'a>(
    bookings: &'a [Booking],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<&'a Booking> {
    bookings
        .iter()
        .filter(|b| b.status.is_obstructing())
        .filter(|b| intervals_overlap(b.start_time, b.end_time, start, end))
        .collect()
}

/// Blocks in the snapshot overlapping `[start, end)`.
pub fn overlapping_blocks<'a>(
    blocks: &'a [TimeBlock],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<&'a TimeBlock> {
    blocks
        .iter()
        .filter(|b| intervals_overlap(b.start_time, b.end_time, start, end))
        .collect()
}

#[cfg(test)]
mod tests {
    use reservo_domain::BookingStatus;

    use super::*;
    use crate::scheduling::support::{at, make_booking};

    #[test]
    fn overlap_is_symmetric() {
        let cases = [
            (at(2026, 8, 10, 9, 0), at(2026, 8, 10, 10, 0), at(2026, 8, 10, 9, 30), at(2026, 8, 10, 11, 0)),
            (at(2026, 8, 10, 9, 0), at(2026, 8, 10, 12, 0), at(2026, 8, 10, 10, 0), at(2026, 8, 10, 11, 0)),
            (at(2026, 8, 10, 9, 0), at(2026, 8, 10, 10, 0), at(2026, 8, 10, 10, 0), at(2026, 8, 10, 11, 0)),
            (at(2026, 8, 10, 9, 0), at(2026, 8, 10, 10, 0), at(2026, 8, 10, 14, 0), at(2026, 8, 10, 15, 0)),
        ];
        for (a1, a2, b1, b2) in cases {
            assert_eq!(intervals_overlap(a1, a2, b1, b2), intervals_overlap(b1, b2, a1, a2));
        }
    }

    #[test]
    fn touching_endpoints_do_not_overlap() {
        // [9:00, 10:00) and [10:00, 11:00)
        assert!(!intervals_overlap(
            at(2026, 8, 10, 9, 0),
            at(2026, 8, 10, 10, 0),
            at(2026, 8, 10, 10, 0),
            at(2026, 8, 10, 11, 0),
        ));
    }

    #[test]
    fn contained_and_identical_intervals_overlap() {
        assert!(intervals_overlap(
            at(2026, 8, 10, 9, 0),
            at(2026, 8, 10, 12, 0),
            at(2026, 8, 10, 10, 0),
            at(2026, 8, 10, 11, 0),
        ));
        assert!(intervals_overlap(
            at(2026, 8, 10, 9, 0),
            at(2026, 8, 10, 10, 0),
            at(2026, 8, 10, 9, 0),
            at(2026, 8, 10, 10, 0),
        ));
    }

    #[test]
    fn partial_overlap_is_detected() {
        assert!(intervals_overlap(
            at(2026, 8, 10, 9, 0),
            at(2026, 8, 10, 10, 30),
            at(2026, 8, 10, 10, 0),
            at(2026, 8, 10, 11, 0),
        ));
    }

    #[test]
    fn obstructing_bookings_skips_cancelled() {
        let mut cancelled = make_booking("b-1", "staff-1", at(2026, 8, 10, 9, 0), at(2026, 8, 10, 10, 0));
        cancelled.status = BookingStatus::Cancelled;
        let confirmed = make_booking("b-2", "staff-1", at(2026, 8, 10, 9, 0), at(2026, 8, 10, 10, 0));

        let bookings = [cancelled, confirmed];
        let found = obstructing_bookings(
            &bookings,
            at(2026, 8, 10, 9, 30),
            at(2026, 8, 10, 10, 30),
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "b-2");
    }
}
