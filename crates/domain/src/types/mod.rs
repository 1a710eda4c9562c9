//! Domain types for the scheduling engine

pub mod block;
pub mod booking;
pub mod settings;
pub mod slot;

// Re-export the full vocabulary for convenience
pub use block::{
    NewRecurringBlocks, NewTimeBlock, RecurrenceRule, RecurringOutcome, SeriesUpdate,
    SeriesUpdateOutcome, SplitUpdateOutcome, TimeBlock, TimeBlockUpdate,
};
pub use booking::{Booking, BookingStatus};
pub use settings::ScheduleSettings;
pub use slot::SlotOffer;
