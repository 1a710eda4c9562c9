//! # Reservo Core
//!
//! Pure scheduling logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - The block/series lifecycle service and slot availability calculator
//! - Port/adapter interfaces (traits) for the booking ledger, block store,
//!   and tenant settings
//! - The conflict-resolution policy applied on force overrides
//!
//! ## Architecture Principles
//! - Only depends on `reservo-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod scheduling;

// Re-export specific items to avoid ambiguity
pub use scheduling::availability::{compute_available_slots, AvailabilityService, SlotQuery};
pub use scheduling::conflict::resolve_booking_conflicts;
pub use scheduling::overlap::intervals_overlap;
pub use scheduling::ports::{
    BookingRepository, ScheduleUnitOfWork, ScheduleWriteBatch, TenantSettingsProvider,
    TimeBlockRepository,
};
pub use scheduling::series::BlockScheduleService;
