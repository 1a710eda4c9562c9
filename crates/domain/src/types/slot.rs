//! Bookable-slot output shapes

use serde::{Deserialize, Serialize};

/// One candidate start time on a staff member's day.
///
/// Slots blocked only by the minimum-advance rule are kept with
/// `available: false` so callers can render them greyed out; slots lost to a
/// booking or block overlap are omitted from the sequence entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotOffer {
    /// Local time of day, formatted `HH:MM`.
    pub time: String,
    pub available: bool,
}

impl SlotOffer {
    pub fn new(time: impl Into<String>, available: bool) -> Self {
        Self { time: time.into(), available }
    }
}
