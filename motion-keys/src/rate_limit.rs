//! Admission gate throttling how often directions can be emitted

use embassy_time::{Duration, Instant};

/// Time of the last emitted direction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RateState {
    last_trigger: Option<Instant>,
}

impl RateState {
    pub const fn new() -> Self {
        Self { last_trigger: None }
    }

    pub fn last_trigger(&self) -> Option<Instant> {
        self.last_trigger
    }

    /// Whether a sample arriving at `now` may be processed.
    ///
    /// Samples arriving less than `interval` after the last emitted direction are dropped
    /// by the caller, they are not buffered.
    pub fn admit(&self, now: Instant, interval: Duration) -> bool {
        match self.last_trigger {
            Some(last) => now.checked_duration_since(last).is_none_or(|elapsed| elapsed >= interval),
            None => true,
        }
    }

    /// Record an emitted direction
    pub fn record(&mut self, now: Instant) {
        self.last_trigger = Some(now);
    }

    pub fn reset(&mut self) {
        self.last_trigger = None;
    }
}
