//! Synchronous sample path: rate limit, accumulate, arbitrate

use embassy_time::Instant;

use crate::config::MoveToKeyConfig;
use crate::event::{Axis, AxisEvent, AxisValType, Direction};
use crate::motion::MotionState;
use crate::rate_limit::RateState;

/// Outcome of translating one sample
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TranslateResult {
    /// Not a relative X/Y sample with a nonzero value, it's left to other processors
    Ignored,
    /// Dropped by the rate limiter, nothing changed
    Throttled,
    /// Accumulated, no threshold crossed
    Accumulated,
    /// Accumulated and one direction crossed its threshold
    Triggered(Direction),
}

/// Per-instance motion state together with its immutable configuration
pub struct MotionTranslator {
    config: MoveToKeyConfig,
    motion: MotionState,
    rate: RateState,
}

impl MotionTranslator {
    pub fn new(config: MoveToKeyConfig) -> Self {
        Self {
            config,
            motion: MotionState::new(),
            rate: RateState::new(),
        }
    }

    pub fn config(&self) -> &MoveToKeyConfig {
        &self.config
    }

    pub fn motion(&self) -> &MotionState {
        &self.motion
    }

    pub fn rate(&self) -> &RateState {
        &self.rate
    }

    /// Translate a sample received at `now`.
    ///
    /// A triggered direction doesn't touch the rate limiter, call [`Self::mark_emitted`]
    /// once the press of the direction was delivered.
    pub fn translate(&mut self, event: AxisEvent, now: Instant) -> TranslateResult {
        if event.typ != AxisValType::Rel || event.value == 0 || !matches!(event.axis, Axis::X | Axis::Y) {
            return TranslateResult::Ignored;
        }

        if !self.rate.admit(now, self.config.rate_limit) {
            trace!("Motion {:?} dropped by rate limit", event);
            return TranslateResult::Throttled;
        }

        self.motion.accumulate(&self.config, event.axis, event.value);
        match self.motion.evaluate(&self.config) {
            Some(direction) => TranslateResult::Triggered(direction),
            None => TranslateResult::Accumulated,
        }
    }

    /// Start the rate limit window at `now`
    pub fn mark_emitted(&mut self, now: Instant) {
        self.rate.record(now);
    }

    /// Clear accumulated motion and the rate limit window
    pub fn reset(&mut self) {
        self.motion.reset();
        self.rate.reset();
    }
}
