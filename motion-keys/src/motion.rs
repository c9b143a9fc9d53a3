//! Motion accumulation and threshold arbitration

use crate::config::MoveToKeyConfig;
use crate::event::{Axis, Direction};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionMode {
    /// No motion received since construction or the last reset
    #[default]
    None,
    /// Relative motion is being accumulated
    Relative,
}

/// Accumulated, not yet consumed motion of one behavior instance.
///
/// `|x_delta|` and `|y_delta|` never exceed [`MoveToKeyConfig::max_delta`] of their axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionState {
    pub mode: MotionMode,
    pub x_delta: i16,
    pub y_delta: i16,
}

impl MotionState {
    pub const fn new() -> Self {
        Self {
            mode: MotionMode::None,
            x_delta: 0,
            y_delta: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Add a relative sample to its axis, applying inversion and clamping.
    ///
    /// Samples on axes other than X and Y are ignored.
    pub fn accumulate(&mut self, config: &MoveToKeyConfig, axis: Axis, value: i16) {
        let (delta, invert) = match axis {
            Axis::X => (&mut self.x_delta, config.invert_x),
            Axis::Y => (&mut self.y_delta, config.invert_y),
            _ => return,
        };
        let value = if invert { -(value as i32) } else { value as i32 };
        let max = config.max_delta(axis) as i32;
        *delta = (*delta as i32 + value).clamp(-max, max) as i16;
        if value != 0 {
            self.mode = MotionMode::Relative;
        }
    }

    /// Consume at most one threshold quantum and return the triggered direction.
    ///
    /// X is checked first and wins over Y whenever both axes are over their thresholds.
    /// Y is only looked at when X didn't fire.
    pub fn evaluate(&mut self, config: &MoveToKeyConfig) -> Option<Direction> {
        if self.mode != MotionMode::Relative {
            return None;
        }

        let x_threshold = config.axis_threshold(Axis::X);
        let direction = if self.x_delta >= x_threshold {
            self.x_delta -= x_threshold;
            Direction::Right
        } else if self.x_delta <= -x_threshold {
            self.x_delta += x_threshold;
            Direction::Left
        } else {
            let y_threshold = config.axis_threshold(Axis::Y);
            if self.y_delta >= y_threshold {
                self.y_delta -= y_threshold;
                Direction::Down
            } else if self.y_delta <= -y_threshold {
                self.y_delta += y_threshold;
                Direction::Up
            } else {
                return None;
            }
        };

        if config.reset_other_axis {
            match direction.axis() {
                Axis::X => self.y_delta = 0,
                _ => self.x_delta = 0,
            }
        }

        debug!(
            "Triggered {:?}, remaining delta: x={}, y={}",
            direction, self.x_delta, self.y_delta
        );
        Some(direction)
    }
}
