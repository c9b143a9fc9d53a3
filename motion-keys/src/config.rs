//! Configuration of the motion-to-key behavior
//!
//! [`MoveToKeyConfig`] is what the behavior runs with. [`MoveToKeyToml`] is the
//! `[move_to_key]` section of `keyboard.toml`, converted with [`TryFrom`].

use core::fmt;

use embassy_time::Duration;
use serde::Deserialize;
use serde::de::{self, Unexpected, Visitor};

use crate::event::Axis;

/// Errors of an invalid configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A threshold of 0 would trigger on every sample
    ZeroThreshold,
    /// Clamp factor must be at least 1, otherwise no delta could ever reach the threshold
    ZeroClampFactor,
    /// Threshold doesn't fit into a signed 16-bit delta
    ThresholdOverflow,
}

/// Configurations for converting motion into directional key taps
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MoveToKeyConfig {
    /// Shared threshold, used for an axis that has no threshold of its own
    pub threshold: u16,
    /// Threshold of the X axis
    pub x_threshold: Option<u16>,
    /// Threshold of the Y axis
    pub y_threshold: Option<u16>,
    /// Accumulated delta is clamped to `axis threshold * clamp_factor`
    pub clamp_factor: u8,
    /// Minimal interval between two emitted directions, samples arriving earlier are dropped
    pub rate_limit: Duration,
    /// Time between press and release of the bound action
    pub tap_delay: Duration,
    /// Invert X axis
    pub invert_x: bool,
    /// Invert Y axis
    pub invert_y: bool,
    /// Clear the delta of the other axis when one axis fires
    pub reset_other_axis: bool,
}

impl Default for MoveToKeyConfig {
    fn default() -> Self {
        Self {
            threshold: 20,
            x_threshold: None,
            y_threshold: None,
            clamp_factor: 2,
            rate_limit: Duration::from_millis(50),
            tap_delay: Duration::from_millis(10),
            invert_x: false,
            invert_y: false,
            reset_other_axis: false,
        }
    }
}

impl MoveToKeyConfig {
    /// Threshold of the given axis. Axes other than X and Y never trigger.
    pub fn axis_threshold(&self, axis: Axis) -> i16 {
        let threshold = match axis {
            Axis::X => self.x_threshold.unwrap_or(self.threshold),
            Axis::Y => self.y_threshold.unwrap_or(self.threshold),
            _ => return i16::MAX,
        };
        threshold.min(i16::MAX as u16) as i16
    }

    /// Largest magnitude the accumulated delta of `axis` may reach
    pub fn max_delta(&self, axis: Axis) -> i16 {
        let max = self.axis_threshold(axis) as i32 * self.clamp_factor as i32;
        max.min(i16::MAX as i32) as i16
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.clamp_factor == 0 {
            return Err(ConfigError::ZeroClampFactor);
        }
        for threshold in [
            self.x_threshold.unwrap_or(self.threshold),
            self.y_threshold.unwrap_or(self.threshold),
        ] {
            if threshold == 0 {
                return Err(ConfigError::ZeroThreshold);
            }
            if threshold > i16::MAX as u16 {
                return Err(ConfigError::ThresholdOverflow);
            }
        }
        Ok(())
    }
}

/// Duration in milliseconds, written as `"50ms"`, `"1s"` or a bare integer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DurationMillis(pub u64);

impl<'de> Deserialize<'de> for DurationMillis {
    fn deserialize<D: de::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DurationMillisVisitor)
    }
}

struct DurationMillisVisitor;

impl<'de> Visitor<'de> for DurationMillisVisitor {
    type Value = DurationMillis;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a duration such as \"50ms\", \"1s\" or a number of milliseconds")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(DurationMillis(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v)
            .map(DurationMillis)
            .map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        let num = v.trim_end_matches(|c: char| !c.is_numeric());
        let unit = &v[num.len()..];
        let value: u64 = num.parse().map_err(|_| E::invalid_value(Unexpected::Str(v), &self))?;
        match unit {
            "s" => Ok(DurationMillis(value.saturating_mul(1000))),
            "ms" => Ok(DurationMillis(value)),
            _ => Err(E::invalid_value(Unexpected::Str(v), &self)),
        }
    }
}

/// `[move_to_key]` section of `keyboard.toml`
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoveToKeyToml {
    pub threshold: Option<u16>,
    pub x_threshold: Option<u16>,
    pub y_threshold: Option<u16>,
    pub clamp_factor: Option<u8>,
    pub rate_limit: Option<DurationMillis>,
    pub tap_delay: Option<DurationMillis>,
    #[serde(default)]
    pub invert_x: bool,
    #[serde(default)]
    pub invert_y: bool,
    #[serde(default)]
    pub reset_other_axis: bool,
}

impl TryFrom<MoveToKeyToml> for MoveToKeyConfig {
    type Error = ConfigError;

    fn try_from(toml: MoveToKeyToml) -> Result<Self, Self::Error> {
        let default = MoveToKeyConfig::default();
        let config = MoveToKeyConfig {
            threshold: toml.threshold.unwrap_or(default.threshold),
            x_threshold: toml.x_threshold,
            y_threshold: toml.y_threshold,
            clamp_factor: toml.clamp_factor.unwrap_or(default.clamp_factor),
            rate_limit: toml
                .rate_limit
                .map(|d| Duration::from_millis(d.0))
                .unwrap_or(default.rate_limit),
            tap_delay: toml
                .tap_delay
                .map(|d| Duration::from_millis(d.0))
                .unwrap_or(default.tap_delay),
            invert_x: toml.invert_x,
            invert_y: toml.invert_y,
            reset_other_axis: toml.reset_other_axis,
        };
        config.validate()?;
        Ok(config)
    }
}
