//! Joint calibration model
//!
//! Maps between the shared control range (logical angles) and each joint's
//! physical pulse range. The mapping is a plain affine remap with integer
//! truncation and no clamping: values outside one range extrapolate past
//! the ends of the other.

use serde::{Deserialize, Serialize};

/// Default pulse width bounds and home pulse in microseconds
pub const DEFAULT_PULSE_MIN: i32 = 600;
pub const DEFAULT_PULSE_MAX: i32 = 2400;
pub const DEFAULT_PULSE_START: i32 = 1500;

/// Default control range in logical degrees
pub const DEFAULT_CONTROL_MIN: i32 = 0;
pub const DEFAULT_CONTROL_MAX: i32 = 180;

/// Pulse calibration for a single joint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JointCalibration {
    /// Pulse width at the control minimum (microseconds)
    pub min: i32,
    /// Pulse width at the control maximum (microseconds)
    pub max: i32,
    /// Home pulse width applied before the output is attached
    pub start: i32,
}

impl Default for JointCalibration {
    fn default() -> Self {
        Self::new(DEFAULT_PULSE_MIN, DEFAULT_PULSE_MAX, DEFAULT_PULSE_START)
    }
}

impl JointCalibration {
    /// Create a calibration entry
    pub const fn new(min: i32, max: i32, start: i32) -> Self {
        Self { min, max, start }
    }

    /// Check that the pulse range is non-empty and ordered
    ///
    /// `start` is allowed outside `[min, max]`.
    pub const fn is_valid(&self) -> bool {
        self.min < self.max
    }

    /// Convert a control angle to a pulse width
    pub fn to_pulse(&self, control: i32, range: &ControlRange) -> i32 {
        map_range(control, range.min, range.max, self.min, self.max)
    }

    /// Convert a pulse width to a control angle
    pub fn to_control(&self, pulse: i32, range: &ControlRange) -> i32 {
        map_range(pulse, self.min, self.max, range.min, range.max)
    }
}

/// Logical angle range shared by all joints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlRange {
    pub min: i32,
    pub max: i32,
}

impl Default for ControlRange {
    fn default() -> Self {
        Self::new(DEFAULT_CONTROL_MIN, DEFAULT_CONTROL_MAX)
    }
}

impl ControlRange {
    /// Create a control range
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Check that the range is non-empty and ordered
    pub const fn is_valid(&self) -> bool {
        self.min < self.max
    }

    /// Check if a control value lies inside the range
    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Affine remap of `value` from `[in_min, in_max]` onto `[out_min, out_max]`
///
/// Truncates toward zero like the classic Arduino `map`. A zero-width input
/// range is treated as width 1 instead of dividing by zero.
pub fn map_range(value: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    let in_span = match in_max as i64 - in_min as i64 {
        0 => 1,
        span => span,
    };
    let out_span = out_max as i64 - out_min as i64;
    let mapped = (value as i64 - in_min as i64) * out_span / in_span + out_min as i64;
    mapped.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}
