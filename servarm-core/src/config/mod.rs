//! Configuration types
//!
//! Board-agnostic configuration structures stored as postcard binary data.

pub mod arm;
pub mod calibration;
pub mod wifi;

pub use arm::*;
pub use calibration::*;
pub use wifi::*;

use crate::motion::Joint;

/// Reasons a configuration record is unusable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Speed of zero would never make progress
    ZeroSpeed,
    /// Control range is empty or inverted
    InvalidControlRange,
    /// Calibration pulse range is empty or inverted
    InvalidCalibration(Joint),
    /// Device name is empty
    EmptyName,
}
