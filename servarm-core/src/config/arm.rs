//! Arm configuration
//!
//! Motion pacing plus per-joint calibration. Loaded once at startup and
//! only replaced through an explicit save.

use serde::{Deserialize, Serialize};

use super::calibration::{ControlRange, JointCalibration};
use super::ConfigError;
use crate::motion::{ControlPosition, Joint, PulsePosition};

/// Current arm configuration layout version
///
/// Bump whenever the persisted layout or the meaning of a field changes;
/// boards with an older record fall back to defaults once.
pub const ARM_CONFIG_VERSION: u32 = 3;

/// Default maximum pulse delta per interpolation increment
pub const DEFAULT_SPEED: u32 = 10;

/// Default pause between interpolation increments in milliseconds
pub const DEFAULT_INCREMENT_DELAY_MS: u32 = 10;

/// Complete arm configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ArmConfig {
    /// Layout version (stamped on save)
    pub version: u32,
    /// Pulse delta covered per increment when a move picks its own count
    pub speed: u32,
    /// Pause after each increment in milliseconds
    pub increment_delay_ms: u32,
    pub base: JointCalibration,
    pub body: JointCalibration,
    pub neck: JointCalibration,
    pub claw: JointCalibration,
    /// Logical angle range shared by every joint
    pub control: ControlRange,
}

impl Default for ArmConfig {
    fn default() -> Self {
        Self {
            version: ARM_CONFIG_VERSION,
            speed: DEFAULT_SPEED,
            increment_delay_ms: DEFAULT_INCREMENT_DELAY_MS,
            base: JointCalibration::default(),
            body: JointCalibration::default(),
            neck: JointCalibration::default(),
            claw: JointCalibration::default(),
            control: ControlRange::default(),
        }
    }
}

impl ArmConfig {
    /// Calibration for one joint
    pub const fn calibration(&self, joint: Joint) -> &JointCalibration {
        match joint {
            Joint::Base => &self.base,
            Joint::Body => &self.body,
            Joint::Neck => &self.neck,
            Joint::Claw => &self.claw,
        }
    }

    /// Mutable calibration for one joint
    pub fn calibration_mut(&mut self, joint: Joint) -> &mut JointCalibration {
        match joint {
            Joint::Base => &mut self.base,
            Joint::Body => &mut self.body,
            Joint::Neck => &mut self.neck,
            Joint::Claw => &mut self.claw,
        }
    }

    /// Check that every value is safe to drive the motion engine with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.speed == 0 {
            return Err(ConfigError::ZeroSpeed);
        }
        if !self.control.is_valid() {
            return Err(ConfigError::InvalidControlRange);
        }
        for joint in Joint::ALL {
            if !self.calibration(joint).is_valid() {
                return Err(ConfigError::InvalidCalibration(joint));
            }
        }
        Ok(())
    }

    /// Map a control-space position into pulse space
    pub fn to_pulses(&self, position: &ControlPosition) -> PulsePosition {
        PulsePosition::from_fn(|joint| {
            self.calibration(joint)
                .to_pulse(position.get(joint), &self.control)
        })
    }

    /// Map a pulse-space position into control space
    pub fn to_control(&self, position: &PulsePosition) -> ControlPosition {
        ControlPosition::from_fn(|joint| {
            self.calibration(joint)
                .to_control(position.get(joint), &self.control)
        })
    }

    /// Calibrated home pulse of every joint
    pub fn start_pulses(&self) -> PulsePosition {
        PulsePosition::from_fn(|joint| self.calibration(joint).start)
    }
}
