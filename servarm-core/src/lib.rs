//! Board-agnostic core logic for the servo arm firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Servo and cancellation capability traits
//! - Calibration model (control angle <-> pulse width)
//! - Configuration types and their versioned persistence
//! - Step sequence (recorded motion programs) and its persistence
//! - Motion engine (linear interpolation across the four joints)
//! - Arm controller facade and the console command set

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod arm;
pub mod command;
pub mod config;
pub mod motion;
pub mod steps;
pub mod storage;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use arm::{Arm, ArmError, Boot};
pub use motion::{ControlPosition, Joint, PulsePosition};
pub use steps::{ArmStep, StepSequence, MAX_STEPS};
