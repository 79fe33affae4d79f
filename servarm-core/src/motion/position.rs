//! Joint positions
//!
//! A position holds one signed value per joint. The same four numbers mean
//! very different things in control space (logical angles) and pulse space
//! (servo pulse widths), so the space is part of the type and conversion
//! only happens through the calibration model.

use core::fmt;
use core::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// Number of joints on the arm
pub const JOINT_COUNT: usize = 4;

/// Arm joint identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Joint {
    /// Rotating base
    Base,
    /// Lower arm segment
    Body,
    /// Upper arm segment
    Neck,
    /// Gripper
    Claw,
}

impl Joint {
    /// All joints in wiring and storage order
    pub const ALL: [Joint; JOINT_COUNT] = [Joint::Base, Joint::Body, Joint::Neck, Joint::Claw];

    /// Index of this joint in per-joint arrays
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase joint name
    pub const fn name(self) -> &'static str {
        match self {
            Joint::Base => "base",
            Joint::Body => "body",
            Joint::Neck => "neck",
            Joint::Claw => "claw",
        }
    }

    /// Look a joint up by name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|joint| joint.name().eq_ignore_ascii_case(name))
    }
}

/// Marker for logical control angles (e.g. 0-180)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Control;

/// Marker for servo pulse widths in microseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pulse;

/// Four joint values in the space `S`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(bound = "")]
pub struct Position<S> {
    pub base: i32,
    pub body: i32,
    pub neck: i32,
    pub claw: i32,
    #[serde(skip)]
    space: PhantomData<S>,
}

/// Position in control space
pub type ControlPosition = Position<Control>;

/// Position in pulse space
pub type PulsePosition = Position<Pulse>;

impl<S> Position<S> {
    /// Create a position from per-joint values
    pub const fn new(base: i32, body: i32, neck: i32, claw: i32) -> Self {
        Self {
            base,
            body,
            neck,
            claw,
            space: PhantomData,
        }
    }

    /// Same value on every joint
    pub const fn splat(value: i32) -> Self {
        Self::new(value, value, value, value)
    }

    /// Build a position by evaluating `f` for each joint
    pub fn from_fn(mut f: impl FnMut(Joint) -> i32) -> Self {
        Self::new(
            f(Joint::Base),
            f(Joint::Body),
            f(Joint::Neck),
            f(Joint::Claw),
        )
    }

    /// Value for one joint
    pub const fn get(&self, joint: Joint) -> i32 {
        match joint {
            Joint::Base => self.base,
            Joint::Body => self.body,
            Joint::Neck => self.neck,
            Joint::Claw => self.claw,
        }
    }

    /// Set the value for one joint
    pub fn set(&mut self, joint: Joint, value: i32) {
        match joint {
            Joint::Base => self.base = value,
            Joint::Body => self.body = value,
            Joint::Neck => self.neck = value,
            Joint::Claw => self.claw = value,
        }
    }

    /// Values in joint order
    pub const fn to_array(&self) -> [i32; JOINT_COUNT] {
        [self.base, self.body, self.neck, self.claw]
    }

    /// Largest absolute per-joint difference to `other`
    pub fn max_abs_delta(&self, other: &Self) -> u32 {
        Joint::ALL
            .into_iter()
            .map(|joint| self.get(joint).abs_diff(other.get(joint)))
            .max()
            .unwrap_or(0)
    }
}

impl<S> Default for Position<S> {
    fn default() -> Self {
        Self::splat(0)
    }
}

impl<S> fmt::Display for Position<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.base, self.body, self.neck, self.claw)
    }
}
