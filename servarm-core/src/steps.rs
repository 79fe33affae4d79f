//! Recorded motion programs
//!
//! A program is an ordered list of steps; insertion order is playback
//! order. Steps hold control-space positions so a recording stays valid
//! after the joints are recalibrated.

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::motion::ControlPosition;

/// Maximum number of recorded steps
pub const MAX_STEPS: usize = 50;

/// One recorded step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ArmStep {
    /// Target position in control space
    pub position: ControlPosition,
    /// Increment count for the move to this step (0 = derive from speed)
    pub steps: u32,
    /// Pause after arriving, in milliseconds
    pub delay_ms: u32,
}

impl ArmStep {
    /// Create a step
    pub const fn new(position: ControlPosition, steps: u32, delay_ms: u32) -> Self {
        Self {
            position,
            steps,
            delay_ms,
        }
    }
}

/// Step sequence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepError {
    /// The sequence already holds [`MAX_STEPS`] steps
    CapacityExceeded,
}

/// Fixed-capacity ordered step list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StepSequence {
    steps: Vec<ArmStep, MAX_STEPS>,
}

impl StepSequence {
    /// Create an empty sequence
    pub const fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step and return the new length
    ///
    /// A full sequence is left unchanged.
    pub fn push(&mut self, step: ArmStep) -> Result<usize, StepError> {
        self.steps
            .push(step)
            .map_err(|_| StepError::CapacityExceeded)?;
        Ok(self.steps.len())
    }

    /// Drop the most recent step and return the new length
    ///
    /// No-op on an empty sequence.
    pub fn pop(&mut self) -> usize {
        self.steps.pop();
        self.steps.len()
    }

    /// Remove every step
    pub fn clear(&mut self) {
        self.steps.clear();
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Check if there are no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Check if another step would exceed capacity
    pub fn is_full(&self) -> bool {
        self.steps.is_full()
    }

    /// Step at `index`
    pub fn get(&self, index: usize) -> Option<&ArmStep> {
        self.steps.get(index)
    }

    /// First step, where playback starts
    pub fn first(&self) -> Option<&ArmStep> {
        self.steps.first()
    }

    /// Steps in playback order
    pub fn iter(&self) -> core::slice::Iter<'_, ArmStep> {
        self.steps.iter()
    }

    /// Steps as a slice
    pub fn as_slice(&self) -> &[ArmStep] {
        &self.steps
    }
}

impl<'a> IntoIterator for &'a StepSequence {
    type Item = &'a ArmStep;
    type IntoIter = core::slice::Iter<'a, ArmStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}
