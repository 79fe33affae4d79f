//! Motion observability hooks
//!
//! The engine reports what it does through this trait instead of logging
//! directly, so the firmware can route events to defmt and tests can record
//! them. Every hook has an empty default.

use super::planner::MovePlan;
use super::position::PulsePosition;
use crate::steps::ArmStep;

/// Receiver of motion events
pub trait MotionObserver {
    /// A move is about to write its first increment
    fn move_started(&mut self, _plan: &MovePlan) {}

    /// Increment `index` has been written to the joints
    fn increment(&mut self, _index: u32, _pulses: &PulsePosition) {}

    /// The move reached its target
    fn move_finished(&mut self, _pulses: &PulsePosition) {}

    /// The move was stopped at `pulses` before reaching its target
    fn move_cancelled(&mut self, _pulses: &PulsePosition) {}

    /// Playback is starting recorded step `index`
    fn step_started(&mut self, _index: usize, _step: &ArmStep) {}
}

/// Silent observer
impl MotionObserver for () {}

impl<T: MotionObserver + ?Sized> MotionObserver for &mut T {
    fn move_started(&mut self, plan: &MovePlan) {
        (**self).move_started(plan)
    }

    fn increment(&mut self, index: u32, pulses: &PulsePosition) {
        (**self).increment(index, pulses)
    }

    fn move_finished(&mut self, pulses: &PulsePosition) {
        (**self).move_finished(pulses)
    }

    fn move_cancelled(&mut self, pulses: &PulsePosition) {
        (**self).move_cancelled(pulses)
    }

    fn step_started(&mut self, index: usize, step: &ArmStep) {
        (**self).step_started(index, step)
    }
}
