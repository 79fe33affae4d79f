//! Motion engine
//!
//! Drives a [`MovePlan`] out to the four joint outputs, one increment at a
//! time, blocking on the delay provider between increments. There is one
//! move in flight at most: `run` takes the engine mutably and returns only
//! when the move has finished or was cancelled.

use embedded_hal::delay::DelayNs;

use super::observer::MotionObserver;
use super::planner::MovePlan;
use super::position::{Joint, PulsePosition, JOINT_COUNT};
use crate::traits::{Cancel, NeverCancel, ServoOutput};

/// Engine state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionState {
    /// No move in progress
    Idle,
    /// Writing increments of a move
    Moving,
}

/// Motion failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotionError {
    /// Stop requested; the joints were left at the contained position
    Cancelled(PulsePosition),
}

/// Increment-by-increment move executor
pub struct MotionEngine<D, O = (), C = NeverCancel> {
    delay: D,
    observer: O,
    cancel: C,
    state: MotionState,
}

impl<D: DelayNs> MotionEngine<D> {
    /// Create an engine with no observer and no stop source
    pub fn new(delay: D) -> Self {
        Self::with_parts(delay, (), NeverCancel)
    }
}

impl<D, O, C> MotionEngine<D, O, C>
where
    D: DelayNs,
    O: MotionObserver,
    C: Cancel,
{
    /// Create an engine from its collaborators
    pub fn with_parts(delay: D, observer: O, cancel: C) -> Self {
        Self {
            delay,
            observer,
            cancel,
            state: MotionState::Idle,
        }
    }

    /// Replace the observer
    pub fn with_observer<O2: MotionObserver>(self, observer: O2) -> MotionEngine<D, O2, C> {
        MotionEngine::with_parts(self.delay, observer, self.cancel)
    }

    /// Replace the stop source
    pub fn with_cancel<C2: Cancel>(self, cancel: C2) -> MotionEngine<D, O, C2> {
        MotionEngine::with_parts(self.delay, self.observer, cancel)
    }

    /// Execute a plan
    ///
    /// For each increment: check for a stop request, write all four joints,
    /// then wait `increment_delay_ms`. Returns the final pulse position.
    pub fn run<S: ServoOutput>(
        &mut self,
        joints: &mut [S; JOINT_COUNT],
        plan: &MovePlan,
        increment_delay_ms: u32,
    ) -> Result<PulsePosition, MotionError> {
        self.state = MotionState::Moving;
        self.observer.move_started(plan);

        let mut reached = plan.from;
        for i in 0..plan.increments {
            if self.cancel.is_cancelled() {
                self.state = MotionState::Idle;
                self.observer.move_cancelled(&reached);
                return Err(MotionError::Cancelled(reached));
            }

            let point = plan.point(i);
            write_joints(joints, &point);
            reached = point;
            self.observer.increment(i, &point);
            self.delay.delay_ms(increment_delay_ms);
        }

        self.state = MotionState::Idle;
        self.observer.move_finished(&reached);
        Ok(reached)
    }

    /// Block for `ms` milliseconds without moving
    pub fn hold(&mut self, ms: u32) {
        if ms > 0 {
            self.delay.delay_ms(ms);
        }
    }

    /// Poll the stop source
    pub fn is_cancelled(&mut self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Current state
    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Delay provider
    pub fn delay(&self) -> &D {
        &self.delay
    }

    /// Observer
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Mutable observer, for reporting events outside of a move
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }
}

/// Write a pulse position to the joint outputs in joint order
pub fn write_joints<S: ServoOutput>(joints: &mut [S; JOINT_COUNT], pulses: &PulsePosition) {
    for joint in Joint::ALL {
        joints[joint.index()].write_microseconds(pulses.get(joint));
    }
}

/// Read the commanded pulse position back from the joint outputs
pub fn read_joints<S: ServoOutput>(joints: &[S; JOINT_COUNT]) -> PulsePosition {
    PulsePosition::from_fn(|joint| joints[joint.index()].read_microseconds())
}
