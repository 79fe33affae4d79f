//! Motion logging over defmt

use defmt::*;
use servarm_core::motion::{MotionObserver, MovePlan, PulsePosition};
use servarm_core::ArmStep;

/// Logs moves and playback progress
pub struct DefmtObserver;

impl MotionObserver for DefmtObserver {
    fn move_started(&mut self, plan: &MovePlan) {
        debug!(
            "Move {} -> {} in {} increments",
            plan.from, plan.to, plan.increments
        );
    }

    fn increment(&mut self, index: u32, pulses: &PulsePosition) {
        trace!("  [{}] {}", index, pulses);
    }

    fn move_finished(&mut self, pulses: &PulsePosition) {
        debug!("Move finished at {}", pulses);
    }

    fn move_cancelled(&mut self, pulses: &PulsePosition) {
        warn!("Move cancelled at {}", pulses);
    }

    fn step_started(&mut self, index: usize, step: &ArmStep) {
        info!(
            "Step {}: {} ({} increments, hold {} ms)",
            index, step.position, step.steps, step.delay_ms
        );
    }
}
