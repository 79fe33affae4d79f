//! Motion control
//!
//! Typed positions, linear move planning and the engine that paces a plan
//! out to the servo outputs.

pub mod engine;
pub mod observer;
pub mod planner;
pub mod position;

pub use engine::{MotionEngine, MotionError, MotionState};
pub use observer::MotionObserver;
pub use planner::{increments_for, interpolate, MovePlan};
pub use position::{Control, ControlPosition, Joint, Position, Pulse, PulsePosition, JOINT_COUNT};
