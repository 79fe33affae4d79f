//! Servo output drivers

pub mod pwm;

pub use pwm::{PulseLimits, PwmServo, DEFAULT_PULSE_US, SERVO_PERIOD_US};
