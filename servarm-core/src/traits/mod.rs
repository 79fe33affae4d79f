//! Hardware abstraction traits
//!
//! These traits define the interface between the arm logic and
//! hardware-specific implementations.

pub mod cancel;
pub mod servo;

pub use cancel::{Cancel, NeverCancel};
pub use servo::ServoOutput;
