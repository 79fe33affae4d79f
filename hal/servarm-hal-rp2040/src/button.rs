//! Stop button
//!
//! Active-low push button with the internal pull-up enabled. Motion stops
//! at the next increment while the button is held.

use embassy_rp::gpio::{Input, Pin, Pull};
use embassy_rp::Peri;
use servarm_core::traits::Cancel;

/// Push button that cancels motion while pressed
pub struct StopButton<'d> {
    input: Input<'d>,
}

impl<'d> StopButton<'d> {
    pub fn new(pin: Peri<'d, impl Pin>) -> Self {
        Self {
            input: Input::new(pin, Pull::Up),
        }
    }

    /// Check if the button is held down
    pub fn is_pressed(&self) -> bool {
        self.input.is_low()
    }
}

impl Cancel for StopButton<'_> {
    fn is_cancelled(&mut self) -> bool {
        self.is_pressed()
    }
}
