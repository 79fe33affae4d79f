//! Hobby servo output trait
//!
//! This trait abstracts over different servo outputs (hardware PWM slices,
//! PIO, external PWM expanders). Positions are pulse widths in microseconds.

/// Trait for a single positional servo channel
///
/// Writes made while detached are remembered and become the first pulse
/// output after [`ServoOutput::attach`]. This lets a caller park a joint at
/// its home pulse before the output starts driving it.
pub trait ServoOutput {
    /// Start emitting the pulse train at the last written pulse width
    fn attach(&mut self);

    /// Stop emitting pulses; the servo stops holding position
    fn detach(&mut self);

    /// Check if the pulse train is running
    fn is_attached(&self) -> bool;

    /// Command a pulse width in microseconds
    fn write_microseconds(&mut self, pulse_us: i32);

    /// Last commanded pulse width in microseconds
    ///
    /// Servos are open-loop: this is the commanded value, not a measurement.
    fn read_microseconds(&self) -> i32;
}

impl<T: ServoOutput + ?Sized> ServoOutput for &mut T {
    fn attach(&mut self) {
        (**self).attach()
    }

    fn detach(&mut self) {
        (**self).detach()
    }

    fn is_attached(&self) -> bool {
        (**self).is_attached()
    }

    fn write_microseconds(&mut self, pulse_us: i32) {
        (**self).write_microseconds(pulse_us)
    }

    fn read_microseconds(&self) -> i32 {
        (**self).read_microseconds()
    }
}
