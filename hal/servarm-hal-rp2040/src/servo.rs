//! Hardware PWM servo channels
//!
//! Each slice runs from a 1 MHz tick (125 MHz system clock divided by 125)
//! with a 20000-count period, so one count is one microsecond of pulse.

use embassy_rp::pwm::{ChannelAPin, Config, Pwm, PwmOutput, Slice};
use embassy_rp::Peri;
use servarm_drivers::servo::{PwmServo, SERVO_PERIOD_US};

/// System clock divider for a 1 MHz PWM tick
pub const PWM_DIVIDER: u8 = 125;

/// Counter top for a 20 ms frame
pub const PWM_TOP: u16 = (SERVO_PERIOD_US - 1) as u16;

/// Servo on one RP2040 PWM channel
pub type RpServo<'d> = PwmServo<PwmOutput<'d>>;

/// Slice configuration for a 50 Hz servo frame with outputs low
pub fn servo_config() -> Config {
    let mut config = Config::default();
    config.divider = PWM_DIVIDER.into();
    config.top = PWM_TOP;
    config.compare_a = 0;
    config.compare_b = 0;
    config
}

/// Servo on channel A of `slice`
///
/// Returns `None` if the slice does not hand out the channel.
pub fn servo_a<'d, T: Slice>(
    slice: Peri<'d, T>,
    pin: Peri<'d, impl ChannelAPin<T>>,
) -> Option<RpServo<'d>> {
    let (a, _) = Pwm::new_output_a(slice, pin, servo_config()).split();
    a.map(PwmServo::new)
}
