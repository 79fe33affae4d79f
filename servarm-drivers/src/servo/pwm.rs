//! Hobby servo on a PWM channel
//!
//! This driver provides:
//! - Pulse width to duty cycle conversion for any PWM period
//! - Optional pulse limits (writes are clamped into them)
//! - Arduino `Servo` compatible attach semantics
//!
//! # Usage
//!
//! The PWM channel must already run at the servo frame rate (50 Hz for
//! almost every hobby servo). The driver only sets the duty cycle.
//!
//! ```ignore
//! let mut servo = PwmServo::new(channel);
//! servo.write_microseconds(1500); // remembered, nothing output yet
//! servo.attach();                 // pulse train starts at 1500 us
//! ```

use embedded_hal::pwm::SetDutyCycle;
use servarm_core::traits::ServoOutput;

/// Servo frame period at 50 Hz
pub const SERVO_PERIOD_US: u32 = 20_000;

/// Pulse commanded before the first write (servo centre)
pub const DEFAULT_PULSE_US: i32 = 1500;

/// Pulse width bounds enforced on every write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PulseLimits {
    pub min_us: i32,
    pub max_us: i32,
}

impl PulseLimits {
    /// Limits used by the Arduino `Servo` library
    pub const ARDUINO: Self = Self {
        min_us: 544,
        max_us: 2400,
    };

    pub const fn new(min_us: i32, max_us: i32) -> Self {
        Self { min_us, max_us }
    }

    fn clamp(&self, pulse_us: i32) -> i32 {
        pulse_us.clamp(self.min_us, self.max_us)
    }
}

/// Servo driven by one PWM channel
pub struct PwmServo<P> {
    pwm: P,
    period_us: u32,
    limits: Option<PulseLimits>,
    pulse_us: i32,
    attached: bool,
}

impl<P: SetDutyCycle> PwmServo<P> {
    /// Wrap a PWM channel running at 50 Hz
    ///
    /// The servo starts detached at [`DEFAULT_PULSE_US`].
    pub fn new(pwm: P) -> Self {
        Self {
            pwm,
            period_us: SERVO_PERIOD_US,
            limits: None,
            pulse_us: DEFAULT_PULSE_US,
            attached: false,
        }
    }

    /// Use a channel running at another frame period
    pub fn with_period_us(mut self, period_us: u32) -> Self {
        self.period_us = period_us.max(1);
        self
    }

    /// Clamp every write into `limits`
    pub fn with_limits(mut self, limits: PulseLimits) -> Self {
        self.limits = Some(limits);
        self.pulse_us = limits.clamp(self.pulse_us);
        self
    }

    /// Duty cycle that produces the commanded pulse
    pub fn duty(&self) -> u16 {
        let ceiling = self.period_us.min(i32::MAX as u32) as i32;
        let pulse = self.pulse_us.clamp(0, ceiling) as u64;
        let max = self.pwm.max_duty_cycle() as u64;
        (pulse * max / self.period_us as u64) as u16
    }

    /// Release the PWM channel
    pub fn free(self) -> P {
        self.pwm
    }

    fn output(&mut self) {
        let duty = self.duty();
        let _ = self.pwm.set_duty_cycle(duty);
    }
}

impl<P: SetDutyCycle> ServoOutput for PwmServo<P> {
    fn attach(&mut self) {
        self.attached = true;
        self.output();
    }

    fn detach(&mut self) {
        self.attached = false;
        let _ = self.pwm.set_duty_cycle_fully_off();
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn write_microseconds(&mut self, pulse_us: i32) {
        self.pulse_us = match self.limits {
            Some(limits) => limits.clamp(pulse_us),
            None => pulse_us,
        };
        if self.attached {
            self.output();
        }
    }

    fn read_microseconds(&self) -> i32 {
        self.pulse_us
    }
}
