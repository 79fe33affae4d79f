//! Test doubles shared by the unit tests

use embedded_hal::delay::DelayNs;
use servarm_hal::MemoryStore;
use std::vec::Vec;

use crate::arm::Arm;
use crate::motion::{MotionObserver, MovePlan, PulsePosition, JOINT_COUNT};
use crate::steps::ArmStep;
use crate::traits::{Cancel, ServoOutput};

/// Store large enough for the whole layout
pub type TestStore = MemoryStore<4096>;

/// A pulse written to a mock servo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Write {
    pub attached: bool,
    pub pulse: i32,
}

/// Servo that records every write
#[derive(Debug, Clone)]
pub struct MockServo {
    attached: bool,
    pulse: i32,
    pub writes: Vec<Write>,
}

impl MockServo {
    pub fn new(pulse: i32) -> Self {
        Self {
            attached: true,
            pulse,
            writes: Vec::new(),
        }
    }
}

impl ServoOutput for MockServo {
    fn attach(&mut self) {
        self.attached = true;
    }

    fn detach(&mut self) {
        self.attached = false;
    }

    fn is_attached(&self) -> bool {
        self.attached
    }

    fn write_microseconds(&mut self, pulse_us: i32) {
        self.pulse = pulse_us;
        self.writes.push(Write {
            attached: self.attached,
            pulse: pulse_us,
        });
    }

    fn read_microseconds(&self) -> i32 {
        self.pulse
    }
}

/// Four attached mock servos at `pulse`
pub fn servos(pulse: i32) -> [MockServo; JOINT_COUNT] {
    core::array::from_fn(|_| MockServo::new(pulse))
}

/// Delay that records requested pauses instead of sleeping
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub pauses: Vec<u32>,
}

impl RecordingDelay {
    pub fn total_ms(&self) -> u64 {
        self.pauses.iter().map(|&ms| ms as u64).sum()
    }
}

impl DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.pauses.push(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.pauses.push(ms);
    }
}

/// Motion event captured by [`RecordingObserver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    MoveStarted(MovePlan),
    Increment(u32, PulsePosition),
    MoveFinished(PulsePosition),
    MoveCancelled(PulsePosition),
    StepStarted(usize, ArmStep),
}

/// Observer that records every event
#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub events: Vec<Event>,
}

impl RecordingObserver {
    pub fn moves_finished(&self) -> Vec<PulsePosition> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::MoveFinished(p) => Some(*p),
                _ => None,
            })
            .collect()
    }
}

impl MotionObserver for RecordingObserver {
    fn move_started(&mut self, plan: &MovePlan) {
        self.events.push(Event::MoveStarted(*plan));
    }

    fn increment(&mut self, index: u32, pulses: &PulsePosition) {
        self.events.push(Event::Increment(index, *pulses));
    }

    fn move_finished(&mut self, pulses: &PulsePosition) {
        self.events.push(Event::MoveFinished(*pulses));
    }

    fn move_cancelled(&mut self, pulses: &PulsePosition) {
        self.events.push(Event::MoveCancelled(*pulses));
    }

    fn step_started(&mut self, index: usize, step: &ArmStep) {
        self.events.push(Event::StepStarted(index, *step));
    }
}

/// Stop source that fires after a number of polls
#[derive(Debug)]
pub struct StopAfter {
    remaining: u32,
}

impl StopAfter {
    pub fn new(polls: u32) -> Self {
        Self { remaining: polls }
    }
}

impl Cancel for StopAfter {
    fn is_cancelled(&mut self) -> bool {
        if self.remaining == 0 {
            return true;
        }
        self.remaining -= 1;
        false
    }
}

/// Arm wired to mocks
pub type TestArm = Arm<MockServo, TestStore, RecordingDelay, RecordingObserver>;

/// Arm over an erased store with servos idling at 1500 us
pub fn test_arm() -> TestArm {
    test_arm_with_store(TestStore::new())
}

/// Arm over a given store with servos idling at 1500 us
pub fn test_arm_with_store(store: TestStore) -> TestArm {
    Arm::new(servos(1500), store, RecordingDelay::default())
        .with_observer(RecordingObserver::default())
}
