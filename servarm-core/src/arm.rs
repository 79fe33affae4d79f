//! Arm controller
//!
//! Owns the four joint outputs, the loaded configuration and the recorded
//! step sequence. Public positions are in control space; the controller
//! maps them to pulses right before handing a plan to the motion engine.
//!
//! Every operation runs to completion on the caller's thread. A caller that
//! exposes the arm to more than one source of commands must serialize them
//! around a single `&mut Arm`.

use embedded_hal::delay::DelayNs;
use servarm_hal::{ByteStore, DeviceId};

use crate::config::{ArmConfig, ConfigError, WifiConfig};
use crate::motion::engine::{read_joints, write_joints};
use crate::motion::{
    ControlPosition, Joint, MotionEngine, MotionError, MotionObserver, MovePlan, PulsePosition,
    JOINT_COUNT,
};
use crate::steps::{ArmStep, StepError, StepSequence};
use crate::storage::{LoadOutcome, Persistence, StorageError};
use crate::traits::{Cancel, NeverCancel, ServoOutput};

/// Arm controller errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArmError {
    /// No steps are recorded
    EmptySequence,
    /// The step sequence is full
    CapacityExceeded,
    /// A stop request interrupted the motion
    Cancelled,
    /// Configuration rejected before saving
    InvalidConfig(ConfigError),
    /// Byte store failure
    Storage(StorageError),
}

impl From<StepError> for ArmError {
    fn from(e: StepError) -> Self {
        match e {
            StepError::CapacityExceeded => ArmError::CapacityExceeded,
        }
    }
}

impl From<MotionError> for ArmError {
    fn from(e: MotionError) -> Self {
        match e {
            MotionError::Cancelled(_) => ArmError::Cancelled,
        }
    }
}

impl From<StorageError> for ArmError {
    fn from(e: StorageError) -> Self {
        ArmError::Storage(e)
    }
}

impl From<ConfigError> for ArmError {
    fn from(e: ConfigError) -> Self {
        ArmError::InvalidConfig(e)
    }
}

/// Report from [`Arm::begin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Boot {
    /// Position after parking at the start pulses
    pub position: ControlPosition,
    /// How the arm configuration was obtained
    pub config: LoadOutcome,
    /// Number of steps restored, or why none could be
    pub steps: Result<usize, StorageError>,
}

/// Four-joint servo arm
pub struct Arm<S, B, D, O = (), C = NeverCancel> {
    joints: [S; JOINT_COUNT],
    persistence: Persistence<B>,
    engine: MotionEngine<D, O, C>,
    config: ArmConfig,
    steps: StepSequence,
}

impl<S, B, D> Arm<S, B, D>
where
    S: ServoOutput,
    B: ByteStore,
    D: DelayNs,
{
    /// Create an arm with default configuration and no steps
    ///
    /// Nothing is read or driven until [`Arm::begin`].
    pub fn new(joints: [S; JOINT_COUNT], store: B, delay: D) -> Self {
        Self {
            joints,
            persistence: Persistence::new(store),
            engine: MotionEngine::new(delay),
            config: ArmConfig::default(),
            steps: StepSequence::new(),
        }
    }
}

impl<S, B, D, O, C> Arm<S, B, D, O, C>
where
    S: ServoOutput,
    B: ByteStore,
    D: DelayNs,
    O: MotionObserver,
    C: Cancel,
{
    /// Attach a motion observer
    pub fn with_observer<O2: MotionObserver>(self, observer: O2) -> Arm<S, B, D, O2, C> {
        Arm {
            joints: self.joints,
            persistence: self.persistence,
            engine: self.engine.with_observer(observer),
            config: self.config,
            steps: self.steps,
        }
    }

    /// Attach a stop source polled between increments
    pub fn with_cancel<C2: Cancel>(self, cancel: C2) -> Arm<S, B, D, O, C2> {
        Arm {
            joints: self.joints,
            persistence: self.persistence,
            engine: self.engine.with_cancel(cancel),
            config: self.config,
            steps: self.steps,
        }
    }

    /// Load configuration, park at the start pulses, attach, load steps
    ///
    /// Joints receive their calibrated start pulse before they are attached
    /// so the first pulse they see is the home position.
    pub fn begin(&mut self) -> Boot {
        let (config, outcome) = self.persistence.load_arm_config();
        self.config = config;

        write_joints(&mut self.joints, &self.config.start_pulses());
        for joint in self.joints.iter_mut() {
            joint.attach();
        }

        let steps = self.reload_steps();
        Boot {
            position: self.position(),
            config: outcome,
            steps,
        }
    }

    /// Attach every joint and return the position it holds
    pub fn attach(&mut self) -> ControlPosition {
        for joint in self.joints.iter_mut() {
            joint.attach();
        }
        self.position()
    }

    /// Detach every joint
    pub fn detach(&mut self) {
        for joint in self.joints.iter_mut() {
            joint.detach();
        }
    }

    /// Check if every joint is attached
    pub fn is_attached(&self) -> bool {
        self.joints.iter().all(|j| j.is_attached())
    }

    /// Commanded position in control space
    pub fn position(&self) -> ControlPosition {
        self.config.to_control(&self.pulse_position())
    }

    /// Commanded position in pulse space
    pub fn pulse_position(&self) -> PulsePosition {
        read_joints(&self.joints)
    }

    /// Move to a control-space position and return where the arm ended up
    pub fn move_to(&mut self, target: ControlPosition) -> Result<ControlPosition, ArmError> {
        self.travel(&target, 0)?;
        Ok(self.position())
    }

    /// Move to the first recorded step
    ///
    /// Playback state is untouched.
    pub fn go_to_start(&mut self) -> Result<ControlPosition, ArmError> {
        let first = self.steps.first().copied().ok_or(ArmError::EmptySequence)?;
        self.move_to(first.position)
    }

    /// Play the recorded steps in order and return how many were played
    ///
    /// Each step is reached with its own increment count and followed by its
    /// own pause. The first segment starts from the current position.
    pub fn play(&mut self) -> Result<usize, ArmError> {
        if self.steps.is_empty() {
            return Err(ArmError::EmptySequence);
        }

        for index in 0..self.steps.len() {
            let Some(step) = self.steps.get(index).copied() else {
                break;
            };
            self.engine.observer_mut().step_started(index, &step);
            self.travel(&step.position, step.steps)?;
            self.engine.hold(step.delay_ms);
        }
        Ok(self.steps.len())
    }

    /// Play the sequence `cycles` times, pausing `pause_ms` between passes
    ///
    /// Returns the number of completed passes.
    pub fn repeat(&mut self, cycles: u32, pause_ms: u32) -> Result<u32, ArmError> {
        for cycle in 0..cycles {
            if cycle > 0 {
                if self.engine.is_cancelled() {
                    return Err(ArmError::Cancelled);
                }
                self.engine.hold(pause_ms);
            }
            self.play()?;
        }
        Ok(cycles)
    }

    /// Hold the current position for `ms` milliseconds
    pub fn pause(&mut self, ms: u32) -> ControlPosition {
        self.engine.hold(ms);
        self.position()
    }

    /// Record a step and return the new step count
    pub fn add_step(&mut self, step: ArmStep) -> Result<usize, ArmError> {
        Ok(self.steps.push(step)?)
    }

    /// Drop the last recorded step and return the remaining count
    pub fn pop_step(&mut self) -> usize {
        self.steps.pop()
    }

    /// Forget every step, in memory and in the store
    ///
    /// The in-memory sequence is emptied even if the store commit fails.
    pub fn clear_steps(&mut self) -> Result<(), ArmError> {
        self.steps.clear();
        self.persistence.clear_steps()?;
        Ok(())
    }

    /// Persist the recorded steps
    pub fn save_steps(&mut self) -> Result<usize, ArmError> {
        self.persistence.save_steps(&self.steps)?;
        Ok(self.steps.len())
    }

    /// Replace the recorded steps with the stored ones
    ///
    /// On failure the sequence is left empty.
    pub fn load_steps(&mut self) -> Result<usize, ArmError> {
        Ok(self.reload_steps()?)
    }

    /// Recorded steps
    pub fn steps(&self) -> &StepSequence {
        &self.steps
    }

    /// Active configuration
    pub fn config(&self) -> &ArmConfig {
        &self.config
    }

    /// Validate, persist and adopt a new configuration
    ///
    /// A rejected or unsaved configuration leaves the active one in place.
    pub fn save_config(&mut self, mut config: ArmConfig) -> Result<(), ArmError> {
        config.validate()?;
        self.persistence.save_arm_config(&mut config)?;
        self.config = config;
        Ok(())
    }

    /// Load the Wi-Fi record, installing factory values if needed
    pub fn load_wifi_config(
        &mut self,
        prefix: &str,
        device: &impl DeviceId,
    ) -> (WifiConfig, LoadOutcome) {
        self.persistence.load_wifi_config(prefix, device)
    }

    /// Persist the Wi-Fi record
    pub fn save_wifi_config(&mut self, config: &mut WifiConfig) -> Result<(), ArmError> {
        config.validate()?;
        self.persistence.save_wifi_config(config)?;
        Ok(())
    }

    /// One joint output
    pub fn joint(&self, joint: Joint) -> &S {
        &self.joints[joint.index()]
    }

    /// Motion engine
    pub fn engine(&self) -> &MotionEngine<D, O, C> {
        &self.engine
    }

    /// Tear the arm down into its joints and store
    pub fn into_parts(self) -> ([S; JOINT_COUNT], B) {
        (self.joints, self.persistence.into_store())
    }

    fn travel(&mut self, target: &ControlPosition, steps: u32) -> Result<PulsePosition, ArmError> {
        let from = read_joints(&self.joints);
        let to = self.config.to_pulses(target);
        let plan = MovePlan::new(from, to, steps, self.config.speed);
        Ok(self
            .engine
            .run(&mut self.joints, &plan, self.config.increment_delay_ms)?)
    }

    fn reload_steps(&mut self) -> Result<usize, StorageError> {
        match self.persistence.load_steps() {
            Ok(steps) => {
                self.steps = steps;
                Ok(self.steps.len())
            }
            Err(e) => {
                self.steps.clear();
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::JointCalibration;
    use crate::steps::MAX_STEPS;
    use crate::storage::layout::{write_i32, STEP_COUNT_SLOT};
    use crate::storage::MigrationReason;
    use crate::testing::{test_arm, test_arm_with_store, Event, StopAfter, TestStore};
    use servarm_hal::StoreError;
    use std::vec::Vec;

    fn recorded() -> [ArmStep; 2] {
        [
            ArmStep::new(ControlPosition::new(10, 20, 30, 40), 0, 100),
            ArmStep::new(ControlPosition::new(50, 60, 70, 80), 5, 200),
        ]
    }

    #[test]
    fn test_begin_parks_before_attaching() {
        let mut arm = test_arm();
        for joint in Joint::ALL {
            assert_eq!(arm.joint(joint).writes.len(), 0);
        }
        arm.detach();

        let boot = arm.begin();

        assert_eq!(boot.position, ControlPosition::splat(90));
        assert_eq!(boot.steps, Ok(0));
        assert!(matches!(
            boot.config,
            LoadOutcome::Migrated {
                reason: MigrationReason::Unreadable,
                persisted: Ok(()),
            }
        ));
        for joint in Joint::ALL {
            let writes = &arm.joint(joint).writes;
            assert_eq!(writes.len(), 1);
            assert!(!writes[0].attached);
            assert_eq!(writes[0].pulse, 1500);
        }
        assert!(arm.is_attached());
    }

    #[test]
    fn test_begin_uses_stored_calibration() {
        let mut arm = test_arm();
        arm.begin();
        let mut config = *arm.config();
        config.neck = JointCalibration::new(1000, 2000, 1800);
        arm.save_config(config).unwrap();

        let (_, mut store) = arm.into_parts();
        store.power_cycle();
        let mut arm = test_arm_with_store(store);
        let boot = arm.begin();

        assert_eq!(boot.config, LoadOutcome::Loaded);
        assert_eq!(arm.joint(Joint::Neck).read_microseconds(), 1800);
        assert_eq!(arm.config().neck, JointCalibration::new(1000, 2000, 1800));
    }

    #[test]
    fn test_move_to_round_trips_control_position() {
        let mut arm = test_arm();
        arm.begin();

        let target = ControlPosition::new(0, 45, 135, 180);
        assert_eq!(arm.move_to(target), Ok(target));
        assert_eq!(arm.pulse_position(), PulsePosition::new(600, 1050, 1950, 2400));
    }

    #[test]
    fn test_move_to_paces_by_speed_and_increment_delay() {
        let mut arm = test_arm();
        arm.begin();

        arm.move_to(ControlPosition::new(180, 90, 90, 90)).unwrap();

        // 900 us of base travel at 10 us per increment
        assert_eq!(arm.engine().delay().pauses.len(), 90);
        assert!(arm.engine().delay().pauses.iter().all(|&ms| ms == 10));
    }

    #[test]
    fn test_move_to_current_position_is_one_increment() {
        let mut arm = test_arm();
        arm.begin();

        let here = arm.position();
        assert_eq!(arm.move_to(here), Ok(here));
        assert_eq!(arm.engine().delay().pauses, [10]);
    }

    #[test]
    fn test_play_visits_steps_in_order_and_holds() {
        let mut arm = test_arm();
        arm.begin();
        for step in recorded() {
            arm.add_step(step).unwrap();
        }

        assert_eq!(arm.play(), Ok(2));
        assert_eq!(arm.position(), ControlPosition::new(50, 60, 70, 80));

        let observer = arm.engine().observer();
        let started: Vec<usize> = observer
            .events
            .iter()
            .filter_map(|e| match e {
                Event::StepStarted(i, _) => Some(*i),
                _ => None,
            })
            .collect();
        assert_eq!(started, [0, 1]);

        let finished = observer.moves_finished();
        assert_eq!(finished[0], arm.config().to_pulses(&recorded()[0].position));

        let pauses = &arm.engine().delay().pauses;
        assert!(pauses.contains(&100));
        assert_eq!(pauses.last(), Some(&200));
    }

    #[test]
    fn test_play_honours_explicit_step_count() {
        let mut arm = test_arm();
        arm.begin();
        arm.add_step(ArmStep::new(ControlPosition::splat(0), 3, 0)).unwrap();

        arm.play().unwrap();

        assert_eq!(arm.joint(Joint::Base).writes.len(), 1 + 3);
        assert_eq!(arm.engine().delay().pauses, [10, 10, 10]);
    }

    #[test]
    fn test_empty_sequence_is_reported() {
        let mut arm = test_arm();
        arm.begin();

        assert_eq!(arm.play(), Err(ArmError::EmptySequence));
        assert_eq!(arm.go_to_start(), Err(ArmError::EmptySequence));
        assert!(arm.engine().delay().pauses.is_empty());
    }

    #[test]
    fn test_go_to_start_moves_to_first_step() {
        let mut arm = test_arm();
        arm.begin();
        for step in recorded() {
            arm.add_step(step).unwrap();
        }

        assert_eq!(arm.go_to_start(), Ok(ControlPosition::new(10, 20, 30, 40)));
        assert_eq!(arm.steps().len(), 2);
    }

    #[test]
    fn test_add_beyond_capacity_is_rejected() {
        let mut arm = test_arm();
        for i in 0..MAX_STEPS {
            assert_eq!(
                arm.add_step(ArmStep::new(ControlPosition::splat(i as i32), 0, 0)),
                Ok(i + 1)
            );
        }
        let before = arm.steps().clone();

        assert_eq!(
            arm.add_step(ArmStep::new(ControlPosition::splat(0), 0, 0)),
            Err(ArmError::CapacityExceeded)
        );
        assert_eq!(arm.steps(), &before);
    }

    #[test]
    fn test_pop_step() {
        let mut arm = test_arm();
        assert_eq!(arm.pop_step(), 0);
        for step in recorded() {
            arm.add_step(step).unwrap();
        }
        assert_eq!(arm.pop_step(), 1);
        assert_eq!(arm.steps().as_slice(), &recorded()[..1]);
    }

    #[test]
    fn test_saved_steps_are_restored_on_next_boot() {
        let mut arm = test_arm();
        arm.begin();
        for step in recorded() {
            arm.add_step(step).unwrap();
        }
        assert_eq!(arm.save_steps(), Ok(2));

        let (_, mut store) = arm.into_parts();
        store.power_cycle();
        let mut arm = test_arm_with_store(store);
        let boot = arm.begin();

        assert_eq!(boot.steps, Ok(2));
        assert_eq!(arm.steps().as_slice(), &recorded());
    }

    #[test]
    fn test_unsaved_steps_are_replaced_by_load() {
        let mut arm = test_arm();
        arm.begin();
        arm.add_step(recorded()[0]).unwrap();
        arm.save_steps().unwrap();
        arm.add_step(recorded()[1]).unwrap();

        assert_eq!(arm.load_steps(), Ok(1));
        assert_eq!(arm.steps().as_slice(), &recorded()[..1]);
    }

    #[test]
    fn test_clear_then_play_is_a_no_op() {
        let mut arm = test_arm();
        arm.begin();
        for step in recorded() {
            arm.add_step(step).unwrap();
        }
        arm.save_steps().unwrap();

        arm.clear_steps().unwrap();
        assert_eq!(arm.load_steps(), Ok(0));
        assert_eq!(arm.play(), Err(ArmError::EmptySequence));
    }

    #[test]
    fn test_save_steps_reports_commit_failure() {
        let mut store = TestStore::new();
        store.set_fail_commit(true);
        let mut arm = test_arm_with_store(store);
        arm.add_step(recorded()[0]).unwrap();

        assert!(matches!(arm.save_steps(), Err(ArmError::Storage(_))));
        assert_eq!(arm.steps().len(), 1);
    }

    #[test]
    fn test_corrupted_step_count_boots_empty() {
        let mut arm = test_arm();
        arm.begin();
        for step in recorded() {
            arm.add_step(step).unwrap();
        }
        arm.save_steps().unwrap();

        let (_, mut store) = arm.into_parts();
        write_i32(&mut store, STEP_COUNT_SLOT, MAX_STEPS as i32 + 1).unwrap();
        store.commit().unwrap();
        let mut arm = test_arm_with_store(store);
        let boot = arm.begin();

        assert_eq!(boot.steps, Err(StorageError::Corrupted));
        assert!(arm.steps().is_empty());
        assert_eq!(arm.play(), Err(ArmError::EmptySequence));
    }

    #[test]
    fn test_undecodable_steps_empty_the_sequence() {
        let mut store = TestStore::new();
        write_i32(&mut store, STEP_COUNT_SLOT, 3).unwrap();
        let mut arm = test_arm_with_store(store);
        for step in recorded() {
            arm.add_step(step).unwrap();
        }

        assert_eq!(
            arm.load_steps(),
            Err(ArmError::Storage(StorageError::Deserialize))
        );
        assert!(arm.steps().is_empty());
    }

    #[test]
    fn test_clear_empties_memory_when_commit_fails() {
        let mut store = TestStore::new();
        store.set_fail_commit(true);
        let mut arm = test_arm_with_store(store);
        for step in recorded() {
            arm.add_step(step).unwrap();
        }

        assert_eq!(
            arm.clear_steps(),
            Err(ArmError::Storage(StorageError::Store(StoreError::Commit)))
        );
        assert!(arm.steps().is_empty());
    }

    #[test]
    fn test_unsaved_config_is_not_adopted() {
        let mut store = TestStore::new();
        store.set_fail_commit(true);
        let mut arm = test_arm_with_store(store);
        arm.begin();
        let active = *arm.config();
        let mut config = active;
        config.speed = 25;

        assert_eq!(
            arm.save_config(config),
            Err(ArmError::Storage(StorageError::Store(StoreError::Commit)))
        );
        assert_eq!(arm.config(), &active);
    }

    #[test]
    fn test_save_config_rejects_invalid_values() {
        let mut arm = test_arm();
        arm.begin();
        let mut config = *arm.config();
        config.speed = 0;

        assert_eq!(
            arm.save_config(config),
            Err(ArmError::InvalidConfig(ConfigError::ZeroSpeed))
        );
        assert_eq!(arm.config().speed, 10);
    }

    #[test]
    fn test_steps_survive_recalibration() {
        let mut arm = test_arm();
        arm.begin();
        arm.add_step(ArmStep::new(ControlPosition::splat(90), 0, 0)).unwrap();

        let mut config = *arm.config();
        config.base = JointCalibration::new(1000, 2000, 1500);
        arm.save_config(config).unwrap();
        arm.play().unwrap();

        assert_eq!(arm.pulse_position().base, 1500);
        assert_eq!(arm.position(), ControlPosition::splat(90));
    }

    #[test]
    fn test_cancel_interrupts_playback() {
        let mut arm = test_arm().with_cancel(StopAfter::new(3));
        arm.begin();
        for step in recorded() {
            arm.add_step(step).unwrap();
        }

        assert_eq!(arm.play(), Err(ArmError::Cancelled));
        assert_eq!(arm.engine().delay().pauses.len(), 3);
        assert!(matches!(
            arm.engine().observer().events.last(),
            Some(Event::MoveCancelled(_))
        ));
    }

    #[test]
    fn test_repeat_pauses_between_passes() {
        let mut arm = test_arm();
        arm.begin();
        arm.add_step(ArmStep::new(ControlPosition::splat(90), 1, 0)).unwrap();

        assert_eq!(arm.repeat(3, 500), Ok(3));
        assert_eq!(arm.engine().delay().pauses, [10, 500, 10, 500, 10]);
        assert_eq!(arm.engine().delay().total_ms(), 1030);
    }

    #[test]
    fn test_pause_holds_position() {
        let mut arm = test_arm();
        arm.begin();

        assert_eq!(arm.pause(250), ControlPosition::splat(90));
        assert_eq!(arm.engine().delay().pauses, [250]);
    }

    #[test]
    fn test_detach_keeps_configuration() {
        let mut arm = test_arm();
        arm.begin();
        let config = *arm.config();

        arm.detach();
        assert!(!arm.is_attached());
        assert_eq!(arm.attach(), ControlPosition::splat(90));
        assert_eq!(arm.config(), &config);
    }

    #[test]
    fn test_wifi_record_through_arm() {
        let mut arm = test_arm();
        let (mut wifi, outcome) = arm.load_wifi_config("arm", &0xABCDu64);
        assert!(outcome.is_migrated());
        assert_eq!(wifi.name.as_str(), "arm-0000abcd");

        wifi.name.clear();
        assert_eq!(
            arm.save_wifi_config(&mut wifi),
            Err(ArmError::InvalidConfig(ConfigError::EmptyName))
        );
    }
}
