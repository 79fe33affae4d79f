//! Console command set
//!
//! One command per line, whitespace separated, verbs case-insensitive.
//! Every command produces exactly one reply line starting with `OK` or
//! `ERR`; `LIST` prints one line per step before its `OK`.
//!
//! ```text
//! POS                        MOVE b n k c
//! ADD b n k c [steps] [ms]   POP    CLEAR   SAVE   LOAD
//! START   PLAY               REPEAT n [ms]  LIST
//! ATTACH  DETACH             SPEED n        IDELAY ms
//! CAL joint min max start    RANGE min max
//! ```

use core::fmt::Write;
use core::str::{FromStr, SplitWhitespace};

use embedded_hal::delay::DelayNs;
use servarm_hal::ByteStore;

use crate::arm::{Arm, ArmError};
use crate::config::{ConfigError, ControlRange, JointCalibration};
use crate::motion::{ControlPosition, Joint, MotionObserver};
use crate::steps::ArmStep;
use crate::storage::StorageError;
use crate::traits::{Cancel, ServoOutput};

/// A parsed console command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Position,
    Move(ControlPosition),
    Add(ArmStep),
    Pop,
    Clear,
    Save,
    Load,
    Start,
    Play,
    Repeat { cycles: u32, pause_ms: u32 },
    List,
    Attach,
    Detach,
    Speed(u32),
    IncrementDelay(u32),
    Calibrate(Joint, JointCalibration),
    Range(ControlRange),
}

/// Command line errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Blank line
    Empty,
    /// Verb not recognised
    UnknownCommand,
    /// Required argument not given
    MissingArgument,
    /// Argument is not a number
    InvalidNumber,
    /// Joint name not recognised
    UnknownJoint,
    /// More arguments than the command takes
    TrailingInput,
}

impl ParseError {
    /// Short reply text
    pub fn reason(&self) -> &'static str {
        match self {
            ParseError::Empty => "empty",
            ParseError::UnknownCommand => "unknown command",
            ParseError::MissingArgument => "missing argument",
            ParseError::InvalidNumber => "invalid number",
            ParseError::UnknownJoint => "unknown joint",
            ParseError::TrailingInput => "too many arguments",
        }
    }
}

struct Args<'a>(SplitWhitespace<'a>);

impl<'a> Args<'a> {
    fn number<T: FromStr>(&mut self) -> Result<T, ParseError> {
        let token = self.0.next().ok_or(ParseError::MissingArgument)?;
        token.parse().map_err(|_| ParseError::InvalidNumber)
    }

    fn number_or<T: FromStr>(&mut self, default: T) -> Result<T, ParseError> {
        match self.0.next() {
            Some(token) => token.parse().map_err(|_| ParseError::InvalidNumber),
            None => Ok(default),
        }
    }

    fn position(&mut self) -> Result<ControlPosition, ParseError> {
        Ok(ControlPosition::new(
            self.number()?,
            self.number()?,
            self.number()?,
            self.number()?,
        ))
    }

    fn joint(&mut self) -> Result<Joint, ParseError> {
        let token = self.0.next().ok_or(ParseError::MissingArgument)?;
        Joint::from_name(token).ok_or(ParseError::UnknownJoint)
    }

    fn finish(mut self) -> Result<(), ParseError> {
        match self.0.next() {
            Some(_) => Err(ParseError::TrailingInput),
            None => Ok(()),
        }
    }
}

impl Command {
    /// Parse one console line
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let mut tokens = line.split_whitespace();
        let verb = tokens.next().ok_or(ParseError::Empty)?;
        let mut args = Args(tokens);

        let command = if verb.eq_ignore_ascii_case("POS") {
            Command::Position
        } else if verb.eq_ignore_ascii_case("MOVE") {
            Command::Move(args.position()?)
        } else if verb.eq_ignore_ascii_case("ADD") {
            let position = args.position()?;
            let steps = args.number_or(0)?;
            let delay_ms = args.number_or(0)?;
            Command::Add(ArmStep::new(position, steps, delay_ms))
        } else if verb.eq_ignore_ascii_case("POP") {
            Command::Pop
        } else if verb.eq_ignore_ascii_case("CLEAR") {
            Command::Clear
        } else if verb.eq_ignore_ascii_case("SAVE") {
            Command::Save
        } else if verb.eq_ignore_ascii_case("LOAD") {
            Command::Load
        } else if verb.eq_ignore_ascii_case("START") {
            Command::Start
        } else if verb.eq_ignore_ascii_case("PLAY") {
            Command::Play
        } else if verb.eq_ignore_ascii_case("REPEAT") {
            Command::Repeat {
                cycles: args.number()?,
                pause_ms: args.number_or(0)?,
            }
        } else if verb.eq_ignore_ascii_case("LIST") {
            Command::List
        } else if verb.eq_ignore_ascii_case("ATTACH") {
            Command::Attach
        } else if verb.eq_ignore_ascii_case("DETACH") {
            Command::Detach
        } else if verb.eq_ignore_ascii_case("SPEED") {
            Command::Speed(args.number()?)
        } else if verb.eq_ignore_ascii_case("IDELAY") {
            Command::IncrementDelay(args.number()?)
        } else if verb.eq_ignore_ascii_case("CAL") {
            let joint = args.joint()?;
            Command::Calibrate(
                joint,
                JointCalibration::new(args.number()?, args.number()?, args.number()?),
            )
        } else if verb.eq_ignore_ascii_case("RANGE") {
            Command::Range(ControlRange::new(args.number()?, args.number()?))
        } else {
            return Err(ParseError::UnknownCommand);
        };

        args.finish()?;
        Ok(command)
    }

    /// Run the command and write its reply
    pub fn execute<S, B, D, O, C>(
        &self,
        arm: &mut Arm<S, B, D, O, C>,
        out: &mut impl Write,
    ) -> core::fmt::Result
    where
        S: ServoOutput,
        B: ByteStore,
        D: DelayNs,
        O: MotionObserver,
        C: Cancel,
    {
        match *self {
            Command::Position => writeln!(out, "OK {}", arm.position()),
            Command::Move(target) => reply(out, arm.move_to(target)),
            Command::Add(step) => reply(out, arm.add_step(step)),
            Command::Pop => writeln!(out, "OK {}", arm.pop_step()),
            Command::Clear => reply(out, arm.clear_steps().map(|()| arm.steps().len())),
            Command::Save => reply(out, arm.save_steps()),
            Command::Load => reply(out, arm.load_steps()),
            Command::Start => reply(out, arm.go_to_start()),
            Command::Play => reply(out, arm.play()),
            Command::Repeat { cycles, pause_ms } => reply(out, arm.repeat(cycles, pause_ms)),
            Command::List => {
                for (index, step) in arm.steps().iter().enumerate() {
                    writeln!(
                        out,
                        "{}: {} {} {}",
                        index, step.position, step.steps, step.delay_ms
                    )?;
                }
                writeln!(out, "OK {}", arm.steps().len())
            }
            Command::Attach => writeln!(out, "OK {}", arm.attach()),
            Command::Detach => {
                arm.detach();
                writeln!(out, "OK")
            }
            Command::Speed(speed) => {
                let mut config = *arm.config();
                config.speed = speed;
                reply(out, arm.save_config(config).map(|()| speed))
            }
            Command::IncrementDelay(ms) => {
                let mut config = *arm.config();
                config.increment_delay_ms = ms;
                reply(out, arm.save_config(config).map(|()| ms))
            }
            Command::Calibrate(joint, calibration) => {
                let mut config = *arm.config();
                *config.calibration_mut(joint) = calibration;
                reply(out, arm.save_config(config).map(|()| joint.name()))
            }
            Command::Range(range) => {
                let mut config = *arm.config();
                config.control = range;
                reply(out, arm.save_config(config).map(|()| arm.position()))
            }
        }
    }
}

impl TryFrom<&str> for Command {
    type Error = ParseError;

    fn try_from(line: &str) -> Result<Self, Self::Error> {
        Command::parse(line)
    }
}

/// Parse and run one console line, writing the reply
pub fn run_line<S, B, D, O, C>(
    arm: &mut Arm<S, B, D, O, C>,
    line: &str,
    out: &mut impl Write,
) -> core::fmt::Result
where
    S: ServoOutput,
    B: ByteStore,
    D: DelayNs,
    O: MotionObserver,
    C: Cancel,
{
    match Command::parse(line) {
        Ok(command) => command.execute(arm, out),
        Err(ParseError::Empty) => Ok(()),
        Err(e) => writeln!(out, "ERR {}", e.reason()),
    }
}

fn reply<T: core::fmt::Display>(
    out: &mut impl Write,
    result: Result<T, ArmError>,
) -> core::fmt::Result {
    match result {
        Ok(value) => writeln!(out, "OK {}", value),
        Err(e) => writeln!(out, "ERR {}", error_reason(&e)),
    }
}

fn error_reason(e: &ArmError) -> &'static str {
    match e {
        ArmError::EmptySequence => "no steps",
        ArmError::CapacityExceeded => "step capacity exceeded",
        ArmError::Cancelled => "cancelled",
        ArmError::InvalidConfig(ConfigError::ZeroSpeed) => "speed must be positive",
        ArmError::InvalidConfig(ConfigError::InvalidControlRange) => "invalid control range",
        ArmError::InvalidConfig(ConfigError::InvalidCalibration(_)) => "invalid calibration",
        ArmError::InvalidConfig(ConfigError::EmptyName) => "empty name",
        ArmError::Storage(StorageError::Store(_)) => "store failure",
        ArmError::Storage(StorageError::Serialize | StorageError::Deserialize) => {
            "unreadable record"
        }
        ArmError::Storage(StorageError::Corrupted) => "corrupted step count",
    }
}
