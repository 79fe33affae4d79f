//! Servarm - Four-Joint Servo Arm Firmware
//!
//! Main firmware binary for RP2040 boards. Drives a base/body/neck/claw
//! hobby-servo arm from line commands on UART0 (see
//! `servarm_core::command` for the command set).
//!
//! Everything runs on the main task: a command is read, executed to
//! completion and answered before the next one is read, so moves and
//! configuration changes can never overlap.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::uart::{Config as UartConfig, Uart};
use embassy_time::Delay;
use heapless::String;
use {defmt_rtt as _, panic_probe as _};

use servarm_core::command::run_line;
use servarm_core::storage::LoadOutcome;
use servarm_core::Arm;
use servarm_hal::DeviceId;
use servarm_hal_rp2040::{flash, servo, Eeprom, RpServo, StopButton};

use crate::console::{Console, LineError, MAX_LINE};
use crate::observer::DefmtObserver;

mod console;
mod observer;

/// Board values validated from arm.toml at build time
mod board {
    include!(concat!(env!("OUT_DIR"), "/board_config.rs"));
}

type FirmwareArm =
    Arm<RpServo<'static>, Eeprom<'static>, Delay, DefmtObserver, StopButton<'static>>;

/// Main entry point
#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Servarm firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // EEPROM partition in the last flash sector
    let (eeprom, device) = unwrap!(flash::init(p.FLASH));
    info!("Flash unique ID {=u64:x}", device.unique_id());

    // Servo pins are board-specific: GPIO2/4/6/8 on PWM slices 1-4, channel A
    let base = unwrap!(servo::servo_a(p.PWM_SLICE1, p.PIN_2));
    let body = unwrap!(servo::servo_a(p.PWM_SLICE2, p.PIN_4));
    let neck = unwrap!(servo::servo_a(p.PWM_SLICE3, p.PIN_6));
    let claw = unwrap!(servo::servo_a(p.PWM_SLICE4, p.PIN_8));
    let joints = [base, body, neck, claw].map(|s| s.with_limits(board::PULSE_LIMITS));
    info!("Servo outputs initialized");

    // Stop button on GPIO15, active low
    let stop = StopButton::new(p.PIN_15);

    let mut arm: FirmwareArm = Arm::new(joints, eeprom, Delay)
        .with_observer(DefmtObserver)
        .with_cancel(stop);

    let boot = arm.begin();
    match boot.config {
        LoadOutcome::Loaded => info!("Arm config loaded"),
        LoadOutcome::Migrated { reason, persisted } => {
            warn!("Arm config reset to defaults: {}", reason);
            if let Err(e) = persisted {
                error!("Writing default arm config failed: {}", e);
            }
        }
    }
    match boot.steps {
        Ok(count) => info!("{} steps restored", count),
        Err(e) => warn!("Stored steps unreadable: {}", e),
    }
    info!("Parked at {}", boot.position);

    let (wifi, outcome) = arm.load_wifi_config(board::NAME_PREFIX, &device);
    if outcome.is_migrated() {
        info!("Wi-Fi config initialized with factory values");
    }
    info!("Device name {=str}", wifi.name.as_str());

    let mut uart_config = UartConfig::default();
    uart_config.baudrate = board::CONSOLE_BAUDRATE;
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let mut console = Console::new(uart);
    info!("Console ready on UART0 at {} baud", board::CONSOLE_BAUDRATE);

    console_loop(&mut arm, &mut console);
}

/// Read, run and answer commands forever
fn console_loop(arm: &mut FirmwareArm, console: &mut Console<'static>) -> ! {
    use core::fmt::Write;

    let mut line: String<MAX_LINE> = String::new();
    loop {
        let result = match console.read_line(&mut line) {
            Ok(()) => {
                debug!("> {=str}", line.as_str());
                run_line(arm, &line, console)
            }
            Err(LineError::TooLong) => writeln!(console, "ERR line too long"),
            Err(LineError::Uart(e)) => {
                warn!("Console UART error: {}", e);
                Ok(())
            }
        };
        if result.is_err() {
            warn!("Console reply could not be written");
        }
    }
}
