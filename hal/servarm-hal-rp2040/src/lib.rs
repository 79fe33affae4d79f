//! RP2040-specific HAL for the servo arm firmware
//!
//! This crate wires the shared driver implementations to RP2040
//! peripherals:
//!
//! - Flash EEPROM partition and the flash unique ID (implements
//!   `servarm_hal::ByteStore` and `servarm_hal::DeviceId`)
//! - 50 Hz hardware PWM servo channels
//! - Active-low stop button (implements `servarm_core::traits::Cancel`)

#![no_std]

pub mod button;
pub mod flash;
pub mod servo;

pub use button::StopButton;
pub use flash::{Eeprom, FlashId};
pub use servo::RpServo;
