//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the capabilities
//! consumed by servarm-core, written against the embedded-hal and
//! embedded-storage traits so any chip HAL can back them:
//!
//! - Hobby servo output on a PWM channel
//! - EEPROM emulation on a NOR flash sector

#![no_std]
#![deny(unsafe_code)]

pub mod servo;
pub mod storage;
