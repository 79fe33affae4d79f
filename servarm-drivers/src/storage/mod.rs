//! Persistent store drivers

pub mod eeprom;

pub use eeprom::NorEeprom;
