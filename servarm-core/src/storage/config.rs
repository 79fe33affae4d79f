//! Versioned configuration records
//!
//! Each record starts with a layout version. A record that cannot be
//! decoded, carries another version, or fails validation is replaced by
//! built-in defaults, which are written back immediately so the next boot
//! finds a good record.

use serde::de::DeserializeOwned;
use serde::Serialize;
use servarm_hal::{ByteStore, DeviceId};

use super::layout::{read_record, write_record, Slot, ARM_SLOT, WIFI_SLOT};
use super::{Persistence, StorageError};
use crate::config::{ArmConfig, ConfigError, WifiConfig, ARM_CONFIG_VERSION, WIFI_CONFIG_VERSION};

/// Why a stored record was replaced by defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MigrationReason {
    /// Slot did not decode (erased store, foreign layout, read failure)
    Unreadable,
    /// Record was written by another layout version
    VersionMismatch { found: u32 },
    /// Record decoded but holds unusable values
    Invalid(ConfigError),
}

/// Result of loading a configuration record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadOutcome {
    /// Stored record was used as-is
    Loaded,
    /// Defaults were installed; `persisted` reports the write-back
    Migrated {
        reason: MigrationReason,
        persisted: Result<(), StorageError>,
    },
}

impl LoadOutcome {
    /// Check if defaults replaced the stored record
    pub fn is_migrated(&self) -> bool {
        matches!(self, LoadOutcome::Migrated { .. })
    }
}

/// A configuration record with a layout version and a fixed slot
trait Versioned: Serialize + DeserializeOwned {
    const VERSION: u32;
    const SLOT: Slot;

    fn version(&self) -> u32;
    fn set_version(&mut self, version: u32);
    fn validate(&self) -> Result<(), ConfigError>;
}

impl Versioned for ArmConfig {
    const VERSION: u32 = ARM_CONFIG_VERSION;
    const SLOT: Slot = ARM_SLOT;

    fn version(&self) -> u32 {
        self.version
    }

    fn set_version(&mut self, version: u32) {
        self.version = version;
    }

    fn validate(&self) -> Result<(), ConfigError> {
        ArmConfig::validate(self)
    }
}

impl Versioned for WifiConfig {
    const VERSION: u32 = WIFI_CONFIG_VERSION;
    const SLOT: Slot = WIFI_SLOT;

    fn version(&self) -> u32 {
        self.version
    }

    fn set_version(&mut self, version: u32) {
        self.version = version;
    }

    fn validate(&self) -> Result<(), ConfigError> {
        WifiConfig::validate(self)
    }
}

impl<B: ByteStore> Persistence<B> {
    /// Load the arm configuration, installing defaults if needed
    pub fn load_arm_config(&mut self) -> (ArmConfig, LoadOutcome) {
        self.load_versioned(ArmConfig::default)
    }

    /// Stamp the current version on `config`, write it and commit
    pub fn save_arm_config(&mut self, config: &mut ArmConfig) -> Result<(), StorageError> {
        self.save_versioned(config)
    }

    /// Load the Wi-Fi configuration, installing factory values if needed
    ///
    /// Factory values name the device `<prefix>-<id>`. A loaded record
    /// without a network falls back to access point mode.
    pub fn load_wifi_config(
        &mut self,
        prefix: &str,
        device: &impl DeviceId,
    ) -> (WifiConfig, LoadOutcome) {
        let (mut config, outcome) = self.load_versioned(|| WifiConfig::for_device(prefix, device));
        config.normalize();
        (config, outcome)
    }

    /// Stamp the current version on `config`, write it and commit
    pub fn save_wifi_config(&mut self, config: &mut WifiConfig) -> Result<(), StorageError> {
        self.save_versioned(config)
    }

    fn load_versioned<T: Versioned>(&mut self, defaults: impl FnOnce() -> T) -> (T, LoadOutcome) {
        let reason = match read_record::<_, T>(&mut self.store, T::SLOT) {
            Err(_) => MigrationReason::Unreadable,
            Ok(record) if record.version() != T::VERSION => MigrationReason::VersionMismatch {
                found: record.version(),
            },
            Ok(record) => match record.validate() {
                Ok(()) => return (record, LoadOutcome::Loaded),
                Err(e) => MigrationReason::Invalid(e),
            },
        };

        let mut record = defaults();
        let persisted = self.save_versioned(&mut record);
        (record, LoadOutcome::Migrated { reason, persisted })
    }

    fn save_versioned<T: Versioned>(&mut self, record: &mut T) -> Result<(), StorageError> {
        record.set_version(T::VERSION);
        write_record(&mut self.store, T::SLOT, record)?;
        self.store.commit()?;
        Ok(())
    }
}
