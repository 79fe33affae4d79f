//! Network identity configuration
//!
//! Persisted alongside the arm configuration so a provisioning layer can
//! bring the board up as an access point or join a known network.

use core::fmt::Write;

use heapless::String;
use serde::{Deserialize, Serialize};
use servarm_hal::DeviceId;

use super::ConfigError;

/// Current Wi-Fi configuration layout version
pub const WIFI_CONFIG_VERSION: u32 = 1;

/// Maximum device name length
pub const MAX_NAME_LEN: usize = 32;
/// Maximum network SSID length
pub const MAX_SSID_LEN: usize = 32;
/// Maximum passphrase length
pub const MAX_PASS_LEN: usize = 64;

/// Prefix for names derived from the device identifier
pub const DEFAULT_NAME_PREFIX: &str = "servarm";

/// Network role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum WifiMode {
    /// Host an access point named after the device
    #[default]
    AccessPoint = 0,
    /// Join the configured network
    Station = 1,
}

/// Wi-Fi configuration record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WifiConfig {
    /// Layout version (stamped on save)
    pub version: u32,
    pub mode: WifiMode,
    /// Device / access point name
    pub name: String<MAX_NAME_LEN>,
    pub ssid: String<MAX_SSID_LEN>,
    pub pass: String<MAX_PASS_LEN>,
}

impl WifiConfig {
    /// Factory configuration: access point named `<prefix>-<8 hex digits>`
    ///
    /// A prefix too long to fit is cut at the name capacity.
    pub fn for_device(prefix: &str, device: &impl DeviceId) -> Self {
        Self {
            version: WIFI_CONFIG_VERSION,
            mode: WifiMode::AccessPoint,
            name: default_name(prefix, device.short_id()),
            ssid: String::new(),
            pass: String::new(),
        }
    }

    /// Check that the record can be used as-is
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.is_empty() {
            return Err(ConfigError::EmptyName);
        }
        Ok(())
    }

    /// Fall back to access point mode when no network is configured
    pub fn normalize(&mut self) {
        if self.ssid.is_empty() {
            self.mode = WifiMode::AccessPoint;
        }
    }

    /// Mode the provisioning layer should actually use
    pub fn effective_mode(&self) -> WifiMode {
        if self.ssid.is_empty() {
            WifiMode::AccessPoint
        } else {
            self.mode
        }
    }
}

fn default_name(prefix: &str, short_id: u32) -> String<MAX_NAME_LEN> {
    // "-" plus 8 hex digits
    const SUFFIX_LEN: usize = 9;

    let mut name = String::new();
    for c in prefix.chars() {
        if name.len() + c.len_utf8() + SUFFIX_LEN > MAX_NAME_LEN || name.push(c).is_err() {
            break;
        }
    }
    let _ = write!(name, "-{:08x}", short_id);
    name
}
