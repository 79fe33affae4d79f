//! Flash EEPROM partition for RP2040
//!
//! The last erase sector of the 2MB flash is used as emulated EEPROM. The
//! linker script keeps program code out of it.

use embassy_rp::flash::{Blocking, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use servarm_drivers::storage::NorEeprom;
use servarm_hal::{DeviceId, StoreError};

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;
pub const EEPROM_SIZE: usize = ERASE_SIZE;
pub const EEPROM_OFFSET: u32 = (FLASH_SIZE - EEPROM_SIZE) as u32;

/// Blocking driver for the on-board flash
pub type RpFlash<'d> = Flash<'d, FLASH, Blocking, FLASH_SIZE>;

/// EEPROM partition in the last flash sector
pub type Eeprom<'d> = NorEeprom<RpFlash<'d>, EEPROM_SIZE>;

/// 64-bit unique ID of the flash chip
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlashId(pub u64);

impl DeviceId for FlashId {
    fn unique_id(&self) -> u64 {
        self.0
    }
}

/// Read the flash unique ID and open the EEPROM partition
pub fn init<'d>(flash: Peri<'d, FLASH>) -> Result<(Eeprom<'d>, FlashId), StoreError> {
    let mut flash = RpFlash::new_blocking(flash);

    let mut uid = [0u8; 8];
    flash
        .blocking_unique_id(&mut uid)
        .map_err(|_| StoreError::Flash)?;

    let eeprom = NorEeprom::new(flash, EEPROM_OFFSET)?;
    Ok((eeprom, FlashId(u64::from_be_bytes(uid))))
}
