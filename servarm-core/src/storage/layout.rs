//! Persisted layout
//!
//! | Region       | Offset       | Size          | Encoding                 |
//! |--------------|--------------|---------------|--------------------------|
//! | Wifi config  | 0            | 192           | postcard, version first  |
//! | Arm config   | 192          | 128           | postcard, version first  |
//! | Step count   | 320          | 4             | `i32` little endian      |
//! | Step records | 324 + i * 32 | 32 x 50 slots | postcard [`ArmStep`]     |
//!
//! Records are encoded into fixed-size slots so each one has a stable
//! offset; unused slot bytes are left erased.
//!
//! [`ArmStep`]: crate::steps::ArmStep

use serde::de::DeserializeOwned;
use serde::Serialize;
use servarm_hal::store::ERASED_BYTE;
use servarm_hal::ByteStore;

use super::StorageError;
use crate::steps::MAX_STEPS;

/// Largest slot, sizes the scratch buffer
const MAX_SLOT_SIZE: usize = 192;

/// A fixed region of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Slot {
    pub offset: usize,
    pub len: usize,
}

impl Slot {
    /// Create a slot
    pub const fn new(offset: usize, len: usize) -> Self {
        Self { offset, len }
    }

    /// First byte after this slot
    pub const fn end(&self) -> usize {
        self.offset + self.len
    }
}

/// Wi-Fi configuration record
pub const WIFI_SLOT: Slot = Slot::new(0, 192);

/// Arm configuration record
pub const ARM_SLOT: Slot = Slot::new(WIFI_SLOT.end(), 128);

/// Step count (`i32` little endian)
pub const STEP_COUNT_SLOT: Slot = Slot::new(ARM_SLOT.end(), 4);

/// Size of one step record slot
pub const STEP_RECORD_SIZE: usize = 32;

/// Offset of the first step record
pub const STEP_RECORDS_OFFSET: usize = STEP_COUNT_SLOT.end();

/// Bytes the layout needs in total
pub const LAYOUT_SIZE: usize = STEP_RECORDS_OFFSET + MAX_STEPS * STEP_RECORD_SIZE;

/// Slot of step record `index`
pub const fn step_slot(index: usize) -> Slot {
    Slot::new(STEP_RECORDS_OFFSET + index * STEP_RECORD_SIZE, STEP_RECORD_SIZE)
}

/// Decode the record stored in `slot`
pub fn read_record<B: ByteStore, T: DeserializeOwned>(
    store: &mut B,
    slot: Slot,
) -> Result<T, StorageError> {
    let mut buffer = [0u8; MAX_SLOT_SIZE];
    let bytes = &mut buffer[..slot.len];
    store.read(slot.offset, bytes)?;
    postcard::from_bytes(bytes).map_err(|_| StorageError::Deserialize)
}

/// Encode `value` into `slot`, padding the rest of the slot with erased bytes
///
/// Does not commit.
pub fn write_record<B: ByteStore, T: Serialize>(
    store: &mut B,
    slot: Slot,
    value: &T,
) -> Result<(), StorageError> {
    let mut buffer = [ERASED_BYTE; MAX_SLOT_SIZE];
    let bytes = &mut buffer[..slot.len];
    postcard::to_slice(value, bytes).map_err(|_| StorageError::Serialize)?;
    store.write(slot.offset, bytes)?;
    Ok(())
}

/// Read a little-endian `i32`
pub fn read_i32<B: ByteStore>(store: &mut B, slot: Slot) -> Result<i32, StorageError> {
    let mut bytes = [0u8; 4];
    store.read(slot.offset, &mut bytes)?;
    Ok(i32::from_le_bytes(bytes))
}

/// Write a little-endian `i32`
///
/// Does not commit.
pub fn write_i32<B: ByteStore>(store: &mut B, slot: Slot, value: i32) -> Result<(), StorageError> {
    store.write(slot.offset, &value.to_le_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ArmConfig, WifiConfig};
    use crate::motion::ControlPosition;
    use crate::steps::ArmStep;
    use servarm_hal::MemoryStore;

    #[test]
    fn test_regions_do_not_overlap() {
        assert!(WIFI_SLOT.end() <= ARM_SLOT.offset);
        assert!(ARM_SLOT.end() <= STEP_COUNT_SLOT.offset);
        assert!(STEP_COUNT_SLOT.end() <= step_slot(0).offset);
        assert_eq!(step_slot(1).offset, step_slot(0).end());
        assert_eq!(step_slot(MAX_STEPS - 1).end(), LAYOUT_SIZE);
        assert!(LAYOUT_SIZE <= 4096);
    }

    #[test]
    fn test_worst_case_records_fit_their_slots() {
        let mut buf = [0u8; 256];

        let mut arm = ArmConfig {
            version: u32::MAX,
            speed: u32::MAX,
            increment_delay_ms: u32::MAX,
            ..Default::default()
        };
        for joint in crate::motion::Joint::ALL {
            *arm.calibration_mut(joint) =
                crate::config::JointCalibration::new(i32::MIN, i32::MIN, i32::MIN);
        }
        arm.control = crate::config::ControlRange::new(i32::MIN, i32::MIN);
        assert!(postcard::to_slice(&arm, &mut buf).unwrap().len() <= ARM_SLOT.len);

        let mut wifi = WifiConfig::for_device("servarm", &0u64);
        wifi.version = u32::MAX;
        wifi.name.clear();
        wifi.ssid.clear();
        for _ in 0..32 {
            wifi.name.push('n').unwrap();
            wifi.ssid.push('s').unwrap();
        }
        for _ in 0..64 {
            wifi.pass.push('p').unwrap();
        }
        assert!(postcard::to_slice(&wifi, &mut buf).unwrap().len() <= WIFI_SLOT.len);

        let step = ArmStep::new(ControlPosition::splat(i32::MIN), u32::MAX, u32::MAX);
        assert!(postcard::to_slice(&step, &mut buf).unwrap().len() <= STEP_RECORD_SIZE);
    }

    #[test]
    fn test_erased_record_does_not_decode() {
        let mut store = MemoryStore::<4096>::new();
        let result: Result<ArmConfig, _> = read_record(&mut store, ARM_SLOT);
        assert_eq!(result, Err(StorageError::Deserialize));
    }

    #[test]
    fn test_erased_count_reads_negative() {
        let mut store = MemoryStore::<4096>::new();
        assert_eq!(read_i32(&mut store, STEP_COUNT_SLOT), Ok(-1));
    }

    #[test]
    fn test_record_roundtrip_without_commit() {
        let mut store = MemoryStore::<4096>::new();
        let step = ArmStep::new(ControlPosition::new(10, 20, 30, 40), 5, 200);
        write_record(&mut store, step_slot(3), &step).unwrap();

        let back: ArmStep = read_record(&mut store, step_slot(3)).unwrap();
        assert_eq!(back, step);
        assert_eq!(store.commit_count(), 0);
    }

    #[test]
    fn test_write_outside_store_fails() {
        let mut store = MemoryStore::<64>::new();
        assert_eq!(
            write_i32(&mut store, STEP_COUNT_SLOT, 1),
            Err(StorageError::Store(servarm_hal::StoreError::OutOfBounds))
        );
    }
}
