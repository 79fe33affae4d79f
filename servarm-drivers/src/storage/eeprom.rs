//! EEPROM emulation on NOR flash
//!
//! Keeps a RAM image of one flash region. Reads and writes touch only the
//! image; `commit` erases the region and programs the image back when
//! anything changed. This is the same model as the Arduino `EEPROM`
//! library on flash-only MCUs, so a byte layout written for one carries
//! over unchanged.
//!
//! The region must start and end on erase-sector boundaries and `N` must
//! be a multiple of the flash write size.

use embedded_storage::nor_flash::NorFlash;
use servarm_hal::{ByteStore, StoreError};

/// Byte store backed by a NOR flash region of `N` bytes
pub struct NorEeprom<F, const N: usize> {
    flash: F,
    offset: u32,
    image: [u8; N],
    dirty: bool,
}

impl<F: NorFlash, const N: usize> NorEeprom<F, N> {
    /// Load the region at `offset` into RAM
    pub fn new(mut flash: F, offset: u32) -> Result<Self, StoreError> {
        let aligned = offset as usize % F::ERASE_SIZE == 0
            && N % F::ERASE_SIZE == 0
            && N % F::WRITE_SIZE == 0;
        let fits = (offset as usize)
            .checked_add(N)
            .is_some_and(|end| end <= flash.capacity());
        if !aligned || !fits {
            return Err(StoreError::OutOfBounds);
        }

        let mut image = [0u8; N];
        flash
            .read(offset, &mut image)
            .map_err(|_| StoreError::Flash)?;

        Ok(Self {
            flash,
            offset,
            image,
            dirty: false,
        })
    }

    /// Check if the image holds uncommitted changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Release the flash
    pub fn free(self) -> F {
        self.flash
    }
}

impl<F: NorFlash, const N: usize> ByteStore for NorEeprom<F, N> {
    fn capacity(&self) -> usize {
        N
    }

    fn read(&mut self, offset: usize, buffer: &mut [u8]) -> Result<(), StoreError> {
        self.check_range(offset, buffer.len())?;
        buffer.copy_from_slice(&self.image[offset..offset + buffer.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StoreError> {
        self.check_range(offset, data.len())?;
        let target = &mut self.image[offset..offset + data.len()];
        if target != data {
            target.copy_from_slice(data);
            self.dirty = true;
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }

        let end = self.offset + N as u32;
        self.flash
            .erase(self.offset, end)
            .map_err(|_| StoreError::Commit)?;
        self.flash
            .write(self.offset, &self.image)
            .map_err(|_| StoreError::Commit)?;

        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_storage::nor_flash::{ErrorType, NorFlashErrorKind, ReadNorFlash};

    const SECTOR: usize = 256;

    /// Two-sector NOR flash: erase sets bits, program can only clear them
    struct MockFlash {
        mem: [u8; 2 * SECTOR],
        erases: u32,
        fail_erase: bool,
    }

    impl MockFlash {
        fn new() -> Self {
            Self {
                mem: [0xFF; 2 * SECTOR],
                erases: 0,
                fail_erase: false,
            }
        }
    }

    impl ErrorType for MockFlash {
        type Error = NorFlashErrorKind;
    }

    impl ReadNorFlash for MockFlash {
        const READ_SIZE: usize = 1;

        fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
            let start = offset as usize;
            let end = start + bytes.len();
            if end > self.mem.len() {
                return Err(NorFlashErrorKind::OutOfBounds);
            }
            bytes.copy_from_slice(&self.mem[start..end]);
            Ok(())
        }

        fn capacity(&self) -> usize {
            self.mem.len()
        }
    }

    impl NorFlash for MockFlash {
        const WRITE_SIZE: usize = 4;
        const ERASE_SIZE: usize = SECTOR;

        fn erase(&mut self, from: u32, to: u32) -> Result<(), Self::Error> {
            if self.fail_erase {
                return Err(NorFlashErrorKind::Other);
            }
            if from as usize % SECTOR != 0 || to as usize % SECTOR != 0 {
                return Err(NorFlashErrorKind::NotAligned);
            }
            self.mem[from as usize..to as usize].fill(0xFF);
            self.erases += 1;
            Ok(())
        }

        fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
            let start = offset as usize;
            for (cell, byte) in self.mem[start..start + bytes.len()].iter_mut().zip(bytes) {
                *cell &= *byte;
            }
            Ok(())
        }
    }

    type Eeprom = NorEeprom<MockFlash, SECTOR>;

    #[test]
    fn test_fresh_flash_reads_erased() {
        let mut eeprom = Eeprom::new(MockFlash::new(), SECTOR as u32).unwrap();
        let mut buf = [0u8; 8];
        eeprom.read(0, &mut buf).unwrap();
        assert_eq!(buf, [0xFF; 8]);
        assert!(!eeprom.is_dirty());
    }

    #[test]
    fn test_writes_are_not_durable_until_commit() {
        let mut eeprom = Eeprom::new(MockFlash::new(), SECTOR as u32).unwrap();
        eeprom.write(10, &[1, 2, 3]).unwrap();

        let mut buf = [0u8; 3];
        eeprom.read(10, &mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);

        let flash = eeprom.free();
        assert_eq!(&flash.mem[SECTOR + 10..SECTOR + 13], &[0xFF; 3]);
    }

    #[test]
    fn test_commit_survives_reload() {
        let mut eeprom = Eeprom::new(MockFlash::new(), SECTOR as u32).unwrap();
        eeprom.write(0, &[0x12, 0x34]).unwrap();
        eeprom.commit().unwrap();
        eeprom.write(0, &[0xFF, 0x00]).unwrap();
        eeprom.commit().unwrap();

        let mut eeprom = Eeprom::new(eeprom.free(), SECTOR as u32).unwrap();
        let mut buf = [0u8; 2];
        eeprom.read(0, &mut buf).unwrap();
        assert_eq!(buf, [0xFF, 0x00]);
    }

    #[test]
    fn test_commit_leaves_other_sectors_alone() {
        let mut flash = MockFlash::new();
        flash.mem[0] = 0x5A;
        let mut eeprom = Eeprom::new(flash, SECTOR as u32).unwrap();
        eeprom.write(0, &[0]).unwrap();
        eeprom.commit().unwrap();

        assert_eq!(eeprom.free().mem[0], 0x5A);
    }

    #[test]
    fn test_unchanged_image_skips_erase() {
        let mut eeprom = Eeprom::new(MockFlash::new(), 0).unwrap();
        eeprom.write(0, &[0xFF; 4]).unwrap();
        assert!(!eeprom.is_dirty());
        eeprom.commit().unwrap();

        assert_eq!(eeprom.free().erases, 0);
    }

    #[test]
    fn test_flash_failure_is_a_commit_error() {
        let mut flash = MockFlash::new();
        flash.fail_erase = true;
        let mut eeprom = Eeprom::new(flash, 0).unwrap();
        eeprom.write(0, &[1]).unwrap();

        assert_eq!(eeprom.commit(), Err(StoreError::Commit));
        assert!(eeprom.is_dirty());
    }

    #[test]
    fn test_out_of_range_access() {
        let mut eeprom = Eeprom::new(MockFlash::new(), 0).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(
            eeprom.read(SECTOR - 2, &mut buf),
            Err(StoreError::OutOfBounds)
        );
        assert_eq!(eeprom.write(SECTOR, &[0]), Err(StoreError::OutOfBounds));
    }

    #[test]
    fn test_region_must_be_sector_aligned_and_inside_flash() {
        assert!(matches!(
            Eeprom::new(MockFlash::new(), 1),
            Err(StoreError::OutOfBounds)
        ));
        assert!(matches!(
            Eeprom::new(MockFlash::new(), 2 * SECTOR as u32),
            Err(StoreError::OutOfBounds)
        ));
    }
}
