//! Non-volatile byte store abstraction
//!
//! Models an EEPROM-like region: reads and writes go to a working copy
//! addressed by byte offset, and nothing is durable until [`ByteStore::commit`]
//! succeeds. Erased cells read back as `0xFF`.

/// Value of an erased byte
pub const ERASED_BYTE: u8 = 0xFF;

/// Errors from byte store operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// Access beyond the end of the store
    OutOfBounds,
    /// Underlying flash read failed
    Flash,
    /// Writing the working copy back to durable memory failed
    Commit,
}

/// Byte-addressed persistent store
///
/// Implementations should handle:
/// - Keeping a working copy that reads observe immediately
/// - Making the working copy durable only on `commit`
/// - Reporting a failed commit instead of retrying internally
pub trait ByteStore {
    /// Total number of addressable bytes
    fn capacity(&self) -> usize;

    /// Read `buffer.len()` bytes starting at `offset`
    fn read(&mut self, offset: usize, buffer: &mut [u8]) -> Result<(), StoreError>;

    /// Write `data` starting at `offset` into the working copy
    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StoreError>;

    /// Make all pending writes durable
    fn commit(&mut self) -> Result<(), StoreError>;

    /// Check that `len` bytes at `offset` lie inside the store
    fn check_range(&self, offset: usize, len: usize) -> Result<(), StoreError> {
        match offset.checked_add(len) {
            Some(end) if end <= self.capacity() => Ok(()),
            _ => Err(StoreError::OutOfBounds),
        }
    }
}

impl<T: ByteStore + ?Sized> ByteStore for &mut T {
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn read(&mut self, offset: usize, buffer: &mut [u8]) -> Result<(), StoreError> {
        (**self).read(offset, buffer)
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StoreError> {
        (**self).write(offset, data)
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        (**self).commit()
    }
}
