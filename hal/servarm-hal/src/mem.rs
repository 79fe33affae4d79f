//! RAM-backed byte store
//!
//! Behaves like a freshly erased EEPROM: every byte starts as `0xFF` and
//! `commit` copies the working image to the durable image. Used on hosts
//! and in tests; a commit failure can be injected to exercise error paths.

use crate::store::{ByteStore, StoreError, ERASED_BYTE};

/// In-memory byte store of `N` bytes
#[derive(Debug, Clone)]
pub struct MemoryStore<const N: usize> {
    working: [u8; N],
    durable: [u8; N],
    fail_commit: bool,
    commits: u32,
}

impl<const N: usize> Default for MemoryStore<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MemoryStore<N> {
    /// Create an erased store
    pub const fn new() -> Self {
        Self {
            working: [ERASED_BYTE; N],
            durable: [ERASED_BYTE; N],
            fail_commit: false,
            commits: 0,
        }
    }

    /// Make every following commit fail (or succeed again)
    pub fn set_fail_commit(&mut self, fail: bool) {
        self.fail_commit = fail;
    }

    /// Number of successful commits so far
    pub fn commit_count(&self) -> u32 {
        self.commits
    }

    /// Durable contents, as they would survive a power cycle
    pub fn durable(&self) -> &[u8] {
        &self.durable
    }

    /// Simulate a power cycle: uncommitted writes are lost
    pub fn power_cycle(&mut self) {
        self.working = self.durable;
    }
}

impl<const N: usize> ByteStore for MemoryStore<N> {
    fn capacity(&self) -> usize {
        N
    }

    fn read(&mut self, offset: usize, buffer: &mut [u8]) -> Result<(), StoreError> {
        self.check_range(offset, buffer.len())?;
        buffer.copy_from_slice(&self.working[offset..offset + buffer.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), StoreError> {
        self.check_range(offset, data.len())?;
        self.working[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if self.fail_commit {
            return Err(StoreError::Commit);
        }
        self.durable = self.working;
        self.commits += 1;
        Ok(())
    }
}
