//! Persistence of configuration and recorded steps
//!
//! Everything lives in one byte store at fixed, versioned offsets (see
//! [`layout`]). Nothing is written back automatically: the store is only
//! touched by explicit load and save calls, and every save ends in a commit
//! whose failure is returned to the caller.

pub mod config;
pub mod layout;
pub mod steps;

pub use config::{LoadOutcome, MigrationReason};

use servarm_hal::{ByteStore, StoreError};

/// Persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Byte store operation failed
    Store(StoreError),
    /// Record does not fit its slot
    Serialize,
    /// Record could not be decoded
    Deserialize,
    /// Stored step count is larger than the step capacity
    Corrupted,
}

impl From<StoreError> for StorageError {
    fn from(e: StoreError) -> Self {
        StorageError::Store(e)
    }
}

/// Persistence manager
///
/// Owns the byte store and knows where each record lives in it.
pub struct Persistence<B> {
    store: B,
}

impl<B: ByteStore> Persistence<B> {
    /// Create a persistence manager over a byte store
    pub fn new(store: B) -> Self {
        Self { store }
    }

    /// Consume this manager and return the underlying store
    pub fn into_store(self) -> B {
        self.store
    }

    /// Underlying store
    pub fn store(&self) -> &B {
        &self.store
    }
}
