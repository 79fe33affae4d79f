//! Step sequence persistence
//!
//! Stored as a count followed by one fixed-size record per step. A count of
//! zero or less (an erased store reads as -1) means nothing is stored.

use servarm_hal::ByteStore;

use super::layout::{read_i32, read_record, step_slot, write_i32, write_record, STEP_COUNT_SLOT};
use super::{Persistence, StorageError};
use crate::steps::{ArmStep, StepSequence, MAX_STEPS};

impl<B: ByteStore> Persistence<B> {
    /// Read the stored step sequence
    ///
    /// Returns an empty sequence when nothing is stored.
    pub fn load_steps(&mut self) -> Result<StepSequence, StorageError> {
        let count = read_i32(&mut self.store, STEP_COUNT_SLOT)?;
        let mut steps = StepSequence::new();
        if count <= 0 {
            return Ok(steps);
        }

        let count = count as usize;
        if count > MAX_STEPS {
            return Err(StorageError::Corrupted);
        }

        for index in 0..count {
            let step: ArmStep = read_record(&mut self.store, step_slot(index))?;
            steps.push(step).map_err(|_| StorageError::Corrupted)?;
        }
        Ok(steps)
    }

    /// Write every step and the count, then commit
    pub fn save_steps(&mut self, steps: &StepSequence) -> Result<(), StorageError> {
        for (index, step) in steps.iter().enumerate() {
            write_record(&mut self.store, step_slot(index), step)?;
        }
        write_i32(&mut self.store, STEP_COUNT_SLOT, steps.len() as i32)?;
        self.store.commit()?;
        Ok(())
    }

    /// Mark the stored sequence empty and commit
    ///
    /// Step records are left in place; only the count is reset.
    pub fn clear_steps(&mut self) -> Result<(), StorageError> {
        write_i32(&mut self.store, STEP_COUNT_SLOT, 0)?;
        self.store.commit()?;
        Ok(())
    }
}
