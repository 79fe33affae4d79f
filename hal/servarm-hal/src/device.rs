//! Device identity
//!
//! A hardware-unique identifier used to derive default names, such as the
//! network hostname of a freshly erased board.

/// Source of a hardware-unique identifier
pub trait DeviceId {
    /// Return the 64-bit unique identifier of this device
    fn unique_id(&self) -> u64;

    /// Low 32 bits of the identifier, the part used in short names
    fn short_id(&self) -> u32 {
        self.unique_id() as u32
    }
}

impl DeviceId for u64 {
    fn unique_id(&self) -> u64 {
        *self
    }
}
