//! Motion cancellation
//!
//! Moves and playback block until they finish. A cancellation source is
//! polled between interpolation increments so a stop request (button,
//! flag set from an interrupt) can cut a move short.

use core::sync::atomic::{AtomicBool, Ordering};

/// Source of stop requests
pub trait Cancel {
    /// Check if the running motion should stop
    fn is_cancelled(&mut self) -> bool;
}

/// Cancellation source that never fires
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

impl Cancel for NeverCancel {
    fn is_cancelled(&mut self) -> bool {
        false
    }
}

impl Cancel for AtomicBool {
    fn is_cancelled(&mut self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl Cancel for &AtomicBool {
    fn is_cancelled(&mut self) -> bool {
        self.load(Ordering::Relaxed)
    }
}

impl<T: Cancel + ?Sized> Cancel for &mut T {
    fn is_cancelled(&mut self) -> bool {
        (**self).is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_cancel() {
        let mut cancel = NeverCancel;
        assert!(!cancel.is_cancelled());
    }

    #[test]
    fn test_atomic_flag() {
        let flag = AtomicBool::new(false);
        let mut source = &flag;
        assert!(!source.is_cancelled());

        flag.store(true, Ordering::Relaxed);
        assert!(source.is_cancelled());
    }
}
