//! Single-shot wait request flag.
//!
//! The crossing button and the controller share exactly one bit. The
//! button side sets it, the controller's tick reads and resets it in one
//! atomic swap. Presses that arrive before the controller looks are merged
//! into one; nothing is queued.
//!
//! # Example
//!
//! ```rust
//! use rs_crossing::WaitRequest;
//!
//! let flag = WaitRequest::new();
//! let button = flag.clone();
//!
//! button.request();
//! button.request();
//! assert!(flag.take());
//! assert!(!flag.take()); // consumed once
//! ```

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

/// Cloneable handle to a shared single-shot flag.
///
/// All clones observe the same flag. Safe to set from any thread.
#[derive(Clone, Debug, Default)]
pub struct WaitRequest {
    pending: Arc<AtomicBool>,
}

impl WaitRequest {
    /// Create a new, unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag. Idempotent while it is still pending.
    pub fn request(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Read and reset the flag.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    /// Drop any pending request.
    pub fn clear(&self) {
        self.pending.store(false, Ordering::Release);
    }

    /// Returns true if a request is waiting to be consumed.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_clear() {
        let flag = WaitRequest::new();
        assert!(!flag.is_pending());
        assert!(!flag.take());
    }

    #[test]
    fn take_resets() {
        let flag = WaitRequest::new();
        flag.request();
        assert!(flag.is_pending());
        assert!(flag.take());
        assert!(!flag.is_pending());
    }

    #[test]
    fn clones_share_state() {
        let flag = WaitRequest::new();
        let other = flag.clone();
        other.request();
        assert!(flag.is_pending());
        flag.clear();
        assert!(!other.is_pending());
    }

    #[test]
    fn set_from_another_thread() {
        let flag = WaitRequest::new();
        let button = flag.clone();
        std::thread::spawn(move || button.request())
            .join()
            .unwrap();
        assert!(flag.take());
    }
}
