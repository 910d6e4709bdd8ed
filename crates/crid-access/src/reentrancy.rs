//! # Single-Slot Reentrancy Lock
//!
//! A delegated collaborator could, in an adversarial or buggy
//! implementation, call back into the orchestrator before the outer call
//! finishes. [`CallLock`] converts that into a deterministic
//! `ReentrantCall` failure instead of allowing interleaved mutation.
//!
//! The lock is scoped acquisition with guaranteed release: `enter()` returns
//! an RAII [`CallGuard`] that clears the slot when dropped, on every exit
//! path — success, early return, or panic unwind.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::guards::GuardError;

/// One boolean slot per protected call boundary.
#[derive(Debug, Default)]
pub struct CallLock {
    entered: AtomicBool,
}

impl CallLock {
    /// Create an unheld lock.
    pub fn new() -> Self {
        Self {
            entered: AtomicBool::new(false),
        }
    }

    /// Acquire the slot, failing `ReentrantCall` if it is already held.
    pub fn enter(&self) -> Result<CallGuard<'_>, GuardError> {
        if self
            .entered
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return Err(GuardError::ReentrantCall);
        }
        Ok(CallGuard { lock: self })
    }

    /// Whether the slot is currently held.
    pub fn is_held(&self) -> bool {
        self.entered.load(Ordering::Acquire)
    }
}

/// RAII guard holding the call slot; releases on drop.
#[derive(Debug)]
pub struct CallGuard<'a> {
    lock: &'a CallLock,
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        self.lock.entered.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_and_release() {
        let lock = CallLock::new();
        assert!(!lock.is_held());
        {
            let _guard = lock.enter().unwrap();
            assert!(lock.is_held());
        }
        assert!(!lock.is_held());
    }

    #[test]
    fn test_nested_enter_fails() {
        let lock = CallLock::new();
        let _guard = lock.enter().unwrap();
        assert_eq!(lock.enter().unwrap_err(), GuardError::ReentrantCall);
    }

    #[test]
    fn test_sequential_calls_after_completion() {
        let lock = CallLock::new();
        drop(lock.enter().unwrap());
        drop(lock.enter().unwrap());
        assert!(!lock.is_held());
    }

    #[test]
    fn test_released_on_early_error_path() {
        let lock = CallLock::new();
        let attempt = (|| -> Result<(), GuardError> {
            let _guard = lock.enter()?;
            Err(GuardError::InvalidAddress)
        })();
        assert!(attempt.is_err());
        assert!(!lock.is_held());
    }
}
