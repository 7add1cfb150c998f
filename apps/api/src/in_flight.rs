//! Single-flight flags for user-triggered operations.
//!
//! Each control surface (CV upload, analysis submit, chat send) owns one
//! `InFlight`. A second trigger while a guard is alive is rejected rather than
//! queued. Dropping the guard clears the flag on every exit path, including a
//! cancelled request future.

use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct InFlight(AtomicBool);

impl InFlight {
    /// Claims the flag, or returns `None` if an operation is already running.
    pub fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| InFlightGuard(&self.0))
    }

    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_claim_rejected_until_guard_dropped() {
        let flag = InFlight::default();
        let guard = flag.try_begin();
        assert!(guard.is_some());
        assert!(flag.is_active());
        assert!(flag.try_begin().is_none());

        drop(guard);
        assert!(!flag.is_active());
        assert!(flag.try_begin().is_some());
    }
}
