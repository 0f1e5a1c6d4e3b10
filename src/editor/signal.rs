//! Version-gated wake-ups for pollers.

use std::sync::{Condvar, Mutex, PoisonError};
use std::time::Duration;

/// Lets callers block until a published version passes a baseline.
///
/// The signal keeps its own copy of the latest version so that waiting never
/// needs the document lock.
#[derive(Debug, Default)]
pub struct ChangeSignal {
    version: Mutex<u64>,
    changed: Condvar,
}

impl ChangeSignal {
    pub fn new(version: u64) -> Self {
        Self {
            version: Mutex::new(version),
            changed: Condvar::new(),
        }
    }

    /// The most recently published version.
    pub fn current(&self) -> u64 {
        *self.version.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `version` and wake every waiter.
    ///
    /// Versions never move backwards; an older value is ignored.
    pub fn publish(&self, version: u64) {
        let mut current = self.version.lock().unwrap_or_else(PoisonError::into_inner);
        if version > *current {
            *current = version;
        }
        drop(current);
        self.changed.notify_all();
    }

    /// Block until the version exceeds `baseline` or `timeout` elapses.
    ///
    /// Returns the version seen on wake-up, which equals `baseline` after a
    /// quiet timeout. Spurious wake-ups are absorbed.
    pub fn wait_for_change(&self, baseline: u64, timeout: Duration) -> u64 {
        let guard = self.version.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _timeout) = self
            .changed
            .wait_timeout_while(guard, timeout, |version| *version <= baseline)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}
