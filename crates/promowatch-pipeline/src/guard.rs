//! Serializes reconciliation runs.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Shared by every trigger (API, scheduler, CLI). At most one [`RunPermit`]
/// exists at a time; a second caller is turned away rather than queued.
#[derive(Clone, Default)]
pub struct RunGuard {
    lock: Arc<Mutex<()>>,
}

/// Held for the duration of one run; released on drop.
pub struct RunPermit {
    _guard: OwnedMutexGuard<()>,
}

impl RunGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a permit if no run is in progress.
    #[must_use]
    pub fn try_acquire(&self) -> Option<RunPermit> {
        Arc::clone(&self.lock)
            .try_lock_owned()
            .ok()
            .map(|guard| RunPermit { _guard: guard })
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lock.try_lock().is_err()
    }
}
