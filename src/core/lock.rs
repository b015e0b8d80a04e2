//! Serialising layout passes against batches of edits.

/// A reentrant guard around layout application.
///
/// While the lock is held any request to apply layouts is recorded rather
/// than run. Releasing the outermost hold reports whether a deferred pass is
/// now due, so that exactly one pass runs no matter how many were requested.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MonitorsLock {
    depth: usize,
    pending: bool,
}

impl MonitorsLock {
    /// Take a hold on the lock.
    pub fn lock(&mut self) {
        self.depth += 1;
    }

    /// Release a hold on the lock, returning true if a deferred layout pass
    /// should now be run.
    ///
    /// # Panics
    /// Panics if the lock is not held.
    pub fn unlock(&mut self) -> bool {
        assert!(self.depth > 0, "unlocking the monitors lock without holding it");
        self.depth -= 1;

        if self.depth == 0 && self.pending {
            self.pending = false;
            return true;
        }

        false
    }

    /// Whether the lock is currently held.
    pub fn is_locked(&self) -> bool {
        self.depth > 0
    }

    /// Record that a layout pass was requested while locked.
    pub fn defer(&mut self) {
        self.pending = true;
    }
}
