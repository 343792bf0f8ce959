use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One-shot reload flag for a page session.
///
/// Clones share the flag, so every watcher created during the session sees
/// the same state. A new session starts with a new guard.
#[derive(Debug, Clone, Default)]
pub struct ReloadGuard {
    fired: Arc<AtomicBool>,
}

impl ReloadGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true exactly once per session
    pub fn try_arm(&self) -> bool {
        self.fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arms_once() {
        let guard = ReloadGuard::new();
        let clone = guard.clone();
        assert!(!guard.has_fired());
        assert!(clone.try_arm());
        assert!(!guard.try_arm());
        assert!(guard.has_fired());

        // Fresh session, fresh guard
        assert!(ReloadGuard::new().try_arm());
    }
}
