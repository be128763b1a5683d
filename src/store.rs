//! Role state store
//!
//! Process-wide holder of the last resolved driver flag. The dispatcher is
//! its only writer; any part of the application may read it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

/// Write side of the role store, as seen by the dispatcher
pub trait RoleStore: Send + Sync {
    /// Replace the driver flag
    fn set_driver(&self, is_driver: bool);
}

/// Shared driver flag
///
/// Cloning yields another handle to the same state, so a fresh store per
/// test case is just `RoleState::new()`.
#[derive(Debug, Clone, Default)]
pub struct RoleState {
    inner: Arc<RoleStateInner>,
}

#[derive(Debug, Default)]
struct RoleStateInner {
    is_driver: RwLock<bool>,
    writes: AtomicU64,
}

impl RoleState {
    /// Create a store with the flag cleared
    pub fn new() -> Self {
        Self::default()
    }

    /// Current driver flag
    pub fn is_driver(&self) -> bool {
        *self.inner.is_driver.read()
    }

    /// Number of writes since creation
    pub fn writes(&self) -> u64 {
        self.inner.writes.load(Ordering::Acquire)
    }
}

impl RoleStore for RoleState {
    fn set_driver(&self, is_driver: bool) {
        let mut flag = self.inner.is_driver.write();
        *flag = is_driver;
        self.inner.writes.fetch_add(1, Ordering::Release);
    }
}

impl<S: RoleStore + ?Sized> RoleStore for Arc<S> {
    fn set_driver(&self, is_driver: bool) {
        (**self).set_driver(is_driver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_not_driver() {
        let state = RoleState::new();
        assert!(!state.is_driver());
        assert_eq!(state.writes(), 0);
    }

    #[test]
    fn test_set_driver_replaces_flag() {
        let state = RoleState::new();
        state.set_driver(true);
        assert!(state.is_driver());
        state.set_driver(false);
        assert!(!state.is_driver());
        assert_eq!(state.writes(), 2);
    }

    #[test]
    fn test_clones_share_state() {
        let writer = RoleState::new();
        let reader = writer.clone();
        writer.set_driver(true);
        assert!(reader.is_driver());
        assert_eq!(reader.writes(), 1);
    }

    #[test]
    fn test_readers_on_other_threads() {
        let state = RoleState::new();
        state.set_driver(true);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let reader = state.clone();
                std::thread::spawn(move || reader.is_driver())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
