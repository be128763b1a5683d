//! Dispatch control: the triggering button and its busy flag
//!
//! The control owns an in-flight flag that is set before a dispatch and
//! cleared when the guard drops, on every exit path. While the flag is set,
//! or while the identity is still loading, the control reports itself as
//! disabled.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::dispatcher::{DispatchResult, RoleGatedDispatcher};
use crate::identity::Identity;
use crate::navigator::Navigator;
use crate::store::RoleStore;

// ─────────────────────────────────────────────────────────────────
// In-Flight Flag
// ─────────────────────────────────────────────────────────────────

/// Shared busy flag
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    flag: Arc<AtomicBool>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a dispatch is currently running
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    /// Set the flag, returning a guard that clears it on drop.
    /// Returns `None` if the flag was already set.
    pub fn try_acquire(&self) -> Option<InFlightGuard> {
        self.flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard {
                flag: Arc::clone(&self.flag),
            })
    }
}

/// Clears the in-flight flag when dropped
#[derive(Debug)]
pub struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

// ─────────────────────────────────────────────────────────────────
// Dispatch Control
// ─────────────────────────────────────────────────────────────────

/// How the control is currently shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    /// Ready to be pressed
    Enabled,
    /// Waiting for the identity provider
    Loading,
    /// A dispatch is in flight
    Busy,
}

/// The control that triggers role-gated dispatches
pub struct DispatchControl<S, N> {
    dispatcher: RoleGatedDispatcher<S, N>,
    in_flight: InFlight,
}

impl<S: RoleStore, N: Navigator> DispatchControl<S, N> {
    pub fn new(dispatcher: RoleGatedDispatcher<S, N>) -> Self {
        Self {
            dispatcher,
            in_flight: InFlight::new(),
        }
    }

    pub fn dispatcher(&self) -> &RoleGatedDispatcher<S, N> {
        &self.dispatcher
    }

    #[cfg(test)]
    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    /// Current presentation state for the given identity
    pub fn state(&self, identity: &Identity) -> ControlState {
        if self.in_flight.is_set() {
            ControlState::Busy
        } else if !identity.loaded {
            ControlState::Loading
        } else {
            ControlState::Enabled
        }
    }

    /// Whether the control accepts a press right now
    pub fn is_enabled(&self, identity: &Identity) -> bool {
        self.state(identity) == ControlState::Enabled
    }

    /// Handle a press.
    ///
    /// A press while another dispatch is in flight is ignored and reported
    /// as `Pending`. Failures are logged here and the flag is released
    /// before returning.
    pub fn press(&self, identity: &Identity) -> DispatchResult {
        let Some(_guard) = self.in_flight.try_acquire() else {
            debug!("Control busy, ignoring press");
            return DispatchResult::Pending;
        };

        let result = self.dispatcher.dispatch(identity);
        if let DispatchResult::Failed(reason) = &result {
            warn!(reason = %reason, "Role-gated dispatch failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::dispatcher::testing::RecordingNavigator;
    use crate::dispatcher::{POST_RIDE_SCREEN, VERIFY_DRIVER_SCREEN};
    use crate::identity::Role;
    use crate::navigator::{NavigationError, RouterNavigator};
    use crate::store::RoleState;

    fn control(state: &RoleState) -> DispatchControl<RoleState, RouterNavigator> {
        DispatchControl::new(RoleGatedDispatcher::new(
            state.clone(),
            RouterNavigator::new([POST_RIDE_SCREEN, VERIFY_DRIVER_SCREEN], 8),
        ))
    }

    #[test]
    fn test_guard_clears_flag() {
        let in_flight = InFlight::new();
        {
            let _guard = in_flight.try_acquire().unwrap();
            assert!(in_flight.is_set());
            assert!(in_flight.try_acquire().is_none());
        }
        assert!(!in_flight.is_set());
    }

    #[test]
    fn test_guard_clears_on_panic() {
        let in_flight = InFlight::new();
        let shared = in_flight.clone();
        let result = std::panic::catch_unwind(move || {
            let _guard = shared.try_acquire().unwrap();
            panic!("navigator blew up");
        });
        assert!(result.is_err());
        assert!(!in_flight.is_set());
    }

    #[test]
    fn test_state_reflects_loading_and_busy() {
        let state = RoleState::new();
        let control = control(&state);

        assert_eq!(control.state(&Identity::not_loaded()), ControlState::Loading);
        assert!(!control.is_enabled(&Identity::not_loaded()));
        assert_eq!(control.state(&Identity::loaded(None)), ControlState::Enabled);

        let _guard = control.in_flight().try_acquire().unwrap();
        assert_eq!(control.state(&Identity::loaded(None)), ControlState::Busy);
        assert!(!control.is_enabled(&Identity::loaded(None)));
    }

    #[test]
    fn test_press_clears_flag_after_success() {
        let state = RoleState::new();
        let control = control(&state);

        let result = control.press(&Identity::loaded(Some(Role::Driver)));

        assert_eq!(result.target(), Some(POST_RIDE_SCREEN));
        assert!(state.is_driver());
        assert!(!control.in_flight().is_set());
    }

    #[test]
    fn test_press_clears_flag_after_failure() {
        let state = RoleState::new();
        let navigator = Arc::new(RecordingNavigator::failing(NavigationError::UnknownRoute {
            target: VERIFY_DRIVER_SCREEN.into(),
        }));
        let control = DispatchControl::new(RoleGatedDispatcher::new(
            state.clone(),
            navigator.clone(),
        ));

        let result = control.press(&Identity::loaded(Some(Role::Rider)));

        assert!(result.is_failed());
        assert!(!state.is_driver());
        assert_eq!(state.writes(), 1);
        assert!(!control.in_flight().is_set());
        assert_eq!(*navigator.calls.lock(), vec![VERIFY_DRIVER_SCREEN]);
    }

    #[test]
    fn test_press_while_busy_is_ignored() {
        let state = RoleState::new();
        let control = control(&state);

        let guard = control.in_flight().try_acquire().unwrap();
        let result = control.press(&Identity::loaded(Some(Role::Driver)));
        assert!(result.is_pending());
        assert_eq!(state.writes(), 0);
        assert!(control.dispatcher().navigator().history().is_empty());

        drop(guard);
        assert!(control.press(&Identity::loaded(Some(Role::Driver))).target().is_some());
    }

    #[test]
    fn test_press_not_loaded_is_pending() {
        let state = RoleState::new();
        let control = control(&state);

        assert!(control.press(&Identity::not_loaded()).is_pending());
        assert_eq!(state.writes(), 0);
        assert!(!control.in_flight().is_set());
    }
}
