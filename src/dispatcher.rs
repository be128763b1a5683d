//! Role-gated dispatcher
//!
//! One dispatch reads an identity snapshot, resolves the driver flag,
//! writes it to the role store and navigates to the screen chosen by that
//! flag. The three steps run back to back without yielding, so the store
//! write and the navigation target always come from the same snapshot.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info_span, trace};

use crate::identity::Identity;
use crate::navigator::Navigator;
use crate::store::RoleStore;

/// Screen for users already verified as drivers
pub const POST_RIDE_SCREEN: &str = "post-ride-screen";

/// Screen that starts driver verification
pub const VERIFY_DRIVER_SCREEN: &str = "verify-driver-screen";

// ─────────────────────────────────────────────────────────────────
// Dispatch Result
// ─────────────────────────────────────────────────────────────────

/// Outcome of a single dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum DispatchResult {
    /// Identity not loaded yet; nothing was written or navigated
    Pending,
    /// Store written and navigation performed
    NavigatedTo(String),
    /// Store written but the navigator rejected the target
    Failed(String),
}

impl DispatchResult {
    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        matches!(self, DispatchResult::Pending)
    }

    #[cfg(test)]
    pub fn is_failed(&self) -> bool {
        matches!(self, DispatchResult::Failed(_))
    }

    /// Target navigated to, if any
    pub fn target(&self) -> Option<&str> {
        match self {
            DispatchResult::NavigatedTo(target) => Some(target),
            _ => None,
        }
    }
}

impl fmt::Display for DispatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchResult::Pending => write!(f, "pending"),
            DispatchResult::NavigatedTo(target) => write!(f, "navigated to {}", target),
            DispatchResult::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Targets
// ─────────────────────────────────────────────────────────────────

/// Navigation targets chosen by the resolved role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchTargets {
    pub driver: String,
    pub verify_driver: String,
}

impl DispatchTargets {
    /// Target for a resolved driver flag
    pub fn select(&self, is_driver: bool) -> &str {
        if is_driver {
            &self.driver
        } else {
            &self.verify_driver
        }
    }
}

impl Default for DispatchTargets {
    fn default() -> Self {
        Self {
            driver: POST_RIDE_SCREEN.to_string(),
            verify_driver: VERIFY_DRIVER_SCREEN.to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Dispatcher
// ─────────────────────────────────────────────────────────────────

/// Resolves the acting user's role and routes them accordingly
pub struct RoleGatedDispatcher<S, N> {
    store: S,
    navigator: N,
    targets: DispatchTargets,
}

impl<S: RoleStore, N: Navigator> RoleGatedDispatcher<S, N> {
    /// Create a dispatcher with the default targets
    #[cfg(test)]
    pub fn new(store: S, navigator: N) -> Self {
        Self::with_targets(store, navigator, DispatchTargets::default())
    }

    pub fn with_targets(store: S, navigator: N, targets: DispatchTargets) -> Self {
        Self {
            store,
            navigator,
            targets,
        }
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    /// Run one resolve, write, navigate cycle.
    ///
    /// Never fails: a rejected navigation becomes `Failed` and leaves the
    /// store holding the flag resolved by this call.
    pub fn dispatch(&self, identity: &Identity) -> DispatchResult {
        let span = info_span!("dispatch", loaded = identity.loaded);
        let _enter = span.enter();

        if !identity.loaded {
            debug!("Identity not loaded, nothing to dispatch");
            return DispatchResult::Pending;
        }

        let is_driver = identity.is_driver();
        trace!(is_driver, role = ?identity.role, "Role resolved");

        self.store.set_driver(is_driver);
        trace!(is_driver, "Role state written");

        let target = self.targets.select(is_driver);
        match self.navigator.navigate_to(target) {
            Ok(()) => {
                debug!(is_driver, route = %target, "Dispatch complete");
                DispatchResult::NavigatedTo(target.to_string())
            }
            Err(e) => {
                debug!(is_driver, route = %target, error = %e, "Navigation rejected");
                DispatchResult::Failed(e.to_string())
            }
        }
    }
}
