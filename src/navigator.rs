//! Navigation targets and the in-process router
//!
//! Target identifiers are opaque strings agreed upon with the routing
//! layer. The dispatcher only sees the [`Navigator`] trait; the CLI drives
//! a [`RouterNavigator`] that validates targets against a route table and
//! keeps a bounded history.

use std::collections::{HashSet, VecDeque};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, trace};

/// Reasons a navigator can reject a transition
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// Target identifier was empty
    #[error("navigation target is empty")]
    EmptyTarget,

    /// Target is not registered with the router
    #[error("unknown route '{target}'")]
    UnknownRoute { target: String },
}

/// Performs screen transitions
pub trait Navigator: Send + Sync {
    /// Navigate to the given target
    fn navigate_to(&self, target: &str) -> Result<(), NavigationError>;
}

impl<N: Navigator + ?Sized> Navigator for std::sync::Arc<N> {
    fn navigate_to(&self, target: &str) -> Result<(), NavigationError> {
        (**self).navigate_to(target)
    }
}

// ─────────────────────────────────────────────────────────────────
// Router Navigator
// ─────────────────────────────────────────────────────────────────

/// Route-table backed navigator
pub struct RouterNavigator {
    /// Accepted targets; empty accepts any non-empty target
    known_routes: HashSet<String>,
    history_limit: usize,
    history: Mutex<VecDeque<String>>,
}

impl RouterNavigator {
    /// Create a router accepting the given routes
    pub fn new<I, S>(known_routes: I, history_limit: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            known_routes: known_routes.into_iter().map(Into::into).collect(),
            history_limit: history_limit.max(1),
            history: Mutex::new(VecDeque::new()),
        }
    }

    /// Router that accepts any non-empty target
    pub fn permissive(history_limit: usize) -> Self {
        Self::new(Vec::<String>::new(), history_limit)
    }

    /// Whether the router would accept this target
    pub fn accepts(&self, target: &str) -> bool {
        !target.is_empty()
            && (self.known_routes.is_empty() || self.known_routes.contains(target))
    }

    /// Visited targets, oldest first
    pub fn history(&self) -> Vec<String> {
        self.history.lock().iter().cloned().collect()
    }

    /// Most recent target
    pub fn current(&self) -> Option<String> {
        self.history.lock().back().cloned()
    }
}

impl Navigator for RouterNavigator {
    fn navigate_to(&self, target: &str) -> Result<(), NavigationError> {
        if target.is_empty() {
            return Err(NavigationError::EmptyTarget);
        }
        if !self.accepts(target) {
            return Err(NavigationError::UnknownRoute {
                target: target.to_string(),
            });
        }

        let mut history = self.history.lock();
        if history.len() == self.history_limit {
            if let Some(dropped) = history.pop_front() {
                trace!(route = %dropped, "History full, dropping oldest entry");
            }
        }
        history.push_back(target.to_string());
        debug!(route = %target, depth = history.len(), "Navigated");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_route_is_recorded() {
        let router = RouterNavigator::new(["post-ride-screen", "verify-driver-screen"], 8);
        router.navigate_to("post-ride-screen").unwrap();
        assert_eq!(router.current().as_deref(), Some("post-ride-screen"));
        assert_eq!(router.history(), vec!["post-ride-screen"]);
    }

    #[test]
    fn test_unknown_route_rejected() {
        let router = RouterNavigator::new(["post-ride-screen"], 8);
        let err = router.navigate_to("settings").unwrap_err();
        assert_eq!(
            err,
            NavigationError::UnknownRoute {
                target: "settings".into()
            }
        );
        assert!(router.history().is_empty());
    }

    #[test]
    fn test_empty_target_rejected() {
        let router = RouterNavigator::permissive(8);
        assert_eq!(router.navigate_to(""), Err(NavigationError::EmptyTarget));
        assert!(router.current().is_none());
    }

    #[test]
    fn test_permissive_accepts_any_target() {
        let router = RouterNavigator::permissive(8);
        assert!(router.accepts("anything"));
        router.navigate_to("anything").unwrap();
        assert_eq!(router.current().as_deref(), Some("anything"));
    }

    #[test]
    fn test_history_is_bounded() {
        let router = RouterNavigator::permissive(2);
        for target in ["a", "b", "c"] {
            router.navigate_to(target).unwrap();
        }
        assert_eq!(router.history(), vec!["b", "c"]);
    }

    #[test]
    fn test_zero_history_limit_keeps_latest() {
        let router = RouterNavigator::permissive(0);
        router.navigate_to("a").unwrap();
        router.navigate_to("b").unwrap();
        assert_eq!(router.history(), vec!["b"]);
    }
}
