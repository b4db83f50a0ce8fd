//! What a guard tells the router to do.
//!
//! Guards in this crate never block a navigation: the worst outcome of a
//! malformed location is that it passes through untouched. The router
//! therefore only ever sees [`NavigationAction::Continue`] or a rewrite.

use crate::location::RouteLocation;

/// Result of a guard check.
///
/// # Example
///
/// ```
/// use gpui_route_state::{NavigationAction, RouteLocation};
///
/// let action = NavigationAction::redirect(RouteLocation::new("/organizations"));
/// assert!(action.is_redirect());
/// assert_eq!(action.redirect_target().map(|l| l.path.as_str()), Some("/organizations"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationAction {
    /// Let the navigation through as requested.
    Continue,

    /// Commit a different location instead, replacing the history entry.
    Redirect {
        to: RouteLocation,
        reason: Option<String>,
    },
}

impl NavigationAction {
    /// Alias for [`Continue`](Self::Continue).
    pub fn allow() -> Self {
        Self::Continue
    }

    /// Redirect without a reason.
    pub fn redirect(to: RouteLocation) -> Self {
        Self::Redirect { to, reason: None }
    }

    /// Redirect with a human-readable reason, used in logs.
    pub fn redirect_with_reason(to: RouteLocation, reason: impl Into<String>) -> Self {
        Self::Redirect {
            to,
            reason: Some(reason.into()),
        }
    }

    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue)
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }

    /// The rewritten location, if this is a redirect.
    pub fn redirect_target(&self) -> Option<&RouteLocation> {
        match self {
            Self::Redirect { to, .. } => Some(to),
            Self::Continue => None,
        }
    }
}
