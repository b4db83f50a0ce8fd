//! Router integration with GPUI's context.
//!
//! - [`GlobalRouter`]: the router stored as a GPUI `Global`. It owns the
//!   history, the [`RouteTable`], and the guard set, and runs every
//!   navigation through the guards before committing it.
//! - [`Navigator`]: static helpers (`Navigator::push`, `Navigator::back`, …)
//!   that read and update the `GlobalRouter` through `cx`.
//!
//! Committing a navigation updates the global, which notifies every
//! `cx.observe_global::<GlobalRouter>` subscriber once effects flush. That is
//! what [`RouteQuerySync`](crate::RouteQuerySync) watches.
//!
//! # Initialization
//!
//! ```ignore
//! use gpui_route_state::{init_router, QueryFlushGuard, RouteTable};
//!
//! init_router(cx, |router| {
//!     router.set_routes(
//!         RouteTable::new()
//!             .route("events", "/events")
//!             .route("organizations", "/organizations"),
//!     );
//!     router.add_guard(QueryFlushGuard::new());
//! });
//! ```

#[cfg(feature = "cache")]
use crate::cache::{CacheStats, ResolveCache};
use crate::action::NavigationAction;
use crate::config::RouteStateConfig;
use crate::error::NavigationResult;
use crate::guards::{Guards, QueryFlushGuard, RouteGuard, SectionFlushGuard};
use crate::location::{NavigationRequest, RouteLocation};
use crate::routes::{RouteDef, RouteTable};
use crate::state::RouterState;
use crate::{debug_log, error_log, info_log, warn_log};
use gpui::{App, BorrowAppContext, Global};
use std::collections::BTreeMap;

/// Maximum number of guard redirects followed for one navigation.
const MAX_REDIRECT_DEPTH: usize = 5;

// ============================================================================
// GlobalRouter
// ============================================================================

/// Router state accessible from any component.
pub struct GlobalRouter {
    state: RouterState,
    table: RouteTable,
    guards: Guards,
    #[cfg(feature = "cache")]
    cache: ResolveCache,
}

impl GlobalRouter {
    /// Router at `/` with no routes and no guards.
    pub fn new() -> Self {
        Self {
            state: RouterState::default(),
            table: RouteTable::new(),
            guards: Guards::new(),
            #[cfg(feature = "cache")]
            cache: ResolveCache::new(),
        }
    }

    /// Replace the route table and re-resolve the current location.
    pub fn set_routes(&mut self, table: RouteTable) {
        info_log!("Registered {} routes", table.routes().len());
        self.table = table;
        self.after_table_change();
    }

    /// Register one more route.
    pub fn add_route(&mut self, route: RouteDef) {
        info_log!("Registered route '{}' ({})", route.name, route.pattern);
        self.table.add(route);
        self.after_table_change();
    }

    /// Install a guard; guards run in priority order on every navigation.
    pub fn add_guard(&mut self, guard: impl RouteGuard) {
        debug_log!("Installed guard '{}'", guard.name());
        self.guards.add(guard);
    }

    /// Install the flush guards described by `config`.
    pub fn install_flush_guards(&mut self, config: &RouteStateConfig) {
        self.add_guard(QueryFlushGuard::from_config(config));
        if config.section_guard {
            self.add_guard(SectionFlushGuard::from_config(config));
        }
    }

    /// Set the location the app starts at, without running guards.
    ///
    /// This is the initial navigation: there is no source page whose query
    /// could leak.
    pub fn start_at(&mut self, full_path: &str) {
        let location = self.resolve_location(RouteLocation::new(full_path));
        self.state = RouterState::new(location);
    }

    fn after_table_change(&mut self) {
        #[cfg(feature = "cache")]
        self.cache.clear();
        let current = self.state.current().clone();
        let resolved = self.resolve_location(current);
        if resolved.name != self.state.current().name {
            debug_log!("Current location now resolves to {:?}", resolved.name);
            self.state.replace(resolved);
        }
    }

    /// Parse `full_path` and attach its route name and params.
    pub fn location(&mut self, full_path: &str) -> RouteLocation {
        self.resolve_location(RouteLocation::new(full_path))
    }

    fn resolve_location(&mut self, mut location: RouteLocation) -> RouteLocation {
        #[cfg(feature = "cache")]
        let resolved = self.cache.resolve(&self.table, &location.path);
        #[cfg(not(feature = "cache"))]
        let resolved = self.table.resolve(&location.path);

        match resolved {
            Some(route) => {
                location.name = Some(route.name);
                location.params = route.params;
            }
            None => {
                location.name = None;
                location.params = BTreeMap::new();
            }
        }
        location
    }

    // ========================================================================
    // Navigation pipeline
    // ========================================================================

    /// Navigate to `full_path` (may include query and hash).
    pub fn push(&mut self, full_path: &str, cx: &App) -> NavigationResult {
        let to = self.location(full_path);
        self.navigate(to, cx, NavigateOp::Push)
    }

    /// Replace the current entry with `full_path`.
    pub fn replace(&mut self, full_path: &str, cx: &App) -> NavigationResult {
        let to = self.location(full_path);
        self.navigate(to, cx, NavigateOp::Replace)
    }

    /// Navigate to a resolved location.
    pub fn push_location(&mut self, to: RouteLocation, cx: &App) -> NavigationResult {
        self.navigate(to, cx, NavigateOp::Push)
    }

    /// Navigate to a named route.
    ///
    /// Returns `None` if the name is unknown or params are missing.
    pub fn push_named(
        &mut self,
        name: &str,
        params: &BTreeMap<String, String>,
        locale: Option<&str>,
        cx: &App,
    ) -> Option<NavigationResult> {
        let Some(path) = self.table.path_for(name, params, locale) else {
            warn_log!("Named route '{}' could not be built", name);
            return None;
        };
        Some(self.push(&path, cx))
    }

    /// Go back in history. The target entry still passes through the guards.
    pub fn back(&mut self, cx: &App) -> Option<NavigationResult> {
        let target = self.state.peek_back()?.clone();
        Some(self.navigate(target, cx, NavigateOp::Back))
    }

    /// Go forward in history.
    pub fn forward(&mut self, cx: &App) -> Option<NavigationResult> {
        let target = self.state.peek_forward()?.clone();
        Some(self.navigate(target, cx, NavigateOp::Forward))
    }

    fn navigate(&mut self, to: RouteLocation, cx: &App, op: NavigateOp) -> NavigationResult {
        let requested = to.full_path();
        let from = self.state.current().clone();
        info_log!("Navigation {:?}: '{}' → '{}'", op, from, requested);

        let mut target = to;
        let mut depth = 0;
        loop {
            let request = NavigationRequest::new(from.clone(), target);
            match self.guards.check(cx, &request) {
                NavigationAction::Continue => {
                    target = request.to;
                    break;
                }
                NavigationAction::Redirect { to, reason } => {
                    depth += 1;
                    if depth > MAX_REDIRECT_DEPTH {
                        error_log!(
                            "Redirect loop detected (depth {}) navigating to '{}'",
                            depth,
                            requested
                        );
                        return NavigationResult::Blocked {
                            reason: format!(
                                "Redirect loop detected (depth {depth}): target '{requested}'"
                            ),
                        };
                    }
                    debug_log!(
                        "Guard redirected '{}' → '{}' ({:?})",
                        request.to,
                        to,
                        reason
                    );
                    target = if to.name.is_some() {
                        to
                    } else {
                        self.resolve_location(to)
                    };
                }
            }
        }

        let committed = target.full_path();
        let event = match op {
            NavigateOp::Push => Some(self.state.push(target)),
            NavigateOp::Replace => Some(self.state.replace(target)),
            NavigateOp::Back => self.state.back(target),
            NavigateOp::Forward => self.state.forward(target),
        };
        let Some(event) = event else {
            return NavigationResult::Blocked {
                reason: format!("No history entry for {op:?}"),
            };
        };

        info_log!(
            "Navigation complete: '{}' (navigation {})",
            event.to,
            event.navigation_id
        );
        if committed == requested {
            NavigationResult::Success { path: committed }
        } else {
            NavigationResult::Redirected {
                requested,
                path: committed,
            }
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn current(&self) -> &RouteLocation {
        self.state.current()
    }

    pub fn current_name(&self) -> Option<&str> {
        self.state.current().name.as_deref()
    }

    /// Counter bumped on every committed navigation.
    pub fn navigation_id(&self) -> u64 {
        self.state.navigation_id()
    }

    pub fn can_go_back(&self) -> bool {
        self.state.can_go_back()
    }

    pub fn can_go_forward(&self) -> bool {
        self.state.can_go_forward()
    }

    pub fn state(&self) -> &RouterState {
        &self.state
    }

    pub fn routes(&self) -> &RouteTable {
        &self.table
    }

    pub fn guards(&self) -> &Guards {
        &self.guards
    }

    #[cfg(feature = "cache")]
    pub fn cache_stats(&self) -> &CacheStats {
        self.cache.stats()
    }
}

impl Default for GlobalRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl Global for GlobalRouter {}

#[derive(Debug, Clone, Copy)]
enum NavigateOp {
    Push,
    Replace,
    Back,
    Forward,
}

// ============================================================================
// UseRouter trait
// ============================================================================

/// Access the global router from an `App`.
pub trait UseRouter {
    fn router(&self) -> &GlobalRouter;

    fn update_router<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut GlobalRouter, &mut App) -> R;
}

impl UseRouter for App {
    fn router(&self) -> &GlobalRouter {
        self.global::<GlobalRouter>()
    }

    fn update_router<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut GlobalRouter, &mut App) -> R,
    {
        self.update_global(f)
    }
}

// ============================================================================
// init_router
// ============================================================================

/// Create the global router and let `configure` register routes and guards.
pub fn init_router<F>(cx: &mut App, configure: F)
where
    F: FnOnce(&mut GlobalRouter),
{
    let mut router = GlobalRouter::new();
    configure(&mut router);
    cx.set_global(router);
}

/// Create the global router with `table` and the flush guards from `config`.
pub fn init_router_with_config(cx: &mut App, table: RouteTable, config: &RouteStateConfig) {
    init_router(cx, |router| {
        router.set_routes(table);
        router.install_flush_guards(config);
    });
}

/// Navigate and refresh all windows.
pub fn navigate(cx: &mut App, full_path: impl Into<String>) {
    let full_path = full_path.into();
    cx.update_router(|router, cx| {
        router.push(&full_path, cx);
    });
    cx.refresh_windows();
}

// ============================================================================
// Navigator
// ============================================================================

/// Static navigation helpers over the global router.
pub struct Navigator;

impl Navigator {
    pub fn push(cx: &mut App, full_path: &str) -> NavigationResult {
        cx.update_router(|router, cx| router.push(full_path, cx))
    }

    pub fn replace(cx: &mut App, full_path: &str) -> NavigationResult {
        cx.update_router(|router, cx| router.replace(full_path, cx))
    }

    pub fn push_named(
        cx: &mut App,
        name: &str,
        params: &BTreeMap<String, String>,
        locale: Option<&str>,
    ) -> Option<NavigationResult> {
        cx.update_router(|router, cx| router.push_named(name, params, locale, cx))
    }

    pub fn back(cx: &mut App) -> Option<NavigationResult> {
        cx.update_router(|router, cx| router.back(cx))
    }

    pub fn forward(cx: &mut App) -> Option<NavigationResult> {
        cx.update_router(|router, cx| router.forward(cx))
    }

    pub fn current_location(cx: &App) -> RouteLocation {
        cx.router().current().clone()
    }

    pub fn current_path(cx: &App) -> String {
        cx.router().current().full_path()
    }

    pub fn current_name(cx: &App) -> Option<String> {
        cx.router().current_name().map(ToString::to_string)
    }

    pub fn can_go_back(cx: &App) -> bool {
        cx.router().can_go_back()
    }
}

// ============================================================================
// Tests
// ============================================================================
