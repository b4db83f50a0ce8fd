//! Navigation guards that keep query state from leaking between pages.
//!
//! Guards run **before** a navigation commits and may rewrite its target.
//! They are synchronous; GPUI is single-threaded and nothing here waits.
//!
//! # Built-in guards
//!
//! | Guard | Signal | Priority |
//! |-------|--------|----------|
//! | [`QueryFlushGuard`] | route name changes | 100 |
//! | [`SectionFlushGuard`] | top-level path section changes | 50 |
//!
//! [`QueryFlushGuard`] is the canonical authority: on every cross-route
//! navigation it replaces the destination query with just the preserved
//! search key, taken from the *source* location. [`SectionFlushGuard`] is
//! the narrower path-based variant, kept for hosts whose routes are unnamed.
//!
//! Both guards are idempotent. A location they produce is one they let
//! through unchanged, so a redirect can never bounce between them.
//!
//! # Example
//!
//! ```
//! use gpui_route_state::{NavigationRequest, QueryFlushGuard, RouteLocation};
//!
//! let guard = QueryFlushGuard::new();
//! let request = NavigationRequest::new(
//!     RouteLocation::new("/events?name=berlin&topics=X").with_name("events"),
//!     RouteLocation::new("/organizations").with_name("organizations"),
//! );
//! let target = guard.flush(&request).expect("cross-route navigation");
//! assert_eq!(target.to_query_string(), "name=berlin");
//! ```

use crate::action::NavigationAction;
use crate::config::{RouteStateConfig, DEFAULT_PRESERVED_QUERY_KEY};
use crate::location::NavigationRequest;
use crate::matching::base_section;
use crate::params::QueryParams;
use crate::{debug_log, trace_log};
use gpui::App;

// ============================================================================
// RouteGuard trait
// ============================================================================

/// A check run before every navigation.
///
/// ```no_run
/// use gpui_route_state::{NavigationAction, NavigationRequest, RouteGuard};
///
/// struct NoHashGuard;
///
/// impl RouteGuard for NoHashGuard {
///     fn check(&self, _cx: &gpui::App, request: &NavigationRequest) -> NavigationAction {
///         if request.to.hash.is_some() {
///             let mut to = request.to.clone();
///             to.hash = None;
///             NavigationAction::redirect(to)
///         } else {
///             NavigationAction::Continue
///         }
///     }
/// }
/// ```
pub trait RouteGuard: Send + Sync + 'static {
    /// Decide whether the navigation proceeds as requested or is rewritten.
    fn check(&self, cx: &App, request: &NavigationRequest) -> NavigationAction;

    /// Guard name for logs.
    fn name(&self) -> &'static str {
        "RouteGuard"
    }

    /// Higher runs first. Default is 0.
    fn priority(&self) -> i32 {
        0
    }
}

// ============================================================================
// guard_fn helper
// ============================================================================

/// Create a guard from a closure.
///
/// ```no_run
/// use gpui_route_state::{guard_fn, NavigationAction};
///
/// let passthrough = guard_fn(|_cx, _request| NavigationAction::Continue);
/// ```
pub const fn guard_fn<F>(f: F) -> FnGuard<F>
where
    F: Fn(&App, &NavigationRequest) -> NavigationAction + Send + Sync + 'static,
{
    FnGuard { f }
}

/// Guard created by [`guard_fn`].
pub struct FnGuard<F> {
    f: F,
}

impl<F> RouteGuard for FnGuard<F>
where
    F: Fn(&App, &NavigationRequest) -> NavigationAction + Send + Sync + 'static,
{
    fn check(&self, cx: &App, request: &NavigationRequest) -> NavigationAction {
        (self.f)(cx, request)
    }
}

// ============================================================================
// QueryFlushGuard
// ============================================================================

/// Drops every query parameter on cross-route navigations except the
/// preserved search key.
///
/// 1. Missing name on either side, or the same name on both: continue.
///    Query-only changes within a page belong to that page's filters.
/// 2. Otherwise the destination query becomes `{ key: from.query[key] }`
///    when the source holds a single value for `key`, and `{}` otherwise.
///    Whatever `to.query` carried is discarded, including its own `key`.
/// 3. If that already equals `to.query` the navigation continues, else it
///    is redirected to the same location with the rebuilt query.
#[derive(Debug, Clone)]
pub struct QueryFlushGuard {
    preserved_key: String,
}

impl QueryFlushGuard {
    /// Guard preserving the default search key (`name`).
    pub fn new() -> Self {
        Self::with_preserved_key(DEFAULT_PRESERVED_QUERY_KEY)
    }

    pub fn with_preserved_key(key: impl Into<String>) -> Self {
        Self {
            preserved_key: key.into(),
        }
    }

    pub fn from_config(config: &RouteStateConfig) -> Self {
        Self::with_preserved_key(config.preserved_query_key.clone())
    }

    pub fn preserved_key(&self) -> &str {
        &self.preserved_key
    }

    /// The query the destination should carry, or `None` when this
    /// navigation is not the guard's business.
    pub fn flush(&self, request: &NavigationRequest) -> Option<QueryParams> {
        let (from, to) = (&request.from, &request.to);
        if !from.has_name() || !to.has_name() || from.name == to.name {
            return None;
        }

        let mut query = QueryParams::new();
        if let Some(term) = from.query.get_single(&self.preserved_key) {
            query.set(self.preserved_key.clone(), term);
        }
        Some(query)
    }
}

impl Default for QueryFlushGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteGuard for QueryFlushGuard {
    fn check(&self, _cx: &App, request: &NavigationRequest) -> NavigationAction {
        match self.flush(request) {
            Some(query) if query != request.to.query => {
                debug_log!(
                    "Flushing query '{}' -> '{}' for '{}' → '{}'",
                    request.to.query,
                    query,
                    request.from.name_or_empty(),
                    request.to.name_or_empty()
                );
                NavigationAction::redirect_with_reason(
                    request.to.clone().with_query(query),
                    "query flushed on route change",
                )
            }
            _ => NavigationAction::Continue,
        }
    }

    fn name(&self) -> &'static str {
        "QueryFlushGuard"
    }

    fn priority(&self) -> i32 {
        100
    }
}

// ============================================================================
// SectionFlushGuard
// ============================================================================

/// Clears inherited query parameters when moving between top-level sections.
///
/// Sections are read from the first path segment after an optional locale
/// segment (`/de/events` is `events`). The guard only acts when:
///
/// - both sections are in the allow-list and differ,
/// - the destination carries parameters other than the preserved key,
/// - and every one of those has the identical value in the source query,
///   meaning they were carried over rather than set on purpose.
///
/// The preserved search key survives the rewrite so this guard never undoes
/// what [`QueryFlushGuard`] produced.
#[derive(Debug, Clone)]
pub struct SectionFlushGuard {
    config: RouteStateConfig,
}

impl SectionFlushGuard {
    /// Guard over the default sections (`events`, `organizations`, `groups`,
    /// `home`, and the root).
    pub fn new() -> Self {
        Self::from_config(&RouteStateConfig::default())
    }

    pub fn from_config(config: &RouteStateConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// The query the destination should carry, or `None` to leave it alone.
    pub fn flush(&self, request: &NavigationRequest) -> Option<QueryParams> {
        let (from, to) = (&request.from, &request.to);
        let preserved_key = self.config.preserved_query_key.as_str();
        let filters: Vec<&str> = to
            .query
            .keys()
            .filter(|key| *key != preserved_key)
            .collect();
        if filters.is_empty() {
            return None;
        }

        let (from_section, to_section) = (base_section(&from.path), base_section(&to.path));
        if from_section == to_section
            || !self.config.is_top_level_section(from_section)
            || !self.config.is_top_level_section(to_section)
        {
            return None;
        }

        let inherited = filters
            .iter()
            .all(|key| from.query.get(key).is_some() && from.query.get(key) == to.query.get(key));
        if !inherited {
            return None;
        }

        let mut query = QueryParams::new();
        if let Some(value) = to.query.get(preserved_key) {
            query.set(preserved_key, value.clone());
        }
        Some(query)
    }
}

impl Default for SectionFlushGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteGuard for SectionFlushGuard {
    fn check(&self, _cx: &App, request: &NavigationRequest) -> NavigationAction {
        match self.flush(request) {
            Some(query) => {
                debug_log!(
                    "Dropping inherited query '{}' on section change '{}' → '{}'",
                    request.to.query,
                    request.from.path,
                    request.to.path
                );
                NavigationAction::redirect_with_reason(
                    request.to.clone().with_query(query),
                    "inherited query dropped on section change",
                )
            }
            None => NavigationAction::Continue,
        }
    }

    fn name(&self) -> &'static str {
        "SectionFlushGuard"
    }

    fn priority(&self) -> i32 {
        50
    }
}

// ============================================================================
// Guards (ordered set)
// ============================================================================

/// Guards evaluated in priority order; the first rewrite wins.
///
/// ```
/// use gpui_route_state::{Guards, QueryFlushGuard, SectionFlushGuard};
///
/// let guards = Guards::builder()
///     .guard(SectionFlushGuard::new())
///     .guard(QueryFlushGuard::new())
///     .build();
/// assert_eq!(guards.names(), vec!["QueryFlushGuard", "SectionFlushGuard"]);
/// ```
#[derive(Default)]
pub struct Guards {
    guards: Vec<Box<dyn RouteGuard>>,
}

impl Guards {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> GuardsBuilder {
        GuardsBuilder { guards: Vec::new() }
    }

    /// Insert a guard, keeping the set sorted by descending priority.
    ///
    /// Guards of equal priority keep their insertion order.
    pub fn add(&mut self, guard: impl RouteGuard) {
        let priority = guard.priority();
        let index = self
            .guards
            .iter()
            .position(|g| g.priority() < priority)
            .unwrap_or(self.guards.len());
        self.guards.insert(index, Box::new(guard));
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }

    /// Guard names in evaluation order.
    pub fn names(&self) -> Vec<&'static str> {
        self.guards.iter().map(|g| g.name()).collect()
    }

    /// Run guards until one rewrites the navigation.
    pub fn check(&self, cx: &App, request: &NavigationRequest) -> NavigationAction {
        for guard in &self.guards {
            let result = guard.check(cx, request);
            trace_log!(
                "Guard '{}' (priority {}) → {:?}",
                guard.name(),
                guard.priority(),
                result
            );
            if !result.is_continue() {
                return result;
            }
        }
        NavigationAction::Continue
    }
}

impl std::fmt::Debug for Guards {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guards")
            .field("guards", &self.names())
            .finish()
    }
}

/// Builder for [`Guards`].
pub struct GuardsBuilder {
    guards: Vec<Box<dyn RouteGuard>>,
}

impl GuardsBuilder {
    #[must_use]
    pub fn guard(mut self, guard: impl RouteGuard) -> Self {
        self.guards.push(Box::new(guard));
        self
    }

    pub fn build(self) -> Guards {
        let mut guards = self.guards;
        guards.sort_by_key(|g| std::cmp::Reverse(g.priority()));
        Guards { guards }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::RouteLocation;
    use gpui::TestAppContext;

    fn named(full_path: &str, name: &str) -> RouteLocation {
        RouteLocation::new(full_path).with_name(name)
    }

    fn request(from: RouteLocation, to: RouteLocation) -> NavigationRequest {
        NavigationRequest::new(from, to)
    }

    // --- QueryFlushGuard ---

    #[test]
    fn test_copied_through_filters_are_dropped() {
        let guard = QueryFlushGuard::new();
        let req = request(
            named("/events?topics=ENVIRONMENT", "events"),
            named("/organizations?topics=ENVIRONMENT", "organizations"),
        );
        assert_eq!(guard.flush(&req), Some(QueryParams::new()));
    }

    #[test]
    fn test_preserved_key_comes_from_source() {
        let guard = QueryFlushGuard::new();
        let req = request(
            named("/events?name=berlin&topics=X", "events"),
            named("/organizations", "organizations"),
        );
        let query = guard.flush(&req).unwrap();
        assert_eq!(query, QueryParams::new().with("name", "berlin"));
    }

    #[test]
    fn test_destination_preserved_key_is_discarded() {
        let guard = QueryFlushGuard::new();
        let req = request(
            named("/events", "events"),
            named("/groups?name=paris", "groups"),
        );
        assert_eq!(guard.flush(&req), Some(QueryParams::new()));
    }

    #[test]
    fn test_multi_value_search_term_is_not_carried() {
        let guard = QueryFlushGuard::new();
        let req = request(
            named("/events?name=a&name=b", "events"),
            named("/groups", "groups"),
        );
        assert_eq!(guard.flush(&req), Some(QueryParams::new()));
    }

    #[test]
    fn test_same_route_and_unnamed_routes_are_ignored() {
        let guard = QueryFlushGuard::new();
        let same = request(
            named("/events?topics=A", "events"),
            named("/events?days=7", "events"),
        );
        assert_eq!(guard.flush(&same), None);

        let unnamed = request(
            RouteLocation::new("/x?topics=A"),
            named("/events?topics=A", "events"),
        );
        assert_eq!(guard.flush(&unnamed), None);

        let locale_switch = request(
            named("/events?topics=A", "events___en"),
            named("/de/events?topics=A", "events___de"),
        );
        assert!(guard.flush(&locale_switch).is_some());
    }

    #[gpui::test]
    fn test_flush_guard_redirects_then_allows(cx: &mut TestAppContext) {
        let guard = QueryFlushGuard::new();
        let req = request(
            named("/events?name=berlin&topics=X", "events"),
            named("/organizations?topics=X", "organizations"),
        );
        let first = cx.update(|cx| guard.check(cx, &req));
        let target = first.redirect_target().cloned().unwrap();
        assert_eq!(target.full_path(), "/organizations?name=berlin");
        assert_eq!(target.name.as_deref(), Some("organizations"));

        let again = request(req.from.clone(), target);
        let second = cx.update(|cx| guard.check(cx, &again));
        assert!(second.is_continue());
    }

    #[gpui::test]
    fn test_same_route_query_change_passes(cx: &mut TestAppContext) {
        let guard = QueryFlushGuard::new();
        let req = request(
            named("/events?topics=A&days=3", "events"),
            named("/events?location=berlin", "events"),
        );
        assert!(cx.update(|cx| guard.check(cx, &req)).is_continue());
    }

    // --- SectionFlushGuard ---

    #[test]
    fn test_section_guard_drops_inherited_query() {
        let guard = SectionFlushGuard::new();
        let req = request(
            RouteLocation::new("/en/events?topics=A"),
            RouteLocation::new("/en/organizations?topics=A"),
        );
        assert_eq!(guard.flush(&req), Some(QueryParams::new()));
    }

    #[test]
    fn test_section_guard_keeps_explicit_query() {
        let guard = SectionFlushGuard::new();
        let req = request(
            RouteLocation::new("/events?topics=A"),
            RouteLocation::new("/organizations?topics=B"),
        );
        assert_eq!(guard.flush(&req), None);

        let partially = request(
            RouteLocation::new("/events?topics=A"),
            RouteLocation::new("/organizations?topics=A&days=2"),
        );
        assert_eq!(guard.flush(&partially), None);
    }

    #[test]
    fn test_section_guard_scope() {
        let guard = SectionFlushGuard::new();
        let within = request(
            RouteLocation::new("/events?topics=A"),
            RouteLocation::new("/events/42?topics=A"),
        );
        assert_eq!(guard.flush(&within), None);

        let outside = request(
            RouteLocation::new("/events?topics=A"),
            RouteLocation::new("/resources?topics=A"),
        );
        assert_eq!(guard.flush(&outside), None);

        let from_root = request(
            RouteLocation::new("/?topics=A"),
            RouteLocation::new("/groups?topics=A"),
        );
        assert_eq!(guard.flush(&from_root), Some(QueryParams::new()));
    }

    #[test]
    fn test_section_guard_respects_preserved_key() {
        let guard = SectionFlushGuard::new();
        let only_search = request(
            RouteLocation::new("/events?name=berlin"),
            RouteLocation::new("/groups?name=berlin"),
        );
        assert_eq!(guard.flush(&only_search), None);

        let mixed = request(
            RouteLocation::new("/events?name=berlin&topics=A"),
            RouteLocation::new("/groups?name=berlin&topics=A"),
        );
        assert_eq!(
            guard.flush(&mixed),
            Some(QueryParams::new().with("name", "berlin"))
        );
    }

    #[test]
    fn test_section_guard_follows_config() {
        let config = RouteStateConfig::new()
            .top_level_sections(["resources", "groups"])
            .preserved_query_key("q");
        let guard = SectionFlushGuard::from_config(&config);

        let configured = request(
            RouteLocation::new("/resources?q=x&topics=A"),
            RouteLocation::new("/groups?q=x&topics=A"),
        );
        assert_eq!(
            guard.flush(&configured),
            Some(QueryParams::new().with("q", "x"))
        );

        let default_only = request(
            RouteLocation::new("/events?topics=A"),
            RouteLocation::new("/groups?topics=A"),
        );
        assert_eq!(guard.flush(&default_only), None);
    }

    #[gpui::test]
    fn test_section_guard_is_idempotent(cx: &mut TestAppContext) {
        let guard = SectionFlushGuard::new();
        let req = request(
            RouteLocation::new("/events?topics=A"),
            RouteLocation::new("/groups?topics=A"),
        );
        let target = cx
            .update(|cx| guard.check(cx, &req))
            .redirect_target()
            .cloned()
            .unwrap();
        let again = request(req.from.clone(), target);
        assert!(cx.update(|cx| guard.check(cx, &again)).is_continue());
    }

    // --- Guards ---

    #[gpui::test]
    fn test_guards_priority_order(cx: &mut TestAppContext) {
        let mut guards = Guards::new();
        guards.add(guard_fn(|_, _| {
            NavigationAction::redirect(RouteLocation::new("/fallback"))
        }));
        guards.add(QueryFlushGuard::new());
        assert_eq!(guards.names(), vec!["QueryFlushGuard", "RouteGuard"]);

        let req = request(
            named("/events?topics=A", "events"),
            named("/groups?topics=A", "groups"),
        );
        let result = cx.update(|cx| guards.check(cx, &req));
        assert_eq!(result.redirect_target().unwrap().path, "/groups");

        let same = request(named("/events", "events"), named("/events?x=1", "events"));
        let result = cx.update(|cx| guards.check(cx, &same));
        assert_eq!(result.redirect_target().unwrap().path, "/fallback");
    }

    #[test]
    fn test_empty_guards() {
        let guards = Guards::builder().build();
        assert!(guards.is_empty());
        assert_eq!(guards.len(), 0);
    }
}
