//! Route-scoped query watching.
//!
//! A page that keeps its filters in the URL query wants two things: to know
//! whether it is the page currently shown, and to be told when the query
//! changes while it is. [`RouteQuerySync`] provides both for one base route
//! name, tolerating locale suffixes (`events` matches `events___de`) and
//! ignoring detail routes (`events` never matches `events-eventId`).
//!
//! ```ignore
//! let sync = use_route_query_sync("events");
//! let watch = sync.watch_route_query(cx, |query, cx| {
//!     apply_filters(query, cx);
//! }, WatchOptions::default());
//! ```

use crate::context::GlobalRouter;
use crate::matching::matches_optional_route_name;
use crate::params::QueryParams;
use crate::{debug_log, trace_log};
use gpui::{App, Subscription};

/// Options for [`RouteQuerySync::watch_route_query`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    /// Run the callback once right away if the route is active.
    pub immediate: bool,
}

impl WatchOptions {
    /// Only react to later navigations.
    pub const fn deferred() -> Self {
        Self { immediate: false }
    }
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self { immediate: true }
    }
}

/// Watches the query of one route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteQuerySync {
    target: String,
}

/// Shorthand for [`RouteQuerySync::new`].
pub fn use_route_query_sync(target: impl Into<String>) -> RouteQuerySync {
    RouteQuerySync::new(target)
}

impl RouteQuerySync {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Whether the current route is the target (any locale).
    ///
    /// Read from the live router each call. `false` when no router is
    /// installed.
    pub fn is_active_route(&self, cx: &App) -> bool {
        cx.try_global::<GlobalRouter>()
            .is_some_and(|router| matches_optional_route_name(router.current_name(), &self.target))
    }

    /// Call `callback` with the current query whenever a navigation commits
    /// onto the target route.
    ///
    /// Navigations that land elsewhere are skipped entirely. With
    /// `options.immediate` the callback also runs once before this returns,
    /// if the target is active right now.
    ///
    /// The watch lives as long as the returned [`QueryWatch`].
    pub fn watch_route_query<F>(&self, cx: &mut App, mut callback: F, options: WatchOptions) -> QueryWatch
    where
        F: FnMut(&QueryParams, &mut App) + 'static,
    {
        let mut last_seen = cx
            .try_global::<GlobalRouter>()
            .map(GlobalRouter::navigation_id);

        if options.immediate {
            if let Some(query) = self.active_query(cx) {
                debug_log!("Immediate query sync for '{}': '{}'", self.target, query);
                callback(&query, cx);
            }
        }

        let sync = self.clone();
        let subscription = cx.observe_global::<GlobalRouter>(move |cx| {
            let navigation_id = cx.global::<GlobalRouter>().navigation_id();
            if last_seen == Some(navigation_id) {
                return;
            }
            last_seen = Some(navigation_id);

            match sync.active_query(cx) {
                Some(query) => {
                    debug_log!("Query sync for '{}': '{}'", sync.target, query);
                    callback(&query, cx);
                }
                None => {
                    trace_log!("Query sync for '{}' skipped: route inactive", sync.target);
                }
            }
        });

        QueryWatch {
            subscription: Some(subscription),
        }
    }

    fn active_query(&self, cx: &App) -> Option<QueryParams> {
        let router = cx.try_global::<GlobalRouter>()?;
        matches_optional_route_name(router.current_name(), &self.target)
            .then(|| router.current().query.clone())
    }
}

/// Handle returned by [`RouteQuerySync::watch_route_query`].
///
/// Dropping it stops the watch.
#[must_use = "dropping a QueryWatch stops the watch immediately"]
pub struct QueryWatch {
    subscription: Option<Subscription>,
}

impl QueryWatch {
    /// Stop watching. Calling this more than once does nothing.
    pub fn dispose(&mut self) {
        if self.subscription.take().is_some() {
            trace_log!("Query watch disposed");
        }
    }

    pub fn is_active(&self) -> bool {
        self.subscription.is_some()
    }

    /// Keep watching for the rest of the app's lifetime.
    pub fn detach(mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.detach();
        }
    }
}

impl std::fmt::Debug for QueryWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryWatch")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteStateConfig;
    use crate::context::{init_router_with_config, Navigator};
    use crate::routes::{RouteDef, RouteTable};
    use gpui::{BorrowAppContext, TestAppContext};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn init(cx: &mut TestAppContext) {
        cx.update(|cx| {
            init_router_with_config(
                cx,
                RouteTable::new()
                    .route("index", "/")
                    .route("events", "/events")
                    .route("events-eventId", "/events/:eventId")
                    .route("groups", "/groups")
                    .with_locales(["en", "de"], "en"),
                &RouteStateConfig::default(),
            );
        });
    }

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl FnMut(&QueryParams, &mut App) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |query: &QueryParams, _: &mut App| {
            sink.borrow_mut().push(query.to_query_string());
        })
    }

    #[gpui::test]
    fn test_is_active_route(cx: &mut TestAppContext) {
        let sync = use_route_query_sync("events");
        assert!(!cx.read(|cx| sync.is_active_route(cx)));

        init(cx);
        cx.update(|cx| Navigator::push(cx, "/de/events"));
        assert!(cx.read(|cx| sync.is_active_route(cx)));

        cx.update(|cx| Navigator::push(cx, "/de/events/4"));
        assert!(!cx.read(|cx| sync.is_active_route(cx)));
    }

    #[gpui::test]
    fn test_watch_fires_only_on_target(cx: &mut TestAppContext) {
        init(cx);
        let (seen, callback) = recorder();
        let sync = RouteQuerySync::new("events");
        let _watch = cx.update(|cx| sync.watch_route_query(cx, callback, WatchOptions::default()));
        assert!(seen.borrow().is_empty());

        cx.update(|cx| Navigator::push(cx, "/events"));
        cx.update(|cx| Navigator::push(cx, "/events?topics=A"));
        cx.update(|cx| Navigator::push(cx, "/events/9"));
        cx.update(|cx| Navigator::push(cx, "/groups?days=2"));

        assert_eq!(*seen.borrow(), vec!["".to_string(), "topics=A".to_string()]);
    }

    #[gpui::test]
    fn test_immediate_and_deferred(cx: &mut TestAppContext) {
        init(cx);
        cx.update(|cx| {
            Navigator::push(cx, "/events");
            Navigator::push(cx, "/events?topics=B");
        });

        let sync = RouteQuerySync::new("events");
        let (immediate, callback) = recorder();
        let _a = cx.update(|cx| sync.watch_route_query(cx, callback, WatchOptions::default()));
        assert_eq!(*immediate.borrow(), vec!["topics=B".to_string()]);

        let (deferred, callback) = recorder();
        let _b = cx.update(|cx| sync.watch_route_query(cx, callback, WatchOptions::deferred()));
        assert!(deferred.borrow().is_empty());
    }

    #[gpui::test]
    fn test_unrelated_global_updates_do_not_refire(cx: &mut TestAppContext) {
        init(cx);
        cx.update(|cx| Navigator::push(cx, "/events"));
        let (seen, callback) = recorder();
        let _watch = cx.update(|cx| {
            RouteQuerySync::new("events").watch_route_query(cx, callback, WatchOptions::deferred())
        });

        cx.update(|cx| {
            cx.update_global::<GlobalRouter, _>(|router, _| {
                router.add_route(RouteDef::new("home", "/home"));
            });
        });
        assert!(seen.borrow().is_empty());
    }

    #[gpui::test]
    fn test_dispose_is_idempotent(cx: &mut TestAppContext) {
        init(cx);
        let (seen, callback) = recorder();
        let mut watch = cx.update(|cx| {
            RouteQuerySync::new("events").watch_route_query(cx, callback, WatchOptions::default())
        });
        watch.dispose();
        watch.dispose();
        assert!(!watch.is_active());

        cx.update(|cx| Navigator::push(cx, "/events"));
        assert!(seen.borrow().is_empty());
    }

    #[gpui::test]
    fn test_detached_watch_keeps_running(cx: &mut TestAppContext) {
        init(cx);
        let (seen, callback) = recorder();
        cx.update(|cx| {
            RouteQuerySync::new("groups")
                .watch_route_query(cx, callback, WatchOptions::default())
                .detach();
        });
        cx.update(|cx| Navigator::push(cx, "/groups"));
        assert_eq!(seen.borrow().len(), 1);
    }
}
