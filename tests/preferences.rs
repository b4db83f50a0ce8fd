//! Persisted search term and view preferences.

mod common;

use common::*;
use gpui::TestAppContext;
use gpui_route_state::*;
use std::sync::Arc;

#[gpui::test]
fn test_view_preferences_are_isolated(cx: &mut TestAppContext) {
    let store = setup(cx, RouteStateConfig::default());

    let events = cx.update(|cx| use_view_preference(cx, "events", ViewType::Map));
    let orgs = cx.update(|cx| use_view_preference(cx, "organizations", ViewType::Map));
    cx.update(|cx| {
        events.set_view_type(cx, ViewType::List);
        orgs.set_view_type(cx, ViewType::Grid);
    });

    assert_eq!(cx.read(|cx| events.view_type(cx)), ViewType::List);
    assert_eq!(cx.read(|cx| orgs.view_type(cx)), ViewType::Grid);
    assert_eq!(store.get("view-preference:events").unwrap().as_deref(), Some("list"));
    assert_eq!(
        store.get("view-preference:organizations").unwrap().as_deref(),
        Some("grid")
    );
}

#[gpui::test]
fn test_external_notification_updates_value(cx: &mut TestAppContext) {
    setup(cx, RouteStateConfig::default());
    let search = cx.update(use_search_query);
    let view = cx.update(|cx| use_view_preference(cx, "events", ViewType::Map));

    let other_tab = ContextId::next();
    cx.update(|cx| {
        handle_storage_event(
            cx,
            &StorageEvent::new("search-query", Some("berlin".into()), other_tab),
        );
        handle_storage_event(
            cx,
            &StorageEvent::new("view-preference:events", Some("calendar".into()), other_tab),
        );
    });
    assert_eq!(cx.read(|cx| search.search_query(cx)), "berlin");
    assert_eq!(cx.read(|cx| view.view_type(cx)), ViewType::Calendar);

    cx.update(|cx| {
        handle_storage_event(
            cx,
            &StorageEvent::new("view-preference:events", None, other_tab),
        );
    });
    assert_eq!(cx.read(|cx| view.view_type(cx)), ViewType::Map);
}

#[gpui::test]
fn test_write_failure_is_swallowed(cx: &mut TestAppContext) {
    let store = setup(cx, RouteStateConfig::default());
    let search = cx.update(use_search_query);

    store.set_fail_writes(true);
    cx.update(|cx| search.set_search_query(cx, "x"));
    assert_eq!(cx.read(|cx| search.search_query(cx)), "x");
    store.set_fail_writes(false);
    assert_eq!(store.get("search-query").unwrap(), None);
}

#[gpui::test]
fn test_quota_failure_is_swallowed(cx: &mut TestAppContext) {
    let store = Arc::new(MemoryStore::new().with_quota(16));
    let shared = store.clone();
    cx.update(|cx| {
        init_preferences(cx, shared, StorageChannel::new());
    });
    let search = cx.update(use_search_query);

    cx.update(|cx| search.set_search_query(cx, "a search term far too long"));
    assert_eq!(cx.read(|cx| search.search_query(cx)), "a search term far too long");
    assert_eq!(store.get("search-query").unwrap(), None);
}

#[gpui::test]
fn test_empty_search_removes_key(cx: &mut TestAppContext) {
    let store = setup(cx, RouteStateConfig::default());
    let search = cx.update(use_search_query);

    cx.update(|cx| search.set_search_query(cx, "berlin"));
    assert_eq!(store.get("search-query").unwrap().as_deref(), Some("berlin"));
    cx.update(|cx| search.set_search_query(cx, ""));
    assert_eq!(store.get("search-query").unwrap(), None);

    cx.update(|cx| search.set_search_query(cx, "paris"));
    cx.update(|cx| search.clear_search_query(cx));
    assert_eq!(store.get("search-query").unwrap(), None);
}

#[gpui::test]
fn test_search_survives_route_flush(cx: &mut TestAppContext) {
    let store = setup(cx, RouteStateConfig::default());
    let search = cx.update(use_search_query);
    cx.update(|cx| search.set_search_query(cx, "climate"));

    go(cx, "/events");
    go(cx, "/events?topics=A");
    assert_eq!(go(cx, "/groups"), "/groups");

    let again = cx.update(use_search_query);
    assert_eq!(cx.read(|cx| again.search_query(cx)), "climate");
    assert_eq!(store.get("search-query").unwrap().as_deref(), Some("climate"));
}

#[cfg(feature = "file-store")]
#[gpui::test]
fn test_file_store_restores_preferences(cx_a: &mut TestAppContext, cx_b: &mut TestAppContext) {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("preferences.json");

    let store = Arc::new(FileStore::open(&path).unwrap());
    cx_a.update(|cx| {
        init_preferences(cx, store, StorageChannel::new());
    });
    let view = cx_a.update(|cx| use_view_preference(cx, "events", ViewType::Map));
    cx_a.update(|cx| view.set_view_type(cx, ViewType::Calendar));

    let reopened = Arc::new(FileStore::open(&path).unwrap());
    cx_b.update(|cx| {
        init_preferences(cx, reopened, StorageChannel::new());
    });
    let restored = cx_b.update(|cx| use_view_preference(cx, "events", ViewType::Map));
    assert_eq!(cx_b.read(|cx| restored.view_type(cx)), ViewType::Calendar);
}

#[gpui::test]
fn test_two_apps_share_a_store(cx_a: &mut TestAppContext, cx_b: &mut TestAppContext) {
    init_logging();
    let store = Arc::new(MemoryStore::new());
    let channel = StorageChannel::new();
    for cx in [&mut *cx_a, &mut *cx_b] {
        let store = store.clone();
        let channel = channel.clone();
        cx.update(|cx| {
            init_route_state(cx, &RouteStateConfig::default(), site_routes(), store, channel);
        });
    }

    let a = cx_a.update(use_search_query);
    let b = cx_b.update(use_search_query);
    cx_a.update(|cx| a.set_search_query(cx, "berlin"));
    cx_a.run_until_parked();
    cx_b.run_until_parked();
    assert_eq!(cx_b.read(|cx| b.search_query(cx)), "berlin");
    assert_eq!(store.peek("search-query").as_deref(), Some("berlin"));

    cx_b.update(|cx| b.set_search_query(cx, "hamburg"));
    cx_b.run_until_parked();
    cx_a.run_until_parked();
    assert_eq!(cx_a.read(|cx| a.search_query(cx)), "hamburg");
}
