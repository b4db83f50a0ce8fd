//! Shared fixtures for integration tests.

#![allow(dead_code)]

use gpui::{App, TestAppContext};
use gpui_route_state::*;
use std::sync::Arc;

/// Route table shaped like a localized listing site.
pub fn site_routes() -> RouteTable {
    RouteTable::new()
        .route("index", "/")
        .route("home", "/home")
        .route("events", "/events")
        .route("events-create", "/events/create")
        .route("events-eventId", "/events/:eventId")
        .route("organizations", "/organizations")
        .route("organizations-orgId", "/organizations/:orgId")
        .route("groups", "/groups")
        .with_locales(["en", "de", "fr"], "en")
}

/// Enable test logging (`RUST_LOG=debug cargo test`).
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Install router and preferences with `config`. Returns the store handle.
pub fn setup(cx: &mut TestAppContext, config: RouteStateConfig) -> Arc<MemoryStore> {
    init_logging();
    let store = Arc::new(MemoryStore::new());
    let shared = store.clone();
    cx.update(|cx| {
        init_route_state(cx, &config, site_routes(), shared, StorageChannel::new());
    });
    store
}

/// Navigate and return the committed full path.
pub fn go(cx: &mut TestAppContext, path: &str) -> String {
    cx.update(|cx| {
        Navigator::push(cx, path);
        Navigator::current_path(cx)
    })
}

pub fn current_path(cx: &TestAppContext) -> String {
    cx.read(Navigator::current_path)
}

pub fn current_name(cx: &App) -> String {
    Navigator::current_name(cx).unwrap_or_default()
}
