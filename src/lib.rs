//! # gpui-route-state
//!
//! Route-scoped state for [GPUI](https://gpui.rs) applications.
//!
//! Listing pages keep their filters in the URL query. Two problems follow:
//! filters leak into the next page when the user navigates away, and some
//! state (the search term, the chosen view mode) should survive navigation
//! without living in the URL at all. This crate covers both:
//!
//! - **Query-flush guards** ([`QueryFlushGuard`], [`SectionFlushGuard`]) run
//!   before every navigation and drop inherited query parameters on route
//!   changes, preserving only the search key.
//! - **Route query sync** ([`RouteQuerySync`]) tells a page whether it is
//!   the active route and calls it back with the query after each navigation
//!   onto it. Localized route names (`events___de`) are matched, detail
//!   routes (`events-eventId`) are not.
//! - **Persisted preferences** ([`use_search_query`], [`use_view_preference`])
//!   are one entity per storage key, written to a [`PersistentStore`] and
//!   kept consistent across apps sharing a [`StorageChannel`].
//!
//! A small named-route router ([`GlobalRouter`], [`Navigator`]) hosts the
//! guards and drives the watchers.
//!
//! ## Quick start
//!
//! ```ignore
//! use gpui_route_state::*;
//! use std::sync::Arc;
//!
//! fn setup(cx: &mut gpui::App) {
//!     let table = RouteTable::new()
//!         .route("events", "/events")
//!         .route("events-eventId", "/events/:eventId")
//!         .route("organizations", "/organizations")
//!         .with_locales(["en", "de"], "en");
//!
//!     init_route_state(
//!         cx,
//!         &RouteStateConfig::default(),
//!         table,
//!         Arc::new(MemoryStore::new()),
//!         StorageChannel::new(),
//!     );
//!
//!     let view = use_view_preference(cx, "events", ViewType::Map);
//!     RouteQuerySync::new("events")
//!         .watch_route_query(cx, |query, _cx| {
//!             println!("filters: {query}");
//!         }, WatchOptions::default())
//!         .detach();
//!
//!     Navigator::push(cx, "/events?topics=ENVIRONMENT");
//! }
//! ```
//!
//! ## Cargo features
//!
//! | Feature      | Default | Effect                                       |
//! |--------------|---------|----------------------------------------------|
//! | `log`        | yes     | Log through the `log` facade                 |
//! | `tracing`    | no      | Log through `tracing` instead                |
//! | `cache`      | yes     | LRU cache for path resolution (`lru`)        |
//! | `file-store` | yes     | JSON-file [`FileStore`] (`serde_json`)       |

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod action;
#[cfg(feature = "cache")]
pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod guards;
pub mod location;
pub mod logging;
pub mod matching;
pub mod params;
pub mod preference;
pub mod routes;
pub mod state;
pub mod storage;
pub mod sync;

pub use action::NavigationAction;
#[cfg(feature = "cache")]
pub use cache::{CacheStats, ResolveCache};
pub use config::RouteStateConfig;
pub use context::{
    init_router, init_router_with_config, navigate, GlobalRouter, Navigator, UseRouter,
};
pub use error::{NavigationResult, StorageError};
pub use guards::{guard_fn, FnGuard, Guards, QueryFlushGuard, RouteGuard, SectionFlushGuard};
pub use location::{NavigationRequest, RouteLocation};
pub use matching::{matches_optional_route_name, matches_route_name};
pub use params::{QueryParams, QueryValue};
pub use preference::{
    dispose_preferences, handle_storage_event, init_preferences, init_preferences_with_config,
    use_search_query, use_view_preference, PreferenceCell, PreferenceRegistry, PreferenceValue,
    SearchQuery, ViewPreference, ViewType,
};
pub use routes::{ResolvedRoute, RouteDef, RouteTable};
pub use state::{NavigationDirection, RouteChangeEvent, RouterState};
#[cfg(feature = "file-store")]
pub use storage::FileStore;
pub use storage::{
    ContextId, MemoryStore, PersistentStore, StorageChannel, StorageEvent, StorageReceiver,
};
pub use sync::{use_route_query_sync, QueryWatch, RouteQuerySync, WatchOptions};

use gpui::App;
use std::sync::Arc;

/// Install the router (with the flush guards `config` asks for) and the
/// preference registry in one call.
///
/// Returns the [`ContextId`] this app announces storage writes under.
pub fn init_route_state(
    cx: &mut App,
    config: &RouteStateConfig,
    table: RouteTable,
    store: Arc<dyn PersistentStore>,
    channel: StorageChannel,
) -> ContextId {
    init_router_with_config(cx, table, config);
    init_preferences_with_config(cx, store, channel, config)
}
