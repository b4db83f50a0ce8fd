//! Persisted preferences shared across the whole app.
//!
//! Query parameters are flushed on every route change, so state that must
//! survive navigation lives in a [`PersistentStore`] instead:
//!
//! - the global search term ([`use_search_query`]),
//! - one view mode per page ([`use_view_preference`]).
//!
//! Each storage key is backed by exactly one [`PreferenceCell`] entity owned
//! by the [`PreferenceRegistry`] global. Every handle for a key reads and
//! writes that same entity, so all views see a change in the same frame.
//!
//! A change is written back to the store by a single observer per key and
//! then announced on the [`StorageChannel`]. The registry listens on the
//! channel from a task on the app's executor, so changes announced by other
//! contexts arrive through [`handle_storage_event`] without any polling.
//! They are neither written back nor re-announced. Storage failures are
//! logged and otherwise ignored.
//!
//! ```ignore
//! init_preferences(cx, Arc::new(MemoryStore::new()), StorageChannel::new());
//!
//! let search = use_search_query(cx);
//! search.set_search_query(cx, "climate");
//!
//! let view = use_view_preference(cx, "events", ViewType::Map);
//! if view.view_type(cx) == ViewType::Calendar { /* ... */ }
//! ```

use crate::config::RouteStateConfig;
use crate::storage::{ContextId, PersistentStore, StorageChannel, StorageEvent};
use crate::{debug_log, info_log, trace_log, warn_log};
use futures::StreamExt;
use gpui::{App, AppContext, BorrowAppContext, Context, Entity, Global, Task};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

// ============================================================================
// Values
// ============================================================================

/// A value that can be kept in a string store.
pub trait PreferenceValue: Clone + PartialEq + 'static {
    fn encode(&self) -> String;

    /// `None` for strings this type does not recognise.
    fn decode(raw: &str) -> Option<Self>;
}

impl PreferenceValue for String {
    fn encode(&self) -> String {
        self.clone()
    }

    fn decode(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

/// How a listing page presents its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewType {
    Map,
    List,
    Calendar,
    Grid,
}

impl ViewType {
    pub const ALL: [ViewType; 4] = [Self::Map, Self::List, Self::Calendar, Self::Grid];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Map => "map",
            Self::List => "list",
            Self::Calendar => "calendar",
            Self::Grid => "grid",
        }
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PreferenceValue for ViewType {
    fn encode(&self) -> String {
        self.as_str().to_string()
    }

    fn decode(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|view| view.as_str() == raw)
    }
}

// ============================================================================
// PreferenceCell
// ============================================================================

/// The in-memory value of one storage key.
#[derive(Debug, Clone)]
pub struct PreferenceCell {
    key: String,
    value: String,
    default: String,
    /// Last value known to match the store.
    persisted: String,
    /// Treat whitespace-only values as empty.
    remove_blank: bool,
}

impl PreferenceCell {
    fn new(key: String, value: String, default: String, remove_blank: bool) -> Self {
        Self {
            key,
            persisted: value.clone(),
            value,
            default,
            remove_blank,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Encoded current value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether the value has changed since it last matched the store.
    pub fn is_dirty(&self) -> bool {
        self.value != self.persisted
    }

    /// A dirty cell notifies even for an unchanged value so a failed write
    /// is retried.
    fn set(&mut self, value: String, cx: &mut Context<'_, Self>) {
        if self.value != value || self.is_dirty() {
            self.value = value;
            cx.notify();
        }
    }

    /// Re-read on reuse, falling back to the latest caller's default.
    fn resync(&mut self, stored: Option<String>, default: String, cx: &mut Context<'_, Self>) {
        self.default = default;
        self.sync_from_store(stored, cx);
    }

    /// Adopt a value that already is what the store holds.
    fn sync_from_store(&mut self, stored: Option<String>, cx: &mut Context<'_, Self>) {
        let value = stored
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| self.default.clone());
        self.persisted = value.clone();
        if self.value != value {
            self.value = value;
            cx.notify();
        }
    }

    fn should_remove(&self) -> bool {
        self.value.is_empty() || (self.remove_blank && self.value.trim().is_empty())
    }
}

// ============================================================================
// PreferenceRegistry
// ============================================================================

/// Owner of every preference entity, stored as a GPUI `Global`.
pub struct PreferenceRegistry {
    store: Arc<dyn PersistentStore>,
    channel: StorageChannel,
    context: ContextId,
    config: RouteStateConfig,
    cells: HashMap<String, Entity<PreferenceCell>>,
    _events: Task<()>,
}

impl PreferenceRegistry {
    pub fn context(&self) -> ContextId {
        self.context
    }

    pub fn store(&self) -> &Arc<dyn PersistentStore> {
        &self.store
    }

    pub fn channel(&self) -> &StorageChannel {
        &self.channel
    }

    pub fn config(&self) -> &RouteStateConfig {
        &self.config
    }

    /// Storage keys with a live entity.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn cell(&self, key: &str) -> Option<&Entity<PreferenceCell>> {
        self.cells.get(key)
    }

    fn read(&self, key: &str) -> Option<Option<String>> {
        match self.store.get(key) {
            Ok(value) => Some(value),
            Err(err) => {
                warn_log!("Failed to read preference '{}': {}", key, err);
                None
            }
        }
    }
}

impl fmt::Debug for PreferenceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceRegistry")
            .field("context", &self.context)
            .field("search_key", &self.config.search_storage_key)
            .field("view_prefix", &self.config.view_storage_prefix)
            .field("keys", &self.cells.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Global for PreferenceRegistry {}

/// Install the preference registry with default keys.
///
/// Returns the id this app announces its writes under.
pub fn init_preferences(
    cx: &mut App,
    store: Arc<dyn PersistentStore>,
    channel: StorageChannel,
) -> ContextId {
    init_preferences_with_config(cx, store, channel, &RouteStateConfig::default())
}

/// Install the preference registry using the storage keys from `config`.
pub fn init_preferences_with_config(
    cx: &mut App,
    store: Arc<dyn PersistentStore>,
    channel: StorageChannel,
    config: &RouteStateConfig,
) -> ContextId {
    let context = ContextId::next();
    let mut events = channel.subscribe(context).into_stream();
    let listener = cx.spawn(async move |cx| {
        while let Some(event) = events.next().await {
            if cx.update(|cx| handle_storage_event(cx, &event)).is_err() {
                break;
            }
        }
    });
    info_log!("Preference registry initialised as {}", context);
    cx.set_global(PreferenceRegistry {
        store,
        channel,
        context,
        config: config.clone(),
        cells: HashMap::new(),
        _events: listener,
    });
    context
}

/// Remove the registry, stopping its channel listener.
///
/// Returns `false` if no registry was installed. Handles obtained earlier
/// keep their last value but are no longer persisted.
pub fn dispose_preferences(cx: &mut App) -> bool {
    if !cx.has_global::<PreferenceRegistry>() {
        return false;
    }
    let registry = cx.remove_global::<PreferenceRegistry>();
    info_log!("Preference registry {} disposed", registry.context);
    true
}

/// Entity for `key`, created on first use.
///
/// On first use the value is read from the store and a persist observer is
/// installed. Later calls re-read the store so that a value changed behind
/// the registry's back is picked up.
fn preference_cell(
    cx: &mut App,
    key: String,
    default: String,
    remove_blank: bool,
) -> Entity<PreferenceCell> {
    let registry = cx.global::<PreferenceRegistry>();
    let stored = registry.read(&key);

    if let Some(cell) = registry.cells.get(&key).cloned() {
        if let Some(stored) = stored {
            cell.update(cx, |cell, cx| cell.resync(stored, default, cx));
            trace_log!("Resynced preference '{}' from store", key);
        }
        return cell;
    }

    let value = stored
        .flatten()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.clone());
    debug_log!("Created preference '{}' = '{}'", key, value);
    let cell = cx.new(|_| PreferenceCell::new(key.clone(), value, default, remove_blank));
    cx.observe(&cell, persist_cell).detach();
    cx.update_global::<PreferenceRegistry, _>(|registry, _| {
        registry.cells.insert(key, cell.clone());
    });
    cell
}

fn persist_cell(cell: Entity<PreferenceCell>, cx: &mut App) {
    if !cx.has_global::<PreferenceRegistry>() {
        return;
    }
    let snapshot = cell.read(cx);
    if !snapshot.is_dirty() {
        return;
    }
    let key = snapshot.key.clone();
    let value = snapshot.value.clone();
    let remove = snapshot.should_remove();

    let registry = cx.global::<PreferenceRegistry>();
    let result = if remove {
        registry.store.remove(&key)
    } else {
        registry.store.set(&key, &value)
    };
    if let Err(err) = result {
        warn_log!("Failed to persist preference '{}': {}", key, err);
        return;
    }

    let event = StorageEvent::new(
        key.clone(),
        (!remove).then(|| value.clone()),
        registry.context,
    );
    registry.channel.emit(&event);
    debug_log!("Persisted preference '{}' (removed: {})", key, remove);

    cell.update(cx, |cell, _| cell.persisted = value);
}

/// Apply a change announced by another context.
///
/// Events from this app itself, events for keys nobody has asked for yet,
/// and any event while no registry is installed are ignored. Removal resets
/// the value to its default.
pub fn handle_storage_event(cx: &mut App, event: &StorageEvent) {
    let Some(registry) = cx.try_global::<PreferenceRegistry>() else {
        trace_log!("Ignoring storage event for '{}': no registry", event.key);
        return;
    };
    if event.origin == registry.context {
        return;
    }
    let Some(cell) = registry.cells.get(&event.key).cloned() else {
        trace_log!("Ignoring storage event for unused key '{}'", event.key);
        return;
    };
    debug_log!(
        "Applying storage event for '{}' from {}",
        event.key,
        event.origin
    );
    cell.update(cx, |cell, cx| cell.sync_from_store(event.new_value.clone(), cx));
}

// ============================================================================
// Search query
// ============================================================================

/// Handle to the shared search term.
#[derive(Clone)]
pub struct SearchQuery {
    cell: Entity<PreferenceCell>,
}

/// The app-wide search term, default `""`.
///
/// Blank terms are removed from the store rather than saved.
///
/// # Panics
///
/// If [`init_preferences`] has not been called.
pub fn use_search_query(cx: &mut App) -> SearchQuery {
    let key = cx
        .global::<PreferenceRegistry>()
        .config
        .search_storage_key
        .clone();
    SearchQuery {
        cell: preference_cell(cx, key, String::new(), true),
    }
}

impl SearchQuery {
    pub fn search_query(&self, cx: &App) -> String {
        self.cell.read(cx).value.clone()
    }

    pub fn set_search_query(&self, cx: &mut App, query: impl Into<String>) {
        let query = query.into();
        self.cell.update(cx, |cell, cx| cell.set(query, cx));
    }

    pub fn clear_search_query(&self, cx: &mut App) {
        self.set_search_query(cx, String::new());
    }

    /// The backing entity, for `cx.observe`.
    pub fn entity(&self) -> &Entity<PreferenceCell> {
        &self.cell
    }
}

impl fmt::Debug for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchQuery").finish_non_exhaustive()
    }
}

// ============================================================================
// View preference
// ============================================================================

/// Handle to one page's view mode.
pub struct ViewPreference<T> {
    cell: Entity<PreferenceCell>,
    default: T,
    _marker: PhantomData<fn() -> T>,
}

/// The view mode remembered for `route_key`.
///
/// Stored under the view prefix plus `route_key`; `default` is used when
/// nothing (or something unrecognised) is stored.
///
/// # Panics
///
/// If [`init_preferences`] has not been called.
pub fn use_view_preference<T: PreferenceValue>(
    cx: &mut App,
    route_key: &str,
    default: T,
) -> ViewPreference<T> {
    let key = cx
        .global::<PreferenceRegistry>()
        .config
        .view_storage_key(route_key);
    let cell = preference_cell(cx, key, default.encode(), false);
    ViewPreference {
        cell,
        default,
        _marker: PhantomData,
    }
}

impl<T: PreferenceValue> ViewPreference<T> {
    pub fn view_type(&self, cx: &App) -> T {
        T::decode(&self.cell.read(cx).value).unwrap_or_else(|| self.default.clone())
    }

    pub fn set_view_type(&self, cx: &mut App, view: T) {
        let encoded = view.encode();
        self.cell.update(cx, |cell, cx| cell.set(encoded, cx));
    }

    pub fn entity(&self) -> &Entity<PreferenceCell> {
        &self.cell
    }
}

impl<T: Clone> Clone for ViewPreference<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            default: self.default.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ViewPreference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewPreference")
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}
