//! Runtime configuration.
//!
//! Everything here has a sensible default; most applications only call
//! [`RouteStateConfig::default`]. Compile-time knobs live in Cargo features
//! (`log`/`tracing`, `cache`, `file-store`).

/// Query key exempt from cross-route flushing: the full-text search term.
pub const DEFAULT_PRESERVED_QUERY_KEY: &str = "name";

/// Storage key of the global search query.
pub const DEFAULT_SEARCH_STORAGE_KEY: &str = "search-query";

/// Prefix of per-route view preference keys (`view-preference:events`).
pub const DEFAULT_VIEW_STORAGE_PREFIX: &str = "view-preference:";

/// Top-level sections between which the section guard flushes queries.
///
/// The empty string stands for the root path `/`.
pub const DEFAULT_TOP_LEVEL_SECTIONS: &[&str] = &["events", "organizations", "groups", "home", ""];

/// Settings shared by the guards and the preference registry.
///
/// # Example
///
/// ```
/// use gpui_route_state::RouteStateConfig;
///
/// let config = RouteStateConfig::new()
///     .preserved_query_key("q")
///     .with_section_guard(true);
/// assert_eq!(config.preserved_query_key, "q");
/// assert!(config.is_top_level_section("events"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteStateConfig {
    pub preserved_query_key: String,
    pub top_level_sections: Vec<String>,
    /// Install [`SectionFlushGuard`](crate::guards::SectionFlushGuard) next to
    /// the name-based flush guard.
    pub section_guard: bool,
    pub search_storage_key: String,
    pub view_storage_prefix: String,
}

impl RouteStateConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn preserved_query_key(mut self, key: impl Into<String>) -> Self {
        self.preserved_query_key = key.into();
        self
    }

    /// Replace the top-level section allow-list.
    #[must_use]
    pub fn top_level_sections<I, S>(mut self, sections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.top_level_sections = sections.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_section_guard(mut self, enabled: bool) -> Self {
        self.section_guard = enabled;
        self
    }

    #[must_use]
    pub fn search_storage_key(mut self, key: impl Into<String>) -> Self {
        self.search_storage_key = key.into();
        self
    }

    #[must_use]
    pub fn view_storage_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.view_storage_prefix = prefix.into();
        self
    }

    pub fn is_top_level_section(&self, section: &str) -> bool {
        self.top_level_sections.iter().any(|s| s == section)
    }

    /// Storage key for the view preference of `route_key`.
    pub fn view_storage_key(&self, route_key: &str) -> String {
        format!("{}{}", self.view_storage_prefix, route_key)
    }
}

impl Default for RouteStateConfig {
    fn default() -> Self {
        Self {
            preserved_query_key: DEFAULT_PRESERVED_QUERY_KEY.to_string(),
            top_level_sections: DEFAULT_TOP_LEVEL_SECTIONS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            section_guard: false,
            search_storage_key: DEFAULT_SEARCH_STORAGE_KEY.to_string(),
            view_storage_prefix: DEFAULT_VIEW_STORAGE_PREFIX.to_string(),
        }
    }
}
