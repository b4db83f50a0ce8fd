//! Resolved locations and navigation requests.
//!
//! A [`RouteLocation`] is what the router knows about one point in history:
//! the logical route name (possibly localized, `events___de`), the concrete
//! path, path parameters, the query, and an optional hash. Guards receive a
//! [`NavigationRequest`] pairing the current location with the candidate.
//!
//! # Example
//!
//! ```
//! use gpui_route_state::{NavigationRequest, RouteLocation};
//!
//! let from = RouteLocation::new("/events?topics=A").with_name("events");
//! let to = RouteLocation::new("/organizations").with_name("organizations");
//! let request = NavigationRequest::new(from, to);
//!
//! assert!(!request.is_same_route());
//! assert_eq!(request.from.query.get_single("topics"), Some("A"));
//! ```

use crate::params::QueryParams;
use std::collections::BTreeMap;
use std::fmt;

/// One resolved location in the router history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteLocation {
    /// Logical route name. `None` when the path matched no named route.
    pub name: Option<String>,
    /// Path without query or hash, always starting with `/`.
    pub path: String,
    /// Dynamic path segments (`:eventId` in `/events/:eventId`).
    pub params: BTreeMap<String, String>,
    pub query: QueryParams,
    /// Fragment without the leading `#`.
    pub hash: Option<String>,
}

impl RouteLocation {
    /// Parse `path?query#hash` into an unnamed location.
    ///
    /// ```
    /// use gpui_route_state::RouteLocation;
    ///
    /// let loc = RouteLocation::new("events?name=berlin#map");
    /// assert_eq!(loc.path, "/events");
    /// assert_eq!(loc.query.get_single("name"), Some("berlin"));
    /// assert_eq!(loc.hash.as_deref(), Some("map"));
    /// ```
    pub fn new(full_path: impl AsRef<str>) -> Self {
        let full_path = full_path.as_ref();
        let (rest, hash) = match full_path.split_once('#') {
            Some((rest, hash)) => (rest, Some(hash.to_string())),
            None => (full_path, None),
        };
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));

        Self {
            name: None,
            path: normalize_path(path),
            params: BTreeMap::new(),
            query: QueryParams::from_query_string(query),
            hash: hash.filter(|h| !h.is_empty()),
        }
    }

    /// Set the route name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Replace the query.
    #[must_use]
    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Route name, with an absent name reported as `""`.
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    /// `true` when the router reported a non-empty name.
    pub fn has_name(&self) -> bool {
        !self.name_or_empty().is_empty()
    }

    /// `path?query#hash`, omitting empty parts.
    pub fn full_path(&self) -> String {
        let mut out = self.path.clone();
        if !self.query.is_empty() {
            out.push('?');
            out.push_str(&self.query.to_query_string());
        }
        if let Some(hash) = &self.hash {
            out.push('#');
            out.push_str(hash);
        }
        out
    }
}

impl fmt::Display for RouteLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_path())
    }
}

/// Ensure a single leading `/` and no trailing `/` (except for the root).
pub(crate) fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    format!("/{trimmed}")
}

/// A navigation about to happen, as seen by guards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    /// Where the router currently is.
    pub from: RouteLocation,
    /// Where the navigation wants to go.
    pub to: RouteLocation,
}

impl NavigationRequest {
    /// Create a request.
    pub fn new(from: RouteLocation, to: RouteLocation) -> Self {
        Self { from, to }
    }

    /// `true` when both sides carry the same non-empty route name.
    ///
    /// This is a query-only change within one page.
    pub fn is_same_route(&self) -> bool {
        self.from.has_name() && self.from.name == self.to.name
    }
}
