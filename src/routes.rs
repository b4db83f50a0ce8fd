//! Named route table with locale variants.
//!
//! The table maps concrete paths to logical route names the way localized
//! routers do: one base name per page, one localized name per language.
//! With locales `en` (default) and `de`:
//!
//! | Path                | Name                  | Params            |
//! |---------------------|-----------------------|-------------------|
//! | `/events`           | `events___en`         |                   |
//! | `/de/events`        | `events___de`         |                   |
//! | `/events/42`        | `events-eventId___en` | `eventId = 42`    |
//!
//! Without locales the names are the bare base names.
//!
//! # Example
//!
//! ```
//! use gpui_route_state::RouteTable;
//!
//! let table = RouteTable::new()
//!     .route("events", "/events")
//!     .route("events-eventId", "/events/:eventId")
//!     .with_locales(["en", "de"], "en");
//!
//! let resolved = table.resolve("/de/events/42").unwrap();
//! assert_eq!(resolved.name, "events-eventId___de");
//! assert_eq!(resolved.params.get("eventId").map(String::as_str), Some("42"));
//! ```

use crate::matching::{is_locale_segment, localized_route_name, split_path};
use std::collections::BTreeMap;

/// One named route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDef {
    pub name: String,
    /// `/`-separated segments; `:name` segments capture a parameter.
    pub pattern: String,
}

impl RouteDef {
    pub fn new(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }

    /// Match path segments, returning captured params and the number of
    /// literal segments (used to prefer `/events/create` over `/events/:id`).
    fn match_segments(&self, segments: &[&str]) -> Option<(BTreeMap<String, String>, usize)> {
        let pattern = split_path(&self.pattern);
        if pattern.len() != segments.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        let mut literals = 0;
        for (pat, seg) in pattern.iter().zip(segments) {
            if let Some(param) = pat.strip_prefix(':') {
                params.insert(param.to_string(), (*seg).to_string());
            } else if pat == seg {
                literals += 1;
            } else {
                return None;
            }
        }
        Some((params, literals))
    }
}

/// Result of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// Localized name when the table has locales, base name otherwise.
    pub name: String,
    pub params: BTreeMap<String, String>,
    pub locale: Option<String>,
}

/// Registry of named routes.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteDef>,
    locales: Vec<String>,
    default_locale: Option<String>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route.
    #[must_use]
    pub fn route(mut self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.add(RouteDef::new(name, pattern));
        self
    }

    pub fn add(&mut self, route: RouteDef) {
        self.routes.push(route);
    }

    /// Enable locale variants.
    ///
    /// The default locale is served without a path prefix; every other locale
    /// is served under `/<locale>/...`.
    #[must_use]
    pub fn with_locales<I, S>(mut self, locales: I, default_locale: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let default_locale = default_locale.into();
        self.locales = locales.into_iter().map(Into::into).collect();
        if !self.locales.contains(&default_locale) {
            self.locales.push(default_locale.clone());
        }
        self.default_locale = Some(default_locale);
        self
    }

    pub fn routes(&self) -> &[RouteDef] {
        &self.routes
    }

    pub fn locales(&self) -> &[String] {
        &self.locales
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Resolve a path (query and hash are ignored) to a named route.
    pub fn resolve(&self, path: &str) -> Option<ResolvedRoute> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments = split_path(path);
        let (locale, rest) = self.split_locale(&segments);

        let mut best: Option<(&RouteDef, BTreeMap<String, String>, usize)> = None;
        for route in &self.routes {
            if let Some((params, literals)) = route.match_segments(rest) {
                if best.as_ref().map_or(true, |(_, _, l)| literals > *l) {
                    best = Some((route, params, literals));
                }
            }
        }

        let (route, params, _) = best?;
        let name = match &locale {
            Some(locale) => localized_route_name(&route.name, locale),
            None => route.name.clone(),
        };
        Some(ResolvedRoute {
            name,
            params,
            locale,
        })
    }

    /// Build the path of a named route, filling `:param` segments.
    ///
    /// Returns `None` for unknown names or missing params.
    pub fn path_for(
        &self,
        name: &str,
        params: &BTreeMap<String, String>,
        locale: Option<&str>,
    ) -> Option<String> {
        let route = self.routes.iter().find(|r| r.name == name)?;
        let mut segments: Vec<&str> = Vec::new();

        if let Some(locale) = locale {
            if self.default_locale.as_deref() != Some(locale) && self.has_locale(locale) {
                segments.push(locale);
            }
        }
        for seg in split_path(&route.pattern) {
            match seg.strip_prefix(':') {
                Some(param) => segments.push(params.get(param)?),
                None => segments.push(seg),
            }
        }
        Some(format!("/{}", segments.join("/")))
    }

    fn has_locale(&self, locale: &str) -> bool {
        self.locales.iter().any(|l| l == locale)
    }

    fn split_locale<'a, 'b>(&self, segments: &'b [&'a str]) -> (Option<String>, &'b [&'a str]) {
        if self.locales.is_empty() {
            return (None, segments);
        }
        match segments.split_first() {
            Some((first, rest)) if is_locale_segment(first) && self.has_locale(first) => {
                (Some((*first).to_string()), rest)
            }
            _ => (self.default_locale.clone(), segments),
        }
    }
}
