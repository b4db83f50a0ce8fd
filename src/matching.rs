//! Route-name and path-section matching.
//!
//! Localized routers register one route name per language for the same page:
//! `events` becomes `events___en`, `events___de`, and so on. Detail pages are
//! named by joining segments with `-` (`events-eventId`). The helpers here
//! decide whether a route *belongs to* a section under that convention.
//!
//! | Name                    | `matches_route_name(_, "events")` |
//! |-------------------------|-----------------------------------|
//! | `events`                | `true`                            |
//! | `events___en`           | `true`                            |
//! | `events-eventId`        | `false`                           |
//! | `events-eventId___en`   | `false`                           |
//! | `organizations`         | `false`                           |
//! | `""`                    | `false`                           |
//!
//! The path-based helpers ([`base_section`], [`is_locale_segment`]) serve the
//! narrower [`SectionFlushGuard`](crate::guards::SectionFlushGuard), which looks
//! at the URL rather than the route name.

/// Separator between a base route name and its locale code.
pub const I18N_SEPARATOR: &str = "___";

/// Return `true` if `route_name` is `target` or `target` with a locale suffix.
///
/// A plain prefix check would also accept `events-eventId`; anchoring on
/// [`I18N_SEPARATOR`] keeps child routes out.
///
/// ```
/// use gpui_route_state::matching::matches_route_name;
///
/// assert!(matches_route_name("events___de", "events"));
/// assert!(!matches_route_name("events-eventId", "events"));
/// ```
pub fn matches_route_name(route_name: &str, target: &str) -> bool {
    if route_name.is_empty() {
        return false;
    }
    match route_name.strip_prefix(target) {
        Some("") => true,
        Some(rest) => rest.starts_with(I18N_SEPARATOR),
        None => false,
    }
}

/// [`matches_route_name`] for routers that may report no name at all.
///
/// A missing name is treated as the empty string and never matches.
pub fn matches_optional_route_name(route_name: Option<&str>, target: &str) -> bool {
    matches_route_name(route_name.unwrap_or_default(), target)
}

/// Strip the locale suffix from a route name.
///
/// ```
/// use gpui_route_state::matching::base_route_name;
///
/// assert_eq!(base_route_name("events-eventId___fr"), "events-eventId");
/// assert_eq!(base_route_name("home"), "home");
/// ```
pub fn base_route_name(route_name: &str) -> &str {
    route_name
        .split_once(I18N_SEPARATOR)
        .map_or(route_name, |(base, _)| base)
}

/// Locale code carried by a route name, if any.
pub fn locale_of(route_name: &str) -> Option<&str> {
    route_name
        .split_once(I18N_SEPARATOR)
        .map(|(_, locale)| locale)
        .filter(|locale| !locale.is_empty())
}

/// Build the localized name for `base` in `locale`.
pub fn localized_route_name(base: &str, locale: &str) -> String {
    format!("{base}{I18N_SEPARATOR}{locale}")
}

/// Return `true` for path segments shaped like a locale code.
///
/// Accepts two ASCII letters, optionally followed by `-` and two more
/// (`en`, `DE`, `pt-br`), case-insensitively.
pub fn is_locale_segment(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    let pair = |b: &[u8]| b.len() == 2 && b.iter().all(u8::is_ascii_alphabetic);
    match bytes.len() {
        2 => pair(bytes),
        5 => pair(&bytes[..2]) && bytes[2] == b'-' && pair(&bytes[3..]),
        _ => false,
    }
}

/// First meaningful segment of a path, skipping a leading locale segment.
///
/// A lone locale segment is kept, since `/en` has nothing else to offer.
///
/// ```
/// use gpui_route_state::matching::base_section;
///
/// assert_eq!(base_section("/en/events"), "events");
/// assert_eq!(base_section("/organizations/42"), "organizations");
/// assert_eq!(base_section("/"), "");
/// assert_eq!(base_section("/en"), "en");
/// ```
pub fn base_section(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let mut segments = path.strip_prefix('/').unwrap_or(path).split('/');
    let first = segments.next().unwrap_or_default();
    match segments.next() {
        Some(second) if is_locale_segment(first) => second,
        _ => first,
    }
}

/// Split a path into its non-empty segments.
///
/// ```
/// use gpui_route_state::matching::split_path;
///
/// assert_eq!(split_path("/events/42/"), vec!["events", "42"]);
/// assert!(split_path("/").is_empty());
/// ```
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}
