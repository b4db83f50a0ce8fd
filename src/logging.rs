//! Logging abstraction layer.
//!
//! The crate never talks to a logger directly. Every diagnostic goes through
//! one of the macros below, which forward to [`log`](https://docs.rs/log) or
//! [`tracing`](https://docs.rs/tracing) depending on the enabled feature.
//! Enable at most one of the two features.
//!
//! | Feature    | Backend         | Default |
//! |------------|-----------------|---------|
//! | `log`      | `log` crate     | yes     |
//! | `tracing`  | `tracing` crate | no      |
//!
//! Level conventions used across the crate:
//!
//! - `trace_log!`: guard evaluation and cache lookups.
//! - `debug_log!`: query rewrites, watcher dispatch, preference resync.
//! - `info_log!`: committed navigations, registry bootstrap.
//! - `warn_log!`: swallowed storage failures.
//! - `error_log!`: redirect loops cut short by the router.
//!
//! ```ignore
//! use gpui_route_state::{debug_log, warn_log};
//!
//! debug_log!("Flushing query for '{}'", path);
//! warn_log!("Failed to persist '{}': {}", key, err);
//! ```

/// Emit a **trace**-level log message through the active backend.
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!($($arg)*);
        #[cfg(feature = "log")]
        ::log::trace!($($arg)*);
    };
}

/// Emit a **debug**-level log message through the active backend.
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!($($arg)*);
        #[cfg(feature = "log")]
        ::log::debug!($($arg)*);
    };
}

/// Emit an **info**-level log message through the active backend.
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::info!($($arg)*);
        #[cfg(feature = "log")]
        ::log::info!($($arg)*);
    };
}

/// Emit a **warn**-level log message through the active backend.
///
/// Storage failures are reported at this level and then swallowed.
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::warn!($($arg)*);
        #[cfg(feature = "log")]
        ::log::warn!($($arg)*);
    };
}

/// Emit an **error**-level log message through the active backend.
#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::error!($($arg)*);
        #[cfg(feature = "log")]
        ::log::error!($($arg)*);
    };
}
