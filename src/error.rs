//! Error and outcome types.
//!
//! - [`StorageError`]: failures reported by a
//!   [`PersistentStore`](crate::storage::PersistentStore). These never cross
//!   the preference API: the registry logs them and keeps its in-memory value.
//! - [`NavigationResult`]: the outcome of a navigation through the guard
//!   pipeline of [`GlobalRouter`](crate::context::GlobalRouter).
//!
//! # Examples
//!
//! ```
//! use gpui_route_state::error::{NavigationResult, StorageError};
//!
//! let result = NavigationResult::Redirected {
//!     requested: "/organizations?topics=ENVIRONMENT".into(),
//!     path: "/organizations".into(),
//! };
//! assert!(result.is_success());
//! assert!(result.was_redirected());
//!
//! let err = StorageError::unavailable("storage disabled");
//! assert_eq!(err.to_string(), "Storage unavailable: storage disabled");
//! ```

use std::fmt;

// ============================================================================
// StorageError
// ============================================================================

/// Failure of a single persistent store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The store cannot be used at all (disabled, locked, poisoned).
    Unavailable { message: String },

    /// The store refused the write because it is full.
    QuotaExceeded { key: String },

    /// Reading or writing the backing file failed.
    Io { message: String },

    /// The backing file holds something that is not a string map.
    Serialization { message: String },
}

impl StorageError {
    /// Shorthand for [`StorageError::Unavailable`].
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Shorthand for [`StorageError::QuotaExceeded`].
    pub fn quota_exceeded(key: impl Into<String>) -> Self {
        Self::QuotaExceeded { key: key.into() }
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable { message } => {
                write!(f, "Storage unavailable: {}", message)
            }
            StorageError::QuotaExceeded { key } => {
                write!(f, "Storage quota exceeded while writing '{}'", key)
            }
            StorageError::Io { message } => write!(f, "Storage I/O failed: {}", message),
            StorageError::Serialization { message } => {
                write!(f, "Storage contents malformed: {}", message)
            }
        }
    }
}

impl std::error::Error for StorageError {}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

#[cfg(feature = "file-store")]
impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: err.to_string(),
        }
    }
}

// ============================================================================
// NavigationResult
// ============================================================================

/// Outcome of a navigation attempt.
///
/// Guards in this crate only ever continue or rewrite a navigation, so
/// `Blocked` is reserved for the router cutting a redirect loop short.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationResult {
    /// Navigation committed to `path` as requested.
    Success { path: String },

    /// A guard rewrote the navigation; `path` is what was committed.
    Redirected { requested: String, path: String },

    /// Navigation did not commit.
    Blocked { reason: String },
}

impl NavigationResult {
    /// `true` when the navigation committed, rewritten or not.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            NavigationResult::Success { .. } | NavigationResult::Redirected { .. }
        )
    }

    /// `true` when a guard rewrote the target.
    pub fn was_redirected(&self) -> bool {
        matches!(self, NavigationResult::Redirected { .. })
    }

    /// `true` when nothing was committed.
    pub fn is_blocked(&self) -> bool {
        matches!(self, NavigationResult::Blocked { .. })
    }

    /// Full path (with query) that was committed, if any.
    pub fn committed_path(&self) -> Option<&str> {
        match self {
            NavigationResult::Success { path } | NavigationResult::Redirected { path, .. } => {
                Some(path)
            }
            NavigationResult::Blocked { .. } => None,
        }
    }
}
