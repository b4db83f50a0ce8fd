//! Key-value persistence and cross-context change notification.
//!
//! Preferences outlive the app session through a [`PersistentStore`]. Two
//! implementations ship with the crate:
//!
//! - [`MemoryStore`]: a process-local map, with switchable read/write
//!   failures and an optional size quota for exercising error paths.
//! - [`FileStore`] (feature `file-store`): a JSON file written through on
//!   every change.
//!
//! Several GPUI applications (or windows with their own registry) may share
//! one store. A [`StorageChannel`] tells every other [`ContextId`] about a
//! write, the way a browser fires `storage` events in every document except
//! the one that wrote.

use crate::error::StorageError;
use crate::trace_log;
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

#[cfg(feature = "file-store")]
pub use file::FileStore;

// ============================================================================
// PersistentStore
// ============================================================================

/// Synchronous string key-value store.
///
/// Every operation may fail; callers in this crate log the failure and carry
/// on with their in-memory state.
pub trait PersistentStore: Send + Sync + 'static {
    /// Value stored under `key`, `None` when absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with `entries`.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            data: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Reject writes that would grow the total of key and value bytes past
    /// `bytes`.
    #[must_use]
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Make every `get` fail until switched off.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every `set` and `remove` fail until switched off.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Raw value, bypassing fault injection.
    pub fn peek(&self, key: &str) -> Option<String> {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.peek(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.data.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable("writes disabled"));
        }
        Ok(())
    }
}

impl PersistentStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StorageError::unavailable("reads disabled"));
        }
        let data = self
            .data
            .read()
            .map_err(|e| StorageError::unavailable(e.to_string()))?;
        Ok(data.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::unavailable(e.to_string()))?;

        if let Some(quota) = self.quota {
            let used: usize = data
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if used + key.len() + value.len() > quota {
                return Err(StorageError::quota_exceeded(key));
            }
        }

        data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        let mut data = self
            .data
            .write()
            .map_err(|e| StorageError::unavailable(e.to_string()))?;
        data.remove(key);
        Ok(())
    }
}

// ============================================================================
// FileStore
// ============================================================================

#[cfg(feature = "file-store")]
mod file {
    use super::PersistentStore;
    use crate::error::StorageError;
    use crate::{debug_log, warn_log};
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::RwLock;

    const FILE_VERSION: u32 = 1;

    #[derive(Debug, Default, Serialize, Deserialize)]
    struct StoreFile {
        version: u32,
        entries: BTreeMap<String, String>,
    }

    /// JSON-file backed store.
    ///
    /// The whole file is loaded on [`open`](FileStore::open) and rewritten on
    /// every `set`/`remove`. A failed write leaves both the file and the
    /// in-memory map untouched.
    #[derive(Debug)]
    pub struct FileStore {
        path: PathBuf,
        entries: RwLock<BTreeMap<String, String>>,
    }

    impl FileStore {
        /// Open `path`, starting empty if the file does not exist yet.
        pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
            let path = path.as_ref().to_path_buf();
            let entries = if path.exists() {
                let contents = fs::read_to_string(&path)?;
                let file: StoreFile = serde_json::from_str(&contents)?;
                if file.version > FILE_VERSION {
                    warn_log!(
                        "{} was written by a newer version ({}), reading it anyway",
                        path.display(),
                        file.version
                    );
                }
                debug_log!(
                    "Loaded {} entries from {}",
                    file.entries.len(),
                    path.display()
                );
                file.entries
            } else {
                BTreeMap::new()
            };
            Ok(Self {
                path,
                entries: RwLock::new(entries),
            })
        }

        pub fn path(&self) -> &Path {
            &self.path
        }

        fn write_file(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let file = StoreFile {
                version: FILE_VERSION,
                entries: entries.clone(),
            };
            let json = serde_json::to_string_pretty(&file)?;
            fs::write(&self.path, json)?;
            Ok(())
        }

        fn update<F>(&self, f: F) -> Result<(), StorageError>
        where
            F: FnOnce(&mut BTreeMap<String, String>),
        {
            let mut entries = self
                .entries
                .write()
                .map_err(|e| StorageError::unavailable(e.to_string()))?;
            let mut next = entries.clone();
            f(&mut next);
            self.write_file(&next)?;
            *entries = next;
            Ok(())
        }
    }

    impl PersistentStore for FileStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            let entries = self
                .entries
                .read()
                .map_err(|e| StorageError::unavailable(e.to_string()))?;
            Ok(entries.get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            self.update(|entries| {
                entries.insert(key.to_string(), value.to_string());
            })
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.update(|entries| {
                entries.remove(key);
            })
        }
    }
}

// ============================================================================
// Cross-context notification
// ============================================================================

/// Identifies one consumer of a shared store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u64);

impl ContextId {
    /// A fresh id, unique within the process.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ContextId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ctx#{}", self.0)
    }
}

/// A write to the shared store, as seen by the other contexts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    /// `None` when the key was removed.
    pub new_value: Option<String>,
    pub origin: ContextId,
}

impl StorageEvent {
    pub fn new(key: impl Into<String>, new_value: Option<String>, origin: ContextId) -> Self {
        Self {
            key: key.into(),
            new_value,
            origin,
        }
    }
}

/// Fan-out of [`StorageEvent`]s between contexts sharing one store.
///
/// Cloning shares the subscriber list.
#[derive(Debug, Clone, Default)]
pub struct StorageChannel {
    subscribers: Arc<Mutex<Vec<(ContextId, UnboundedSender<StorageEvent>)>>>,
}

impl StorageChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `context`; it receives every event emitted by other contexts.
    pub fn subscribe(&self, context: ContextId) -> StorageReceiver {
        let (tx, rx) = mpsc::unbounded();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((context, tx));
        StorageReceiver { context, rx }
    }

    /// Deliver `event` to every subscriber except its origin.
    ///
    /// Returns the number of contexts reached. Subscribers whose receiver was
    /// dropped are forgotten.
    pub fn emit(&self, event: &StorageEvent) -> usize {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|(_, tx)| !tx.is_closed());

        let mut delivered = 0;
        for (context, tx) in subscribers.iter() {
            if *context == event.origin {
                continue;
            }
            if tx.unbounded_send(event.clone()).is_ok() {
                delivered += 1;
            }
        }
        trace_log!(
            "Storage event for '{}' from {} delivered to {} contexts",
            event.key,
            event.origin,
            delivered
        );
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, tx)| !tx.is_closed())
            .count()
    }
}

/// Receiving end of a [`StorageChannel`] subscription.
#[derive(Debug)]
pub struct StorageReceiver {
    context: ContextId,
    rx: UnboundedReceiver<StorageEvent>,
}

impl StorageReceiver {
    pub fn context(&self) -> ContextId {
        self.context
    }

    /// Next pending event, without waiting.
    pub fn try_recv(&mut self) -> Option<StorageEvent> {
        self.rx.try_recv().ok()
    }

    /// Every pending event, oldest first.
    pub fn drain(&mut self) -> Vec<StorageEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    /// The underlying stream, for hosts that poll events from an executor.
    pub fn into_stream(self) -> UnboundedReceiver<StorageEvent> {
        self.rx
    }
}
