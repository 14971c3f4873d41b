//! Task store backends.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        TaskStore                              │
//! │   list_items()              -> all items with their column    │
//! │   update_item_container()   -> move one item, return it       │
//! └──────────────────────────────────────────────────────────────┘
//!        │                 │                        │
//!        ▼                 ▼                        ▼
//!   MemoryStore        FileStore            RecordingStore<S>
//!   (in-process)   (JSON, file-store)   (call log + failure switch)
//! ```
//!
//! # Design Invariants
//!
//! 1. **No panics**: every failure is a [`StoreError`].
//! 2. **Atomic writes**: [`FileStore`] writes `{path}.tmp`, syncs, then renames.
//! 3. **Idempotent updates**: re-issuing an update with the same container
//!    leaves the store unchanged.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | `StoreError::Io` | File I/O failure | Returned, store unchanged |
//! | `StoreError::Serialization` | JSON encode/decode | Returned |
//! | `StoreError::Corruption` | Lock poisoned, bad format version | Returned |
//! | `StoreError::NotFound` | Update for an unknown item | Returned, store unchanged |
//! | `StoreError::Unavailable` | Backend switched off | Returned |

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

use kanban_core::id::{ColumnId, ItemId};

use crate::record::Item;

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors returned by store operations.
#[derive(Debug)]
pub enum StoreError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// Serialization or deserialization error.
    Serialization(String),
    /// Store contents or internal state are invalid.
    Corruption(String),
    /// The item does not exist in the store.
    NotFound(ItemId),
    /// Backend is not reachable.
    Unavailable(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "I/O error: {e}"),
            StoreError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            StoreError::Corruption(msg) => write!(f, "store corruption: {msg}"),
            StoreError::NotFound(id) => write!(f, "item not found: {id}"),
            StoreError::Unavailable(msg) => write!(f, "store unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Serialization(_)
            | StoreError::Corruption(_)
            | StoreError::NotFound(_)
            | StoreError::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// ─────────────────────────────────────────────────────────────────────────────
// TaskStore Trait
// ─────────────────────────────────────────────────────────────────────────────

/// Backend holding the authoritative item list.
///
/// Implementations must be `Send + Sync`: updates run on the persistence
/// worker thread while the board reads on the interaction thread.
pub trait TaskStore: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// All items, each carrying its current container id.
    fn list_items(&self) -> StoreResult<Vec<Item>>;

    /// Set the item's container field and return the updated record.
    fn update_item_container(&self, id: &ItemId, container: &ColumnId) -> StoreResult<Item>;
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Store
// ─────────────────────────────────────────────────────────────────────────────

/// In-process store for tests, demos, and ephemeral boards.
#[derive(Default)]
pub struct MemoryStore {
    items: RwLock<Vec<Item>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with items.
    #[must_use]
    pub fn with_items(items: Vec<Item>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }
}

impl TaskStore for MemoryStore {
    fn name(&self) -> &str {
        "MemoryStore"
    }

    fn list_items(&self) -> StoreResult<Vec<Item>> {
        let guard = self
            .items
            .read()
            .map_err(|_| StoreError::Corruption("lock poisoned".into()))?;
        Ok(guard.clone())
    }

    fn update_item_container(&self, id: &ItemId, container: &ColumnId) -> StoreResult<Item> {
        let mut guard = self
            .items
            .write()
            .map_err(|_| StoreError::Corruption("lock poisoned".into()))?;
        let item = guard
            .iter_mut()
            .find(|item| &item.id == id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        item.container = container.clone();
        Ok(item.clone())
    }
}

impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.items.read().map(|g| g.len()).unwrap_or(0);
        f.debug_struct("MemoryStore").field("items", &count).finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Recording Store
// ─────────────────────────────────────────────────────────────────────────────

/// Decorator that logs every update call and can simulate outages.
///
/// Used by tests to assert "exactly one update was issued" and to exercise
/// the transient-failure path without a real network.
pub struct RecordingStore<S> {
    inner: S,
    calls: Mutex<Vec<(ItemId, ColumnId)>>,
    fail_updates: AtomicBool,
}

impl<S: TaskStore> RecordingStore<S> {
    /// Wrap a store.
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
            fail_updates: AtomicBool::new(false),
        }
    }

    /// Make subsequent updates fail with [`StoreError::Unavailable`].
    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Every update attempted so far, in call order (including failed ones).
    #[must_use]
    pub fn calls(&self) -> Vec<(ItemId, ColumnId)> {
        self.calls.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// The wrapped store.
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: TaskStore> TaskStore for RecordingStore<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn list_items(&self) -> StoreResult<Vec<Item>> {
        self.inner.list_items()
    }

    fn update_item_container(&self, id: &ItemId, container: &ColumnId) -> StoreResult<Item> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((id.clone(), container.clone()));
        }
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(format!(
                "{} rejected update",
                self.inner.name()
            )));
        }
        self.inner.update_item_container(id, container)
    }
}

impl<S> fmt::Debug for RecordingStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let calls = self.calls.lock().map(|g| g.len()).unwrap_or(0);
        f.debug_struct("RecordingStore")
            .field("calls", &calls)
            .field("fail_updates", &self.fail_updates.load(Ordering::SeqCst))
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Store (requires file-store feature)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "file-store")]
mod file_store {
    use super::*;
    use serde::{Deserialize, Serialize};
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, Write};
    use std::path::{Path, PathBuf};

    /// On-disk format.
    #[derive(Serialize, Deserialize)]
    struct BoardFile {
        /// Format version for future migrations.
        format_version: u32,
        items: Vec<Item>,
    }

    impl BoardFile {
        const FORMAT_VERSION: u32 = 1;
    }

    /// JSON file-backed store.
    ///
    /// # File Format
    ///
    /// ```json
    /// {
    ///   "format_version": 1,
    ///   "items": [
    ///     { "id": "T1", "container": "todo", "attributes": { "title": "Ship" } }
    ///   ]
    /// }
    /// ```
    ///
    /// Updates are read-modify-write under an in-process lock; concurrent
    /// writers in other processes are last-write-wins.
    pub struct FileStore {
        path: PathBuf,
        write_lock: Mutex<()>,
    }

    impl FileStore {
        /// Create a store at the given path. The file is created on first write.
        #[must_use]
        pub fn new(path: impl AsRef<Path>) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
                write_lock: Mutex::new(()),
            }
        }

        /// Create or overwrite the file with `items`.
        pub fn seed(&self, items: &[Item]) -> StoreResult<()> {
            let _guard = self
                .write_lock
                .lock()
                .map_err(|_| StoreError::Corruption("lock poisoned".into()))?;
            self.write_items(items)
        }

        /// Path of the backing file.
        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn temp_path(&self) -> PathBuf {
            let mut tmp = self.path.clone();
            tmp.set_extension("json.tmp");
            tmp
        }

        fn read_items(&self) -> StoreResult<Vec<Item>> {
            if !self.path.exists() {
                return Ok(Vec::new());
            }
            let reader = BufReader::new(File::open(&self.path)?);
            let file: BoardFile = serde_json::from_reader(reader).map_err(|e| {
                StoreError::Serialization(format!("failed to parse board file: {e}"))
            })?;
            if file.format_version != BoardFile::FORMAT_VERSION {
                return Err(StoreError::Corruption(format!(
                    "unsupported format version {} (expected {})",
                    file.format_version,
                    BoardFile::FORMAT_VERSION
                )));
            }
            Ok(file.items)
        }

        fn write_items(&self, items: &[Item]) -> StoreResult<()> {
            if let Some(parent) = self.path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }

            let file = BoardFile {
                format_version: BoardFile::FORMAT_VERSION,
                items: items.to_vec(),
            };

            let tmp_path = self.temp_path();
            {
                let mut writer = BufWriter::new(File::create(&tmp_path)?);
                serde_json::to_writer_pretty(&mut writer, &file).map_err(|e| {
                    StoreError::Serialization(format!("failed to serialize board: {e}"))
                })?;
                writer.flush()?;
                writer.get_ref().sync_all()?;
            }
            fs::rename(&tmp_path, &self.path)?;

            kanban_core::debug!(
                path = %self.path.display(),
                items = items.len(),
                "wrote board file"
            );
            Ok(())
        }
    }

    impl TaskStore for FileStore {
        fn name(&self) -> &str {
            "FileStore"
        }

        fn list_items(&self) -> StoreResult<Vec<Item>> {
            self.read_items()
        }

        fn update_item_container(&self, id: &ItemId, container: &ColumnId) -> StoreResult<Item> {
            let _guard = self
                .write_lock
                .lock()
                .map_err(|_| StoreError::Corruption("lock poisoned".into()))?;
            let mut items = self.read_items()?;
            let item = items
                .iter_mut()
                .find(|item| &item.id == id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            if &item.container == container {
                return Ok(item.clone());
            }
            item.container = container.clone();
            let updated = item.clone();
            self.write_items(&items)?;
            Ok(updated)
        }
    }

    impl fmt::Debug for FileStore {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("FileStore").field("path", &self.path).finish()
        }
    }
}

#[cfg(feature = "file-store")]
pub use file_store::FileStore;
