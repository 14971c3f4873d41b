#![forbid(unsafe_code)]

//! Store access and optimistic persistence for the kanban board.
//!
//! - [`record::Item`] is the store's view of a work item.
//! - [`store::TaskStore`] is the two-operation backend contract
//!   (`list_items`, `update_item_container`).
//! - [`sync::PersistenceSync`] issues container updates off the interaction
//!   thread and reports results as [`sync::SyncEvent`]s.

pub mod record;
pub mod store;
pub mod sync;

pub use record::Item;
pub use store::{MemoryStore, RecordingStore, StoreError, StoreResult, TaskStore};
#[cfg(feature = "file-store")]
pub use store::FileStore;
pub use sync::{PersistenceSync, SyncConfig, SyncError, SyncEvent};
