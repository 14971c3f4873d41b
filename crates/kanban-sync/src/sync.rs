//! Optimistic, fire-and-forget persistence of committed moves.
//!
//! The board applies a move locally first; [`PersistenceSync::submit`] then
//! hands the container update to a dedicated worker thread and returns
//! immediately. The interaction never waits on the store.
//!
//! # Invariants
//!
//! 1. At most one update per item is outstanding: updates for an item that
//!    are still queued are coalesced to the most recent container.
//! 2. Updates for distinct items are independent; no ordering is promised
//!    between them.
//! 3. A failed update is reported once as [`SyncEvent::Failed`] and never
//!    retried. Local state is not rolled back; the next board reload
//!    converges.
//!
//! # Shutdown
//!
//! Dropping the handle drains the queue, then joins the worker.

use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use kanban_core::id::{ColumnId, ItemId};

use crate::record::Item;
use crate::store::TaskStore;

/// Worker configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Name of the worker thread (default: `kanban-sync`).
    pub thread_name: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            thread_name: "kanban-sync".into(),
        }
    }
}

impl SyncConfig {
    /// Set the worker thread name.
    #[must_use]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }
}

/// Outcome of one outbound update, delivered as a non-blocking notification.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// The store accepted the update.
    Committed(Item),
    /// The store rejected the update; the local board keeps the move.
    Failed {
        item: ItemId,
        container: ColumnId,
        error: String,
    },
}

/// Errors starting the persistence worker.
#[derive(Debug)]
pub enum SyncError {
    /// The worker thread could not be spawned.
    Spawn(std::io::Error),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncError::Spawn(e) => write!(f, "failed to spawn persistence worker: {e}"),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Spawn(e) => Some(e),
        }
    }
}

enum SyncCommand {
    Update { item: ItemId, container: ColumnId },
    Flush(Sender<()>),
    Shutdown,
}

/// Handle to the persistence worker.
pub struct PersistenceSync {
    sender: Sender<SyncCommand>,
    events: Receiver<SyncEvent>,
    handle: Option<JoinHandle<()>>,
    store_name: String,
}

impl PersistenceSync {
    /// Spawn the worker for `store`.
    pub fn start(store: Arc<dyn TaskStore>, config: SyncConfig) -> Result<Self, SyncError> {
        let (tx, rx) = mpsc::channel::<SyncCommand>();
        let (event_tx, event_rx) = mpsc::channel::<SyncEvent>();
        let store_name = store.name().to_owned();
        let handle = thread::Builder::new()
            .name(config.thread_name)
            .spawn(move || sync_loop(store, rx, event_tx))
            .map_err(SyncError::Spawn)?;

        Ok(Self {
            sender: tx,
            events: event_rx,
            handle: Some(handle),
            store_name,
        })
    }

    /// Queue `item -> container`. Returns `false` if the worker is gone.
    pub fn submit(&self, item: ItemId, container: ColumnId) -> bool {
        kanban_core::debug!(item = %item, container = %container, "queue container update");
        let sent = self
            .sender
            .send(SyncCommand::Update { item, container })
            .is_ok();
        if !sent {
            kanban_core::warn!(store = %self.store_name, "persistence worker stopped; update dropped");
        }
        sent
    }

    /// Block until every update submitted before this call has been attempted.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = mpsc::channel();
        if self.sender.send(SyncCommand::Flush(ack_tx)).is_ok() {
            let _ = ack_rx.recv();
        }
    }

    /// Next pending notification, if any. Never blocks.
    pub fn try_next_event(&self) -> Option<SyncEvent> {
        self.events.try_recv().ok()
    }

    /// All pending notifications. Never blocks.
    pub fn drain_events(&self) -> Vec<SyncEvent> {
        self.events.try_iter().collect()
    }

    /// Name of the backing store.
    #[must_use]
    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    fn shutdown(&mut self) {
        let _ = self.sender.send(SyncCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PersistenceSync {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for PersistenceSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistenceSync")
            .field("store", &self.store_name)
            .field("running", &self.handle.is_some())
            .finish()
    }
}

/// Updates received in one batch, coalesced per item.
#[derive(Default)]
struct Batch {
    updates: Vec<(ItemId, ColumnId)>,
    flushes: Vec<Sender<()>>,
    shutdown: bool,
}

impl Batch {
    fn absorb(&mut self, cmd: SyncCommand) {
        match cmd {
            SyncCommand::Update { item, container } => {
                if let Some(slot) = self.updates.iter_mut().find(|(id, _)| *id == item) {
                    slot.1 = container;
                } else {
                    self.updates.push((item, container));
                }
            }
            SyncCommand::Flush(ack) => self.flushes.push(ack),
            SyncCommand::Shutdown => self.shutdown = true,
        }
    }
}

fn sync_loop(store: Arc<dyn TaskStore>, rx: Receiver<SyncCommand>, events: Sender<SyncEvent>) {
    loop {
        let Ok(first) = rx.recv() else {
            return;
        };
        let mut batch = Batch::default();
        batch.absorb(first);
        while let Ok(cmd) = rx.try_recv() {
            batch.absorb(cmd);
        }

        for (item, container) in batch.updates {
            let event = match store.update_item_container(&item, &container) {
                Ok(updated) => {
                    kanban_core::debug!(item = %item, container = %container, "container update committed");
                    SyncEvent::Committed(updated)
                }
                Err(e) => {
                    kanban_core::warn!(
                        store = store.name(),
                        item = %item,
                        container = %container,
                        error = %e,
                        "container update failed; keeping local state"
                    );
                    SyncEvent::Failed {
                        item,
                        container,
                        error: e.to_string(),
                    }
                }
            };
            let _ = events.send(event);
        }

        for ack in batch.flushes {
            let _ = ack.send(());
        }
        if batch.shutdown {
            return;
        }
    }
}
