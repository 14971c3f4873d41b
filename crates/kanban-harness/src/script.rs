#![forbid(unsafe_code)]

//! Recorded drag scripts and their replay.
//!
//! A script is a JSON document holding the initial columns and item
//! records, the [`DragEvent`]s to apply, and optionally the expected final
//! board:
//!
//! ```json
//! {
//!   "columns": [{ "id": "todo", "name": "Todo" }, { "id": "done", "name": "Done" }],
//!   "items": [{ "id": "T1", "container": "todo" }],
//!   "events": [
//!     { "type": "start", "active": { "kind": "item", "id": "T1" } },
//!     { "type": "end", "active": { "kind": "item", "id": "T1" },
//!       "probe": { "kind": "keyboard", "target": { "kind": "column", "id": "done" },
//!                  "position": "append" } }
//!   ],
//!   "expect": [{ "column": "done", "items": ["T1"] }]
//! }
//! ```
//!
//! # Replay checks
//!
//! After every event the board must hold exactly the item set it started
//! with, each item in one column, once. Rejected events are counted, not
//! fatal: a script may deliberately probe the engine's guards.

use std::collections::VecDeque;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use kanban_core::event::Event;
use kanban_core::id::{ColumnId, ItemId};
use kanban_dnd::{
    AdapterContext, Board, ColumnSpec, DndConfig, DragEvent, DragReport, DropOutcome,
    InputAdapter, InvariantViolation, MoveEngine, SettlePolicy,
};
use kanban_sync::{
    Item, MemoryStore, PersistenceSync, RecordingStore, SyncConfig, SyncError, SyncEvent,
};
use serde::{Deserialize, Serialize};

/// Replays a fixed list of drag events.
///
/// As an [`InputAdapter`] every raw event advances the script by one step,
/// so a script can be driven by any event pump (ticks included).
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    pending: VecDeque<DragEvent>,
    dragging: bool,
}

impl ScriptedInput {
    #[must_use]
    pub fn new(events: impl IntoIterator<Item = DragEvent>) -> Self {
        Self {
            pending: events.into_iter().collect(),
            dragging: false,
        }
    }

    /// Parse a JSON array of drag events.
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        let events: Vec<DragEvent> = serde_json::from_str(json)?;
        Ok(Self::new(events))
    }

    /// Events not yet delivered.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    fn advance(&mut self) -> Option<DragEvent> {
        let event = self.pending.pop_front()?;
        match &event {
            DragEvent::Start { .. } => self.dragging = true,
            DragEvent::End { .. } | DragEvent::Cancel { .. } => self.dragging = false,
            DragEvent::Over { .. } | DragEvent::Settle => {}
        }
        Some(event)
    }
}

impl Iterator for ScriptedInput {
    type Item = DragEvent;

    fn next(&mut self) -> Option<DragEvent> {
        self.advance()
    }
}

impl InputAdapter for ScriptedInput {
    fn handle(&mut self, _event: &Event, _ctx: AdapterContext<'_>) -> Option<DragEvent> {
        self.advance()
    }

    fn is_dragging(&self) -> bool {
        self.dragging
    }

    fn reset(&mut self) {
        self.dragging = false;
    }
}

/// Expected contents of one column after replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedColumn {
    pub column: ColumnId,
    pub items: Vec<ItemId>,
}

/// A recorded drag session with its starting board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub columns: Vec<ColumnSpec>,
    pub items: Vec<Item>,
    pub events: Vec<DragEvent>,
    /// Settle policy name, as accepted by [`SettlePolicy`]'s `FromStr`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settle: Option<String>,
    /// Make every store update fail.
    #[serde(default)]
    pub fail_updates: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expect: Vec<ExpectedColumn>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    fn config(&self) -> Result<DndConfig, ReplayError> {
        let mut config = DndConfig::default();
        if let Some(name) = &self.settle {
            let settle: SettlePolicy = name
                .parse()
                .map_err(|_| ReplayError::Config(format!("unknown settle policy {name:?}")))?;
            config = config.with_settle(settle);
        }
        Ok(config)
    }
}

/// What a replay did.
#[derive(Debug, Clone)]
pub struct ReplaySummary {
    /// Events applied (accepted or rejected).
    pub events: usize,
    /// Events the engine refused.
    pub rejected: usize,
    pub commits: usize,
    pub aborted: usize,
    pub cancelled: usize,
    /// Updates the store received, in order.
    pub persisted: Vec<(ItemId, ColumnId)>,
    /// Updates the store failed.
    pub failed: usize,
    /// Board after the last event.
    pub board: Board,
}

/// Replay failures.
#[derive(Debug)]
pub enum ReplayError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Config(String),
    Sync(SyncError),
    /// The board broke its structure after event `step`.
    Invariant {
        step: usize,
        violation: InvariantViolation,
    },
    /// The item set changed after event `step`.
    Conservation { step: usize },
    /// Final board disagrees with the script's expectation.
    Mismatch {
        column: ColumnId,
        expected: Vec<ItemId>,
        actual: Option<Vec<ItemId>>,
    },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Parse(e) => write!(f, "script parse error: {e}"),
            Self::Config(msg) => write!(f, "script config error: {msg}"),
            Self::Sync(e) => write!(f, "{e}"),
            Self::Invariant { step, violation } => {
                write!(f, "board invariant broken after event {step}: {violation}")
            }
            Self::Conservation { step } => {
                write!(f, "item set changed after event {step}")
            }
            Self::Mismatch {
                column,
                expected,
                actual,
            } => match actual {
                Some(actual) => write!(
                    f,
                    "column {column}: expected {}, got {}",
                    join(expected),
                    join(actual)
                ),
                None => write!(f, "column {column} is not on the board"),
            },
        }
    }
}

fn join(ids: &[ItemId]) -> String {
    let parts: Vec<&str> = ids.iter().map(ItemId::as_str).collect();
    format!("[{}]", parts.join(", "))
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
            Self::Sync(e) => Some(e),
            Self::Invariant { violation, .. } => Some(violation),
            Self::Config(_) | Self::Conservation { .. } | Self::Mismatch { .. } => None,
        }
    }
}

impl From<std::io::Error> for ReplayError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for ReplayError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

impl From<SyncError> for ReplayError {
    fn from(e: SyncError) -> Self {
        Self::Sync(e)
    }
}

fn sorted_ids(board: &Board) -> Vec<ItemId> {
    let mut ids: Vec<ItemId> = board.item_ids().cloned().collect();
    ids.sort();
    ids
}

/// Check `board` is well formed and holds exactly `expected` (sorted).
pub fn check_board(board: &Board, expected: &[ItemId], step: usize) -> Result<(), ReplayError> {
    board
        .check_invariants()
        .map_err(|violation| ReplayError::Invariant { step, violation })?;
    if sorted_ids(board) != expected {
        return Err(ReplayError::Conservation { step });
    }
    Ok(())
}

/// Replay `script` against an in-memory store and verify it.
pub fn replay(script: &Script) -> Result<ReplaySummary, ReplayError> {
    let config = script.config()?;
    let board = Board::from_items(&script.columns, script.items.iter().cloned());
    let store = Arc::new(RecordingStore::new(MemoryStore::with_items(
        script.items.clone(),
    )));
    store.set_fail_updates(script.fail_updates);
    let sync = PersistenceSync::start(store.clone(), SyncConfig::default())?;
    let mut engine = MoveEngine::new(board, config).with_sync(sync);

    let expected = sorted_ids(engine.board());
    check_board(engine.board(), &expected, 0)?;

    let mut summary = ReplaySummary {
        events: 0,
        rejected: 0,
        commits: 0,
        aborted: 0,
        cancelled: 0,
        persisted: Vec::new(),
        failed: 0,
        board: Board::default(),
    };

    for (step, event) in ScriptedInput::new(script.events.iter().cloned()).enumerate() {
        summary.events += 1;
        match engine.apply(&event) {
            Ok(DragReport::Dropped(DropOutcome::Committed(_))) => summary.commits += 1,
            Ok(DragReport::Dropped(DropOutcome::Aborted)) => summary.aborted += 1,
            Ok(DragReport::Cancelled) => summary.cancelled += 1,
            Ok(_) => {}
            Err(e) => {
                kanban_core::debug!(step = step + 1, error = %e, "scripted event rejected");
                summary.rejected += 1;
            }
        }
        check_board(engine.board(), &expected, step + 1)?;
    }

    if let Some(sync) = engine.sync() {
        sync.flush();
    }
    summary.failed = engine
        .drain_sync_events()
        .iter()
        .filter(|e| matches!(e, SyncEvent::Failed { .. }))
        .count();
    summary.persisted = store.calls();

    for want in &script.expect {
        let actual = engine.board().column(&want.column).map(|c| c.items().to_vec());
        if actual.as_deref() != Some(want.items.as_slice()) {
            return Err(ReplayError::Mismatch {
                column: want.column.clone(),
                expected: want.items.clone(),
                actual,
            });
        }
    }

    summary.board = engine.board().clone();
    Ok(summary)
}

/// [`Script::load`] then [`replay`].
pub fn replay_file(path: &Path) -> Result<ReplaySummary, ReplayError> {
    replay(&Script::load(path)?)
}
