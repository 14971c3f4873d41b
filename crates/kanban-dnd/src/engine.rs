#![forbid(unsafe_code)]

//! The move engine: sole owner and writer of the board.
//!
//! # State machine
//!
//! ```text
//! Idle --start--> Dragging --over*--> Dragging --end/cancel--> Idle
//! ```
//!
//! # Invariants
//!
//! 1. Every item id on the board is in exactly one column, exactly once.
//! 2. A [`DragSession`] exists iff a drag is in progress.
//! 3. Column identity never changes during a drag.
//! 4. Cancel restores the board exactly as it was at start.
//! 5. A drop submits at most one persistence update, and only when the
//!    item's final column or index differs from where it was picked up.
//!
//! # Failure modes
//!
//! - An unresolved target on `over` is a no-op; the drag continues.
//! - An unresolved target on `end` aborts the drop and restores the board.
//! - Events naming an unknown id fail with [`DndError::UnknownId`] and
//!   leave the board valid. On `end` the drag is also aborted.
//! - Events naming an element other than the active one fail with
//!   [`DndError::ActiveMismatch`] and change nothing.

use kanban_core::id::{ColumnId, ItemId};
use kanban_sync::{PersistenceSync, SyncEvent, TaskStore};

use crate::board::Board;
use crate::collision::{self, CollisionInput};
use crate::config::DndConfig;
use crate::error::{DndError, DndResult};
use crate::id::DndId;
use crate::input::{DragEvent, Probe};
use crate::keyboard::{self, Direction};
use crate::position::DropPosition;
use crate::session::DragSession;

/// Result of an `over` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverOutcome {
    /// Target found; nothing moved.
    Unchanged,
    /// No target this frame.
    Unresolved,
    /// The item moved to another column.
    Relocated {
        from: ColumnId,
        to: ColumnId,
        index: usize,
    },
}

/// A committed item move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub item: ItemId,
    pub from: ColumnId,
    pub to: ColumnId,
    /// Final index in `to`.
    pub index: usize,
    /// Whether an update was handed to persistence.
    pub persisted: bool,
}

/// Result of a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// The item ended somewhere new.
    Committed(Commit),
    /// The item ended where it started.
    Unchanged,
    /// No target; the board was restored.
    Aborted,
    /// A column drag moved the column.
    ColumnsReordered {
        column: ColumnId,
        from: usize,
        to: usize,
    },
}

/// What [`MoveEngine::apply`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragReport {
    Started,
    Over(OverOutcome),
    Dropped(DropOutcome),
    Cancelled,
    /// Settle tick; `true` if the settle flag was cleared.
    Settled(bool),
}

/// Owns the board and applies drag events to it.
#[derive(Debug)]
pub struct MoveEngine {
    board: Board,
    session: Option<DragSession>,
    config: DndConfig,
    sync: Option<PersistenceSync>,
}

impl MoveEngine {
    /// Engine without persistence.
    #[must_use]
    pub fn new(board: Board, config: DndConfig) -> Self {
        Self {
            board,
            session: None,
            config,
            sync: None,
        }
    }

    /// Hand committed moves to `sync`.
    #[must_use]
    pub fn with_sync(mut self, sync: PersistenceSync) -> Self {
        self.sync = Some(sync);
        self
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn config(&self) -> &DndConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub fn sync(&self) -> Option<&PersistenceSync> {
        self.sync.as_ref()
    }

    /// Pending persistence notifications. Never blocks.
    pub fn drain_sync_events(&self) -> Vec<SyncEvent> {
        self.sync
            .as_ref()
            .map(PersistenceSync::drain_events)
            .unwrap_or_default()
    }

    /// The column owning `id`, or `id` itself when it names a column.
    pub fn resolve_column(&self, id: &DndId) -> DndResult<ColumnId> {
        let index = self.column_index_of(id)?;
        Ok(self.board.columns()[index].id().clone())
    }

    fn column_index_of(&self, id: &DndId) -> DndResult<usize> {
        let index = match id {
            DndId::Column(column) => self.board.column_index(column),
            DndId::Item(item) => self.board.locate(item).map(|(ci, _)| ci),
        };
        index.ok_or_else(|| DndError::UnknownId(id.clone()))
    }

    fn check_active(&self, active: &DndId) -> DndResult<()> {
        let session = self.session.as_ref().ok_or(DndError::NotDragging)?;
        if session.active() != active {
            kanban_core::warn!(active = %session.active(), got = %active, "event for inactive element");
            return Err(DndError::ActiveMismatch {
                active: session.active().clone(),
                got: active.clone(),
            });
        }
        Ok(())
    }

    /// Begin dragging `active`.
    pub fn on_drag_start(&mut self, active: DndId) -> DndResult<()> {
        if let Some(session) = &self.session {
            kanban_core::warn!(active = %session.active(), got = %active, "drag start while dragging");
            return Err(DndError::AlreadyDragging {
                active: session.active().clone(),
            });
        }
        let (source, origin) = match &active {
            DndId::Item(item) => {
                let (ci, ii) = self
                    .board
                    .locate(item)
                    .ok_or_else(|| DndError::UnknownId(active.clone()))?;
                (self.board.columns()[ci].id().clone(), ii)
            }
            DndId::Column(column) => {
                let ci = self
                    .board
                    .column_index(column)
                    .ok_or_else(|| DndError::UnknownId(active.clone()))?;
                (column.clone(), ci)
            }
        };
        kanban_core::debug!(active = %active, column = %source, index = origin, "drag start");
        self.session = Some(DragSession::new(
            active,
            source,
            origin,
            self.board.clone(),
        ));
        Ok(())
    }

    /// Resolve what `probe` points at.
    fn target_for(
        &mut self,
        active: &DndId,
        probe: &Probe,
    ) -> DndResult<Option<(DndId, DropPosition)>> {
        let policy = self.config.settle;
        let session = self.session.as_mut().ok_or(DndError::NotDragging)?;
        let (target, position) = match probe {
            Probe::Keyboard { target, position } => (target.clone(), *position),
            Probe::Pointer {
                pointer,
                active_rect,
                candidates,
            } => {
                let resolution = collision::resolve(&CollisionInput {
                    active,
                    pointer: *pointer,
                    active_rect: *active_rect,
                    droppables: candidates,
                    board: &self.board,
                    just_relocated: session.just_relocated(),
                    last_resolved: session.last_resolved(),
                });
                session.evaluated(policy);
                let Some(resolution) = resolution else {
                    kanban_core::trace!(active = %active, "no target");
                    return Ok(None);
                };
                kanban_core::trace!(
                    active = %active,
                    target = %resolution.target,
                    rule = ?resolution.rule,
                    "resolved"
                );
                let position = match &resolution.target {
                    DndId::Item(_) => candidates
                        .iter()
                        .find(|d| d.id == resolution.target)
                        .map_or(DropPosition::Before, |d| {
                            DropPosition::from_pointer(pointer.y, d.rect)
                        }),
                    DndId::Column(_) => DropPosition::Append,
                };
                (resolution.target, position)
            }
        };
        Ok(Some((target, position)))
    }

    /// Handle an `over` event.
    pub fn on_drag_over(&mut self, active: &DndId, probe: &Probe) -> DndResult<OverOutcome> {
        self.check_active(active)?;
        let Some((target, position)) = self.target_for(active, probe)? else {
            return Ok(OverOutcome::Unresolved);
        };
        // Only targets that are on the board become the fallback.
        self.column_index_of(&target)?;
        if let Some(session) = self.session.as_mut() {
            session.record_resolution(target.clone());
        }
        self.relocate(active, &target, position)
    }

    /// Move the active item into `target`'s column if it is elsewhere.
    ///
    /// Same-column targets change nothing here; in-column reordering waits
    /// for the drop. Column drags never relocate.
    pub fn relocate(
        &mut self,
        active: &DndId,
        target: &DndId,
        position: DropPosition,
    ) -> DndResult<OverOutcome> {
        self.check_active(active)?;
        let DndId::Item(item) = active else {
            return Ok(OverOutcome::Unchanged);
        };
        let src = self.column_index_of(active)?;
        let dst = self.column_index_of(target)?;
        if src == dst {
            return Ok(OverOutcome::Unchanged);
        }

        let index = self.move_across(item, dst, target, position);
        let policy = self.config.settle;
        if let Some(session) = self.session.as_mut() {
            session.record_relocation(policy);
        }
        let from = self.board.columns()[src].id().clone();
        let to = self.board.columns()[dst].id().clone();
        kanban_core::debug!(item = %item, from = %from, to = %to, index, "relocated");
        Ok(OverOutcome::Relocated { from, to, index })
    }

    fn move_across(
        &mut self,
        item: &ItemId,
        dst: usize,
        target: &DndId,
        position: DropPosition,
    ) -> usize {
        self.board.remove_item(item);
        let column = &self.board.columns()[dst];
        let index = match target {
            DndId::Item(at) => column
                .position(at)
                .map_or(column.len(), |ti| position.insertion_index(ti, column.len())),
            DndId::Column(_) => column.len(),
        };
        self.board.insert_item(dst, index, item.clone())
    }

    /// Handle a release. `probe: None` means nothing was under the drag.
    pub fn on_drag_end(&mut self, active: &DndId, probe: Option<&Probe>) -> DndResult<DropOutcome> {
        self.check_active(active)?;
        let target = match probe {
            Some(probe) => self.target_for(active, probe)?,
            None => None,
        };
        self.finish(active, target)
    }

    /// Drop on an already-resolved target.
    pub fn drop_at(&mut self, active: &DndId, target: Option<&DndId>) -> DndResult<DropOutcome> {
        self.check_active(active)?;
        self.finish(active, target.map(|t| (t.clone(), DropPosition::Before)))
    }

    fn finish(
        &mut self,
        active: &DndId,
        target: Option<(DndId, DropPosition)>,
    ) -> DndResult<DropOutcome> {
        let Some((target, position)) = target else {
            kanban_core::debug!(active = %active, "drop without target; restoring");
            self.restore();
            return Ok(DropOutcome::Aborted);
        };
        let result = match active {
            DndId::Item(item) => self.finish_item(item, &target, position),
            DndId::Column(column) => self.finish_column(column, &target),
        };
        match result {
            Ok(outcome) => {
                self.session = None;
                kanban_core::debug!(active = %active, outcome = ?outcome, "drop");
                Ok(outcome)
            }
            Err(e) => {
                kanban_core::warn!(active = %active, error = %e, "drop failed; restoring");
                self.restore();
                Err(e)
            }
        }
    }

    fn finish_item(
        &mut self,
        item: &ItemId,
        target: &DndId,
        position: DropPosition,
    ) -> DndResult<DropOutcome> {
        let dst = self.column_index_of(target)?;
        let (current, index) = self
            .board
            .locate(item)
            .ok_or_else(|| DndError::UnknownId(DndId::Item(item.clone())))?;
        let session = self.session.as_ref().ok_or(DndError::NotDragging)?;

        // After a cross-column relocation the item already sits where it
        // was dropped; the drop only commits.
        if current != dst {
            self.move_across(item, dst, target, position);
        } else if session.relocations() == 0
            && let DndId::Item(at) = target
            && let Some(to) = self.board.columns()[current].position(at)
        {
            self.board.move_within(current, index, to);
        }

        let (column, index) = self
            .board
            .locate(item)
            .ok_or_else(|| DndError::UnknownId(DndId::Item(item.clone())))?;
        let session = self.session.as_ref().ok_or(DndError::NotDragging)?;
        let to = self.board.columns()[column].id().clone();
        if &to == session.source_column() && index == session.origin_index() {
            return Ok(DropOutcome::Unchanged);
        }

        let from = session.source_column().clone();
        let persisted = self
            .sync
            .as_ref()
            .is_some_and(|sync| sync.submit(item.clone(), to.clone()));
        Ok(DropOutcome::Committed(Commit {
            item: item.clone(),
            from,
            to,
            index,
            persisted,
        }))
    }

    fn finish_column(&mut self, column: &ColumnId, target: &DndId) -> DndResult<DropOutcome> {
        let to = self.column_index_of(target)?;
        let from = self
            .board
            .column_index(column)
            .ok_or_else(|| DndError::UnknownId(DndId::Column(column.clone())))?;
        if from == to {
            return Ok(DropOutcome::Unchanged);
        }
        self.board.move_column(from, to);
        Ok(DropOutcome::ColumnsReordered {
            column: column.clone(),
            from,
            to,
        })
    }

    /// Abandon the drag and restore the board as it was at start.
    pub fn on_drag_cancel(&mut self, active: &DndId) -> DndResult<()> {
        self.check_active(active)?;
        kanban_core::debug!(active = %active, "drag cancelled");
        self.restore();
        Ok(())
    }

    fn restore(&mut self) {
        if let Some(session) = self.session.take() {
            self.board = session.into_snapshot();
        }
    }

    /// The settle tick. Returns whether the settle flag was cleared.
    pub fn settle(&mut self) -> bool {
        self.session.as_mut().is_some_and(DragSession::settle)
    }

    /// Move `item` one step as a complete start, over and drop.
    ///
    /// A step off the edge of the board is [`DropOutcome::Unchanged`].
    pub fn keyboard_move(&mut self, item: &ItemId, direction: Direction) -> DndResult<DropOutcome> {
        let active = DndId::Item(item.clone());
        if self.board.locate(item).is_none() {
            return Err(DndError::UnknownId(active));
        }
        let Some((target, position)) = keyboard::step_target(&self.board, item, direction) else {
            return Ok(DropOutcome::Unchanged);
        };
        let probe = Probe::Keyboard { target, position };
        self.on_drag_start(active.clone())?;
        if let Err(e) = self.on_drag_over(&active, &probe) {
            self.restore();
            return Err(e);
        }
        self.on_drag_end(&active, Some(&probe))
    }

    /// Apply one adapter event.
    pub fn apply(&mut self, event: &DragEvent) -> DndResult<DragReport> {
        match event {
            DragEvent::Start { active } => {
                self.on_drag_start(active.clone()).map(|()| DragReport::Started)
            }
            DragEvent::Over { active, probe } => {
                self.on_drag_over(active, probe).map(DragReport::Over)
            }
            DragEvent::End { active, probe } => self
                .on_drag_end(active, probe.as_ref())
                .map(DragReport::Dropped),
            DragEvent::Cancel { active } => {
                self.on_drag_cancel(active).map(|()| DragReport::Cancelled)
            }
            DragEvent::Settle => Ok(DragReport::Settled(self.settle())),
        }
    }

    /// Rebuild the board from fresh records. Only while idle.
    pub fn reload(&mut self, items: Vec<kanban_sync::Item>) -> DndResult<()> {
        if let Some(session) = &self.session {
            return Err(DndError::AlreadyDragging {
                active: session.active().clone(),
            });
        }
        self.board = Board::from_items(&self.board.specs(), items);
        kanban_core::debug!(items = self.board.item_count(), "board reloaded");
        Ok(())
    }

    /// Rebuild the board from `store`. Only while idle.
    pub fn reload_from(&mut self, store: &dyn TaskStore) -> DndResult<()> {
        if let Some(session) = &self.session {
            return Err(DndError::AlreadyDragging {
                active: session.active().clone(),
            });
        }
        let items = store.list_items()?;
        self.reload(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Column;
    use crate::config::SettlePolicy;
    use crate::droppable::Droppable;
    use kanban_core::geometry::{Position, Rect};

    fn engine() -> MoveEngine {
        MoveEngine::new(
            Board::new(vec![
                Column::new("todo", "Todo").with_items(["T1", "T2", "T3"]),
                Column::new("doing", "In Progress").with_items(["T4"]),
                Column::new("done", "Done"),
            ]),
            DndConfig::default(),
        )
    }

    fn items(engine: &MoveEngine, column: &str) -> Vec<String> {
        engine
            .board()
            .column(&ColumnId::from(column))
            .map(|c| c.items().iter().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    fn kb(target: DndId, position: DropPosition) -> Probe {
        Probe::Keyboard { target, position }
    }

    #[test]
    fn resolve_column_for_items_and_columns() {
        let e = engine();
        assert_eq!(
            e.resolve_column(&DndId::item("T4")).unwrap(),
            ColumnId::from("doing")
        );
        assert_eq!(
            e.resolve_column(&DndId::column("done")).unwrap(),
            ColumnId::from("done")
        );
        assert!(matches!(
            e.resolve_column(&DndId::item("nope")),
            Err(DndError::UnknownId(_))
        ));
    }

    #[test]
    fn second_start_is_rejected() {
        let mut e = engine();
        e.on_drag_start(DndId::item("T1")).unwrap();
        let err = e.on_drag_start(DndId::item("T2")).unwrap_err();
        assert!(matches!(err, DndError::AlreadyDragging { .. }));
        assert_eq!(e.session().unwrap().active(), &DndId::item("T1"));
    }

    #[test]
    fn start_unknown_id_fails_without_session() {
        let mut e = engine();
        assert!(e.on_drag_start(DndId::item("ghost")).is_err());
        assert!(!e.is_dragging());
    }

    #[test]
    fn over_another_column_relocates_before_target() {
        let mut e = engine();
        let active = DndId::item("T1");
        e.on_drag_start(active.clone()).unwrap();
        let out = e
            .on_drag_over(&active, &kb(DndId::item("T4"), DropPosition::Before))
            .unwrap();
        assert_eq!(
            out,
            OverOutcome::Relocated {
                from: ColumnId::from("todo"),
                to: ColumnId::from("doing"),
                index: 0
            }
        );
        assert_eq!(items(&e, "doing"), ["T1", "T4"]);
        assert_eq!(items(&e, "todo"), ["T2", "T3"]);
    }

    #[test]
    fn below_half_inserts_after() {
        let mut e = engine();
        let active = DndId::item("T1");
        e.on_drag_start(active.clone()).unwrap();
        let probe = Probe::Pointer {
            pointer: Position::new(30, 4),
            active_rect: Rect::new(21, 3, 18, 3),
            candidates: vec![
                Droppable::new(DndId::column("doing"), Rect::new(20, 0, 20, 30)),
                Droppable::new(DndId::item("T4"), Rect::new(21, 2, 18, 3)),
            ],
        };
        e.on_drag_over(&active, &probe).unwrap();
        assert_eq!(items(&e, "doing"), ["T4", "T1"]);
    }

    #[test]
    fn same_column_over_defers_reorder_to_drop() {
        let mut e = engine();
        let active = DndId::item("T3");
        e.on_drag_start(active.clone()).unwrap();
        let probe = kb(DndId::item("T1"), DropPosition::Before);
        assert_eq!(e.on_drag_over(&active, &probe).unwrap(), OverOutcome::Unchanged);
        assert_eq!(items(&e, "todo"), ["T1", "T2", "T3"]);

        let out = e.on_drag_end(&active, Some(&probe)).unwrap();
        assert_eq!(items(&e, "todo"), ["T3", "T1", "T2"]);
        assert!(matches!(
            out,
            DropOutcome::Committed(Commit { index: 0, persisted: false, .. })
        ));
        assert!(!e.is_dragging());
    }

    #[test]
    fn drop_after_relocation_only_commits() {
        let mut e = MoveEngine::new(
            Board::new(vec![
                Column::new("todo", "Todo").with_items(["T1", "T2"]),
                Column::new("doing", "In Progress").with_items(["T4", "T5"]),
            ]),
            DndConfig::default(),
        );
        let active = DndId::item("T1");
        e.on_drag_start(active.clone()).unwrap();
        e.on_drag_over(&active, &kb(DndId::column("doing"), DropPosition::Append))
            .unwrap();
        assert_eq!(items(&e, "doing"), ["T4", "T5", "T1"]);

        let out = e
            .on_drag_end(&active, Some(&kb(DndId::item("T4"), DropPosition::Before)))
            .unwrap();
        assert_eq!(items(&e, "doing"), ["T4", "T5", "T1"]);
        assert!(matches!(
            out,
            DropOutcome::Committed(Commit { index: 2, .. })
        ));
    }

    #[test]
    fn unknown_over_target_is_not_cached() {
        let mut e = engine();
        let active = DndId::item("T1");
        e.on_drag_start(active.clone()).unwrap();
        let err = e
            .on_drag_over(&active, &kb(DndId::item("ghost"), DropPosition::Before))
            .unwrap_err();
        assert!(matches!(err, DndError::UnknownId(_)));
        assert_eq!(e.session().unwrap().last_resolved(), None);

        let empty = Probe::Pointer {
            pointer: Position::new(200, 200),
            active_rect: Rect::new(200, 200, 5, 5),
            candidates: vec![],
        };
        assert_eq!(
            e.on_drag_over(&active, &empty).unwrap(),
            OverOutcome::Unresolved
        );
        assert_eq!(
            e.on_drag_end(&active, Some(&empty)).unwrap(),
            DropOutcome::Aborted
        );
        assert_eq!(items(&e, "todo"), ["T1", "T2", "T3"]);
    }

    #[test]
    fn valid_over_target_becomes_fallback() {
        let mut e = engine();
        let active = DndId::item("T1");
        e.on_drag_start(active.clone()).unwrap();
        e.on_drag_over(&active, &kb(DndId::item("T3"), DropPosition::Before))
            .unwrap();
        assert_eq!(e.session().unwrap().last_resolved(), Some(&DndId::item("T3")));
    }

    #[test]
    fn unresolved_over_is_noop() {
        let mut e = engine();
        let active = DndId::item("T1");
        e.on_drag_start(active.clone()).unwrap();
        let probe = Probe::Pointer {
            pointer: Position::new(200, 200),
            active_rect: Rect::new(200, 200, 5, 5),
            candidates: vec![],
        };
        assert_eq!(
            e.on_drag_over(&active, &probe).unwrap(),
            OverOutcome::Unresolved
        );
        assert!(e.is_dragging());
        assert_eq!(items(&e, "todo"), ["T1", "T2", "T3"]);
    }

    #[test]
    fn mismatched_active_is_rejected() {
        let mut e = engine();
        e.on_drag_start(DndId::item("T1")).unwrap();
        let err = e
            .on_drag_over(&DndId::item("T2"), &kb(DndId::column("done"), DropPosition::Append))
            .unwrap_err();
        assert!(matches!(err, DndError::ActiveMismatch { .. }));
        assert_eq!(items(&e, "done"), Vec::<String>::new());
        assert!(e.is_dragging());
    }

    #[test]
    fn events_without_drag_fail() {
        let mut e = engine();
        assert!(matches!(
            e.on_drag_cancel(&DndId::item("T1")),
            Err(DndError::NotDragging)
        ));
        assert!(matches!(
            e.on_drag_end(&DndId::item("T1"), None),
            Err(DndError::NotDragging)
        ));
    }

    #[test]
    fn cancel_restores_snapshot() {
        let mut e = engine();
        let before = e.board().clone();
        let active = DndId::item("T2");
        e.on_drag_start(active.clone()).unwrap();
        e.on_drag_over(&active, &kb(DndId::column("done"), DropPosition::Append))
            .unwrap();
        assert_ne!(e.board(), &before);
        e.on_drag_cancel(&active).unwrap();
        assert_eq!(e.board(), &before);
        assert!(!e.is_dragging());
    }

    #[test]
    fn unknown_target_on_drop_aborts() {
        let mut e = engine();
        let before = e.board().clone();
        let active = DndId::item("T1");
        e.on_drag_start(active.clone()).unwrap();
        e.on_drag_over(&active, &kb(DndId::column("done"), DropPosition::Append))
            .unwrap();
        let err = e.drop_at(&active, Some(&DndId::column("archive"))).unwrap_err();
        assert!(matches!(err, DndError::UnknownId(_)));
        assert_eq!(e.board(), &before);
        assert!(!e.is_dragging());
    }

    #[test]
    fn drop_on_self_is_idempotent() {
        let mut e = engine();
        let before = e.board().clone();
        let active = DndId::item("T2");
        e.on_drag_start(active.clone()).unwrap();
        assert_eq!(
            e.drop_at(&active, Some(&active)).unwrap(),
            DropOutcome::Unchanged
        );
        assert_eq!(e.board(), &before);
    }

    #[test]
    fn keyboard_move_is_atomic() {
        let mut e = engine();
        let out = e.keyboard_move(&ItemId::from("T3"), Direction::Up).unwrap();
        assert_eq!(items(&e, "todo"), ["T1", "T3", "T2"]);
        assert!(matches!(out, DropOutcome::Committed(_)));
        assert!(!e.is_dragging());

        assert_eq!(
            e.keyboard_move(&ItemId::from("T1"), Direction::Left).unwrap(),
            DropOutcome::Unchanged
        );
        e.keyboard_move(&ItemId::from("T4"), Direction::Right).unwrap();
        assert_eq!(items(&e, "done"), ["T4"]);
    }

    #[test]
    fn column_drag_reorders_columns() {
        let mut e = engine();
        let active = DndId::column("todo");
        e.on_drag_start(active.clone()).unwrap();
        assert_eq!(
            e.on_drag_over(&active, &kb(DndId::column("done"), DropPosition::Append))
                .unwrap(),
            OverOutcome::Unchanged
        );
        let out = e.drop_at(&active, Some(&DndId::column("done"))).unwrap();
        assert_eq!(
            out,
            DropOutcome::ColumnsReordered {
                column: ColumnId::from("todo"),
                from: 0,
                to: 2
            }
        );
        let order: Vec<&str> = e.board().columns().iter().map(|c| c.id().as_str()).collect();
        assert_eq!(order, ["doing", "done", "todo"]);
    }

    #[test]
    fn settle_flag_follows_policy() {
        let mut e = MoveEngine::new(
            engine().board().clone(),
            DndConfig::default().with_settle(SettlePolicy::Deferred),
        );
        let active = DndId::item("T1");
        e.on_drag_start(active.clone()).unwrap();
        e.on_drag_over(&active, &kb(DndId::column("done"), DropPosition::Append))
            .unwrap();
        assert!(e.session().unwrap().just_relocated());
        assert_eq!(
            e.apply(&DragEvent::Settle).unwrap(),
            DragReport::Settled(true)
        );
        assert!(!e.session().unwrap().just_relocated());
    }

    #[test]
    fn reload_only_while_idle() {
        let mut e = engine();
        e.on_drag_start(DndId::item("T1")).unwrap();
        assert!(e.reload(vec![]).is_err());
        e.on_drag_cancel(&DndId::item("T1")).unwrap();

        e.reload(vec![
            kanban_sync::Item::new("T9", "done"),
            kanban_sync::Item::new("T8", "missing"),
        ])
        .unwrap();
        assert_eq!(e.board().item_count(), 1);
        assert_eq!(items(&e, "done"), ["T9"]);
        assert_eq!(e.board().columns().len(), 3);
    }
}
