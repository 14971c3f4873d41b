#![forbid(unsafe_code)]

//! Per-drag bookkeeping. Exists only between start and end/cancel.

use kanban_core::id::ColumnId;

use crate::board::Board;
use crate::config::SettlePolicy;
use crate::id::DndId;

/// State of one drag in progress.
#[derive(Debug, Clone)]
pub struct DragSession {
    active: DndId,
    source_column: ColumnId,
    origin_index: usize,
    last_resolved: Option<DndId>,
    just_relocated: bool,
    relocations: usize,
    snapshot: Board,
}

impl DragSession {
    pub(crate) fn new(
        active: DndId,
        source_column: ColumnId,
        origin_index: usize,
        snapshot: Board,
    ) -> Self {
        Self {
            active,
            source_column,
            origin_index,
            last_resolved: None,
            just_relocated: false,
            relocations: 0,
            snapshot,
        }
    }

    /// The dragged element.
    #[must_use]
    pub fn active(&self) -> &DndId {
        &self.active
    }

    /// Column the item was picked up from. For a column drag, the column itself.
    #[must_use]
    pub fn source_column(&self) -> &ColumnId {
        &self.source_column
    }

    /// Index in the source column at pickup (column index for a column drag).
    #[must_use]
    pub fn origin_index(&self) -> usize {
        self.origin_index
    }

    /// Most recent non-empty resolution.
    #[must_use]
    pub fn last_resolved(&self) -> Option<&DndId> {
        self.last_resolved.as_ref()
    }

    /// Whether the settle flag is raised.
    #[must_use]
    pub fn just_relocated(&self) -> bool {
        self.just_relocated
    }

    /// Cross-column relocations performed so far in this drag.
    #[must_use]
    pub fn relocations(&self) -> usize {
        self.relocations
    }

    /// Board as it was at pickup.
    #[must_use]
    pub fn snapshot(&self) -> &Board {
        &self.snapshot
    }

    pub(crate) fn into_snapshot(self) -> Board {
        self.snapshot
    }

    pub(crate) fn record_resolution(&mut self, target: DndId) {
        self.last_resolved = Some(target);
    }

    pub(crate) fn record_relocation(&mut self, policy: SettlePolicy) {
        self.relocations += 1;
        self.just_relocated = policy != SettlePolicy::Disabled;
    }

    /// Called after each resolver evaluation.
    pub(crate) fn evaluated(&mut self, policy: SettlePolicy) {
        if policy == SettlePolicy::NextEvaluation {
            self.just_relocated = false;
        }
    }

    /// The settle tick. Returns whether the flag was cleared.
    pub(crate) fn settle(&mut self) -> bool {
        std::mem::take(&mut self.just_relocated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> DragSession {
        DragSession::new(DndId::item("T1"), ColumnId::from("todo"), 0, Board::default())
    }

    #[test]
    fn next_evaluation_clears_after_one_read() {
        let mut s = session();
        s.record_relocation(SettlePolicy::NextEvaluation);
        assert!(s.just_relocated());
        s.evaluated(SettlePolicy::NextEvaluation);
        assert!(!s.just_relocated());
        assert_eq!(s.relocations(), 1);
    }

    #[test]
    fn deferred_waits_for_tick() {
        let mut s = session();
        s.record_relocation(SettlePolicy::Deferred);
        s.evaluated(SettlePolicy::Deferred);
        s.evaluated(SettlePolicy::Deferred);
        assert!(s.just_relocated());
        assert!(s.settle());
        assert!(!s.settle());
    }

    #[test]
    fn disabled_never_raises() {
        let mut s = session();
        s.record_relocation(SettlePolicy::Disabled);
        assert!(!s.just_relocated());
        assert_eq!(s.relocations(), 1);
    }
}
