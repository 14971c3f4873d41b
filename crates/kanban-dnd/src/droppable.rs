#![forbid(unsafe_code)]

//! Registered drop targets and their measured rectangles.

use kanban_core::geometry::{Position, Rect};
use serde::{Deserialize, Serialize};

use crate::id::DndId;

/// A measured drop target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Droppable {
    pub id: DndId,
    pub rect: Rect,
}

impl Droppable {
    #[must_use]
    pub fn new(id: DndId, rect: Rect) -> Self {
        Self { id, rect }
    }
}

/// Droppables in registration order.
///
/// Re-registering an id updates its rectangle in place and keeps its
/// original position in the order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DroppableRegistry {
    entries: Vec<Droppable>,
}

impl DroppableRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or re-measure `id`.
    pub fn register(&mut self, id: DndId, rect: Rect) {
        if let Some(entry) = self.entries.iter_mut().find(|d| d.id == id) {
            entry.rect = rect;
        } else {
            self.entries.push(Droppable::new(id, rect));
        }
    }

    /// Remove `id`. Returns whether it was registered.
    pub fn unregister(&mut self, id: &DndId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|d| &d.id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn get(&self, id: &DndId) -> Option<&Droppable> {
        self.entries.iter().find(|d| &d.id == id)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Droppable] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The draggable under `pos`: an item if one contains the point,
    /// otherwise a column.
    #[must_use]
    pub fn hit_test(&self, pos: Position) -> Option<&Droppable> {
        let mut column = None;
        for entry in &self.entries {
            if !entry.rect.contains(pos) {
                continue;
            }
            if !entry.id.is_column() {
                return Some(entry);
            }
            column.get_or_insert(entry);
        }
        column
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reregistration_keeps_order() {
        let mut reg = DroppableRegistry::new();
        reg.register(DndId::column("a"), Rect::new(0, 0, 10, 10));
        reg.register(DndId::column("b"), Rect::new(10, 0, 10, 10));
        reg.register(DndId::column("a"), Rect::new(0, 0, 10, 20));

        assert_eq!(reg.len(), 2);
        assert_eq!(reg.as_slice()[0].id, DndId::column("a"));
        assert_eq!(reg.as_slice()[0].rect.height, 20);
    }

    #[test]
    fn unregister_reports_presence() {
        let mut reg = DroppableRegistry::new();
        reg.register(DndId::item("T1"), Rect::new(0, 0, 1, 1));
        assert!(reg.unregister(&DndId::item("T1")));
        assert!(!reg.unregister(&DndId::item("T1")));
        assert!(reg.is_empty());
    }

    #[test]
    fn hit_test_prefers_items() {
        let mut reg = DroppableRegistry::new();
        reg.register(DndId::column("a"), Rect::new(0, 0, 20, 20));
        reg.register(DndId::item("T1"), Rect::new(1, 2, 18, 3));

        assert_eq!(
            reg.hit_test(Position::new(5, 3)).map(|d| &d.id),
            Some(&DndId::item("T1"))
        );
        assert_eq!(
            reg.hit_test(Position::new(5, 10)).map(|d| &d.id),
            Some(&DndId::column("a"))
        );
        assert!(reg.hit_test(Position::new(30, 30)).is_none());
    }
}
