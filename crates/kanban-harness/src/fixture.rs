#![forbid(unsafe_code)]

//! Canonical boards and layouts.
//!
//! Tests, scripts and the terminal driver all lay the board out the same
//! way: columns side by side, items stacked from the top of each column.

use kanban_core::geometry::Rect;
use kanban_dnd::{Board, Column, ColumnSpec, DndId, DroppableRegistry};
use kanban_sync::Item;

/// The three-column board used by the driver when no store is configured.
#[must_use]
pub fn demo_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new("todo", "Todo"),
        ColumnSpec::new("in_progress", "In Progress"),
        ColumnSpec::new("done", "Done"),
    ]
}

/// Item records matching [`demo_columns`].
#[must_use]
pub fn demo_items() -> Vec<Item> {
    [
        ("T1", "todo", "Write release notes"),
        ("T2", "todo", "Triage inbox"),
        ("T3", "todo", "Review pull requests"),
        ("T4", "in_progress", "Fix flaky sync test"),
        ("T5", "done", "Cut 0.1.0"),
    ]
    .into_iter()
    .map(|(id, column, title)| {
        Item::new(id, column).with_attributes(serde_json::json!({ "title": title }))
    })
    .collect()
}

/// Board from `(column, items)` pairs; the column id doubles as its name.
#[must_use]
pub fn board(columns: &[(&str, &[&str])]) -> Board {
    Board::new(
        columns
            .iter()
            .map(|(id, items)| Column::new(*id, *id).with_items(items.iter().copied()))
            .collect(),
    )
}

/// Flatten a board into item records, for seeding a store.
#[must_use]
pub fn items_of(board: &Board) -> Vec<Item> {
    board
        .columns()
        .iter()
        .flat_map(|c| c.items().iter().map(|i| Item::new(i.clone(), c.id().clone())))
        .collect()
}

/// Column-major stacked layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackedLayout {
    pub column_width: u16,
    pub column_height: u16,
    pub item_height: u16,
    /// Rows between consecutive items.
    pub gap: u16,
    /// Rows above the first item (the column header).
    pub header: u16,
}

impl Default for StackedLayout {
    fn default() -> Self {
        Self {
            column_width: 20,
            column_height: 30,
            item_height: 3,
            gap: 1,
            header: 2,
        }
    }
}

impl StackedLayout {
    /// Rectangle of the column at `column`.
    #[must_use]
    pub fn column_rect(&self, column: usize) -> Rect {
        Rect::new(
            self.column_x(column),
            0,
            self.column_width,
            self.column_height,
        )
    }

    /// Rectangle of the item at `slot` in the column at `column`.
    #[must_use]
    pub fn item_rect(&self, column: usize, slot: usize) -> Rect {
        let pitch = self.item_height.saturating_add(self.gap);
        let y = self
            .header
            .saturating_add(pitch.saturating_mul(u16::try_from(slot).unwrap_or(u16::MAX)));
        Rect::new(
            self.column_x(column).saturating_add(1),
            y,
            self.column_width.saturating_sub(2),
            self.item_height,
        )
    }

    /// Register every column, then every item, in board order.
    #[must_use]
    pub fn registry(&self, board: &Board) -> DroppableRegistry {
        let mut reg = DroppableRegistry::new();
        for (ci, column) in board.columns().iter().enumerate() {
            reg.register(DndId::Column(column.id().clone()), self.column_rect(ci));
        }
        for (ci, column) in board.columns().iter().enumerate() {
            for (ii, item) in column.items().iter().enumerate() {
                reg.register(DndId::Item(item.clone()), self.item_rect(ci, ii));
            }
        }
        reg
    }

    fn column_x(&self, column: usize) -> u16 {
        self.column_width
            .saturating_mul(u16::try_from(column).unwrap_or(u16::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_board_partitions_all_items() {
        let board = Board::from_items(&demo_columns(), demo_items());
        assert_eq!(board.item_count(), 5);
        assert!(board.check_invariants().is_ok());
        assert_eq!(board.columns()[0].len(), 3);
    }

    #[test]
    fn registry_lists_columns_before_items() {
        let b = board(&[("todo", &["T1", "T2"]), ("done", &[])]);
        let reg = StackedLayout::default().registry(&b);
        let ids: Vec<String> = reg.as_slice().iter().map(|d| d.id.to_string()).collect();
        assert_eq!(ids, ["column:todo", "column:done", "item:T1", "item:T2"]);
    }

    #[test]
    fn items_stack_with_gap() {
        let layout = StackedLayout::default();
        assert_eq!(layout.item_rect(0, 0), Rect::new(1, 2, 18, 3));
        assert_eq!(layout.item_rect(1, 2), Rect::new(21, 10, 18, 3));
        assert_eq!(layout.column_rect(2), Rect::new(40, 0, 20, 30));
    }

    #[test]
    fn items_of_round_trips_through_from_items() {
        let b = board(&[("todo", &["T1"]), ("done", &["T2", "T3"])]);
        let rebuilt = Board::from_items(&b.specs(), items_of(&b));
        assert_eq!(rebuilt, b);
    }
}
