#![forbid(unsafe_code)]

//! Board state: ordered columns, each holding an ordered list of item ids.
//!
//! Every item id appears in exactly one column, exactly once. Structural
//! mutation is crate-private; the move engine is the only writer.

use std::collections::HashSet;
use std::fmt;

use kanban_core::id::{ColumnId, ItemId};
use kanban_sync::Item;
use serde::{Deserialize, Serialize};

use crate::id::DndId;

/// Column definition used to build a board from flat item records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub id: ColumnId,
    pub name: String,
}

impl ColumnSpec {
    #[must_use]
    pub fn new(id: impl Into<ColumnId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A named, ordered container of items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    id: ColumnId,
    name: String,
    items: Vec<ItemId>,
}

impl Column {
    /// Create an empty column.
    #[must_use]
    pub fn new(id: impl Into<ColumnId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            items: Vec::new(),
        }
    }

    /// Replace the item list.
    #[must_use]
    pub fn with_items<I, T>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ItemId>,
    {
        self.items = items.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn id(&self) -> &ColumnId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Items in display order.
    #[must_use]
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Index of `item` in this column.
    #[must_use]
    pub fn position(&self, item: &ItemId) -> Option<usize> {
        self.items.iter().position(|id| id == item)
    }
}

/// A broken board invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The same item id appears more than once.
    DuplicateItem(ItemId),
    /// Two columns share an id.
    DuplicateColumn(ColumnId),
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateItem(id) => write!(f, "item {id} appears more than once"),
            Self::DuplicateColumn(id) => write!(f, "column {id} defined more than once"),
        }
    }
}

impl std::error::Error for InvariantViolation {}

/// Ordered set of columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    columns: Vec<Column>,
}

impl Board {
    /// Board from prepared columns. Use [`Board::check_invariants`] to
    /// validate hand-built input.
    #[must_use]
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Partition flat item records into columns.
    ///
    /// Items keep their input order within a column. An item whose
    /// container is not a known column is skipped; a repeated item id keeps
    /// its first occurrence.
    #[must_use]
    pub fn from_items(specs: &[ColumnSpec], items: impl IntoIterator<Item = Item>) -> Self {
        let mut columns: Vec<Column> = Vec::with_capacity(specs.len());
        for spec in specs {
            if columns.iter().any(|c| c.id == spec.id) {
                kanban_core::warn!(column = %spec.id, "duplicate column definition ignored");
                continue;
            }
            columns.push(Column::new(spec.id.clone(), spec.name.clone()));
        }

        let mut seen = HashSet::new();
        for item in items {
            let Some(column) = columns.iter_mut().find(|c| c.id == item.container) else {
                kanban_core::warn!(
                    item = %item.id,
                    container = %item.container,
                    "item references unknown column; skipped"
                );
                continue;
            };
            if !seen.insert(item.id.clone()) {
                kanban_core::warn!(item = %item.id, "duplicate item record; keeping first");
                continue;
            }
            column.items.push(item.id);
        }
        Self { columns }
    }

    /// Column definitions in order.
    #[must_use]
    pub fn specs(&self) -> Vec<ColumnSpec> {
        self.columns
            .iter()
            .map(|c| ColumnSpec::new(c.id.clone(), c.name.clone()))
            .collect()
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| &c.id == id)
    }

    #[must_use]
    pub fn column_index(&self, id: &ColumnId) -> Option<usize> {
        self.columns.iter().position(|c| &c.id == id)
    }

    /// `(column index, item index)` of `item`.
    #[must_use]
    pub fn locate(&self, item: &ItemId) -> Option<(usize, usize)> {
        self.columns
            .iter()
            .enumerate()
            .find_map(|(ci, c)| c.position(item).map(|ii| (ci, ii)))
    }

    /// Column currently holding `item`.
    #[must_use]
    pub fn column_of(&self, item: &ItemId) -> Option<&ColumnId> {
        self.locate(item).map(|(ci, _)| &self.columns[ci].id)
    }

    /// Whether `id` names a column or item on this board.
    #[must_use]
    pub fn contains(&self, id: &DndId) -> bool {
        match id {
            DndId::Column(c) => self.column_index(c).is_some(),
            DndId::Item(i) => self.locate(i).is_some(),
        }
    }

    /// Total number of items across all columns.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    /// Every item id, column by column.
    pub fn item_ids(&self) -> impl Iterator<Item = &ItemId> {
        self.columns.iter().flat_map(|c| c.items.iter())
    }

    /// Verify column ids are distinct and each item appears exactly once.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut columns = HashSet::new();
        for column in &self.columns {
            if !columns.insert(&column.id) {
                return Err(InvariantViolation::DuplicateColumn(column.id.clone()));
            }
        }
        let mut items = HashSet::new();
        for id in self.item_ids() {
            if !items.insert(id) {
                return Err(InvariantViolation::DuplicateItem(id.clone()));
            }
        }
        Ok(())
    }

    pub(crate) fn remove_item(&mut self, item: &ItemId) -> Option<(usize, usize)> {
        let (ci, ii) = self.locate(item)?;
        self.columns[ci].items.remove(ii);
        Some((ci, ii))
    }

    /// Insert at `index`, clamped to the column length. Returns the final index.
    pub(crate) fn insert_item(&mut self, column: usize, index: usize, item: ItemId) -> usize {
        let items = &mut self.columns[column].items;
        let at = index.min(items.len());
        items.insert(at, item);
        at
    }

    /// Remove the element at `from` and reinsert it at `to` within one column.
    pub(crate) fn move_within(&mut self, column: usize, from: usize, to: usize) {
        array_move(&mut self.columns[column].items, from, to);
    }

    pub(crate) fn move_column(&mut self, from: usize, to: usize) {
        array_move(&mut self.columns, from, to);
    }
}

fn array_move<T>(list: &mut Vec<T>, from: usize, to: usize) {
    if from == to || from >= list.len() {
        return;
    }
    let value = list.remove(from);
    let to = to.min(list.len());
    list.insert(to, value);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs() -> Vec<ColumnSpec> {
        vec![
            ColumnSpec::new("todo", "Todo"),
            ColumnSpec::new("doing", "In Progress"),
            ColumnSpec::new("done", "Done"),
        ]
    }

    fn ids(column: &Column) -> Vec<&str> {
        column.items().iter().map(ItemId::as_str).collect()
    }

    #[test]
    fn from_items_partitions_in_input_order() {
        let board = Board::from_items(
            &specs(),
            vec![
                Item::new("T1", "todo"),
                Item::new("T4", "doing"),
                Item::new("T2", "todo"),
            ],
        );
        assert_eq!(ids(&board.columns()[0]), ["T1", "T2"]);
        assert_eq!(ids(&board.columns()[1]), ["T4"]);
        assert!(board.columns()[2].is_empty());
        assert!(board.check_invariants().is_ok());
    }

    #[test]
    fn from_items_skips_unknown_and_duplicates() {
        let board = Board::from_items(
            &specs(),
            vec![
                Item::new("T1", "todo"),
                Item::new("T9", "archive"),
                Item::new("T1", "done"),
            ],
        );
        assert_eq!(board.item_count(), 1);
        assert_eq!(board.column_of(&ItemId::from("T1")), Some(&ColumnId::from("todo")));
    }

    #[test]
    fn check_invariants_flags_duplicates() {
        let board = Board::new(vec![
            Column::new("a", "A").with_items(["T1"]),
            Column::new("b", "B").with_items(["T1"]),
        ]);
        assert_eq!(
            board.check_invariants(),
            Err(InvariantViolation::DuplicateItem(ItemId::from("T1")))
        );

        let board = Board::new(vec![Column::new("a", "A"), Column::new("a", "A2")]);
        assert_eq!(
            board.check_invariants(),
            Err(InvariantViolation::DuplicateColumn(ColumnId::from("a")))
        );
    }

    #[test]
    fn locate_and_contains() {
        let board = Board::new(vec![
            Column::new("a", "A").with_items(["T1", "T2"]),
            Column::new("b", "B").with_items(["T3"]),
        ]);
        assert_eq!(board.locate(&ItemId::from("T2")), Some((0, 1)));
        assert_eq!(board.locate(&ItemId::from("T3")), Some((1, 0)));
        assert!(board.contains(&DndId::column("b")));
        assert!(!board.contains(&DndId::item("T9")));
    }

    #[test]
    fn array_move_semantics() {
        let mut v = vec![1, 2, 3, 4];
        array_move(&mut v, 0, 2);
        assert_eq!(v, [2, 3, 1, 4]);
        array_move(&mut v, 3, 0);
        assert_eq!(v, [4, 2, 3, 1]);
        array_move(&mut v, 1, 1);
        assert_eq!(v, [4, 2, 3, 1]);
        array_move(&mut v, 9, 0);
        assert_eq!(v, [4, 2, 3, 1]);
    }

    #[test]
    fn insert_clamps_to_len() {
        let mut board = Board::new(vec![Column::new("a", "A").with_items(["T1"])]);
        assert_eq!(board.insert_item(0, 10, ItemId::from("T2")), 1);
        assert_eq!(ids(&board.columns()[0]), ["T1", "T2"]);
        assert_eq!(board.remove_item(&ItemId::from("T1")), Some((0, 0)));
        assert_eq!(board.remove_item(&ItemId::from("T1")), None);
    }
}
