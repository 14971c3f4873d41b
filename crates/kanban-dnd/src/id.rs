#![forbid(unsafe_code)]

//! Drag-and-drop identifiers.

use std::fmt;

use kanban_core::id::{ColumnId, ItemId};
use serde::{Deserialize, Serialize};

/// Identifier of anything that can be dragged or dropped on: a column or an item.
///
/// Serialized as `{"kind": "item", "id": "T1"}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum DndId {
    /// A whole column (container).
    Column(ColumnId),
    /// A single work item.
    Item(ItemId),
}

impl DndId {
    /// Column id shorthand.
    #[must_use]
    pub fn column(id: impl Into<ColumnId>) -> Self {
        Self::Column(id.into())
    }

    /// Item id shorthand.
    #[must_use]
    pub fn item(id: impl Into<ItemId>) -> Self {
        Self::Item(id.into())
    }

    /// Returns true for column ids.
    #[must_use]
    pub fn is_column(&self) -> bool {
        matches!(self, Self::Column(_))
    }

    /// The item id, if this names an item.
    #[must_use]
    pub fn as_item(&self) -> Option<&ItemId> {
        match self {
            Self::Item(id) => Some(id),
            Self::Column(_) => None,
        }
    }

    /// The column id, if this names a column.
    #[must_use]
    pub fn as_column(&self) -> Option<&ColumnId> {
        match self {
            Self::Column(id) => Some(id),
            Self::Item(_) => None,
        }
    }
}

impl fmt::Display for DndId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column(id) => write!(f, "column:{id}"),
            Self::Item(id) => write!(f, "item:{id}"),
        }
    }
}

impl From<ItemId> for DndId {
    fn from(id: ItemId) -> Self {
        Self::Item(id)
    }
}

impl From<ColumnId> for DndId {
    fn from(id: ColumnId) -> Self {
        Self::Column(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_is_tagged() {
        let id = DndId::item("T1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#"{"kind":"item","id":"T1"}"#);
        let back: DndId = serde_json::from_str(r#"{"kind":"column","id":"done"}"#).unwrap();
        assert_eq!(back, DndId::column("done"));
    }

    #[test]
    fn display_prefixes_kind() {
        assert_eq!(DndId::column("todo").to_string(), "column:todo");
        assert_eq!(DndId::item("T2").to_string(), "item:T2");
    }
}
