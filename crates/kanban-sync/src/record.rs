//! Item records as exchanged with the store.

use kanban_core::id::{ColumnId, ItemId};
use serde::{Deserialize, Serialize};

/// A work item as the store sees it.
///
/// `attributes` is carried through untouched; the drag engine only looks at
/// `id` and `container`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique item id.
    pub id: ItemId,
    /// Column the item belongs to.
    pub container: ColumnId,
    /// Opaque payload (title, assignee, ...).
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub attributes: serde_json::Value,
}

impl Item {
    /// Create an item with no attributes.
    #[must_use]
    pub fn new(id: impl Into<ItemId>, container: impl Into<ColumnId>) -> Self {
        Self {
            id: id.into(),
            container: container.into(),
            attributes: serde_json::Value::Null,
        }
    }

    /// Attach an attribute payload.
    #[must_use]
    pub fn with_attributes(mut self, attributes: serde_json::Value) -> Self {
        self.attributes = attributes;
        self
    }
}
