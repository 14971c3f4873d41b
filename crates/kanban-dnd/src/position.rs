#![forbid(unsafe_code)]

//! Where, relative to a drop target, a relocated item lands.

use kanban_core::geometry::Rect;
use serde::{Deserialize, Serialize};

/// Placement relative to the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPosition {
    /// At the target item's index (before it).
    Before,
    /// One past the target item's index.
    After,
    /// At the end of the target column.
    Append,
}

impl DropPosition {
    /// Placement from the pointer's vertical coordinate over an item.
    ///
    /// Strictly below the item's vertical midpoint maps to `After`;
    /// everything else maps to `Before`.
    #[must_use]
    pub fn from_pointer(pointer_y: u16, target: Rect) -> Self {
        if target.is_below_midpoint(pointer_y) {
            Self::After
        } else {
            Self::Before
        }
    }

    /// Insertion index in a list of `len` items whose target sits at `target_index`.
    ///
    /// The result is clamped to `len`.
    #[must_use]
    pub fn insertion_index(self, target_index: usize, len: usize) -> usize {
        match self {
            Self::Before => target_index.min(len),
            Self::After => (target_index + 1).min(len),
            Self::Append => len,
        }
    }
}
