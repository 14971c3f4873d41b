#![forbid(unsafe_code)]

use std::fmt;

use kanban_sync::StoreError;

use crate::id::DndId;

/// Result alias for engine operations.
pub type DndResult<T> = Result<T, DndError>;

/// Errors from [`MoveEngine`](crate::MoveEngine) operations.
///
/// Every error aborts the event that produced it and leaves the board in a
/// valid state.
#[derive(Debug)]
pub enum DndError {
    /// The id names neither a column nor an item on the board.
    UnknownId(DndId),
    /// A drag is already in progress.
    AlreadyDragging { active: DndId },
    /// The operation needs a drag in progress.
    NotDragging,
    /// The event names a different element than the one being dragged.
    ActiveMismatch { active: DndId, got: DndId },
    /// Reloading items from the store failed.
    Reload(StoreError),
}

impl fmt::Display for DndError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DndError::UnknownId(id) => write!(f, "unknown id: {id}"),
            DndError::AlreadyDragging { active } => {
                write!(f, "drag already in progress for {active}")
            }
            DndError::NotDragging => write!(f, "no drag in progress"),
            DndError::ActiveMismatch { active, got } => {
                write!(f, "event for {got} but {active} is being dragged")
            }
            DndError::Reload(e) => write!(f, "reload failed: {e}"),
        }
    }
}

impl std::error::Error for DndError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DndError::Reload(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for DndError {
    fn from(e: StoreError) -> Self {
        DndError::Reload(e)
    }
}
