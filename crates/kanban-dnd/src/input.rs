#![forbid(unsafe_code)]

//! Normalized drag events and the adapter seam that produces them.
//!
//! Adapters turn raw [`Event`]s into [`DragEvent`]s. They read the board
//! and droppable registry but never mutate either; the engine applies the
//! events.

use kanban_core::event::Event;
use kanban_core::geometry::{Position, Rect};
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::droppable::{Droppable, DroppableRegistry};
use crate::id::DndId;
use crate::position::DropPosition;

/// What the drag is over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Probe {
    /// Pointer geometry, resolved by collision detection.
    Pointer {
        pointer: Position,
        active_rect: Rect,
        candidates: Vec<Droppable>,
    },
    /// A target chosen without geometry (keyboard navigation).
    Keyboard {
        target: DndId,
        position: DropPosition,
    },
}

/// One step of a drag, as delivered to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DragEvent {
    Start {
        active: DndId,
    },
    Over {
        active: DndId,
        probe: Probe,
    },
    /// Release. `probe: None` means nothing was under the drag.
    End {
        active: DndId,
        #[serde(default)]
        probe: Option<Probe>,
    },
    Cancel {
        active: DndId,
    },
    /// Layout has settled since the last relocation.
    Settle,
}

impl DragEvent {
    /// The dragged element, if the event names one.
    #[must_use]
    pub fn active(&self) -> Option<&DndId> {
        match self {
            DragEvent::Start { active }
            | DragEvent::Over { active, .. }
            | DragEvent::End { active, .. }
            | DragEvent::Cancel { active } => Some(active),
            DragEvent::Settle => None,
        }
    }
}

/// Read-only view handed to adapters.
#[derive(Debug, Clone, Copy)]
pub struct AdapterContext<'a> {
    pub board: &'a Board,
    pub droppables: &'a DroppableRegistry,
}

impl<'a> AdapterContext<'a> {
    #[must_use]
    pub fn new(board: &'a Board, droppables: &'a DroppableRegistry) -> Self {
        Self { board, droppables }
    }
}

/// A source of drag events.
pub trait InputAdapter {
    /// Translate one raw event. Most events produce nothing.
    fn handle(&mut self, event: &Event, ctx: AdapterContext<'_>) -> Option<DragEvent>;

    /// Whether the adapter believes a drag is in progress.
    fn is_dragging(&self) -> bool;

    /// Forget any drag in progress, e.g. after the engine rejected an event.
    fn reset(&mut self);
}
