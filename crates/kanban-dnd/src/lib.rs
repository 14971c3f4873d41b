#![forbid(unsafe_code)]

//! Multi-column drag-and-drop reordering for kanban boards.
//!
//! [`MoveEngine`] owns a [`Board`] and applies [`DragEvent`]s to it. Events
//! come from an [`InputAdapter`] ([`PointerAdapter`], [`KeyboardAdapter`],
//! or a scripted source); the engine asks the [`collision`] resolver what
//! the drag is over, relocates items between columns mid-drag, and hands
//! committed moves to [`kanban_sync::PersistenceSync`].
//!
//! ```
//! use kanban_dnd::{Board, Column, DndConfig, DndId, DropOutcome, DropPosition, MoveEngine, Probe};
//!
//! let board = Board::new(vec![
//!     Column::new("todo", "Todo").with_items(["T1", "T2"]),
//!     Column::new("done", "Done"),
//! ]);
//! let mut engine = MoveEngine::new(board, DndConfig::default());
//! let active = DndId::item("T1");
//! let probe = Probe::Keyboard { target: DndId::column("done"), position: DropPosition::Append };
//!
//! engine.on_drag_start(active.clone()).unwrap();
//! engine.on_drag_over(&active, &probe).unwrap();
//! let outcome = engine.on_drag_end(&active, Some(&probe)).unwrap();
//! assert!(matches!(outcome, DropOutcome::Committed(_)));
//! ```

pub mod board;
pub mod collision;
pub mod config;
pub mod droppable;
pub mod engine;
pub mod error;
pub mod id;
pub mod input;
pub mod keyboard;
pub mod pointer;
pub mod position;
pub mod session;

pub use board::{Board, Column, ColumnSpec, InvariantViolation};
pub use collision::{CollisionInput, Resolution, ResolvedBy};
pub use config::{DndConfig, SettlePolicy};
pub use droppable::{Droppable, DroppableRegistry};
pub use engine::{Commit, DragReport, DropOutcome, MoveEngine, OverOutcome};
pub use error::{DndError, DndResult};
pub use id::DndId;
pub use input::{AdapterContext, DragEvent, InputAdapter, Probe};
pub use keyboard::{Direction, KeyboardAdapter};
pub use pointer::PointerAdapter;
pub use position::DropPosition;
pub use session::DragSession;

pub use kanban_core::id::{ColumnId, ItemId};
