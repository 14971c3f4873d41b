#![forbid(unsafe_code)]

//! Test and replay tooling for the kanban drag engine.
//!
//! - **Fixtures**: canonical boards and the stacked column layout used to
//!   measure droppables ([`fixture`]).
//! - **Golden boards**: text snapshots of board state compared against
//!   stored `.snap` files ([`golden`], [`assert_board_snapshot!`]).
//! - **Scripted replay**: recorded [`kanban_dnd::DragEvent`] sequences,
//!   replayed against an in-memory store with conservation checks after
//!   every event ([`script`]).
//!
//! # Quick Start
//!
//! ```ignore
//! use kanban_harness::{assert_board_snapshot, script};
//!
//! #[test]
//! fn drag_into_done() {
//!     let summary = script::replay_file("tests/scripts/into_done.json".as_ref()).unwrap();
//!     assert_board_snapshot!("into_done", &summary.board);
//! }
//! ```
//!
//! Run tests with `BLESS=1` to create or update snapshot files under
//! `tests/snapshots/`.

pub mod fixture;
pub mod golden;
pub mod script;

pub use fixture::StackedLayout;
pub use golden::{board_to_text, diff_text};
pub use script::{ReplayError, ReplaySummary, Script, ScriptedInput, replay, replay_file};
