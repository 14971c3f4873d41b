#![forbid(unsafe_code)]

//! Keyboard drag: pick up, move a cursor with the arrow keys, drop.
//!
//! The cursor is a `(column, slot)` pair. In the column that currently holds
//! the item, `slot` is the index the item would end up at; in any other
//! column it is the insertion index. Targets are computed from the board
//! alone, without geometry.
//!
//! `Over` is only emitted while the cursor is in the item's own column. A
//! cursor in another column is carried to the drop, which moves the item
//! across once, straight to the chosen slot.
//!
//! | key | idle | holding |
//! |-----|------|---------|
//! | Space / Enter | pick up focused item | drop at cursor |
//! | arrows | move focus | move cursor |
//! | Home / End | focus first / last in column | cursor to top / bottom |
//! | Escape | - | cancel |

use kanban_core::event::{Event, KeyCode};
use kanban_core::id::ItemId;

use crate::board::Board;
use crate::id::DndId;
use crate::input::{AdapterContext, DragEvent, InputAdapter, Probe};
use crate::position::DropPosition;

/// Cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    /// First slot of the column.
    Top,
    /// Last slot of the column.
    Bottom,
}

impl Direction {
    /// Map an arrow, Home or End key.
    #[must_use]
    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::Up => Some(Self::Up),
            KeyCode::Down => Some(Self::Down),
            KeyCode::Left => Some(Self::Left),
            KeyCode::Right => Some(Self::Right),
            KeyCode::Home => Some(Self::Top),
            KeyCode::End => Some(Self::Bottom),
            _ => None,
        }
    }
}

/// Highest valid slot for `item` in `column`.
fn max_slot(board: &Board, item: &ItemId, column: usize) -> usize {
    board.columns().get(column).map_or(0, |c| {
        if c.position(item).is_some() {
            c.len().saturating_sub(1)
        } else {
            c.len()
        }
    })
}

/// Move the cursor one step. Stays put at the board edges.
fn step(board: &Board, item: &ItemId, cursor: (usize, usize), dir: Direction) -> (usize, usize) {
    let (column, slot) = cursor;
    let sideways = |to: usize| (to, slot.min(max_slot(board, item, to)));
    match dir {
        Direction::Up => (column, slot.saturating_sub(1)),
        Direction::Down => (column, (slot + 1).min(max_slot(board, item, column))),
        Direction::Top => (column, 0),
        Direction::Bottom => (column, max_slot(board, item, column)),
        Direction::Left if column > 0 => sideways(column - 1),
        Direction::Right if column + 1 < board.columns().len() => sideways(column + 1),
        Direction::Left | Direction::Right => cursor,
    }
}

/// The drop target a cursor position stands for.
#[must_use]
pub fn cursor_target(
    board: &Board,
    item: &ItemId,
    column: usize,
    slot: usize,
) -> Option<(DndId, DropPosition)> {
    let col = board.columns().get(column)?;
    match col.items().get(slot) {
        Some(at) => Some((DndId::Item(at.clone()), DropPosition::Before)),
        None if col.position(item).is_some() => None,
        None => Some((DndId::Column(col.id().clone()), DropPosition::Append)),
    }
}

/// Target one keyboard step away from `item`'s current place, if it moves.
#[must_use]
pub fn step_target(board: &Board, item: &ItemId, dir: Direction) -> Option<(DndId, DropPosition)> {
    let here = board.locate(item)?;
    let (column, slot) = step(board, item, here, dir);
    if (column, slot) == here {
        return None;
    }
    cursor_target(board, item, column, slot)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Held {
    item: ItemId,
    column: usize,
    slot: usize,
}

/// Keyboard-driven [`InputAdapter`].
#[derive(Debug, Clone, Default)]
pub struct KeyboardAdapter {
    focus: Option<ItemId>,
    held: Option<Held>,
}

impl KeyboardAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Focus `item`.
    pub fn set_focus(&mut self, item: impl Into<ItemId>) {
        self.focus = Some(item.into());
    }

    /// The focused item.
    #[must_use]
    pub fn focus(&self) -> Option<&ItemId> {
        self.focus.as_ref()
    }

    /// Cursor `(column, slot)` while holding an item.
    #[must_use]
    pub fn cursor(&self) -> Option<(usize, usize)> {
        self.held.as_ref().map(|h| (h.column, h.slot))
    }

    fn keyboard_probe(board: &Board, held: &Held) -> Option<Probe> {
        cursor_target(board, &held.item, held.column, held.slot)
            .map(|(target, position)| Probe::Keyboard { target, position })
    }

    fn move_focus(&mut self, board: &Board, dir: Direction) {
        let here = self.focus.as_ref().and_then(|f| board.locate(f));
        let Some((column, index)) = here else {
            self.focus = board.item_ids().next().cloned();
            return;
        };
        let next = match dir {
            Direction::Up => Some((column, index.saturating_sub(1))),
            Direction::Down => Some((column, index + 1)),
            Direction::Left => column.checked_sub(1).map(|c| (c, index)),
            Direction::Right => Some((column + 1, index)),
            Direction::Top => Some((column, 0)),
            Direction::Bottom => Some((column, usize::MAX)),
        };
        let target = next.and_then(|(c, i)| {
            let col = board.columns().get(c)?;
            col.items().get(i.min(col.len().checked_sub(1)?))
        });
        if let Some(id) = target {
            self.focus = Some(id.clone());
        }
    }
}

impl InputAdapter for KeyboardAdapter {
    fn handle(&mut self, event: &Event, ctx: AdapterContext<'_>) -> Option<DragEvent> {
        let key = match event {
            Event::Key(key) if key.is_actionable() => key,
            Event::Focus(false) => {
                let held = self.held.take()?;
                return Some(DragEvent::Cancel {
                    active: DndId::Item(held.item),
                });
            }
            Event::Tick => return self.held.is_some().then_some(DragEvent::Settle),
            _ => return None,
        };
        let board = ctx.board;

        if key.code == KeyCode::Escape {
            let held = self.held.take()?;
            return Some(DragEvent::Cancel {
                active: DndId::Item(held.item),
            });
        }

        if key.code == KeyCode::Enter || key.is_char(' ') {
            if let Some(held) = self.held.take() {
                let probe = Self::keyboard_probe(board, &held);
                return Some(DragEvent::End {
                    active: DndId::Item(held.item),
                    probe,
                });
            }
            let item = self.focus.clone()?;
            let (column, slot) = board.locate(&item)?;
            self.held = Some(Held {
                item: item.clone(),
                column,
                slot,
            });
            return Some(DragEvent::Start {
                active: DndId::Item(item),
            });
        }

        let dir = Direction::from_key(key.code)?;
        let Some(held) = self.held.as_mut() else {
            self.move_focus(board, dir);
            return None;
        };
        let next = step(board, &held.item, (held.column, held.slot), dir);
        if next == (held.column, held.slot) {
            return None;
        }
        (held.column, held.slot) = next;
        let held = self.held.as_ref()?;
        if board.locate(&held.item).map(|(c, _)| c) != Some(held.column) {
            return None;
        }
        Some(DragEvent::Over {
            active: DndId::Item(held.item.clone()),
            probe: Self::keyboard_probe(board, held)?,
        })
    }

    fn is_dragging(&self) -> bool {
        self.held.is_some()
    }

    fn reset(&mut self) {
        self.held = None;
    }
}
