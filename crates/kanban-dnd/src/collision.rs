#![forbid(unsafe_code)]

//! Collision resolution: which droppable the drag is "over" this frame.
//!
//! # Rules
//!
//! Column drag: closest column center to the pointer. Item droppables are
//! never considered.
//!
//! Item drag:
//!
//! 1. Droppables containing the pointer.
//! 2. If none, droppables overlapping the active rectangle.
//! 3. The first candidate in registration order wins. There is no area or
//!    z-order weighting.
//! 4. A winning column that holds items is refined to the closest center
//!    among that column's registered item droppables.
//! 5. No candidates: the active item's current column right after a
//!    relocation, else the previous resolution, else nothing.
//!
//! [`resolve`] is pure. Caching the result is the caller's job.
//!
//! # Invariants
//!
//! - Identical inputs give identical output.
//! - Equal center distances keep the earliest registered droppable.
//! - Droppables whose id is not on the board are ignored.

use kanban_core::geometry::{Position, Rect};

use crate::board::Board;
use crate::droppable::Droppable;
use crate::id::DndId;

/// Everything the resolver looks at for one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct CollisionInput<'a> {
    /// The dragged column or item.
    pub active: &'a DndId,
    /// Current pointer position.
    pub pointer: Position,
    /// Current rectangle of the dragged element.
    pub active_rect: Rect,
    /// Candidates in registration order.
    pub droppables: &'a [Droppable],
    pub board: &'a Board,
    /// A cross-column relocation happened and geometry has not settled.
    pub just_relocated: bool,
    /// The previous resolution, if any.
    pub last_resolved: Option<&'a DndId>,
}

/// Which rule produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolvedBy {
    /// Column drag, closest column center.
    ClosestColumn,
    /// Pointer inside the winning droppable.
    PointerWithin,
    /// Active rectangle overlapping the winning droppable.
    RectIntersection,
    /// A populated column refined to its closest item.
    RefinedToItem,
    /// Forced to the active item's column while geometry settles.
    Settling,
    /// The previous resolution, reused.
    Cached,
}

/// A resolved drop target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub target: DndId,
    pub rule: ResolvedBy,
}

impl Resolution {
    fn new(target: DndId, rule: ResolvedBy) -> Self {
        Self { target, rule }
    }
}

/// Resolve the current target. `None` means no target this frame.
#[must_use]
pub fn resolve(input: &CollisionInput<'_>) -> Option<Resolution> {
    if input.active.is_column() {
        return closest_center(live(input).filter(|d| d.id.is_column()), input.pointer)
            .map(|d| Resolution::new(d.id.clone(), ResolvedBy::ClosestColumn));
    }

    let winner = live(input)
        .find(|d| d.rect.contains(input.pointer))
        .map(|d| (d, ResolvedBy::PointerWithin))
        .or_else(|| {
            live(input)
                .find(|d| d.rect.intersects(&input.active_rect))
                .map(|d| (d, ResolvedBy::RectIntersection))
        });

    let Some((winner, rule)) = winner else {
        return fallback(input);
    };

    if let DndId::Column(column_id) = &winner.id {
        let holds_items = input
            .board
            .column(column_id)
            .is_some_and(|c| !c.is_empty());
        if holds_items {
            let members = live(input).filter(|d| {
                d.id.as_item()
                    .is_some_and(|item| input.board.column_of(item) == Some(column_id))
            });
            if let Some(item) = closest_center(members, input.pointer) {
                return Some(Resolution::new(item.id.clone(), ResolvedBy::RefinedToItem));
            }
        }
    }

    Some(Resolution::new(winner.id.clone(), rule))
}

/// Registered droppables that still name something on the board.
fn live<'a>(input: &CollisionInput<'a>) -> impl Iterator<Item = &'a Droppable> {
    let board = input.board;
    input
        .droppables
        .iter()
        .filter(move |d| board.contains(&d.id))
}

fn fallback(input: &CollisionInput<'_>) -> Option<Resolution> {
    if input.just_relocated {
        let column = input
            .active
            .as_item()
            .and_then(|item| input.board.column_of(item))?;
        return Some(Resolution::new(
            DndId::Column(column.clone()),
            ResolvedBy::Settling,
        ));
    }
    input
        .last_resolved
        .map(|id| Resolution::new(id.clone(), ResolvedBy::Cached))
}

/// Minimum center distance; the first of equals wins.
fn closest_center<'a>(
    candidates: impl Iterator<Item = &'a Droppable>,
    pointer: Position,
) -> Option<&'a Droppable> {
    let mut best: Option<(&Droppable, u64)> = None;
    for candidate in candidates {
        let dist = candidate.rect.center_distance_sq(pointer);
        if best.is_none_or(|(_, d)| dist < d) {
            best = Some((candidate, dist));
        }
    }
    best.map(|(d, _)| d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Column;

    // Three columns side by side, 20 wide, 30 tall; items are 3 rows tall.
    fn board() -> Board {
        Board::new(vec![
            Column::new("todo", "Todo").with_items(["T1", "T2"]),
            Column::new("doing", "In Progress"),
            Column::new("done", "Done").with_items(["T3"]),
        ])
    }

    fn droppables() -> Vec<Droppable> {
        vec![
            Droppable::new(DndId::column("todo"), Rect::new(0, 0, 20, 30)),
            Droppable::new(DndId::column("doing"), Rect::new(20, 0, 20, 30)),
            Droppable::new(DndId::column("done"), Rect::new(40, 0, 20, 30)),
            Droppable::new(DndId::item("T1"), Rect::new(1, 2, 18, 3)),
            Droppable::new(DndId::item("T2"), Rect::new(1, 6, 18, 3)),
            Droppable::new(DndId::item("T3"), Rect::new(41, 2, 18, 3)),
        ]
    }

    fn input<'a>(
        active: &'a DndId,
        pointer: Position,
        active_rect: Rect,
        droppables: &'a [Droppable],
        board: &'a Board,
    ) -> CollisionInput<'a> {
        CollisionInput {
            active,
            pointer,
            active_rect,
            droppables,
            board,
            just_relocated: false,
            last_resolved: None,
        }
    }

    #[test]
    fn pointer_within_empty_column() {
        let (board, drops) = (board(), droppables());
        let active = DndId::item("T1");
        let res = resolve(&input(
            &active,
            Position::new(30, 20),
            Rect::new(21, 19, 18, 3),
            &drops,
            &board,
        ))
        .unwrap();
        assert_eq!(res.target, DndId::column("doing"));
        assert_eq!(res.rule, ResolvedBy::PointerWithin);
    }

    #[test]
    fn populated_column_refines_to_closest_item() {
        let (board, drops) = (board(), droppables());
        let active = DndId::item("T1");
        // Empty margin at the bottom of Done; T3 is the only item there.
        let res = resolve(&input(
            &active,
            Position::new(50, 25),
            Rect::new(41, 24, 18, 3),
            &drops,
            &board,
        ))
        .unwrap();
        assert_eq!(res.target, DndId::item("T3"));
        assert_eq!(res.rule, ResolvedBy::RefinedToItem);
    }

    #[test]
    fn registration_order_breaks_ties() {
        let (board, drops) = (board(), droppables());
        let active = DndId::item("T3");
        // Inside both the Todo column and T2; the column was registered first.
        let res = resolve(&input(
            &active,
            Position::new(10, 7),
            Rect::new(1, 6, 18, 3),
            &drops,
            &board,
        ))
        .unwrap();
        // Todo wins step 3, then refines to its closest item.
        assert_eq!(res.target, DndId::item("T2"));
    }

    #[test]
    fn rect_intersection_when_pointer_outside() {
        let (board, drops) = (board(), droppables());
        let active = DndId::item("T1");
        let res = resolve(&input(
            &active,
            Position::new(70, 40),
            Rect::new(35, 28, 10, 5),
            &drops,
            &board,
        ))
        .unwrap();
        // Overlaps the bottom-right corner of In Progress only.
        assert_eq!(res.target, DndId::column("doing"));
        assert_eq!(res.rule, ResolvedBy::RectIntersection);
    }

    #[test]
    fn no_candidates_uses_cache_then_settle() {
        let (board, drops) = (board(), droppables());
        let active = DndId::item("T1");
        let cached = DndId::column("doing");
        let mut inp = input(
            &active,
            Position::new(100, 100),
            Rect::new(100, 100, 5, 5),
            &drops,
            &board,
        );
        assert_eq!(resolve(&inp), None);

        inp.last_resolved = Some(&cached);
        assert_eq!(
            resolve(&inp),
            Some(Resolution::new(cached.clone(), ResolvedBy::Cached))
        );

        inp.just_relocated = true;
        assert_eq!(
            resolve(&inp),
            Some(Resolution::new(DndId::column("todo"), ResolvedBy::Settling))
        );
    }

    #[test]
    fn column_drag_ignores_items() {
        let (board, drops) = (board(), droppables());
        let active = DndId::column("todo");
        let res = resolve(&input(
            &active,
            Position::new(48, 3),
            Rect::new(38, 0, 20, 30),
            &drops,
            &board,
        ))
        .unwrap();
        assert_eq!(res.target, DndId::column("done"));
        assert_eq!(res.rule, ResolvedBy::ClosestColumn);
    }

    #[test]
    fn column_drag_without_columns_has_no_target() {
        let board = board();
        let drops = vec![Droppable::new(DndId::item("T1"), Rect::new(0, 0, 5, 5))];
        let active = DndId::column("todo");
        assert_eq!(
            resolve(&input(
                &active,
                Position::new(1, 1),
                Rect::new(0, 0, 5, 5),
                &drops,
                &board,
            )),
            None
        );
    }

    #[test]
    fn unregistered_items_leave_column_standing() {
        let board = board();
        let drops = vec![Droppable::new(DndId::column("todo"), Rect::new(0, 0, 20, 30))];
        let active = DndId::item("T3");
        let res = resolve(&input(
            &active,
            Position::new(5, 20),
            Rect::new(0, 19, 18, 3),
            &drops,
            &board,
        ))
        .unwrap();
        assert_eq!(res.target, DndId::column("todo"));
    }

    #[test]
    fn stale_droppables_are_ignored() {
        let board = board();
        let drops = vec![
            Droppable::new(DndId::item("gone"), Rect::new(0, 0, 60, 30)),
            Droppable::new(DndId::column("doing"), Rect::new(20, 0, 20, 30)),
        ];
        let active = DndId::item("T1");
        let res = resolve(&input(
            &active,
            Position::new(25, 5),
            Rect::new(21, 4, 18, 3),
            &drops,
            &board,
        ))
        .unwrap();
        assert_eq!(res.target, DndId::column("doing"));
    }

    #[test]
    fn equal_distance_keeps_first() {
        let a = Droppable::new(DndId::item("a"), Rect::new(0, 0, 4, 4));
        let b = Droppable::new(DndId::item("b"), Rect::new(4, 0, 4, 4));
        let drops = [a, b];
        // Centers at doubled x=4 and x=12; pointer at x=4 (doubled 8).
        let best = closest_center(drops.iter(), Position::new(4, 2)).unwrap();
        assert_eq!(best.id, DndId::item("a"));
    }
}
