//! Property-based invariant tests for the move engine and collision resolver.
//!
//! 1. Conservation: no event sequence creates, destroys, or duplicates items.
//! 2. Uniqueness: every item is in exactly one column after every event.
//! 3. Cancel restores the board exactly, whatever happened mid-drag.
//! 4. Dropping an item on itself changes nothing.
//! 5. The resolver is deterministic, and so is the engine.
//! 6. Rejected events leave the board untouched.

use kanban_core::geometry::{Position, Rect};
use kanban_dnd::collision::{self, CollisionInput};
use kanban_dnd::{
    Board, Column, DndConfig, DndId, DragEvent, DropOutcome, DropPosition, DroppableRegistry,
    ItemId, MoveEngine, Probe, SettlePolicy,
};
use proptest::prelude::*;

const COLUMNS: [&str; 3] = ["todo", "doing", "done"];
const ITEMS: [&str; 6] = ["T1", "T2", "T3", "T4", "T5", "T6"];

fn board_strategy() -> impl Strategy<Value = Board> {
    (
        prop::collection::vec(0usize..COLUMNS.len(), ITEMS.len()),
        any::<prop::sample::Index>(),
    )
        .prop_map(|(placement, shuffle)| {
            let rotate = shuffle.index(ITEMS.len());
            let mut columns: Vec<Vec<&str>> = vec![Vec::new(); COLUMNS.len()];
            for k in 0..ITEMS.len() {
                let item = ITEMS[(k + rotate) % ITEMS.len()];
                columns[placement[k]].push(item);
            }
            Board::new(
                COLUMNS
                    .iter()
                    .zip(columns)
                    .map(|(id, items)| Column::new(*id, *id).with_items(items))
                    .collect(),
            )
        })
}

fn layout(board: &Board) -> DroppableRegistry {
    let mut reg = DroppableRegistry::new();
    for (ci, column) in board.columns().iter().enumerate() {
        reg.register(
            DndId::Column(column.id().clone()),
            Rect::new(ci as u16 * 20, 0, 20, 30),
        );
    }
    for (ci, column) in board.columns().iter().enumerate() {
        for (ii, item) in column.items().iter().enumerate() {
            reg.register(
                DndId::Item(item.clone()),
                Rect::new(ci as u16 * 20 + 1, 2 + ii as u16 * 4, 18, 3),
            );
        }
    }
    reg
}

/// Any column, any item, or an id that is not on the board.
fn target(k: usize) -> DndId {
    let k = k % (COLUMNS.len() + ITEMS.len() + 1);
    if k < COLUMNS.len() {
        DndId::column(COLUMNS[k])
    } else if k < COLUMNS.len() + ITEMS.len() {
        DndId::item(ITEMS[k - COLUMNS.len()])
    } else {
        DndId::item("ghost")
    }
}

fn position(k: u8) -> DropPosition {
    match k % 3 {
        0 => DropPosition::Before,
        1 => DropPosition::After,
        _ => DropPosition::Append,
    }
}

#[derive(Debug, Clone)]
enum Step {
    Start(usize),
    Keyboard(usize, u8),
    Pointer(u16, u16),
    EndKeyboard(usize, u8),
    EndPointer(u16, u16),
    EndNowhere,
    Cancel,
    Settle,
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0usize..16).prop_map(Step::Start),
        (0usize..16, any::<u8>()).prop_map(|(t, p)| Step::Keyboard(t, p)),
        (0u16..70, 0u16..40).prop_map(|(x, y)| Step::Pointer(x, y)),
        (0usize..16, any::<u8>()).prop_map(|(t, p)| Step::EndKeyboard(t, p)),
        (0u16..70, 0u16..40).prop_map(|(x, y)| Step::EndPointer(x, y)),
        Just(Step::EndNowhere),
        Just(Step::Cancel),
        Just(Step::Settle),
    ]
}

fn pointer_probe(reg: &DroppableRegistry, x: u16, y: u16) -> Probe {
    Probe::Pointer {
        pointer: Position::new(x, y),
        active_rect: Rect::new(x.saturating_sub(9), y.saturating_sub(1), 18, 3),
        candidates: reg.as_slice().to_vec(),
    }
}

/// The drag event for `step`, using the registry measured at drag start.
fn event_for(step: &Step, engine: &MoveEngine, reg: &DroppableRegistry) -> DragEvent {
    let active = engine
        .session()
        .map(|s| s.active().clone())
        .unwrap_or_else(|| DndId::item("T1"));
    match step {
        Step::Start(k) => DragEvent::Start { active: target(*k) },
        Step::Keyboard(k, p) => DragEvent::Over {
            active,
            probe: Probe::Keyboard {
                target: target(*k),
                position: position(*p),
            },
        },
        Step::Pointer(x, y) => DragEvent::Over {
            active,
            probe: pointer_probe(reg, *x, *y),
        },
        Step::EndKeyboard(k, p) => DragEvent::End {
            active,
            probe: Some(Probe::Keyboard {
                target: target(*k),
                position: position(*p),
            }),
        },
        Step::EndPointer(x, y) => DragEvent::End {
            active,
            probe: Some(pointer_probe(reg, *x, *y)),
        },
        Step::EndNowhere => DragEvent::End {
            active,
            probe: None,
        },
        Step::Cancel => DragEvent::Cancel { active },
        Step::Settle => DragEvent::Settle,
    }
}

fn sorted_items(board: &Board) -> Vec<ItemId> {
    let mut ids: Vec<ItemId> = board.item_ids().cloned().collect();
    ids.sort();
    ids
}

fn run(engine: &mut MoveEngine, steps: &[Step]) -> Vec<bool> {
    let mut reg = layout(engine.board());
    let mut results = Vec::with_capacity(steps.len());
    for step in steps {
        if !engine.is_dragging() {
            reg = layout(engine.board());
        }
        let event = event_for(step, engine, &reg);
        results.push(engine.apply(&event).is_ok());
    }
    results
}

proptest! {
    #[test]
    fn conservation_and_uniqueness(
        board in board_strategy(),
        steps in prop::collection::vec(step_strategy(), 0..40),
    ) {
        let expected = sorted_items(&board);
        let mut engine = MoveEngine::new(board, DndConfig::default());
        let mut reg = layout(engine.board());
        for step in &steps {
            if !engine.is_dragging() {
                reg = layout(engine.board());
            }
            let event = event_for(step, &engine, &reg);
            let _ = engine.apply(&event);
            prop_assert!(engine.board().check_invariants().is_ok(), "after {:?}", step);
            prop_assert_eq!(sorted_items(engine.board()), expected.clone());
            prop_assert_eq!(engine.board().columns().len(), COLUMNS.len());
        }
    }

    #[test]
    fn cancel_restores_board(
        board in board_strategy(),
        item in 0usize..ITEMS.len(),
        steps in prop::collection::vec(
            prop_oneof![
                (0usize..16, any::<u8>()).prop_map(|(t, p)| Step::Keyboard(t, p)),
                (0u16..70, 0u16..40).prop_map(|(x, y)| Step::Pointer(x, y)),
                Just(Step::Settle),
            ],
            0..20,
        ),
    ) {
        let before = board.clone();
        let mut engine = MoveEngine::new(board, DndConfig::default());
        let active = DndId::item(ITEMS[item]);
        engine.on_drag_start(active.clone()).unwrap();
        run(&mut engine, &steps);
        prop_assert!(engine.is_dragging());
        engine.on_drag_cancel(&active).unwrap();
        prop_assert_eq!(engine.board(), &before);
        prop_assert!(!engine.is_dragging());
    }

    #[test]
    fn drop_on_self_is_noop(board in board_strategy(), item in 0usize..ITEMS.len()) {
        let before = board.clone();
        let mut engine = MoveEngine::new(board, DndConfig::default());
        let active = DndId::item(ITEMS[item]);
        engine.on_drag_start(active.clone()).unwrap();
        prop_assert_eq!(engine.drop_at(&active, Some(&active)).unwrap(), DropOutcome::Unchanged);
        prop_assert_eq!(engine.board(), &before);
    }

    #[test]
    fn resolver_is_deterministic(
        board in board_strategy(),
        item in 0usize..ITEMS.len(),
        x in 0u16..70,
        y in 0u16..40,
        just_relocated in any::<bool>(),
        cached in prop::option::of(0usize..16),
    ) {
        let reg = layout(&board);
        let active = DndId::item(ITEMS[item]);
        let last = cached.map(target);
        let input = CollisionInput {
            active: &active,
            pointer: Position::new(x, y),
            active_rect: Rect::new(x.saturating_sub(9), y.saturating_sub(1), 18, 3),
            droppables: reg.as_slice(),
            board: &board,
            just_relocated,
            last_resolved: last.as_ref(),
        };
        let first = collision::resolve(&input);
        let second = collision::resolve(&input);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn engine_is_deterministic(
        board in board_strategy(),
        steps in prop::collection::vec(step_strategy(), 0..30),
        deferred in any::<bool>(),
    ) {
        let settle = if deferred { SettlePolicy::Deferred } else { SettlePolicy::NextEvaluation };
        let config = DndConfig::default().with_settle(settle);
        let mut a = MoveEngine::new(board.clone(), config.clone());
        let mut b = MoveEngine::new(board, config);
        let ra = run(&mut a, &steps);
        let rb = run(&mut b, &steps);
        prop_assert_eq!(ra, rb);
        prop_assert_eq!(a.board(), b.board());
        prop_assert_eq!(a.is_dragging(), b.is_dragging());
    }

    #[test]
    fn rejected_events_change_nothing(board in board_strategy(), k in 0usize..16, p in any::<u8>()) {
        let mut engine = MoveEngine::new(board, DndConfig::default());
        let active = DndId::item("T1");
        engine.on_drag_start(active).unwrap();
        let snapshot = engine.board().clone();
        let stranger = DndId::item("T2");
        let probe = Probe::Keyboard { target: target(k), position: position(p) };
        prop_assert!(engine.on_drag_over(&stranger, &probe).is_err());
        prop_assert!(engine.on_drag_end(&stranger, Some(&probe)).is_err());
        prop_assert!(engine.on_drag_cancel(&stranger).is_err());
        prop_assert_eq!(engine.board(), &snapshot);
        prop_assert!(engine.is_dragging());
    }
}
