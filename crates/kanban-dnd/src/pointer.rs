#![forbid(unsafe_code)]

//! Mouse and touch input.
//!
//! A press over a registered droppable arms a drag; it starts once travel
//! exceeds the activation distance. While dragging, the active rectangle is
//! the source rectangle moved by the pointer delta.

use kanban_core::event::Event;
use kanban_core::geometry::{Position, Rect};
use kanban_core::gesture::{DragRecognizer, GestureEvent};

use crate::config::DndConfig;
use crate::id::DndId;
use crate::input::{AdapterContext, DragEvent, InputAdapter, Probe};

#[derive(Debug, Clone)]
struct PointerDrag {
    active: DndId,
    source_rect: Rect,
}

/// Pointer-driven [`InputAdapter`].
#[derive(Debug, Clone)]
pub struct PointerAdapter {
    recognizer: DragRecognizer,
    drag: Option<PointerDrag>,
}

impl PointerAdapter {
    #[must_use]
    pub fn new(config: &DndConfig) -> Self {
        Self {
            recognizer: DragRecognizer::new(config.gesture()),
            drag: None,
        }
    }

    /// The element being dragged, if any.
    #[must_use]
    pub fn active(&self) -> Option<&DndId> {
        self.drag.as_ref().map(|d| &d.active)
    }

    fn probe(drag: &PointerDrag, origin: Position, pos: Position, ctx: AdapterContext<'_>) -> Probe {
        let (dx, dy) = pos.delta_from(origin);
        Probe::Pointer {
            pointer: pos,
            active_rect: drag.source_rect.translated(dx, dy),
            candidates: ctx.droppables.as_slice().to_vec(),
        }
    }
}

impl InputAdapter for PointerAdapter {
    fn handle(&mut self, event: &Event, ctx: AdapterContext<'_>) -> Option<DragEvent> {
        if matches!(event, Event::Tick) {
            return self.drag.is_some().then_some(DragEvent::Settle);
        }

        match self.recognizer.process(event)? {
            GestureEvent::DragStart { origin, .. } => {
                let Some(hit) = ctx.droppables.hit_test(origin) else {
                    kanban_core::trace!(x = origin.x, y = origin.y, "drag started over nothing");
                    return None;
                };
                let drag = PointerDrag {
                    active: hit.id.clone(),
                    source_rect: hit.rect,
                };
                let active = drag.active.clone();
                self.drag = Some(drag);
                Some(DragEvent::Start { active })
            }
            GestureEvent::DragMove { origin, pos } => {
                let drag = self.drag.as_ref()?;
                Some(DragEvent::Over {
                    active: drag.active.clone(),
                    probe: Self::probe(drag, origin, pos, ctx),
                })
            }
            GestureEvent::DragEnd { origin, pos } => {
                let drag = self.drag.take()?;
                let probe = Self::probe(&drag, origin, pos, ctx);
                Some(DragEvent::End {
                    active: drag.active,
                    probe: Some(probe),
                })
            }
            GestureEvent::DragCancel { .. } => {
                let drag = self.drag.take()?;
                Some(DragEvent::Cancel {
                    active: drag.active,
                })
            }
            GestureEvent::Click { .. } => None,
        }
    }

    fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    fn reset(&mut self) {
        self.recognizer.reset();
        self.drag = None;
    }
}
