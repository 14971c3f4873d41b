#![forbid(unsafe_code)]

//! Pointer gesture recognition: press, activation, drag, release.
//!
//! [`DragRecognizer`] turns raw mouse and touch [`Event`]s into
//! [`GestureEvent`]s. A press only becomes a drag once the pointer has moved
//! *more than* [`GestureConfig::activation_distance`] from the contact point
//! (Euclidean); anything less followed by a release is a click.
//!
//! # State machine
//!
//! ```text
//! Idle ──press──▶ Armed ──move > threshold──▶ Dragging ──release──▶ Idle
//!                   │                            │
//!                   └──release──▶ Idle (Click)   └──escape/focus loss──▶ Idle (Cancel)
//! ```
//!
//! # Invariants
//!
//! 1. Exactly one `DragStart` precedes any `DragMove` of a gesture.
//! 2. Every `DragStart` is followed by exactly one `DragEnd` or `DragCancel`.
//! 3. Only one pointer is tracked; a second touch contact is ignored.

use crate::event::{Event, KeyCode, MouseButton, MouseEventKind, TouchPhase};
use crate::geometry::Position;

/// Default activation distance in layout units.
pub const DEFAULT_ACTIVATION_DISTANCE: u16 = 5;

/// Configuration for drag gesture detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GestureConfig {
    /// Movement that must be exceeded before a press becomes a drag (default: 5).
    pub activation_distance: u16,
    /// Whether Escape cancels an active drag (default: true).
    pub cancel_on_escape: bool,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            activation_distance: DEFAULT_ACTIVATION_DISTANCE,
            cancel_on_escape: true,
        }
    }
}

impl GestureConfig {
    /// Set the activation distance.
    #[must_use]
    pub fn with_activation_distance(mut self, distance: u16) -> Self {
        self.activation_distance = distance;
        self
    }

    /// Do not cancel on Escape.
    #[must_use]
    pub fn no_escape_cancel(mut self) -> Self {
        self.cancel_on_escape = false;
        self
    }
}

/// Which physical pointer drives a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// Primary mouse button.
    Mouse,
    /// A touch contact with its platform id.
    Touch(u64),
}

/// Recognized pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    /// Press and release without exceeding the activation distance.
    Click { pos: Position, pointer: PointerKind },
    /// The activation distance was exceeded.
    DragStart {
        origin: Position,
        pos: Position,
        pointer: PointerKind,
    },
    /// Pointer moved during a drag.
    DragMove { origin: Position, pos: Position },
    /// Pointer released during a drag.
    DragEnd { origin: Position, pos: Position },
    /// Drag aborted (Escape, focus loss, touch cancel, foreign button).
    DragCancel { origin: Position },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    #[default]
    Idle,
    Armed {
        origin: Position,
        pointer: PointerKind,
    },
    Dragging {
        origin: Position,
        pointer: PointerKind,
    },
}

/// Stateful recognizer for one pointer at a time.
#[derive(Debug, Clone, Default)]
pub struct DragRecognizer {
    config: GestureConfig,
    phase: Phase,
}

impl DragRecognizer {
    /// Create a recognizer.
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
        }
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Whether a drag has been activated.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging { .. })
    }

    /// Whether a press is waiting for the activation distance.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        matches!(self.phase, Phase::Armed { .. })
    }

    /// Drop any in-progress gesture without emitting an event.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
    }

    /// Feed one event.
    pub fn process(&mut self, event: &Event) -> Option<GestureEvent> {
        match event {
            Event::Mouse(mouse) => {
                let pos = mouse.position();
                match mouse.kind {
                    MouseEventKind::Down(MouseButton::Left) => {
                        self.press(pos, PointerKind::Mouse)
                    }
                    MouseEventKind::Down(_) => self.cancel(),
                    MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                        self.motion(pos, PointerKind::Mouse)
                    }
                    MouseEventKind::Drag(_) => None,
                    MouseEventKind::Up(MouseButton::Left) => {
                        self.release(pos, PointerKind::Mouse)
                    }
                    MouseEventKind::Up(_) => None,
                }
            }
            Event::Touch(touch) => {
                let pos = touch.position();
                let pointer = PointerKind::Touch(touch.id);
                match touch.phase {
                    TouchPhase::Start => self.press(pos, pointer),
                    TouchPhase::Move => self.motion(pos, pointer),
                    TouchPhase::End => self.release(pos, pointer),
                    TouchPhase::Cancel if self.tracks(pointer) => self.cancel(),
                    TouchPhase::Cancel => None,
                }
            }
            Event::Key(key)
                if key.is_actionable()
                    && key.code == KeyCode::Escape
                    && self.config.cancel_on_escape =>
            {
                self.cancel()
            }
            Event::Focus(false) => self.cancel(),
            Event::Key(_) | Event::Focus(true) | Event::Tick => None,
        }
    }

    fn tracks(&self, pointer: PointerKind) -> bool {
        match self.phase {
            Phase::Idle => false,
            Phase::Armed { pointer: p, .. } | Phase::Dragging { pointer: p, .. } => p == pointer,
        }
    }

    fn press(&mut self, pos: Position, pointer: PointerKind) -> Option<GestureEvent> {
        if self.phase != Phase::Idle {
            return None;
        }
        self.phase = Phase::Armed {
            origin: pos,
            pointer,
        };
        None
    }

    fn motion(&mut self, pos: Position, pointer: PointerKind) -> Option<GestureEvent> {
        match self.phase {
            Phase::Armed { origin, pointer: p } if p == pointer => {
                let threshold = u64::from(self.config.activation_distance);
                if pos.distance_sq(origin) > threshold * threshold {
                    self.phase = Phase::Dragging { origin, pointer };
                    Some(GestureEvent::DragStart {
                        origin,
                        pos,
                        pointer,
                    })
                } else {
                    None
                }
            }
            Phase::Dragging { origin, pointer: p } if p == pointer => {
                Some(GestureEvent::DragMove { origin, pos })
            }
            _ => None,
        }
    }

    fn release(&mut self, pos: Position, pointer: PointerKind) -> Option<GestureEvent> {
        match self.phase {
            Phase::Armed { pointer: p, .. } if p == pointer => {
                self.phase = Phase::Idle;
                Some(GestureEvent::Click { pos, pointer })
            }
            Phase::Dragging { origin, pointer: p } if p == pointer => {
                self.phase = Phase::Idle;
                Some(GestureEvent::DragEnd { origin, pos })
            }
            _ => None,
        }
    }

    fn cancel(&mut self) -> Option<GestureEvent> {
        let phase = std::mem::take(&mut self.phase);
        match phase {
            Phase::Dragging { origin, .. } => Some(GestureEvent::DragCancel { origin }),
            Phase::Armed { .. } | Phase::Idle => None,
        }
    }
}
