#![forbid(unsafe_code)]

//! Engine configuration.
//!
//! Defaults can be overridden from the environment with
//! [`DndConfig::from_env`]:
//!
//! | variable | values |
//! |----------|--------|
//! | `KANBAN_DND_ACTIVATION_DISTANCE` | unsigned integer |
//! | `KANBAN_DND_SETTLE` | `next-evaluation`, `deferred`, `disabled` |
//! | `KANBAN_DND_CANCEL_ON_ESCAPE` | `1`/`true`/`0`/`false` |
//!
//! Unparseable values are ignored.

use std::fmt;
use std::str::FromStr;

use kanban_core::gesture::{DEFAULT_ACTIVATION_DISTANCE, GestureConfig};

/// When the post-relocation settle flag clears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SettlePolicy {
    /// Cleared by the next resolver evaluation.
    #[default]
    NextEvaluation,
    /// Cleared by the next settle tick, however many evaluations happen first.
    Deferred,
    /// Never set. For hosts whose geometry is always consistent.
    Disabled,
}

/// Unrecognized [`SettlePolicy`] name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSettlePolicy(pub String);

impl fmt::Display for UnknownSettlePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown settle policy: {}", self.0)
    }
}

impl std::error::Error for UnknownSettlePolicy {}

impl FromStr for SettlePolicy {
    type Err = UnknownSettlePolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "next-evaluation" | "next" => Ok(Self::NextEvaluation),
            "deferred" | "tick" => Ok(Self::Deferred),
            "disabled" | "off" => Ok(Self::Disabled),
            other => Err(UnknownSettlePolicy(other.to_owned())),
        }
    }
}

/// Drag-and-drop engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DndConfig {
    /// Pointer travel that must be exceeded before a press becomes a drag (default: 5).
    pub activation_distance: u16,
    /// Whether Escape cancels a pointer drag (default: true).
    pub cancel_on_escape: bool,
    /// Settle flag behavior after a cross-column relocation.
    pub settle: SettlePolicy,
}

impl Default for DndConfig {
    fn default() -> Self {
        Self {
            activation_distance: DEFAULT_ACTIVATION_DISTANCE,
            cancel_on_escape: true,
            settle: SettlePolicy::default(),
        }
    }
}

impl DndConfig {
    /// Set the activation distance.
    #[must_use]
    pub fn with_activation_distance(mut self, distance: u16) -> Self {
        self.activation_distance = distance;
        self
    }

    /// Set whether Escape cancels a pointer drag.
    #[must_use]
    pub fn with_cancel_on_escape(mut self, cancel: bool) -> Self {
        self.cancel_on_escape = cancel;
        self
    }

    /// Set the settle policy.
    #[must_use]
    pub fn with_settle(mut self, settle: SettlePolicy) -> Self {
        self.settle = settle;
        self
    }

    /// Defaults with environment overrides applied.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup` (environment-shaped).
    #[must_use]
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(distance) = lookup("KANBAN_DND_ACTIVATION_DISTANCE")
            .and_then(|v| v.trim().parse::<u16>().ok())
        {
            self.activation_distance = distance;
        }
        if let Some(settle) =
            lookup("KANBAN_DND_SETTLE").and_then(|v| v.parse::<SettlePolicy>().ok())
        {
            self.settle = settle;
        }
        if let Some(cancel) = lookup("KANBAN_DND_CANCEL_ON_ESCAPE").and_then(|v| parse_flag(&v)) {
            self.cancel_on_escape = cancel;
        }
        self
    }

    /// Gesture recognizer settings derived from this config.
    #[must_use]
    pub fn gesture(&self) -> GestureConfig {
        let config = GestureConfig::default().with_activation_distance(self.activation_distance);
        if self.cancel_on_escape {
            config
        } else {
            config.no_escape_cancel()
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
