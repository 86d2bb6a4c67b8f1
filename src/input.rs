//! Input model: raw events, modifier keys, gesture states and intents.
//!
//! The host converts DOM events into [`InputEvent`]s with positions already
//! translated into container-local coordinates. The router turns them into
//! [`Intent`]s; [`GestureState`] is the per-node machine that sits between
//! the two and carries everything needed to compute the next intent.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::transform::Point;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl or Cmd, the platform's shortcut modifier.
    #[must_use]
    pub fn primary(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    /// Left mouse button (or pen contact).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button.
    Secondary,
}

impl Button {
    /// Map a DOM `MouseEvent.button` value.
    #[must_use]
    pub fn from_dom(button: i16) -> Self {
        match button {
            1 => Self::Middle,
            2 => Self::Secondary,
            _ => Self::Primary,
        }
    }
}

/// A keyboard key as reported by the browser (`KeyboardEvent.key`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Wheel / trackpad scroll delta in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WheelDelta {
    /// Horizontal scroll amount.
    pub dx: f64,
    /// Vertical scroll amount (positive = down).
    pub dy: f64,
}

/// What the event target was inside the container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HitTarget {
    /// The diagram or the container background.
    #[default]
    Content,
    /// A control-panel button or panel surface.
    Panel,
}

/// A normalized input event, positions in container-local pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerDown {
        pos: Point,
        button: Button,
        #[serde(default)]
        target: HitTarget,
    },
    PointerMove {
        pos: Point,
    },
    PointerUp {
        pos: Point,
    },
    PointerLeave,
    Wheel {
        pos: Point,
        delta: WheelDelta,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// Touches currently on the surface after the start.
    TouchStart {
        touches: Vec<Point>,
        #[serde(default)]
        target: HitTarget,
    },
    TouchMove {
        touches: Vec<Point>,
    },
    /// Touches still on the surface after the end.
    TouchEnd {
        #[serde(default)]
        touches: Vec<Point>,
    },
    KeyDown {
        key: Key,
        #[serde(default)]
        modifiers: Modifiers,
    },
    /// The container received focus or was hovered.
    Focus,
}

impl InputEvent {
    /// Whether this event originates from a touch surface.
    #[must_use]
    pub fn is_touch(&self) -> bool {
        matches!(self, Self::TouchStart { .. } | Self::TouchMove { .. } | Self::TouchEnd { .. })
    }
}

/// Where a zoom step is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Pivot {
    /// A point in container-local coordinates (cursor, pinch midpoint).
    At { point: Point },
    /// The center of the container.
    Center,
}

/// A normalized gesture intent, applied by [`crate::actions`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    /// Set the translation to `baseline + offset` (drag in progress).
    PanFrom { baseline: Point, offset: Point },
    /// Shift by a fixed step (keyboard, panel button).
    MoveBy { dx: f64, dy: f64, animate: bool },
    /// Multiply the scale about `pivot`. `discrete` steps honor the upper clamp.
    ZoomAt { factor: f64, pivot: Pivot, discrete: bool, animate: bool },
    /// Fit the content to the container.
    Reset { animate: bool },
}

/// Per-node gesture state. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A drag (mouse or single touch) is in progress.
    Panning {
        /// Pointer position at gesture start.
        anchor: Point,
        /// Translation that `anchor` maps to. Rebased when another intent
        /// moves the view mid-drag.
        baseline: Point,
        /// Latest pointer position seen by the drag.
        last: Point,
    },
    /// A two-finger pinch is in progress.
    Pinching {
        /// Finger distance at the previous step.
        baseline_distance: f64,
    },
}

impl GestureState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
