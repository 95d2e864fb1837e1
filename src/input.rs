//! Input model: modifier keys and the gesture state machine.
//!
//! `Modifiers` captures the keys held at the time of a pointer or keyboard
//! event. `InputState` is the gesture being tracked between pointer-down and
//! pointer-up; each active variant owns its session, and dropping the
//! session releases the pointer capture and removes the preview.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::Deserialize;

use crate::gestures::drag::DragSession;
use crate::gestures::resize::ResizeSession;

/// Keyboard modifier keys held during an event.
///
/// Only Shift changes behavior (additive selection, coarse nudge). The other
/// keys are carried so recorded host events deserialize as they were captured.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
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
    /// Only Shift held.
    #[must_use]
    pub fn shift() -> Self {
        Self { shift: true, ..Self::default() }
    }

    /// Whether a click adds to (or toggles within) the selection rather
    /// than replacing it.
    #[must_use]
    pub fn additive(self) -> bool {
        self.shift
    }

    /// Whether a nudge uses the coarse step.
    #[must_use]
    pub fn coarse(self) -> bool {
        self.shift
    }
}

/// Gesture currently in progress.
#[derive(Debug, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Moving an object by its body.
    Dragging(DragSession),
    /// Resizing an object by one of its eight handles.
    Resizing(ResizeSession),
}

impl InputState {
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Id of the object the active gesture targets.
    #[must_use]
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Dragging(session) => Some(session.target()),
            Self::Resizing(session) => Some(session.target()),
        }
    }
}
