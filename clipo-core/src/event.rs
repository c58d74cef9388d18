//! Input events and the source they are pulled from.
//!
//! Window-level listeners (pointer release outside the canvas, global key
//! presses) are modelled as events from an [`InputSource`], so hosts and
//! tests feed the editor the same way.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Keyboard modifiers held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct Modifiers {
    /// Shift key: proportional resize.
    pub shift: bool,
    /// Control key: zoom shortcuts.
    pub ctrl: bool,
    /// Alt/Option key: duplicate on drag.
    pub alt: bool,
    /// Meta/Command key: treated like Control.
    pub meta: bool,
}

impl Modifiers {
    /// No modifiers.
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Only Shift held.
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// Only Control held.
    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    /// Only Alt held.
    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };

    /// Control or Meta.
    #[must_use]
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Keys the editor reacts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", content = "char")]
pub enum Key {
    /// Delete or Backspace.
    Delete,
    /// Escape.
    Escape,
    /// Any printable character.
    Char(char),
}

/// Everything the editor can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    /// Primary button pressed at a screen position.
    PointerDown {
        /// Screen X.
        x: f32,
        /// Screen Y.
        y: f32,
        /// Held modifiers.
        modifiers: Modifiers,
    },
    /// Pointer moved.
    PointerMove {
        /// Screen X.
        x: f32,
        /// Screen Y.
        y: f32,
        /// Held modifiers.
        modifiers: Modifiers,
    },
    /// Primary button released (anywhere in the window).
    PointerUp {
        /// Screen X.
        x: f32,
        /// Screen Y.
        y: f32,
    },
    /// Pointer left the window.
    PointerLeave,
    /// Scroll wheel.
    Wheel {
        /// Vertical delta; negative scrolls up.
        delta_y: f32,
        /// Held modifiers.
        modifiers: Modifiers,
    },
    /// Key pressed.
    KeyDown {
        /// The key.
        key: Key,
        /// Held modifiers.
        modifiers: Modifiers,
    },
    /// Window resized.
    Resize {
        /// New width in pixels.
        width: f32,
        /// New height in pixels.
        height: f32,
    },
}

impl InputEvent {
    /// Pointer-down without modifiers.
    #[must_use]
    pub fn down(x: f32, y: f32) -> Self {
        Self::PointerDown {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    /// Pointer-move without modifiers.
    #[must_use]
    pub fn moved(x: f32, y: f32) -> Self {
        Self::PointerMove {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    /// Pointer-up.
    #[must_use]
    pub fn up(x: f32, y: f32) -> Self {
        Self::PointerUp { x, y }
    }

    /// Key press.
    #[must_use]
    pub fn key(key: Key, modifiers: Modifiers) -> Self {
        Self::KeyDown { key, modifiers }
    }
}

/// A source of input events the editor subscribes to.
pub trait InputSource {
    /// Next pending event, or `None` when drained.
    fn next_event(&mut self) -> Option<InputEvent>;
}

/// An in-memory queue of events.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    queue: VecDeque<InputEvent>,
}

impl ScriptedInput {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event.
    pub fn push(&mut self, event: InputEvent) {
        self.queue.push_back(event);
    }

    /// Number of queued events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl FromIterator<InputEvent> for ScriptedInput {
    fn from_iter<T: IntoIterator<Item = InputEvent>>(iter: T) -> Self {
        Self {
            queue: iter.into_iter().collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn next_event(&mut self) -> Option<InputEvent> {
        self.queue.pop_front()
    }
}
