use std::collections::HashMap;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::api::error::{EngineError, Result};

/// Mouse buttons the engine tracks, in index order 0, 1, 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

impl MouseButton {
    pub const ALL: [MouseButton; 3] = [MouseButton::Left, MouseButton::Middle, MouseButton::Right];

    pub fn index(self) -> usize {
        match self {
            MouseButton::Left => 0,
            MouseButton::Middle => 1,
            MouseButton::Right => 2,
        }
    }

    pub fn from_index(index: usize) -> Result<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(EngineError::InvalidMouseButton(index))
    }
}

/// Input event types the host delivers.
/// Keys are identified by name (e.g. `"Left"`, `"Space"`, `"A"`); the
/// engine gives names no meaning of its own. Coordinates are window
/// client pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    KeyDown { key: String },
    KeyUp { key: String },
    MouseDown { button: MouseButton },
    MouseUp { button: MouseButton },
    /// A completed click at (x, y).
    MouseClick { button: MouseButton, x: i32, y: i32 },
    /// The cursor moved to (x, y) inside the client area.
    PointerMove { x: i32, y: i32 },
    /// The cursor left the client area.
    PointerLeave,
}

/// Keyboard and mouse state as last reported by the host.
#[derive(Debug, Default)]
pub struct InputState {
    keys: HashMap<String, bool>,
    buttons: [bool; 3],
    clicks: [Option<IVec2>; 3],
    cursor: Option<IVec2>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyDown { key } => {
                self.keys.insert(key, true);
            }
            InputEvent::KeyUp { key } => {
                self.keys.insert(key, false);
            }
            InputEvent::MouseDown { button } => self.buttons[button.index()] = true,
            InputEvent::MouseUp { button } => self.buttons[button.index()] = false,
            InputEvent::MouseClick { button, x, y } => {
                self.clicks[button.index()] = Some(IVec2::new(x, y));
            }
            InputEvent::PointerMove { x, y } => self.cursor = Some(IVec2::new(x, y)),
            InputEvent::PointerLeave => self.cursor = None,
        }
    }

    /// Keys never seen read as not pressed.
    pub fn key_pressed(&self, key: &str) -> bool {
        self.keys.get(key).copied().unwrap_or(false)
    }

    pub fn buttons(&self) -> [bool; 3] {
        self.buttons
    }

    pub fn button(&self, button: MouseButton) -> bool {
        self.buttons[button.index()]
    }

    /// Position of the last click with `button`, consuming it.
    pub fn take_click(&mut self, button: MouseButton) -> Option<IVec2> {
        self.clicks[button.index()].take()
    }

    pub fn cursor(&self) -> Option<IVec2> {
        self.cursor
    }
}
