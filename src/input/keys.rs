//! Logical keys and key events
//!
//! Hardware reports evdev keycodes; the core only works with the small set of
//! logical keys a D-pad launcher cares about.

use serde::{Deserialize, Serialize};

/// Logical key understood by the navigators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Center,
    Enter,
    PageUp,
    PageDown,
    Back,
    VolumeUp,
    VolumeDown,
}

impl Key {
    /// Center and Enter both activate the focused item
    pub fn is_activation(self) -> bool {
        matches!(self, Key::Center | Key::Enter)
    }
}

/// Key transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    Down,
    Up,
}

/// A single key event as delivered by the input system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    pub action: KeyAction,
    /// Auto-repeat count, 0 for the initial press
    #[serde(default)]
    pub repeat: u32,
    /// Monotonic timestamp in milliseconds
    pub time_ms: u64,
}

impl KeyEvent {
    pub fn down(key: Key, time_ms: u64) -> Self {
        Self { key, action: KeyAction::Down, repeat: 0, time_ms }
    }

    pub fn repeat(key: Key, repeat: u32, time_ms: u64) -> Self {
        Self { key, action: KeyAction::Down, repeat, time_ms }
    }

    pub fn up(key: Key, time_ms: u64) -> Self {
        Self { key, action: KeyAction::Up, repeat: 0, time_ms }
    }

    pub fn is_down(&self) -> bool {
        self.action == KeyAction::Down
    }

    /// Initial key-down, not an auto-repeat
    pub fn is_fresh_down(&self) -> bool {
        self.is_down() && self.repeat == 0
    }
}

/// Convert evdev keycode to a logical key
/// Used by backends that read libinput events directly
pub fn evdev_to_key(keycode: u32) -> Option<Key> {
    let key = match keycode {
        103 => Key::Up,
        108 => Key::Down,
        105 => Key::Left,
        106 => Key::Right,
        353 => Key::Center,     // KEY_SELECT (D-pad center)
        28 | 96 => Key::Enter,  // KEY_ENTER, KEY_KPENTER
        104 => Key::PageUp,
        109 => Key::PageDown,
        158 | 1 => Key::Back,   // KEY_BACK, KEY_ESC
        115 => Key::VolumeUp,
        114 => Key::VolumeDown,
        _ => return None,
    };
    Some(key)
}

/// Convert XKB keycode to a logical key (XKB = evdev + 8)
pub fn xkb_to_key(keycode: u32) -> Option<Key> {
    evdev_to_key(keycode.checked_sub(8)?)
}
