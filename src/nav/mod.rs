//! D-pad focus navigation
//!
//! One navigator per screen:
//! - Home (clock, date, app pages, media widget, quote)
//! - SimpleTray (quick settings, brightness, notifications, bottom nav)
//! - AppDrawer (paged app list, A-Z filter, search field)
//!
//! Navigators consume key events and mutate their [`SelectionState`]; the
//! activation key goes through a [`LongPressTracker`] for zones that offer a
//! long-press menu.

pub mod drawer;
pub mod graph;
pub mod home;
pub mod tray;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::input::{Key, KeyAction, KeyEvent, LongPressTracker, PairingMode, ResolvedGesture, LONG_PRESS_THRESHOLD_MS};

pub use drawer::{DrawerContent, DrawerNavigator, DrawerZone, LetterFilter};
pub use graph::{Pager, SelectionState, Zone, ZoneLayout};
pub use home::{HomeContent, HomeNavigator, HomeZone};
pub use tray::{TrayContent, TrayNavigator, TrayZone};

/// Navigation symbol derived from a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Activate,
}

impl NavKey {
    pub fn from_key(key: Key, config: &NavConfig) -> Option<Self> {
        let nav = match key {
            Key::Up => NavKey::Up,
            Key::Down => NavKey::Down,
            Key::Left => NavKey::Left,
            Key::Right => NavKey::Right,
            Key::Center | Key::Enter => NavKey::Activate,
            Key::PageUp => NavKey::PageUp,
            Key::PageDown => NavKey::PageDown,
            Key::VolumeUp if config.volume_keys_page => NavKey::PageUp,
            Key::VolumeDown if config.volume_keys_page => NavKey::PageDown,
            _ => return None,
        };
        Some(nav)
    }

    /// Down, Right and PageDown move toward later items
    pub fn is_forward(self) -> bool {
        matches!(self, NavKey::Down | NavKey::Right | NavKey::PageDown)
    }
}

/// Key handling configuration, built once per session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavConfig {
    pub long_press_threshold_ms: u64,
    /// Remap volume keys to page up/down
    pub volume_keys_page: bool,
    pub pairing: PairingMode,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            long_press_threshold_ms: LONG_PRESS_THRESHOLD_MS,
            volume_keys_page: false,
            pairing: PairingMode::Tolerant,
        }
    }
}

impl NavConfig {
    pub fn tracker(&self) -> LongPressTracker {
        LongPressTracker::new(self.long_press_threshold_ms, self.pairing)
    }
}

/// Something the activation key can act on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum Target {
    Clock,
    Date,
    Quote,
    /// App on the home screen, index across pages
    HomeApp { slot: usize },
    MediaButton { index: usize },
    QuickSetting { index: usize },
    ClearAll,
    /// Notification, index across pages
    Notification { index: usize },
    BottomNav { index: usize },
    /// App in the drawer list (after filtering), index across pages
    DrawerApp { index: usize },
    SearchField,
}

/// Result of a key event on a navigator
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum NavOutcome {
    /// Not a navigation key for this screen
    Ignored,
    /// Handled without a visible change
    Consumed,
    /// Focus or selection changed
    Moved,
    /// Short action on the target
    Activate(Target),
    /// Long-press action on the target
    LongPress(Target),
    /// Key standing in for a swipe
    Gesture(ResolvedGesture),
    /// New brightness preference value
    Brightness(f32),
    /// Drawer letter filter applied
    Filter(LetterFilter),
}

/// How a zone reacts to the activation key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Activation {
    /// Fires on the initial key-down
    Immediate(Target),
    /// Short action on release, long action past the hold threshold
    Hold(Target),
    Inert,
}

/// Common focus navigator interface
pub trait FocusNavigator {
    type Zone: Zone;
    type Content: ZoneLayout<Self::Zone>;

    fn selection(&self) -> &SelectionState<Self::Zone>;

    fn handle_key(&mut self, event: &KeyEvent, content: &Self::Content) -> NavOutcome;

    /// Flip the paged zone one page (short vertical swipes)
    fn flip_page(&mut self, forward: bool, content: &Self::Content) -> bool;

    /// Forget any key press in progress
    fn cancel_press(&mut self);
}

/// Keep the tracker in step with non-activation keys. Any fresh key-down
/// re-arms it, so a pending activation never survives another key.
pub(crate) fn track_key(tracker: &mut LongPressTracker, event: &KeyEvent) {
    match event.action {
        KeyAction::Down if event.repeat == 0 => tracker.on_key_down(event.key, event.time_ms),
        KeyAction::Down => {}
        KeyAction::Up => {
            if let Err(e) = tracker.on_key_up(event.key, event.time_ms) {
                warn!("key tracking: {}", e);
            }
        }
    }
}

/// Resolve the activation key for the focused zone
pub(crate) fn resolve_activation(tracker: &mut LongPressTracker, event: &KeyEvent, activation: Activation) -> NavOutcome {
    match event.action {
        KeyAction::Down if event.repeat == 0 => {
            tracker.on_key_down(event.key, event.time_ms);
            match activation {
                Activation::Immediate(target) => {
                    tracker.mark_handled();
                    NavOutcome::Activate(target)
                }
                _ => NavOutcome::Consumed,
            }
        }
        KeyAction::Down => match activation {
            Activation::Hold(target) if tracker.poll(event.key, event.time_ms) => NavOutcome::LongPress(target),
            _ => NavOutcome::Consumed,
        },
        KeyAction::Up => match tracker.on_key_up(event.key, event.time_ms) {
            Ok(release) => match activation {
                Activation::Hold(target) if release.is_short_press() => NavOutcome::Activate(target),
                _ => NavOutcome::Consumed,
            },
            Err(e) => {
                warn!("activation dropped: {}", e);
                NavOutcome::Consumed
            }
        },
    }
}
