//! Long-press disambiguation for the activation key
//!
//! No timers are involved: the input system's auto-repeat key-downs re-poll
//! the held duration. A press resolves to a short action on release or a long
//! action once the threshold is crossed, never both.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::input::Key;

/// Held duration after which a press becomes a long press
pub const LONG_PRESS_THRESHOLD_MS: u64 = 700;

/// How unmatched key-ups are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingMode {
    /// Reset silently. The input system may drop key-ups.
    #[default]
    Tolerant,
    /// Report unmatched key-ups as errors (state is still reset)
    Strict,
}

/// Tracking state for the key currently held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyPressState {
    pub tracked_key: Option<Key>,
    pub down_time_ms: u64,
    pub is_holding: bool,
    pub long_press_handled: bool,
}

/// Result of releasing a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRelease {
    /// Held duration, at least 1ms when the key was tracked, 0 otherwise
    pub held_ms: u64,
    pub long_press_fired: bool,
}

impl KeyRelease {
    /// Whether the caller should fire the short-press action
    pub fn is_short_press(&self) -> bool {
        self.held_ms > 0 && !self.long_press_fired
    }
}

#[derive(Debug, Clone)]
pub struct LongPressTracker {
    state: KeyPressState,
    threshold_ms: u64,
    mode: PairingMode,
}

impl LongPressTracker {
    pub fn new(threshold_ms: u64, mode: PairingMode) -> Self {
        Self {
            state: KeyPressState::default(),
            threshold_ms,
            mode,
        }
    }

    pub fn state(&self) -> &KeyPressState {
        &self.state
    }

    /// Arm tracking for `key`, dropping whatever was tracked before
    pub fn on_key_down(&mut self, key: Key, now_ms: u64) {
        if self.state.is_holding && self.state.tracked_key != Some(key) {
            debug!(previous = ?self.state.tracked_key, ?key, "re-arming long press tracker");
        }
        self.state = KeyPressState {
            tracked_key: Some(key),
            down_time_ms: now_ms,
            is_holding: true,
            long_press_handled: false,
        };
    }

    /// Poll on an auto-repeat key-down; true exactly once when the hold
    /// crosses the threshold
    pub fn poll(&mut self, key: Key, now_ms: u64) -> bool {
        if self.state.tracked_key != Some(key) {
            // Initial down went elsewhere; the press belongs to nobody here
            debug!(?key, "repeat of an untracked key, press adopted as handled");
            self.state = KeyPressState {
                tracked_key: Some(key),
                down_time_ms: now_ms,
                is_holding: true,
                long_press_handled: true,
            };
            return false;
        }
        if self.state.long_press_handled {
            return false;
        }
        if now_ms.saturating_sub(self.state.down_time_ms) >= self.threshold_ms {
            self.state.long_press_handled = true;
            debug!(?key, "long press");
            return true;
        }
        false
    }

    /// Mark the current press as consumed so its release is not a short press
    pub fn mark_handled(&mut self) {
        self.state.long_press_handled = true;
    }

    /// Release `key` and reset tracking
    pub fn on_key_up(&mut self, key: Key, now_ms: u64) -> Result<KeyRelease> {
        let state = std::mem::take(&mut self.state);

        if state.tracked_key == Some(key) && state.is_holding {
            return Ok(KeyRelease {
                held_ms: now_ms.saturating_sub(state.down_time_ms).max(1),
                long_press_fired: state.long_press_handled,
            });
        }

        match self.mode {
            PairingMode::Tolerant => Ok(KeyRelease { held_ms: 0, long_press_fired: false }),
            PairingMode::Strict => Err(Error::UnpairedKeyUp {
                tracked: state.tracked_key,
                released: key,
            }),
        }
    }

    /// Forget the tracked key
    pub fn reset(&mut self) {
        self.state = KeyPressState::default();
    }
}

impl Default for LongPressTracker {
    fn default() -> Self {
        Self::new(LONG_PRESS_THRESHOLD_MS, PairingMode::Tolerant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_press() {
        let mut tracker = LongPressTracker::default();
        tracker.on_key_down(Key::Center, 1000);
        assert!(!tracker.poll(Key::Center, 1300));
        let release = tracker.on_key_up(Key::Center, 1400).unwrap();
        assert_eq!(release.held_ms, 400);
        assert!(release.is_short_press());
        assert_eq!(*tracker.state(), KeyPressState::default());
    }

    #[test]
    fn test_long_press_fires_once_at_threshold() {
        let mut tracker = LongPressTracker::default();
        tracker.on_key_down(Key::Enter, 0);
        assert!(!tracker.poll(Key::Enter, 650));
        assert!(tracker.poll(Key::Enter, LONG_PRESS_THRESHOLD_MS));
        // Auto-repeat keeps arriving
        assert!(!tracker.poll(Key::Enter, 750));
        assert!(!tracker.poll(Key::Enter, 2000));
        let release = tracker.on_key_up(Key::Enter, 2100).unwrap();
        assert!(release.long_press_fired);
        assert!(!release.is_short_press());
    }

    #[test]
    fn test_instant_release_still_counts() {
        let mut tracker = LongPressTracker::default();
        tracker.on_key_down(Key::Center, 500);
        let release = tracker.on_key_up(Key::Center, 500).unwrap();
        assert_eq!(release.held_ms, 1);
        assert!(release.is_short_press());
    }

    #[test]
    fn test_new_down_rearms() {
        let mut tracker = LongPressTracker::default();
        tracker.on_key_down(Key::Center, 0);
        assert!(tracker.poll(Key::Center, 800));
        // Key-up was dropped; a fresh press starts clean
        tracker.on_key_down(Key::Center, 5000);
        assert!(!tracker.state().long_press_handled);
        assert!(!tracker.poll(Key::Center, 5100));
        assert!(tracker.on_key_up(Key::Center, 5200).unwrap().is_short_press());
    }

    #[test]
    fn test_mismatched_key_up_resets() {
        let mut tracker = LongPressTracker::default();
        tracker.on_key_down(Key::Center, 0);
        let release = tracker.on_key_up(Key::Down, 100).unwrap();
        assert_eq!(release.held_ms, 0);
        assert!(!release.is_short_press());
        assert_eq!(tracker.state().tracked_key, None);
        // The real release arrives late and is ignored
        assert!(!tracker.on_key_up(Key::Center, 150).unwrap().is_short_press());
    }

    #[test]
    fn test_handled_press_releases_silently() {
        let mut tracker = LongPressTracker::default();
        tracker.on_key_down(Key::Enter, 0);
        tracker.mark_handled();
        assert!(!tracker.poll(Key::Enter, 900));
        assert!(!tracker.on_key_up(Key::Enter, 950).unwrap().is_short_press());
    }

    #[test]
    fn test_repeat_without_down_never_fires() {
        let mut tracker = LongPressTracker::default();
        assert!(!tracker.poll(Key::Center, 100));
        assert_eq!(tracker.state().tracked_key, Some(Key::Center));
        assert!(!tracker.poll(Key::Center, 900));
        assert!(!tracker.on_key_up(Key::Center, 950).unwrap().is_short_press());
        // The next real press is tracked normally
        tracker.on_key_down(Key::Center, 2000);
        assert!(tracker.on_key_up(Key::Center, 2100).unwrap().is_short_press());
    }

    #[test]
    fn test_strict_mode_reports_unpaired_up() {
        let mut tracker = LongPressTracker::new(LONG_PRESS_THRESHOLD_MS, PairingMode::Strict);
        tracker.on_key_down(Key::Center, 0);
        let err = tracker.on_key_up(Key::Enter, 10).unwrap_err();
        assert!(matches!(
            err,
            Error::UnpairedKeyUp { tracked: Some(Key::Center), released: Key::Enter }
        ));
        assert_eq!(tracker.state().tracked_key, None);
    }
}
