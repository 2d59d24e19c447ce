//! Input handling - pointer gestures, keys, long press
//!
//! This module provides:
//! - Gesture classification (swipes, page moves, taps)
//! - Long-press tracking for the activation key
//! - Keycode conversion utilities

mod gestures;
mod keys;
mod long_press;

pub use gestures::*;
pub use keys::*;
pub use long_press::*;
