//! Gesture classification for single-pointer input
//!
//! One continuous touch (down -> moves -> up) resolves to at most one gesture:
//! - Tap and double tap
//! - Horizontal swipes (left, right)
//! - Short vertical swipes (page moves, rate limited by a cooldown)
//! - Long vertical swipes (open another screen)
//!
//! Classification is direction locked: the dominant axis of the net
//! displacement decides which branch is evaluated.

use std::collections::VecDeque;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Long swipes need this multiple of the base velocity threshold
pub const LONG_SWIPE_VELOCITY_FACTOR: f64 = 1.8;

/// Documented range for the user tunable short swipe ratio
pub const SHORT_SWIPE_RATIO_RANGE: RangeInclusive<f64> = 0.1..=2.0;

/// Documented range for the user tunable long swipe ratio
pub const LONG_SWIPE_RATIO_RANGE: RangeInclusive<f64> = 1.0..=4.0;

const MIN_SHORT_SWIPE_DISTANCE: f64 = 8.0;
const MIN_SHORT_SWIPE_VELOCITY: f64 = 1.0;

/// Only samples within the last 100ms count toward the release velocity
const VELOCITY_HORIZON_MS: u64 = 100;

/// A gap this long between samples means the pointer had stopped
const ASSUME_STOPPED_MS: u64 = 40;

const VELOCITY_HISTORY: usize = 20;

/// Raw pointer sample (position in px, monotonic time in ms)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
    pub t: u64,
}

impl PointerSample {
    pub fn new(x: f64, y: f64, t: u64) -> Self {
        Self { x, y, t }
    }

    fn distance_to(&self, other: &PointerSample) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Direction of a horizontal swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeDirection {
    Left,
    Right,
}

/// Direction of a vertical swipe (screen y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwipeKind {
    /// Single page move
    Short,
    /// Opens another screen
    Long,
}

/// Resolved gesture, at most one per touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "gesture", rename_all = "snake_case")]
pub enum ResolvedGesture {
    Tap,
    DoubleTap,
    Swipe { direction: SwipeDirection },
    VerticalSwipe { kind: SwipeKind, direction: VerticalDirection },
}

/// How a screen interprets vertical motion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalProfile {
    /// Screen binds long swipes and also moves pages on short swipes
    WithLongSwipe,
    /// Every vertical fling is a page move
    PageOnly,
}

/// Configuration for gesture classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Base swipe distance in pixels
    pub distance_threshold_px: f64,

    /// Scales the page-move distance (user preference)
    pub short_swipe_ratio: f64,

    /// Scales the long swipe distance (user preference)
    pub long_swipe_ratio: f64,

    /// Base fling velocity in px/s
    pub velocity_threshold: f64,

    /// Minimum time between two accepted page moves
    pub page_move_cooldown_ms: u64,

    /// Relaxes the short swipe distance. Empirical, recalibrate on devices.
    pub short_swipe_distance_factor: f64,

    /// Relaxes the short swipe velocity. Empirical, recalibrate on devices.
    pub short_swipe_velocity_factor: f64,

    /// Maximum duration of a tap
    pub tap_timeout_ms: u64,

    /// Maximum movement of a tap
    pub tap_slop_px: f64,

    /// Maximum gap between two taps of a double tap
    pub double_tap_timeout_ms: u64,

    /// Maximum distance between two taps of a double tap
    pub double_tap_slop_px: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            distance_threshold_px: 100.0,
            short_swipe_ratio: 0.5,
            long_swipe_ratio: 1.5,
            velocity_threshold: 100.0,
            page_move_cooldown_ms: 50,
            short_swipe_distance_factor: 0.7,
            short_swipe_velocity_factor: 0.3,
            tap_timeout_ms: 300,
            tap_slop_px: 20.0,
            double_tap_timeout_ms: 300,
            double_tap_slop_px: 100.0,
        }
    }
}

impl GestureConfig {
    /// Clamp the user tunable ratios into their documented ranges
    pub fn sanitized(mut self) -> Self {
        self.short_swipe_ratio = clamp_ratio("short_swipe_ratio", self.short_swipe_ratio, SHORT_SWIPE_RATIO_RANGE);
        self.long_swipe_ratio = clamp_ratio("long_swipe_ratio", self.long_swipe_ratio, LONG_SWIPE_RATIO_RANGE);
        self
    }

    pub fn long_swipe_distance(&self) -> f64 {
        let base = self.distance_threshold_px;
        (base * self.long_swipe_ratio).max(base)
    }

    pub fn long_swipe_velocity(&self) -> f64 {
        let base = self.velocity_threshold;
        (base * LONG_SWIPE_VELOCITY_FACTOR).max(base)
    }

    pub fn short_swipe_distance(&self) -> f64 {
        (self.distance_threshold_px * self.short_swipe_ratio * self.short_swipe_distance_factor)
            .max(MIN_SHORT_SWIPE_DISTANCE)
    }

    pub fn short_swipe_velocity(&self) -> f64 {
        (self.velocity_threshold * self.short_swipe_velocity_factor).max(MIN_SHORT_SWIPE_VELOCITY)
    }
}

fn clamp_ratio(name: &str, value: f64, range: RangeInclusive<f64>) -> f64 {
    if value.is_nan() {
        warn!("{} is NaN, using {}", name, range.start());
        return *range.start();
    }
    let clamped = value.clamp(*range.start(), *range.end());
    if clamped != value {
        warn!("{} {} outside {:?}, clamped to {}", name, value, range, clamped);
    }
    clamped
}

/// Net motion of one touch at release
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub dx: f64,
    pub dy: f64,
    /// Release velocity in px/s
    pub vx: f64,
    pub vy: f64,
}

/// Threshold classification of a release, without tap or cooldown handling
pub fn classify_motion(config: &GestureConfig, motion: &Motion, profile: VerticalProfile) -> Option<ResolvedGesture> {
    if motion.dx.abs() > motion.dy.abs() {
        // A flick back against the drag resolves to nothing
        let direction = if motion.dx > 0.0 { SwipeDirection::Right } else { SwipeDirection::Left };
        let (dx, vx) = match direction {
            SwipeDirection::Right => (motion.dx, motion.vx),
            SwipeDirection::Left => (-motion.dx, -motion.vx),
        };
        if dx > config.distance_threshold_px && vx > config.velocity_threshold {
            return Some(ResolvedGesture::Swipe { direction });
        }
        return None;
    }

    let direction = if motion.dy > 0.0 { VerticalDirection::Down } else { VerticalDirection::Up };
    let dy = motion.dy.abs();
    let vy = motion.vy.abs();

    if profile == VerticalProfile::WithLongSwipe
        && dy > config.long_swipe_distance()
        && vy > config.long_swipe_velocity()
    {
        return Some(ResolvedGesture::VerticalSwipe { kind: SwipeKind::Long, direction });
    }

    if dy > config.short_swipe_distance() && vy > config.short_swipe_velocity() {
        return Some(ResolvedGesture::VerticalSwipe { kind: SwipeKind::Short, direction });
    }

    None
}

/// Release velocity estimate over the most recent samples
#[derive(Debug, Clone, Default)]
pub struct VelocityTracker {
    samples: VecDeque<PointerSample>,
}

impl VelocityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, sample: PointerSample) {
        if self.samples.len() == VELOCITY_HISTORY {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Velocity in px/s at the newest sample, (0, 0) if the pointer had stopped
    pub fn velocity(&self) -> (f64, f64) {
        let Some(newest) = self.samples.back() else {
            return (0.0, 0.0);
        };

        let mut oldest = newest;
        let mut previous = newest;
        for sample in self.samples.iter().rev().skip(1) {
            if newest.t.saturating_sub(sample.t) > VELOCITY_HORIZON_MS
                || previous.t.saturating_sub(sample.t) > ASSUME_STOPPED_MS
            {
                break;
            }
            oldest = sample;
            previous = sample;
        }

        let dt = newest.t.saturating_sub(oldest.t);
        if dt == 0 {
            return (0.0, 0.0);
        }
        let secs = dt as f64 / 1000.0;
        ((newest.x - oldest.x) / secs, (newest.y - oldest.y) / secs)
    }
}

/// Tracking state of the touch in progress
#[derive(Debug, Clone)]
struct ActiveTouch {
    origin: PointerSample,
    velocity: VelocityTracker,
}

impl ActiveTouch {
    fn new(origin: PointerSample) -> Self {
        let mut velocity = VelocityTracker::new();
        velocity.add(origin);
        Self { origin, velocity }
    }
}

/// Single-pointer gesture classifier
pub struct GestureClassifier {
    pub config: GestureConfig,
    touch: Option<ActiveTouch>,
    /// Release of the last plain tap, for double tap detection
    last_tap: Option<PointerSample>,
    /// Release time of the last accepted page move
    last_page_move_ms: Option<u64>,
}

impl GestureClassifier {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            touch: None,
            last_tap: None,
            last_page_move_ms: None,
        }
    }

    /// Handle pointer down. Any touch still in progress is discarded.
    pub fn pointer_down(&mut self, sample: PointerSample) {
        if self.touch.is_some() {
            debug!("pointer down without up, dropping previous touch");
        }
        self.touch = Some(ActiveTouch::new(sample));
    }

    /// Handle pointer motion. Motion without a down is ignored.
    pub fn pointer_move(&mut self, sample: PointerSample) {
        if let Some(touch) = self.touch.as_mut() {
            touch.velocity.add(sample);
        }
    }

    /// Handle pointer up - returns the resolved gesture, if any
    pub fn pointer_up(&mut self, sample: PointerSample, profile: VerticalProfile) -> Option<ResolvedGesture> {
        let mut touch = self.touch.take()?;
        touch.velocity.add(sample);

        let origin = touch.origin;
        let (vx, vy) = touch.velocity.velocity();
        let motion = Motion {
            dx: sample.x - origin.x,
            dy: sample.y - origin.y,
            vx,
            vy,
        };
        let duration = sample.t.saturating_sub(origin.t);

        // Slop never reaches into the short swipe band
        let slop = self.config.tap_slop_px.min(self.config.short_swipe_distance());
        if motion.dx.abs() <= slop && motion.dy.abs() <= slop && duration <= self.config.tap_timeout_ms
        {
            return Some(self.resolve_tap(origin, sample));
        }

        let gesture = classify_motion(&self.config, &motion, profile)?;

        if let ResolvedGesture::VerticalSwipe { kind: SwipeKind::Short, .. } = gesture {
            if let Some(last) = self.last_page_move_ms {
                let elapsed = sample.t.saturating_sub(last);
                if elapsed < self.config.page_move_cooldown_ms {
                    debug!("page move suppressed, {}ms into cooldown", elapsed);
                    return None;
                }
            }
            self.last_page_move_ms = Some(sample.t);
        }

        debug!(?gesture, dx = motion.dx, dy = motion.dy, vx, vy, "gesture resolved");
        Some(gesture)
    }

    /// Handle pointer cancel - drop the touch without a gesture
    pub fn pointer_cancel(&mut self) {
        self.touch = None;
    }

    /// Check if a touch is currently being tracked
    pub fn has_active_touch(&self) -> bool {
        self.touch.is_some()
    }

    fn resolve_tap(&mut self, origin: PointerSample, release: PointerSample) -> ResolvedGesture {
        if let Some(previous) = self.last_tap.take() {
            let gap = origin.t.saturating_sub(previous.t);
            if gap <= self.config.double_tap_timeout_ms
                && previous.distance_to(&origin) <= self.config.double_tap_slop_px
            {
                debug!("double tap");
                return ResolvedGesture::DoubleTap;
            }
        }
        self.last_tap = Some(release);
        ResolvedGesture::Tap
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}
