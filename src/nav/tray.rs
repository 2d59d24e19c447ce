//! Simple tray focus (quick settings and notifications panel)
//!
//! Zones top to bottom: quick settings row, brightness slider, clear-all,
//! paged notifications, bottom nav row. Zones disabled by flag or without
//! items are skipped.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::graph::{self, custom, jump, page, step, step_or_exit, Applied, IndexRule, Pager, SelectionState, Zone, ZoneGraph, ZoneLayout};
use super::{resolve_activation, track_key, Activation, FocusNavigator, NavConfig, NavKey, NavOutcome, Target};
use crate::input::{KeyEvent, LongPressTracker};

/// Brightness change per Left/Right press
pub const BRIGHTNESS_STEP: f32 = 0.05;

/// Buttons of the bottom nav row
pub const BOTTOM_NAV_BUTTONS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrayZone {
    QuickSettings,
    Brightness,
    ClearAll,
    Notifications,
    BottomNav,
}

impl Zone for TrayZone {
    const ORDER: &'static [Self] = &[
        TrayZone::QuickSettings,
        TrayZone::Brightness,
        TrayZone::ClearAll,
        TrayZone::Notifications,
        TrayZone::BottomNav,
    ];
    const PAGED_ZONE: Self = TrayZone::Notifications;
}

/// What the tray currently shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrayContent {
    pub quick_settings_enabled: bool,
    pub quick_settings_count: usize,
    pub brightness_enabled: bool,
    pub clear_all_enabled: bool,
    pub notification_count: usize,
    pub notifications_per_page: usize,
    pub bottom_nav_enabled: bool,
    /// Current brightness preference, 0.0-1.0
    pub brightness: f32,
}

impl Default for TrayContent {
    fn default() -> Self {
        Self {
            quick_settings_enabled: true,
            quick_settings_count: 5,
            brightness_enabled: true,
            clear_all_enabled: true,
            notification_count: 0,
            notifications_per_page: 4,
            bottom_nav_enabled: true,
            brightness: 0.5,
        }
    }
}

impl ZoneLayout<TrayZone> for TrayContent {
    fn items(&self, zone: TrayZone) -> Pager {
        let shown = |enabled: bool, count: usize| if enabled { Pager::single(count) } else { Pager::EMPTY };
        match zone {
            TrayZone::QuickSettings => shown(self.quick_settings_enabled, self.quick_settings_count),
            TrayZone::Brightness => shown(self.brightness_enabled, 1),
            TrayZone::ClearAll => shown(self.clear_all_enabled, 1),
            TrayZone::Notifications => Pager::paged(self.notification_count, self.notifications_per_page),
            TrayZone::BottomNav => shown(self.bottom_nav_enabled, BOTTOM_NAV_BUTTONS),
        }
    }
}

use IndexRule::{First, Last};
use TrayZone::*;

const TRAY_GRAPH: ZoneGraph<TrayZone> = ZoneGraph::new(&[
    step(QuickSettings, NavKey::Left),
    step(QuickSettings, NavKey::Right),
    jump(QuickSettings, NavKey::Down, &[Brightness, ClearAll, Notifications, BottomNav], First),
    custom(Brightness, NavKey::Left),
    custom(Brightness, NavKey::Right),
    jump(Brightness, NavKey::Up, &[QuickSettings], First),
    jump(Brightness, NavKey::Down, &[ClearAll, Notifications, BottomNav], First),
    jump(ClearAll, NavKey::Up, &[Brightness, QuickSettings], First),
    jump(ClearAll, NavKey::Down, &[Notifications, BottomNav], First),
    step_or_exit(Notifications, NavKey::Up, &[ClearAll, Brightness, QuickSettings], First),
    step_or_exit(Notifications, NavKey::Down, &[BottomNav], First),
    page(Notifications, NavKey::PageUp),
    page(Notifications, NavKey::PageDown),
    jump(BottomNav, NavKey::Up, &[Notifications, ClearAll, Brightness, QuickSettings], Last),
    step(BottomNav, NavKey::Left),
    step(BottomNav, NavKey::Right),
]);

pub struct TrayNavigator {
    selection: SelectionState<TrayZone>,
    tracker: LongPressTracker,
    config: NavConfig,
    brightness: f32,
}

impl TrayNavigator {
    pub fn new(config: NavConfig) -> Self {
        Self {
            selection: SelectionState::new(TrayZone::QuickSettings),
            tracker: config.tracker(),
            config,
            brightness: TrayContent::default().brightness,
        }
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    /// Take the brightness preference from outside (host or another screen)
    pub fn sync_brightness(&mut self, value: f32) {
        self.brightness = value.clamp(0.0, 1.0);
    }

    fn adjust_brightness(&mut self, forward: bool) -> f32 {
        let delta = if forward { BRIGHTNESS_STEP } else { -BRIGHTNESS_STEP };
        // Round to whole percents so repeated steps do not drift
        let value = ((self.brightness + delta) * 100.0).round() / 100.0;
        self.brightness = value.clamp(0.0, 1.0);
        debug!(brightness = self.brightness, "brightness adjusted");
        self.brightness
    }

    fn activation(&self, content: &TrayContent) -> Activation {
        let sel = &self.selection;
        match sel.zone {
            QuickSettings => Activation::Immediate(Target::QuickSetting { index: sel.index }),
            Brightness => Activation::Inert,
            ClearAll => Activation::Immediate(Target::ClearAll),
            Notifications if content.notification_count > 0 => Activation::Hold(Target::Notification {
                index: sel.absolute_index(content.notifications_per_page),
            }),
            Notifications => Activation::Inert,
            BottomNav => Activation::Immediate(Target::BottomNav { index: sel.index }),
        }
    }
}

impl FocusNavigator for TrayNavigator {
    type Zone = TrayZone;
    type Content = TrayContent;

    fn selection(&self) -> &SelectionState<TrayZone> {
        &self.selection
    }

    fn handle_key(&mut self, event: &KeyEvent, content: &TrayContent) -> NavOutcome {
        let Some(nav) = NavKey::from_key(event.key, &self.config) else {
            return NavOutcome::Ignored;
        };
        TRAY_GRAPH.normalize(&mut self.selection, content);

        if nav == NavKey::Activate {
            let activation = self.activation(content);
            return resolve_activation(&mut self.tracker, event, activation);
        }

        track_key(&mut self.tracker, event);
        if !event.is_down() {
            return NavOutcome::Consumed;
        }

        match TRAY_GRAPH.apply(&mut self.selection, nav, content) {
            Applied::Moved => NavOutcome::Moved,
            Applied::Blocked | Applied::Unhandled => NavOutcome::Consumed,
            // Brightness slider; repeats keep sliding
            Applied::Custom => NavOutcome::Brightness(self.adjust_brightness(nav.is_forward())),
        }
    }

    fn flip_page(&mut self, forward: bool, content: &TrayContent) -> bool {
        TRAY_GRAPH.normalize(&mut self.selection, content);
        graph::flip_page(&mut self.selection, forward, content)
    }

    fn cancel_press(&mut self) {
        self.tracker.reset();
    }
}
