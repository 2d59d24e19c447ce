//! Home screen focus
//!
//! Zones top to bottom: clock, date, app pages, media widget, quote. Absent
//! zones are skipped. Left/Right stand in for horizontal swipes everywhere
//! except the media widget.

use serde::{Deserialize, Serialize};

use super::graph::{self, custom, jump, page, step_or_exit, Applied, IndexRule, Pager, SelectionState, Zone, ZoneGraph, ZoneLayout};
use super::{resolve_activation, track_key, Activation, FocusNavigator, NavConfig, NavKey, NavOutcome, Target};
use crate::input::{KeyEvent, LongPressTracker, ResolvedGesture, SwipeDirection};

/// Buttons of the media widget
pub const MEDIA_BUTTONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HomeZone {
    Clock,
    Date,
    Apps,
    MediaWidget,
    Quote,
}

impl Zone for HomeZone {
    const ORDER: &'static [Self] = &[
        HomeZone::Clock,
        HomeZone::Date,
        HomeZone::Apps,
        HomeZone::MediaWidget,
        HomeZone::Quote,
    ];
    const PAGED_ZONE: Self = HomeZone::Apps;
}

/// What the home screen currently shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HomeContent {
    pub clock_visible: bool,
    pub date_visible: bool,
    pub app_count: usize,
    pub apps_per_page: usize,
    /// A media session is active
    pub media_present: bool,
    pub quote_visible: bool,
}

impl Default for HomeContent {
    fn default() -> Self {
        Self {
            clock_visible: true,
            date_visible: true,
            app_count: 0,
            apps_per_page: 8,
            media_present: false,
            quote_visible: false,
        }
    }
}

impl ZoneLayout<HomeZone> for HomeContent {
    fn items(&self, zone: HomeZone) -> Pager {
        let shown = |visible: bool, count: usize| if visible { Pager::single(count) } else { Pager::EMPTY };
        match zone {
            HomeZone::Clock => shown(self.clock_visible, 1),
            HomeZone::Date => shown(self.date_visible, 1),
            HomeZone::Apps => Pager::paged(self.app_count, self.apps_per_page),
            HomeZone::MediaWidget => shown(self.media_present, MEDIA_BUTTONS),
            HomeZone::Quote => shown(self.quote_visible, 1),
        }
    }
}

use HomeZone::*;
use IndexRule::{First, Last};

const HOME_GRAPH: ZoneGraph<HomeZone> = ZoneGraph::new(&[
    jump(Clock, NavKey::Down, &[Date, Apps, MediaWidget, Quote], First),
    jump(Date, NavKey::Up, &[Clock], First),
    jump(Date, NavKey::Down, &[Apps, MediaWidget, Quote], First),
    step_or_exit(Apps, NavKey::Up, &[Date, Clock], First),
    step_or_exit(Apps, NavKey::Down, &[MediaWidget, Quote], First),
    page(Apps, NavKey::PageUp),
    page(Apps, NavKey::PageDown),
    step_or_exit(MediaWidget, NavKey::Up, &[Apps, Date, Clock], Last),
    step_or_exit(MediaWidget, NavKey::Down, &[Quote], First),
    jump(Quote, NavKey::Up, &[MediaWidget, Apps, Date, Clock], Last),
    custom(Clock, NavKey::Left),
    custom(Clock, NavKey::Right),
    custom(Date, NavKey::Left),
    custom(Date, NavKey::Right),
    custom(Apps, NavKey::Left),
    custom(Apps, NavKey::Right),
    custom(Quote, NavKey::Left),
    custom(Quote, NavKey::Right),
]);

pub struct HomeNavigator {
    selection: SelectionState<HomeZone>,
    tracker: LongPressTracker,
    config: NavConfig,
}

impl HomeNavigator {
    pub fn new(config: NavConfig) -> Self {
        Self {
            selection: SelectionState::new(HomeZone::Clock),
            tracker: config.tracker(),
            config,
        }
    }

    fn activation(&self, content: &HomeContent) -> Activation {
        let sel = &self.selection;
        match sel.zone {
            Clock => Activation::Immediate(Target::Clock),
            Date => Activation::Immediate(Target::Date),
            Quote => Activation::Immediate(Target::Quote),
            MediaWidget => Activation::Immediate(Target::MediaButton { index: sel.index }),
            Apps if content.app_count > 0 => Activation::Hold(Target::HomeApp {
                slot: sel.absolute_index(content.apps_per_page),
            }),
            Apps => Activation::Inert,
        }
    }
}

impl FocusNavigator for HomeNavigator {
    type Zone = HomeZone;
    type Content = HomeContent;

    fn selection(&self) -> &SelectionState<HomeZone> {
        &self.selection
    }

    fn handle_key(&mut self, event: &KeyEvent, content: &HomeContent) -> NavOutcome {
        let Some(nav) = NavKey::from_key(event.key, &self.config) else {
            return NavOutcome::Ignored;
        };
        HOME_GRAPH.normalize(&mut self.selection, content);

        if nav == NavKey::Activate {
            let activation = self.activation(content);
            return resolve_activation(&mut self.tracker, event, activation);
        }

        track_key(&mut self.tracker, event);
        if !event.is_down() {
            return NavOutcome::Consumed;
        }

        match HOME_GRAPH.apply(&mut self.selection, nav, content) {
            Applied::Moved => NavOutcome::Moved,
            Applied::Blocked | Applied::Unhandled => NavOutcome::Consumed,
            // Only Left/Right are custom; a held key must not repeat the swipe
            Applied::Custom if event.is_fresh_down() => {
                let direction = if nav == NavKey::Left { SwipeDirection::Left } else { SwipeDirection::Right };
                NavOutcome::Gesture(ResolvedGesture::Swipe { direction })
            }
            Applied::Custom => NavOutcome::Consumed,
        }
    }

    fn flip_page(&mut self, forward: bool, content: &HomeContent) -> bool {
        HOME_GRAPH.normalize(&mut self.selection, content);
        graph::flip_page(&mut self.selection, forward, content)
    }

    fn cancel_press(&mut self) {
        self.tracker.reset();
    }
}
