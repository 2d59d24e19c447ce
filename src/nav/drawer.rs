//! App drawer focus
//!
//! The paged app list is the primary axis. The search field above it and
//! the A-Z strip beside it are focus overlays: the list cursor survives
//! while they have focus.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::graph::{self, custom, jump, page, step, step_or_exit, Applied, IndexRule, Pager, SelectionState, Zone, ZoneGraph, ZoneLayout};
use super::{resolve_activation, track_key, Activation, FocusNavigator, NavConfig, NavKey, NavOutcome, Target};
use crate::input::{KeyEvent, LongPressTracker};

/// "All" marker plus A..Z
pub const AZ_ENTRIES: usize = 27;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawerZone {
    Search,
    List,
    AzFilter,
}

impl Zone for DrawerZone {
    const ORDER: &'static [Self] = &[DrawerZone::Search, DrawerZone::List, DrawerZone::AzFilter];
    const PAGED_ZONE: Self = DrawerZone::List;

    fn holds_cursor(self) -> bool {
        self == DrawerZone::List
    }
}

/// Letter filter of the A-Z strip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterFilter {
    #[default]
    All,
    Letter(char),
}

impl LetterFilter {
    /// Strip entry to filter; 0 is "all", 1..=26 are A..Z
    pub fn from_index(index: usize) -> Self {
        match index.min(AZ_ENTRIES - 1) {
            0 => LetterFilter::All,
            i => LetterFilter::Letter(char::from(b'A' + (i - 1) as u8)),
        }
    }

    pub fn index(self) -> usize {
        match self {
            LetterFilter::All => 0,
            LetterFilter::Letter(c) if c.is_ascii_alphabetic() => (c.to_ascii_uppercase() as u8 - b'A') as usize + 1,
            LetterFilter::Letter(_) => 0,
        }
    }

    /// Whether an app label passes the filter (first letter, case-insensitive)
    pub fn matches(self, label: &str) -> bool {
        match self {
            LetterFilter::All => true,
            LetterFilter::Letter(c) => label
                .chars()
                .next()
                .is_some_and(|first| first.eq_ignore_ascii_case(&c)),
        }
    }
}

/// What the drawer currently shows. `app_count` is the count after filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawerContent {
    pub app_count: usize,
    pub apps_per_page: usize,
    pub search_enabled: bool,
    pub az_filter_enabled: bool,
}

impl Default for DrawerContent {
    fn default() -> Self {
        Self {
            app_count: 0,
            apps_per_page: 10,
            search_enabled: true,
            az_filter_enabled: true,
        }
    }
}

impl ZoneLayout<DrawerZone> for DrawerContent {
    fn items(&self, zone: DrawerZone) -> Pager {
        match zone {
            DrawerZone::Search if self.search_enabled => Pager::single(1),
            DrawerZone::List => Pager::paged(self.app_count, self.apps_per_page),
            DrawerZone::AzFilter if self.az_filter_enabled => Pager::single(AZ_ENTRIES),
            _ => Pager::EMPTY,
        }
    }
}

use DrawerZone::*;
use IndexRule::{First, Keep};

const DRAWER_GRAPH: ZoneGraph<DrawerZone> = ZoneGraph::new(&[
    step_or_exit(List, NavKey::Up, &[Search], First),
    step(List, NavKey::Down),
    page(List, NavKey::PageUp),
    page(List, NavKey::PageDown),
    jump(List, NavKey::Right, &[AzFilter], Keep),
    jump(AzFilter, NavKey::Left, &[List], Keep),
    custom(AzFilter, NavKey::Up),
    custom(AzFilter, NavKey::Down),
    jump(Search, NavKey::Down, &[List], First),
]);

pub struct DrawerNavigator {
    selection: SelectionState<DrawerZone>,
    tracker: LongPressTracker,
    config: NavConfig,
    az_index: usize,
    filter: LetterFilter,
}

impl DrawerNavigator {
    pub fn new(config: NavConfig) -> Self {
        Self {
            selection: SelectionState::new(List),
            tracker: config.tracker(),
            config,
            az_index: 0,
            filter: LetterFilter::All,
        }
    }

    pub fn search_focused(&self) -> bool {
        self.selection.zone == Search
    }

    pub fn az_focused(&self) -> bool {
        self.selection.zone == AzFilter
    }

    /// Highlighted entry of the A-Z strip
    pub fn az_index(&self) -> usize {
        self.az_index
    }

    /// Filter currently applied to the list
    pub fn filter(&self) -> LetterFilter {
        self.filter
    }

    /// Drop search or A-Z focus back to the list. Returns false when the list
    /// already had focus.
    pub fn leave_overlay(&mut self) -> bool {
        if self.selection.zone == List {
            return false;
        }
        self.selection.zone = List;
        self.tracker.reset();
        true
    }

    /// Back to an unfiltered first page, e.g. when the drawer is reopened
    pub fn reset(&mut self) {
        self.selection = SelectionState::new(List);
        self.tracker.reset();
        self.az_index = 0;
        self.filter = LetterFilter::All;
    }

    fn move_letter(&mut self, forward: bool) -> bool {
        let index = if forward {
            (self.az_index + 1).min(AZ_ENTRIES - 1)
        } else {
            self.az_index.saturating_sub(1)
        };
        let changed = index != self.az_index;
        self.az_index = index;
        changed
    }

    fn apply_filter(&mut self) -> LetterFilter {
        self.filter = LetterFilter::from_index(self.az_index);
        self.selection.zone = List;
        self.selection.page = 0;
        self.selection.index = 0;
        debug!(filter = ?self.filter, "letter filter applied");
        self.filter
    }

    fn activation(&self, content: &DrawerContent) -> Activation {
        match self.selection.zone {
            Search => Activation::Immediate(Target::SearchField),
            List if content.app_count > 0 => Activation::Hold(Target::DrawerApp {
                index: self.selection.absolute_index(content.apps_per_page),
            }),
            List | AzFilter => Activation::Inert,
        }
    }
}

impl FocusNavigator for DrawerNavigator {
    type Zone = DrawerZone;
    type Content = DrawerContent;

    fn selection(&self) -> &SelectionState<DrawerZone> {
        &self.selection
    }

    fn handle_key(&mut self, event: &KeyEvent, content: &DrawerContent) -> NavOutcome {
        let Some(nav) = NavKey::from_key(event.key, &self.config) else {
            return NavOutcome::Ignored;
        };
        DRAWER_GRAPH.normalize(&mut self.selection, content);

        if nav == NavKey::Activate {
            if self.az_focused() && event.is_fresh_down() {
                self.tracker.on_key_down(event.key, event.time_ms);
                self.tracker.mark_handled();
                return NavOutcome::Filter(self.apply_filter());
            }
            let activation = self.activation(content);
            return resolve_activation(&mut self.tracker, event, activation);
        }

        track_key(&mut self.tracker, event);
        if !event.is_down() {
            return NavOutcome::Consumed;
        }

        match DRAWER_GRAPH.apply(&mut self.selection, nav, content) {
            Applied::Moved => NavOutcome::Moved,
            Applied::Blocked | Applied::Unhandled => NavOutcome::Consumed,
            Applied::Custom if self.move_letter(nav.is_forward()) => NavOutcome::Moved,
            Applied::Custom => NavOutcome::Consumed,
        }
    }

    fn flip_page(&mut self, forward: bool, content: &DrawerContent) -> bool {
        DRAWER_GRAPH.normalize(&mut self.selection, content);
        graph::flip_page(&mut self.selection, forward, content)
    }

    fn cancel_press(&mut self) {
        self.tracker.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Key;

    fn apps(count: usize) -> DrawerContent {
        DrawerContent { app_count: count, ..DrawerContent::default() }
    }

    fn press(nav: &mut DrawerNavigator, key: Key, content: &DrawerContent) -> NavOutcome {
        nav.handle_key(&KeyEvent::down(key, 0), content)
    }

    fn at(nav: &DrawerNavigator) -> (DrawerZone, usize, usize) {
        (nav.selection().zone, nav.selection().page, nav.selection().index)
    }

    #[test]
    fn test_list_crosses_page_boundary() {
        let content = apps(30);
        let mut nav = DrawerNavigator::new(NavConfig::default());
        nav.selection.index = 9;
        assert_eq!(press(&mut nav, Key::Down, &content), NavOutcome::Moved);
        assert_eq!(at(&nav), (List, 1, 0));
        assert_eq!(press(&mut nav, Key::Up, &content), NavOutcome::Moved);
        assert_eq!(at(&nav), (List, 0, 9));
    }

    #[test]
    fn test_up_from_top_reaches_search() {
        let content = apps(12);
        let mut nav = DrawerNavigator::new(NavConfig::default());
        press(&mut nav, Key::Up, &content);
        assert!(nav.search_focused());
        assert_eq!(press(&mut nav, Key::Center, &content), NavOutcome::Activate(Target::SearchField));
        press(&mut nav, Key::Down, &content);
        assert_eq!(at(&nav), (List, 0, 0));

        let no_search = DrawerContent { search_enabled: false, ..apps(12) };
        let mut nav = DrawerNavigator::new(NavConfig::default());
        assert_eq!(press(&mut nav, Key::Up, &no_search), NavOutcome::Consumed);
        assert_eq!(at(&nav), (List, 0, 0));
    }

    #[test]
    fn test_az_strip_keeps_list_selection() {
        let content = apps(25);
        let mut nav = DrawerNavigator::new(NavConfig::default());
        press(&mut nav, Key::PageDown, &content);
        press(&mut nav, Key::Down, &content);
        assert_eq!(at(&nav), (List, 1, 1));

        press(&mut nav, Key::Right, &content);
        assert!(nav.az_focused());
        press(&mut nav, Key::Left, &content);
        assert_eq!(at(&nav), (List, 1, 1));
    }

    #[test]
    fn test_az_index_clamps() {
        let content = apps(5);
        let mut nav = DrawerNavigator::new(NavConfig::default());
        press(&mut nav, Key::Right, &content);
        assert_eq!(press(&mut nav, Key::Up, &content), NavOutcome::Consumed);
        assert_eq!(nav.az_index(), 0);
        for t in 0..40 {
            nav.handle_key(&KeyEvent::repeat(Key::Down, t + 1, 50 * t as u64), &content);
        }
        assert_eq!(nav.az_index(), AZ_ENTRIES - 1);
        assert_eq!(press(&mut nav, Key::Down, &content), NavOutcome::Consumed);
    }

    #[test]
    fn test_az_activation_filters_and_returns_to_list() {
        let content = apps(30);
        let mut nav = DrawerNavigator::new(NavConfig::default());
        press(&mut nav, Key::PageDown, &content);
        press(&mut nav, Key::Right, &content);
        press(&mut nav, Key::Down, &content);
        press(&mut nav, Key::Down, &content);
        assert_eq!(press(&mut nav, Key::Enter, &content), NavOutcome::Filter(LetterFilter::Letter('B')));
        assert_eq!(at(&nav), (List, 0, 0));
        assert_eq!(nav.filter(), LetterFilter::Letter('B'));
        assert_eq!(nav.handle_key(&KeyEvent::up(Key::Enter, 20), &content), NavOutcome::Consumed);
    }

    #[test]
    fn test_list_short_and_long_press() {
        let content = apps(30);
        let mut nav = DrawerNavigator::new(NavConfig::default());
        press(&mut nav, Key::PageDown, &content);
        press(&mut nav, Key::Down, &content);

        nav.handle_key(&KeyEvent::down(Key::Center, 100), &content);
        assert_eq!(
            nav.handle_key(&KeyEvent::up(Key::Center, 300), &content),
            NavOutcome::Activate(Target::DrawerApp { index: 11 })
        );

        nav.handle_key(&KeyEvent::down(Key::Center, 1000), &content);
        assert_eq!(
            nav.handle_key(&KeyEvent::repeat(Key::Center, 1, 1700), &content),
            NavOutcome::LongPress(Target::DrawerApp { index: 11 })
        );
        assert_eq!(nav.handle_key(&KeyEvent::up(Key::Center, 1750), &content), NavOutcome::Consumed);
    }

    #[test]
    fn test_leave_overlay() {
        let content = apps(3);
        let mut nav = DrawerNavigator::new(NavConfig::default());
        assert!(!nav.leave_overlay());
        press(&mut nav, Key::Right, &content);
        assert!(nav.leave_overlay());
        assert_eq!(at(&nav), (List, 0, 0));
    }

    #[test]
    fn test_empty_list_moves_focus_to_strip() {
        let mut nav = DrawerNavigator::new(NavConfig::default());
        // No list to return to
        assert_eq!(press(&mut nav, Key::Left, &apps(0)), NavOutcome::Consumed);
        assert!(nav.az_focused());
    }

    #[test]
    fn test_letter_filter() {
        assert_eq!(LetterFilter::from_index(0), LetterFilter::All);
        assert_eq!(LetterFilter::from_index(1), LetterFilter::Letter('A'));
        assert_eq!(LetterFilter::from_index(99), LetterFilter::Letter('Z'));
        assert_eq!(LetterFilter::Letter('c').index(), 3);
        assert!(LetterFilter::Letter('c').matches("Calendar"));
        assert!(!LetterFilter::Letter('c').matches("Dialer"));
        assert!(!LetterFilter::Letter('c').matches(""));
        assert!(LetterFilter::All.matches(""));
    }
}
