//! Declarative zone graphs
//!
//! Each screen describes its focus movement as a table of
//! `(zone, key) -> rule` rows. The engine here applies a row to a
//! [`SelectionState`], skipping zones that are currently absent (no items or
//! disabled) and paging through the screen's paged zone.

use std::fmt::Debug;

use serde::Serialize;
use tracing::debug;

use super::NavKey;

/// A focusable region of a screen
pub trait Zone: Copy + Eq + Debug + 'static {
    /// All zones, top to bottom
    const ORDER: &'static [Self];

    /// The one zone whose items are split into pages
    const PAGED_ZONE: Self;

    fn is_paged(self) -> bool {
        self == Self::PAGED_ZONE
    }

    /// Zones that are pure focus flags leave the selection index alone
    fn holds_cursor(self) -> bool {
        true
    }
}

/// Current item counts of a screen's zones
pub trait ZoneLayout<Z: Zone> {
    /// Items of `zone`; empty when the zone is absent
    fn items(&self, zone: Z) -> Pager;
}

/// Item count of a zone, split into pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pager {
    pub total: usize,
    pub per_page: usize,
}

impl Pager {
    pub const EMPTY: Pager = Pager { total: 0, per_page: 1 };

    /// All items on one page
    pub fn single(count: usize) -> Self {
        Self { total: count, per_page: count.max(1) }
    }

    pub fn paged(total: usize, per_page: usize) -> Self {
        Self { total, per_page: per_page.max(1) }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Number of pages, at least one
    pub fn page_count(&self) -> usize {
        self.total.div_ceil(self.per_page.max(1)).max(1)
    }

    /// Items on `page`
    pub fn len_on(&self, page: usize) -> usize {
        self.total.saturating_sub(page * self.per_page).min(self.per_page)
    }

    /// Next (page, index) in the given direction, None at the boundary
    fn step(&self, page: usize, index: usize, forward: bool) -> Option<(usize, usize)> {
        if forward {
            if index + 1 < self.len_on(page) {
                Some((page, index + 1))
            } else if page + 1 < self.page_count() {
                Some((page + 1, 0))
            } else {
                None
            }
        } else if index > 0 {
            Some((page, index - 1))
        } else if page > 0 {
            Some((page - 1, self.len_on(page - 1).saturating_sub(1)))
        } else {
            None
        }
    }
}

/// Focus and selection of one screen, read by the rendering layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectionState<Z> {
    pub zone: Z,
    /// Index within the zone (within the current page for the paged zone)
    pub index: usize,
    /// Page of the screen's paged zone
    pub page: usize,
    pub page_count: usize,
}

impl<Z: Zone> SelectionState<Z> {
    pub fn new(zone: Z) -> Self {
        Self { zone, index: 0, page: 0, page_count: 1 }
    }

    /// Index across all pages of the paged zone
    pub fn absolute_index(&self, per_page: usize) -> usize {
        self.page * per_page.max(1) + self.index
    }

    fn clamp_index(&mut self, len: usize) {
        self.index = self.index.min(len.saturating_sub(1));
    }
}

/// Where focus lands when entering a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexRule {
    First,
    Last,
    /// Leave index and page untouched
    Keep,
}

/// Ordered candidates; the first present zone wins
#[derive(Debug, Clone, Copy)]
pub struct Route<Z: 'static> {
    pub targets: &'static [Z],
    pub index: IndexRule,
}

#[derive(Debug, Clone, Copy)]
pub enum Rule<Z: 'static> {
    /// Move to another zone
    Jump(Route<Z>),
    /// Move within the zone, leaving through `exit` at the boundary
    Step { exit: Option<Route<Z>> },
    /// Flip a page of the paged zone
    Page,
    /// Zone specific handling
    Custom,
}

#[derive(Debug, Clone, Copy)]
pub struct Transition<Z: 'static> {
    pub zone: Z,
    pub key: NavKey,
    pub rule: Rule<Z>,
}

pub const fn jump<Z: 'static>(zone: Z, key: NavKey, targets: &'static [Z], index: IndexRule) -> Transition<Z> {
    Transition { zone, key, rule: Rule::Jump(Route { targets, index }) }
}

pub const fn step<Z: 'static>(zone: Z, key: NavKey) -> Transition<Z> {
    Transition { zone, key, rule: Rule::Step { exit: None } }
}

pub const fn step_or_exit<Z: 'static>(zone: Z, key: NavKey, targets: &'static [Z], index: IndexRule) -> Transition<Z> {
    Transition { zone, key, rule: Rule::Step { exit: Some(Route { targets, index }) } }
}

pub const fn page<Z: 'static>(zone: Z, key: NavKey) -> Transition<Z> {
    Transition { zone, key, rule: Rule::Page }
}

pub const fn custom<Z: 'static>(zone: Z, key: NavKey) -> Transition<Z> {
    Transition { zone, key, rule: Rule::Custom }
}

/// Result of applying a key to the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Moved,
    /// A rule matched but nothing could move (boundary, no present target)
    Blocked,
    /// The zone handles this key itself
    Custom,
    /// No rule for this zone and key
    Unhandled,
}

pub struct ZoneGraph<Z: 'static> {
    table: &'static [Transition<Z>],
}

impl<Z: Zone> ZoneGraph<Z> {
    pub const fn new(table: &'static [Transition<Z>]) -> Self {
        Self { table }
    }

    pub fn rule(&self, zone: Z, key: NavKey) -> Option<&Rule<Z>> {
        self.table
            .iter()
            .find(|t| t.zone == zone && t.key == key)
            .map(|t| &t.rule)
    }

    pub fn apply(&self, sel: &mut SelectionState<Z>, key: NavKey, layout: &impl ZoneLayout<Z>) -> Applied {
        let Some(rule) = self.rule(sel.zone, key) else {
            return Applied::Unhandled;
        };

        let moved = match rule {
            Rule::Custom => return Applied::Custom,
            Rule::Jump(route) => enter(sel, route, layout),
            Rule::Page => flip_page(sel, key.is_forward(), layout),
            Rule::Step { exit } => {
                let pager = layout.items(sel.zone);
                let page = if sel.zone.is_paged() { sel.page } else { 0 };
                match pager.step(page, sel.index, key.is_forward()) {
                    Some((new_page, index)) => {
                        if sel.zone.is_paged() {
                            sel.page = new_page;
                        }
                        sel.index = index;
                        true
                    }
                    None => exit.as_ref().is_some_and(|route| enter(sel, route, layout)),
                }
            }
        };

        if moved {
            debug!(zone = ?sel.zone, index = sel.index, page = sel.page, "focus moved");
            Applied::Moved
        } else {
            Applied::Blocked
        }
    }

    /// Clamp the selection to the current layout. An absent zone hands focus to
    /// the nearest present zone, looking forward first.
    pub fn normalize(&self, sel: &mut SelectionState<Z>, layout: &impl ZoneLayout<Z>) {
        if layout.items(sel.zone).is_empty() {
            let position = Z::ORDER.iter().position(|z| *z == sel.zone).unwrap_or(0);
            let forward = Z::ORDER.iter().skip(position + 1);
            let backward = Z::ORDER.iter().take(position).rev();
            if let Some(zone) = forward.chain(backward).find(|z| !layout.items(**z).is_empty()) {
                debug!(from = ?sel.zone, to = ?zone, "focused zone vanished");
                sel.zone = *zone;
                if zone.holds_cursor() {
                    sel.index = 0;
                }
            }
        }

        let paged = layout.items(Z::PAGED_ZONE);
        sel.page_count = paged.page_count();
        sel.page = sel.page.min(sel.page_count - 1);

        if sel.zone.holds_cursor() {
            let page = if sel.zone.is_paged() { sel.page } else { 0 };
            sel.clamp_index(layout.items(sel.zone).len_on(page));
        } else {
            // Focus flags keep the paged zone's cursor
            sel.clamp_index(paged.len_on(sel.page));
        }
    }
}

/// Enter the first present zone of `route`
fn enter<Z: Zone>(sel: &mut SelectionState<Z>, route: &Route<Z>, layout: &impl ZoneLayout<Z>) -> bool {
    let Some(zone) = route.targets.iter().copied().find(|z| !layout.items(*z).is_empty()) else {
        return false;
    };

    sel.zone = zone;
    if !zone.holds_cursor() {
        return true;
    }

    let pager = layout.items(zone);
    let page = if zone.is_paged() {
        sel.page = sel.page.min(pager.page_count() - 1);
        sel.page
    } else {
        0
    };
    match route.index {
        IndexRule::First => sel.index = 0,
        IndexRule::Last => sel.index = pager.len_on(page).saturating_sub(1),
        IndexRule::Keep => sel.clamp_index(pager.len_on(page)),
    }
    true
}

/// Flip the paged zone one page. The cursor resets only when the paged zone
/// has focus.
pub fn flip_page<Z: Zone>(sel: &mut SelectionState<Z>, forward: bool, layout: &impl ZoneLayout<Z>) -> bool {
    let pager = layout.items(Z::PAGED_ZONE);
    let pages = pager.page_count();
    let page = if forward {
        if sel.page + 1 >= pages {
            return false;
        }
        sel.page + 1
    } else {
        if sel.page == 0 {
            return false;
        }
        sel.page - 1
    };

    sel.page = page;
    sel.page_count = pages;
    if sel.zone.is_paged() {
        sel.index = 0;
    }
    debug!(page, pages, "page flipped");
    true
}
