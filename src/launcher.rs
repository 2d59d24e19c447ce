//! Launcher session
//!
//! Owns the classifier, the three screen navigators and the dispatcher, and
//! routes raw pointer and key events through them for the screen on show.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::actions::{perform, ActionDispatcher, Collaborators, DispatchOutcome, GestureSlot, Request};
use crate::config::LauncherConfig;
use crate::input::{
    GestureClassifier, Key, KeyEvent, PointerSample, ResolvedGesture, SwipeKind, VerticalDirection, VerticalProfile,
};
use crate::nav::{
    DrawerContent, DrawerNavigator, FocusNavigator, HomeContent, HomeNavigator, NavOutcome, Target, TrayContent,
    TrayNavigator,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    #[default]
    Home,
    AppDrawer,
    SimpleTray,
}

/// Latest content snapshot of every screen
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contents {
    pub home: HomeContent,
    pub drawer: DrawerContent,
    pub tray: TrayContent,
}

/// Everything one input event resolved to
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Reaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gesture: Option<ResolvedGesture>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nav: Option<NavOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<DispatchOutcome>,
}

impl Reaction {
    pub fn is_empty(&self) -> bool {
        self.gesture.is_none() && self.nav.is_none() && self.dispatch.is_none()
    }
}

pub struct Launcher<C: Collaborators> {
    screen: Screen,
    classifier: GestureClassifier,
    home: HomeNavigator,
    drawer: DrawerNavigator,
    tray: TrayNavigator,
    dispatcher: ActionDispatcher,
    contents: Contents,
    collaborators: C,
}

impl<C: Collaborators> Launcher<C> {
    pub fn new(config: &LauncherConfig, collaborators: C) -> Self {
        let nav_config = config.nav_config();
        let contents = Contents::default();
        let mut tray = TrayNavigator::new(nav_config.clone());
        tray.sync_brightness(contents.tray.brightness);

        Self {
            screen: Screen::Home,
            classifier: GestureClassifier::new(config.gestures.clone().sanitized()),
            home: HomeNavigator::new(nav_config.clone()),
            drawer: DrawerNavigator::new(nav_config),
            tray,
            dispatcher: ActionDispatcher::new(config.bindings.clone(), config.feedback.haptics),
            contents,
            collaborators,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn home(&self) -> &HomeNavigator {
        &self.home
    }

    pub fn drawer(&self) -> &DrawerNavigator {
        &self.drawer
    }

    pub fn tray(&self) -> &TrayNavigator {
        &self.tray
    }

    pub fn contents(&self) -> &Contents {
        &self.contents
    }

    pub fn collaborators(&self) -> &C {
        &self.collaborators
    }

    pub fn collaborators_mut(&mut self) -> &mut C {
        &mut self.collaborators
    }

    pub fn into_collaborators(self) -> C {
        self.collaborators
    }

    /// Switch to `screen`. Touches in flight are dropped and a key still held
    /// stays with the screen it was pressed on. The drawer opens unfiltered
    /// on its first page.
    pub fn show(&mut self, screen: Screen) {
        if screen == self.screen {
            return;
        }
        info!(from = ?self.screen, to = ?screen, "screen changed");
        self.classifier.pointer_cancel();
        match screen {
            Screen::Home => self.home.cancel_press(),
            Screen::AppDrawer => self.drawer.reset(),
            Screen::SimpleTray => self.tray.cancel_press(),
        }
        self.screen = screen;
    }

    pub fn set_home_content(&mut self, content: HomeContent) {
        self.contents.home = content;
    }

    pub fn set_drawer_content(&mut self, content: DrawerContent) {
        self.contents.drawer = content;
    }

    pub fn set_tray_content(&mut self, content: TrayContent) {
        self.tray.sync_brightness(content.brightness);
        self.contents.tray = content;
    }

    /// Vertical interpretation for the screen on show
    pub fn vertical_profile(&self) -> VerticalProfile {
        if self.screen == Screen::Home && self.dispatcher.bindings().has_long_swipe() {
            VerticalProfile::WithLongSwipe
        } else {
            VerticalProfile::PageOnly
        }
    }

    pub fn pointer_down(&mut self, sample: PointerSample) {
        self.classifier.pointer_down(sample);
        if let Err(e) = self.collaborators.perform(&Request::TouchStarted) {
            debug!("touch observer failed: {}", e);
        }
    }

    pub fn pointer_move(&mut self, sample: PointerSample) {
        self.classifier.pointer_move(sample);
    }

    pub fn pointer_up(&mut self, sample: PointerSample) -> Reaction {
        let profile = self.vertical_profile();
        match self.classifier.pointer_up(sample, profile) {
            Some(gesture) => self.handle_gesture(gesture),
            None => Reaction::default(),
        }
    }

    pub fn pointer_cancel(&mut self) {
        self.classifier.pointer_cancel();
    }

    /// Act on a resolved gesture. Plain taps are left to the host, which
    /// knows what is under the pointer (see [`Launcher::activate`]).
    pub fn handle_gesture(&mut self, gesture: ResolvedGesture) -> Reaction {
        let mut reaction = Reaction { gesture: Some(gesture), ..Reaction::default() };

        match gesture {
            ResolvedGesture::Tap => {}
            ResolvedGesture::VerticalSwipe { kind: SwipeKind::Short, direction } => {
                // Swiping up brings the next page in from below
                let forward = direction == VerticalDirection::Up;
                let flipped = match self.screen {
                    Screen::Home => self.home.flip_page(forward, &self.contents.home),
                    Screen::AppDrawer => self.drawer.flip_page(forward, &self.contents.drawer),
                    Screen::SimpleTray => self.tray.flip_page(forward, &self.contents.tray),
                };
                reaction.nav = Some(if flipped { NavOutcome::Moved } else { NavOutcome::Consumed });
            }
            _ if self.screen == Screen::Home => {
                if let Some(slot) = GestureSlot::from_gesture(gesture) {
                    let outcome = self.dispatcher.dispatch_gesture(slot, &mut self.collaborators);
                    self.follow(&outcome);
                    reaction.dispatch = Some(outcome);
                }
            }
            _ => debug!(?gesture, screen = ?self.screen, "gesture has no binding on this screen"),
        }
        reaction
    }

    /// Activate a target picked by touch
    pub fn activate(&mut self, target: Target, long_press: bool) -> DispatchOutcome {
        let outcome = self.dispatcher.dispatch_target(target, long_press, &mut self.collaborators);
        self.follow(&outcome);
        outcome
    }

    pub fn key(&mut self, event: &KeyEvent) -> Reaction {
        if event.key == Key::Back {
            return self.back(event);
        }

        let nav = match self.screen {
            Screen::Home => self.home.handle_key(event, &self.contents.home),
            Screen::AppDrawer => self.drawer.handle_key(event, &self.contents.drawer),
            Screen::SimpleTray => self.tray.handle_key(event, &self.contents.tray),
        };

        let dispatch = self.dispatcher.dispatch_nav(&nav, &mut self.collaborators);
        if let Some(outcome) = &dispatch {
            self.follow(outcome);
        }
        Reaction { gesture: None, nav: Some(nav), dispatch }
    }

    /// Back leaves the drawer's overlays first, then the screen. Home has
    /// nowhere to go back to.
    fn back(&mut self, event: &KeyEvent) -> Reaction {
        if self.screen == Screen::Home {
            return Reaction { nav: Some(NavOutcome::Ignored), ..Reaction::default() };
        }
        if !event.is_fresh_down() {
            return Reaction { nav: Some(NavOutcome::Consumed), ..Reaction::default() };
        }
        if self.screen == Screen::AppDrawer && self.drawer.leave_overlay() {
            return Reaction { nav: Some(NavOutcome::Moved), ..Reaction::default() };
        }

        let outcome = perform(Request::NavigateBack, &mut self.collaborators);
        self.follow(&outcome);
        Reaction { gesture: None, nav: None, dispatch: Some(outcome) }
    }

    /// Apply what a dispatch means for the session itself
    fn follow(&mut self, outcome: &DispatchOutcome) {
        match outcome {
            DispatchOutcome::Performed(Request::Navigate { screen }) => self.show(*screen),
            DispatchOutcome::Performed(Request::NavigateBack) => self.show(Screen::Home),
            DispatchOutcome::Performed(Request::SetBrightness { value }) => {
                self.contents.tray.brightness = *value;
            }
            DispatchOutcome::Performed(_) => {}
            DispatchOutcome::Unbound { advisory: Some(message) } => {
                let advisory = Request::Advisory { message: message.clone() };
                if let Err(e) = self.collaborators.perform(&advisory) {
                    debug!("advisory not shown: {}", e);
                }
            }
            DispatchOutcome::Unbound { advisory: None } => {}
            DispatchOutcome::Failed { request, error } => {
                warn!(?request, "action failed: {}", error);
                if let Request::SetBrightness { .. } = request {
                    // The slider stays at the last value the host accepted
                    self.tray.sync_brightness(self.contents.tray.brightness);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::tests::Recorder;
    use crate::actions::{Action, Binding, DefaultApp};
    use crate::nav::{DrawerZone, HomeZone, LetterFilter, TrayZone};

    fn launcher() -> Launcher<Recorder> {
        let mut launcher = Launcher::new(&LauncherConfig::default(), Recorder::default());
        launcher.set_home_content(HomeContent { app_count: 12, ..HomeContent::default() });
        launcher.set_drawer_content(DrawerContent { app_count: 30, ..DrawerContent::default() });
        launcher
    }

    /// Vertical drag by `dy` over `duration` ms, sampled every 10ms
    fn vertical_swipe(launcher: &mut Launcher<Recorder>, dy: f64, start: u64, duration: u64) -> Reaction {
        let (x, y) = (240.0, 400.0);
        launcher.pointer_down(PointerSample::new(x, y, start));
        let steps = duration / 10;
        for i in 1..=steps {
            let progress = i as f64 / steps as f64;
            launcher.pointer_move(PointerSample::new(x, y + dy * progress, start + i * 10));
        }
        launcher.pointer_up(PointerSample::new(x, y + dy, start + duration))
    }

    fn press(launcher: &mut Launcher<Recorder>, key: Key, t: u64) -> Reaction {
        let reaction = launcher.key(&KeyEvent::down(key, t));
        launcher.key(&KeyEvent::up(key, t + 50));
        reaction
    }

    #[test]
    fn test_short_swipes_respect_cooldown() {
        let mut launcher = launcher();
        launcher.show(Screen::AppDrawer);

        let first = vertical_swipe(&mut launcher, -60.0, 0, 20);
        assert_eq!(first.nav, Some(NavOutcome::Moved));
        assert_eq!(launcher.drawer().selection().page, 1);

        // Released 30ms after the first
        let second = vertical_swipe(&mut launcher, -60.0, 30, 20);
        assert!(second.is_empty());
        assert_eq!(launcher.drawer().selection().page, 1);

        let third = vertical_swipe(&mut launcher, -60.0, 100, 20);
        assert_eq!(third.nav, Some(NavOutcome::Moved));
        assert_eq!(launcher.drawer().selection().page, 2);

        // Swiping down goes back a page
        vertical_swipe(&mut launcher, 60.0, 300, 20);
        assert_eq!(launcher.drawer().selection().page, 1);
    }

    #[test]
    fn test_long_swipe_up_opens_drawer() {
        let mut launcher = launcher();
        let reaction = vertical_swipe(&mut launcher, -300.0, 0, 50);
        assert_eq!(
            reaction.dispatch,
            Some(DispatchOutcome::Performed(Request::Navigate { screen: Screen::AppDrawer }))
        );
        assert_eq!(launcher.screen(), Screen::AppDrawer);
        assert!(launcher.collaborators().requests.contains(&Request::Haptic));
    }

    #[test]
    fn test_unbound_vertical_swipes_flip_home_pages() {
        let mut config = LauncherConfig::default();
        config.bindings.swipe_up = Binding::new(Action::Disabled);
        config.bindings.swipe_down = Binding::new(Action::Disabled);
        let mut launcher = Launcher::new(&config, Recorder::default());
        launcher.set_home_content(HomeContent { app_count: 12, ..HomeContent::default() });
        assert_eq!(launcher.vertical_profile(), VerticalProfile::PageOnly);

        let reaction = vertical_swipe(&mut launcher, -300.0, 0, 50);
        assert_eq!(reaction.nav, Some(NavOutcome::Moved));
        assert_eq!(launcher.home().selection().page, 1);
        assert_eq!(launcher.screen(), Screen::Home);
    }

    #[test]
    fn test_right_key_on_home_acts_as_swipe() {
        let mut launcher = launcher();
        let reaction = press(&mut launcher, Key::Right, 0);
        assert_eq!(
            reaction.dispatch,
            Some(DispatchOutcome::Performed(Request::LaunchDefault { app: DefaultApp::Dialer }))
        );
    }

    #[test]
    fn test_back_leaves_overlay_then_drawer() {
        let mut launcher = launcher();
        launcher.show(Screen::AppDrawer);
        press(&mut launcher, Key::Right, 0);
        assert_eq!(launcher.drawer().selection().zone, DrawerZone::AzFilter);

        let first = press(&mut launcher, Key::Back, 100);
        assert_eq!(first.nav, Some(NavOutcome::Moved));
        assert_eq!(launcher.screen(), Screen::AppDrawer);

        let second = press(&mut launcher, Key::Back, 200);
        assert_eq!(second.dispatch, Some(DispatchOutcome::Performed(Request::NavigateBack)));
        assert_eq!(launcher.screen(), Screen::Home);

        assert_eq!(press(&mut launcher, Key::Back, 300).nav, Some(NavOutcome::Ignored));
    }

    #[test]
    fn test_failed_navigation_keeps_screen() {
        let mut launcher = launcher();
        launcher.collaborators_mut().failing = vec![Request::Navigate { screen: Screen::AppDrawer }];
        let reaction = vertical_swipe(&mut launcher, -300.0, 0, 50);
        assert!(matches!(reaction.dispatch, Some(DispatchOutcome::Failed { .. })));
        assert_eq!(launcher.screen(), Screen::Home);
    }

    #[test]
    fn test_disabled_widget_tap_shows_advisory() {
        let mut launcher = launcher();
        let outcome = launcher.activate(Target::Quote, false);
        assert!(matches!(outcome, DispatchOutcome::Unbound { advisory: Some(_) }));
        assert!(launcher
            .collaborators()
            .requests
            .iter()
            .any(|r| matches!(r, Request::Advisory { .. })));
    }

    #[test]
    fn test_tray_brightness_updates_content() {
        let mut launcher = launcher();
        launcher.show(Screen::SimpleTray);
        press(&mut launcher, Key::Down, 0);
        let reaction = press(&mut launcher, Key::Left, 100);
        assert_eq!(reaction.dispatch, Some(DispatchOutcome::Performed(Request::SetBrightness { value: 0.45 })));
        assert_eq!(launcher.contents().tray.brightness, 0.45);
    }

    #[test]
    fn test_refused_brightness_is_rolled_back() {
        let mut launcher = launcher();
        launcher.collaborators_mut().failing = vec![Request::SetBrightness { value: 0.45 }];
        launcher.show(Screen::SimpleTray);
        press(&mut launcher, Key::Down, 0);

        let reaction = press(&mut launcher, Key::Left, 100);
        assert!(matches!(reaction.dispatch, Some(DispatchOutcome::Failed { .. })));
        assert_eq!(launcher.tray().brightness(), 0.5);
        assert_eq!(launcher.contents().tray.brightness, 0.5);

        // The next step starts from the accepted value again
        let reaction = press(&mut launcher, Key::Right, 200);
        assert_eq!(reaction.dispatch, Some(DispatchOutcome::Performed(Request::SetBrightness { value: 0.55 })));
        assert_eq!(launcher.contents().tray.brightness, 0.55);
    }

    #[test]
    fn test_press_that_switches_screen_stays_on_its_screen() {
        let mut launcher = launcher();
        press(&mut launcher, Key::Down, 0);
        press(&mut launcher, Key::Down, 100);
        assert_eq!(launcher.home().selection().zone, HomeZone::Apps);

        launcher.show(Screen::SimpleTray);
        for t in [200, 300, 400] {
            press(&mut launcher, Key::Down, t);
        }
        assert_eq!(launcher.tray().selection().zone, TrayZone::BottomNav);

        // Home button fires on the down; repeats and release land on home
        let down = launcher.key(&KeyEvent::down(Key::Center, 1000));
        assert_eq!(down.dispatch, Some(DispatchOutcome::Performed(Request::Navigate { screen: Screen::Home })));
        assert_eq!(launcher.screen(), Screen::Home);

        let repeat = launcher.key(&KeyEvent::repeat(Key::Center, 1, 1500));
        assert_eq!(repeat.dispatch, None);
        let held = launcher.key(&KeyEvent::repeat(Key::Center, 2, 1800));
        assert_eq!(held.dispatch, None);
        let up = launcher.key(&KeyEvent::up(Key::Center, 1850));
        assert_eq!(up.nav, Some(NavOutcome::Consumed));
        assert_eq!(up.dispatch, None);

        let navigations = launcher.collaborators().requests.iter().filter(|r| matches!(r, Request::Navigate { .. }));
        assert_eq!(navigations.count(), 1);
        assert!(!launcher
            .collaborators()
            .requests
            .iter()
            .any(|r| matches!(r, Request::OpenHomeApp { .. } | Request::HomeAppMenu { .. })));

        // A fresh press on home works as usual
        let down = launcher.key(&KeyEvent::down(Key::Center, 2000));
        assert_eq!(down.nav, Some(NavOutcome::Consumed));
        let up = launcher.key(&KeyEvent::up(Key::Center, 2100));
        assert_eq!(up.dispatch, Some(DispatchOutcome::Performed(Request::OpenHomeApp { slot: 0 })));
    }

    #[test]
    fn test_drawer_filter_request() {
        let mut launcher = launcher();
        launcher.show(Screen::AppDrawer);
        press(&mut launcher, Key::Right, 0);
        press(&mut launcher, Key::Down, 100);
        let reaction = press(&mut launcher, Key::Center, 200);
        assert_eq!(
            reaction.dispatch,
            Some(DispatchOutcome::Performed(Request::FilterApps { filter: LetterFilter::Letter('A') }))
        );

        // Reopening the drawer clears the filter
        launcher.show(Screen::Home);
        launcher.show(Screen::AppDrawer);
        assert_eq!(launcher.drawer().filter(), LetterFilter::All);
    }

    #[test]
    fn test_every_touch_is_reported() {
        let mut launcher = launcher();
        launcher.pointer_down(PointerSample::new(10.0, 10.0, 0));
        let reaction = launcher.pointer_up(PointerSample::new(10.0, 10.0, 40));
        assert_eq!(reaction.gesture, Some(ResolvedGesture::Tap));
        assert_eq!(reaction.dispatch, None);
        assert_eq!(launcher.collaborators().requests, vec![Request::TouchStarted]);
    }
}
