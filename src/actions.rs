//! Action bindings and dispatch
//!
//! Resolved gestures and zone activations are mapped to a single
//! [`Request`] for the host's [`Collaborators`]. The dispatcher never
//! swallows a failure: it returns a [`DispatchOutcome`] and the caller
//! decides how to surface it.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CollaboratorError;
use crate::input::{ResolvedGesture, SwipeDirection, SwipeKind, VerticalDirection};
use crate::launcher::Screen;
use crate::nav::{LetterFilter, NavOutcome, Target};

/// What a gesture slot can be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Disabled,
    OpenApp,
    OpenAppDrawer,
    OpenNotificationsScreen,
    EinkRefresh,
    Brightness,
    LockScreen,
    ShowRecents,
    OpenQuickSettings,
    OpenPowerDialog,
    RestartApp,
    ExitLauncher,
    TogglePrivateSpace,
}

/// Home screen gestures that carry a user binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureSlot {
    SwipeLeft,
    SwipeRight,
    SwipeUp,
    SwipeDown,
    ClockTap,
    DateTap,
    QuoteTap,
    DoubleTap,
}

impl GestureSlot {
    /// Slot of a resolved gesture. Taps and short swipes have none: taps
    /// land on widgets, short swipes flip pages.
    pub fn from_gesture(gesture: ResolvedGesture) -> Option<Self> {
        match gesture {
            ResolvedGesture::Swipe { direction: SwipeDirection::Left } => Some(GestureSlot::SwipeLeft),
            ResolvedGesture::Swipe { direction: SwipeDirection::Right } => Some(GestureSlot::SwipeRight),
            ResolvedGesture::VerticalSwipe { kind: SwipeKind::Long, direction: VerticalDirection::Up } => Some(GestureSlot::SwipeUp),
            ResolvedGesture::VerticalSwipe { kind: SwipeKind::Long, direction: VerticalDirection::Down } => Some(GestureSlot::SwipeDown),
            ResolvedGesture::DoubleTap => Some(GestureSlot::DoubleTap),
            ResolvedGesture::Tap | ResolvedGesture::VerticalSwipe { kind: SwipeKind::Short, .. } => None,
        }
    }

    /// Slot behind activating a home widget
    pub fn from_target(target: Target) -> Option<Self> {
        match target {
            Target::Clock => Some(GestureSlot::ClockTap),
            Target::Date => Some(GestureSlot::DateTap),
            Target::Quote => Some(GestureSlot::QuoteTap),
            _ => None,
        }
    }

    /// App opened by `OpenApp` when no app is bound
    pub fn default_app(self) -> Option<DefaultApp> {
        match self {
            GestureSlot::SwipeLeft => Some(DefaultApp::Camera),
            GestureSlot::SwipeRight => Some(DefaultApp::Dialer),
            GestureSlot::ClockTap | GestureSlot::DateTap => Some(DefaultApp::Calendar),
            _ => None,
        }
    }

    /// Tapping a visible widget with nothing bound tells the user so
    fn disabled_advisory(self) -> Option<&'static str> {
        match self {
            GestureSlot::ClockTap => Some("No action set for the clock"),
            GestureSlot::DateTap => Some("No action set for the date"),
            GestureSlot::QuoteTap => Some("No action set for the quote"),
            _ => None,
        }
    }
}

/// System apps used as fallbacks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultApp {
    Camera,
    Dialer,
    Calendar,
}

/// Installed app picked by the user, identified by package or desktop id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppTarget(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<AppTarget>,
}

impl Binding {
    pub const fn new(action: Action) -> Self {
        Self { action, app: None }
    }

    pub fn app(id: impl Into<String>) -> Self {
        Self {
            action: Action::OpenApp,
            app: Some(AppTarget(id.into())),
        }
    }
}

/// Per-slot bindings, read once per session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bindings {
    pub swipe_left: Binding,
    pub swipe_right: Binding,
    pub swipe_up: Binding,
    pub swipe_down: Binding,
    pub clock_tap: Binding,
    pub date_tap: Binding,
    pub quote_tap: Binding,
    pub double_tap: Binding,
}

impl Default for Bindings {
    fn default() -> Self {
        Self {
            swipe_left: Binding::new(Action::OpenApp),
            swipe_right: Binding::new(Action::OpenApp),
            swipe_up: Binding::new(Action::OpenAppDrawer),
            swipe_down: Binding::new(Action::OpenNotificationsScreen),
            clock_tap: Binding::new(Action::OpenApp),
            date_tap: Binding::new(Action::OpenApp),
            quote_tap: Binding::new(Action::Disabled),
            double_tap: Binding::new(Action::EinkRefresh),
        }
    }
}

impl Bindings {
    pub fn get(&self, slot: GestureSlot) -> &Binding {
        match slot {
            GestureSlot::SwipeLeft => &self.swipe_left,
            GestureSlot::SwipeRight => &self.swipe_right,
            GestureSlot::SwipeUp => &self.swipe_up,
            GestureSlot::SwipeDown => &self.swipe_down,
            GestureSlot::ClockTap => &self.clock_tap,
            GestureSlot::DateTap => &self.date_tap,
            GestureSlot::QuoteTap => &self.quote_tap,
            GestureSlot::DoubleTap => &self.double_tap,
        }
    }

    pub fn get_mut(&mut self, slot: GestureSlot) -> &mut Binding {
        match slot {
            GestureSlot::SwipeLeft => &mut self.swipe_left,
            GestureSlot::SwipeRight => &mut self.swipe_right,
            GestureSlot::SwipeUp => &mut self.swipe_up,
            GestureSlot::SwipeDown => &mut self.swipe_down,
            GestureSlot::ClockTap => &mut self.clock_tap,
            GestureSlot::DateTap => &mut self.date_tap,
            GestureSlot::QuoteTap => &mut self.quote_tap,
            GestureSlot::DoubleTap => &mut self.double_tap,
        }
    }

    /// Whether a vertical swipe is bound, so long swipes must be told apart
    /// from page flips
    pub fn has_long_swipe(&self) -> bool {
        self.swipe_up.action != Action::Disabled || self.swipe_down.action != Action::Disabled
    }
}

/// Media widget buttons, left to right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaCommand {
    Previous,
    SeekBack,
    PlayPause,
    SeekForward,
    Next,
}

impl MediaCommand {
    pub const BUTTONS: [MediaCommand; 5] = [
        MediaCommand::Previous,
        MediaCommand::SeekBack,
        MediaCommand::PlayPause,
        MediaCommand::SeekForward,
        MediaCommand::Next,
    ];
}

/// Quick settings row, left to right
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickToggle {
    Wifi,
    Bluetooth,
    AirplaneMode,
    DoNotDisturb,
    Flashlight,
}

impl QuickToggle {
    pub const ROW: [QuickToggle; 5] = [
        QuickToggle::Wifi,
        QuickToggle::Bluetooth,
        QuickToggle::AirplaneMode,
        QuickToggle::DoNotDisturb,
        QuickToggle::Flashlight,
    ];
}

/// A side effect the host performs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum Request {
    /// Any pointer-down, for inactivity timers and the like
    TouchStarted,
    Haptic,
    Advisory { message: String },
    LaunchApp { app: AppTarget },
    LaunchDefault { app: DefaultApp },
    Navigate { screen: Screen },
    NavigateBack,
    EinkRefresh,
    /// Toggle between the user's brightness and off
    ToggleBrightness,
    SetBrightness { value: f32 },
    LockScreen,
    ShowRecents,
    OpenQuickSettings,
    OpenPowerDialog,
    RestartApp,
    ExitLauncher,
    TogglePrivateSpace,
    OpenHomeApp { slot: usize },
    HomeAppMenu { slot: usize },
    OpenDrawerApp { index: usize },
    DrawerAppMenu { index: usize },
    FilterApps { filter: LetterFilter },
    OpenSearch,
    Media { command: MediaCommand },
    QuickSetting { toggle: QuickToggle },
    ClearNotifications,
    OpenNotification { index: usize },
    DismissNotification { index: usize },
    OpenSystemSettings,
}

/// The host side of dispatch: app launching, screen navigation, system
/// settings, haptics...
pub trait Collaborators {
    fn perform(&mut self, request: &Request) -> Result<(), CollaboratorError>;
}

/// What became of a dispatched interaction
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Performed(Request),
    /// Nothing bound; the advisory, if any, is meant for the user
    Unbound { advisory: Option<String> },
    Failed { request: Request, error: CollaboratorError },
}

impl DispatchOutcome {
    pub fn is_performed(&self) -> bool {
        matches!(self, DispatchOutcome::Performed(_))
    }
}

pub struct ActionDispatcher {
    bindings: Bindings,
    haptics: bool,
}

impl ActionDispatcher {
    pub fn new(bindings: Bindings, haptics: bool) -> Self {
        Self { bindings, haptics }
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Request a bound slot asks for, or the advisory when it has none
    pub fn resolve_slot(&self, slot: GestureSlot) -> Result<Request, Option<String>> {
        let binding = self.bindings.get(slot);
        let request = match binding.action {
            Action::Disabled => return Err(slot.disabled_advisory().map(String::from)),
            Action::OpenApp => match (&binding.app, slot.default_app()) {
                (Some(app), _) => Request::LaunchApp { app: app.clone() },
                (None, Some(app)) => Request::LaunchDefault { app },
                (None, None) => return Err(None),
            },
            Action::OpenAppDrawer => Request::Navigate { screen: Screen::AppDrawer },
            Action::OpenNotificationsScreen => Request::Navigate { screen: Screen::SimpleTray },
            Action::EinkRefresh => Request::EinkRefresh,
            Action::Brightness => Request::ToggleBrightness,
            Action::LockScreen => Request::LockScreen,
            Action::ShowRecents => Request::ShowRecents,
            Action::OpenQuickSettings => Request::OpenQuickSettings,
            Action::OpenPowerDialog => Request::OpenPowerDialog,
            Action::RestartApp => Request::RestartApp,
            Action::ExitLauncher => Request::ExitLauncher,
            Action::TogglePrivateSpace => Request::TogglePrivateSpace,
        };
        Ok(request)
    }

    /// Run the binding of a gesture slot
    pub fn dispatch_gesture(&self, slot: GestureSlot, collaborators: &mut impl Collaborators) -> DispatchOutcome {
        let request = match self.resolve_slot(slot) {
            Ok(request) => request,
            Err(advisory) => {
                debug!(?slot, "gesture unbound");
                return DispatchOutcome::Unbound { advisory };
            }
        };

        if self.haptics {
            if let Err(e) = collaborators.perform(&Request::Haptic) {
                debug!("haptic feedback failed: {}", e);
            }
        }
        info!(?slot, ?request, "gesture action");
        perform(request, collaborators)
    }

    /// Short or long activation of a focused target
    pub fn dispatch_target(&self, target: Target, long_press: bool, collaborators: &mut impl Collaborators) -> DispatchOutcome {
        if let Some(slot) = GestureSlot::from_target(target) {
            return self.dispatch_gesture(slot, collaborators);
        }

        let request = match (target, long_press) {
            (Target::HomeApp { slot }, false) => Request::OpenHomeApp { slot },
            (Target::HomeApp { slot }, true) => Request::HomeAppMenu { slot },
            (Target::Notification { index }, false) => Request::OpenNotification { index },
            (Target::Notification { index }, true) => Request::DismissNotification { index },
            (Target::DrawerApp { index }, false) => Request::OpenDrawerApp { index },
            (Target::DrawerApp { index }, true) => Request::DrawerAppMenu { index },
            (Target::MediaButton { index }, _) => match MediaCommand::BUTTONS.get(index) {
                Some(command) => Request::Media { command: *command },
                None => return DispatchOutcome::Unbound { advisory: None },
            },
            (Target::QuickSetting { index }, _) => match QuickToggle::ROW.get(index) {
                Some(toggle) => Request::QuickSetting { toggle: *toggle },
                None => return DispatchOutcome::Unbound { advisory: None },
            },
            (Target::ClearAll, _) => Request::ClearNotifications,
            (Target::BottomNav { index: 0 }, _) => Request::Navigate { screen: Screen::Home },
            (Target::BottomNav { index: 1 }, _) => Request::OpenSystemSettings,
            (Target::BottomNav { .. }, _) => return DispatchOutcome::Unbound { advisory: None },
            (Target::SearchField, _) => Request::OpenSearch,
            (Target::Clock | Target::Date | Target::Quote, _) => return DispatchOutcome::Unbound { advisory: None },
        };
        info!(?target, long_press, ?request, "activation");
        perform(request, collaborators)
    }

    /// Dispatch whatever a navigator outcome asks for. Pure focus changes
    /// dispatch nothing.
    pub fn dispatch_nav(&self, outcome: &NavOutcome, collaborators: &mut impl Collaborators) -> Option<DispatchOutcome> {
        match *outcome {
            NavOutcome::Ignored | NavOutcome::Consumed | NavOutcome::Moved => None,
            NavOutcome::Activate(target) => Some(self.dispatch_target(target, false, collaborators)),
            NavOutcome::LongPress(target) => Some(self.dispatch_target(target, true, collaborators)),
            NavOutcome::Gesture(gesture) => {
                GestureSlot::from_gesture(gesture).map(|slot| self.dispatch_gesture(slot, collaborators))
            }
            NavOutcome::Brightness(value) => Some(perform(Request::SetBrightness { value }, collaborators)),
            NavOutcome::Filter(filter) => Some(perform(Request::FilterApps { filter }, collaborators)),
        }
    }
}

/// Hand one request to the collaborators
pub fn perform(request: Request, collaborators: &mut impl Collaborators) -> DispatchOutcome {
    match collaborators.perform(&request) {
        Ok(()) => DispatchOutcome::Performed(request),
        Err(error) => DispatchOutcome::Failed { request, error },
    }
}
