//! Scripted event replay
//!
//! A JSON script describes a starting screen, content snapshots and a list
//! of raw input events. Replaying it through a [`Launcher`] backed by
//! [`RecordingCollaborators`] yields one [`ReplayLine`] per event that
//! resolved to something.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::actions::{Collaborators, DispatchOutcome, Request};
use crate::config::LauncherConfig;
use crate::error::{CollaboratorError, Result};
use crate::input::{evdev_to_key, KeyAction, KeyEvent, PointerSample};
use crate::launcher::{Contents, Launcher, Reaction, Screen};
use crate::nav::{DrawerContent, HomeContent, Target, TrayContent};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Script {
    pub screen: Screen,
    pub contents: Contents,
    /// Request kinds the collaborators refuse, e.g. `"launch_default"`
    pub unavailable: Vec<String>,
    pub events: Vec<ScriptEvent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    PointerDown(PointerSample),
    PointerMove(PointerSample),
    PointerUp(PointerSample),
    PointerCancel,
    Key(KeyEvent),
    /// Raw evdev key event; value 1 press, 2 auto-repeat, 0 release
    Evdev { code: u32, value: i32, time_ms: u64 },
    /// Host hit-tested a touch onto a target
    Activate {
        target: Target,
        #[serde(default)]
        long_press: bool,
    },
    Show { screen: Screen },
    HomeContent(HomeContent),
    DrawerContent(DrawerContent),
    TrayContent(TrayContent),
}

impl Script {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Collaborators that log every request and refuse the configured kinds
#[derive(Debug, Default)]
pub struct RecordingCollaborators {
    pub requests: Vec<Request>,
    unavailable: Vec<String>,
}

impl RecordingCollaborators {
    pub fn new(unavailable: Vec<String>) -> Self {
        Self { requests: Vec::new(), unavailable }
    }
}

/// Tag of a request as it appears in JSON output
fn request_kind(request: &Request) -> Option<String> {
    let value = serde_json::to_value(request).ok()?;
    value.get("request")?.as_str().map(str::to_owned)
}

impl Collaborators for RecordingCollaborators {
    fn perform(&mut self, request: &Request) -> std::result::Result<(), CollaboratorError> {
        debug!(?request, "perform");
        self.requests.push(request.clone());
        match request_kind(request) {
            Some(kind) if self.unavailable.contains(&kind) => Err(CollaboratorError::Unavailable(kind)),
            _ => Ok(()),
        }
    }
}

/// Output of one replayed event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayLine {
    pub step: usize,
    /// Screen on show after the event
    pub screen: Screen,
    #[serde(flatten)]
    pub reaction: Reaction,
}

/// Replay state for evdev auto-repeat counting
#[derive(Default)]
struct EvdevState {
    repeat: u32,
}

impl EvdevState {
    fn translate(&mut self, code: u32, value: i32, time_ms: u64) -> Option<KeyEvent> {
        let key = evdev_to_key(code)?;
        let action = match value {
            0 => KeyAction::Up,
            1 => {
                self.repeat = 0;
                KeyAction::Down
            }
            2 => {
                self.repeat += 1;
                KeyAction::Down
            }
            other => {
                warn!("evdev value {} for code {} ignored", other, code);
                return None;
            }
        };
        let repeat = if action == KeyAction::Down { self.repeat } else { 0 };
        Some(KeyEvent { key, action, repeat, time_ms })
    }
}

/// Replay `script` on a fresh launcher
pub fn run(script: &Script, config: &LauncherConfig) -> (Vec<ReplayLine>, RecordingCollaborators) {
    let collaborators = RecordingCollaborators::new(script.unavailable.clone());
    let mut launcher = Launcher::new(config, collaborators);
    launcher.set_home_content(script.contents.home.clone());
    launcher.set_drawer_content(script.contents.drawer.clone());
    launcher.set_tray_content(script.contents.tray.clone());
    launcher.show(script.screen);

    let mut evdev = EvdevState::default();
    let mut lines = Vec::new();

    for (step, event) in script.events.iter().enumerate() {
        let reaction = match event {
            ScriptEvent::PointerDown(sample) => {
                launcher.pointer_down(*sample);
                Reaction::default()
            }
            ScriptEvent::PointerMove(sample) => {
                launcher.pointer_move(*sample);
                Reaction::default()
            }
            ScriptEvent::PointerUp(sample) => launcher.pointer_up(*sample),
            ScriptEvent::PointerCancel => {
                launcher.pointer_cancel();
                Reaction::default()
            }
            ScriptEvent::Key(key) => launcher.key(key),
            ScriptEvent::Evdev { code, value, time_ms } => match evdev.translate(*code, *value, *time_ms) {
                Some(key) => launcher.key(&key),
                None => Reaction::default(),
            },
            ScriptEvent::Activate { target, long_press } => Reaction {
                dispatch: Some(launcher.activate(*target, *long_press)),
                ..Reaction::default()
            },
            ScriptEvent::Show { screen } => {
                launcher.show(*screen);
                Reaction::default()
            }
            ScriptEvent::HomeContent(content) => {
                launcher.set_home_content(content.clone());
                Reaction::default()
            }
            ScriptEvent::DrawerContent(content) => {
                launcher.set_drawer_content(content.clone());
                Reaction::default()
            }
            ScriptEvent::TrayContent(content) => {
                launcher.set_tray_content(content.clone());
                Reaction::default()
            }
        };

        if !reaction.is_empty() {
            lines.push(ReplayLine { step, screen: launcher.screen(), reaction });
        }
    }

    let failures = lines
        .iter()
        .filter(|line| matches!(line.reaction.dispatch, Some(DispatchOutcome::Failed { .. })))
        .count();
    debug!(events = script.events.len(), outcomes = lines.len(), failures, "replay finished");

    let collaborators = launcher.into_collaborators();
    (lines, collaborators)
}
