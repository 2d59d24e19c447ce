//! Inklaunch - input core of a D-pad first e-ink launcher
//!
//! - Pointer gesture classification (taps, swipes, page moves)
//! - Long-press disambiguation for the activation key
//! - Focus navigation for the Home, AppDrawer and SimpleTray screens
//! - Action dispatch to host collaborators

pub mod actions;
pub mod config;
pub mod error;
pub mod input;
pub mod launcher;
pub mod nav;
pub mod replay;

pub use actions::{ActionDispatcher, Collaborators, DispatchOutcome, Request};
pub use config::LauncherConfig;
pub use error::{CollaboratorError, Error, Result};
pub use launcher::{Launcher, Reaction, Screen};
