//! Error types for the input core

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::input::Key;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config serialize error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("replay script error: {0}")]
    Script(#[from] serde_json::Error),

    #[error("key-up for {released:?} does not match tracked key {tracked:?}")]
    UnpairedKeyUp { tracked: Option<Key>, released: Key },
}

/// Failure reported by an external collaborator (app launcher, system
/// settings, screen navigation...)
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum CollaboratorError {
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("collaborator failed: {0}")]
    Failed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
