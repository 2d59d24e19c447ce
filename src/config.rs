//! Launcher configuration
//!
//! Read once per session from `$XDG_CONFIG_HOME/inklaunch/config.toml` and
//! passed down as an immutable value.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::actions::Bindings;
use crate::error::Result;
use crate::input::{GestureConfig, PairingMode, LONG_PRESS_THRESHOLD_MS};
use crate::nav::NavConfig;

/// `[keys]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    pub long_press_threshold_ms: u64,
    /// Volume keys flip pages
    pub volume_keys_page: bool,
    /// Report unmatched key-ups instead of resetting silently
    pub strict_pairing: bool,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            long_press_threshold_ms: LONG_PRESS_THRESHOLD_MS,
            volume_keys_page: false,
            strict_pairing: false,
        }
    }
}

/// `[feedback]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub haptics: bool,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self { haptics: true }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    pub gestures: GestureConfig,
    pub keys: KeysConfig,
    pub feedback: FeedbackConfig,
    pub bindings: Bindings,
}

impl LauncherConfig {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
        Some(base.join("inklaunch").join("config.toml"))
    }

    /// Load config from the default path, or return defaults if missing or
    /// unreadable
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            tracing::info!("No config directory, using defaults");
            return Self::default();
        };
        if !path.exists() {
            tracing::info!("No config at {:?}, using defaults", path);
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load config from {:?}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse TOML text; gesture ratios are clamped into range
    pub fn parse(contents: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(contents)?;
        config.gestures = config.gestures.sanitized();
        Ok(config)
    }

    /// Save config to the default path
    pub fn save(&self) {
        let Some(path) = Self::config_path() else {
            tracing::warn!("No config directory, not saving");
            return;
        };
        match self.save_to(&path) {
            Ok(()) => tracing::info!("Saved config to {:?}", path),
            Err(e) => tracing::warn!("Failed to save config: {}", e),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let text = toml::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    pub fn nav_config(&self) -> NavConfig {
        NavConfig {
            long_press_threshold_ms: self.keys.long_press_threshold_ms,
            volume_keys_page: self.keys.volume_keys_page,
            pairing: if self.keys.strict_pairing { PairingMode::Strict } else { PairingMode::Tolerant },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{Action, AppTarget, Binding};

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = LauncherConfig::parse("").unwrap();
        assert_eq!(config, LauncherConfig::default());
        assert_eq!(config.nav_config(), NavConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = LauncherConfig::parse(
            r#"
            [gestures]
            short_swipe_ratio = 0.8

            [keys]
            volume_keys_page = true
            strict_pairing = true

            [bindings.swipe_left]
            action = "open_app"
            app = "org.example.camera"

            [bindings.quote_tap]
            action = "eink_refresh"
            "#,
        )
        .unwrap();

        assert_eq!(config.gestures.short_swipe_ratio, 0.8);
        assert_eq!(config.gestures.long_swipe_ratio, 1.5);
        assert_eq!(config.nav_config().pairing, PairingMode::Strict);
        assert!(config.nav_config().volume_keys_page);
        assert_eq!(config.bindings.swipe_left.app, Some(AppTarget("org.example.camera".into())));
        assert_eq!(config.bindings.quote_tap, Binding::new(Action::EinkRefresh));
        assert_eq!(config.bindings.swipe_up, Binding::new(Action::OpenAppDrawer));
        assert!(config.feedback.haptics);
    }

    #[test]
    fn test_ratios_clamped() {
        let config = LauncherConfig::parse("[gestures]\nshort_swipe_ratio = 9.0\nlong_swipe_ratio = 0.2\n").unwrap();
        assert_eq!(config.gestures.short_swipe_ratio, 2.0);
        assert_eq!(config.gestures.long_swipe_ratio, 1.0);
    }

    #[test]
    fn test_unknown_action_is_an_error() {
        let err = LauncherConfig::parse("[bindings.swipe_up]\naction = \"teleport\"\n").unwrap_err();
        assert!(matches!(err, crate::error::Error::ConfigParse(_)));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = std::env::temp_dir().join(format!("inklaunch-config-{}", std::process::id()));
        let path = dir.join("config.toml");
        let mut config = LauncherConfig::default();
        config.bindings.double_tap = Binding::app("org.example.notes");
        config.keys.long_press_threshold_ms = 500;

        config.save_to(&path).unwrap();
        let loaded = LauncherConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = LauncherConfig::load_from(Path::new("/nonexistent/inklaunch.toml")).unwrap_err();
        assert!(matches!(err, crate::error::Error::Io(_)));
    }
}
