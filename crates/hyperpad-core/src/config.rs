//! Editor configuration.
//!
//! ## Learning: Serde for Serialization
//!
//! `#[serde(default)]` on every section means a config file only needs the
//! keys it wants to change; everything else falls back to `Default`.
//!
//! ```toml
//! [editor]
//! update_delay_ms = 500
//!
//! [preview]
//! port = 9000
//! ```

use hyperpad_syntax::Language;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::preferences::{self, Preferences};

/// Main configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Editing surface behaviour
    pub editor: EditorConfig,

    /// Local preview server
    pub preview: PreviewConfig,

    /// Version control
    pub vcs: VcsConfig,
}

impl Config {
    /// Loads config from the default location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from_default_path().unwrap_or_default()
    }

    /// Loads config from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    fn load_from_default_path() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns `<config_dir>/hyperpad/config.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("hyperpad").join("config.toml"))
    }

    /// Saves the config to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::default_path()?)
    }

    /// Saves the config to a specific file.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Overrides the editor's theme and line-number settings with the
    /// user's stored preferences.
    pub fn with_preferences(mut self, prefs: &Preferences) -> Self {
        self.editor.dark_theme = prefs.get(preferences::DARK_THEME_EDITOR, self.editor.dark_theme);
        self.editor.show_line_numbers =
            prefs.get(preferences::SHOW_LINE_NUMBERS, self.editor.show_line_numbers);
        self
    }
}

/// Editing surface configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Quiet period before re-highlighting, in milliseconds
    pub update_delay_ms: u64,

    /// Auto-indent on newline
    pub auto_indent: bool,

    /// Text appended for one extra indentation level
    pub indent_unit: String,

    pub show_line_numbers: bool,

    pub dark_theme: bool,

    /// Language used when it cannot be detected from the file name
    pub language: Option<Language>,

    /// Undo history limit
    pub undo_limit: usize,
}

impl EditorConfig {
    pub fn update_delay(&self) -> Duration {
        Duration::from_millis(self.update_delay_ms)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            update_delay_ms: 2000,
            auto_indent: true,
            indent_unit: "\t".to_string(),
            show_line_numbers: true,
            dark_theme: false,
            language: None,
            undo_limit: 1000,
        }
    }
}

/// Preview server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub bind: IpAddr,
    pub port: u16,

    /// File served for `/`
    pub index_file: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            bind: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8080,
            index_file: "index.html".to_string(),
        }
    }
}

/// Version control configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VcsConfig {
    /// Path or name of the git executable
    pub git_program: String,

    /// Remote used when none is given
    pub remote: String,
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            git_program: "git".to_string(),
            remote: "origin".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
