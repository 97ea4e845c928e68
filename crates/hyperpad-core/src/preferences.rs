//! User preferences: a typed key/value store persisted as TOML.
//!
//! Values are read with a default and never migrated. A stored value that
//! does not fit the requested type reads as the default.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::ConfigError;

/// Editor palette: `true` selects the dark palette.
pub const DARK_THEME_EDITOR: &str = "dark_theme_editor";
/// Whether the overlay draws line numbers.
pub const SHOW_LINE_NUMBERS: &str = "show_line_numbers";

#[derive(Debug, Clone)]
pub struct Preferences {
    path: PathBuf,
    values: toml::Table,
}

impl Preferences {
    /// Opens a preferences file. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => toml::Table::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, values })
    }

    /// Opens `<config_dir>/hyperpad/preferences.toml`.
    pub fn open_default() -> Result<Self, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Self::open(config_dir.join("hyperpad").join("preferences.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads `key`, or `default` when it is missing or of another type.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.values
            .get(key)
            .cloned()
            .and_then(|value| value.try_into().ok())
            .unwrap_or(default)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Stores `value` under `key` and writes the file.
    pub fn store<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), ConfigError> {
        let value = toml::Value::try_from(value)?;
        self.values.insert(key.to_string(), value);
        self.flush()?;
        debug!(key, path = %self.path.display(), "preference stored");
        Ok(())
    }

    fn flush(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, toml::to_string_pretty(&self.values)?)?;
        Ok(())
    }
}
