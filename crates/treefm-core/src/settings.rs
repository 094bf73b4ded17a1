//! Persistent user settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::FsError;

/// Font size used on first run.
pub const DEFAULT_FONT_SIZE: u32 = 10;

/// Smallest font size zooming out can reach.
pub const MIN_FONT_SIZE: u32 = 5;

/// Color theme.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Parse a theme name, falling back to light for anything unknown.
    pub fn from_name(name: &str) -> Self {
        name.trim().parse().unwrap_or_default()
    }

    /// The other theme.
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Persistent user settings stored in config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// Color theme.
    #[serde(deserialize_with = "deserialize_theme")]
    pub theme: Theme,
    /// Display font size in points.
    pub font_size: u32,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

fn deserialize_theme<'de, D>(deserializer: D) -> Result<Theme, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    Ok(Theme::from_name(&name))
}

impl UserSettings {
    /// Get the config file path.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("treefm").join("settings.toml"))
    }

    /// Load settings from disk, or return defaults.
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load settings from a specific file, or return defaults.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };

        match toml::from_str::<Self>(&content) {
            Ok(mut settings) => {
                settings.font_size = settings.font_size.max(MIN_FONT_SIZE);
                settings
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
                Self::default()
            }
        }
    }

    /// Save settings to disk.
    pub fn save(&self) -> Result<(), FsError> {
        let path = Self::config_path().ok_or_else(|| FsError::Settings {
            message: "No config directory".to_string(),
        })?;
        self.save_to(&path)
    }

    /// Save settings to a specific file.
    pub fn save_to(&self, path: &Path) -> Result<(), FsError> {
        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| FsError::io(parent, e))?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| FsError::Settings {
            message: e.to_string(),
        })?;

        std::fs::write(path, content).map_err(|e| FsError::io(path, e))
    }

    /// Increase the font size by one point.
    pub fn zoom_in(&mut self) {
        self.font_size = self.font_size.saturating_add(1);
    }

    /// Decrease the font size by one point. Returns false at the minimum.
    pub fn zoom_out(&mut self) -> bool {
        if self.font_size > MIN_FONT_SIZE {
            self.font_size -= 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_on_first_run() {
        let temp = TempDir::new().unwrap();
        let settings = UserSettings::load_from(&temp.path().join("settings.toml"));
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.font_size, DEFAULT_FONT_SIZE);
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("settings.toml");

        let settings = UserSettings {
            theme: Theme::Dark,
            font_size: 14,
        };
        settings.save_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("theme = \"dark\""));
        assert_eq!(UserSettings::load_from(&path), settings);
    }

    #[test]
    fn test_unknown_theme_falls_back_to_light() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("settings.toml");
        std::fs::write(&path, "theme = \"solarized\"\nfont_size = 12\n").unwrap();

        let settings = UserSettings::load_from(&path);
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.font_size, 12);
    }

    #[test]
    fn test_zoom_out_stops_at_minimum() {
        let mut settings = UserSettings {
            font_size: MIN_FONT_SIZE + 1,
            ..Default::default()
        };
        assert!(settings.zoom_out());
        assert!(!settings.zoom_out());
        assert_eq!(settings.font_size, MIN_FONT_SIZE);

        settings.zoom_in();
        assert_eq!(settings.font_size, MIN_FONT_SIZE + 1);
    }

    #[test]
    fn test_theme_parsing() {
        assert_eq!(Theme::from_name("Dark"), Theme::Dark);
        assert_eq!(Theme::from_name("light"), Theme::Light);
        assert_eq!(Theme::from_name(""), Theme::Light);
        assert_eq!(Theme::Dark.to_string(), "dark");
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }
}
