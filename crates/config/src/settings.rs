// Preferences dialog behavior
// Loaded from ~/.config/prefsuite/dialog.toml

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// How the dialog validates tabs before saving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Stop at the first tab that fails; the user fixes one problem at a time
    #[default]
    FailFast,
    /// Validate every tab (each reports its own problem), then fail if any did
    CollectAll,
}

/// What happens when a tab fails to load its values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadFailurePolicy {
    /// The dialog does not open
    #[default]
    Abort,
    /// The tab is shown degraded and skipped by validate/store
    Isolate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogSettings {
    pub validation_mode: ValidationMode,

    pub load_failure: LoadFailurePolicy,

    /// Preferences file override (None = config dir default)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
}

impl Default for DialogSettings {
    fn default() -> Self {
        Self {
            validation_mode: ValidationMode::FailFast,
            load_failure: LoadFailurePolicy::Abort,
            store_path: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, message: String },
    Parse { path: PathBuf, message: String },
    Serialize(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, message } => {
                write!(f, "Error reading {}: {}", path.display(), message)
            }
            ConfigError::Parse { path, message } => {
                write!(f, "Error parsing {}: {}", path.display(), message)
            }
            ConfigError::Serialize(msg) => write!(f, "Error serializing settings: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Prefsuite's directory under the platform config dir
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("prefsuite")
}

impl DialogSettings {
    /// Get the dialog settings file path
    pub fn config_path() -> PathBuf {
        config_dir().join("dialog.toml")
    }

    /// Where the preference store lives
    pub fn preferences_path(&self) -> PathBuf {
        self.store_path
            .clone()
            .unwrap_or_else(|| config_dir().join("preferences.json"))
    }

    /// Load settings from the default location, falling back to defaults.
    ///
    /// A broken dialog.toml never keeps the preferences dialog from opening.
    pub fn load() -> Self {
        Self::load_or_default(&Self::config_path())
    }

    /// Best-effort load from `path`: missing or broken files give defaults.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{}; using default dialog settings", e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Save current settings to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }

        let text = toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;

        fs::write(path, text).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dialog.toml");
        fs::write(&path, "validation_mode = \"collect_all\"\n").unwrap();

        let settings = DialogSettings::load_from(&path).unwrap();
        assert_eq!(settings.validation_mode, ValidationMode::CollectAll);
        assert_eq!(settings.load_failure, LoadFailurePolicy::Abort);
        assert_eq!(settings.store_path, None);
    }

    #[test]
    fn test_settings_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conf").join("dialog.toml");

        let settings = DialogSettings {
            validation_mode: ValidationMode::CollectAll,
            load_failure: LoadFailurePolicy::Isolate,
            store_path: Some(dir.path().join("prefs.json")),
        };
        settings.save_to(&path).unwrap();

        let loaded = DialogSettings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.preferences_path(), dir.path().join("prefs.json"));
    }

    #[test]
    fn test_unknown_mode_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dialog.toml");
        fs::write(&path, "load_failure = \"explode\"\n").unwrap();

        assert!(matches!(
            DialogSettings::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_broken_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dialog.toml");
        assert_eq!(DialogSettings::load_or_default(&path), DialogSettings::default());

        fs::write(&path, "validation_mode = [not toml").unwrap();
        assert_eq!(DialogSettings::load_or_default(&path), DialogSettings::default());

        fs::write(&path, "load_failure = \"isolate\"\n").unwrap();
        let settings = DialogSettings::load_or_default(&path);
        assert_eq!(settings.load_failure, LoadFailurePolicy::Isolate);
    }

    #[test]
    fn test_default_preferences_path() {
        let settings = DialogSettings::default();
        let path = settings.preferences_path();
        assert!(path.ends_with("prefsuite/preferences.json"));
    }
}
