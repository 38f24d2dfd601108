use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, eyre};
use color_eyre::Result;
use serde::{Deserialize, Serialize};

/// Persisted search dialog settings.
///
/// The geometry values are opaque blobs owned by the dialog shell; they are
/// stored and handed back verbatim, never interpreted here. Read when the
/// dialog opens, written when it closes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub use_advanced_search_syntax: bool,
    #[serde(default)]
    pub window_size: Option<String>,
    #[serde(default)]
    pub header_state: Option<String>,
}

impl Settings {
    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read settings file: {}", path.display()))?;
        let settings: Settings = toml::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse settings file: {}", path.display()))?;
        Ok(settings)
    }

    /// Get the settings file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("track-search").join("config.toml"))
    }

    /// Load persisted settings, falling back to defaults when no file
    /// exists yet.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path().ok_or(eyre!("No config directory available"))?;
        if config_path.exists() {
            Self::from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }
        let contents = toml::to_string(self).wrap_err("Failed to serialize settings")?;
        std::fs::write(path, contents)
            .wrap_err_with(|| format!("Failed to write settings file: {}", path.display()))?;
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path().ok_or(eyre!("No config directory available"))?;
        self.save_to(&config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_preserves_opaque_blobs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let settings = Settings {
            use_advanced_search_syntax: true,
            window_size: Some("720x360".into()),
            header_state: Some("AAAA/wAAAAD9AAAAAA==".into()),
        };
        settings.save_to(&path).unwrap();

        let loaded = Settings::from_file(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_fields_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "use_advanced_search_syntax = true\n").unwrap();

        let loaded = Settings::from_file(&path).unwrap();
        assert!(loaded.use_advanced_search_syntax);
        assert_eq!(loaded.window_size, None);
        assert_eq!(loaded.header_state, None);
    }

    #[test]
    fn test_unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "use_advanced_search_syntax = \"not a bool\"\n").unwrap();

        assert!(Settings::from_file(&path).is_err());
    }
}
