use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::app::infrastructure::error::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Tab size in spaces (default 4)
    #[serde(default = "default_tab_size")]
    pub tab_size: usize,

    #[serde(default = "default_debounce_ms")]
    pub render_debounce_ms: u64,

    #[serde(default = "default_debounce_ms")]
    pub persist_debounce_ms: u64,

    /// Quiet period before the editor counts as idle again
    #[serde(default = "default_typing_idle_ms")]
    pub typing_idle_ms: u64,

    /// Indent used when the template is empty and the data is shown as-is
    #[serde(default = "default_pretty_indent")]
    pub pretty_indent: usize,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_data")]
    pub default_data: String,

    #[serde(default = "default_template")]
    pub default_template: String,
}

fn default_tab_size() -> usize {
    4
}

fn default_debounce_ms() -> u64 {
    250
}

fn default_typing_idle_ms() -> u64 {
    1000
}

fn default_pretty_indent() -> usize {
    2
}

fn default_base_url() -> String {
    "http://localhost/".to_string()
}

fn default_data() -> String {
    "{\"hello\":\"world\"}".to_string()
}

fn default_template() -> String {
    "{{hello}}".to_string()
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tab_size: default_tab_size(),
            render_debounce_ms: default_debounce_ms(),
            persist_debounce_ms: default_debounce_ms(),
            typing_idle_ms: default_typing_idle_ms(),
            pretty_indent: default_pretty_indent(),
            base_url: default_base_url(),
            default_data: default_data(),
            default_template: default_template(),
        }
    }
}

impl EngineSettings {
    pub fn render_debounce(&self) -> Duration {
        Duration::from_millis(self.render_debounce_ms)
    }

    pub fn persist_debounce(&self) -> Duration {
        Duration::from_millis(self.persist_debounce_ms)
    }

    pub fn typing_idle(&self) -> Duration {
        Duration::from_millis(self.typing_idle_ms)
    }

    /// Load settings from the default config path, or create defaults if missing
    pub fn load() -> Self {
        Self::load_from(&Self::get_config_path())
    }

    pub fn load_from(config_path: &Path) -> Self {
        match fs::read_to_string(config_path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(settings) => settings.validated(),
                Err(e) => {
                    log::warn!("Failed to parse settings: {}. Using defaults.", e);
                    Self::default()
                }
            },
            Err(_) => {
                // File doesn't exist, use defaults
                let default = Self::default();
                if let Err(e) = default.save_to(config_path) {
                    log::debug!("Could not write default settings: {}", e);
                }
                default
            }
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(config_path, json)?;

        Ok(())
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.tab_size == 0 {
            return Err(AppError::Settings("tab_size must be at least 1".to_string()));
        }
        if self.typing_idle_ms < self.render_debounce_ms.max(self.persist_debounce_ms) {
            return Err(AppError::Settings(
                "typing_idle_ms must not be shorter than the debounce windows".to_string(),
            ));
        }
        Ok(())
    }

    fn validated(self) -> Self {
        match self.validate() {
            Ok(()) => self,
            Err(e) => {
                log::warn!("{}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Get config file path (cross-platform)
    pub fn get_config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("stachepad");
        path.push("settings.json");
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = EngineSettings::default();
        assert_eq!(settings.tab_size, 4);
        assert_eq!(settings.render_debounce(), Duration::from_millis(250));
        assert_eq!(settings.persist_debounce(), Duration::from_millis(250));
        assert_eq!(settings.typing_idle(), Duration::from_millis(1000));
        assert_eq!(settings.default_data, r#"{"hello":"world"}"#);
        assert_eq!(settings.default_template, "{{hello}}");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_config() {
        let json = r#"{"tab_size": 2}"#;
        let settings: EngineSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.tab_size, 2);
        assert_eq!(settings.typing_idle_ms, 1000);
        assert_eq!(settings.base_url, "http://localhost/");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = EngineSettings {
            tab_size: 8,
            base_url: "https://example.com/pad".to_string(),
            ..Default::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(EngineSettings::load_from(&path), settings);
    }

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let loaded = EngineSettings::load_from(&path);
        assert_eq!(loaded, EngineSettings::default());
        assert!(path.exists());
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "not json").unwrap();
        assert_eq!(EngineSettings::load_from(&path), EngineSettings::default());

        fs::write(&path, r#"{"tab_size": 0}"#).unwrap();
        assert_eq!(EngineSettings::load_from(&path), EngineSettings::default());
    }

    #[test]
    fn test_typing_window_shorter_than_debounce_is_rejected() {
        let settings = EngineSettings {
            typing_idle_ms: 100,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(AppError::Settings(_))));
    }
}
