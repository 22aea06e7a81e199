//! Configuration management for pteprep

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::theme::Theme;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Selected theme name
    pub theme: String,

    /// Custom theme overrides (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_theme: Option<Theme>,

    /// Whether microphone input is allowed; speaking tasks refuse to start
    /// without it
    pub microphone_allowed: bool,

    /// Speech playback rate multiplier (1.0 = normal)
    pub speech_rate: f32,

    /// Preferred speech voice name, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech_voice: Option<String>,

    /// Normalized input level that counts as voice
    pub voice_threshold: f32,

    /// Continuous silence that fails a recording, in seconds
    pub silence_window_secs: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "Night".to_string(),
            custom_theme: None,
            microphone_allowed: true,
            speech_rate: 1.0,
            speech_voice: None,
            voice_threshold: 0.15,
            silence_window_secs: 3.0,
        }
    }
}

impl Config {
    /// Load configuration from disk, or create default if not exists
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config from {:?}", config_path))?;
            serde_json::from_str(&contents).with_context(|| "Failed to parse config.json")
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        let contents =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config to {:?}", config_path))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("", "", "pteprep").context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.json"))
    }

    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        let proj_dirs =
            ProjectDirs::from("", "", "pteprep").context("Failed to determine data directory")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    /// Get the question banks directory path
    pub fn banks_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("banks"))
    }

    /// Get the path of the key-value store file
    pub fn store_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("store.json"))
    }

    /// Get the active theme
    pub fn active_theme(&self) -> Theme {
        self.custom_theme.clone().unwrap_or_else(Theme::night)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_allows_the_microphone() {
        let config = Config::default();
        assert!(config.microphone_allowed);
    }

    #[test]
    fn default_thresholds_are_sane() {
        let config = Config::default();
        assert!(config.voice_threshold > 0.0 && config.voice_threshold < 1.0);
        assert!(config.silence_window_secs > 0.0);
    }

    #[test]
    fn config_serializes_to_json() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("Night"));
    }

    #[test]
    fn config_deserializes_from_json() {
        let json = r#"{
            "theme": "Night",
            "microphone_allowed": false,
            "speech_rate": 0.8,
            "voice_threshold": 0.2,
            "silence_window_secs": 2.5
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert!(!config.microphone_allowed);
        assert_eq!(config.speech_rate, 0.8);
    }
}
