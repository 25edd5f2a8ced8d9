// Import necessary libraries and modules for file I/O and serialization.
use crate::error::AppError;
use crate::session::SessionConfig;
use crate::transport::{DEFAULT_MODEL, DEFAULT_TEMPERATURE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

// Application settings, persisted as JSON next to the log.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub openai_api_key: Option<String>, // Optional API key; the environment variable wins.
    pub model: String,
    pub temperature: f32,
    pub rebuttal_probability: f64, // Chance the opponent reacts after a judge reply.
    pub rebuttal_delay_ms: u64,
    pub opening_delay_ms: u64, // Pause before the prosecution's automatic opening.
    pub case_file: Option<PathBuf>, // Alternate case file; the bundled case otherwise.
    pub debug_mode: bool,
}

// Implement the Default trait for Settings to provide a method to create default settings.
impl Default for Settings {
    fn default() -> Self {
        Settings {
            openai_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            rebuttal_probability: 0.2,
            rebuttal_delay_ms: 1500,
            opening_delay_ms: 2500,
            case_file: None,
            debug_mode: false,
        }
    }
}

impl Settings {
    // Directory holding settings and logs: ~/lex_simulacra/data
    pub fn data_dir() -> Result<PathBuf, AppError> {
        let home_dir = dir::home_dir().ok_or(AppError::NoHomeDir)?;
        Ok(home_dir.join("lex_simulacra").join("data"))
    }

    // Load settings from the default location, falling back to defaults when absent.
    pub fn load() -> Result<Self, AppError> {
        let path = Self::data_dir()?.join("settings.json");
        if !path.exists() {
            log::info!("No settings at {}, writing defaults", path.display());
            let settings = Self::default();
            settings.save()?;
            return Ok(settings);
        }
        Ok(Self::load_settings_from_file(path)?)
    }

    // Save current settings to the default location.
    pub fn save(&self) -> Result<(), AppError> {
        let path = Self::data_dir()?.join("settings.json");
        Ok(self.save_to_file(path)?)
    }

    // Load settings from a specified file path.
    pub fn load_settings_from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let data = fs::read_to_string(path)?; // Read settings from file.
        let settings = serde_json::from_str(&data)?; // Deserialize JSON data into settings.
        Ok(settings)
    }

    // Save current settings to a specified file path.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        let data = serde_json::to_string_pretty(self)?; // Pretty JSON for hand editing.
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?; // Create the directory if it doesn't exist.
        }
        let mut file = fs::File::create(path)?; // Create or overwrite the file.
        file.write_all(data.as_bytes())?;
        Ok(())
    }

    /// The API key from the environment, else from the settings file.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| self.openai_api_key.clone())
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            rebuttal_probability: self.rebuttal_probability.clamp(0.0, 1.0),
            rebuttal_delay: Duration::from_millis(self.rebuttal_delay_ms),
            opening_delay: Duration::from_millis(self.opening_delay_ms),
            ..SessionConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let settings = Settings {
            model: "gpt-4o".to_string(),
            rebuttal_probability: 0.5,
            debug_mode: true,
            ..Settings::default()
        };
        settings.save_to_file(&path).unwrap();
        assert_eq!(Settings::load_settings_from_file(&path).unwrap(), settings);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "model": "gpt-4o" }"#).unwrap();
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.rebuttal_probability, 0.2);
        assert_eq!(settings.rebuttal_delay_ms, 1500);
    }

    #[test]
    fn probability_is_clamped_for_the_session() {
        let settings = Settings {
            rebuttal_probability: 3.0,
            rebuttal_delay_ms: 0,
            ..Settings::default()
        };
        let config = settings.session_config();
        assert_eq!(config.rebuttal_probability, 1.0);
        assert_eq!(config.rebuttal_delay, Duration::ZERO);
    }
}
