//! Client configuration persistence.
//!
//! Stores the API key and environment so callers do not have to pass the
//! credential around between sessions.

use crate::environment::Environment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::{fs, path::Path};

/// Get the path to the SimAtomic config file. A `simatomic.config` in the
/// current directory takes precedence over `~/.simatomic/config.json`.
pub fn get_config_path() -> Result<PathBuf, std::io::Error> {
    let local_config_path = std::env::current_dir()?.join("simatomic.config");
    if local_config_path.exists() {
        return Ok(local_config_path);
    }

    let home_path = home::home_dir().ok_or(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        "Home directory not found",
    ))?;
    let config_path = home_path.join(".simatomic").join("config.json");
    Ok(config_path)
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Environment name ("local" or "production"). Empty means production.
    #[serde(default)]
    pub environment: String,

    /// API key for the SimAtomic platform. Empty when not yet configured.
    #[serde(default)]
    pub api_key: String,
}

impl Config {
    /// Create a Config with the given API key.
    pub fn new(api_key: String, environment: Environment) -> Self {
        Config {
            api_key,
            environment: environment.to_string(),
        }
    }

    /// The environment this configuration points at. Custom environments are
    /// stored as their base URL. Falls back to production when the stored
    /// name is empty or unrecognized.
    pub fn environment(&self) -> Environment {
        self.environment.parse().unwrap_or_default()
    }

    /// Loads configuration from a JSON file at the given path.
    ///
    /// # Errors
    /// Returns an `std::io::Error` if reading from file fails or JSON is invalid.
    pub fn load_from_file(path: &Path) -> Result<Self, std::io::Error> {
        let buf = fs::read(path)?;
        let config: Config = serde_json::from_slice(&buf)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(config)
    }

    /// Saves the configuration to a JSON file at the given path.
    ///
    /// Directories will be created if they don't exist. This method overwrites existing files.
    ///
    /// # Errors
    /// Returns an `std::io::Error` if writing to file fails or serialization fails.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)?;
        Ok(())
    }
}
