use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

/// Credentials and endpoint for the third-party geocoding service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodingConfig {
    pub api_key: String,

    /// Overrides the default OpenWeather direct-geocoding endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Base URL of the server exposing `/weather` and `/chat`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_url: Option<String>,

    /// Example TOML:
    /// [geocoding]
    /// api_key = "..."
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geocoding: Option<GeocodingConfig>,
}

impl Config {
    pub fn backend_url(&self) -> &str {
        self.backend_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BACKEND_URL)
    }

    pub fn set_backend_url(&mut self, url: impl Into<String>) {
        self.backend_url = Some(url.into());
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("Invalid configuration TOML")
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "geoweather", "geoweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set or replace the geocoding API key, keeping any custom endpoint.
    pub fn upsert_geocoding_api_key(&mut self, api_key: String) {
        match self.geocoding.as_mut() {
            Some(geocoding) => geocoding.api_key = api_key,
            None => {
                self.geocoding = Some(GeocodingConfig {
                    api_key,
                    endpoint: None,
                })
            }
        }
    }

    pub fn geocoding_api_key(&self) -> Option<&str> {
        self.geocoding
            .as_ref()
            .map(|cfg| cfg.api_key.as_str())
            .filter(|key| !key.is_empty())
    }

    pub fn geocoding_endpoint(&self) -> Option<&str> {
        self.geocoding.as_ref().and_then(|cfg| cfg.endpoint.as_deref())
    }

    pub fn is_geocoding_configured(&self) -> bool {
        self.geocoding_api_key().is_some()
    }
}
