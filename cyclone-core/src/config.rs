use anyhow::{Context, Result, anyhow};
use chrono::FixedOffset;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

use crate::{
    display::TemperatureUnit,
    error::ConfigError,
    model::{Coordinates, Location},
};

/// Environment variable that takes precedence over the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Philippine Standard Time.
const DEFAULT_UTC_OFFSET_HOURS: i32 = 8;

/// Credentials and endpoint for the weather provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    /// Alternate API host, e.g. a proxy or a local mock.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// unit = "celsius"
/// utc_offset_hours = 8
///
/// [openweather]
/// api_key = "..."
/// # base_url = "https://api.openweathermap.org"
///
/// [default_location]
/// name = "Manolo Fortich"
/// country = "PH"
/// coordinates = { lat = 8.3675, lon = 124.8644 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub unit: TemperatureUnit,
    /// Whole hours east of UTC used for local hours and day labels.
    pub utc_offset_hours: i32,
    pub openweather: Option<ProviderConfig>,
    /// Used when no city or coordinates are given.
    pub default_location: Location,
    /// Key taken from [`API_KEY_ENV`]; read-only, never written back.
    #[serde(skip)]
    env_api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            unit: TemperatureUnit::default(),
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            openweather: None,
            default_location: Location {
                name: "Manolo Fortich".to_string(),
                country: "PH".to_string(),
                coordinates: Coordinates { lat: 8.3675, lon: 124.8644 },
            },
            env_api_key: None,
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    /// [`API_KEY_ENV`] overrides the stored key.
    pub fn load() -> Result<Self> {
        let cfg = Self::load_from(&Self::config_file_path()?)?;
        Ok(cfg.with_env_overrides())
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        // reject a bad offset at load time rather than on first fetch
        cfg.utc_offset()?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("ph", "cyclone", "cyclone")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    fn with_env_overrides(self) -> Self {
        self.with_api_key_override(env::var(API_KEY_ENV).ok())
    }

    /// Use `key` ahead of the stored one without persisting it.
    pub fn with_api_key_override(mut self, key: Option<String>) -> Self {
        self.env_api_key = key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty());
        self
    }

    /// Store `api_key`, keeping any configured base URL.
    pub fn set_api_key(&mut self, api_key: String) {
        self.openweather.get_or_insert_with(ProviderConfig::default).api_key = api_key;
    }

    /// Returns the API key, or an error telling the user how to set one.
    pub fn api_key(&self) -> Result<String> {
        self.env_api_key
            .clone()
            .or_else(|| self.stored_api_key().map(str::to_string))
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: run `cyclone configure` or set {API_KEY_ENV}."
                )
            })
    }

    /// The key from the config file, ignoring [`API_KEY_ENV`].
    pub fn stored_api_key(&self) -> Option<&str> {
        self.openweather.as_ref().map(|p| p.api_key.as_str()).filter(|k| !k.is_empty())
    }

    pub fn base_url(&self) -> Option<&str> {
        self.openweather.as_ref().and_then(|p| p.base_url.as_deref())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_ok()
    }

    /// The configured offset as a chrono timezone.
    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        if !(-23..=23).contains(&self.utc_offset_hours) {
            return Err(ConfigError::InvalidUtcOffset(self.utc_offset_hours));
        }
        FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .ok_or(ConfigError::InvalidUtcOffset(self.utc_offset_hours))
    }
}
