//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\indycar-etl\config.toml
//! - macOS: ~/Library/Application Support/indycar-etl/config.toml
//! - Linux: ~/.config/indycar-etl/config.toml
//!
//! Every field has a default, so a partial (or missing) file is fine.
//! Credentials and endpoints can also come from the environment via the
//! CLI (`SPORTRADAR_API_KEY`, `SPORTRADAR_BASE_URL`,
//! `MONGODB_CONNECTION_STRING`), which takes precedence over the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default Sportradar IndyCar endpoint (trial tier).
pub const DEFAULT_BASE_URL: &str = "https://api.sportradar.com/indycar/trial/v2/en";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote API settings
    pub api: ApiConfig,

    /// Retry policy for every remote GET
    pub fetch: FetchConfig,

    /// Extraction stage settings
    pub extraction: ExtractionConfig,

    /// Document store settings
    pub store: StoreConfig,
}

/// Sportradar API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL, without trailing slash
    pub base_url: String,

    /// API key sent as `x-api-key`
    pub api_key: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

/// Retry settings for the fetch primitive
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Attempts per URL
    pub retry_count: u32,

    /// Base delay between attempts, in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            retry_count: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl FetchConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Extraction stage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Directory holding seasons.json, season_{year}.json and drivers.json
    pub data_dir: PathBuf,

    /// First season year to keep (inclusive)
    pub min_year: u16,

    /// Last season year to keep (inclusive)
    pub max_year: u16,

    /// Pause after each race-detail fetch, in milliseconds
    pub race_pause_ms: u64,

    /// Pause between seasons, in milliseconds
    pub season_pause_ms: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("Data/extracted"),
            min_year: 2017,
            max_year: 2025,
            race_pause_ms: 1000,
            season_pause_ms: 2000,
        }
    }
}

impl ExtractionConfig {
    pub fn race_pause(&self) -> Duration {
        Duration::from_millis(self.race_pause_ms)
    }

    pub fn season_pause(&self) -> Duration {
        Duration::from_millis(self.season_pause_ms)
    }
}

/// Document store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// MongoDB connection string
    pub connection_string: String,

    /// Database holding the seasons/races/drivers collections
    pub database: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            connection_string: "mongodb://localhost:27017".to_string(),
            database: "indycar".to_string(),
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("indycar-etl"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location.
///
/// Returns default config if the file doesn't exist or can't be parsed.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        tracing::warn!("Could not determine config directory, using defaults");
        return Config::default();
    };
    load_from(&path)
}

/// Load configuration from an explicit path.
///
/// Logs problems but doesn't fail - we always return a usable config.
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::info!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

impl Config {
    /// Check invariants that serde defaults can't express.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.extraction.min_year > self.extraction.max_year {
            return Err(crate::error::Error::config(format!(
                "min_year {} is after max_year {}",
                self.extraction.min_year, self.extraction.max_year
            )));
        }
        if self.fetch.retry_count == 0 {
            return Err(crate::error::Error::config("retry_count must be at least 1"));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
