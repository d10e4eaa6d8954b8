//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\now-playing\config.toml
//! - macOS: ~/Library/Application Support/now-playing/config.toml
//! - Linux: ~/.config/now-playing/config.toml
//!
//! Every setting has a default, so the file is optional and may be partial.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Contact sent to MusicBrainz in the User-Agent.
pub const DEFAULT_CONTACT: &str = "now-playing@now-playing.com";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Player network settings
    pub network: NetworkConfig,

    /// Artwork lookup settings
    pub artwork: ArtworkConfig,

    /// Log output settings
    pub logging: LoggingConfig,
}

/// Player network settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// How long shutdown waits for a graceful disconnect
    pub shutdown_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_secs: 5,
        }
    }
}

impl NetworkConfig {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}

/// Artwork lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtworkConfig {
    /// Release-group type the remote search is restricted to.
    /// Empty searches all release types.
    pub release_type: String,

    /// MusicBrainz web service root
    pub musicbrainz_url: String,

    /// Cover Art Archive root
    pub coverart_url: String,

    /// Contact address sent in the MusicBrainz User-Agent
    pub contact: String,

    /// Marker inserted before the artwork file extension to request the
    /// high-resolution image from a player
    pub high_res_marker: String,
}

impl Default for ArtworkConfig {
    fn default() -> Self {
        Self {
            release_type: "Single".to_string(),
            musicbrainz_url: crate::enrichment::musicbrainz::DEFAULT_BASE_URL.to_string(),
            coverart_url: crate::enrichment::coverart::DEFAULT_BASE_URL.to_string(),
            contact: DEFAULT_CONTACT.to_string(),
            high_res_marker: "_m".to_string(),
        }
    }
}

impl ArtworkConfig {
    /// Release type filter, `None` when unrestricted.
    pub fn release_type_filter(&self) -> Option<&str> {
        let kind = self.release_type.trim();
        (!kind.is_empty()).then_some(kind)
    }
}

/// Log output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "now_playing=info".to_string(),
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("now-playing"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Something worth logging about how the config was loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadNote {
    Info(String),
    Warning(String),
}

impl LoadNote {
    pub fn message(&self) -> &str {
        match self {
            Self::Info(message) | Self::Warning(message) => message,
        }
    }
}

/// Load configuration from `path`, or from the default location.
///
/// Returns default config if the file doesn't exist or can't be parsed.
/// Never fails - we always return a usable config. Called before logging
/// is installed, so notes are returned for the caller to emit once it is.
pub fn load(path: Option<&Path>) -> (Config, Vec<LoadNote>) {
    let Some(path) = path.map(Path::to_path_buf).or_else(config_path) else {
        let note = LoadNote::Warning("Could not determine config directory, using defaults".to_string());
        return (Config::default(), vec![note]);
    };

    if !path.exists() {
        let note = LoadNote::Info(format!("No config file found at {:?}, using defaults", path));
        return (Config::default(), vec![note]);
    }

    match read(&path) {
        Ok(config) => (config, vec![LoadNote::Info(format!("Loaded config from {:?}", path))]),
        Err(e) => {
            let note = LoadNote::Warning(format!("{}; using default configuration", e));
            (Config::default(), vec![note])
        }
    }
}

/// Read and parse one config file.
pub fn read(path: &Path) -> Result<Config, ConfigError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
    toml::from_str(&contents).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config file {0}: {1}")]
    Parse(PathBuf, toml::de::Error),
}

// ============================================================================
// Tests
// ============================================================================
