//! Configuration loading
//!
//! Config file resolution priority:
//! 1. Explicit path (command-line argument)
//! 2. `MOODREC_CONFIG` environment variable
//! 3. `<config_dir>/moodrec/config.toml`
//!
//! A missing config file is not an error: a warning is logged and compiled
//! defaults are used. A config file that exists but does not parse is.
//! Individual settings can then be overridden from the environment.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming the config file
pub const ENV_CONFIG_PATH: &str = "MOODREC_CONFIG";
/// Environment override for `spotify.access_token`
pub const ENV_SPOTIFY_TOKEN: &str = "MOODREC_SPOTIFY_TOKEN";
/// Environment override for `model_path`
pub const ENV_MODEL_PATH: &str = "MOODREC_MODEL_PATH";
/// Environment override for `logging.level`
pub const ENV_LOG_LEVEL: &str = "MOODREC_LOG_LEVEL";

/// Public Spotify Web API base URL
pub const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";

/// Number of ranked rows shown per request
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// What feature extraction does when a lookup for one track fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Abort the whole batch on the first failed track
    #[default]
    FailFast,
    /// Drop the failed track and report it alongside the result
    Skip,
}

/// Top-level TOML configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    /// Serialized mood classifier
    pub model_path: Option<PathBuf>,
    /// Ranked rows per page
    pub page_size: usize,
    /// Concurrent upstream lookups during feature extraction
    pub fetch_concurrency: usize,
    pub failure_policy: FailurePolicy,
    /// Text column scored by sentiment analysis
    pub text_column: String,
    pub spotify: SpotifyConfig,
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            page_size: DEFAULT_PAGE_SIZE,
            fetch_concurrency: 4,
            failure_policy: FailurePolicy::FailFast,
            text_column: "track_name".to_string(),
            spotify: SpotifyConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Spotify Web API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifyConfig {
    pub api_base: String,
    /// Bearer token; obtaining it is outside this program
    pub access_token: Option<String>,
    /// Owner of created playlists
    pub user_id: Option<String>,
    /// Market passed to the recommendation endpoint
    pub country: String,
    pub rate_limit_per_second: u32,
    pub playlist_name: String,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            api_base: SPOTIFY_API_URL.to_string(),
            access_token: None,
            user_id: None,
            country: "DE".to_string(),
            rate_limit_per_second: 10,
            playlist_name: "Cool recommendations".to_string(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when RUST_LOG is not set
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Reject settings no component can work with
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::Config("page_size must be at least 1".to_string()));
        }
        if self.fetch_concurrency == 0 {
            return Err(Error::Config(
                "fetch_concurrency must be at least 1".to_string(),
            ));
        }
        if self.spotify.rate_limit_per_second == 0 {
            return Err(Error::Config(
                "spotify.rate_limit_per_second must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply `MOODREC_*` environment overrides
    pub fn apply_env_overrides(&mut self) {
        if let Some(token) = non_empty_env(ENV_SPOTIFY_TOKEN) {
            if self.spotify.access_token.is_some() {
                warn!(
                    "Spotify access token found in config file and {}. Using environment.",
                    ENV_SPOTIFY_TOKEN
                );
            }
            debug!("Spotify access token overridden from {}", ENV_SPOTIFY_TOKEN);
            self.spotify.access_token = Some(token);
        }
        if let Some(path) = non_empty_env(ENV_MODEL_PATH) {
            debug!("Model path overridden from {}", ENV_MODEL_PATH);
            self.model_path = Some(PathBuf::from(path));
        }
        if let Some(level) = non_empty_env(ENV_LOG_LEVEL) {
            self.logging.level = level;
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Platform default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("moodrec").join("config.toml"))
}

/// Resolves which config file to read and produces the effective config
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    explicit_path: Option<PathBuf>,
}

impl ConfigResolver {
    /// Resolver honoring an optional explicit path (highest priority)
    pub fn new(explicit_path: Option<PathBuf>) -> Self {
        Self { explicit_path }
    }

    /// Config file path by priority, whether or not it exists
    pub fn config_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.explicit_path {
            return Some(path.clone());
        }
        if let Some(path) = non_empty_env(ENV_CONFIG_PATH) {
            return Some(PathBuf::from(path));
        }
        default_config_path()
    }

    /// Load, override from environment, and validate
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match self.config_path() {
            Some(path) if path.exists() => {
                debug!("Loading config from {}", path.display());
                load_toml_config(&path)?
            }
            Some(path) => {
                warn!(
                    "Config file {} not found, using compiled defaults",
                    path.display()
                );
                TomlConfig::default()
            }
            None => {
                warn!("Could not determine config directory, using compiled defaults");
                TomlConfig::default()
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }
}
