//! Configuration resolution for the moodrec binary
//!
//! Turns the loaded [`TomlConfig`] plus command-line values into what the
//! pipeline and the Spotify client need.
//!
//! **Priority:** command line → environment → TOML (the environment layer is
//! already applied by `ConfigResolver`).

use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::PipelineConfig;
use crate::sentiment::TextColumn;
use moodrec_common::config::{TomlConfig, ENV_MODEL_PATH, ENV_SPOTIFY_TOKEN};
use moodrec_common::Error;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Pipeline settings from the config file
///
/// # Errors
/// `PipelineError::InvalidInput` for an unknown `text_column`
pub fn pipeline_config(config: &TomlConfig) -> PipelineResult<PipelineConfig> {
    Ok(PipelineConfig {
        text_column: TextColumn::from_name(&config.text_column)?,
        failure_policy: config.failure_policy,
        fetch_concurrency: config.fetch_concurrency,
        page_size: config.page_size,
    })
}

/// Non-empty, non-whitespace
pub fn is_valid_token(token: &str) -> bool {
    !token.trim().is_empty()
}

/// Resolve the Spotify access token
///
/// Warns when both the command line and the configuration supply one.
pub fn resolve_access_token(cli_token: Option<&str>, config: &TomlConfig) -> PipelineResult<String> {
    let cli_token = cli_token.filter(|t| is_valid_token(t));
    let config_token = config
        .spotify
        .access_token
        .as_deref()
        .filter(|t| is_valid_token(t));

    match (cli_token, config_token) {
        (Some(cli), Some(_)) => {
            warn!("Spotify access token found on command line and in configuration. Using command line.");
            Ok(cli.to_string())
        }
        (Some(cli), None) => {
            info!("Spotify access token loaded from command line");
            Ok(cli.to_string())
        }
        (None, Some(token)) => {
            info!("Spotify access token loaded from configuration");
            Ok(token.to_string())
        }
        (None, None) => Err(PipelineError::Common(Error::Config(format!(
            "Spotify access token not configured. Provide one of:\n\
             1. Command line: --token <TOKEN>\n\
             2. Environment: {}=<TOKEN>\n\
             3. TOML config: [spotify] access_token = \"<TOKEN>\"",
            ENV_SPOTIFY_TOKEN
        )))),
    }
}

/// Resolve the mood classifier model path
pub fn resolve_model_path(cli_path: Option<&Path>, config: &TomlConfig) -> PipelineResult<PathBuf> {
    if let Some(path) = cli_path {
        if config.model_path.is_some() {
            warn!("Model path given on command line overrides configured model_path");
        }
        return Ok(path.to_path_buf());
    }

    config.model_path.clone().ok_or_else(|| {
        PipelineError::Common(Error::Config(format!(
            "No mood classifier configured. Pass --model, set {} or add model_path to the config file",
            ENV_MODEL_PATH
        )))
    })
}
