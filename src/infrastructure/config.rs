//! Configuration file management.
//!
//! Handles loading and creating TOML configuration files.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{AppConfig, AppError, Result};

/// Default configuration file content.
const DEFAULT_CONFIG: &str = r#"# JEMAI chat log configuration
# Auto-generated - edit as needed

[log]
# File name of the chat log inside the data directory
file_name = "jemai_chat_log.jsonl"

# What a read does with a line that fails to parse:
#   "skip_malformed" keeps every other line, "strict" shows an empty log
read_policy = "skip_malformed"

[export]
# txt, md or jsonl
default_format = "md"

# Directory suggested for exports (defaults to the data directory)
# dir = "/custom/exports"

[watch]
# Milliseconds to wait after a change before re-rendering, so a burst of
# appends produces a single render
debounce_ms = 250

[clipboard]
# Clipboard text longer than this and containing a marker looks like an AI reply
min_length = 24
markers = ["OpenAI", "JEMAI"]

# Seconds between clipboard reads for `check-clipboard --follow`
interval_secs = 10

[paths]
# Custom data directory (optional)
# data_dir = "/custom/path"
"#;

/// Load configuration for a data directory, falling back to defaults when
/// no config file exists. The data directory itself always wins over any
/// `paths.data_dir` found in the file.
///
/// # Errors
/// Returns error if file exists but cannot be read or parsed.
pub fn load_config(data_dir: Option<&Path>) -> Result<AppConfig> {
    let dir = data_dir.map_or_else(AppConfig::default_data_dir, Path::to_path_buf);
    let config_path = dir.join("config.toml");

    let mut config = if config_path.exists() {
        load_config_from_file(&config_path)?
    } else {
        tracing::debug!(path = %config_path.display(), "No config file, using defaults");
        AppConfig::default()
    };

    if data_dir.is_some() || config.paths.data_dir.is_none() {
        config.paths.data_dir = Some(dir);
    }

    Ok(config)
}

/// Load configuration from a specific file.
///
/// # Errors
/// Returns error if file cannot be read or parsed.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::io(format!("Failed to read config file: {}", path.display()), e)
    })?;

    toml::from_str(&content).map_err(|e| AppError::Config {
        message: format!("Failed to parse config file: {e}"),
    })
}

/// Create the commented default configuration file if it doesn't exist.
/// Returns the config path and whether it was created.
///
/// # Errors
/// Returns error if file cannot be created.
pub fn ensure_config_exists(data_dir: &Path) -> Result<(PathBuf, bool)> {
    let config_path = data_dir.join("config.toml");

    if config_path.exists() {
        return Ok((config_path, false));
    }

    fs::create_dir_all(data_dir)
        .map_err(|e| AppError::io("Failed to create config directory", e))?;
    fs::write(&config_path, DEFAULT_CONFIG)
        .map_err(|e| AppError::io("Failed to create default config", e))?;

    tracing::info!(path = %config_path.display(), "Created default configuration");

    Ok((config_path, true))
}
