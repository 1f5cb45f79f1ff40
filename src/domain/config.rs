//! Configuration model.
//!
//! Loaded from `config.toml` in the data directory; every field has a
//! default so a missing or partial file is fine.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How a read treats lines that fail to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadPolicy {
    /// Skip malformed lines and keep every well-formed one.
    #[default]
    SkipMalformed,
    /// Any malformed line makes the whole read come back empty.
    Strict,
}

impl std::str::FromStr for ReadPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "skip_malformed" | "skip" => Ok(Self::SkipMalformed),
            "strict" => Ok(Self::Strict),
            _ => Err(format!("Unknown read policy: {s}. Use: skip_malformed, strict")),
        }
    }
}

/// Chat log settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// File name of the JSONL log inside the data directory.
    #[serde(default = "default_log_file_name")]
    pub file_name: String,

    /// Corrupt-line policy for reads.
    #[serde(default)]
    pub read_policy: ReadPolicy,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file_name: default_log_file_name(),
            read_policy: ReadPolicy::default(),
        }
    }
}

fn default_log_file_name() -> String {
    "jemai_chat_log.jsonl".to_string()
}

/// Export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Format used when none is given on the command line.
    #[serde(default = "default_export_format")]
    pub default_format: String,

    /// Directory suggested for exports (defaults to the data directory).
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            default_format: default_export_format(),
            dir: None,
        }
    }
}

fn default_export_format() -> String {
    "md".to_string()
}

/// Log watcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Milliseconds to wait after a change so a burst of appends renders once.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

const fn default_debounce_ms() -> u64 {
    250
}

/// Clipboard heuristic settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipboardConfig {
    /// Text must be longer than this many characters.
    #[serde(default = "default_min_length")]
    pub min_length: usize,

    /// Any of these substrings marks text as an AI reply.
    #[serde(default = "default_markers")]
    pub markers: Vec<String>,

    /// Seconds between clipboard reads in follow mode.
    #[serde(default = "default_clipboard_interval")]
    pub interval_secs: u64,
}

impl Default for ClipboardConfig {
    fn default() -> Self {
        Self {
            min_length: default_min_length(),
            markers: default_markers(),
            interval_secs: default_clipboard_interval(),
        }
    }
}

const fn default_clipboard_interval() -> u64 {
    10
}

const fn default_min_length() -> usize {
    24
}

fn default_markers() -> Vec<String> {
    vec!["OpenAI".to_string(), "JEMAI".to_string()]
}

/// Path configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathConfig {
    /// Base data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Complete application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub watch: WatchConfig,

    #[serde(default)]
    pub clipboard: ClipboardConfig,

    #[serde(default)]
    pub paths: PathConfig,
}

impl AppConfig {
    /// Get the data directory, using default if not configured.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.paths
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir().map_or_else(
            || {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".jemai")
            },
            |dir| dir.join("jemai"),
        )
    }

    /// Path of the JSONL chat log.
    #[must_use]
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join(&self.log.file_name)
    }

    /// Get the config file path.
    #[must_use]
    pub fn config_file_path(&self) -> PathBuf {
        self.data_dir().join("config.toml")
    }

    /// Directory suggested for exports.
    #[must_use]
    pub fn exports_dir(&self) -> PathBuf {
        self.export.dir.clone().unwrap_or_else(|| self.data_dir())
    }

    /// Where `watch` writes the rendered sidebar.
    #[must_use]
    pub fn view_path(&self) -> PathBuf {
        self.data_dir().join("jemai_chat_view.html")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.log.file_name, "jemai_chat_log.jsonl");
        assert_eq!(config.log.read_policy, ReadPolicy::SkipMalformed);
        assert_eq!(config.watch.debounce_ms, 250);
        assert_eq!(config.clipboard.interval_secs, 10);
        assert_eq!(config.clipboard.min_length, 24);
        assert_eq!(config.export.default_format, "md");
    }

    #[test]
    fn test_paths_follow_data_dir() {
        let config = AppConfig {
            paths: PathConfig {
                data_dir: Some(PathBuf::from("/srv/jemai")),
            },
            ..Default::default()
        };
        assert_eq!(
            config.log_path(),
            PathBuf::from("/srv/jemai/jemai_chat_log.jsonl")
        );
        assert_eq!(config.exports_dir(), PathBuf::from("/srv/jemai"));
    }

    #[test]
    fn test_read_policy_from_str() {
        assert_eq!("strict".parse::<ReadPolicy>(), Ok(ReadPolicy::Strict));
        assert_eq!(
            "skip-malformed".parse::<ReadPolicy>(),
            Ok(ReadPolicy::SkipMalformed)
        );
        assert!("lenient".parse::<ReadPolicy>().is_err());
    }
}
