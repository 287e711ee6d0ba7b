//! Configuration schema definitions.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use davinci_framework::{DEFAULT_PAGINATION_TIMEOUT_MS, DEFAULT_PREFIX, Settings};
use davinci_media::MediaConfig;
use davinci_storage::StorageConfig;
use serde::{Deserialize, Serialize};

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DavinciConfig {
    /// Command behaviour.
    #[serde(default)]
    pub bot: BotSettings,

    /// Bookmark persistence.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Image fetching.
    #[serde(default)]
    pub media: MediaConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

// =============================================================================
// Bot
// =============================================================================

/// Settings handed to every handler through the runtime context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotSettings {
    /// Text command prefix.
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Idle time before a pagination session ends, in milliseconds.
    #[serde(default = "default_pagination_timeout_ms")]
    pub pagination_timeout_ms: u64,

    /// Commands per `help` page.
    #[serde(default = "default_help_page_size")]
    pub help_page_size: usize,

    /// Bookmarks per list/search page.
    #[serde(default = "default_bookmark_page_size")]
    pub bookmark_page_size: usize,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            pagination_timeout_ms: default_pagination_timeout_ms(),
            help_page_size: default_help_page_size(),
            bookmark_page_size: default_bookmark_page_size(),
        }
    }
}

impl BotSettings {
    pub fn to_settings(&self) -> Settings {
        Settings {
            prefix: self.prefix.clone(),
            pagination_timeout: Duration::from_millis(self.pagination_timeout_ms),
            help_page_size: self.help_page_size,
            bookmark_page_size: self.bookmark_page_size,
        }
    }
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_pagination_timeout_ms() -> u64 {
    DEFAULT_PAGINATION_TIMEOUT_MS
}

fn default_help_page_size() -> usize {
    5
}

fn default_bookmark_page_size() -> usize {
    4
}

// =============================================================================
// Logging
// =============================================================================

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Line format of the fmt layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature.
    #[cfg(feature = "json-log")]
    Json,
}

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// How often the log file rolls over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Base level. `RUST_LOG` takes precedence when set.
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,

    #[serde(default)]
    pub output: LogOutput,

    #[serde(default)]
    pub span_events: SpanEventConfig,

    #[serde(default)]
    pub thread_ids: bool,

    /// Include source file and line.
    #[serde(default)]
    pub file_location: bool,

    /// Log file for [`LogOutput::File`].
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    #[serde(default)]
    pub rotation: LogRotation,

    /// Rolled files kept on disk. Zero keeps all of them.
    #[serde(default = "default_max_files")]
    pub max_files: usize,

    /// Per-target levels, e.g. `davinci_framework = "debug"`.
    #[serde(default)]
    pub filters: BTreeMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            span_events: SpanEventConfig::default(),
            thread_ids: false,
            file_location: false,
            file_path: None,
            rotation: LogRotation::default(),
            max_files: default_max_files(),
            filters: BTreeMap::new(),
        }
    }
}

fn default_max_files() -> usize {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_settings_convert() {
        let settings = BotSettings {
            prefix: "?".to_string(),
            pagination_timeout_ms: 1500,
            ..Default::default()
        }
        .to_settings();

        assert_eq!(settings.prefix, "?");
        assert_eq!(settings.pagination_timeout, Duration::from_millis(1500));
        assert_eq!(settings.help_page_size, 5);
        assert_eq!(settings.bookmark_page_size, 4);
    }

    #[test]
    fn test_defaults_match_framework() {
        assert_eq!(BotSettings::default().to_settings(), Settings::default());
    }
}
