use serde::{Deserialize, Serialize};

use crate::executor::BatchFailurePolicy;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PreloadConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub preload: PreloadSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_enabled")]
    pub enabled: bool,

    /// If true, log to stderr.
    #[serde(default = "default_logging_console")]
    pub console: bool,

    /// If true, log to a file under `directory` (or OS temp dir if unset).
    #[serde(default)]
    pub file: bool,

    /// EnvFilter string, e.g. "info" or "preload_core=debug".
    #[serde(default = "default_logging_level")]
    pub level: String,

    /// Optional directory for log files. If empty or unset, uses OS temp dir.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_logging_enabled() -> bool {
    true
}

fn default_logging_console() -> bool {
    true
}

fn default_logging_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_logging_enabled(),
            console: default_logging_console(),
            file: false,
            level: default_logging_level(),
            directory: None,
        }
    }
}

/// Which matched components a changed query string invalidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum QueryScope {
    /// Only the innermost component reads the query; outer ones may be skipped.
    #[default]
    Innermost,
    /// Any component may read the query; a query change reloads everything.
    All,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreloadSettings {
    /// Client-side: skip outer components whose identity and params are unchanged.
    #[serde(default = "default_skip_unchanged")]
    pub skip_unchanged: bool,

    #[serde(default)]
    pub query_scope: QueryScope,

    #[serde(default)]
    pub batch_failure: BatchFailurePolicy,

    /// Upper bound on client redirects followed by a single navigation request.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

fn default_skip_unchanged() -> bool {
    true
}

fn default_max_redirects() -> usize {
    10
}

impl Default for PreloadSettings {
    fn default() -> Self {
        Self {
            skip_unchanged: default_skip_unchanged(),
            query_scope: QueryScope::default(),
            batch_failure: BatchFailurePolicy::default(),
            max_redirects: default_max_redirects(),
        }
    }
}
