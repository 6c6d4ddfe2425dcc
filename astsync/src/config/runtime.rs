// RUNTIME PREFERENCES (User Experience)
// Limits that bound resource use live in compile_time; nothing here can raise them.

use crate::logging::events::LogLevel;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentPreferences {
    /// Re-check coverage, ownership and cursor order after every successful traversal
    pub verify_after_alignment: bool,

    /// Emit a debug event for every claimed token (very noisy)
    pub trace_claims: bool,

    /// Include the per-token link table in JSON reports
    pub include_token_table: bool,
}

impl Default for AlignmentPreferences {
    fn default() -> Self {
        Self {
            verify_after_alignment: env_flag(env_vars::ALIGNMENT_VERIFY, true),
            trace_claims: env_flag(env_vars::ALIGNMENT_TRACE_CLAIMS, false),
            include_token_table: env_flag(env_vars::ALIGNMENT_TOKEN_TABLE, true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchPreferences {
    /// Process directories on worker threads unless told otherwise
    pub parallel_by_default: bool,

    /// Print a progress line per processed chunk
    pub progress_reporting: bool,

    /// Extension that marks a file as an alignment unit
    pub unit_extension: String,
}

impl Default for BatchPreferences {
    fn default() -> Self {
        Self {
            parallel_by_default: env_flag(env_vars::BATCH_PARALLEL, true),
            progress_reporting: env_flag(env_vars::BATCH_PROGRESS, true),
            unit_extension: env::var(env_vars::BATCH_UNIT_EXTENSION)
                .unwrap_or_else(|_| "json".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging
    pub use_structured_logging: bool,

    /// Whether to enable console output
    pub enable_console_logging: bool,

    /// Minimum level that reaches the logger
    pub min_log_level: LogLevel,

    /// Whether to include timing metrics in logs
    pub log_performance_events: bool,

    /// Whether to enable cargo-style error reporting
    pub enable_cargo_style_output: bool,

    /// Whether to include file context in log messages
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_flag(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_flag(env_vars::LOGGING_ENABLE_CONSOLE, false),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            log_performance_events: env_flag(env_vars::LOGGING_LOG_PERFORMANCE, true),
            enable_cargo_style_output: env_flag(env_vars::LOGGING_CARGO_STYLE, true),
            include_file_context: env_flag(env_vars::LOGGING_INCLUDE_FILE_CONTEXT, true),
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub alignment: AlignmentPreferences,
    pub batch: BatchPreferences,
    pub logging: LoggingPreferences,
}

#[derive(Debug, thiserror::Error)]
pub enum RuntimeConfigError {
    #[error("Failed to read runtime config {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid runtime config {path}: {message}")]
    Parse { path: String, message: String },
}

impl RuntimeConfig {
    /// Parse preferences from TOML; missing sections fall back to env-derived defaults
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, RuntimeConfigError> {
        toml::from_str(content).map_err(|e| RuntimeConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, RuntimeConfigError> {
        let origin = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| RuntimeConfigError::Io {
            path: origin.clone(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content, &origin)
    }

    /// Load from `ASTSYNC_RUNTIME_CONFIG` when set, otherwise from the environment alone
    pub fn load() -> Result<Self, RuntimeConfigError> {
        match env::var(env_vars::RUNTIME_CONFIG_PATH) {
            Ok(path) => Self::from_file(Path::new(&path)),
            Err(_) => Ok(Self::default()),
        }
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    pub const RUNTIME_CONFIG_PATH: &str = "ASTSYNC_RUNTIME_CONFIG";

    // Alignment
    pub const ALIGNMENT_VERIFY: &str = "ASTSYNC_ALIGNMENT_VERIFY";
    pub const ALIGNMENT_TRACE_CLAIMS: &str = "ASTSYNC_ALIGNMENT_TRACE_CLAIMS";
    pub const ALIGNMENT_TOKEN_TABLE: &str = "ASTSYNC_ALIGNMENT_TOKEN_TABLE";

    // Batch
    pub const BATCH_PARALLEL: &str = "ASTSYNC_BATCH_PARALLEL";
    pub const BATCH_PROGRESS: &str = "ASTSYNC_BATCH_PROGRESS";
    pub const BATCH_UNIT_EXTENSION: &str = "ASTSYNC_BATCH_UNIT_EXTENSION";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "ASTSYNC_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "ASTSYNC_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "ASTSYNC_LOGGING_MIN_LEVEL";
    pub const LOGGING_LOG_PERFORMANCE: &str = "ASTSYNC_LOGGING_LOG_PERFORMANCE";
    pub const LOGGING_CARGO_STYLE: &str = "ASTSYNC_LOGGING_CARGO_STYLE";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "ASTSYNC_LOGGING_INCLUDE_FILE_CONTEXT";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(parse_log_level("error"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("ERROR"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("0"), Some(LogLevel::Error));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("1"), Some(LogLevel::Warning));
        assert_eq!(parse_log_level("info"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("debug"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("3"), Some(LogLevel::Debug));
        assert_eq!(parse_log_level("verbose"), None);
    }

    #[test]
    fn test_partial_toml_keeps_other_sections() {
        let config = RuntimeConfig::from_toml_str(
            "[alignment]\nverify_after_alignment = false\n\n[batch]\nunit_extension = \"unit\"\n",
            "inline",
        )
        .unwrap();
        assert!(!config.alignment.verify_after_alignment);
        assert_eq!(config.batch.unit_extension, "unit");
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = RuntimeConfig::from_toml_str("[alignment\n", "broken.toml").unwrap_err();
        assert!(matches!(err, RuntimeConfigError::Parse { ref path, .. } if path == "broken.toml"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = RuntimeConfig::from_file(Path::new("/nonexistent/astsync.toml")).unwrap_err();
        assert!(matches!(err, RuntimeConfigError::Io { .. }));
    }
}
