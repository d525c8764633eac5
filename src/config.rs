//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub pivot: PivotSettings,

    #[serde(default)]
    pub suggest: SuggestConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Query execution backend
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BackendConfig {
    #[serde(default = "default_backend_url")]
    pub url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Row limit sent with queries that do not set one
    #[serde(default = "default_limit")]
    pub default_limit: u32,
}

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> u64 {
    30_000 // 30 seconds
}

fn default_max_retries() -> u32 {
    2
}

fn default_limit() -> u32 {
    1000
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: default_backend_url(),
            request_timeout_ms: default_request_timeout(),
            max_retries: default_max_retries(),
            default_limit: default_limit(),
        }
    }
}

/// Pivot defaults
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct PivotSettings {
    /// Date pattern for pivoted headers, e.g. `MMM yyyy`
    pub header_format: Option<String>,
}

/// Chart suggestion settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SuggestConfig {
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

fn default_max_suggestions() -> usize {
    5
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self {
            max_suggestions: default_max_suggestions(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load an explicit file, or fall back to the default locations
    ///
    /// An explicit path that fails to load is an error; the default locations
    /// are best effort.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_with_env(path),
            None => Ok(Self::load_default()),
        }
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("quarry").join("config.toml")),
            Some(PathBuf::from("/etc/quarry/config.toml")),
            Some(PathBuf::from("./quarry.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Backend overrides
        if let Some(url) = lookup("QUARRY_BACKEND_URL") {
            self.backend.url = url;
        }
        if let Some(timeout) = lookup("QUARRY_BACKEND_TIMEOUT_MS") {
            match timeout.parse() {
                Ok(ms) => self.backend.request_timeout_ms = ms,
                Err(_) => tracing::warn!(value = %timeout, "Ignoring invalid QUARRY_BACKEND_TIMEOUT_MS"),
            }
        }

        // Logging overrides
        if let Some(level) = lookup("QUARRY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("QUARRY_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Quarry Configuration
#
# Environment variables override these settings:
# - QUARRY_BACKEND_URL
# - QUARRY_BACKEND_TIMEOUT_MS
# - QUARRY_LOG_LEVEL
# - QUARRY_LOG_FORMAT

[backend]
# Query execution service
url = "http://localhost:8000"

# Request timeout (ms)
request_timeout_ms = 30000

# Retries on connection failures and rate limiting
max_retries = 2

# Row limit for queries that do not set one
default_limit = 1000

[pivot]
# Date pattern for pivoted column headers that look like dates
# header_format = "MMM yyyy"

[suggest]
# Number of chart suggestions to show
max_suggestions = 5

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.backend.url, "http://localhost:8000");
        assert_eq!(config.backend.request_timeout_ms, 30_000);
        assert_eq!(config.backend.max_retries, 2);
        assert_eq!(config.backend.default_limit, 1000);
        assert_eq!(config.pivot.header_format, None);
        assert_eq!(config.suggest.max_suggestions, 5);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_matches_defaults() {
        let parsed: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[backend]\nurl = \"http://warehouse:9000\"\n\n[pivot]\nheader_format = \"MMM yyyy\""
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.backend.url, "http://warehouse:9000");
        assert_eq!(config.backend.max_retries, 2);
        assert_eq!(config.pivot.header_format.as_deref(), Some("MMM yyyy"));
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_load_errors() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[backend\nurl = ").unwrap();
        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));

        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));
        assert!(Config::resolve(Some(&missing)).is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("QUARRY_BACKEND_URL", "http://override:1234"),
            ("QUARRY_BACKEND_TIMEOUT_MS", "not-a-number"),
            ("QUARRY_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.backend.url, "http://override:1234");
        assert_eq!(config.backend.request_timeout_ms, 30_000);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }
}
