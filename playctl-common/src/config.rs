//! Configuration file resolution and loading
//!
//! Config file location priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`PLAYCTL_CONFIG`)
//! 3. Platform config directory (`<config_dir>/playctl/playctl.toml`)
//! 4. Built-in defaults (no file)
//!
//! A file that cannot be found is not an error: a warning is logged and
//! the built-in defaults are used. A file that exists but does not parse
//! is an error.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "PLAYCTL_CONFIG";

/// Config file name inside the platform config directory
pub const CONFIG_FILE_NAME: &str = "playctl.toml";

/// Where the config file path came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine,
    Environment,
    PlatformDefault,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::CommandLine => write!(f, "command line"),
            ConfigSource::Environment => write!(f, "environment"),
            ConfigSource::PlatformDefault => write!(f, "platform default"),
        }
    }
}

/// Logging configuration (`[logging]` table)
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Pick the config file path following the priority order above
///
/// Returns `None` when no candidate exists at any level.
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<(PathBuf, ConfigSource)> {
    if let Some(path) = cli_arg {
        return Some((path.to_path_buf(), ConfigSource::CommandLine));
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some((PathBuf::from(path), ConfigSource::Environment));
        }
    }

    default_config_path().map(|path| (path, ConfigSource::PlatformDefault))
}

/// Platform config file location, if the platform has a config directory
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("playctl").join(CONFIG_FILE_NAME))
}

/// Resolve and load a TOML config, falling back to `T::default()`
///
/// The platform default location is silently skipped when absent; an
/// explicitly named file that is missing logs a warning.
pub fn load_config<T>(cli_arg: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match resolve_config_path(cli_arg) {
        Some((path, source)) => {
            if !path.exists() {
                if source != ConfigSource::PlatformDefault {
                    warn!(
                        "Config file {} (from {}) not found, using defaults",
                        path.display(),
                        source
                    );
                }
                return Ok(T::default());
            }
            info!("Loading config from {} ({})", path.display(), source);
            load_toml_file(&path)
        }
        None => Ok(T::default()),
    }
}

/// Parse a TOML file into `T`
pub fn load_toml_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let parsed = toml::from_str(&content)?;
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logging_defaults() {
        let logging = LoggingConfig::default();
        assert_eq!(logging.level, "info");

        let parsed: LoggingConfig = toml::from_str("").unwrap();
        assert_eq!(parsed.level, "info");
    }

    #[test]
    fn test_cli_path_wins() {
        let (path, source) = resolve_config_path(Some(Path::new("/tmp/explicit.toml"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/explicit.toml"));
        assert_eq!(source, ConfigSource::CommandLine);
    }

    #[test]
    fn test_default_path_file_name() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("playctl/playctl.toml"));
        }
    }
}
