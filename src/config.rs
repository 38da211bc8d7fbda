//! Application-level configuration loading.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "RIO_LINKS_CONFIG_PATH";

const DEFAULT_EXPORT_PREFIX: &str = "rio-links";
const DEFAULT_DATA_PATH: &str = "data/rio-links_v2.json";
const DEFAULT_AUTO_ADVANCE_MS: u64 = 400;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Prefix of exported file names.
    pub export_prefix: String,
    /// Location of the local score file.
    pub data_path: PathBuf,
    /// Pause before moving on once everybody scored the current hole.
    pub auto_advance_delay: Duration,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => Self::parse(&contents).unwrap_or_else(|err| {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to parse config; falling back to defaults"
                );
                Self::default()
            }),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    fn parse(contents: &str) -> serde_json::Result<Self> {
        let raw = serde_json::from_str::<RawConfig>(contents)?;
        let config: Self = raw.into();
        info!(
            data_path = %config.data_path.display(),
            export_prefix = %config.export_prefix,
            auto_advance_ms = config.auto_advance_delay.as_millis() as u64,
            "loaded config"
        );
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            export_prefix: DEFAULT_EXPORT_PREFIX.to_string(),
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            auto_advance_delay: Duration::from_millis(DEFAULT_AUTO_ADVANCE_MS),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    export_prefix: Option<String>,
    #[serde(default)]
    data_path: Option<PathBuf>,
    #[serde(default)]
    auto_advance_ms: Option<u64>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            export_prefix: value
                .export_prefix
                .filter(|prefix| !prefix.trim().is_empty())
                .unwrap_or(defaults.export_prefix),
            data_path: value.data_path.unwrap_or(defaults.data_path),
            auto_advance_delay: value
                .auto_advance_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.auto_advance_delay),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let config = AppConfig::parse(r#"{ "auto_advance_ms": 0 }"#).unwrap();
        assert_eq!(config.auto_advance_delay, Duration::ZERO);
        assert_eq!(config.export_prefix, "rio-links");
        assert_eq!(config.data_path, PathBuf::from("data/rio-links_v2.json"));
    }

    #[test]
    fn blank_prefix_falls_back_to_default() {
        let config =
            AppConfig::parse(r#"{ "export_prefix": "  ", "data_path": "/tmp/s.json" }"#).unwrap();
        assert_eq!(config.export_prefix, "rio-links");
        assert_eq!(config.data_path, PathBuf::from("/tmp/s.json"));
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(AppConfig::parse("[1, 2").is_err());
    }
}
