//! Configuration loading for the roster server.
//!
//! Settings come from an optional YAML file (`roster-config.yaml` by
//! default, or the path in `ROSTER_CONFIG`), then environment variables
//! override individual fields:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `DATA_DIR` | `storage.data_dir` |
//! | `HOST` | `server.host` |
//! | `PORT` | `server.port` |
//! | `SESSION_SECRET` | `server.session_secret` |

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Config file used when `ROSTER_CONFIG` is not set.
pub const DEFAULT_CONFIG_PATH: &str = "roster-config.yaml";

/// Session secret used when none is configured.
pub const PLACEHOLDER_SECRET: &str = "change-me";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment variable held a value of the wrong shape.
    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidEnv {
        /// The variable name.
        name: &'static str,
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Data directory settings.
    #[serde(default)]
    pub storage: StorageSettings,
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Secret for signing sessions of a front end served alongside the
    /// API.
    #[serde(default = "default_secret")]
    pub session_secret: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_secret: default_secret(),
        }
    }
}

/// Data directory settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageSettings {
    /// Directory holding one JSON file per collection.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    5000
}

fn default_secret() -> String {
    String::from(PLACEHOLDER_SECRET)
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl AppConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Load from the file named by `ROSTER_CONFIG` (or the default path)
    /// if it exists, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file exists but cannot be read or
    /// parsed, or an override has the wrong shape.
    pub fn load() -> Result<Self, ConfigError> {
        let lookup = |name: &str| std::env::var(name).ok();
        let path = lookup("ROSTER_CONFIG").unwrap_or_else(|| String::from(DEFAULT_CONFIG_PATH));
        let path = Path::new(&path);

        let mut config = if path.exists() {
            tracing::info!(path = %path.display(), "Loading config file");
            Self::from_file(path)?
        } else {
            tracing::info!(path = %path.display(), "Config file not found, using defaults");
            Self::default()
        };
        config.apply_env_overrides(lookup)?;
        Ok(config)
    }

    /// Override fields from environment-style variables.
    ///
    /// `lookup` returns the value of a variable, if set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if `PORT` is not a port
    /// number.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup("DATA_DIR") {
            self.storage.data_dir = PathBuf::from(val);
        }
        if let Some(val) = lookup("HOST") {
            self.server.host = val;
        }
        if let Some(val) = lookup("PORT") {
            self.server.port = val.trim().parse().map_err(|e| ConfigError::InvalidEnv {
                name: "PORT",
                value: val.clone(),
                reason: format!("{e}"),
            })?;
        }
        if let Some(val) = lookup("SESSION_SECRET") {
            self.server.session_secret = val;
        }
        Ok(())
    }

    /// Whether the session secret is still the built-in placeholder.
    pub fn uses_placeholder_secret(&self) -> bool {
        self.server.session_secret == PLACEHOLDER_SECRET
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn parse_empty_yaml() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.storage.data_dir, PathBuf::from("data"));
        assert!(config.uses_placeholder_secret());
    }

    #[test]
    fn parse_partial_yaml() {
        let config = AppConfig::parse("server:\n  port: 8088\n").unwrap();
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn parse_rejects_bad_yaml() {
        assert!(matches!(
            AppConfig::parse("server: [1, 2"),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn env_overrides_win() {
        let env: BTreeMap<&str, &str> = [
            ("DATA_DIR", "/var/lib/roster"),
            ("PORT", "8080"),
            ("SESSION_SECRET", "s3cret"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config
            .apply_env_overrides(|name| env.get(name).map(|v| (*v).to_owned()))
            .unwrap();
        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/roster"));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(!config.uses_placeholder_secret());
    }

    #[test]
    fn bad_port_is_reported() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env_overrides(|name| (name == "PORT").then(|| String::from("http")))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { name: "PORT", .. }));
    }

    #[test]
    fn from_file_reads_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster-config.yaml");
        std::fs::write(&path, "storage:\n  data_dir: /srv/roster\n").unwrap();
        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config.storage.data_dir, PathBuf::from("/srv/roster"));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join(DEFAULT_CONFIG_PATH);
        let config = AppConfig::from_file(&path).unwrap();
        assert_eq!(config, AppConfig::default());
    }
}
