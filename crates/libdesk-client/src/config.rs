//! Client configuration.
//!
//! Sources, lowest priority first:
//!
//! 1. built-in defaults
//! 2. TOML file (`~/.libdesk/config.toml` unless a path is given)
//! 3. environment variables, e.g. `LIBDESK__BASE_URL=http://lib:8080/api`
//!
//! Command-line flags are applied on top by the caller.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

pub const ENV_PREFIX: &str = "LIBDESK";
pub const MAX_TIMEOUT_SECS: u64 = 300;
pub const MAX_AUTH_RETRIES: u8 = 3;

/// Keys accepted by [`set_file_value`].
pub const SETTABLE_KEYS: &[&str] = &[
    "base_url",
    "request_timeout_secs",
    "max_auth_retries",
    "profile",
    "credentials_dir",
    "log_level",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ConfigError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<ConfigError> for crate::error::ClientError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// API root; every request path is appended to it.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// How many times a 401 may trigger refresh-and-retry for one request.
    #[serde(default = "default_max_auth_retries")]
    pub max_auth_retries: u8,
    /// Selects the credentials file (`credentials.<profile>.json`).
    #[serde(default = "default_profile")]
    pub profile: String,
    /// Overrides `~/.libdesk` for credential files.
    #[serde(default)]
    pub credentials_dir: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_auth_retries() -> u8 {
    1
}

fn default_profile() -> String {
    "default".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            max_auth_retries: default_max_auth_retries(),
            profile: default_profile(),
            credentials_dir: None,
            log_level: default_log_level(),
        }
    }
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| ConfigError::validation(format!("base_url is not a valid URL: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::validation("base_url must use http or https"));
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::validation(format!(
                "request_timeout_secs must be between 1 and {MAX_TIMEOUT_SECS}"
            )));
        }
        if self.max_auth_retries > MAX_AUTH_RETRIES {
            return Err(ConfigError::validation(format!(
                "max_auth_retries must be <= {MAX_AUTH_RETRIES}"
            )));
        }
        if self.profile.trim().is_empty()
            || self
                .profile
                .contains(|c: char| c == '/' || c == '\\' || c.is_whitespace())
        {
            return Err(ConfigError::validation(
                "profile must be a non-empty name without separators or spaces",
            ));
        }
        let lvl = self.log_level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(ConfigError::validation(format!(
                "log_level must be one of {valid_levels:?}"
            )));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Directory holding credential files.
    pub fn credentials_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.credentials_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_config_dir(),
        }
    }
}

/// `~/.libdesk`
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(".libdesk"))
        .ok_or_else(|| ConfigError::validation("Cannot determine home directory"))
}

/// `~/.libdesk/config.toml`
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    Ok(default_config_dir()?.join("config.toml"))
}

pub mod loader {
    use super::{ClientConfig, ConfigError, ENV_PREFIX, default_config_path};
    use config::{Config, Environment, File, FileFormat};
    use std::path::{Path, PathBuf};

    /// Load configuration from `path` (or the default file) plus `LIBDESK__*`
    /// environment overrides, then validate.
    pub fn load_config(path: Option<&Path>) -> Result<ClientConfig, ConfigError> {
        let file: Option<PathBuf> = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path().ok(),
        };

        let mut builder = Config::builder();
        if let Some(file) = file
            && file.exists()
        {
            builder = builder.add_source(File::from(file).format(FileFormat::Toml));
        }
        // Environment variable overrides, e.g., LIBDESK__REQUEST_TIMEOUT_SECS=5
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| ConfigError::parse(format!("config build error: {e}")))?;
        let merged: ClientConfig = cfg
            .try_deserialize()
            .map_err(|e| ConfigError::parse(format!("config deserialize error: {e}")))?;
        merged.validate()?;
        Ok(merged)
    }
}

/// Set one top-level key in a TOML config file, creating the file if needed.
///
/// The updated file must still produce a valid configuration.
pub fn set_file_value(path: &Path, key: &str, value: &str) -> Result<(), ConfigError> {
    if !SETTABLE_KEYS.contains(&key) {
        return Err(ConfigError::validation(format!(
            "Unknown config key: {key}. Valid keys: {}",
            SETTABLE_KEYS.join(", ")
        )));
    }

    let mut table: toml::Table = if path.exists() {
        let content = fs::read_to_string(path)?;
        content.parse().map_err(|e| ConfigError::parse(format!("{e}")))?
    } else {
        toml::Table::new()
    };

    let parsed = match key {
        "request_timeout_secs" | "max_auth_retries" => value
            .parse::<i64>()
            .map(toml::Value::Integer)
            .map_err(|_| ConfigError::validation(format!("{key} must be an integer")))?,
        _ => toml::Value::String(value.to_string()),
    };
    table.insert(key.to_string(), parsed);

    let candidate: ClientConfig = toml::Value::Table(table.clone())
        .try_into()
        .map_err(|e| ConfigError::parse(format!("{e}")))?;
    candidate.validate()?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(&table).map_err(|e| ConfigError::parse(format!("{e}")))?;
    fs::write(path, content)?;
    Ok(())
}
