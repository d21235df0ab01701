//! Importer Configuration
//!
//! Two explicit configuration values are built once at startup and handed to
//! constructors; nothing is read from the process environment after that:
//!
//! - [`GuacamoleConfig`] - endpoint, credentials and request defaults for [`GuacamoleClient`]
//! - [`ImporterConfig`] - reconciliation settings for [`ImportService`]
//!
//! [`ImportSettings`] is the layered, all-optional form read from a JSON file
//! and overlaid with environment variables and command-line flags.
//!
//! [`GuacamoleClient`]: crate::remote::GuacamoleClient
//! [`ImportService`]: crate::services::ImportService

use crate::models::{Attributes, DEFAULT_ROOT_NAME};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default HTTP request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const CONFIG_DIR: &str = ".guacamole-import";
const CONFIG_FILE: &str = "config.json";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Connection details for the Guacamole REST API
#[derive(Clone)]
pub struct GuacamoleConfig {
    /// API base URL, e.g. `http://localhost:8080/guacamole/api`
    pub api_url: String,
    pub username: String,
    pub password: String,
    /// Overrides the data source returned by the token endpoint
    pub data_source: Option<String>,
    pub timeout_secs: u64,
    /// `attributes` sent with every created connection
    pub connection_attributes: Attributes,
    /// `attributes` sent with every created group
    pub group_attributes: Attributes,
}

impl GuacamoleConfig {
    pub fn new(
        api_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            username: username.into(),
            password: password.into(),
            data_source: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connection_attributes: default_connection_attributes(),
            group_attributes: default_group_attributes(),
        }
    }

    /// Base URL without trailing slashes
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }
}

impl fmt::Debug for GuacamoleConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuacamoleConfig")
            .field("api_url", &self.api_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("data_source", &self.data_source)
            .field("timeout_secs", &self.timeout_secs)
            .field("connection_attributes", &self.connection_attributes)
            .field("group_attributes", &self.group_attributes)
            .finish()
    }
}

/// guacd routing defaults attached to created connections
pub fn default_connection_attributes() -> Attributes {
    [
        ("guacd-hostname", "guacd"),
        ("guacd-port", "4822"),
        ("guacd-encryption", "none"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Unlimited-connection defaults attached to created groups
pub fn default_group_attributes() -> Attributes {
    [
        "max-connections",
        "max-connections-per-user",
        "enable-session-affinity",
    ]
    .into_iter()
    .map(|k| (k.to_string(), String::new()))
    .collect()
}

/// Reconciliation settings passed to the import orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImporterConfig {
    /// Name the root group is displayed and addressed by
    pub root_name: String,
    /// When set, every row's site is placed under this group chain
    pub parent_group: Option<String>,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            root_name: DEFAULT_ROOT_NAME.to_string(),
            parent_group: None,
        }
    }
}

/// Layered settings, every field optional
///
/// Empty strings count as unset, so a blank environment variable never
/// clobbers a value from the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImportSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_attributes: Option<Attributes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_attributes: Option<Attributes>,
}

impl ImportSettings {
    /// `~/.guacamole-import/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Read settings from a JSON file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self =
            serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(settings)
    }

    /// Read the default file if it exists, otherwise return empty settings
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Overlay `overrides` on top of `self`; set, non-empty values win
    pub fn merge(self, overrides: ImportSettings) -> ImportSettings {
        ImportSettings {
            api_url: pick(overrides.api_url, self.api_url),
            username: pick(overrides.username, self.username),
            password: pick(overrides.password, self.password),
            data_source: pick(overrides.data_source, self.data_source),
            parent_group: pick(overrides.parent_group, self.parent_group),
            root_name: pick(overrides.root_name, self.root_name),
            timeout_secs: overrides.timeout_secs.or(self.timeout_secs),
            connection_attributes: overrides
                .connection_attributes
                .or(self.connection_attributes),
            group_attributes: overrides.group_attributes.or(self.group_attributes),
        }
    }

    /// Validate and split into the client and importer configuration
    pub fn resolve(self) -> Result<(GuacamoleConfig, ImporterConfig), ConfigError> {
        let api_url = non_empty(self.api_url).ok_or(ConfigError::Missing("api_url"))?;
        let username = non_empty(self.username).ok_or(ConfigError::Missing("username"))?;
        let password = non_empty(self.password).ok_or(ConfigError::Missing("password"))?;

        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api_url must be an http(s) URL, got '{api_url}'"
            )));
        }
        let timeout_secs = self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }
        let root_name = non_empty(self.root_name).unwrap_or_else(|| DEFAULT_ROOT_NAME.to_string());
        if root_name.contains('/') {
            return Err(ConfigError::Invalid(format!(
                "root_name cannot contain '/', got '{root_name}'"
            )));
        }

        let mut guacamole = GuacamoleConfig::new(api_url, username, password);
        guacamole.data_source = non_empty(self.data_source);
        guacamole.timeout_secs = timeout_secs;
        if let Some(attributes) = self.connection_attributes {
            guacamole.connection_attributes = attributes;
        }
        if let Some(attributes) = self.group_attributes {
            guacamole.group_attributes = attributes;
        }

        let importer = ImporterConfig {
            root_name,
            parent_group: non_empty(self.parent_group),
        };

        Ok((guacamole, importer))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn pick(preferred: Option<String>, fallback: Option<String>) -> Option<String> {
    non_empty(preferred).or(fallback)
}
