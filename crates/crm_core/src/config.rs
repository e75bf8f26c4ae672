//! Runtime configuration.
//!
//! Layered as: defaults, then an optional TOML file, then environment
//! variables (a `.env` file in the working directory is honoured).
//!
//! ```toml
//! [store]
//! backend = "sqlite"
//! sqlite_path = "crm.sqlite3"
//! latency_ms = 0
//! seed = true
//!
//! [remote]
//! base_url = "https://api.example.test"
//! project_id = "proj_123"
//! public_key = "pk_live"
//!
//! [logging]
//! level = "info"
//! dir = "logs"
//! ```

use crate::store::RemoteSettings;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub type ConfigResult<T> = Result<T, ConfigError>;

pub const ENV_BACKEND: &str = "CRM_BACKEND";
pub const ENV_SQLITE_PATH: &str = "CRM_SQLITE_PATH";
pub const ENV_REMOTE_URL: &str = "CRM_REMOTE_URL";
pub const ENV_REMOTE_PROJECT_ID: &str = "CRM_REMOTE_PROJECT_ID";
pub const ENV_REMOTE_PUBLIC_KEY: &str = "CRM_REMOTE_PUBLIC_KEY";
pub const ENV_LOG_LEVEL: &str = "CRM_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "CRM_LOG_DIR";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    InvalidValue { key: &'static str, value: String },
    /// A backend was selected without the settings it needs.
    Missing { key: &'static str },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::InvalidValue { key, value } => write!(f, "invalid value `{value}` for {key}"),
            Self::Missing { key } => write!(f, "missing required setting {key}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Record Store backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Memory,
    Sqlite,
    Remote,
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "sqlite" => Ok(Self::Sqlite),
            "remote" => Ok(Self::Remote),
            _ => Err(ConfigError::InvalidValue {
                key: ENV_BACKEND,
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSection {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default = "default_sqlite_path")]
    pub sqlite_path: PathBuf,
    /// Artificial round-trip delay of the in-memory backend.
    #[serde(default)]
    pub latency_ms: u64,
    /// Seed empty stores from the embedded fixtures.
    #[serde(default = "default_seed")]
    pub seed: bool,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            sqlite_path: default_sqlite_path(),
            latency_ms: 0,
            seed: default_seed(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSection {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub public_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSection {
    /// `trace|debug|info|warn|error`; falls back to the build default.
    #[serde(default)]
    pub level: Option<String>,
    /// Log directory; file logging is disabled when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrmConfig {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub remote: RemoteSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl CrmConfig {
    pub fn parse(content: &str, path: &Path) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Loads `path` when given (defaults otherwise) and applies environment
    /// overrides, including values from a `.env` file.
    pub fn load_with_env(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| dotenvy::var(key).ok())?;
        Ok(config)
    }

    /// Applies `CRM_*` overrides resolved through `lookup`.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<()> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = non_empty(ENV_BACKEND) {
            self.store.backend = value.parse()?;
        }
        if let Some(value) = non_empty(ENV_SQLITE_PATH) {
            self.store.sqlite_path = PathBuf::from(value);
        }
        if let Some(value) = non_empty(ENV_REMOTE_URL) {
            self.remote.base_url = Some(value);
        }
        if let Some(value) = non_empty(ENV_REMOTE_PROJECT_ID) {
            self.remote.project_id = Some(value);
        }
        if let Some(value) = non_empty(ENV_REMOTE_PUBLIC_KEY) {
            self.remote.public_key = Some(value);
        }
        if let Some(value) = non_empty(ENV_LOG_LEVEL) {
            self.logging.level = Some(value);
        }
        if let Some(value) = non_empty(ENV_LOG_DIR) {
            self.logging.dir = Some(PathBuf::from(value));
        }
        Ok(())
    }

    /// Resolves the remote connection settings; all three values are required.
    pub fn remote_settings(&self) -> ConfigResult<RemoteSettings> {
        let require = |value: &Option<String>, key: &'static str| {
            value.clone().ok_or(ConfigError::Missing { key })
        };
        Ok(RemoteSettings {
            base_url: require(&self.remote.base_url, "remote.base_url")?,
            project_id: require(&self.remote.project_id, "remote.project_id")?,
            public_key: require(&self.remote.public_key, "remote.public_key")?,
        })
    }
}

fn default_sqlite_path() -> PathBuf {
    PathBuf::from("crm.sqlite3")
}

fn default_seed() -> bool {
    true
}
