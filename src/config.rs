// src/config.rs
//! Configuration file parsing
//!
//! Supports an optional TOML file with the following sections:
//! - [repository] - Channel, licence/vendor stamped on entries, Release fields
//! - [storage] - Where the previously published index is read from and
//!   where `--upload` publishes to
//!
//! Command-line flags override values from the file.

use crate::error::{Error, Result};
use crate::storage::{HttpStore, LocalStore, ObjectStore};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Architectures published when none are configured
pub const DEFAULT_ARCHITECTURES: [&str; 3] = ["amd64", "arm64", "i386"];

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Repository settings
    #[serde(default)]
    pub repository: RepositorySection,

    /// Storage settings
    #[serde(default)]
    pub storage: StorageSection,
}

/// Repository configuration section
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepositorySection {
    /// Release channel (suite/codename), e.g. "stable"
    #[serde(default)]
    pub channel: Option<String>,

    /// Licence stamped on every new entry
    #[serde(default)]
    pub licence: String,

    /// Vendor stamped on every new entry
    #[serde(default)]
    pub vendor: String,

    /// Release `Description:` field
    #[serde(default)]
    pub description: String,

    /// Release `Origin:` field (default: "<vendor> APT Repository")
    #[serde(default)]
    pub origin: Option<String>,

    /// Release `Label:` field (default: vendor)
    #[serde(default)]
    pub label: Option<String>,

    /// Architectures to publish, in Release order
    #[serde(default = "default_architectures")]
    pub architectures: Vec<String>,
}

impl Default for RepositorySection {
    fn default() -> Self {
        Self {
            channel: None,
            licence: String::new(),
            vendor: String::new(),
            description: String::new(),
            origin: None,
            label: None,
            architectures: default_architectures(),
        }
    }
}

fn default_architectures() -> Vec<String> {
    DEFAULT_ARCHITECTURES.iter().map(|a| a.to_string()).collect()
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// No prior index; every architecture starts empty
    #[default]
    None,
    /// Directory tree
    Local,
    /// HTTP GET/PUT
    Http,
}

/// Storage configuration section
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageSection {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Root directory for the local backend
    #[serde(default)]
    pub root: Option<PathBuf>,

    /// Base URL for the http backend
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout for the http backend
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Environment variable holding a bearer token for the http backend
    #[serde(default)]
    pub token_env: Option<String>,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            backend: StorageBackend::None,
            root: None,
            base_url: None,
            timeout_secs: default_timeout_secs(),
            token_env: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

impl StorageSection {
    /// Open the configured store, or `None` for the `none` backend
    pub fn open(&self) -> Result<Option<Box<dyn ObjectStore>>> {
        match self.backend {
            StorageBackend::None => Ok(None),
            StorageBackend::Local => {
                let root = self.root.as_ref().ok_or_else(|| {
                    Error::ConfigError("storage.root is required for the local backend".to_string())
                })?;
                Ok(Some(Box::new(LocalStore::new(root))))
            }
            StorageBackend::Http => {
                let base_url = self.base_url.as_deref().ok_or_else(|| {
                    Error::ConfigError(
                        "storage.base_url is required for the http backend".to_string(),
                    )
                })?;
                let token = match &self.token_env {
                    Some(var) => Some(std::env::var(var).map_err(|_| {
                        Error::ConfigError(format!("environment variable {var} is not set"))
                    })?),
                    None => None,
                };
                let store = HttpStore::with_options(
                    base_url,
                    Duration::from_secs(self.timeout_secs),
                    token,
                )?;
                Ok(Some(Box::new(store)))
            }
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::parse(&content).map_err(|e| match e {
            Error::ConfigError(msg) => Error::ConfigError(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if let Some(channel) = &self.repository.channel {
            validate_channel(channel)?;
        }
        validate_architectures(&self.repository.architectures)
    }
}

/// Names used as a single path segment in the published layout
fn is_path_segment(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains('/')
        && !name.contains(char::is_whitespace)
}

/// Check a channel name is usable as a suite directory
pub fn validate_channel(channel: &str) -> Result<()> {
    if !is_path_segment(channel) {
        return Err(Error::ConfigError(format!("invalid channel name '{channel}'")));
    }
    Ok(())
}

/// Check an architecture list is non-empty, unique and usable as a path segment
pub fn validate_architectures(architectures: &[String]) -> Result<()> {
    if architectures.is_empty() {
        return Err(Error::ConfigError(
            "at least one architecture is required".to_string(),
        ));
    }
    for (i, arch) in architectures.iter().enumerate() {
        if !is_path_segment(arch) {
            return Err(Error::ConfigError(format!("invalid architecture name '{arch}'")));
        }
        if architectures[..i].contains(arch) {
            return Err(Error::ConfigError(format!("duplicate architecture '{arch}'")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.repository.architectures, vec!["amd64", "arm64", "i386"]);
        assert_eq!(config.storage.backend, StorageBackend::None);
        assert_eq!(config.storage.timeout_secs, 30);
        assert!(config.storage.open().unwrap().is_none());
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(
            r#"
[repository]
channel = "beta"
licence = "MIT"
vendor = "Common Fate"
description = "Granted packages"
origin = "Common Fate"
architectures = ["amd64", "arm64"]

[storage]
backend = "local"
root = "/srv/apt"
"#,
        )
        .unwrap();

        assert_eq!(config.repository.channel.as_deref(), Some("beta"));
        assert_eq!(config.repository.licence, "MIT");
        assert_eq!(config.repository.origin.as_deref(), Some("Common Fate"));
        assert!(config.repository.label.is_none());
        assert_eq!(config.repository.architectures, vec!["amd64", "arm64"]);
        assert_eq!(config.storage.backend, StorageBackend::Local);

        let store = config.storage.open().unwrap().unwrap();
        assert_eq!(store.name(), "local");
    }

    #[test]
    fn test_backend_requires_location() {
        let config = Config::parse("[storage]\nbackend = \"http\"\n").unwrap();
        assert!(matches!(config.storage.open(), Err(Error::ConfigError(_))));

        let config = Config::parse("[storage]\nbackend = \"local\"\n").unwrap();
        assert!(matches!(config.storage.open(), Err(Error::ConfigError(_))));
    }

    #[test]
    fn test_rejects_bad_architectures() {
        assert!(Config::parse("[repository]\narchitectures = []\n").is_err());
        assert!(Config::parse("[repository]\narchitectures = [\"amd64\", \"amd64\"]\n").is_err());
        assert!(Config::parse("[repository]\narchitectures = [\"../x\"]\n").is_err());
        assert!(validate_architectures(&["..".to_string()]).is_err());
        assert!(validate_architectures(&["riscv64".to_string()]).is_ok());
    }

    #[test]
    fn test_rejects_bad_channel() {
        assert!(Config::parse("[repository]\nchannel = \"a/b\"\n").is_err());
        assert!(validate_channel("").is_err());
        assert!(validate_channel("beta").is_ok());
    }

    #[test]
    fn test_rejects_unknown_keys() {
        assert!(Config::parse("[repository]\nchanel = \"stable\"\n").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/aptpack.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/aptpack.toml"));
    }

    #[test]
    fn test_load_invalid_file_names_path_once() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("aptpack.toml");
        std::fs::write(&path, "[repository]\nchannel = \"\"\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, Error::ConfigError(_)));
        assert_eq!(message.matches("Configuration error").count(), 1);
        assert!(message.contains(&path.display().to_string()));
    }
}
