//! Configuration value sources
//!
//! Provides:
//! - ConfigFile, the YAML document persisted at `~/.cephmgr.yaml`
//! - ConfigValues, one layer of optional connection values

use super::{ConfigError, ConnectionConfig};
use crate::Secret;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Prefix for environment variables bound to configuration keys
pub const ENV_PREFIX: &str = "CEPH_";

/// Config file as stored on disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    // Older files carry lowercased keys
    #[serde(
        default,
        rename = "accessKey",
        alias = "accesskey",
        skip_serializing_if = "Option::is_none"
    )]
    pub access_key: Option<String>,
    #[serde(
        default,
        rename = "accessSecret",
        alias = "accesssecret",
        skip_serializing_if = "Option::is_none"
    )]
    pub access_secret: Option<Secret>,
}

impl ConfigFile {
    /// Load the config file, `Ok(None)` when it does not exist
    pub async fn load(path: impl AsRef<Path>) -> Result<Option<Self>, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        Self::parse(&content)
            .map(Some)
            .map_err(|message| ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            })
    }

    /// Parse YAML content. An empty document holds no values.
    pub fn parse(content: &str) -> Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    }

    /// Write the config file, creating parent directories as needed
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let write_error = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        let content = serde_yaml::to_string(self).map_err(|e| {
            write_error(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(write_error)?;
        }

        fs::write(path, content).await.map_err(write_error)
    }
}

/// One layer of connection values. Empty strings count as unset.
#[derive(Debug, Clone, Default)]
pub struct ConfigValues {
    pub hostname: Option<String>,
    pub access_key: Option<String>,
    pub access_secret: Option<Secret>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ConfigValues {
    pub fn new(
        hostname: Option<String>,
        access_key: Option<String>,
        access_secret: Option<String>,
    ) -> Self {
        Self {
            hostname: non_empty(hostname),
            access_key: non_empty(access_key),
            access_secret: non_empty(access_secret).map(Secret::new),
        }
    }

    /// Collect `CEPH_HOSTNAME`, `CEPH_ACCESSKEY` and `CEPH_ACCESSSECRET`.
    /// Variable names match case-insensitively.
    pub fn from_env<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut hostname = None;
        let mut access_key = None;
        let mut access_secret = None;

        for (key, value) in vars {
            let key = key.as_ref().to_ascii_uppercase();
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match name {
                "HOSTNAME" => hostname = Some(value.into()),
                "ACCESSKEY" => access_key = Some(value.into()),
                "ACCESSSECRET" => access_secret = Some(value.into()),
                _ => {}
            }
        }

        Self::new(hostname, access_key, access_secret)
    }

    /// Fill fields unset in `self` from `lower`
    pub fn or(self, lower: ConfigValues) -> Self {
        Self {
            hostname: self.hostname.or(lower.hostname),
            access_key: self.access_key.or(lower.access_key),
            access_secret: self.access_secret.or(lower.access_secret),
        }
    }

    /// Whether all three fields are set
    pub fn is_complete(&self) -> bool {
        self.hostname.is_some() && self.access_key.is_some() && self.access_secret.is_some()
    }

    pub fn into_connection(self) -> ConnectionConfig {
        ConnectionConfig {
            hostname: self.hostname.unwrap_or_default(),
            access_key: self.access_key.unwrap_or_default(),
            access_secret: self.access_secret.unwrap_or_else(|| Secret::new("")),
        }
    }
}

impl From<ConfigFile> for ConfigValues {
    fn from(file: ConfigFile) -> Self {
        Self::new(
            file.hostname,
            file.access_key,
            file.access_secret.map(|s| s.expose().to_string()),
        )
    }
}

impl From<&ConnectionConfig> for ConfigFile {
    fn from(config: &ConnectionConfig) -> Self {
        Self {
            hostname: Some(config.hostname.clone()),
            access_key: Some(config.access_key.clone()),
            access_secret: Some(config.access_secret.clone()),
        }
    }
}
