//! cephmgr - Ceph RGW management from the command line
//!
//! cephmgr talks to the admin API of a Ceph Object Gateway (RGW) to manage
//! users and their capabilities and to inspect buckets. Connection details are
//! taken from flags, `CEPH_*` environment variables, or `~/.cephmgr.yaml`,
//! which is created interactively on first run.

pub mod admin;
pub mod caps;
pub mod commands;
pub mod config;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub use caps::{CapPermission, CapResource, CapabilityGrant, CapabilitySet, CapsError};
pub use config::{ConfigError, ConnectionConfig};

/// Core error types for cephmgr
#[derive(Error, Debug)]
pub enum CephmgrError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Remote failures are shown as the admin API reported them
    #[error("{0}")]
    Admin(#[from] admin::AdminError),

    #[error("required argument {argument} not set")]
    MissingArgument {
        command: &'static [&'static str],
        argument: &'static str,
    },

    #[error("invalid capabilities: {source}")]
    InvalidCaps {
        command: &'static [&'static str],
        #[source]
        source: CapsError,
    },

    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}

/// A serializable secret string wrapper
#[derive(Debug, Clone)]
pub struct Secret(SecretString);

impl Secret {
    /// Create a new secret from a string
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretString::from(value.into()))
    }

    /// Expose the secret value
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl From<String> for Secret {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for Secret {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl Serialize for Secret {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.expose_secret().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Secret {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(s))
    }
}

/// An RGW user as entered on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    /// User ID (`uid`), unique per cluster
    pub id: String,
    /// Display name
    pub display_name: String,
    /// Optional email address
    pub email: Option<String>,
}

impl UserIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: String::new(),
            email: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_debug_is_redacted() {
        let secret = Secret::new("s3cr3t");
        assert_eq!(secret.expose(), "s3cr3t");
        assert!(!format!("{:?}", secret).contains("s3cr3t"));
    }

    #[test]
    fn test_secret_serde() {
        let secret: Secret = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(secret.expose(), "abc");
        assert_eq!(serde_json::to_string(&secret).unwrap(), "\"abc\"");
    }

    #[test]
    fn test_user_identity_builder() {
        let user = UserIdentity::new("jdoe")
            .with_display_name("J. Doe")
            .with_email("jdoe@example.com");
        assert_eq!(user.id, "jdoe");
        assert_eq!(user.display_name, "J. Doe");
        assert_eq!(user.email.as_deref(), Some("jdoe@example.com"));
    }

    #[test]
    fn test_missing_argument_message() {
        let err = CephmgrError::MissingArgument {
            command: &["user", "get"],
            argument: "--user",
        };
        assert_eq!(err.to_string(), "required argument --user not set");
    }
}
