//! Connection configuration for cephmgr
//!
//! Values come from, highest priority first: command-line flags, `CEPH_*`
//! environment variables, the YAML config file, and the first-run prompt.

mod prompt;
mod types;

pub use prompt::{prompt_until_value, Prompter, StreamPrompter, TerminalPrompter};
pub use types::*;

use crate::Secret;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// File name of the config file in the home directory
pub const CONFIG_FILE_NAME: &str = ".cephmgr.yaml";

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse config file {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Cannot write config file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Connection configuration incomplete, missing: {}", .0.join(", "))]
    Incomplete(Vec<&'static str>),

    #[error("Invalid hostname '{0}': {1}")]
    InvalidHostname(String, String),

    #[error("Interactive setup aborted: {0}")]
    PromptAborted(String),
}

/// Get the default config file path (`$HOME/.cephmgr.yaml`)
pub fn default_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_FILE_NAME)
}

/// Effective connection parameters for one run
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// RGW endpoint with scheme, e.g. `http://rgw.example.com:8080`
    pub hostname: String,
    /// Admin user access key
    pub access_key: String,
    /// Admin user secret key
    pub access_secret: Secret,
}

impl ConnectionConfig {
    pub fn new(
        hostname: impl Into<String>,
        access_key: impl Into<String>,
        access_secret: impl Into<Secret>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            access_key: access_key.into(),
            access_secret: access_secret.into(),
        }
    }

    /// Names of the fields that are still empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.hostname.trim().is_empty() {
            missing.push("hostname");
        }
        if self.access_key.trim().is_empty() {
            missing.push("accessKey");
        }
        if self.access_secret.expose().trim().is_empty() {
            missing.push("accessSecret");
        }
        missing
    }

    /// Check that every field is set
    pub fn validate(&self) -> Result<(), ConfigError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Incomplete(missing))
        }
    }

    /// Parse the hostname as an http(s) endpoint
    pub fn endpoint(&self) -> Result<Url, ConfigError> {
        self.validate()?;

        let url = Url::parse(self.hostname.trim())
            .map_err(|e| ConfigError::InvalidHostname(self.hostname.clone(), e.to_string()))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ConfigError::InvalidHostname(
                self.hostname.clone(),
                format!("unsupported scheme '{}', use http or https", scheme),
            )),
        }
    }
}

/// Steps of config resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveState {
    Unresolved,
    /// Config file found and parsed
    FileLoaded,
    /// No config file, prompting the operator
    InteractiveSetupPending,
    /// Prompted values collected (and written, if possible)
    InteractiveSetupComplete,
    /// Flags and environment applied
    Resolved,
}

/// Outcome of resolving the connection configuration
#[derive(Debug)]
pub struct Resolution {
    /// Effective configuration, possibly incomplete
    pub config: ConnectionConfig,
    /// Config file path that was consulted
    pub path: PathBuf,
    /// States passed through, in order
    pub states: Vec<ResolveState>,
    /// Whether a new config file was written
    pub file_written: bool,
}

impl Resolution {
    pub fn prompted(&self) -> bool {
        self.states.contains(&ResolveState::InteractiveSetupPending)
    }
}

/// Resolves the effective connection configuration
pub struct ConfigResolver<P> {
    path: PathBuf,
    flags: ConfigValues,
    env: ConfigValues,
    prompter: P,
}

impl<P: Prompter> ConfigResolver<P> {
    pub fn new(path: impl Into<PathBuf>, flags: ConfigValues, env: ConfigValues, prompter: P) -> Self {
        Self {
            path: path.into(),
            flags,
            env,
            prompter,
        }
    }

    /// Run the resolution state machine.
    ///
    /// File problems are reported and skipped. Only an aborted first-run
    /// prompt fails the resolution.
    pub async fn resolve(mut self) -> Result<Resolution, ConfigError> {
        let mut states = vec![ResolveState::Unresolved];
        let mut file_written = false;

        let overrides = self.flags.clone().or(self.env.clone());

        let base = match ConfigFile::load(&self.path).await {
            Ok(Some(file)) => {
                debug!(path = %self.path.display(), "Loaded config file");
                states.push(ResolveState::FileLoaded);
                ConfigValues::from(file)
            }
            Ok(None) if overrides.is_complete() => {
                debug!(path = %self.path.display(), "No config file, using flags and environment");
                ConfigValues::default()
            }
            Ok(None) => {
                states.push(ResolveState::InteractiveSetupPending);
                let entered = self.interactive_setup()?;

                let file = ConfigFile::from(&entered);
                match file.save(&self.path).await {
                    Ok(()) => {
                        debug!(path = %self.path.display(), "Wrote config file");
                        file_written = true;
                    }
                    Err(e) => {
                        debug!(error = %e, "Config file not written");
                        eprintln!("{}", e);
                    }
                }

                states.push(ResolveState::InteractiveSetupComplete);
                ConfigValues::from(file)
            }
            Err(e) => {
                debug!(error = %e, "Ignoring config file");
                eprintln!("{}", e);
                ConfigValues::default()
            }
        };

        let config = overrides.or(base).into_connection();
        states.push(ResolveState::Resolved);

        Ok(Resolution {
            config,
            path: self.path,
            states,
            file_written,
        })
    }

    fn interactive_setup(&mut self) -> Result<ConnectionConfig, ConfigError> {
        eprintln!("Creating default config file {}", self.path.display());

        let hostname = prompt_until_value(&mut self.prompter, "Ceph S3 Host (with scheme):", false)?;
        let access_key = prompt_until_value(&mut self.prompter, "Access key:", false)?;
        let access_secret = prompt_until_value(&mut self.prompter, "Access secret:", true)?;

        Ok(ConnectionConfig::new(hostname, access_key, access_secret))
    }
}
