//! Command line surface
//!
//! Provides:
//! - Cli, the clap command tree
//! - Operation, a validated command ready to run
//! - execute/run, the single place where errors become exit codes

mod operation;
mod output;

pub use operation::{AdminOperation, Operation};

use crate::admin::{AdminApi, RgwAdminClient};
use crate::config::{
    self, ConfigError, ConfigResolver, ConfigValues, ConnectionConfig, Prompter, TerminalPrompter,
};
use crate::CephmgrError;
use clap::{CommandFactory, Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(
    name = "cephmgr",
    about = "Manage Ceph RGW users, capabilities and buckets through the admin API",
    version
)]
pub struct Cli {
    /// Configuration file path (default: $HOME/.cephmgr.yaml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Ceph S3 host with scheme, e.g. http://rgw.example.com:8080
    #[arg(long, global = true)]
    pub hostname: Option<String>,

    /// Admin access key
    #[arg(long, global = true)]
    pub access_key: Option<String>,

    /// Admin access secret
    #[arg(long, global = true)]
    pub access_secret: Option<String>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Connection values given as flags
    pub fn flag_values(&self) -> ConfigValues {
        ConfigValues::new(
            self.hostname.clone(),
            self.access_key.clone(),
            self.access_secret.clone(),
        )
    }

    /// Effective config file path
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config::default_path)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage RGW users
    User {
        #[command(subcommand)]
        command: Option<UserCommands>,
    },

    /// Inspect buckets
    Bucket {
        #[command(subcommand)]
        command: Option<BucketCommands>,
    },

    /// Print version information
    Version,
}

// Required values are optional here so that a missing one is reported
// by cephmgr with exit status 1 instead of by clap.
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// Create a user
    Create {
        /// User ID
        #[arg(short, long)]
        user: Option<String>,

        /// Display name (defaults to the user ID)
        #[arg(short, long)]
        fullname: Option<String>,

        /// Email address
        #[arg(short, long)]
        email: Option<String>,

        /// Initial capabilities, e.g. "buckets=*,users=read"
        #[arg(long)]
        caps: Option<String>,
    },

    /// Show a user
    Get {
        /// User ID
        #[arg(short, long)]
        user: Option<String>,
    },

    /// List user IDs
    List,

    /// Delete a user
    Delete {
        /// User ID
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Manage user capabilities
    Caps {
        #[command(subcommand)]
        command: Option<CapsCommands>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CapsCommands {
    /// Grant capabilities to a user
    Add {
        /// User ID
        #[arg(short, long)]
        user: Option<String>,

        /// Capabilities, e.g. "buckets=*,users=read,write"
        #[arg(long)]
        caps: Option<String>,
    },

    /// Revoke capabilities from a user
    Remove {
        /// User ID
        #[arg(short, long)]
        user: Option<String>,

        /// Capabilities, e.g. "usage=read"
        #[arg(long)]
        caps: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum BucketCommands {
    /// List bucket names
    List,

    /// Show bucket details
    Info {
        /// Bucket name
        bucket: Option<String>,
    },
}

/// Process exit status classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success,
    /// Missing argument or invalid capability spec
    UsageError,
    /// Incomplete or invalid connection configuration
    ConfigError,
    /// The admin API call failed
    RemoteError,
    /// Writing output failed
    IoError,
}

impl ExitCode {
    pub fn from_error(err: &CephmgrError) -> Self {
        match err {
            CephmgrError::MissingArgument { .. } | CephmgrError::InvalidCaps { .. } => {
                ExitCode::UsageError
            }
            CephmgrError::Config(_) => ExitCode::ConfigError,
            CephmgrError::Admin(_) => ExitCode::RemoteError,
            CephmgrError::Io(_) => ExitCode::IoError,
        }
    }

    /// Whether the command help follows the error message
    pub fn shows_help(&self) -> bool {
        matches!(self, ExitCode::UsageError | ExitCode::ConfigError)
    }

    pub fn as_i32(&self) -> i32 {
        match self {
            ExitCode::Success => 0,
            _ => 1,
        }
    }
}

/// Render the help of the subcommand at `path`, e.g. `["user", "caps", "add"]`
pub fn render_help(path: &[&str]) -> String {
    let mut cmd = Cli::command();
    cmd.build();
    render_subcommand_help(&mut cmd, path)
}

fn render_subcommand_help(cmd: &mut clap::Command, path: &[&str]) -> String {
    match path.split_first() {
        Some((name, rest)) => match cmd.find_subcommand_mut(name) {
            Some(sub) => render_subcommand_help(sub, rest),
            None => cmd.render_help().to_string(),
        },
        None => cmd.render_help().to_string(),
    }
}

/// Run one parsed command line and map the outcome to an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let flags = cli.flag_values();
    let path = cli.config_path();

    let operation = match Operation::from_command(cli.command) {
        Ok(operation) => operation,
        Err(e) => return report(&e, &[], &mut io::stderr()),
    };
    let command = operation.command_path();

    let resolver = ConfigResolver::new(
        path,
        flags,
        ConfigValues::from_env(std::env::vars()),
        TerminalPrompter,
    );

    let mut stdout = io::stdout();
    let result = run(operation, resolver, connect, &mut stdout).await;

    match result {
        Ok(()) => ExitCode::Success,
        Err(e) => report(&e, command, &mut io::stderr()),
    }
}

fn connect(config: &ConnectionConfig) -> Result<Arc<dyn AdminApi>, CephmgrError> {
    Ok(Arc::new(RgwAdminClient::new(config)?))
}

/// Run an operation. Config is resolved only for operations that call
/// the admin API, and `connect` is called only with a complete config.
pub async fn run<P, F, W>(
    operation: Operation,
    resolver: ConfigResolver<P>,
    connect: F,
    out: &mut W,
) -> Result<(), CephmgrError>
where
    P: Prompter,
    F: FnOnce(&ConnectionConfig) -> Result<Arc<dyn AdminApi>, CephmgrError>,
    W: Write,
{
    let admin_operation = match operation {
        Operation::Help(path) => {
            write!(out, "{}", render_help(path))?;
            return Ok(());
        }
        Operation::Version => {
            output::version(out)?;
            return Ok(());
        }
        Operation::Admin(op) => op,
    };

    let resolution = resolver.resolve().await?;
    debug!(
        path = %resolution.path.display(),
        prompted = resolution.prompted(),
        "Resolved connection config"
    );

    let endpoint = resolution.config.endpoint()?;
    debug!(endpoint = %endpoint, "Connecting to RGW");

    let api = connect(&resolution.config)?;
    admin_operation.run(api.as_ref(), out).await
}

/// Write `err` to `err_out` and pick the exit code.
///
/// Usage and config errors are followed by the help of `command`, or of
/// the subcommand the error names. Remote errors are written alone.
pub fn report<W: Write>(err: &CephmgrError, command: &[&str], err_out: &mut W) -> ExitCode {
    let code = ExitCode::from_error(err);
    debug!(error = %err, "Command failed");

    if let Err(e) = write_report(err, code, command, err_out) {
        debug!(error = %e, "Cannot write error report");
    }

    code
}

fn write_report<W: Write>(
    err: &CephmgrError,
    code: ExitCode,
    command: &[&str],
    err_out: &mut W,
) -> io::Result<()> {
    writeln!(err_out, "Error: {}", err)?;

    if code.shows_help() {
        let path: &[&str] = match err {
            CephmgrError::MissingArgument { command: path, .. }
            | CephmgrError::InvalidCaps { command: path, .. } => *path,
            _ => command,
        };
        writeln!(err_out)?;
        write!(err_out, "{}", render_help(path))?;
    }

    if let CephmgrError::Config(ConfigError::Incomplete(_)) = err {
        writeln!(
            err_out,
            "Set the missing values with flags, CEPH_* environment variables or the config file."
        )?;
    }

    Ok(())
}
