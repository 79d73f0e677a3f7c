//! cephmgr CLI - Ceph RGW management from the command line
//!
//! Run `cephmgr --help` for usage information.

use cephmgr::commands::{self, Cli};
use clap::Parser;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .init();

    let code = commands::execute(cli).await;
    std::process::exit(code.as_i32());
}
