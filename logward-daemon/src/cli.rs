//! CLI argument definitions for logward-daemon.
//!
//! Uses `clap` v4 derive macros to parse command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Logward log collection daemon.
///
/// Serves the HTTP ingestion and query API, resolves client
/// identities, evaluates error-burst alerts, and schedules the
/// archive job.
#[derive(Parser, Debug)]
#[command(name = "logward-daemon")]
#[command(version, about, long_about = None)]
pub struct DaemonCli {
    /// Path to logward.toml configuration file.
    #[arg(short, long, default_value = "logward.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Override log format (json, pretty).
    ///
    /// Takes precedence over the config file and environment variables.
    #[arg(long)]
    pub log_format: Option<String>,

    /// Validate configuration file and exit without starting the daemon.
    #[arg(long)]
    pub validate: bool,
}
