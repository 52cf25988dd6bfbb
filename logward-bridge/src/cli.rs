//! CLI argument definitions for logward-bridge.

use std::path::PathBuf;

use clap::Parser;

/// Logward syslog bridge.
///
/// Listens for UDP syslog datagrams and forwards them to the logward
/// ingest endpoint. The receive loop is the process's only unit of
/// work and runs until terminated.
#[derive(Parser, Debug)]
#[command(name = "logward-bridge")]
#[command(version, about, long_about = None)]
pub struct BridgeCli {
    /// Path to logward.toml configuration file.
    #[arg(short, long, default_value = "logward.toml")]
    pub config: PathBuf,

    /// Override the UDP listen address (host:port).
    #[arg(long)]
    pub listen_addr: Option<String>,

    /// Override the ingest endpoint URL.
    #[arg(long)]
    pub ingest_url: Option<String>,
}
