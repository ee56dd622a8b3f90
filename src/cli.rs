//! Command-line surface, declared with clap derive.
//!
//! Every option is optional so that unset values fall through to the
//! configuration file and environment layers.

use std::path::PathBuf;

use clap::Parser;

/// Keep a hosts file in sync with running Docker containers.
#[derive(Parser, Debug)]
#[command(name = "docker-hosts", version, about, long_about = None)]
pub struct Cli {
    /// Hosts file to manage [default: /etc/hosts].
    pub file: Option<PathBuf>,

    /// Print the managed block instead of writing the file.
    #[arg(long)]
    pub dry_run: bool,

    /// Top-level domain appended to every name [default: localhost].
    #[arg(long)]
    pub tld: Option<String>,

    /// Keep running and update the file on container events.
    #[arg(long)]
    pub listen: bool,

    /// Docker socket path (default: local defaults / DOCKER_HOST).
    #[arg(long)]
    pub docker_socket: Option<String>,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to a TOML configuration file [default: ./docker-hosts.toml].
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
