//! docker-hosts entry point.

use clap::Parser;
use log::{error, info};
use tokio::signal;

use docker_hosts::cli::Cli;
use docker_hosts::{Config, DockerRuntime, HostsFile, HostsWatcher};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let cfg = Config::load(&cli)?;

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cfg.log_level))
        .init();
    info!("Starting docker-hosts with config: {:?}", cfg);

    // Container Runtime (Docker)
    let runtime = match &cfg.docker_socket {
        Some(socket) => DockerRuntime::connect_with_socket(socket)?,
        None => DockerRuntime::connect()?,
    };

    let hosts_file = HostsFile::new(&cfg.hosts_file, &cfg.tld).with_dry_run(cfg.dry_run);
    let mut watcher = HostsWatcher::new(runtime, hosts_file);

    // Initial scan
    watcher.initialize().await?;

    if !cfg.listen {
        return Ok(());
    }

    tokio::select! {
        res = watcher.listen() => {
            if let Err(e) = &res {
                error!("Stopped listening for container events: {}", e);
            }
            res?;
        }
        res = signal::ctrl_c() => {
            match res {
                Ok(()) => info!("Received Ctrl+C, shutting down..."),
                Err(err) => error!("Unable to listen for shutdown signal: {}", err),
            }
        }
    }

    info!("Shutdown complete.");
    Ok(())
}
