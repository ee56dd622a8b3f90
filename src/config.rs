use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cli::Cli;
use crate::hosts_file::DEFAULT_HOSTS_PATH;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    pub hosts_file: PathBuf,
    pub dry_run: bool,
    pub tld: String,
    pub listen: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docker_socket: Option<String>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hosts_file: PathBuf::from(DEFAULT_HOSTS_PATH),
            dry_run: false,
            tld: "localhost".into(),
            listen: false,
            docker_socket: None,
            log_level: "info".into(),
        }
    }
}

/// Values given on the command line. Unset options leave lower layers alone.
#[derive(Debug, Default, Serialize)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    hosts_file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dry_run: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tld: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    listen: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    docker_socket: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_level: Option<String>,
}

impl From<&Cli> for CliOverrides {
    fn from(cli: &Cli) -> Self {
        Self {
            hosts_file: cli.file.clone(),
            dry_run: cli.dry_run.then_some(true),
            tld: cli.tld.clone(),
            listen: cli.listen.then_some(true),
            docker_socket: cli.docker_socket.clone(),
            log_level: cli.log_level.clone(),
        }
    }
}

impl Config {
    /// Defaults, then the config file(s), then `DOCKER_HOSTS_*`, then the CLI.
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        figment = match &cli.config {
            Some(path) => figment.merge(Toml::file(path)),
            None => figment
                .merge(Toml::file("docker-hosts.toml"))
                .merge(Json::file("docker-hosts.json")),
        };
        Self::from_figment(
            figment
                .merge(Env::prefixed("DOCKER_HOSTS_"))
                .merge(Serialized::defaults(CliOverrides::from(cli))),
        )
    }

    fn from_figment(figment: Figment) -> anyhow::Result<Self> {
        let config: Config = figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        if config.tld.trim().is_empty() {
            anyhow::bail!("Invalid configuration: tld must not be empty");
        }

        Ok(config)
    }
}
