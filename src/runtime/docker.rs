use super::{ContainerRuntime, RuntimeError};
use crate::types::{ContainerDescriptor, ContainerEvent, NetworkEndpoint};
use async_trait::async_trait;
use bollard::container::ListContainersOptions;
use bollard::errors::Error as BollardError;
use bollard::models::{ContainerInspectResponse, EventMessage};
use bollard::system::EventsOptions;
use bollard::Docker;
use futures_util::stream::{BoxStream, StreamExt};
use log::{debug, info, warn};
use std::collections::HashMap;

/// Container actions the event subscription asks the daemon for.
const WATCHED_ACTIONS: [&str; 6] = ["start", "stop", "die", "destroy", "kill", "rename"];

pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }

    /// Connects to the local Docker daemon using default settings.
    /// This handles the unix socket on Linux and `DOCKER_HOST`.
    pub fn connect() -> Result<Self, RuntimeError> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self::new(docker))
    }

    /// Connects through a specific unix socket.
    pub fn connect_with_socket(socket_path: &str) -> Result<Self, RuntimeError> {
        let docker = Docker::connect_with_socket(socket_path, 120, bollard::API_DEFAULT_VERSION)?;
        Ok(Self::new(docker))
    }

    fn events_options() -> EventsOptions<String> {
        let filters: HashMap<String, Vec<String>> = [
            ("type", ["container"].as_slice()),
            ("event", WATCHED_ACTIONS.as_slice()),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.iter().map(|s| s.to_string()).collect()))
        .collect();

        EventsOptions {
            filters,
            ..Default::default()
        }
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn list_running(&self) -> Result<Vec<ContainerDescriptor>, RuntimeError> {
        let opts = ListContainersOptions::<String> {
            all: false,
            ..Default::default()
        };
        let containers = self.docker.list_containers(Some(opts)).await?;

        let mut descriptors = Vec::with_capacity(containers.len());
        for c in containers {
            let Some(id) = c.id else { continue };
            match self.inspect(&id).await {
                Ok(descriptor) => descriptors.push(descriptor),
                Err(RuntimeError::NotFound(_)) => {
                    debug!("Container {} vanished before inspection", id);
                }
                Err(e) => return Err(e),
            }
        }
        info!("Initial scan found {} running containers", descriptors.len());
        Ok(descriptors)
    }

    async fn inspect(&self, id: &str) -> Result<ContainerDescriptor, RuntimeError> {
        match self.docker.inspect_container(id, None).await {
            Ok(detail) => Ok(descriptor_from_inspect(id, detail)),
            Err(BollardError::DockerResponseServerError {
                status_code: 404, ..
            }) => Err(RuntimeError::NotFound(id.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    fn events(&self) -> BoxStream<'_, Result<ContainerEvent, RuntimeError>> {
        info!("Listening for Docker events...");
        self.docker
            .events(Some(Self::events_options()))
            .map(|msg| match msg {
                Ok(event) => Ok(event_from_message(event)),
                Err(e) => {
                    warn!("Error in Docker event stream: {}", e);
                    Err(e.into())
                }
            })
            .boxed()
    }
}

/// Flattens a bollard inspection record into a descriptor.
///
/// `id` is used when the record itself carries no identifier.
pub fn descriptor_from_inspect(id: &str, detail: ContainerInspectResponse) -> ContainerDescriptor {
    let (hostname, domainname) = detail
        .config
        .map(|c| (c.hostname.unwrap_or_default(), c.domainname.unwrap_or_default()))
        .unwrap_or_default();

    let (ip_address, networks) = match detail.network_settings {
        Some(settings) => {
            let networks = settings
                .networks
                .unwrap_or_default()
                .into_iter()
                .map(|(name, endpoint)| {
                    (
                        name,
                        NetworkEndpoint {
                            ip_address: endpoint.ip_address.unwrap_or_default(),
                            aliases: endpoint.aliases.unwrap_or_default(),
                        },
                    )
                })
                .collect();
            (settings.ip_address.unwrap_or_default(), networks)
        }
        None => Default::default(),
    };

    ContainerDescriptor {
        id: detail.id.unwrap_or_else(|| id.to_string()),
        name: detail.name.unwrap_or_default(),
        hostname,
        domainname,
        ip_address,
        networks,
    }
}

/// Converts a daemon event into the crate's event type.
pub fn event_from_message(event: EventMessage) -> ContainerEvent {
    let typ = event.typ.map(|t| t.to_string()).unwrap_or_default();
    let status = event.action.unwrap_or_default();
    let id = event.actor.and_then(|a| a.id).unwrap_or_default();
    ContainerEvent { typ, status, id }
}
