use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::types::{ContainerDescriptor, ContainerEvent};

pub mod docker;
pub use docker::DockerRuntime;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The container disappeared before it could be inspected.
    #[error("container not found: {0}")]
    NotFound(String),

    #[error("docker error: {0}")]
    Docker(#[from] bollard::errors::Error),

    /// The event stream closed without an error.
    #[error("event stream ended")]
    StreamEnded,
}

/// Source of container metadata and lifecycle events.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Lists running containers with full inspection metadata.
    async fn list_running(&self) -> Result<Vec<ContainerDescriptor>, RuntimeError>;

    /// Inspects a single container.
    /// Returns [`RuntimeError::NotFound`] if it no longer exists.
    async fn inspect(&self, id: &str) -> Result<ContainerDescriptor, RuntimeError>;

    /// Subscribes to lifecycle events, in arrival order.
    fn events(&self) -> BoxStream<'_, Result<ContainerEvent, RuntimeError>>;
}
