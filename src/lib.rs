//! Keeps a hosts file in sync with the containers running on a Docker host.
//!
//! Running containers are turned into hosts entries ([`extract`]), tracked
//! per container in a [`HostsIndex`], and rendered into a delimited block of
//! the hosts file ([`HostsFile`]). [`HostsWatcher`] drives the whole thing
//! from the Docker event stream.

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod hosts_file;
pub mod index;
pub mod runtime;
pub mod types;
pub mod watcher;

pub use config::Config;
pub use error::{Error, Result};
pub use extract::extract;
pub use hosts_file::HostsFile;
pub use index::HostsIndex;
pub use runtime::{ContainerRuntime, DockerRuntime, RuntimeError};
pub use types::{ContainerDescriptor, ContainerEvent, Entry, EventAction, NetworkEndpoint};
pub use watcher::HostsWatcher;
