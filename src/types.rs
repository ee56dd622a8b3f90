//! Data structures used throughout docker-hosts.
//!
//! These types sit between the container runtime and the hosts file.
//! A [`ContainerDescriptor`] is what the runtime reports about one
//! container, an [`Entry`] is one hosts line derived from it, and a
//! [`ContainerEvent`] is a single lifecycle notification from the
//! runtime's event stream.

use std::collections::{BTreeMap, BTreeSet};

/// Raw metadata for one container as reported by the runtime.
///
/// Optional fields in the runtime's inspection record are flattened to
/// empty strings / collections here; the extractor treats "empty" and
/// "absent" the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerDescriptor {
    /// Runtime-assigned identifier, used as the index key.
    pub id: String,
    /// Container name as reported, usually with a leading `/`.
    pub name: String,
    /// Configured hostname.
    pub hostname: String,
    /// Configured domain suffix, empty when unset.
    pub domainname: String,
    /// Primary IP address on the default bridge, empty when unset.
    pub ip_address: String,
    /// Attached networks keyed by network name.
    pub networks: BTreeMap<String, NetworkEndpoint>,
}

/// A container's attachment to one network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkEndpoint {
    pub ip_address: String,
    pub aliases: Vec<String>,
}

/// One address → names mapping derived from a descriptor.
///
/// `domains` always contains `owner_name`. Labels are stored without the
/// top-level domain; the suffix is applied when the hosts block is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub address: String,
    pub owner_name: String,
    pub domains: BTreeSet<String>,
}

/// A lifecycle notification from the runtime's event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerEvent {
    /// Object type the event refers to (`container`, `network`, ...).
    pub typ: String,
    /// Action name such as `start` or `die`.
    pub status: String,
    /// Identifier of the object the event refers to.
    pub id: String,
}

/// What an event means for the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    /// Re-inspect and (re)insert the container.
    Start,
    /// Drop the container from the index.
    Remove,
    /// Same handling as [`EventAction::Start`]; the name changed.
    Rename,
}

impl ContainerEvent {
    pub fn new(typ: impl Into<String>, status: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            typ: typ.into(),
            status: status.into(),
            id: id.into(),
        }
    }

    /// Shorthand for an event whose type is `container`.
    pub fn container(status: impl Into<String>, id: impl Into<String>) -> Self {
        Self::new("container", status, id)
    }

    /// Classifies the event, or returns `None` if it should be ignored.
    pub fn action(&self) -> Option<EventAction> {
        if self.typ != "container" {
            return None;
        }
        match self.status.as_str() {
            "start" => Some(EventAction::Start),
            "stop" | "die" | "destroy" | "kill" => Some(EventAction::Remove),
            "rename" => Some(EventAction::Rename),
            _ => None,
        }
    }
}
