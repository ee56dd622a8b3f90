//! Event-driven synchronisation of the hosts file.
//!
//! [`HostsWatcher`] owns the index for the lifetime of the process. Events
//! are applied one at a time in arrival order: the index is patched, then
//! the hosts file is reconciled, before the next event is pulled from the
//! stream.

use futures_util::StreamExt;
use log::{debug, error, info, warn};

use crate::error::Result;
use crate::hosts_file::HostsFile;
use crate::index::HostsIndex;
use crate::runtime::{ContainerRuntime, RuntimeError};
use crate::types::{ContainerEvent, EventAction};

pub struct HostsWatcher<R> {
    runtime: R,
    index: HostsIndex,
    hosts_file: HostsFile,
}

impl<R: ContainerRuntime> HostsWatcher<R> {
    pub fn new(runtime: R, hosts_file: HostsFile) -> Self {
        Self {
            runtime,
            index: HostsIndex::new(),
            hosts_file,
        }
    }

    pub fn index(&self) -> &HostsIndex {
        &self.index
    }

    pub fn hosts_file(&self) -> &HostsFile {
        &self.hosts_file
    }

    /// Loads every running container and reconciles the file once.
    pub async fn initialize(&mut self) -> Result<()> {
        let descriptors = self.runtime.list_running().await?;
        self.index.load_snapshot(descriptors);
        self.hosts_file.reconcile(&self.index)
    }

    /// Applies a single event.
    ///
    /// Returns an error only when the resulting reconciliation fails; the
    /// index has already been updated at that point.
    pub async fn handle_event(&mut self, event: &ContainerEvent) -> Result<()> {
        apply_event(&self.runtime, &mut self.index, &self.hosts_file, event).await
    }

    /// Consumes the runtime's event stream until it fails or ends.
    ///
    /// A failed reconciliation is logged and the loop moves on to the next
    /// event. The stream ending is reported as [`RuntimeError::StreamEnded`].
    pub async fn listen(&mut self) -> Result<()> {
        let mut events = self.runtime.events();
        while let Some(event) = events.next().await {
            let event = event?;
            let res = apply_event(&self.runtime, &mut self.index, &self.hosts_file, &event).await;
            if let Err(e) = res {
                error!(
                    "Failed to update hosts file after {} of {}: {}",
                    event.status, event.id, e
                );
            }
        }
        warn!("Docker event stream ended");
        Err(RuntimeError::StreamEnded.into())
    }
}

async fn apply_event<R: ContainerRuntime>(
    runtime: &R,
    index: &mut HostsIndex,
    hosts_file: &HostsFile,
    event: &ContainerEvent,
) -> Result<()> {
    let Some(action) = event.action() else {
        return Ok(());
    };
    if event.id.is_empty() {
        debug!("Ignoring {} event without a container id", event.status);
        return Ok(());
    }
    debug!("Container event: {} for {}", event.status, event.id);

    match action {
        EventAction::Start | EventAction::Rename => match runtime.inspect(&event.id).await {
            Ok(descriptor) => {
                let count = index.insert(&descriptor);
                info!(
                    "Container {} ({}): tracking {} entries",
                    event.status, descriptor.name, count
                );
            }
            Err(RuntimeError::NotFound(_)) => {
                info!("Container {} is gone, dropping it", event.id);
                index.remove(&event.id);
            }
            Err(e) => {
                warn!("Failed to inspect container {}: {}", event.id, e);
                return Ok(());
            }
        },
        EventAction::Remove => {
            if index.remove(&event.id).is_some() {
                info!("Container {}: {}", event.status, event.id);
            }
        }
    }

    hosts_file.reconcile(index)
}
