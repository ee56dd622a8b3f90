//! End-to-end tests for `docker-hosts` against an in-memory runtime.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream, StreamExt};

use docker_hosts::hosts_file::{END_MARKER, START_MARKER};
use docker_hosts::{
    ContainerDescriptor, ContainerEvent, ContainerRuntime, Error, HostsFile, HostsWatcher,
    NetworkEndpoint, RuntimeError,
};

// ---------------------------------------------------------------------------
// Mock runtime
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MockRuntime {
    running: Vec<ContainerDescriptor>,
    inspectable: HashMap<String, ContainerDescriptor>,
    events: Vec<ContainerEvent>,
    fail_stream: bool,
}

impl MockRuntime {
    /// Containers that are both listed and inspectable.
    fn with_running(mut self, containers: Vec<ContainerDescriptor>) -> Self {
        for c in &containers {
            self.inspectable.insert(c.id.clone(), c.clone());
        }
        self.running = containers;
        self
    }

    /// Containers that only show up through inspection (started later).
    fn with_inspectable(mut self, container: ContainerDescriptor) -> Self {
        self.inspectable.insert(container.id.clone(), container);
        self
    }

    fn with_events(mut self, events: Vec<ContainerEvent>) -> Self {
        self.events = events;
        self
    }

    fn with_failing_stream(mut self) -> Self {
        self.fail_stream = true;
        self
    }
}

#[async_trait]
impl ContainerRuntime for MockRuntime {
    async fn list_running(&self) -> Result<Vec<ContainerDescriptor>, RuntimeError> {
        Ok(self.running.clone())
    }

    async fn inspect(&self, id: &str) -> Result<ContainerDescriptor, RuntimeError> {
        self.inspectable
            .get(id)
            .cloned()
            .ok_or_else(|| RuntimeError::NotFound(id.to_string()))
    }

    fn events(&self) -> BoxStream<'_, Result<ContainerEvent, RuntimeError>> {
        let events = stream::iter(self.events.clone().into_iter().map(Ok));
        if !self.fail_stream {
            return events.boxed();
        }
        events
            .chain(stream::once(async {
                Err(RuntimeError::Docker(
                    bollard::errors::Error::DockerResponseServerError {
                        status_code: 500,
                        message: "connection reset".into(),
                    },
                ))
            }))
            .boxed()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn container(id: &str, name: &str, ip: &str) -> ContainerDescriptor {
    ContainerDescriptor {
        id: id.into(),
        name: format!("/{name}"),
        hostname: name.into(),
        ip_address: ip.into(),
        ..Default::default()
    }
}

fn hosts_with(content: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hosts");
    fs::write(&path, content).unwrap();
    (dir, path)
}

const PREFIX: &str = "127.0.0.1    localhost\n";

// ---------------------------------------------------------------------------
// One-shot pass
// ---------------------------------------------------------------------------

#[tokio::test]
async fn initial_scan_writes_block() {
    let (_dir, path) = hosts_with(PREFIX);
    let mut postgres = container("c1", "postgres", "172.17.0.2");
    postgres.networks.insert(
        "backend".into(),
        NetworkEndpoint {
            ip_address: "10.0.0.2".into(),
            aliases: vec!["db".into()],
        },
    );
    let runtime = MockRuntime::default().with_running(vec![postgres]);
    let mut watcher = HostsWatcher::new(runtime, HostsFile::new(&path, "test"));

    watcher.initialize().await.unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert_eq!(
        written,
        format!(
            "{PREFIX}\n\n{START_MARKER}\
             10.0.0.2    db.test   postgres.test\n\
             172.17.0.2    postgres.test\n\
             {END_MARKER}\n"
        )
    );
}

#[tokio::test]
async fn initial_scan_without_containers_keeps_file() {
    let (_dir, path) = hosts_with(PREFIX);
    let mut watcher = HostsWatcher::new(MockRuntime::default(), HostsFile::new(&path, "localhost"));

    watcher.initialize().await.unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), PREFIX);
}

#[tokio::test]
async fn initial_scan_fails_on_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing");
    let runtime = MockRuntime::default().with_running(vec![container("c1", "web", "172.17.0.2")]);
    let mut watcher = HostsWatcher::new(runtime, HostsFile::new(&path, "localhost"));

    let err = watcher.initialize().await.unwrap_err();

    assert!(matches!(err, Error::Read { .. }));
    assert!(!path.exists());
}

#[tokio::test]
async fn dry_run_never_touches_file() {
    let (_dir, path) = hosts_with(PREFIX);
    let runtime = MockRuntime::default()
        .with_running(vec![container("c1", "web", "172.17.0.2")])
        .with_inspectable(container("c2", "api", "172.17.0.3"))
        .with_events(vec![ContainerEvent::container("start", "c2")]);
    let hosts = HostsFile::new(&path, "localhost").with_dry_run(true);
    let mut watcher = HostsWatcher::new(runtime, hosts);

    watcher.initialize().await.unwrap();
    let _ = watcher.listen().await;

    assert_eq!(watcher.index().len(), 2);
    assert_eq!(fs::read_to_string(&path).unwrap(), PREFIX);
}

// ---------------------------------------------------------------------------
// Event handling
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stop_family_removes_tracked_container() {
    for status in ["stop", "die", "destroy", "kill"] {
        let (_dir, path) = hosts_with(PREFIX);
        let runtime = MockRuntime::default().with_running(vec![
            container("c1", "web", "172.17.0.2"),
            container("c2", "db", "172.17.0.3"),
        ]);
        let mut watcher = HostsWatcher::new(runtime, HostsFile::new(&path, "localhost"));
        watcher.initialize().await.unwrap();

        watcher
            .handle_event(&ContainerEvent::container(status, "c1"))
            .await
            .unwrap();
        // A repeated event for the same, now untracked, container is a no-op.
        watcher
            .handle_event(&ContainerEvent::container(status, "c1"))
            .await
            .unwrap();

        assert!(!watcher.index().contains("c1"), "{status}");
        let written = fs::read_to_string(&path).unwrap();
        assert!(!written.contains("web.localhost"), "{status}");
        assert!(written.contains("db.localhost"), "{status}");
    }
}

#[tokio::test]
async fn removing_last_container_drops_block() {
    let (_dir, path) = hosts_with(PREFIX);
    let runtime = MockRuntime::default().with_running(vec![container("c1", "web", "172.17.0.2")]);
    let mut watcher = HostsWatcher::new(runtime, HostsFile::new(&path, "localhost"));
    watcher.initialize().await.unwrap();

    watcher
        .handle_event(&ContainerEvent::container("die", "c1"))
        .await
        .unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), PREFIX);
}

#[tokio::test]
async fn rename_of_unknown_container_acts_like_start() {
    let (_dir, path) = hosts_with(PREFIX);
    let runtime = MockRuntime::default().with_inspectable(container("c9", "renamed", "172.17.0.9"));
    let mut watcher = HostsWatcher::new(runtime, HostsFile::new(&path, "localhost"));

    watcher
        .handle_event(&ContainerEvent::container("rename", "c9"))
        .await
        .unwrap();

    let entries = watcher.index().get("c9").unwrap();
    assert_eq!(entries[0].owner_name, "renamed");
    assert!(fs::read_to_string(&path)
        .unwrap()
        .contains("172.17.0.9    renamed.localhost"));
}

#[tokio::test]
async fn rename_replaces_previous_entries() {
    let (_dir, path) = hosts_with(PREFIX);
    let mut renamed = container("c1", "after", "172.17.0.2");
    renamed.hostname = "before".into();
    let mut runtime = MockRuntime::default().with_running(vec![container("c1", "before", "172.17.0.2")]);
    runtime.inspectable.insert("c1".into(), renamed);
    let mut watcher = HostsWatcher::new(runtime, HostsFile::new(&path, "localhost"));
    watcher.initialize().await.unwrap();

    watcher
        .handle_event(&ContainerEvent::container("rename", "c1"))
        .await
        .unwrap();

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("172.17.0.2    after.localhost   before.localhost\n"));
    assert_eq!(written.matches("172.17.0.2").count(), 1);
}

#[tokio::test]
async fn start_for_vanished_container_untracks_it() {
    let (_dir, path) = hosts_with(PREFIX);
    let mut watcher = HostsWatcher::new(MockRuntime::default(), HostsFile::new(&path, "localhost"));

    watcher
        .handle_event(&ContainerEvent::container("start", "gone"))
        .await
        .unwrap();

    assert!(!watcher.index().contains("gone"));
    assert_eq!(fs::read_to_string(&path).unwrap(), PREFIX);
}

#[tokio::test]
async fn non_container_events_are_ignored() {
    let (_dir, path) = hosts_with(PREFIX);
    let runtime = MockRuntime::default().with_inspectable(container("n1", "net", "172.17.0.2"));
    let mut watcher = HostsWatcher::new(runtime, HostsFile::new(&path, "localhost"));

    watcher
        .handle_event(&ContainerEvent::new("network", "start", "n1"))
        .await
        .unwrap();
    watcher
        .handle_event(&ContainerEvent::container("pause", "n1"))
        .await
        .unwrap();

    assert!(watcher.index().is_empty());
}

// ---------------------------------------------------------------------------
// Listen loop
// ---------------------------------------------------------------------------

#[tokio::test]
async fn listen_applies_events_in_order() {
    let (_dir, path) = hosts_with(PREFIX);
    let runtime = MockRuntime::default()
        .with_inspectable(container("c1", "web", "172.17.0.2"))
        .with_inspectable(container("c2", "db", "172.17.0.3"))
        .with_events(vec![
            ContainerEvent::container("start", "c1"),
            ContainerEvent::container("start", "c2"),
            ContainerEvent::container("stop", "c1"),
            ContainerEvent::container("die", "c1"),
        ]);
    let mut watcher = HostsWatcher::new(runtime, HostsFile::new(&path, "localhost"));

    let err = watcher.listen().await.unwrap_err();

    assert!(matches!(err, Error::Runtime(RuntimeError::StreamEnded)));
    assert!(!watcher.index().contains("c1"));
    assert!(watcher.index().contains("c2"));
    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("db.localhost"));
    assert!(!written.contains("web.localhost"));
}

#[tokio::test]
async fn listen_stops_on_stream_error() {
    let (_dir, path) = hosts_with(PREFIX);
    let runtime = MockRuntime::default()
        .with_inspectable(container("c1", "web", "172.17.0.2"))
        .with_events(vec![ContainerEvent::container("start", "c1")])
        .with_failing_stream();
    let mut watcher = HostsWatcher::new(runtime, HostsFile::new(&path, "localhost"));

    let err = watcher.listen().await.unwrap_err();

    assert!(matches!(err, Error::Runtime(RuntimeError::Docker(_))));
    assert!(watcher.index().contains("c1"));
}

#[tokio::test]
async fn listen_survives_failed_reconciliation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing");
    let runtime = MockRuntime::default()
        .with_inspectable(container("c1", "web", "172.17.0.2"))
        .with_inspectable(container("c2", "db", "172.17.0.3"))
        .with_events(vec![
            ContainerEvent::container("start", "c1"),
            ContainerEvent::container("start", "c2"),
        ]);
    let mut watcher = HostsWatcher::new(runtime, HostsFile::new(&path, "localhost"));

    let err = watcher.listen().await.unwrap_err();

    assert!(matches!(err, Error::Runtime(RuntimeError::StreamEnded)));
    assert_eq!(watcher.index().len(), 2);
    assert!(!path.exists());
}
