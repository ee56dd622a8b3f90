//! In-memory index of the entries that belong in the managed hosts block.

use std::collections::BTreeMap;

use log::debug;

use crate::extract::extract;
use crate::types::{ContainerDescriptor, Entry};

/// Maps container identity to the entries extracted from it.
///
/// A container that yields no entries is never stored, so a key present in
/// the index always has at least one entry. Keys are ordered, which keeps the
/// rendered block stable between passes.
#[derive(Debug, Clone, Default)]
pub struct HostsIndex {
    containers: BTreeMap<String, Vec<Entry>>,
}

impl HostsIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole index with entries from a fresh listing.
    pub fn load_snapshot<I>(&mut self, descriptors: I)
    where
        I: IntoIterator<Item = ContainerDescriptor>,
    {
        self.containers.clear();
        for descriptor in descriptors {
            self.insert(&descriptor);
        }
        debug!("Index loaded with {} containers", self.containers.len());
    }

    /// Inserts or overwrites the entries for `descriptor.id`.
    ///
    /// Returns the number of entries now tracked for the container. When
    /// nothing could be extracted the container becomes untracked.
    pub fn insert(&mut self, descriptor: &ContainerDescriptor) -> usize {
        let entries = extract(descriptor);
        if entries.is_empty() {
            self.containers.remove(&descriptor.id);
            return 0;
        }
        let count = entries.len();
        self.containers.insert(descriptor.id.clone(), entries);
        count
    }

    /// Drops a container. Unknown identities are ignored.
    pub fn remove(&mut self, id: &str) -> Option<Vec<Entry>> {
        self.containers.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&[Entry]> {
        self.containers.get(id).map(Vec::as_slice)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.containers.contains_key(id)
    }

    /// Iterates over every entry of every tracked container.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.containers.values().flatten()
    }

    /// Number of tracked containers.
    pub fn len(&self) -> usize {
        self.containers.len()
    }

    /// `true` when there is nothing to render.
    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }
}
