//! Derives hosts entries from container metadata.
//!
//! Everything here is pure: no I/O, no state. Missing or empty optional
//! fields never fail, they just contribute fewer entries.

use std::collections::BTreeSet;

use crate::types::{ContainerDescriptor, Entry};

/// Returns `hostname.domainname`, or just `hostname` when no domain is set.
pub fn build_owner_hostname(hostname: &str, domainname: &str) -> String {
    if domainname.is_empty() {
        return hostname.to_string();
    }
    format!("{hostname}.{domainname}")
}

/// Strips the single leading `/` the runtime puts in front of container names.
pub fn owner_name(raw: &str) -> &str {
    raw.strip_prefix('/').unwrap_or(raw)
}

/// Turns one descriptor into its hosts entries.
///
/// One entry is emitted per network that carries aliases, followed by one
/// entry for the primary IP address if the container has one. The same
/// address may appear twice; entries are not deduplicated by address.
pub fn extract(descriptor: &ContainerDescriptor) -> Vec<Entry> {
    let owner = owner_name(&descriptor.name).to_string();
    let owner_hostname = build_owner_hostname(&descriptor.hostname, &descriptor.domainname);

    let common: BTreeSet<String> = [owner.clone(), owner_hostname]
        .into_iter()
        .filter(|d| !d.is_empty())
        .collect();

    let mut entries = Vec::new();

    for endpoint in descriptor.networks.values() {
        if endpoint.aliases.is_empty() || endpoint.ip_address.is_empty() {
            continue;
        }
        let mut domains = common.clone();
        domains.extend(endpoint.aliases.iter().filter(|a| !a.is_empty()).cloned());
        entries.push(Entry {
            address: endpoint.ip_address.clone(),
            owner_name: owner.clone(),
            domains,
        });
    }

    if !descriptor.ip_address.is_empty() {
        entries.push(Entry {
            address: descriptor.ip_address.clone(),
            owner_name: owner,
            domains: common,
        });
    }

    entries
}
