//! Registry builder: raw probe output to a sorted, deduplicated snapshot.

use std::collections::{HashMap, HashSet};

use tracing::{debug, error, warn};

use crate::adapters::{parse_listening, CommandProbe, SystemMetadata};
use crate::domain::{DevPorts, ListeningSocket, ProcessMetadata, ProcessRecord};
use crate::ports::{MetadataSource, SocketProbe};

/// Builds registry snapshots from a socket probe and a metadata source.
///
/// Every call rescans from scratch; nothing is cached between snapshots.
pub struct RegistryBuilder<P: SocketProbe, M: MetadataSource> {
    probe: P,
    metadata: M,
    dev_ports: DevPorts,
}

impl RegistryBuilder<CommandProbe, SystemMetadata> {
    /// Builder backed by the OS tools of the current platform.
    pub fn system() -> Self {
        Self::new(CommandProbe::new(), SystemMetadata::new())
    }
}

impl<P: SocketProbe, M: MetadataSource> RegistryBuilder<P, M> {
    pub fn new(probe: P, metadata: M) -> Self {
        Self {
            probe,
            metadata,
            dev_ports: DevPorts::default(),
        }
    }

    /// Replace the development port set used when `include_all` is false.
    pub fn with_dev_ports(mut self, dev_ports: DevPorts) -> Self {
        self.dev_ports = dev_ports;
        self
    }

    pub fn dev_ports(&self) -> &DevPorts {
        &self.dev_ports
    }

    /// Build a registry snapshot.
    ///
    /// A probe failure is logged and yields an empty snapshot. Records are
    /// unique by `(port, pid)` and sorted by port, ties in discovery order.
    pub async fn build(&self, include_all: bool) -> Vec<ProcessRecord> {
        let lines = match self.probe.list_listening_sockets().await {
            Ok(lines) => lines,
            Err(e) => {
                error!(error = %e, "Port probe failed");
                return Vec::new();
            }
        };

        let sockets = dedup_sockets(parse_listening(self.probe.platform(), &lines));
        let sockets: Vec<ListeningSocket> = if include_all {
            sockets
        } else {
            sockets
                .into_iter()
                .filter(|s| self.dev_ports.contains(s.port))
                .collect()
        };

        let mut pids: Vec<u32> = Vec::new();
        for socket in &sockets {
            if !pids.contains(&socket.pid) {
                pids.push(socket.pid);
            }
        }
        let metadata = self.resolve_metadata(&pids).await;

        let mut records: Vec<ProcessRecord> = sockets
            .into_iter()
            .map(|socket| {
                let meta = metadata.get(&socket.pid);
                let name = meta
                    .and_then(|m| m.name.clone())
                    .or(socket.process_name)
                    .unwrap_or_default();
                let record = ProcessRecord::new(socket.port, socket.pid, name);
                match meta.and_then(|m| m.full_command.as_deref()) {
                    Some(full) => record.with_full_command(full),
                    None => record,
                }
            })
            .collect();

        // sort_by_key is stable, so equal ports keep discovery order
        records.sort_by_key(|r| r.port);

        debug!(
            records = records.len(),
            include_all = include_all,
            "Registry built"
        );
        records
    }

    /// Find the first record listening on `port`, searching all ports.
    pub async fn find_by_port(&self, port: u16) -> Option<ProcessRecord> {
        self.build(true).await.into_iter().find(|r| r.port == port)
    }

    /// Batch lookup with a per-pid fallback when the batch query fails.
    async fn resolve_metadata(&self, pids: &[u32]) -> HashMap<u32, ProcessMetadata> {
        if pids.is_empty() {
            return HashMap::new();
        }

        match self.metadata.query_batch(pids).await {
            Ok(found) => return found,
            Err(e) => warn!(error = %e, "Batch metadata query failed, querying per process"),
        }

        let mut found = HashMap::new();
        for &pid in pids {
            match self.metadata.query_one(pid).await {
                Ok(meta) => {
                    found.insert(pid, meta);
                }
                Err(e) => debug!(pid = pid, error = %e, "No metadata for process"),
            }
        }
        found
    }
}

/// Keep the first occurrence of every `(port, pid)` pair.
fn dedup_sockets(sockets: Vec<ListeningSocket>) -> Vec<ListeningSocket> {
    let mut seen = HashSet::new();
    sockets
        .into_iter()
        .filter(|s| seen.insert((s.port, s.pid)))
        .collect()
}
