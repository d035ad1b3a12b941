use super::types::{ClusterEntry, MembershipRecord, TableDefinition};
use crate::error::StoreError;
use crate::tables::REQUIRED_TABLES;

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_STATE_PATH: &str = "/var/lib/manticore/manticore.json";

/// Owns the persisted membership record.
///
/// Reads once at start-up and rewrites the whole file only when the member set changes.
pub struct MembershipStore {
    path: PathBuf,
    record: MembershipRecord,
}

impl MembershipStore {
    /// Opens the store and loads whatever is on disk.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut store = Self {
            path: path.into(),
            record: MembershipRecord::default(),
        };
        store.load();
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-reads the backing file. A missing or unreadable file yields an empty record.
    pub fn load(&mut self) -> &MembershipRecord {
        self.record = read_record(&self.path);
        &self.record
    }

    pub fn record(&self) -> &MembershipRecord {
        &self.record
    }

    pub fn has_cluster(&self, cluster_name: &str) -> bool {
        !self.record.members(cluster_name).is_empty()
    }

    pub fn current_members(&self, cluster_name: &str) -> Vec<String> {
        self.record.members(cluster_name).to_vec()
    }

    /// Replaces the member list of `cluster_name` when `addresses` is non-empty and
    /// differs from the stored list as a set.
    ///
    /// Returns whether the file was rewritten.
    pub fn update_members(
        &mut self,
        cluster_name: &str,
        addresses: &[String],
    ) -> Result<bool, StoreError> {
        let mut seen = HashSet::new();
        let nodes: Vec<String> = addresses
            .iter()
            .filter(|address| seen.insert(address.as_str()))
            .cloned()
            .collect();

        if nodes.is_empty() {
            tracing::debug!(
                "No available nodes for cluster {}, keeping stored list",
                cluster_name
            );
            return Ok(false);
        }

        let stored: HashSet<&str> = self
            .record
            .members(cluster_name)
            .iter()
            .map(String::as_str)
            .collect();
        if stored == seen {
            tracing::debug!("Nodes list of cluster {} unchanged", cluster_name);
            return Ok(false);
        }

        let mut next = self.record.clone();
        let entry = next
            .clusters
            .entry(cluster_name.to_string())
            .or_insert_with(|| ClusterEntry {
                indexes: REQUIRED_TABLES
                    .iter()
                    .map(|(name, _)| name.to_string())
                    .collect(),
                ..ClusterEntry::default()
            });
        entry.nodes = nodes;

        for (name, kind) in REQUIRED_TABLES {
            next.indexes
                .entry(name.to_string())
                .or_insert_with(|| TableDefinition {
                    kind,
                    path: name.to_string(),
                });
        }

        write_record(&self.path, &next)?;
        tracing::info!(
            "Updated nodes list of cluster {}: {}",
            cluster_name,
            next.members(cluster_name).join(",")
        );
        self.record = next;

        Ok(true)
    }
}

fn read_record(path: &Path) -> MembershipRecord {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::debug!("No membership file at {}: {}", path.display(), e);
            return MembershipRecord::default();
        }
    };

    match serde_json::from_str(&contents) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(
                "Membership file {} is malformed, starting empty: {}",
                path.display(),
                e
            );
            MembershipRecord::default()
        }
    }
}

/// Writes to a temporary file in the same directory, then renames it over `path`.
fn write_record(path: &Path, record: &MembershipRecord) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let json = serde_json::to_string_pretty(record)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(json.as_bytes())?;
    // Temp files are created 0600; keep the mode of the file being replaced.
    let permissions = match std::fs::metadata(path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(_) => new_file_permissions(),
    };
    if let Some(permissions) = permissions {
        tmp.as_file().set_permissions(permissions)?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    Ok(())
}

#[cfg(unix)]
fn new_file_permissions() -> Option<std::fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(std::fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<std::fs::Permissions> {
    None
}
