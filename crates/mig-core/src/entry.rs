//! Structured view of the migration files in one directory.

use crate::checksum::compute_checksum;
use crate::describe::ProjectInfo;
use crate::error::{CoreError, CoreResult};
use crate::naming::{split_migration_name, Direction};
use crate::provenance::{self, Provenance};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// `(base name, direction)`, unique within a directory
pub type EntryKey = (String, Direction);

/// Entries of one directory, ordered by key
pub type EntryMap = BTreeMap<EntryKey, MigrationEntry>;

/// One migration script on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationEntry {
    /// Metadata of the tree the file belongs to
    pub info: ProjectInfo,
    /// File name without the direction suffix
    pub base_name: String,
    pub direction: Direction,
    pub path: PathBuf,
    /// Checksum of the original (pre-header) content
    pub checksum: String,
    /// Parsed provenance header; empty when the file has none
    pub provenance: Provenance,
}

impl MigrationEntry {
    /// Build an entry from a file's bytes
    pub fn from_bytes(
        info: ProjectInfo,
        base_name: &str,
        direction: Direction,
        path: PathBuf,
        bytes: &[u8],
    ) -> Self {
        let provenance = provenance::parse(bytes);
        let checksum = if provenance.checksum.is_empty() {
            compute_checksum(bytes)
        } else {
            provenance.checksum.clone()
        };
        Self {
            info,
            base_name: base_name.to_string(),
            direction,
            path,
            checksum,
            provenance,
        }
    }

    pub fn key(&self) -> EntryKey {
        (self.base_name.clone(), self.direction)
    }

    pub fn file_name(&self) -> String {
        self.direction.file_name(&self.base_name)
    }

    /// Checksum recorded in the provenance header, empty if none
    pub fn stored_checksum(&self) -> &str {
        &self.provenance.checksum
    }

    /// Base name this entry takes in the catalog.
    ///
    /// `<project>-<version>-<release>-<base>`, unless the base already
    /// carries that prefix or no project metadata is known.
    pub fn catalog_base_name(&self) -> String {
        if self.info.is_empty() {
            return self.base_name.clone();
        }
        let prefix = format!("{}-", self.info.prefix());
        if self.base_name.starts_with(&prefix) {
            self.base_name.clone()
        } else {
            format!("{}{}", prefix, self.base_name)
        }
    }

    /// Key of the catalog entry this file maps to
    pub fn catalog_key(&self) -> EntryKey {
        (self.catalog_base_name(), self.direction)
    }

    pub fn catalog_file_name(&self) -> String {
        self.direction.file_name(&self.catalog_base_name())
    }
}

/// Scan the migration files directly inside `dir`.
///
/// Files without a migration suffix and subdirectories are skipped (naming
/// is checked separately). A missing directory yields an empty map.
pub fn scan_entries(dir: &Path, info: &ProjectInfo) -> CoreResult<EntryMap> {
    let mut entries = EntryMap::new();
    let read = match std::fs::read_dir(dir) {
        Ok(read) => read,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(entries),
        Err(e) => return Err(CoreError::io(dir, e)),
    };

    for item in read {
        let item = item.map_err(|e| CoreError::io(dir, e))?;
        if item.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        let name = item.file_name().to_string_lossy().into_owned();
        let Some((base, direction)) = split_migration_name(&name) else {
            continue;
        };
        let path = item.path();
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Cannot read {}: {}", path.display(), e);
                continue;
            }
        };
        let entry = MigrationEntry::from_bytes(info.clone(), base, direction, path, &bytes);
        entries.insert(entry.key(), entry);
    }
    Ok(entries)
}

#[cfg(test)]
#[path = "entry_test.rs"]
mod tests;
