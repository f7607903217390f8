//! Catalog synchronization (`collect`).
//!
//! Submodule migrations are copied into the catalog under
//! `<project>-<version>-<release>-<base>` names with a provenance header.
//! A catalog entry is rewritten when the submodule's checksum differs from
//! the one recorded in its header, and removed once no submodule provides
//! its key any more.

use mig_core::provenance::{tagged_contents, Provenance};
use mig_core::{
    scan_entries, CoreError, CoreResult, Describe, EntryKey, IncludeResolver, Layout,
    MigrationEntry, ProjectInfo, SubmoduleSource,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::relative_to;

/// Options for a synchronization pass
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Report what would change without touching the filesystem
    pub dry_run: bool,
}

/// One change applied (or planned) to the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", content = "file", rename_all = "lowercase")]
pub enum SyncAction {
    Add(String),
    Update(String),
    Delete(String),
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncAction::Add(name) => write!(f, "[add] {}", name),
            SyncAction::Update(name) => write!(f, "[update] {}", name),
            SyncAction::Delete(name) => write!(f, "[delete] {}", name),
        }
    }
}

/// A file that was skipped because reading, writing or removing it failed
#[derive(Debug, Clone, Serialize)]
pub struct SyncFailure {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[skip] {}: {}", self.path.display(), self.message)
    }
}

/// Outcome of a synchronization pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncSummary {
    pub added: usize,
    pub updated: usize,
    pub deleted: usize,
    pub actions: Vec<SyncAction>,
    pub failures: Vec<SyncFailure>,
    /// Submodules that could not be described or scanned
    pub source_errors: Vec<String>,
    /// Deletion is suppressed when any submodule was skipped
    pub deletion_skipped: bool,
    pub dry_run: bool,
}

impl SyncSummary {
    pub fn summary_line(&self) -> String {
        format!(
            "[ok] collected: added {}, updated {}, deleted {} file(s)",
            self.added, self.updated, self.deleted
        )
    }

    fn fail(&mut self, path: &Path, message: impl fmt::Display) {
        log::warn!("Skipping {}: {}", path.display(), message);
        self.failures.push(SyncFailure {
            path: path.to_path_buf(),
            message: message.to_string(),
        });
    }
}

/// Copy new and changed submodule migrations into the catalog and delete
/// catalog entries no submodule provides any more.
///
/// Per-file failures are recorded and skipped. Only a catalog that cannot be
/// read or created aborts the pass.
pub fn synchronize(
    layout: &Layout,
    sources: &[SubmoduleSource],
    describe: &dyn Describe,
    options: SyncOptions,
) -> CoreResult<SyncSummary> {
    let mut summary = SyncSummary {
        dry_run: options.dry_run,
        ..SyncSummary::default()
    };

    let catalog = scan_entries(&layout.catalog_dir, &ProjectInfo::default())?;
    let submodule_entries = gather_submodule_entries(sources, describe, &mut summary);

    if !options.dry_run {
        fs::create_dir_all(&layout.catalog_dir)
            .map_err(|e| CoreError::io(&layout.catalog_dir, e))?;
    }

    // Same catalog key from several submodules: the first listed one wins,
    // whether or not it needs copying on this pass.
    let mut claimed: BTreeMap<EntryKey, &str> = BTreeMap::new();
    for (source_path, entry) in &submodule_entries {
        let key = entry.catalog_key();
        if let Some(first) = claimed.get(&key) {
            log::warn!(
                "{} from {} is also provided by {}; keeping the first",
                entry.catalog_file_name(),
                source_path,
                first
            );
            continue;
        }
        claimed.insert(key.clone(), source_path);

        let action = match catalog.get(&key) {
            None => SyncAction::Add(entry.catalog_file_name()),
            Some(existing)
                if !entry.checksum.is_empty() && entry.checksum != existing.stored_checksum() =>
            {
                SyncAction::Update(entry.catalog_file_name())
            }
            Some(_) => continue,
        };

        if !options.dry_run && !copy_entry(layout, entry, &mut summary) {
            continue;
        }
        match action {
            SyncAction::Add(_) => summary.added += 1,
            SyncAction::Update(_) => summary.updated += 1,
            SyncAction::Delete(_) => {}
        }
        summary.actions.push(action);
    }

    if !summary.source_errors.is_empty() {
        log::warn!(
            "Not deleting catalog entries: {} submodule(s) could not be read",
            summary.source_errors.len()
        );
        summary.deletion_skipped = true;
        return Ok(summary);
    }

    for (key, entry) in &catalog {
        if claimed.contains_key(key) {
            continue;
        }
        if !options.dry_run {
            if let Err(e) = fs::remove_file(&entry.path) {
                summary.fail(&entry.path, e);
                continue;
            }
        }
        summary.deleted += 1;
        summary.actions.push(SyncAction::Delete(entry.file_name()));
    }

    Ok(summary)
}

/// Scan every describable submodule. Entries keep the listing order of
/// `sources`, tagged with the submodule path they came from.
fn gather_submodule_entries(
    sources: &[SubmoduleSource],
    describe: &dyn Describe,
    summary: &mut SyncSummary,
) -> Vec<(String, MigrationEntry)> {
    let mut all = Vec::new();
    for source in sources {
        let script = match &source.describe_script {
            Ok(script) => script,
            Err(message) => {
                log::warn!("{}", message);
                summary.source_errors.push(message.clone());
                continue;
            }
        };
        let scanned = describe
            .project_info(script)
            .and_then(|info| scan_entries(&source.migrations_dir, &info));
        match scanned {
            Ok(entries) => {
                all.extend(
                    entries
                        .into_values()
                        .map(|entry| (source.path.clone(), entry)),
                );
            }
            Err(e) => {
                let message = format!("submodule {}: {}", source.path, e);
                log::warn!("{}", message);
                summary.source_errors.push(message);
            }
        }
    }
    all
}

/// Write `entry` into the catalog with a provenance header, then bring along
/// its includes. Returns false when the migration itself could not be copied.
fn copy_entry(layout: &Layout, entry: &MigrationEntry, summary: &mut SyncSummary) -> bool {
    let source = match fs::read(&entry.path) {
        Ok(bytes) => bytes,
        Err(e) => {
            summary.fail(&entry.path, e);
            return false;
        }
    };
    let provenance = Provenance {
        origin: relative_to(&layout.root, &entry.path).display().to_string(),
        checksum: entry.checksum.clone(),
    };
    let target = layout.catalog_dir.join(entry.catalog_file_name());
    if let Err(e) = fs::write(&target, tagged_contents(&source, &provenance)) {
        summary.fail(&target, e);
        return false;
    }

    copy_includes(entry, &layout.catalog_dir, summary);
    true
}

/// Copy every script `entry` includes into `target_dir` under the same
/// relative path. Existing files are never overwritten.
fn copy_includes(entry: &MigrationEntry, target_dir: &Path, summary: &mut SyncSummary) {
    let graph = match IncludeResolver::resolve_once(&entry.path) {
        Ok(graph) => graph,
        Err(e) => {
            summary.fail(&entry.path, e);
            return;
        }
    };
    let source_dir = entry.path.parent().unwrap_or_else(|| Path::new(""));

    for rel in &graph.includes {
        let dst = target_dir.join(rel);
        if dst.exists() {
            continue;
        }
        let src = source_dir.join(rel);
        if let Some(parent) = dst.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                summary.fail(parent, e);
                continue;
            }
        }
        if let Err(e) = fs::copy(&src, &dst) {
            summary.fail(&src, e);
        }
    }
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
