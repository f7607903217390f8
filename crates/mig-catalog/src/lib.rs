//! mig-catalog - Catalog engine for mig
//!
//! This crate implements the three operations on a migrations catalog:
//! scaffolding a new migration pair, collecting submodule migrations into
//! the catalog, and checking the catalog's consistency.

pub mod check;
pub mod scaffold;
pub mod sync;

pub use check::{CheckReport, ConsistencyChecker, Tier};
pub use scaffold::{add_migration, NewMigration};
pub use sync::{synchronize, SyncAction, SyncFailure, SyncOptions, SyncSummary};

use std::path::{Path, PathBuf};

/// `path` relative to `root` when it lies below it, otherwise unchanged
pub(crate) fn relative_to(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}
