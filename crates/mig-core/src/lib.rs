//! mig-core - Core library for mig
//!
//! This crate provides configuration, the migration naming rules, provenance
//! headers with checksums, transitive include resolution, directory scanning,
//! and the describe / submodule collaborators shared by the catalog engine
//! and the CLI.

pub mod checksum;
pub mod config;
pub mod describe;
pub mod entry;
pub mod error;
pub mod include;
pub mod naming;
pub mod provenance;
pub mod submodule;

#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

pub use checksum::compute_checksum;
pub use config::{Config, Layout};
pub use describe::{Describe, DescribeField, ProjectInfo, ShellDescribe};
pub use entry::{scan_entries, EntryKey, EntryMap, MigrationEntry};
pub use error::{CoreError, CoreResult};
pub use include::{IncludeGraph, IncludeResolver, RejectReason, RejectedInclude, VisitScope};
pub use naming::{next_sequence, split_migration_name, validate_names, Direction, NameCheck};
pub use provenance::Provenance;
pub use submodule::{
    discover_sources, FixedSubmodules, GitSubmodules, SubmoduleLister, SubmoduleSource,
};
