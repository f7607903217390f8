//! Catalog consistency check (`check`).
//!
//! Problems fall into four tiers reported in fixed precedence; only the first
//! non-empty tier is shown:
//!
//! 1. hard errors: misnamed files, undescribable submodules, checksum
//!    mismatches between catalog and submodule headers
//! 2. submodule migrations missing from the catalog
//! 3. catalog migrations without their opposite direction
//! 4. include directives pointing at files that do not exist

use mig_core::{
    scan_entries, validate_names, Describe, EntryKey, EntryMap, IncludeResolver, Layout,
    ProjectInfo, SubmoduleSource,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::relative_to;

/// Message printed when every tier is empty
pub const OK_MESSAGE: &str = "[ok] Migrations are correct. No unregistered found.";

/// Report tiers, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    HardErrors,
    Unregistered,
    Pairing,
    MissingIncludes,
}

/// Everything a check found
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckReport {
    pub hard_errors: Vec<String>,
    /// Misnamed files across the catalog and all submodules
    pub wrong_files: usize,
    /// Submodule migrations with no catalog entry, relative to the root
    pub unregistered: Vec<PathBuf>,
    /// `<file> (no pair <suffix>)` lines
    pub unpaired: Vec<String>,
    pub missing_includes: Vec<PathBuf>,
}

impl CheckReport {
    /// First non-empty tier, if any
    pub fn first_failure(&self) -> Option<Tier> {
        if !self.hard_errors.is_empty() {
            Some(Tier::HardErrors)
        } else if !self.unregistered.is_empty() {
            Some(Tier::Unregistered)
        } else if !self.unpaired.is_empty() {
            Some(Tier::Pairing)
        } else if !self.missing_includes.is_empty() {
            Some(Tier::MissingIncludes)
        } else {
            None
        }
    }

    pub fn is_ok(&self) -> bool {
        self.first_failure().is_none()
    }

    /// Human-readable output: the first failing tier, or the ok message
    pub fn render(&self, collect_hint: &str) -> String {
        let mut out = String::new();
        match self.first_failure() {
            None => out.push_str(OK_MESSAGE),
            Some(Tier::HardErrors) => out.push_str(&self.hard_errors.join("\n")),
            Some(Tier::Unregistered) => {
                out.push_str("unregistered migrations (only in submodules):");
                for path in &self.unregistered {
                    let _ = write!(out, "\n   {}", path.display());
                }
                let _ = write!(out, "\nuse: {}", collect_hint);
            }
            Some(Tier::Pairing) => {
                out.push_str("wrong pairs:");
                for line in &self.unpaired {
                    let _ = write!(out, "\n   {}", line);
                }
            }
            Some(Tier::MissingIncludes) => {
                out.push_str("missing include-files:");
                for path in &self.missing_includes {
                    let _ = write!(out, "\n   {}", path.display());
                }
            }
        }
        out
    }
}

/// Validates the catalog against itself and against its submodules
pub struct ConsistencyChecker<'a> {
    layout: &'a Layout,
    describe: &'a dyn Describe,
    sources: Vec<SubmoduleSource>,
    preflight_errors: Vec<String>,
}

impl<'a> ConsistencyChecker<'a> {
    pub fn new(
        layout: &'a Layout,
        describe: &'a dyn Describe,
        sources: Vec<SubmoduleSource>,
    ) -> Self {
        Self {
            layout,
            describe,
            sources,
            preflight_errors: Vec::new(),
        }
    }

    /// Report an error found before the check ran (e.g. submodule listing)
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.preflight_errors.push(message.into());
        self
    }

    /// Run every check and collect the findings
    pub async fn run(&self) -> CheckReport {
        let mut report = CheckReport::default();

        let names = validate_names(&self.layout.catalog_dir);
        report.hard_errors.extend(names.errors);
        report.wrong_files += names.violations;

        let catalog = match scan_entries(&self.layout.catalog_dir, &ProjectInfo::default()) {
            Ok(catalog) => catalog,
            Err(e) => {
                report
                    .hard_errors
                    .push(format!("ERROR: failed to scan catalog: {}", e));
                EntryMap::new()
            }
        };

        report
            .hard_errors
            .extend(self.preflight_errors.iter().map(|e| format!("ERROR: {}", e)));
        for source in &self.sources {
            self.check_source(source, &catalog, &mut report);
        }

        report.unpaired = check_pairs(&catalog, self.layout.concurrency).await;
        report.missing_includes = check_includes(&catalog, self.layout.concurrency)
            .await
            .into_iter()
            .map(|p| relative_to(&self.layout.root, &p))
            .collect();

        if report.wrong_files > 0 {
            report.hard_errors.push(format!(
                "ERROR: there is wrong files {}, fix them",
                report.wrong_files
            ));
        }
        report
    }

    /// Naming, registration and checksum agreement for one submodule
    fn check_source(
        &self,
        source: &SubmoduleSource,
        catalog: &EntryMap,
        report: &mut CheckReport,
    ) {
        let names = validate_names(&source.migrations_dir);
        report.hard_errors.extend(names.errors);
        report.wrong_files += names.violations;

        let script = match &source.describe_script {
            Ok(script) => script,
            Err(message) => {
                report.hard_errors.push(format!("ERROR: {}", message));
                return;
            }
        };
        let entries = match self
            .describe
            .project_info(script)
            .and_then(|info| scan_entries(&source.migrations_dir, &info))
        {
            Ok(entries) => entries,
            Err(e) => {
                report
                    .hard_errors
                    .push(format!("ERROR: submodule {}: {}", source.path, e));
                return;
            }
        };

        for entry in entries.values() {
            let Some(main) = catalog.get(&entry.catalog_key()) else {
                report
                    .unregistered
                    .push(relative_to(&self.layout.root, &entry.path));
                continue;
            };
            let (main_sum, sub_sum) = (main.stored_checksum(), entry.stored_checksum());
            if !main_sum.is_empty() && !sub_sum.is_empty() && main_sum != sub_sum {
                report.hard_errors.push(format!(
                    "ERROR: migration meta mismatch for {}: main md5={}, submodule md5={}",
                    entry.catalog_file_name(),
                    main_sum,
                    sub_sum
                ));
            }
        }
    }
}

/// One task per catalog key: does the opposite direction exist?
async fn check_pairs(catalog: &EntryMap, limit: usize) -> Vec<String> {
    let keys: Arc<BTreeSet<EntryKey>> = Arc::new(catalog.keys().cloned().collect());
    let items: Vec<EntryKey> = keys.iter().cloned().collect();

    let mut unpaired: Vec<String> = fan_out(items, limit, move |(base, direction)| {
        let opposite = direction.opposite();
        if keys.contains(&(base.clone(), opposite)) {
            None
        } else {
            Some(format!(
                "{} (no pair {})",
                direction.file_name(&base),
                opposite.suffix()
            ))
        }
    })
    .await
    .into_iter()
    .flatten()
    .collect();
    unpaired.sort();
    unpaired
}

/// One task per catalog file: which transitively included scripts are missing?
async fn check_includes(catalog: &EntryMap, limit: usize) -> Vec<PathBuf> {
    let files: Vec<PathBuf> = catalog.values().map(|e| e.path.clone()).collect();

    let mut missing: Vec<PathBuf> = fan_out(files, limit, |file: PathBuf| -> Vec<PathBuf> {
        match IncludeResolver::resolve_once(&file) {
            Ok(graph) => graph.missing().map(|r| r.resolved.clone()).collect(),
            Err(e) => {
                log::warn!("Cannot resolve includes of {}: {}", file.display(), e);
                Vec::new()
            }
        }
    })
    .await
    .into_iter()
    .flatten()
    .collect();
    missing.sort();
    missing.dedup();
    missing
}

/// Run `f` over `items` on the blocking pool with at most `limit` tasks in
/// flight, and return the results once every task has been joined.
async fn fan_out<T, R, F>(items: Vec<T>, limit: usize, f: F) -> Vec<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> R + Send + Sync + 'static,
{
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let f = Arc::new(f);
    let mut handles = Vec::with_capacity(items.len());

    for item in items {
        let permit = match Arc::clone(&semaphore).acquire_owned().await {
            Ok(permit) => permit,
            // The semaphore is never closed
            Err(_) => break,
        };
        let f = Arc::clone(&f);
        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            f(item)
        }));
    }

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        match handle.await {
            Ok(result) => results.push(result),
            Err(e) => log::warn!("Check task failed: {}", e),
        }
    }
    results
}

#[cfg(test)]
#[path = "check_test.rs"]
mod tests;
