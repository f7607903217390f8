//! Submodule sources feeding the catalog.

use crate::config::Layout;
use crate::error::{CoreError, CoreResult};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Enumerates submodule paths relative to the project root
pub trait SubmoduleLister {
    fn list(&self) -> CoreResult<Vec<String>>;
}

/// Lists submodules with `git submodule`
#[derive(Debug, Clone)]
pub struct GitSubmodules {
    repo_root: PathBuf,
}

impl GitSubmodules {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }
}

impl SubmoduleLister for GitSubmodules {
    fn list(&self) -> CoreResult<Vec<String>> {
        let output = Command::new("git")
            .arg("submodule")
            .current_dir(&self.repo_root)
            .output()
            .map_err(|e| CoreError::SubmoduleListFailed {
                message: e.to_string(),
            })?;
        if !output.status.success() {
            return Err(CoreError::SubmoduleListFailed {
                message: format!(
                    "git submodule exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        Ok(parse_submodule_listing(&String::from_utf8_lossy(
            &output.stdout,
        )))
    }
}

/// A fixed list of submodule paths, e.g. from config
#[derive(Debug, Clone, Default)]
pub struct FixedSubmodules(pub Vec<String>);

impl SubmoduleLister for FixedSubmodules {
    fn list(&self) -> CoreResult<Vec<String>> {
        Ok(self.0.clone())
    }
}

/// Take the second whitespace-separated field of every line.
///
/// `git submodule` prints ` <sha> <path> (<describe>)` per submodule, with a
/// status character glued to the sha.
pub fn parse_submodule_listing(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
        .collect()
}

/// One submodule whose migrations feed the catalog
#[derive(Debug, Clone)]
pub struct SubmoduleSource {
    /// Path relative to the project root, as listed
    pub path: String,
    /// Absolute submodule root
    pub root: PathBuf,
    /// The submodule's own migrations directory
    pub migrations_dir: PathBuf,
    /// Located describe script, or why none was found
    pub describe_script: Result<PathBuf, String>,
}

impl SubmoduleSource {
    /// Resolve a listed path against the layout
    pub fn resolve(layout: &Layout, path: &str) -> Self {
        let root = layout.root.join(path);
        let describe_script = find_describe_script(&root, &layout.describe_candidates)
            .ok_or_else(|| {
                CoreError::SubmoduleDescribeMissing {
                    path: path.to_string(),
                }
                .to_string()
            });
        Self {
            path: path.to_string(),
            migrations_dir: root.join(&layout.submodule_migrations),
            root,
            describe_script,
        }
    }
}

/// First candidate (relative to `root`) that exists as a file
pub fn find_describe_script(root: &Path, candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates
        .iter()
        .map(|c| root.join(c))
        .find(|p| p.is_file())
}

/// List submodules and resolve each against the layout
pub fn discover_sources(
    layout: &Layout,
    lister: &dyn SubmoduleLister,
) -> CoreResult<Vec<SubmoduleSource>> {
    Ok(lister
        .list()?
        .iter()
        .map(|path| SubmoduleSource::resolve(layout, path))
        .collect())
}

#[cfg(test)]
#[path = "submodule_test.rs"]
mod tests;
