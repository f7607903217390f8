//! Transitive resolution of `@file.sql` include directives.
//!
//! A line whose trimmed form starts with `@` includes another script. The
//! path runs up to the first `;` (which starts a trailing comment) and is
//! relative to the directory of the file containing the directive.
//!
//! ```text
//! @common/grants.sql ; shared grants
//! ```

use crate::error::{CoreError, CoreResult};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

/// How long the visited set lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitScope {
    /// Every top-level `resolve` call starts from an empty set. Sibling
    /// files that include the same script each list it.
    #[default]
    PerCall,
    /// The set is kept across calls on the same resolver, so a script is
    /// listed by the first file that reaches it and by no later one.
    Run,
}

/// Why a directive was not followed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Target does not end in `.sql`
    NotSql,
    /// Target does not exist relative to the including file
    Missing,
}

/// A directive that was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedInclude {
    /// File containing the directive
    pub file: PathBuf,
    /// Directive target as written
    pub target: String,
    /// Where the target was looked up
    pub resolved: PathBuf,
    pub reason: RejectReason,
}

/// Flattened include list of one top-level script
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncludeGraph {
    /// Included scripts in discovery order, relative to the top-level
    /// script's directory
    pub includes: Vec<PathBuf>,
    /// Directives that were skipped, in discovery order
    pub rejected: Vec<RejectedInclude>,
}

impl IncludeGraph {
    /// Rejected directives whose target is missing on disk
    pub fn missing(&self) -> impl Iterator<Item = &RejectedInclude> {
        self.rejected
            .iter()
            .filter(|r| r.reason == RejectReason::Missing)
    }
}

/// Extract the include target from one line, if it is a directive
pub fn parse_directive(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix('@')?;
    let target = rest.split(';').next().unwrap_or("").trim();
    if target.is_empty() {
        None
    } else {
        Some(target)
    }
}

/// Resolves include directives with an explicit visited-set scope
#[derive(Debug, Default)]
pub struct IncludeResolver {
    scope: VisitScope,
    visited: HashSet<PathBuf>,
}

impl IncludeResolver {
    pub fn new(scope: VisitScope) -> Self {
        Self {
            scope,
            visited: HashSet::new(),
        }
    }

    /// Resolve `file` with a fresh visited set
    pub fn resolve_once(file: &Path) -> CoreResult<IncludeGraph> {
        Self::new(VisitScope::PerCall).resolve(file)
    }

    /// Resolve every include reachable from `file`.
    ///
    /// Fails only when `file` itself cannot be read; unreadable nested
    /// scripts are logged and contribute nothing further.
    pub fn resolve(&mut self, file: &Path) -> CoreResult<IncludeGraph> {
        if self.scope == VisitScope::PerCall {
            self.visited.clear();
        }
        let content = std::fs::read(file).map_err(|e| CoreError::io(file, e))?;
        self.visited.insert(visit_key(file));

        let mut graph = IncludeGraph::default();
        self.walk(file, &content, Path::new(""), &mut graph);
        Ok(graph)
    }

    /// `rel_dir` is the directory of `file` relative to the top-level file's
    /// directory.
    fn walk(&mut self, file: &Path, content: &[u8], rel_dir: &Path, graph: &mut IncludeGraph) {
        let base_dir = file.parent().unwrap_or_else(|| Path::new(""));
        let text = String::from_utf8_lossy(content);

        for line in text.lines() {
            let Some(target) = parse_directive(line) else {
                continue;
            };
            let target_path = base_dir.join(target);

            let reason = if !target.ends_with(".sql") {
                Some(RejectReason::NotSql)
            } else if !target_path.is_file() {
                Some(RejectReason::Missing)
            } else {
                None
            };
            if let Some(reason) = reason {
                log::warn!("wrong include @{} in {}", target, file.display());
                graph.rejected.push(RejectedInclude {
                    file: file.to_path_buf(),
                    target: target.to_string(),
                    resolved: target_path,
                    reason,
                });
                continue;
            }

            if !self.visited.insert(visit_key(&target_path)) {
                continue;
            }
            let rel = normalize(&rel_dir.join(target));
            graph.includes.push(rel.clone());

            match std::fs::read(&target_path) {
                Ok(nested) => {
                    let nested_dir = rel.parent().map(Path::to_path_buf).unwrap_or_default();
                    self.walk(&target_path, &nested, &nested_dir, graph);
                }
                Err(e) => log::warn!("Cannot read include {}: {}", target_path.display(), e),
            }
        }
    }
}

/// Key used for cycle detection; symlinks and `..` collapse to one entry
fn visit_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| normalize(path))
}

/// Lexically remove `.` and resolve `..` against preceding normal components
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().map(|c| c.as_os_str()).collect()
}

#[cfg(test)]
#[path = "include_test.rs"]
mod tests;
