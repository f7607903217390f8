//! Project metadata from describe scripts.
//!
//! A describe script is invoked with exactly one argument (`project`,
//! `version` or `release`), must exit zero and print the value on stdout.

use crate::error::{CoreError, CoreResult};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Values a describe script can be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescribeField {
    Project,
    Version,
    Release,
}

impl DescribeField {
    pub fn as_arg(self) -> &'static str {
        match self {
            DescribeField::Project => "project",
            DescribeField::Version => "version",
            DescribeField::Release => "release",
        }
    }
}

impl fmt::Display for DescribeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_arg())
    }
}

/// Project, version and release of one source tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ProjectInfo {
    pub project: String,
    pub version: String,
    pub release: String,
}

impl ProjectInfo {
    pub fn new(
        project: impl Into<String>,
        version: impl Into<String>,
        release: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            version: version.into(),
            release: release.into(),
        }
    }

    /// `<project>-<version>-<release>`
    pub fn prefix(&self) -> String {
        format!("{}-{}-{}", self.project, self.version, self.release)
    }

    pub fn is_empty(&self) -> bool {
        self.project.is_empty() && self.version.is_empty() && self.release.is_empty()
    }
}

/// Source of project metadata for the tree owning a describe script
pub trait Describe: Send + Sync {
    fn project_info(&self, script: &Path) -> CoreResult<ProjectInfo>;
}

/// Runs describe scripts through a shell, one process per field
#[derive(Debug, Clone)]
pub struct ShellDescribe {
    shell: String,
    workdir: PathBuf,
}

impl ShellDescribe {
    /// Scripts run as `<shell> <script> <field>` with `workdir` as cwd
    pub fn new(shell: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            shell: shell.into(),
            workdir: workdir.into(),
        }
    }

    /// Ask `script` for a single field
    pub fn field(&self, script: &Path, field: DescribeField) -> CoreResult<String> {
        if !script.is_file() {
            return Err(CoreError::DescribeScriptNotFound {
                path: script.display().to_string(),
            });
        }

        let output = Command::new(&self.shell)
            .arg(script)
            .arg(field.as_arg())
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| CoreError::DescribeFailed {
                field: field.to_string(),
                message: format!("cannot run {} {}: {}", self.shell, script.display(), e),
            })?;

        if !output.status.success() {
            return Err(CoreError::DescribeFailed {
                field: field.to_string(),
                message: format!(
                    "{} exited with {}: {}",
                    script.display(),
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        Ok(strip_newlines(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl Describe for ShellDescribe {
    fn project_info(&self, script: &Path) -> CoreResult<ProjectInfo> {
        Ok(ProjectInfo {
            project: self.field(script, DescribeField::Project)?,
            version: self.field(script, DescribeField::Version)?,
            release: self.field(script, DescribeField::Release)?,
        })
    }
}

/// Remove every line break from describe output
pub fn strip_newlines(output: &str) -> String {
    output.chars().filter(|c| *c != '\n' && *c != '\r').collect()
}

#[cfg(test)]
#[path = "describe_test.rs"]
mod tests;
