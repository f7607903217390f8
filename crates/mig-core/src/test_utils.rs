//! Shared test utilities for crates built on mig-core

use crate::describe::{Describe, ProjectInfo};
use crate::error::{CoreError, CoreResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Describe collaborator answering from a fixed table instead of running
/// scripts. Scripts are matched by path; unknown scripts fail.
#[derive(Debug, Clone, Default)]
pub struct StaticDescribe {
    infos: HashMap<PathBuf, ProjectInfo>,
}

impl StaticDescribe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `info` for `script`
    pub fn with(mut self, script: impl Into<PathBuf>, info: ProjectInfo) -> Self {
        self.infos.insert(script.into(), info);
        self
    }
}

impl Describe for StaticDescribe {
    fn project_info(&self, script: &Path) -> CoreResult<ProjectInfo> {
        self.infos
            .get(script)
            .cloned()
            .ok_or_else(|| CoreError::DescribeScriptNotFound {
                path: script.display().to_string(),
            })
    }
}

/// Write `content` to `root/rel`, creating parent directories
pub fn write_file(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}
