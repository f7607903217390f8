//! Runtime context for CLI commands

use anyhow::{Context, Result};
use mig_core::{
    discover_sources, Config, FixedSubmodules, GitSubmodules, Layout, ShellDescribe,
    SubmoduleSource,
};
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Loaded configuration and the collaborators every command needs
pub struct RuntimeContext {
    /// Canonical project root
    pub root: PathBuf,

    pub config: Config,

    /// Paths resolved against `root`
    pub layout: Layout,

    /// Runs describe scripts from the project root
    pub describe: ShellDescribe,
}

impl RuntimeContext {
    /// Create a new runtime context from global arguments
    pub fn new(args: &GlobalArgs) -> Result<Self> {
        let root = std::fs::canonicalize(&args.project_dir)
            .with_context(|| format!("Project directory not found: {}", args.project_dir))?;

        // Load config from custom path or project directory
        let config = if let Some(config_path) = &args.config {
            Config::load(Path::new(config_path)).context("Failed to load configuration file")?
        } else {
            Config::load_from_dir(&root).context("Failed to load project configuration")?
        };

        let layout = config.layout(&root);
        let describe = ShellDescribe::new(&layout.shell, &root);
        log::debug!("Catalog at {}", layout.catalog_dir.display());

        Ok(Self {
            root,
            config,
            layout,
            describe,
        })
    }

    /// Submodules feeding the catalog: the configured list, or `git submodule`
    pub fn submodule_sources(&self) -> mig_core::CoreResult<Vec<SubmoduleSource>> {
        match &self.config.submodules.paths {
            Some(paths) => discover_sources(&self.layout, &FixedSubmodules(paths.clone())),
            None => discover_sources(&self.layout, &GitSubmodules::new(&self.root)),
        }
    }
}
