//! Configuration types and parsing for migration.yml

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File names probed (in order) when loading config from a project directory
pub const CONFIG_FILE_NAMES: [&str; 2] = ["migration.yml", "migration.yaml"];

/// Project configuration from migration.yml
///
/// Every field has a default, so a project without a config file behaves
/// exactly like one with an empty `migration.yml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Catalog directory, relative to the project root
    #[serde(default = "default_catalog_path")]
    pub catalog_path: String,

    /// Describe script of the main project, relative to the project root
    #[serde(default = "default_describe_script")]
    pub describe_script: String,

    /// Template appended to freshly created migrations
    #[serde(default = "default_template_path")]
    pub template_path: String,

    /// Whether `add` appends the template to new files
    #[serde(default = "default_true")]
    pub include_template: bool,

    /// Shell used to run describe scripts
    #[serde(default = "default_shell")]
    pub shell: String,

    /// Submodule discovery settings
    #[serde(default)]
    pub submodules: SubmoduleConfig,

    /// Consistency check settings
    #[serde(default)]
    pub check: CheckConfig,
}

/// Where submodules live and how their migrations are found
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmoduleConfig {
    /// Explicit submodule paths. When set, `git submodule` is not invoked.
    #[serde(default)]
    pub paths: Option<Vec<String>>,

    /// Migrations directory inside each submodule
    #[serde(default = "default_catalog_path")]
    pub migrations_path: String,

    /// Candidate describe script locations inside each submodule, in order
    #[serde(default = "default_describe_candidates")]
    pub describe_candidates: Vec<String>,
}

impl Default for SubmoduleConfig {
    fn default() -> Self {
        Self {
            paths: None,
            migrations_path: default_catalog_path(),
            describe_candidates: default_describe_candidates(),
        }
    }
}

/// Consistency check settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckConfig {
    /// Upper bound on concurrently running pairing/include checks
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

fn default_catalog_path() -> String {
    "migrations".to_string()
}

fn default_describe_script() -> String {
    "scripts/describe.sh".to_string()
}

fn default_template_path() -> String {
    "scripts/migration.template.sql".to_string()
}

fn default_true() -> bool {
    true
}

fn default_shell() -> String {
    "bash".to_string()
}

fn default_describe_candidates() -> Vec<String> {
    vec!["describe.sh".to_string(), "scripts/describe.sh".to_string()]
}

fn default_concurrency() -> usize {
    8
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            describe_script: default_describe_script(),
            template_path: default_template_path(),
            include_template: true,
            shell: default_shell(),
            submodules: SubmoduleConfig::default(),
            check: CheckConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                message: format!("{}: {}", path.display(), e),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    ///
    /// Looks for migration.yml or migration.yaml and falls back to defaults
    /// when neither exists.
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        match CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|p| p.exists())
        {
            Some(path) => Self::load(&path),
            None => {
                log::debug!("No config file in {}, using defaults", dir.display());
                Ok(Self::default())
            }
        }
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.catalog_path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "catalog_path cannot be empty".to_string(),
            });
        }
        if self.submodules.migrations_path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "submodules.migrations_path cannot be empty".to_string(),
            });
        }
        if self.submodules.describe_candidates.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "submodules.describe_candidates must list at least one path".to_string(),
            });
        }
        if self.shell.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "shell cannot be empty".to_string(),
            });
        }
        if self.check.concurrency == 0 {
            return Err(CoreError::ConfigInvalid {
                message: "check.concurrency must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Resolve every configured path against a project root
    pub fn layout(&self, root: &Path) -> Layout {
        Layout {
            root: root.to_path_buf(),
            catalog_dir: root.join(&self.catalog_path),
            describe_script: root.join(&self.describe_script),
            template: root.join(&self.template_path),
            include_template: self.include_template,
            shell: self.shell.clone(),
            submodule_migrations: PathBuf::from(&self.submodules.migrations_path),
            describe_candidates: self
                .submodules
                .describe_candidates
                .iter()
                .map(PathBuf::from)
                .collect(),
            concurrency: self.check.concurrency,
        }
    }
}

/// Resolved filesystem layout handed to every component.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Project root; relative submodule paths are resolved against it
    pub root: PathBuf,
    /// Canonical migrations catalog
    pub catalog_dir: PathBuf,
    /// Describe script of the main project
    pub describe_script: PathBuf,
    /// Template for new migrations
    pub template: PathBuf,
    pub include_template: bool,
    pub shell: String,
    /// Migrations directory, relative to a submodule root
    pub submodule_migrations: PathBuf,
    /// Describe script candidates, relative to a submodule root
    pub describe_candidates: Vec<PathBuf>,
    pub concurrency: usize,
}

impl Layout {
    /// Layout with default settings rooted at `root`
    pub fn with_defaults(root: &Path) -> Self {
        Config::default().layout(root)
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
