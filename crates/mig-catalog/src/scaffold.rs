//! Scaffolding of new migration pairs (`add`).

use mig_core::{next_sequence, CoreError, CoreResult, Describe, Direction, Layout};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A freshly created up/down pair
#[derive(Debug, Clone, Serialize)]
pub struct NewMigration {
    /// Base name, `<project>-<version>-<release>-<sequence>`
    pub name: String,
    pub up: PathBuf,
    pub down: PathBuf,
}

/// Create the next sequence-numbered migration pair in the catalog.
///
/// Project metadata comes from the main describe script; without it no file
/// can be named, so a describe failure is returned as is.
pub fn add_migration(layout: &Layout, describe: &dyn Describe) -> CoreResult<NewMigration> {
    let info = describe.project_info(&layout.describe_script)?;
    let prefix = info.prefix();
    let sequence = next_sequence(&layout.catalog_dir, &prefix)?;
    let name = format!("{}-{}", prefix, sequence);

    let up = layout.catalog_dir.join(Direction::Up.file_name(&name));
    let down = layout.catalog_dir.join(Direction::Down.file_name(&name));
    for path in [&up, &down] {
        if path.exists() {
            return Err(CoreError::MigrationExists {
                path: path.display().to_string(),
            });
        }
    }

    fs::create_dir_all(&layout.catalog_dir).map_err(|e| CoreError::io(&layout.catalog_dir, e))?;
    let template = load_template(layout);

    for (path, direction) in [(&up, Direction::Up), (&down, Direction::Down)] {
        let body = format!("# {}\n{}\n", direction.file_name(&name), template);
        write_new(path, body.as_bytes())?;
        log::debug!("Created {}", path.display());
    }

    Ok(NewMigration { name, up, down })
}

/// Template text, or empty when disabled or unreadable
fn load_template(layout: &Layout) -> String {
    if !layout.include_template {
        return String::new();
    }
    match fs::read_to_string(&layout.template) {
        Ok(text) => text,
        Err(e) => {
            log::warn!(
                "Template {} not used: {}",
                layout.template.display(),
                e
            );
            String::new()
        }
    }
}

fn write_new(path: &Path, contents: &[u8]) -> CoreResult<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::AlreadyExists => CoreError::MigrationExists {
                path: path.display().to_string(),
            },
            _ => CoreError::io(path, e),
        })?;
    file.write_all(contents).map_err(|e| CoreError::io(path, e))
}

#[cfg(test)]
#[path = "scaffold_test.rs"]
mod tests;
