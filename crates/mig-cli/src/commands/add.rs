//! Add command implementation

use anyhow::{Context, Result};
use mig_catalog::add_migration;
use std::path::Path;

use crate::cli::{AddArgs, GlobalArgs};
use crate::context::RuntimeContext;

/// Execute the add command
pub async fn execute(_args: &AddArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let created = add_migration(&ctx.layout, &ctx.describe)
        .context("Failed to create migration")?;

    for path in [&created.up, &created.down] {
        println!("[ok] created {}", display_relative(&ctx.root, path));
    }
    Ok(())
}

fn display_relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
