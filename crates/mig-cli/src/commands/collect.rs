//! Collect command implementation

use anyhow::{Context, Result};
use mig_catalog::{synchronize, CheckReport, SyncOptions, SyncSummary};
use serde::Serialize;

use crate::cli::{CollectArgs, GlobalArgs, OutputFormat};
use crate::commands::common::{check_outcome, print_json, run_check, COLLECT_HINT};
use crate::context::RuntimeContext;

/// JSON document printed by `collect --output json`
#[derive(Serialize)]
struct CollectOutput<'a> {
    collect: &'a SyncSummary,
    check: &'a CheckReport,
}

/// Execute the collect command
pub async fn execute(args: &CollectArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let sources = ctx
        .submodule_sources()
        .context("Failed to list submodules")?;

    let options = SyncOptions {
        dry_run: args.dry_run,
    };
    let summary = synchronize(&ctx.layout, &sources, &ctx.describe, options)
        .context("Failed to collect migrations")?;
    let report = run_check(&ctx).await;

    match args.output {
        OutputFormat::Json => print_json(&CollectOutput {
            collect: &summary,
            check: &report,
        })?,
        OutputFormat::Text => {
            print_summary(&summary);
            println!("{}", report.render(COLLECT_HINT));
        }
    }
    check_outcome(&report)
}

fn print_summary(summary: &SyncSummary) {
    if summary.dry_run {
        println!("Dry run - no files were written");
    }
    for action in &summary.actions {
        println!("{}", action);
    }
    for failure in &summary.failures {
        println!("{}", failure);
    }
    for error in &summary.source_errors {
        println!("[skip] {}", error);
    }
    if summary.deletion_skipped {
        println!("Deletion skipped: not every submodule could be read");
    }
    println!("{}", summary.summary_line());
}
