//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use mig_catalog::{CheckReport, ConsistencyChecker};
use serde::Serialize;
use std::fmt;

use crate::context::RuntimeContext;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main prints nothing for it.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Command printed as the fix for unregistered migrations
pub(crate) const COLLECT_HINT: &str = "mig collect";

/// Run the consistency checker over the catalog and every submodule.
///
/// A failing submodule listing is reported as a hard error rather than
/// aborting the check.
pub(crate) async fn run_check(ctx: &RuntimeContext) -> CheckReport {
    let (sources, listing_error) = match ctx.submodule_sources() {
        Ok(sources) => (sources, None),
        Err(e) => (Vec::new(), Some(e.to_string())),
    };

    let mut checker = ConsistencyChecker::new(&ctx.layout, &ctx.describe, sources);
    if let Some(message) = listing_error {
        checker = checker.with_error(message);
    }
    checker.run().await
}

/// Print `value` as pretty JSON on stdout
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Map a check report to the command's result
pub(crate) fn check_outcome(report: &CheckReport) -> Result<()> {
    if report.is_ok() {
        Ok(())
    } else {
        Err(ExitCode(1).into())
    }
}
