//! Check command implementation

use anyhow::Result;

use crate::cli::{CheckArgs, GlobalArgs, OutputFormat};
use crate::commands::common::{check_outcome, print_json, run_check, COLLECT_HINT};
use crate::context::RuntimeContext;

/// Execute the check command
pub async fn execute(args: &CheckArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let report = run_check(&ctx).await;

    match args.output {
        OutputFormat::Text => println!("{}", report.render(COLLECT_HINT)),
        OutputFormat::Json => print_json(&report)?,
    }
    check_outcome(&report)
}
