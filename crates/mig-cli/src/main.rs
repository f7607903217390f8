//! mig CLI - collect and check SQL migrations across git submodules

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod context;

use cli::Cli;
use commands::common::ExitCode;
use commands::{add, check, collect};

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and are not failures
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };
    init_logging(cli.global.verbose);

    let result = match &cli.command {
        cli::Commands::Add(args) => add::execute(args, &cli.global).await,
        cli::Commands::Collect(args) => collect::execute(args, &cli.global).await,
        cli::Commands::Check(args) => check::execute(args, &cli.global).await,
    };

    if let Err(err) = result {
        if let Some(ExitCode(code)) = err.downcast_ref::<ExitCode>() {
            std::process::exit(*code);
        }
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

/// Route `log` records to stderr. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .try_init();
}
