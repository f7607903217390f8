//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// mig - keep a project's migration catalog in step with its submodules
#[derive(Parser, Debug)]
#[command(name = "mig")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the next migration pair in the catalog
    Add(AddArgs),

    /// Copy submodule migrations into the catalog, then check it
    Collect(CollectArgs),

    /// Validate the catalog against itself and the submodules
    Check(CheckArgs),
}

/// Arguments for the add command
#[derive(Args, Debug)]
pub struct AddArgs {}

/// Arguments for the collect command
#[derive(Args, Debug)]
pub struct CollectArgs {
    /// Show what would change without writing
    #[arg(long)]
    pub dry_run: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Report formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable lines
    Text,
    /// A single JSON document
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
