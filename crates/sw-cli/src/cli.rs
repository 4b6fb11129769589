//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Stepwise - apply numbered SQL migrations in order, exactly once
#[derive(Parser, Debug)]
#[command(name = "stepwise")]
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
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override database path from config
    #[arg(short, long, global = true, env = "STEPWISE_DATABASE")]
    pub database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending migrations
    Run(RunArgs),

    /// Show the cursor, lock state and every known migration
    Status(StatusArgs),

    /// Run preflight checks without changing anything
    Check,

    /// Create a new timestamped migration file
    New(NewArgs),

    /// Remove the run lock marker
    Unlock(UnlockArgs),
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// List what would be applied without locking, connecting or writing
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: StatusOutput,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutput {
    /// Table format
    Table,
    /// JSON output
    Json,
}

/// Arguments for the new command
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Short description, used as the file name suffix
    pub description: String,
}

/// Arguments for the unlock command
#[derive(Args, Debug)]
pub struct UnlockArgs {
    /// Only remove the marker if it is at least this many seconds old
    #[arg(long, value_name = "SECS")]
    pub if_older_than: Option<u64>,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
