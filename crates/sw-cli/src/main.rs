//! Stepwise CLI - applies numbered SQL migrations in order, exactly once

use clap::Parser;
use std::process;

mod cli;
mod commands;

use cli::Cli;
use commands::common::ExitCode;
use commands::{check, new, run, status, unlock};

fn main() -> process::ExitCode {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let result = match &cli.command {
        cli::Commands::Run(args) => run::execute(args, &cli.global),
        cli::Commands::Status(args) => status::execute(args, &cli.global),
        cli::Commands::Check => check::execute(&cli.global),
        cli::Commands::New(args) => new::execute(args, &cli.global),
        cli::Commands::Unlock(args) => unlock::execute(args, &cli.global),
    };

    match result {
        Ok(()) => process::ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<ExitCode>() {
            Some(ExitCode(code)) => process::ExitCode::from(*code),
            None => {
                eprintln!("Error: {err:#}");
                process::ExitCode::FAILURE
            }
        },
    }
}

/// Logs go to stderr; `-v` lowers the default level to debug.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .init();
}
