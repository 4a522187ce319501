//! CLI module.
//!
//! Provides the command-line interface:
//! - init: write a default configuration
//! - check: one-shot schema directory verification
//! - start: boot the service and serve

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{check, init, run_command, start};
pub use errors::{CliError, CliErrorCode, CliResult};

/// Parses arguments and runs the selected command.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}
